//! Helpers for exercising modals against the in-memory document.
//!
//! [`Harness`] stands in for a page: a document, a modal container attached
//! to its body, and a single-threaded executor playing the role of the event
//! loop. [`Harness::settle`] runs queued tasks until nothing can progress,
//! the equivalent of letting the call stack clear.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::{
    FutureExt,
    channel::oneshot,
    executor::LocalPool,
    future::{self, LocalBoxFuture},
};
use modal::{
    Content, Lifecycle, Modal, ModalError, ModalOptions,
    dom::{
        Dom,
        memory::{MemoryDocument, NodeId},
    },
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a test-friendly subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[derive(Default)]
struct LifecycleState {
    active: bool,
    setup_calls: usize,
    show_calls: usize,
    hide_calls: usize,
    destroy_calls: usize,
    holding: bool,
    pending: Vec<oneshot::Sender<()>>,
}

/// A [`Lifecycle`] whose transitions complete immediately, or only when the
/// test releases them.
pub struct ScriptedLifecycle {
    state: Rc<RefCell<LifecycleState>>,
}

/// The test's view of a [`ScriptedLifecycle`] after it moved into a modal.
#[derive(Clone)]
pub struct LifecycleProbe {
    state: Rc<RefCell<LifecycleState>>,
}

impl ScriptedLifecycle {
    pub fn new() -> (Self, LifecycleProbe) {
        let state = Rc::new(RefCell::new(LifecycleState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            LifecycleProbe { state },
        )
    }

    fn transition(&self) -> LocalBoxFuture<'static, ()> {
        let mut state = self.state.borrow_mut();
        if !state.holding {
            return future::ready(()).boxed_local();
        }
        let (sender, receiver) = oneshot::channel();
        state.pending.push(sender);
        async move {
            let _ = receiver.await;
        }
        .boxed_local()
    }
}

impl Lifecycle for ScriptedLifecycle {
    fn setup(&mut self) {
        self.state.borrow_mut().setup_calls += 1;
    }

    fn show(&mut self) -> LocalBoxFuture<'static, ()> {
        {
            let mut state = self.state.borrow_mut();
            state.active = true;
            state.show_calls += 1;
        }
        self.transition()
    }

    fn hide(&mut self) -> LocalBoxFuture<'static, ()> {
        {
            let mut state = self.state.borrow_mut();
            state.active = false;
            state.hide_calls += 1;
        }
        self.transition()
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.active = false;
        state.destroy_calls += 1;
    }

    fn is_active(&self) -> bool {
        self.state.borrow().active
    }
}

impl LifecycleProbe {
    /// Keep transitions started from now on pending until [`Self::release`].
    pub fn hold(&self) {
        self.state.borrow_mut().holding = true;
    }

    /// Complete every pending transition and stop holding new ones.
    pub fn release(&self) {
        let pending = {
            let mut state = self.state.borrow_mut();
            state.holding = false;
            std::mem::take(&mut state.pending)
        };
        for sender in pending {
            let _ = sender.send(());
        }
    }

    /// Override the active flag the modal sees.
    pub fn set_active(&self, active: bool) {
        self.state.borrow_mut().active = active;
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn setup_calls(&self) -> usize {
        self.state.borrow().setup_calls
    }

    pub fn show_calls(&self) -> usize {
        self.state.borrow().show_calls
    }

    pub fn hide_calls(&self) -> usize {
        self.state.borrow().hide_calls
    }

    pub fn destroy_calls(&self) -> usize {
        self.state.borrow().destroy_calls
    }
}

/// Counts how often a callback ran.
#[derive(Clone, Default)]
pub struct CallCounter(Rc<Cell<usize>>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl Fn() + 'static {
        let count = Rc::clone(&self.0);
        move || count.set(count.get() + 1)
    }

    pub fn count(&self) -> usize {
        self.0.get()
    }
}

pub const CONTAINER_CLASS: &str = "modal-container";
pub const ACTIVE_CLASS: &str = "modal-active";
pub const CONTAINER_ACTIVE_CLASS: &str = "modal-container-active";

pub struct Harness {
    pub doc: MemoryDocument,
    pub pool: LocalPool,
    /// A `div.modal-container` attached to the body.
    pub container: NodeId,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();

        let doc = MemoryDocument::new();
        let container = doc.create_element("div");
        doc.add_class(&container, CONTAINER_CLASS)
            .expect("container is an element");
        doc.append_child(&doc.body_node(), &container)
            .expect("body accepts children");

        Self {
            doc,
            pool: LocalPool::new(),
            container,
        }
    }

    /// Options targeting the harness container.
    pub fn options(&self) -> ModalOptions<NodeId> {
        ModalOptions::new().container(self.container)
    }

    /// A fresh detached `<div>`.
    pub fn element(&self) -> NodeId {
        self.doc.create_element("div")
    }

    /// Build a modal driven by a [`ScriptedLifecycle`].
    pub fn modal(
        &self,
        content: Content<NodeId>,
        options: ModalOptions<NodeId>,
    ) -> Result<(Modal<MemoryDocument>, LifecycleProbe), ModalError> {
        let (lifecycle, probe) = ScriptedLifecycle::new();
        let modal = Modal::with_lifecycle(
            self.doc.clone(),
            content,
            options,
            self.pool.spawner(),
            |_, _| lifecycle,
        )?;
        Ok((modal, probe))
    }

    /// Run every task that can make progress.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn container_active(&self) -> bool {
        self.doc.has_class(&self.container, CONTAINER_ACTIVE_CLASS)
    }

    pub fn in_container(&self, node: NodeId) -> bool {
        self.doc.contains(&self.container, &node)
    }
}
