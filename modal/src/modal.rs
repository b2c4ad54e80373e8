//! The modal widget.

use std::{
    cell::RefCell,
    future::Future,
    rc::{Rc, Weak},
};

use futures::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
    task::{LocalSpawn, LocalSpawnExt},
};

use crate::{
    dom::{Dom, DomError},
    lifecycle::{Lifecycle, TransitionLifecycle},
    options::{Callback, Content, ModalClasses, ModalOptions},
};

#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    #[error("Modal markup contains no element")]
    EmptyMarkup,
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("Invalid modal configuration")]
    Config(#[from] serde_json::Error),
}

/// Resolves once a show or hide transition has completed and the matching
/// callback has run. Clones resolve together.
pub type Completion = Shared<LocalBoxFuture<'static, ()>>;

/// An overlay element appended into a container, shown and hidden through a
/// [`Lifecycle`].
///
/// While shown, a capture-phase document click listener watches for clicks
/// outside the element. The container carries its active class as long as
/// any element inside it carries the modal active class.
///
/// `Modal` is a cheap handle; clones control the same modal.
pub struct Modal<D: Dom> {
    inner: Rc<Inner<D>>,
}

impl<D: Dom> Clone for Modal<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct Inner<D: Dom> {
    dom: D,
    el: D::Node,
    container: D::Node,
    /// Where the element lived before construction, restored on destroy.
    original_parent: Option<D::Node>,
    classes: ModalClasses,
    on_show: Option<Callback>,
    on_hide: Option<Callback>,
    on_click_outside: Callback,
    lifecycle: RefCell<Box<dyn Lifecycle>>,
    listener: RefCell<Option<D::Listener>>,
    spawner: Box<dyn LocalSpawn>,
}

impl<D: Dom> Modal<D> {
    /// Create a modal whose transitions follow the element's CSS
    /// transition.
    pub fn new(
        dom: D,
        content: Content<D::Node>,
        options: ModalOptions<D::Node>,
        spawner: impl LocalSpawn + 'static,
    ) -> Result<Self, ModalError> {
        Self::with_lifecycle(dom, content, options, spawner, |dom, el| {
            TransitionLifecycle::new(dom.clone(), el.clone())
        })
    }

    /// Create a modal driven by a custom lifecycle, built from the resolved
    /// element.
    pub fn with_lifecycle<L, F>(
        dom: D,
        content: Content<D::Node>,
        options: ModalOptions<D::Node>,
        spawner: impl LocalSpawn + 'static,
        lifecycle: F,
    ) -> Result<Self, ModalError>
    where
        L: Lifecycle,
        F: FnOnce(&D, &D::Node) -> L,
    {
        let el = match content {
            Content::Node(node) => node,
            Content::Markup(markup) => dom
                .parse_markup(markup.trim())?
                .ok_or(ModalError::EmptyMarkup)?,
        };
        let container = match options.container {
            Some(container) => container,
            None => dom.body()?,
        };
        let original_parent = dom.parent(&el);

        if !dom.contains(&container, &el) {
            dom.append_child(&container, &el)?;
        }

        let lifecycle: Box<dyn Lifecycle> = Box::new(lifecycle(&dom, &el));
        tracing::debug!(?el, ?container, "created modal");

        let inner = Rc::new_cyclic(|weak: &Weak<Inner<D>>| {
            let on_click_outside = options.on_click_outside.unwrap_or_else(|| {
                let weak = weak.clone();
                let hide: Callback = Rc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        let _ = Modal { inner }.hide();
                    }
                });
                hide
            });

            Inner {
                dom,
                el,
                container,
                original_parent,
                classes: options.classes,
                on_show: options.on_show,
                on_hide: options.on_hide,
                on_click_outside,
                lifecycle: RefCell::new(lifecycle),
                listener: RefCell::new(None),
                spawner: Box::new(spawner),
            }
        });

        Ok(Self { inner })
    }

    /// The modal's element.
    pub fn el(&self) -> &D::Node {
        &self.inner.el
    }

    pub fn container(&self) -> &D::Node {
        &self.inner.container
    }

    pub fn classes(&self) -> &ModalClasses {
        &self.inner.classes
    }

    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.borrow().is_active()
    }

    /// Show the modal.
    ///
    /// The active classes are applied and outside clicks are watched
    /// immediately. `on_show` fires after the lifecycle's show transition
    /// completes.
    pub fn show(&self) -> Completion {
        let inner = &self.inner;
        tracing::debug!(el = ?inner.el, "showing modal");

        inner.lifecycle.borrow_mut().setup();
        inner.log_failure(inner.dom.add_class(&inner.el, &inner.classes.active_class));
        inner.log_failure(
            inner
                .dom
                .add_class(&inner.container, &inner.classes.container_active_class),
        );
        self.listen();

        let transition = inner.lifecycle.borrow_mut().show();
        let on_show = inner.on_show.clone();
        self.spawn(async move {
            transition.await;
            if let Some(on_show) = on_show {
                on_show();
            }
        })
    }

    /// Hide the modal.
    ///
    /// The element loses its active class immediately. Once the lifecycle's
    /// hide transition completes, the container loses its active class if no
    /// other modal inside it is still active, then `on_hide` fires.
    pub fn hide(&self) -> Completion {
        let inner = &self.inner;
        tracing::debug!(el = ?inner.el, "hiding modal");

        inner.log_failure(
            inner
                .dom
                .remove_class(&inner.el, &inner.classes.active_class),
        );
        let listener = inner.listener.borrow_mut().take();
        drop(listener);

        let transition = inner.lifecycle.borrow_mut().hide();
        let inner = Rc::clone(inner);
        self.spawn(async move {
            transition.await;
            inner.release_container();
            if let Some(on_hide) = &inner.on_hide {
                on_hide();
            }
        })
    }

    /// Tear the modal down: stop watching clicks, put the element back where
    /// it came from (or remove it), and release the container if no other
    /// active modal remains in it.
    pub fn destroy(&self) -> Result<(), ModalError> {
        let inner = &self.inner;
        tracing::debug!(el = ?inner.el, "destroying modal");

        let listener = inner.listener.borrow_mut().take();
        drop(listener);

        // The container and lifecycle are released even when the element
        // could not be put back; the first failure is reported afterwards
        let unmarked = inner
            .dom
            .remove_class(&inner.el, &inner.classes.active_class);
        let placed = inner.restore_placement();
        inner.release_container();
        inner.lifecycle.borrow_mut().destroy();

        unmarked.and(placed)?;
        Ok(())
    }

    /// Start watching document clicks, replacing any previous listener.
    fn listen(&self) {
        let weak = Rc::downgrade(&self.inner);
        let handler = Box::new(move |target: &D::Target| {
            if let Some(inner) = weak.upgrade() {
                inner.on_document_click(target);
            }
        });

        match self.inner.dom.on_document_click(handler) {
            Ok(listener) => *self.inner.listener.borrow_mut() = Some(listener),
            Err(err) => tracing::error!(%err, "failed to watch document clicks"),
        }
    }

    /// Run `task` on the spawner so it progresses even if the returned
    /// completion is dropped.
    fn spawn(&self, task: impl Future<Output = ()> + 'static) -> Completion {
        let completion = task.boxed_local().shared();
        if let Err(err) = self.inner.spawner.spawn_local(completion.clone()) {
            tracing::error!(%err, "failed to spawn modal transition");
        }
        completion
    }
}

impl<D: Dom> Inner<D> {
    fn on_document_click(&self, target: &D::Target) {
        let outside = !self.dom.contains_target(&self.el, target);
        let active = self.lifecycle.borrow().is_active();
        tracing::trace!(outside, active, "document click");

        if outside && active {
            (self.on_click_outside)();
        }
    }

    /// Return the element to its original parent, or detach it, if it is
    /// still inside the container.
    fn restore_placement(&self) -> Result<(), DomError> {
        if !self.dom.contains(&self.container, &self.el) {
            return Ok(());
        }
        match &self.original_parent {
            Some(parent) => self.dom.append_child(parent, &self.el),
            None => match self.dom.parent(&self.el) {
                Some(parent) => self.dom.remove_child(&parent, &self.el),
                None => Ok(()),
            },
        }
    }

    /// Remove the container's active class unless an element inside it is
    /// still active.
    fn release_container(&self) {
        if !self
            .dom
            .has_descendant_with_class(&self.container, &self.classes.active_class)
        {
            self.log_failure(self.dom.remove_class(
                &self.container,
                &self.classes.container_active_class,
            ));
        }
    }

    fn log_failure(&self, result: Result<(), DomError>) {
        if let Err(err) = result {
            tracing::error!(%err, el = ?self.el, "modal DOM update failed");
        }
    }
}
