//! A modal overlay widget for browser documents.
//!
//! A [`Modal`] appends its element into a container (the document body by
//! default), toggles CSS classes to show and hide it, and calls back when
//! the user clicks outside of it. Visual transitions are delegated to a
//! [`Lifecycle`]; the document is reached through the [`Dom`] trait, so the
//! same widget runs against a browser ([`dom::web::WebDom`]) or an in-memory
//! document ([`dom::memory::MemoryDocument`]).
//!
//! ```rust,ignore
//! use futures::executor::LocalPool;
//! use modal::{Content, Modal, ModalOptions, dom::memory::MemoryDocument};
//!
//! let mut pool = LocalPool::new();
//! let doc = MemoryDocument::new();
//! let modal = Modal::new(
//!     doc.clone(),
//!     Content::from(r#"<div class="dialog">Hello</div>"#),
//!     ModalOptions::new().on_hide(|| tracing::info!("closed")),
//!     pool.spawner(),
//! )?;
//!
//! modal.show();
//! pool.run_until_stalled();
//! doc.dispatch_click(doc.body_node()); // outside, hides the modal
//! ```

pub mod bindings;
pub mod dom;
pub mod lifecycle;
pub mod logs;
mod modal;
mod options;
pub mod spawn;

pub use dom::{Dom, DomError};
pub use lifecycle::{Lifecycle, TransitionLifecycle};
pub use modal::{Completion, Modal, ModalError};
pub use options::{Callback, Content, ModalClasses, ModalOptions};
