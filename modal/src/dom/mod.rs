//! The document boundary the modal is written against.
//!
//! [`Dom`] covers exactly the operations the modal needs: tree mutation,
//! class lists, containment checks, a capture-phase document click listener,
//! and a way to wait for an element's CSS transition. [`memory`] provides an
//! in-memory document for tests and headless use, [`web`] drives a real
//! browser document through `web_sys`.

pub mod markup;
pub mod memory;
pub mod web;

use futures::future::LocalBoxFuture;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// A browser API call threw, containing the stringified exception.
    #[error("DOM operation failed: {0}")]
    Js(String),
    #[error("Node is not a child of the given parent")]
    NotFound,
    /// Inserting the node would make it its own ancestor.
    #[error("Node cannot be inserted at this point in the hierarchy")]
    HierarchyRequest,
    #[error("Document has no body")]
    NoBody,
    #[error("Node is not an element")]
    NotAnElement,
}

/// Handler invoked for every click seen by a document-level listener.
pub type ClickHandler<T> = Box<dyn Fn(&T)>;

/// A document the modal can manipulate.
///
/// Implementations are cheap handles (clone shares the same document).
pub trait Dom: Clone + 'static {
    /// An element in the document.
    type Node: Clone + PartialEq + std::fmt::Debug + 'static;

    /// Whatever a click event reports as its target. Not necessarily an
    /// element (text nodes, the document itself).
    type Target: 'static;

    /// Keeps a document click listener registered. Dropping it unregisters
    /// the listener.
    type Listener: 'static;

    fn body(&self) -> Result<Self::Node, DomError>;

    /// Parses a markup fragment and returns its first top-level element,
    /// detached from any parent. `None` if the markup holds no element.
    fn parse_markup(&self, markup: &str) -> Result<Option<Self::Node>, DomError>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Same as [`Dom::contains`] for an event target.
    fn contains_target(&self, ancestor: &Self::Node, target: &Self::Target) -> bool;

    /// Appends `child` to `parent`, first detaching it from wherever it was.
    fn append_child(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
    ) -> Result<(), DomError>;

    fn remove_child(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
    ) -> Result<(), DomError>;

    fn add_class(&self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn remove_class(&self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Whether any descendant of `root` (excluding `root`) carries `class`.
    fn has_descendant_with_class(&self, root: &Self::Node, class: &str) -> bool;

    /// Registers a click listener on the document in the capture phase, so it
    /// runs before any handler on the path can stop propagation.
    fn on_document_click(
        &self,
        handler: ClickHandler<Self::Target>,
    ) -> Result<Self::Listener, DomError>;

    /// Resolves once the CSS transition currently applied to `node` has had
    /// time to finish.
    fn wait_for_transition(&self, node: &Self::Node) -> LocalBoxFuture<'static, ()>;
}
