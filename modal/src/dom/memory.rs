//! An in-memory document.
//!
//! Nodes live in an arena owned by [`MemoryDocument`] and are addressed by
//! [`NodeId`]. Click dispatch follows the browser's event flow: capture
//! listeners from the root down to the target's parent, every listener on the
//! target itself, then bubble listeners back up to the root. A handler
//! returning [`Propagation::Stop`] ends the flow once the listeners of the
//! current node have run.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use futures::{FutureExt, future::LocalBoxFuture};

use super::{
    ClickHandler, Dom, DomError,
    markup::{self, MarkupElement, MarkupNode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// What a listener sees while a click travels through the tree.
#[derive(Debug, Clone, Copy)]
pub struct ClickEvent {
    /// The node that was clicked.
    pub target: NodeId,
    /// The node whose listener is running.
    pub current: NodeId,
}

type Handler = Rc<dyn Fn(&ClickEvent) -> Propagation>;

#[derive(Debug)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        classes: Vec<String>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Registration {
    id: u64,
    node: NodeId,
    phase: Phase,
    handler: Handler,
}

struct Arena {
    nodes: Vec<NodeData>,
    listeners: Vec<Registration>,
    next_listener: u64,
    document: NodeId,
    body: NodeId,
}

impl Arena {
    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|id| *id != child);
        }
    }

    fn classes_mut(&mut self, id: NodeId) -> Result<&mut Vec<String>, DomError> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element { classes, .. } => Ok(classes),
            _ => Err(DomError::NotAnElement),
        }
    }

    fn build(&mut self, element: MarkupElement) -> NodeId {
        let classes = element.classes().map(str::to_string).collect();
        let attributes = element
            .attributes
            .into_iter()
            .filter(|(name, _)| name != "class")
            .collect();
        let id = self.insert(NodeKind::Element {
            tag: element.tag,
            attributes,
            classes,
        });

        for child in element.children {
            let child_id = match child {
                MarkupNode::Element(element) => self.build(element),
                MarkupNode::Text(text) => self.insert(NodeKind::Text(text)),
            };
            self.node_mut(child_id).parent = Some(id);
            self.node_mut(id).children.push(child_id);
        }

        id
    }
}

/// A shared handle to an in-memory document. Clones refer to the same tree.
#[derive(Clone)]
pub struct MemoryDocument {
    arena: Rc<RefCell<Arena>>,
}

/// Keeps a listener registered on a [`MemoryDocument`] until dropped.
pub struct MemoryListener {
    arena: Weak<RefCell<Arena>>,
    id: u64,
}

impl Drop for MemoryListener {
    fn drop(&mut self) {
        if let Some(arena) = self.arena.upgrade() {
            arena
                .borrow_mut()
                .listeners
                .retain(|registration| registration.id != self.id);
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document holding an empty `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut arena = Arena {
            nodes: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            document: NodeId(0),
            body: NodeId(0),
        };
        let document = arena.insert(NodeKind::Document);
        let html = arena.insert(element_kind("html"));
        let body = arena.insert(element_kind("body"));
        arena.node_mut(html).parent = Some(document);
        arena.node_mut(document).children.push(html);
        arena.node_mut(body).parent = Some(html);
        arena.node_mut(html).children.push(body);
        arena.document = document;
        arena.body = body;

        Self {
            arena: Rc::new(RefCell::new(arena)),
        }
    }

    /// The document node itself, the root of every event path.
    pub fn document_node(&self) -> NodeId {
        self.arena.borrow().document
    }

    pub fn body_node(&self) -> NodeId {
        self.arena.borrow().body
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.arena
            .borrow_mut()
            .insert(element_kind(&tag.to_ascii_lowercase()))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.arena
            .borrow_mut()
            .insert(NodeKind::Text(text.to_string()))
    }

    /// Lowercased tag name, or `None` for text and document nodes.
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.arena.borrow().node(node).kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.arena.borrow().node(node).kind {
            NodeKind::Element { classes, .. } if name == "class" => {
                Some(classes.join(" "))
            }
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    pub fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        if name == "class" {
            *arena.classes_mut(node)? =
                value.split_whitespace().map(str::to_string).collect();
            return Ok(());
        }
        match &mut arena.node_mut(node).kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(key, _)| key == name) {
                    Some((_, existing)) => *existing = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            _ => Err(DomError::NotAnElement),
        }
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        match &self.arena.borrow().node(node).kind {
            NodeKind::Element { classes, .. } => classes.clone(),
            _ => Vec::new(),
        }
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena.borrow().node(node).children.clone()
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let arena = self.arena.borrow();
        let mut text = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let data = arena.node(id);
            if let NodeKind::Text(content) = &data.kind {
                text.push_str(content);
            }
            stack.extend(data.children.iter().rev());
        }
        text
    }

    /// Descendants of `root` (excluding `root`) carrying `class`, in document
    /// order.
    pub fn elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let arena = self.arena.borrow();
        let mut found = Vec::new();
        let mut stack = arena
            .node(root)
            .children
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();
        while let Some(id) = stack.pop() {
            let data = arena.node(id);
            if let NodeKind::Element { classes, .. } = &data.kind {
                if classes.iter().any(|c| c == class) {
                    found.push(id);
                }
            }
            stack.extend(data.children.iter().rev());
        }
        found
    }

    /// Register a click listener on `node`. It stays registered until the
    /// returned guard is dropped.
    pub fn add_click_listener<F>(
        &self,
        node: NodeId,
        phase: Phase,
        handler: F,
    ) -> MemoryListener
    where
        F: 'static + Fn(&ClickEvent) -> Propagation,
    {
        let mut arena = self.arena.borrow_mut();
        let id = arena.next_listener;
        arena.next_listener += 1;
        arena.listeners.push(Registration {
            id,
            node,
            phase,
            handler: Rc::new(handler),
        });

        MemoryListener {
            arena: Rc::downgrade(&self.arena),
            id,
        }
    }

    /// Number of listeners currently registered anywhere in the document.
    pub fn listener_count(&self) -> usize {
        self.arena.borrow().listeners.len()
    }

    /// Dispatch a click at `target`. Returns `false` if a listener stopped
    /// propagation.
    pub fn dispatch_click(&self, target: NodeId) -> bool {
        let path = {
            let arena = self.arena.borrow();
            let mut path = vec![target];
            let mut current = arena.node(target).parent;
            while let Some(id) = current {
                path.push(id);
                current = arena.node(id).parent;
            }
            path.reverse();
            path
        };
        tracing::trace!(?target, depth = path.len(), "dispatching click");

        let (ancestors, _) = path.split_at(path.len() - 1);

        for node in ancestors {
            if self.run_listeners(target, *node, Some(Phase::Capture))
                == Propagation::Stop
            {
                return false;
            }
        }

        if self.run_listeners(target, target, None) == Propagation::Stop {
            return false;
        }

        for node in ancestors.iter().rev() {
            if self.run_listeners(target, *node, Some(Phase::Bubble))
                == Propagation::Stop
            {
                return false;
            }
        }

        true
    }

    /// Run the listeners of one node. The registry is snapshotted first so
    /// handlers may add or drop listeners; a listener dropped before its turn
    /// is skipped.
    fn run_listeners(
        &self,
        target: NodeId,
        node: NodeId,
        phase: Option<Phase>,
    ) -> Propagation {
        let snapshot = self
            .arena
            .borrow()
            .listeners
            .iter()
            .filter(|registration| {
                registration.node == node
                    && phase.is_none_or(|phase| registration.phase == phase)
            })
            .map(|registration| (registration.id, Rc::clone(&registration.handler)))
            .collect::<Vec<_>>();

        let event = ClickEvent {
            target,
            current: node,
        };
        let mut propagation = Propagation::Continue;
        for (id, handler) in snapshot {
            let registered = self
                .arena
                .borrow()
                .listeners
                .iter()
                .any(|registration| registration.id == id);
            if registered && handler(&event) == Propagation::Stop {
                propagation = Propagation::Stop;
            }
        }
        propagation
    }
}

fn element_kind(tag: &str) -> NodeKind {
    NodeKind::Element {
        tag: tag.to_string(),
        attributes: Vec::new(),
        classes: Vec::new(),
    }
}

impl Dom for MemoryDocument {
    type Node = NodeId;
    type Target = NodeId;
    type Listener = MemoryListener;

    fn body(&self) -> Result<NodeId, DomError> {
        Ok(self.body_node())
    }

    fn parse_markup(&self, markup: &str) -> Result<Option<NodeId>, DomError> {
        Ok(markup::first_element(markup)
            .map(|element| self.arena.borrow_mut().build(element)))
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.arena.borrow().node(*node).parent
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.arena.borrow().contains(*ancestor, *node)
    }

    fn contains_target(&self, ancestor: &NodeId, target: &NodeId) -> bool {
        self.contains(ancestor, target)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        if arena.contains(*child, *parent)
            || matches!(arena.node(*parent).kind, NodeKind::Text(_))
            || matches!(arena.node(*child).kind, NodeKind::Document)
        {
            return Err(DomError::HierarchyRequest);
        }
        arena.detach(*child);
        arena.node_mut(*child).parent = Some(*parent);
        arena.node_mut(*parent).children.push(*child);
        Ok(())
    }

    fn remove_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        if arena.node(*child).parent != Some(*parent) {
            return Err(DomError::NotFound);
        }
        arena.detach(*child);
        Ok(())
    }

    fn add_class(&self, node: &NodeId, class: &str) -> Result<(), DomError> {
        let mut arena = self.arena.borrow_mut();
        let classes = arena.classes_mut(*node)?;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&self, node: &NodeId, class: &str) -> Result<(), DomError> {
        self.arena
            .borrow_mut()
            .classes_mut(*node)?
            .retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.classes(*node).iter().any(|c| c == class)
    }

    fn has_descendant_with_class(&self, root: &NodeId, class: &str) -> bool {
        !self.elements_by_class_name(*root, class).is_empty()
    }

    fn on_document_click(
        &self,
        handler: ClickHandler<NodeId>,
    ) -> Result<MemoryListener, DomError> {
        Ok(self.add_click_listener(
            self.document_node(),
            Phase::Capture,
            move |event| {
                handler(&event.target);
                Propagation::Continue
            },
        ))
    }

    fn wait_for_transition(&self, _node: &NodeId) -> LocalBoxFuture<'static, ()> {
        // No stylesheet, so no transition to wait for
        futures::future::ready(()).boxed_local()
    }
}
