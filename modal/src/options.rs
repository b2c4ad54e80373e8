use std::rc::Rc;

use serde::Deserialize;

use crate::modal::ModalError;

/// A user callback fired by the modal.
pub type Callback = Rc<dyn Fn()>;

/// CSS class names the modal toggles.
///
/// Field names follow the JS option names so class names can be read
/// straight from a JSON options object; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModalClasses {
    /// Added to the modal's element while it is shown.
    pub active_class: String,
    /// Added to the container while at least one of its modals is shown.
    pub container_active_class: String,
}

impl Default for ModalClasses {
    fn default() -> Self {
        Self {
            active_class: "modal-active".to_string(),
            container_active_class: "modal-container-active".to_string(),
        }
    }
}

impl ModalClasses {
    pub fn from_json(json: &str) -> Result<Self, ModalError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where the modal's element comes from.
#[derive(Debug, Clone)]
pub enum Content<N> {
    /// An existing element, possibly already attached somewhere.
    Node(N),
    /// Markup whose first element becomes the modal's element.
    Markup(String),
}

impl<N> From<&str> for Content<N> {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl<N> From<String> for Content<N> {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

/// Construction options. Everything is optional: the container defaults to
/// the document body and `on_click_outside` defaults to hiding the modal.
pub struct ModalOptions<N> {
    pub container: Option<N>,
    pub classes: ModalClasses,
    pub on_show: Option<Callback>,
    pub on_hide: Option<Callback>,
    pub on_click_outside: Option<Callback>,
}

impl<N> Default for ModalOptions<N> {
    fn default() -> Self {
        Self {
            container: None,
            classes: ModalClasses::default(),
            on_show: None,
            on_hide: None,
            on_click_outside: None,
        }
    }
}

impl<N> ModalOptions<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(mut self, container: N) -> Self {
        self.container = Some(container);
        self
    }

    pub fn classes(mut self, classes: ModalClasses) -> Self {
        self.classes = classes;
        self
    }

    pub fn active_class(mut self, class: impl Into<String>) -> Self {
        self.classes.active_class = class.into();
        self
    }

    pub fn container_active_class(mut self, class: impl Into<String>) -> Self {
        self.classes.container_active_class = class.into();
        self
    }

    /// Fired once a show transition has completed.
    pub fn on_show(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_show = Some(Rc::new(callback));
        self
    }

    /// Fired once a hide transition has completed.
    pub fn on_hide(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_hide = Some(Rc::new(callback));
        self
    }

    /// Replaces the default hide on clicks outside the modal.
    pub fn on_click_outside(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_click_outside = Some(Rc::new(callback));
        self
    }
}
