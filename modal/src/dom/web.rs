//! [`Dom`] over a live browser document.

use std::time::Duration;

use futures::{FutureExt, future::LocalBoxFuture};
use gloo_timers::future::sleep;
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};
use web_sys::{Document, Element, Event, Node};

use super::{ClickHandler, Dom, DomError};
use crate::lifecycle::parse_css_time;

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

#[derive(Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the global `window`.
    pub fn global() -> Result<Self, DomError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| DomError::Js("no global `document` exists".into()))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Longest computed `transition-duration` plus longest
    /// `transition-delay` of `element`.
    fn transition_time(&self, element: &Element) -> Duration {
        let Some(style) = self
            .document
            .default_view()
            .and_then(|window| window.get_computed_style(element).ok().flatten())
        else {
            return Duration::ZERO;
        };
        let duration = style
            .get_property_value("transition-duration")
            .unwrap_or_default();
        let delay = style
            .get_property_value("transition-delay")
            .unwrap_or_default();
        parse_css_time(&duration) + parse_css_time(&delay)
    }
}

/// A capture-phase click listener on the document. The closure is owned on
/// the Rust side; JS only keeps a pointer to it until the listener is
/// removed on drop.
pub struct WebListener {
    document: Document,
    closure: Closure<dyn Fn(Event)>,
}

impl Drop for WebListener {
    fn drop(&mut self) {
        if let Err(err) = self.document.remove_event_listener_with_callback_and_bool(
            "click",
            self.closure.as_ref().unchecked_ref(),
            true,
        ) {
            tracing::error!(err = %DomError::from(err), "failed to remove document click listener");
        }
    }
}

impl Dom for WebDom {
    type Node = Element;
    type Target = Option<Node>;
    type Listener = WebListener;

    fn body(&self) -> Result<Element, DomError> {
        self.document
            .body()
            .map(Element::from)
            .ok_or(DomError::NoBody)
    }

    fn parse_markup(&self, markup: &str) -> Result<Option<Element>, DomError> {
        let temp = self.document.create_element("div")?;
        temp.set_inner_html(markup.trim());
        let Some(element) = temp.first_element_child() else {
            return Ok(None);
        };
        temp.remove_child(&element)?;
        Ok(Some(element))
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &Node = node;
        ancestor.contains(Some(node))
    }

    fn contains_target(&self, ancestor: &Element, target: &Option<Node>) -> bool {
        ancestor.contains(target.as_ref())
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn remove_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.remove_child(child)?;
        Ok(())
    }

    fn add_class(&self, node: &Element, class: &str) -> Result<(), DomError> {
        node.class_list().add_1(class)?;
        Ok(())
    }

    fn remove_class(&self, node: &Element, class: &str) -> Result<(), DomError> {
        node.class_list().remove_1(class)?;
        Ok(())
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn has_descendant_with_class(&self, root: &Element, class: &str) -> bool {
        root.get_elements_by_class_name(class).length() > 0
    }

    fn on_document_click(
        &self,
        handler: ClickHandler<Option<Node>>,
    ) -> Result<WebListener, DomError> {
        let closure = Closure::<dyn Fn(Event)>::new(move |event: Event| {
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<Node>().ok());
            handler(&target);
        });

        self.document.add_event_listener_with_callback_and_bool(
            "click",
            closure.as_ref().unchecked_ref(),
            true,
        )?;

        Ok(WebListener {
            document: self.document.clone(),
            closure,
        })
    }

    fn wait_for_transition(&self, node: &Element) -> LocalBoxFuture<'static, ()> {
        let time = self.transition_time(node);
        tracing::trace!(?time, "waiting for transition");
        async move {
            if !time.is_zero() {
                sleep(time).await;
            }
        }
        .boxed_local()
    }
}
