//! JavaScript API, mirroring the options object of the npm package:
//!
//! ```js
//! import init, { Modal, initLogging } from "modal";
//!
//! await init();
//! initLogging();
//! const modal = new Modal('<div class="my-modal">Hello</div>', {
//!     containerEl: document.querySelector(".modals"),
//!     onHide: () => console.log("hidden"),
//! });
//! await modal.show();
//! ```

use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Element;

use crate::{
    dom::web::WebDom,
    logs,
    modal::{Completion, Modal},
    options::{Content, ModalOptions},
    spawn::BrowserSpawner,
};

#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    logs::init_logging();
}

#[wasm_bindgen(js_name = Modal)]
pub struct JsModal {
    modal: Modal<WebDom>,
}

#[wasm_bindgen(js_class = Modal)]
impl JsModal {
    /// `el` is an element or an HTML string. Recognized options:
    /// `containerEl`, `onShow`, `onHide`, `onClickOutside`, `activeClass`,
    /// `containerActiveClass`.
    #[wasm_bindgen(constructor)]
    pub fn new(el: JsValue, options: Option<Object>) -> Result<JsModal, JsError> {
        let dom = WebDom::global()?;
        let content = match el.as_string() {
            Some(markup) => Content::Markup(markup),
            None => Content::Node(el.dyn_into::<Element>().map_err(|_| {
                JsError::new("`el` must be an Element or an HTML string")
            })?),
        };

        let options = match options {
            Some(options) => read_options(&options)?,
            None => ModalOptions::new(),
        };

        Ok(JsModal {
            modal: Modal::new(dom, content, options, BrowserSpawner)?,
        })
    }

    /// Resolves once the show transition completed.
    pub fn show(&self) -> Promise {
        to_promise(self.modal.show())
    }

    /// Resolves once the hide transition completed.
    pub fn hide(&self) -> Promise {
        to_promise(self.modal.hide())
    }

    pub fn destroy(&self) -> Result<(), JsError> {
        Ok(self.modal.destroy()?)
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.modal.is_active()
    }

    #[wasm_bindgen(getter)]
    pub fn el(&self) -> Element {
        self.modal.el().clone()
    }
}

fn read_options(options: &Object) -> Result<ModalOptions<Element>, JsError> {
    let mut modal_options = ModalOptions::new();

    if let Some(container) =
        property(options, "containerEl").and_then(|value| value.dyn_into::<Element>().ok())
    {
        modal_options = modal_options.container(container);
    }
    if let Some(class) = class_name(options, "activeClass")? {
        modal_options = modal_options.active_class(class);
    }
    if let Some(class) = class_name(options, "containerActiveClass")? {
        modal_options = modal_options.container_active_class(class);
    }
    if let Some(callback) = function(options, "onShow") {
        modal_options = modal_options.on_show(callback);
    }
    if let Some(callback) = function(options, "onHide") {
        modal_options = modal_options.on_hide(callback);
    }
    if let Some(callback) = function(options, "onClickOutside") {
        modal_options = modal_options.on_click_outside(callback);
    }

    Ok(modal_options)
}

/// The value stored under `key`, unless it is missing or `undefined`.
fn property(options: &Object, key: &str) -> Option<JsValue> {
    Reflect::get(options, &key.into())
        .ok()
        .filter(|value| !value.is_undefined())
}

/// A class name option, converted with `String(value)` the way
/// `classList.add` converts its arguments, so `null` becomes `"null"`.
fn class_name(options: &Object, key: &str) -> Result<Option<String>, JsError> {
    let Some(value) = property(options, key) else {
        return Ok(None);
    };
    if let Some(class) = value.as_string() {
        return Ok(Some(class));
    }

    let to_string = Reflect::get(&js_sys::global(), &"String".into())
        .ok()
        .and_then(|string| string.dyn_into::<Function>().ok())
        .ok_or_else(|| JsError::new("global `String` is not a function"))?;
    let class = to_string
        .call1(&JsValue::UNDEFINED, &value)
        .ok()
        .and_then(|class| class.as_string())
        .ok_or_else(|| JsError::new(&format!("`{key}` cannot be converted to a string")))?;
    Ok(Some(class))
}

/// Wrap the JS function stored under `key`, if there is one.
fn function(options: &Object, key: &str) -> Option<impl Fn() + 'static> {
    let function = property(options, key)?.dyn_into::<Function>().ok()?;
    let key = key.to_string();

    Some(move || {
        if let Err(err) = function.call0(&JsValue::NULL) {
            tracing::error!(?err, callback = %key, "modal callback threw");
        }
    })
}

fn to_promise(completion: Completion) -> Promise {
    future_to_promise(async move {
        completion.await;
        Ok(JsValue::UNDEFINED)
    })
}
