//! Browser Bindings
//!
//! Thin wrappers over `web_sys` and the vendor globals.

mod audio;
mod events;
mod gtag;
mod page;
mod pixel;
mod storage;

pub use audio::play_add_to_cart_tone;
pub use events::{on_cart_updated, DomCartNotifier, CART_UPDATED_EVENT};
pub use gtag::GoogleTag;
pub use page::{current_page, navigate_to, query_param};
pub use pixel::MetaPixel;
pub use storage::{BrowserStorage, ADMIN_TOKEN_KEY};

use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Serialize to a plain JS object (maps become objects, not `Map`)
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED)
}

/// Blocking browser dialog used for checkout and admin failures
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Append a `<script>` to `<head>`: external when `src` is set, inline otherwise
pub(crate) fn inject_script(src: Option<&str>, inline: Option<&str>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let script: web_sys::HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    if let Some(src) = src {
        script.set_async(true);
        script.set_src(src);
    }
    if let Some(code) = inline {
        script.set_text(code)?;
    }
    let head = document.head().ok_or_else(|| JsValue::from_str("no <head>"))?;
    head.append_child(&script)?;
    Ok(())
}

/// `typeof window[name] === "function"`
pub(crate) fn global_function_exists(name: &str) -> bool {
    web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str(name)).ok())
        .is_some_and(|v| v.is_function())
}
