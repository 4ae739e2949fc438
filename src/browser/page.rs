//! Current page and in-app navigation.

use storefront_core::PageContext;

pub fn current_page() -> PageContext {
    let Some(window) = web_sys::window() else {
        return PageContext::default();
    };
    let url = window.location().href().unwrap_or_default();
    let (title, referrer) = window
        .document()
        .map(|d| (d.title(), d.referrer()))
        .unwrap_or_default();
    PageContext::new(url, title, referrer)
}

/// Value of a query parameter on the current URL
pub fn query_param(name: &str) -> Option<String> {
    current_page().query_params().remove(name)
}

/// Push a new path without reloading; returns the page context for tracking
pub fn navigate_to(path: &str, title: &str) -> PageContext {
    let previous = current_page();
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(path));
        }
        if let Some(document) = window.document() {
            document.set_title(title);
        }
    }
    let mut page = current_page();
    page.referrer = previous.url;
    page
}
