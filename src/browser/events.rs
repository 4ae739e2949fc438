//! Cart change notification over a DOM custom event.

use storefront_core::{CartItem, CartNotifier};
use wasm_bindgen::prelude::*;

pub const CART_UPDATED_EVENT: &str = "cartUpdated";

/// Fires `cartUpdated` on `window` (detail = item count) and chimes on add
#[derive(Debug, Clone, Copy, Default)]
pub struct DomCartNotifier;

impl CartNotifier for DomCartNotifier {
    fn cart_changed(&self, items: &[CartItem]) {
        let count: u32 = items.iter().map(|i| i.quantity).sum();
        if let Err(e) = dispatch(count) {
            log::warn!("cart: failed to dispatch {}: {:?}", CART_UPDATED_EVENT, e);
        }
    }

    fn item_added(&self, _item: &CartItem) {
        if let Err(e) = super::play_add_to_cart_tone() {
            log::debug!("cart: tone unavailable: {:?}", e);
        }
    }
}

fn dispatch(count: u32) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&JsValue::from(count));
    let event = web_sys::CustomEvent::new_with_event_init_dict(CART_UPDATED_EVENT, &init)?;
    window.dispatch_event(&event)?;
    Ok(())
}

/// Listen for cart changes for the lifetime of the page
pub fn on_cart_updated(mut handler: impl FnMut(u32) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
        let count = ev
            .dyn_ref::<web_sys::CustomEvent>()
            .and_then(|ce| ce.detail().as_f64())
            .unwrap_or(0.0);
        handler(count as u32);
    });
    if window
        .add_event_listener_with_callback(CART_UPDATED_EVENT, cb.as_ref().unchecked_ref())
        .is_ok()
    {
        cb.forget();
    }
}
