//! Meta Pixel (`fbq`) sink

use serde_json::{json, Map, Value};
use storefront_core::analytics::meta_standard_event;
use storefront_core::{AnalyticsEvent, AnalyticsSink, SinkEvent};
use wasm_bindgen::prelude::*;

use super::{global_function_exists, inject_script, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = fbq, catch)]
    fn fbq_init(cmd: &str, pixel_id: &str, user_data: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = fbq, catch)]
    fn fbq_track(cmd: &str, name: &str, params: &JsValue, options: &JsValue) -> Result<(), JsValue>;
}

/// Standard base code: defines the `fbq` queue and loads fbevents.js
const PIXEL_BOOTSTRAP: &str = "!function(f,b,e,v,n,t,s){if(f.fbq)return;n=f.fbq=function(){n.callMethod?\
n.callMethod.apply(n,arguments):n.queue.push(arguments)};if(!f._fbq)f._fbq=n;n.push=n;n.loaded=!0;\
n.version='2.0';n.queue=[];t=b.createElement(e);t.async=!0;t.src=v;s=b.getElementsByTagName(e)[0];\
s.parentNode.insertBefore(t,s)}(window,document,'script','https://connect.facebook.net/en_US/fbevents.js');";

pub struct MetaPixel {
    pixel_id: String,
}

impl MetaPixel {
    /// Inject the pixel base code and `fbq('init', id)`
    pub fn load(pixel_id: &str) -> Result<Self, JsValue> {
        if !global_function_exists("fbq") {
            inject_script(None, Some(PIXEL_BOOTSTRAP))?;
        }
        fbq_init("init", pixel_id, &JsValue::UNDEFINED)?;
        log::info!("meta pixel {} initialised", pixel_id);
        Ok(Self {
            pixel_id: pixel_id.to_string(),
        })
    }

    fn track(&self, event: &AnalyticsEvent, standard_name: Option<&str>) {
        let (cmd, name) = match standard_name {
            Some(standard) => ("track", standard),
            None => ("trackCustom", event.name.as_str()),
        };
        let params = to_js(&pixel_params(event));
        let options = to_js(&json!({ "eventID": event.event_id }));
        if let Err(e) = fbq_track(cmd, name, &params, &options) {
            log::warn!("meta pixel {}: {} failed: {:?}", self.pixel_id, name, e);
        }
    }
}

/// GA-style parameters reshaped for Meta (`content_ids`, `contents`)
fn pixel_params(event: &AnalyticsEvent) -> Map<String, Value> {
    let mut params = event.parameters.clone();
    if let Some(Value::Array(items)) = params.remove("items") {
        let ids: Vec<Value> = items.iter().filter_map(|i| i.get("item_id").cloned()).collect();
        let contents: Vec<Value> = items
            .iter()
            .map(|i| json!({ "id": i.get("item_id"), "quantity": i.get("quantity"), "item_price": i.get("price") }))
            .collect();
        params.insert("content_ids".into(), Value::Array(ids));
        params.insert("contents".into(), Value::Array(contents));
        params.insert("content_type".into(), "product".into());
    }
    if let Some(id) = params.remove("transaction_id") {
        params.insert("order_id".into(), id);
    }
    params
}

impl AnalyticsSink for MetaPixel {
    fn name(&self) -> &'static str {
        "meta_pixel"
    }

    fn is_loaded(&self) -> bool {
        global_function_exists("fbq")
    }

    fn send(&self, event: &SinkEvent<'_>) {
        match event {
            SinkEvent::PageView(e) => self.track(e, Some("PageView")),
            SinkEvent::Event(e) => {
                if let Some(user) = &e.user_data {
                    // Advanced matching: re-init with hashed identifiers
                    let matching = json!({ "em": user.sha256_email_address, "ph": user.sha256_phone_number });
                    let _ = fbq_init("init", &self.pixel_id, &to_js(&matching));
                }
                self.track(e, meta_standard_event(&e.name));
            }
            SinkEvent::AdsConversion { .. } => {}
        }
    }
}
