//! Google tag (`gtag`) sink: GA4 events and Google Ads conversions

use serde_json::json;
use storefront_core::{AnalyticsSink, SinkEvent, TrackingConfig};
use wasm_bindgen::prelude::*;

use super::{global_function_exists, inject_script, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = gtag, catch)]
    fn gtag_call(cmd: &str, target: &str, params: &JsValue) -> Result<(), JsValue>;
}

pub struct GoogleTag {
    measurement_id: Option<String>,
}

impl GoogleTag {
    /// Load gtag.js for the first configured id and `config` each id
    pub fn load(config: &TrackingConfig) -> Result<Option<Self>, JsValue> {
        let ids: Vec<&str> = [config.ga4_measurement_id.as_deref(), config.google_ads_id.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let Some(primary) = ids.first() else {
            return Ok(None);
        };

        if !global_function_exists("gtag") {
            inject_script(Some(&format!("https://www.googletagmanager.com/gtag/js?id={}", primary)), None)?;
            inject_script(
                None,
                Some("window.dataLayer=window.dataLayer||[];function gtag(){dataLayer.push(arguments);}gtag('js',new Date());"),
            )?;
        }
        if let Some(ga4) = &config.ga4_measurement_id {
            // Page views are sent explicitly on every in-app navigation
            gtag_call("config", ga4, &to_js(&json!({ "send_page_view": false })))?;
        }
        if let Some(ads) = &config.google_ads_id {
            gtag_call("config", ads, &to_js(&json!({ "allow_enhanced_conversions": true })))?;
        }
        log::info!("google tag initialised for {}", ids.join(", "));

        Ok(Some(Self {
            measurement_id: config.ga4_measurement_id.clone(),
        }))
    }

    fn event(&self, name: &str, params: &JsValue) {
        if let Err(e) = gtag_call("event", name, params) {
            log::warn!("gtag: {} failed: {:?}", name, e);
        }
    }
}

impl AnalyticsSink for GoogleTag {
    fn name(&self) -> &'static str {
        "google_tag"
    }

    fn is_loaded(&self) -> bool {
        global_function_exists("gtag")
    }

    fn send(&self, event: &SinkEvent<'_>) {
        match event {
            SinkEvent::PageView(e) | SinkEvent::Event(e) => {
                if self.measurement_id.is_none() {
                    return;
                }
                if let Some(user) = &e.user_data {
                    let _ = gtag_call("set", "user_data", &to_js(user));
                }
                let mut params = e.parameters.clone();
                params.insert("event_id".into(), e.event_id.clone().into());
                self.event(&e.name, &to_js(&params));
            }
            SinkEvent::AdsConversion { event, send_to } => {
                let params = json!({
                    "send_to": send_to,
                    "value": event.value(),
                    "currency": event.parameters.get("currency"),
                    "transaction_id": event.parameters.get("transaction_id"),
                });
                self.event("conversion", &to_js(&params));
            }
        }
    }
}
