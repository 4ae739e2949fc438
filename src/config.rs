//! Build-time Configuration
//!
//! `StorefrontConfig` assembled from `STOREFRONT_*` environment variables at
//! compile time (trunk / cargo build), falling back to defaults.

use std::sync::OnceLock;

use storefront_core::{StorefrontConfig, TrackingConfig};

static CONFIG: OnceLock<StorefrontConfig> = OnceLock::new();

pub fn get() -> &'static StorefrontConfig {
    CONFIG.get_or_init(from_env)
}

fn from_env() -> StorefrontConfig {
    let defaults = StorefrontConfig::default();
    let tracking_defaults = TrackingConfig::default();
    let non_empty = |v: Option<&'static str>| v.filter(|s| !s.trim().is_empty()).map(str::to_string);

    StorefrontConfig {
        api_base_url: non_empty(option_env!("STOREFRONT_API_URL")).unwrap_or(defaults.api_base_url),
        currency: non_empty(option_env!("STOREFRONT_CURRENCY")).unwrap_or(defaults.currency),
        free_shipping_threshold: option_env!("STOREFRONT_FREE_SHIPPING")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.free_shipping_threshold),
        flat_shipping_rate: option_env!("STOREFRONT_FLAT_SHIPPING")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.flat_shipping_rate),
        test_mode: matches!(option_env!("STOREFRONT_TEST_MODE"), Some("1" | "true")),
        tracking: TrackingConfig {
            attribution_window_days: option_env!("STOREFRONT_ATTRIBUTION_WINDOW_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(tracking_defaults.attribution_window_days),
            attribution_model: option_env!("STOREFRONT_ATTRIBUTION_MODEL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(tracking_defaults.attribution_model),
            session_timeout_minutes: tracking_defaults.session_timeout_minutes,
            meta_pixel_id: non_empty(option_env!("STOREFRONT_META_PIXEL_ID")),
            ga4_measurement_id: non_empty(option_env!("STOREFRONT_GA4_ID")),
            google_ads_id: non_empty(option_env!("STOREFRONT_GOOGLE_ADS_ID")),
            google_ads_purchase_label: non_empty(option_env!("STOREFRONT_GOOGLE_ADS_PURCHASE_LABEL")),
        },
    }
}

/// reqwest needs absolute URLs; a relative base is resolved against the page origin
pub fn absolute_api_base(base: &str, origin: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("{}/{}", origin.trim_end_matches('/'), base.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_api_base() {
        assert_eq!(absolute_api_base("/api/", "https://shop.test"), "https://shop.test/api");
        assert_eq!(absolute_api_base("https://api.shop.test/v1", "https://shop.test"), "https://api.shop.test/v1");
    }
}
