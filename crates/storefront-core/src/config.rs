//! Storefront Configuration

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which touchpoint keeps the credit for a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributionModel {
    FirstClick,
    #[default]
    LastClick,
}

impl AttributionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionModel::FirstClick => "first_click",
            AttributionModel::LastClick => "last_click",
        }
    }
}

/// Anything other than `first_click` overwrites with the newest touchpoint
impl FromStr for AttributionModel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "first_click" | "first-click" | "first" => AttributionModel::FirstClick,
            _ => AttributionModel::LastClick,
        })
    }
}

/// Attribution, session and ad-vendor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Days a captured touchpoint stays eligible for credit
    pub attribution_window_days: i64,
    pub attribution_model: AttributionModel,
    /// Maximum session age before a new one starts
    pub session_timeout_minutes: i64,
    pub meta_pixel_id: Option<String>,
    pub ga4_measurement_id: Option<String>,
    /// Google Ads account, e.g. `AW-123456789`
    pub google_ads_id: Option<String>,
    pub google_ads_purchase_label: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            attribution_window_days: 30,
            attribution_model: AttributionModel::LastClick,
            session_timeout_minutes: 30,
            meta_pixel_id: None,
            ga4_measurement_id: None,
            google_ads_id: None,
            google_ads_purchase_label: None,
        }
    }
}

impl TrackingConfig {
    /// `send_to` target for Google Ads purchase conversions
    pub fn google_ads_purchase_target(&self) -> Option<String> {
        match (&self.google_ads_id, &self.google_ads_purchase_label) {
            (Some(id), Some(label)) if !id.is_empty() && !label.is_empty() => Some(format!("{}/{}", id, label)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub api_base_url: String,
    pub currency: String,
    /// Orders at or above this subtotal ship free
    pub free_shipping_threshold: f64,
    /// Standard courier charge when no rate quote is chosen
    pub flat_shipping_rate: f64,
    /// Simulated payments and order placement
    pub test_mode: bool,
    pub tracking: TrackingConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: "/api".to_string(),
            currency: "INR".to_string(),
            free_shipping_threshold: 999.0,
            flat_shipping_rate: 79.0,
            test_mode: false,
            tracking: TrackingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_overwrites() {
        assert_eq!("first_click".parse::<AttributionModel>(), Ok(AttributionModel::FirstClick));
        assert_eq!(" first-click ".parse::<AttributionModel>(), Ok(AttributionModel::FirstClick));
        assert_eq!("linear".parse::<AttributionModel>(), Ok(AttributionModel::LastClick));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: StorefrontConfig = serde_json::from_str(r#"{"test_mode":true,"tracking":{"attribution_model":"first_click"}}"#).unwrap();
        assert!(cfg.test_mode);
        assert_eq!(cfg.tracking.attribution_model, AttributionModel::FirstClick);
        assert_eq!(cfg.tracking.session_timeout_minutes, 30);
        assert_eq!(cfg.currency, "INR");
    }

    #[test]
    fn test_google_ads_target() {
        let mut cfg = TrackingConfig::default();
        assert_eq!(cfg.google_ads_purchase_target(), None);
        cfg.google_ads_id = Some("AW-1".into());
        cfg.google_ads_purchase_label = Some("abc".into());
        assert_eq!(cfg.google_ads_purchase_target().as_deref(), Some("AW-1/abc"));
    }
}
