//! Attribution Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrafficType {
    Paid,
    Organic,
    Social,
    Email,
    Referral,
    #[default]
    Direct,
}

impl TrafficType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficType::Paid => "paid",
            TrafficType::Organic => "organic",
            TrafficType::Social => "social",
            TrafficType::Email => "email",
            TrafficType::Referral => "referral",
            TrafficType::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdPlatform {
    Google,
    Meta,
    #[serde(rename = "tiktok")]
    TikTok,
    Microsoft,
}

impl AdPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdPlatform::Google => "google",
            AdPlatform::Meta => "meta",
            AdPlatform::TikTok => "tiktok",
            AdPlatform::Microsoft => "microsoft",
        }
    }
}

/// The touchpoint credited for the visitor's conversions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionData {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,

    pub gclid: Option<String>,
    pub gbraid: Option<String>,
    pub wbraid: Option<String>,
    pub fbclid: Option<String>,
    pub ttclid: Option<String>,
    pub msclkid: Option<String>,

    pub referrer: Option<String>,
    pub landing_page: String,
    pub traffic_type: TrafficType,
    pub platform: Option<AdPlatform>,

    /// When this touchpoint was captured; the window runs from here
    pub captured_at: DateTime<Utc>,
    pub first_visit: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    pub visit_count: u32,
    /// Visit id of the page load that last touched this record
    pub session_id: String,
}

impl AttributionData {
    /// Record with no touchpoint fields set
    pub fn blank(landing_page: impl Into<String>, now: DateTime<Utc>, session_id: impl Into<String>) -> Self {
        Self {
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
            gclid: None,
            gbraid: None,
            wbraid: None,
            fbclid: None,
            ttclid: None,
            msclkid: None,
            referrer: None,
            landing_page: landing_page.into(),
            traffic_type: TrafficType::Direct,
            platform: None,
            captured_at: now,
            first_visit: now,
            last_visit: now,
            visit_count: 1,
            session_id: session_id.into(),
        }
    }

    /// Any ad-platform click id present
    pub fn click_id(&self) -> Option<(&'static str, &str)> {
        [
            ("gclid", &self.gclid),
            ("gbraid", &self.gbraid),
            ("wbraid", &self.wbraid),
            ("fbclid", &self.fbclid),
            ("ttclid", &self.ttclid),
            ("msclkid", &self.msclkid),
        ]
        .into_iter()
        .find_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    }

    pub fn source(&self) -> &str {
        self.utm_source.as_deref().unwrap_or("direct")
    }

    pub fn medium(&self) -> &str {
        self.utm_medium.as_deref().unwrap_or("none")
    }

    /// Meta `_fbc` cookie format: `fb.1.<ms timestamp>.<fbclid>`
    pub fn fbc(&self) -> Option<String> {
        self.fbclid
            .as_ref()
            .map(|id| format!("fb.1.{}.{}", self.captured_at.timestamp_millis(), id))
    }
}
