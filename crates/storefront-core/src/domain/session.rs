//! Session Entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attribution::AttributionData;

/// Event names that count toward session conversions
pub const CONVERSION_EVENTS: &[&str] = &[
    "purchase",
    "sign_up",
    "complete_registration",
    "lead",
    "add_to_cart",
    "begin_checkout",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVisit {
    pub url: String,
    pub path: String,
    pub title: String,
    pub referrer: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Filled in when the next page visit starts
    pub time_on_page_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub page_url: Option<String>,
    pub parameters: Map<String, Value>,
    pub source: String,
    pub medium: String,
    pub campaign: Option<String>,
    pub traffic_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub attribution: Option<AttributionData>,
    pub page_visits: Vec<PageVisit>,
    pub events: Vec<TrackedEvent>,
    pub conversions: u32,
    pub conversion_value: f64,
}

impl SessionData {
    pub fn new(session_id: impl Into<String>, now: DateTime<Utc>, attribution: Option<AttributionData>) -> Self {
        Self {
            session_id: session_id.into(),
            start_time: now,
            last_activity: now,
            end_time: None,
            attribution,
            page_visits: Vec::new(),
            events: Vec::new(),
            conversions: 0,
            conversion_value: 0.0,
        }
    }

    /// Expired once older than `timeout`, measured from the session start
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.end_time.is_some() || now - self.start_time > timeout
    }

    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub fn is_conversion(event_name: &str) -> bool {
        CONVERSION_EVENTS.contains(&event_name)
    }
}
