//! Customer Journey Entity
//!
//! Aggregates sessions for one browser across visits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attribution::AttributionData;
use super::session::SessionData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub page_views: u32,
    pub events: u32,
    pub conversions: u32,
    pub conversion_value: f64,
    pub source: String,
    pub medium: String,
    pub landing_page: Option<String>,
}

impl SessionSummary {
    pub fn from_session(session: &SessionData) -> Self {
        let attribution = session.attribution.as_ref();
        Self {
            session_id: session.session_id.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
            page_views: session.page_visits.len() as u32,
            events: session.events.len() as u32,
            conversions: session.conversions,
            conversion_value: session.conversion_value,
            source: attribution.map(|a| a.source().to_string()).unwrap_or_else(|| "direct".to_string()),
            medium: attribution.map(|a| a.medium().to_string()).unwrap_or_else(|| "none".to_string()),
            landing_page: session.page_visits.first().map(|v| v.path.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerJourney {
    pub anonymous_id: String,
    pub customer_id: Option<String>,
    pub sessions: Vec<SessionSummary>,
    pub total_conversions: u32,
    pub total_conversion_value: f64,
    pub first_attribution: Option<AttributionData>,
    pub last_attribution: Option<AttributionData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerJourney {
    pub fn new(anonymous_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            anonymous_id: anonymous_id.into(),
            customer_id: None,
            sessions: Vec::new(),
            total_conversions: 0,
            total_conversion_value: 0.0,
            first_attribution: None,
            last_attribution: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert or replace the summary for `session`, then recompute totals
    pub fn record_session(&mut self, session: &SessionData, now: DateTime<Utc>) {
        let summary = SessionSummary::from_session(session);
        match self.sessions.iter_mut().find(|s| s.session_id == summary.session_id) {
            Some(existing) => *existing = summary,
            None => self.sessions.push(summary),
        }

        if let Some(attribution) = &session.attribution {
            if self.first_attribution.is_none() {
                self.first_attribution = Some(attribution.clone());
            }
            self.last_attribution = Some(attribution.clone());
        }

        self.recompute_totals();
        self.updated_at = now;
    }

    fn recompute_totals(&mut self) {
        self.total_conversions = self.sessions.iter().map(|s| s.conversions).sum();
        self.total_conversion_value = self.sessions.iter().map(|s| s.conversion_value).sum();
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
