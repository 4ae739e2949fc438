//! Session Tracker
//!
//! One active session per browser tab group (session storage) and a
//! customer journey accumulated across sessions (local storage).

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::config::TrackingConfig;
use crate::domain::{new_id, AttributionData, CustomerJourney, PageVisit, SessionData, TrackedEvent};
use crate::page::PageContext;
use crate::storage::{load_json, save_json, KeyValueStore, JOURNEY_KEY, SESSION_KEY};

pub struct SessionTracker<S: KeyValueStore, L: KeyValueStore, C: Clock> {
    session_store: S,
    local_store: L,
    clock: C,
    timeout: Duration,
    session: Option<SessionData>,
    journey: CustomerJourney,
}

impl<S: KeyValueStore, L: KeyValueStore, C: Clock> SessionTracker<S, L, C> {
    pub fn new(session_store: S, local_store: L, clock: C, config: &TrackingConfig) -> Self {
        let now = clock.now();
        let session = load_json(&session_store, SESSION_KEY);
        let journey = load_json(&local_store, JOURNEY_KEY).unwrap_or_else(|| {
            let journey = CustomerJourney::new(new_id("anon"), now);
            log::info!("session: new visitor {}", journey.anonymous_id);
            journey
        });

        Self {
            session_store,
            local_store,
            clock,
            timeout: Duration::minutes(config.session_timeout_minutes),
            session,
            journey,
        }
    }

    /// Active session, starting a new one if none exists or the current one expired
    pub fn current_session(&mut self, attribution: Option<&AttributionData>) -> &SessionData {
        let now = self.clock.now();
        let started = self.ensure_session(attribution, now);
        if started {
            self.sync(now);
        }
        // ensure_session always leaves a session in place
        self.session.get_or_insert_with(|| SessionData::new(new_id("sess"), now, attribution.cloned()))
    }

    /// Close timing on the previous page and append a visit
    pub fn track_page_visit(&mut self, page: &PageContext, attribution: Option<&AttributionData>) -> PageVisit {
        let now = self.clock.now();
        self.ensure_session(attribution, now);

        let visit = PageVisit {
            url: page.url.clone(),
            path: page.path(),
            title: page.title.clone(),
            referrer: (!page.referrer.is_empty()).then(|| page.referrer.clone()),
            timestamp: now,
            time_on_page_ms: None,
        };

        if let Some(session) = self.session.as_mut() {
            if let Some(previous) = session.page_visits.last_mut() {
                if previous.time_on_page_ms.is_none() {
                    previous.time_on_page_ms = Some((now - previous.timestamp).num_milliseconds());
                }
            }
            session.page_visits.push(visit.clone());
            session.last_activity = now;
        }
        self.sync(now);
        visit
    }

    /// Append an attributed event; conversion events bump the session counters
    pub fn track_event(
        &mut self,
        name: &str,
        parameters: Map<String, Value>,
        attribution: Option<&AttributionData>,
    ) -> TrackedEvent {
        let now = self.clock.now();
        self.ensure_session(attribution, now);

        let snapshot = attribution.or_else(|| self.session.as_ref().and_then(|s| s.attribution.as_ref()));
        let event = TrackedEvent {
            name: name.to_string(),
            timestamp: now,
            page_url: self
                .session
                .as_ref()
                .and_then(|s| s.page_visits.last())
                .map(|v| v.url.clone()),
            source: snapshot.map(|a| a.source().to_string()).unwrap_or_else(|| "direct".to_string()),
            medium: snapshot.map(|a| a.medium().to_string()).unwrap_or_else(|| "none".to_string()),
            campaign: snapshot.and_then(|a| a.utm_campaign.clone()),
            traffic_type: snapshot.map(|a| a.traffic_type.as_str()).unwrap_or("direct").to_string(),
            parameters,
        };

        if let Some(session) = self.session.as_mut() {
            if SessionData::is_conversion(name) {
                session.conversions += 1;
                session.conversion_value += event.parameters.get("value").and_then(Value::as_f64).unwrap_or(0.0);
                log::info!("session: conversion {} ({} this session)", name, session.conversions);
            }
            session.events.push(event.clone());
            session.last_activity = now;
        }
        self.sync(now);
        event
    }

    /// Finish the active session explicitly
    pub fn end_session(&mut self) {
        let now = self.clock.now();
        if let Some(session) = self.session.take() {
            self.finish(session, now);
            self.session_store.remove(SESSION_KEY);
            self.save_journey();
        }
    }

    /// Associate the journey with a signed-in customer
    pub fn set_customer_id(&mut self, customer_id: impl Into<String>) {
        self.journey.customer_id = Some(customer_id.into());
        self.journey.updated_at = self.clock.now();
        self.save_journey();
    }

    pub fn journey(&self) -> &CustomerJourney {
        &self.journey
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.session.as_ref()
    }

    pub fn session_duration(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.session.as_ref().map(|s| s.duration(now))
    }

    /// Returns true when a new session was started
    fn ensure_session(&mut self, attribution: Option<&AttributionData>, now: DateTime<Utc>) -> bool {
        let expired = match &self.session {
            Some(session) => session.is_expired(now, self.timeout),
            None => true,
        };
        if !expired {
            return false;
        }

        if let Some(old) = self.session.take() {
            log::info!("session: {} expired", old.session_id);
            self.finish(old, now);
        }
        let fresh = SessionData::new(new_id("sess"), now, attribution.cloned());
        log::info!("session: started {}", fresh.session_id);
        self.session = Some(fresh);
        true
    }

    fn finish(&mut self, mut session: SessionData, now: DateTime<Utc>) {
        if session.end_time.is_none() {
            session.end_time = Some(session.last_activity.min(now));
        }
        if let Some(last) = session.page_visits.last_mut() {
            if last.time_on_page_ms.is_none() {
                last.time_on_page_ms = Some((session.last_activity - last.timestamp).num_milliseconds());
            }
        }
        self.journey.record_session(&session, now);
    }

    /// Persist the active session and fold it into the journey
    fn sync(&mut self, now: DateTime<Utc>) {
        if let Some(session) = &self.session {
            if let Err(e) = save_json(&self.session_store, SESSION_KEY, session) {
                log::warn!("session: failed to persist session: {}", e);
            }
            self.journey.record_session(session, now);
        }
        self.save_journey();
    }

    fn save_journey(&self) {
        if let Err(e) = save_json(&self.local_store, JOURNEY_KEY, &self.journey) {
            log::warn!("session: failed to persist journey: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    struct Fixture {
        session_store: MemoryStore,
        local_store: MemoryStore,
        clock: ManualClock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                session_store: MemoryStore::new(),
                local_store: MemoryStore::new(),
                clock: ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap()),
            }
        }

        fn tracker(&self) -> SessionTracker<&MemoryStore, &MemoryStore, &ManualClock> {
            SessionTracker::new(&self.session_store, &self.local_store, &self.clock, &TrackingConfig::default())
        }
    }

    fn params(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_page_visits_close_previous_timing() {
        let fx = Fixture::new();
        let mut tracker = fx.tracker();

        tracker.track_page_visit(&PageContext::new("https://shop.test/", "Home", ""), None);
        fx.clock.advance(Duration::seconds(42));
        tracker.track_page_visit(&PageContext::new("https://shop.test/products/7", "Tee", ""), None);

        let session = tracker.session().unwrap();
        assert_eq!(session.page_visits.len(), 2);
        assert_eq!(session.page_visits[0].time_on_page_ms, Some(42_000));
        assert_eq!(session.page_visits[1].time_on_page_ms, None);
        assert_eq!(session.page_visits[1].path, "/products/7");
    }

    #[test]
    fn test_conversion_events_count() {
        let fx = Fixture::new();
        let mut tracker = fx.tracker();

        tracker.track_event("view_item", params(json!({"value": 10.0})), None);
        tracker.track_event("add_to_cart", params(json!({"value": 500.0})), None);
        tracker.track_event("purchase", params(json!({"value": 1200.0})), None);

        let session = tracker.session().unwrap();
        assert_eq!(session.events.len(), 3);
        assert_eq!(session.conversions, 2);
        assert_eq!(session.conversion_value, 1700.0);
        assert_eq!(tracker.journey().total_conversions, 2);
        assert_eq!(tracker.journey().total_conversion_value, 1700.0);
    }

    #[test]
    fn test_session_older_than_timeout_is_replaced() {
        let fx = Fixture::new();
        let mut tracker = fx.tracker();
        tracker.track_event("lead", Map::new(), None);
        let first_id = tracker.session().unwrap().session_id.clone();

        fx.clock.advance(Duration::minutes(31));
        // Reload: the stored session is picked up, then replaced on the next event
        let mut tracker = fx.tracker();
        assert_eq!(tracker.session().unwrap().session_id, first_id);
        tracker.track_event("page_scroll", Map::new(), None);

        let session = tracker.session().unwrap();
        assert_ne!(session.session_id, first_id);
        assert_eq!(session.events.len(), 1);
        assert_eq!(session.conversions, 0);

        let journey = tracker.journey();
        assert_eq!(journey.session_count(), 2);
        assert!(journey.sessions[0].end_time.is_some());
        assert_eq!(journey.total_conversions, 1);
    }

    #[test]
    fn test_activity_within_timeout_keeps_session() {
        let fx = Fixture::new();
        let mut tracker = fx.tracker();
        let id = tracker.current_session(None).session_id.clone();

        fx.clock.advance(Duration::minutes(29));
        assert_eq!(tracker.current_session(None).session_id, id);
    }

    #[test]
    fn test_end_session_and_customer_id() {
        let fx = Fixture::new();
        let mut tracker = fx.tracker();
        tracker.track_event("sign_up", Map::new(), None);
        tracker.set_customer_id("cust-9");
        tracker.end_session();

        assert!(tracker.session().is_none());
        assert!(fx.session_store.get(SESSION_KEY).is_none());

        let reloaded = fx.tracker();
        assert_eq!(reloaded.journey().customer_id.as_deref(), Some("cust-9"));
        assert_eq!(reloaded.journey().session_count(), 1);
        assert_eq!(reloaded.journey().total_conversions, 1);
        assert_eq!(reloaded.journey().anonymous_id, tracker.journey().anonymous_id);
    }

    #[test]
    fn test_events_carry_attribution() {
        let fx = Fixture::new();
        let mut tracker = fx.tracker();
        let mut attribution = AttributionData::blank("/", fx.clock.now(), "visit_1");
        attribution.utm_source = Some("instagram".into());
        attribution.utm_medium = Some("social".into());
        attribution.utm_campaign = Some("drop-7".into());

        tracker.track_page_visit(&PageContext::new("https://shop.test/", "Home", ""), Some(&attribution));
        let event = tracker.track_event("view_item", Map::new(), None);

        assert_eq!(event.source, "instagram");
        assert_eq!(event.campaign.as_deref(), Some("drop-7"));
        assert_eq!(event.page_url.as_deref(), Some("https://shop.test/"));
        assert_eq!(tracker.journey().first_attribution.as_ref().unwrap().source(), "instagram");
    }
}
