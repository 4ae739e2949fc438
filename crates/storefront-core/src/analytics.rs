//! Enhanced Analytics
//!
//! Composes attribution and session state into enriched payloads and hands
//! them to vendor sinks (Meta Pixel, GA4, Google Ads). Sinks whose script
//! has not loaded drop the event: no retry, no queue.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::attribution::{AttributionManager, EnhancedConversionData, UserData};
use crate::clock::Clock;
use crate::config::{StorefrontConfig, TrackingConfig};
use crate::domain::{new_id, CartItem};
use crate::page::PageContext;
use crate::session::SessionTracker;
use crate::storage::KeyValueStore;

/// Event after enrichment, as every sink receives it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    /// Shared across vendors for deduplication
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub parameters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<EnhancedConversionData>,
}

impl AnalyticsEvent {
    pub fn value(&self) -> Option<f64> {
        self.parameters.get("value").and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkEvent<'a> {
    PageView(&'a AnalyticsEvent),
    Event(&'a AnalyticsEvent),
    /// Google Ads conversion, `send_to` is `AW-xxx/label`
    AdsConversion { event: &'a AnalyticsEvent, send_to: &'a str },
}

impl SinkEvent<'_> {
    pub fn event(&self) -> &AnalyticsEvent {
        match self {
            SinkEvent::PageView(event) | SinkEvent::Event(event) => event,
            SinkEvent::AdsConversion { event, .. } => event,
        }
    }
}

/// A vendor client living behind a global function (`fbq`, `gtag`)
pub trait AnalyticsSink {
    fn name(&self) -> &'static str;

    /// Whether the vendor script is present; events are dropped otherwise
    fn is_loaded(&self) -> bool;

    fn send(&self, event: &SinkEvent<'_>);
}

/// Meta standard event for a GA-style event name, `None` means `trackCustom`
pub fn meta_standard_event(name: &str) -> Option<&'static str> {
    match name {
        "page_view" => Some("PageView"),
        "view_item" => Some("ViewContent"),
        "add_to_cart" => Some("AddToCart"),
        "begin_checkout" => Some("InitiateCheckout"),
        "add_payment_info" => Some("AddPaymentInfo"),
        "purchase" => Some("Purchase"),
        "sign_up" | "complete_registration" => Some("CompleteRegistration"),
        "lead" => Some("Lead"),
        "search" => Some("Search"),
        "customize_product" => Some("CustomizeProduct"),
        _ => None,
    }
}

pub fn items_param(items: &[CartItem]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| {
                let variant = [item.size.as_deref(), item.color.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" / ");
                json!({
                    "item_id": item.id,
                    "item_name": item.name,
                    "price": item.price,
                    "quantity": item.quantity,
                    "item_variant": variant,
                })
            })
            .collect(),
    )
}

pub struct EnhancedAnalytics<L, S, C>
where
    L: KeyValueStore + Clone,
    S: KeyValueStore,
    C: Clock + Clone,
{
    attribution: AttributionManager<L, C>,
    sessions: SessionTracker<S, L, C>,
    clock: C,
    config: TrackingConfig,
    currency: String,
    sinks: Vec<Box<dyn AnalyticsSink>>,
}

impl<L, S, C> EnhancedAnalytics<L, S, C>
where
    L: KeyValueStore + Clone,
    S: KeyValueStore,
    C: Clock + Clone,
{
    pub fn new(local_store: L, session_store: S, clock: C, config: &StorefrontConfig) -> Self {
        Self {
            attribution: AttributionManager::new(local_store.clone(), clock.clone(), config.tracking.clone()),
            sessions: SessionTracker::new(session_store, local_store, clock.clone(), &config.tracking),
            clock,
            config: config.tracking.clone(),
            currency: config.currency.clone(),
            sinks: Vec::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn AnalyticsSink>) {
        log::info!("analytics: registered {} sink", sink.name());
        self.sinks.push(sink);
    }

    /// Capture attribution for the landing page and record the first page view
    pub fn init(&mut self, page: &PageContext) -> AnalyticsEvent {
        self.attribution.capture(page);
        self.track_page_view(page)
    }

    pub fn track_page_view(&mut self, page: &PageContext) -> AnalyticsEvent {
        self.sessions.track_page_visit(page, self.attribution.current());
        let mut params = Map::new();
        params.insert("page_location".into(), page.url.clone().into());
        params.insert("page_path".into(), page.path().into());
        params.insert("page_title".into(), page.title.clone().into());
        if !page.referrer.is_empty() {
            params.insert("page_referrer".into(), page.referrer.clone().into());
        }
        let event = self.compose("page_view", params, None);
        self.dispatch(SinkEvent::PageView(&event));
        event
    }

    pub fn track_event(&mut self, name: &str, params: Map<String, Value>) -> AnalyticsEvent {
        self.record(name, params, None)
    }

    pub fn track_view_item(&mut self, item: &CartItem) -> AnalyticsEvent {
        let params = self.commerce_params(item.price, std::slice::from_ref(item));
        self.record("view_item", params, None)
    }

    pub fn track_add_to_cart(&mut self, item: &CartItem) -> AnalyticsEvent {
        let params = self.commerce_params(item.line_total(), std::slice::from_ref(item));
        self.record("add_to_cart", params, None)
    }

    pub fn track_begin_checkout(&mut self, items: &[CartItem], value: f64) -> AnalyticsEvent {
        let params = self.commerce_params(value, items);
        self.record("begin_checkout", params, None)
    }

    pub fn track_customize(&mut self, product_id: &str, design_id: &str) -> AnalyticsEvent {
        let mut params = Map::new();
        params.insert("item_id".into(), product_id.into());
        params.insert("design_id".into(), design_id.into());
        self.record("customize_product", params, None)
    }

    /// Purchase with enhanced-conversion user data and a Google Ads conversion
    pub fn track_purchase(&mut self, order_id: &str, value: f64, items: &[CartItem], user: &UserData) -> AnalyticsEvent {
        let mut params = self.commerce_params(value, items);
        params.insert("transaction_id".into(), order_id.into());
        let user_data = self.attribution.enhanced_conversion_data(user);
        let event = self.record("purchase", params, Some(user_data));

        if let Some(send_to) = self.config.google_ads_purchase_target() {
            self.dispatch(SinkEvent::AdsConversion { event: &event, send_to: &send_to });
        }
        event
    }

    pub fn track_sign_up(&mut self, method: &str, user: &UserData) -> AnalyticsEvent {
        let mut params = Map::new();
        params.insert("method".into(), method.into());
        let user_data = self.attribution.enhanced_conversion_data(user);
        self.record("sign_up", params, Some(user_data))
    }

    pub fn track_lead(&mut self, params: Map<String, Value>, user: &UserData) -> AnalyticsEvent {
        let user_data = self.attribution.enhanced_conversion_data(user);
        self.record("lead", params, Some(user_data))
    }

    /// Tie the journey to a signed-in customer
    pub fn identify(&mut self, customer_id: &str) {
        self.sessions.set_customer_id(customer_id);
    }

    pub fn end_session(&mut self) {
        self.sessions.end_session();
    }

    pub fn attribution(&self) -> &AttributionManager<L, C> {
        &self.attribution
    }

    pub fn sessions(&self) -> &SessionTracker<S, L, C> {
        &self.sessions
    }

    fn record(&mut self, name: &str, params: Map<String, Value>, user_data: Option<EnhancedConversionData>) -> AnalyticsEvent {
        self.sessions.track_event(name, params.clone(), self.attribution.current());
        let event = self.compose(name, params, user_data);
        self.dispatch(SinkEvent::Event(&event));
        event
    }

    fn commerce_params(&self, value: f64, items: &[CartItem]) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("value".into(), json!(value));
        params.insert("currency".into(), self.currency.clone().into());
        params.insert("items".into(), items_param(items));
        params.insert("num_items".into(), items.iter().map(|i| i.quantity).sum::<u32>().into());
        params
    }

    /// Caller parameters win over attribution and session context
    fn compose(&self, name: &str, mut params: Map<String, Value>, user_data: Option<EnhancedConversionData>) -> AnalyticsEvent {
        for (key, value) in self.attribution.attribution_params() {
            params.entry(key).or_insert(value);
        }

        let journey = self.sessions.journey();
        let mut context = Map::new();
        context.insert("visitor_id".into(), journey.anonymous_id.clone().into());
        context.insert("session_number".into(), journey.session_count().into());
        if let Some(customer_id) = &journey.customer_id {
            context.insert("customer_id".into(), customer_id.clone().into());
        }
        if let Some(session) = self.sessions.session() {
            context.insert("session_id".into(), session.session_id.clone().into());
            context.insert("session_page_views".into(), session.page_visits.len().into());
            context.insert("session_conversions".into(), session.conversions.into());
        }
        if let Some(duration) = self.sessions.session_duration() {
            context.insert("session_duration_s".into(), duration.num_seconds().into());
        }
        for (key, value) in context {
            params.entry(key).or_insert(value);
        }

        AnalyticsEvent {
            name: name.to_string(),
            event_id: new_id("evt"),
            timestamp: self.clock.now(),
            parameters: params,
            user_data,
        }
    }

    fn dispatch(&self, event: SinkEvent<'_>) {
        for sink in &self.sinks {
            if !sink.is_loaded() {
                log::debug!("analytics: {} not loaded, dropping {}", sink.name(), event.event().name);
                continue;
            }
            sink.send(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::AttributionModel;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        loaded: bool,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl AnalyticsSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn is_loaded(&self) -> bool {
            self.loaded
        }

        fn send(&self, event: &SinkEvent<'_>) {
            let label = match event {
                SinkEvent::PageView(e) => format!("page:{}", e.name),
                SinkEvent::Event(e) => format!("event:{}", e.name),
                SinkEvent::AdsConversion { send_to, .. } => format!("ads:{}", send_to),
            };
            self.seen.borrow_mut().push(label);
        }
    }

    struct Fixture {
        local: MemoryStore,
        session: MemoryStore,
        clock: ManualClock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                local: MemoryStore::new(),
                session: MemoryStore::new(),
                clock: ManualClock::new(Utc.with_ymd_and_hms(2026, 8, 15, 9, 30, 0).unwrap()),
            }
        }

        fn analytics(&self, config: &StorefrontConfig) -> EnhancedAnalytics<&MemoryStore, &MemoryStore, &ManualClock> {
            EnhancedAnalytics::new(&self.local, &self.session, &self.clock, config)
        }
    }

    fn landing() -> PageContext {
        PageContext::new(
            "https://shop.test/?utm_source=instagram&utm_medium=paid_social&utm_campaign=onepiece",
            "Home",
            "",
        )
    }

    #[test]
    fn test_page_view_is_enriched() {
        let fx = Fixture::new();
        let mut analytics = fx.analytics(&StorefrontConfig::default());
        let sink = RecordingSink { loaded: true, ..Default::default() };
        analytics.add_sink(Box::new(sink.clone()));

        let event = analytics.init(&landing());

        assert_eq!(event.name, "page_view");
        assert_eq!(event.parameters["page_path"], "/");
        assert_eq!(event.parameters["traffic_source"], "instagram");
        assert_eq!(event.parameters["traffic_type"], "paid");
        assert_eq!(event.parameters["campaign"], "onepiece");
        assert_eq!(event.parameters["session_page_views"], 1);
        assert!(event.parameters.contains_key("visitor_id"));
        assert_eq!(*sink.seen.borrow(), vec!["page:page_view".to_string()]);
    }

    #[test]
    fn test_unloaded_sink_drops_events() {
        let fx = Fixture::new();
        let mut analytics = fx.analytics(&StorefrontConfig::default());
        let offline = RecordingSink::default();
        let online = RecordingSink { loaded: true, ..Default::default() };
        analytics.add_sink(Box::new(offline.clone()));
        analytics.add_sink(Box::new(online.clone()));

        analytics.init(&landing());
        analytics.track_add_to_cart(&CartItem::new("p1", "Luffy Tee", 599.0, 2));

        assert!(offline.seen.borrow().is_empty());
        assert_eq!(online.seen.borrow().len(), 2);
        // Still recorded in the session even when no vendor is listening
        assert_eq!(analytics.sessions().session().unwrap().conversions, 1);
    }

    #[test]
    fn test_purchase_sends_ads_conversion_with_user_data() {
        let fx = Fixture::new();
        let mut config = StorefrontConfig::default();
        config.tracking.google_ads_id = Some("AW-42".into());
        config.tracking.google_ads_purchase_label = Some("buy".into());
        let mut analytics = fx.analytics(&config);
        let sink = RecordingSink { loaded: true, ..Default::default() };
        analytics.add_sink(Box::new(sink.clone()));

        analytics.init(&landing());
        let items = vec![CartItem::new("p1", "Luffy Tee", 599.0, 2)];
        let user = UserData {
            email: Some("fan@example.com".into()),
            ..UserData::default()
        };
        let event = analytics.track_purchase("ORD-1001", 1198.0, &items, &user);

        assert_eq!(event.value(), Some(1198.0));
        assert_eq!(event.parameters["transaction_id"], "ORD-1001");
        assert_eq!(event.parameters["currency"], "INR");
        assert_eq!(event.parameters["items"][0]["quantity"], 2);
        assert!(event.user_data.as_ref().unwrap().sha256_email_address.is_some());
        assert_eq!(
            *sink.seen.borrow(),
            vec!["page:page_view".to_string(), "event:purchase".to_string(), "ads:AW-42/buy".to_string()]
        );
        assert_eq!(analytics.sessions().journey().total_conversion_value, 1198.0);
    }

    #[test]
    fn test_caller_params_take_precedence() {
        let fx = Fixture::new();
        let mut analytics = fx.analytics(&StorefrontConfig::default());
        analytics.init(&landing());

        let mut params = Map::new();
        params.insert("campaign".into(), "override".into());
        let event = analytics.track_event("share", params);

        assert_eq!(event.parameters["campaign"], "override");
        assert_eq!(event.parameters["traffic_source"], "instagram");
    }

    #[test]
    fn test_first_click_survives_new_landing() {
        let fx = Fixture::new();
        let mut config = StorefrontConfig::default();
        config.tracking.attribution_model = AttributionModel::FirstClick;

        fx.analytics(&config).init(&landing());
        let mut again = fx.analytics(&config);
        let event = again.init(&PageContext::new("https://shop.test/?utm_source=google&utm_medium=cpc", "Home", ""));

        assert_eq!(event.parameters["traffic_source"], "instagram");
        assert_eq!(event.parameters["visit_count"], 2);
    }

    #[test]
    fn test_identify_sets_customer() {
        let fx = Fixture::new();
        let mut analytics = fx.analytics(&StorefrontConfig::default());
        analytics.init(&landing());
        analytics.identify("cust-77");
        let event = analytics.track_event("view_item_list", Map::new());
        assert_eq!(event.parameters["customer_id"], "cust-77");
    }

    #[test]
    fn test_sign_up_counts_and_session_ends_into_journey() {
        let fx = Fixture::new();
        let mut analytics = fx.analytics(&StorefrontConfig::default());
        analytics.init(&landing());
        let user = UserData {
            email: Some("fan@example.com".into()),
            ..UserData::default()
        };

        let event = analytics.track_sign_up("email", &user);
        assert_eq!(event.name, "sign_up");
        assert_eq!(event.parameters["method"], "email");
        assert!(event.user_data.is_some());

        analytics.end_session();
        assert!(analytics.sessions().session().is_none());
        let journey = analytics.sessions().journey();
        assert_eq!(journey.sessions.len(), 1);
        assert_eq!(journey.total_conversions, 1);
    }

    #[test]
    fn test_meta_event_mapping() {
        assert_eq!(meta_standard_event("add_to_cart"), Some("AddToCart"));
        assert_eq!(meta_standard_event("complete_registration"), Some("CompleteRegistration"));
        assert_eq!(meta_standard_event("wishlist_share"), None);
    }
}
