//! Tracking Singletons
//!
//! The analytics pipeline lives in a thread-local on the UI thread; pages
//! call these helpers and never hold the tracker themselves. Tracking
//! failures are logged and never interrupt the page.

use std::cell::RefCell;

use serde_json::{Map, Value};
use storefront_core::{Cart, CartItem, EnhancedAnalytics, PageContext, StoreResult, SystemClock, UserData};

use crate::browser::{self, BrowserStorage, DomCartNotifier, GoogleTag, MetaPixel};
use crate::config;

type BrowserAnalytics = EnhancedAnalytics<BrowserStorage, BrowserStorage, SystemClock>;

thread_local! {
    static ANALYTICS: RefCell<Option<BrowserAnalytics>> = const { RefCell::new(None) };
}

/// Load vendor scripts, capture attribution and record the landing page view
pub fn init() {
    let config = config::get();
    let mut analytics = EnhancedAnalytics::new(BrowserStorage::Local, BrowserStorage::Session, SystemClock, config);

    if let Some(pixel_id) = &config.tracking.meta_pixel_id {
        match MetaPixel::load(pixel_id) {
            Ok(pixel) => analytics.add_sink(Box::new(pixel)),
            Err(e) => log::warn!("tracking: meta pixel unavailable: {:?}", e),
        }
    }
    match GoogleTag::load(&config.tracking) {
        Ok(Some(tag)) => analytics.add_sink(Box::new(tag)),
        Ok(None) => {}
        Err(e) => log::warn!("tracking: google tag unavailable: {:?}", e),
    }

    analytics.init(&browser::current_page());
    ANALYTICS.with(|cell| *cell.borrow_mut() = Some(analytics));
}

fn with_analytics(f: impl FnOnce(&mut BrowserAnalytics)) {
    ANALYTICS.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => match guard.as_mut() {
            Some(analytics) => f(analytics),
            None => log::debug!("tracking: not initialised"),
        },
        Err(_) => log::warn!("tracking: re-entrant call dropped"),
    });
}

pub fn page_view(page: &PageContext) {
    with_analytics(|a| {
        a.track_page_view(page);
    });
}

pub fn view_item(item: &CartItem) {
    with_analytics(|a| {
        a.track_view_item(item);
    });
}

pub fn begin_checkout(items: &[CartItem], value: f64) {
    with_analytics(|a| {
        a.track_begin_checkout(items, value);
    });
}

pub fn purchase(order_id: &str, value: f64, items: &[CartItem], user: &UserData) {
    with_analytics(|a| {
        a.track_purchase(order_id, value, items, user);
    });
}

pub fn customize(product_id: &str, design_id: &str) {
    with_analytics(|a| {
        a.track_customize(product_id, design_id);
    });
}

/// Order-status email requested from the tracking page
pub fn lead(params: Map<String, Value>, user: &UserData) {
    with_analytics(|a| {
        a.track_lead(params, user);
    });
}

/// Ties the journey to a customer once they identify themselves
pub fn identify(customer_id: &str) {
    with_analytics(|a| a.identify(customer_id));
}

pub fn event(name: &str, params: Map<String, Value>) {
    with_analytics(|a| {
        a.track_event(name, params);
    });
}

/// Attribution fields sent with orders for server-side conversion APIs
pub fn attribution_params() -> Map<String, Value> {
    let mut params = Map::new();
    with_analytics(|a| params = a.attribution().attribution_params());
    params
}

pub fn cart() -> Cart<BrowserStorage, DomCartNotifier> {
    Cart::with_notifier(BrowserStorage::Local, DomCartNotifier)
}

/// Add to the stored cart and report `add_to_cart`
pub fn add_to_cart(item: CartItem) -> StoreResult<Vec<CartItem>> {
    let items = cart().add_item(item.clone())?;
    with_analytics(|a| {
        a.track_add_to_cart(&item);
    });
    Ok(items)
}
