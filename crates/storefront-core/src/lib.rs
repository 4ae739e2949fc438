//! Storefront Core
//!
//! Layered like the UI that consumes it:
//! - domain: plain records persisted in browser storage
//! - storage: key/value seam over local/session storage
//! - cart, attribution, session, analytics: the stateful helpers
//! - checkout: step machines, validation and order totals

pub mod analytics;
pub mod attribution;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod domain;
pub mod page;
pub mod session;
pub mod storage;

pub use analytics::{AnalyticsEvent, AnalyticsSink, EnhancedAnalytics, SinkEvent};
pub use attribution::{AttributionManager, EnhancedConversionData, UserData};
pub use cart::{Cart, CartNotifier, NoopNotifier};
pub use checkout::{
    CheckoutSnapshot, CheckoutStep, Coupon, DiscountType, EnhancedCheckoutStep, OrderTotals, PaymentMethod, ShippingInfo,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AttributionModel, StorefrontConfig, TrackingConfig};
pub use domain::*;
pub use page::PageContext;
pub use session::SessionTracker;
pub use storage::{KeyValueStore, MemoryStore, StoreError, StoreResult};
