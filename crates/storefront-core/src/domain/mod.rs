//! Domain Layer
//!
//! Plain records persisted as JSON in browser storage.
//! No invariants beyond what the owning helper enforces on write.

mod attribution;
mod cart_item;
mod journey;
mod session;

pub use attribution::{AdPlatform, AttributionData, TrafficType};
pub use cart_item::{CartItem, CustomDesign};
pub use journey::{CustomerJourney, SessionSummary};
pub use session::{PageVisit, SessionData, TrackedEvent, CONVERSION_EVENTS};

/// Prefixed random identifier, e.g. `sess_5f0c...`
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
