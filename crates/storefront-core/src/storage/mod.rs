//! Storage Layer
//!
//! Key/value abstraction over browser local and session storage.
//! The UI provides the `web_sys::Storage` implementation; tests use `MemoryStore`.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{load_json, save_json, KeyValueStore, StoreError, StoreResult};

/// Local storage: JSON array of cart items
pub const CART_KEY: &str = "cart";
/// Local storage: current attribution touchpoint
pub const ATTRIBUTION_KEY: &str = "attribution_data";
/// Local storage: cross-session customer journey
pub const JOURNEY_KEY: &str = "customer_journey";
/// Session storage: active session
pub const SESSION_KEY: &str = "session_data";
/// Session storage: in-progress checkout, survives a sign-in redirect
pub const CHECKOUT_STATE_KEY: &str = "checkout_state";
