//! `localStorage` / `sessionStorage` behind the core `KeyValueStore` seam.

use storefront_core::{KeyValueStore, StoreError, StoreResult};

/// Bearer token for admin endpoints
pub const ADMIN_TOKEN_KEY: &str = "admin_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStorage {
    Local,
    Session,
}

impl BrowserStorage {
    fn storage(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        let result = match self {
            BrowserStorage::Local => window.local_storage(),
            BrowserStorage::Session => window.session_storage(),
        };
        // Private mode / disabled storage surfaces as Err or None
        result.ok().flatten()
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StoreError::QuotaExceeded(key.to_string()))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(key);
        }
    }
}
