//! Storage Layer - Core Traits

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised when writing to a key/value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("quota exceeded writing {0}")]
    QuotaExceeded(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String key/value store with browser-storage semantics.
///
/// Methods take `&self`: browser storage is shared, interior state,
/// and last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Read and decode a JSON value. Missing keys and malformed JSON both yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("discarding malformed {} in storage: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize + ?Sized>(store: &impl KeyValueStore, key: &str, value: &T) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
