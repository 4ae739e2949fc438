//! In-memory store used off-browser and in tests.

use std::cell::RefCell;
use std::collections::HashMap;

use super::traits::{KeyValueStore, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load_json, save_json};

    #[test]
    fn test_malformed_json_loads_as_none() {
        let store = MemoryStore::new();
        store.set("cart", "{not json").unwrap();
        let loaded: Option<Vec<u32>> = load_json(&store, "cart");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, "nums", &vec![1u32, 2, 3]).unwrap();
        let loaded: Vec<u32> = load_json(&store, "nums").unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
    }
}
