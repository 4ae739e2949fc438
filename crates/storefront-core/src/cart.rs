//! Cart Helper
//!
//! Read/modify/write over the `cart` key. Every mutation persists the
//! whole array and then notifies listeners.

use crate::domain::CartItem;
use crate::storage::{load_json, save_json, KeyValueStore, StoreResult, CART_KEY};

/// Hook for cart side effects (DOM events, sounds)
pub trait CartNotifier {
    /// Called after every persisted change
    fn cart_changed(&self, items: &[CartItem]);

    /// Called after `add_item`, before `cart_changed`
    fn item_added(&self, _item: &CartItem) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl CartNotifier for NoopNotifier {
    fn cart_changed(&self, _items: &[CartItem]) {}
}

pub struct Cart<S: KeyValueStore, N: CartNotifier = NoopNotifier> {
    store: S,
    notifier: N,
}

impl<S: KeyValueStore> Cart<S> {
    pub fn new(store: S) -> Self {
        Self { store, notifier: NoopNotifier }
    }
}

impl<S: KeyValueStore, N: CartNotifier> Cart<S, N> {
    pub fn with_notifier(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Current cart; missing or malformed storage reads as empty
    pub fn load(&self) -> Vec<CartItem> {
        load_json(&self.store, CART_KEY).unwrap_or_default()
    }

    /// Merge by product id (quantity adds, stored price kept) or append
    pub fn add_item(&self, item: CartItem) -> StoreResult<Vec<CartItem>> {
        let mut items = self.load();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity += item.quantity,
            None => items.push(item.clone()),
        }
        self.persist(&items)?;
        log::debug!("cart: added {} x{} ({} lines)", item.id, item.quantity, items.len());
        self.notifier.item_added(&item);
        self.notifier.cart_changed(&items);
        Ok(items)
    }

    /// Remove the first entry with `id`; other entries are untouched
    pub fn remove_item(&self, id: &str) -> StoreResult<Vec<CartItem>> {
        let mut items = self.load();
        if let Some(pos) = items.iter().position(|item| item.id == id) {
            items.remove(pos);
        }
        self.persist(&items)?;
        self.notifier.cart_changed(&items);
        Ok(items)
    }

    /// Set quantity for `id`; zero removes the line
    pub fn update_quantity(&self, id: &str, quantity: u32) -> StoreResult<Vec<CartItem>> {
        if quantity == 0 {
            return self.remove_item(id);
        }
        let mut items = self.load();
        if let Some(item) = items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
        }
        self.persist(&items)?;
        self.notifier.cart_changed(&items);
        Ok(items)
    }

    pub fn clear(&self) {
        self.store.remove(CART_KEY);
        self.notifier.cart_changed(&[]);
    }

    pub fn item_count(&self) -> u32 {
        self.load().iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.load().iter().map(CartItem::line_total).sum()
    }

    fn persist(&self, items: &[CartItem]) -> StoreResult<()> {
        save_json(&self.store, CART_KEY, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNotifier {
        changes: RefCell<Vec<usize>>,
        added: RefCell<Vec<String>>,
    }

    impl CartNotifier for &RecordingNotifier {
        fn cart_changed(&self, items: &[CartItem]) {
            self.changes.borrow_mut().push(items.len());
        }

        fn item_added(&self, item: &CartItem) {
            self.added.borrow_mut().push(item.id.clone());
        }
    }

    fn tee(id: &str, quantity: u32) -> CartItem {
        CartItem::new(id, format!("Tee {}", id), 500.0, quantity)
    }

    #[test]
    fn test_same_product_merges_quantity() {
        let store = MemoryStore::new();
        let cart = Cart::new(&store);

        cart.add_item(tee("p1", 2)).unwrap();
        let items = cart.add_item(tee("p1", 1)).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].price, 500.0);
        assert_eq!(cart.load(), items);
    }

    #[test]
    fn test_merge_keeps_existing_price() {
        let store = MemoryStore::new();
        let cart = Cart::new(&store);

        cart.add_item(tee("p1", 1)).unwrap();
        let mut repriced = tee("p1", 1);
        repriced.price = 650.0;
        let items = cart.add_item(repriced).unwrap();

        assert_eq!(items[0].price, 500.0);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_remove_exactly_one_entry() {
        let store = MemoryStore::new();
        // Duplicates can only come from another writer; removal still takes one
        store
            .set(CART_KEY, r#"[{"_id":"p1","name":"a","price":1,"quantity":1},{"_id":"p2","name":"b","price":2,"quantity":4},{"_id":"p1","name":"a","price":1,"quantity":2}]"#)
            .unwrap();
        let cart = Cart::new(&store);

        let items = cart.remove_item("p1").unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "p2");
        assert_eq!(items[0].quantity, 4);
        assert_eq!(items[1].id, "p1");
        assert_eq!(items[1].quantity, 2);
    }

    #[test]
    fn test_update_quantity_and_zero_removes() {
        let store = MemoryStore::new();
        let cart = Cart::new(&store);
        cart.add_item(tee("p1", 1)).unwrap();
        cart.add_item(tee("p2", 1)).unwrap();

        let items = cart.update_quantity("p2", 5).unwrap();
        assert_eq!(items[1].quantity, 5);
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.subtotal(), 3000.0);

        let items = cart.update_quantity("p1", 0).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "p2");
    }

    #[test]
    fn test_malformed_storage_is_empty_cart() {
        let store = MemoryStore::new();
        store.set(CART_KEY, "oops").unwrap();
        let cart = Cart::new(&store);

        assert!(cart.load().is_empty());
        let items = cart.add_item(tee("p1", 1)).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_clear_and_notifications() {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::default();
        let cart = Cart::with_notifier(&store, &notifier);

        cart.add_item(tee("p1", 1)).unwrap();
        cart.add_item(tee("p2", 1)).unwrap();
        cart.remove_item("p1").unwrap();
        cart.clear();

        assert_eq!(*notifier.changes.borrow(), vec![1, 2, 1, 0]);
        assert_eq!(*notifier.added.borrow(), vec!["p1".to_string(), "p2".to_string()]);
        assert!(store.get(CART_KEY).is_none());
    }
}
