//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;
use storefront_core::CartItem;

use crate::models::{Category, Product};

/// Catalog and cart state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Products for the current listing
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    /// Mirror of the stored cart
    pub cart: Vec<CartItem>,
    /// Last catalog load error, shown inline
    pub catalog_error: Option<String>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

pub fn store_set_cart(store: &AppStore, items: Vec<CartItem>) {
    *store.cart().write() = items;
}

/// Insert or replace a product by ID
pub fn store_upsert_product(store: &AppStore, product: Product) {
    let products_field = store.products();
    let mut products = products_field.write();
    match products.iter_mut().find(|p| p.id == product.id) {
        Some(existing) => *existing = product,
        None => products.push(product),
    }
}

pub fn store_remove_product(store: &AppStore, product_id: &str) {
    store.products().write().retain(|p| p.id != product_id);
}

/// Insert or replace a category by ID
pub fn store_upsert_category(store: &AppStore, category: Category) {
    let categories_field = store.categories();
    let mut categories = categories_field.write();
    match categories.iter_mut().find(|c| c.id == category.id) {
        Some(existing) => *existing = category,
        None => categories.push(category),
    }
}

pub fn store_remove_category(store: &AppStore, category_id: &str) {
    store.categories().write().retain(|c| c.id != category_id);
}
