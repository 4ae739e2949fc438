//! Application Context
//!
//! Shared navigation and cart signals provided via Leptos Context API.

use leptos::prelude::*;

use crate::browser;
use crate::tracking;

/// In-app pages; the SPA has no router, the current view is a signal
#[derive(Clone, Debug, PartialEq)]
pub enum View {
    Shop { category: Option<String> },
    Product(String),
    Cart,
    Checkout,
    EnhancedCheckout,
    Customize(Option<String>),
    TrackOrder,
    OrderPlaced { order_number: String, pin: Option<String> },
    AdminProducts,
    AdminCategories,
}

impl View {
    pub fn home() -> Self {
        View::Shop { category: None }
    }

    /// Initial view for a deep link
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["products", id] => View::Product(id.to_string()),
            ["category", id] => View::Shop { category: Some(id.to_string()) },
            ["cart"] => View::Cart,
            ["checkout"] => View::Checkout,
            ["express-checkout"] => View::EnhancedCheckout,
            ["customize"] => View::Customize(None),
            ["customize", id] => View::Customize(Some(id.to_string())),
            ["track"] | ["track-order"] => View::TrackOrder,
            ["admin"] | ["admin", "products"] => View::AdminProducts,
            ["admin", "categories"] => View::AdminCategories,
            _ => View::Shop { category: None },
        }
    }

    pub fn path(&self) -> String {
        match self {
            View::Shop { category: None } => "/".to_string(),
            View::Shop { category: Some(id) } => format!("/category/{}", id),
            View::Product(id) => format!("/products/{}", id),
            View::Cart => "/cart".to_string(),
            View::Checkout => "/checkout".to_string(),
            View::EnhancedCheckout => "/express-checkout".to_string(),
            View::Customize(None) => "/customize".to_string(),
            View::Customize(Some(id)) => format!("/customize/{}", id),
            View::TrackOrder => "/track".to_string(),
            View::OrderPlaced { .. } => "/order-placed".to_string(),
            View::AdminProducts => "/admin/products".to_string(),
            View::AdminCategories => "/admin/categories".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Shop { .. } => "Shop",
            View::Product(_) => "Product",
            View::Cart => "Your Cart",
            View::Checkout | View::EnhancedCheckout => "Checkout",
            View::Customize(_) => "Design Your Tee",
            View::TrackOrder => "Track Order",
            View::OrderPlaced { .. } => "Order Placed",
            View::AdminProducts => "Admin · Products",
            View::AdminCategories => "Admin · Categories",
        }
    }
}

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Current page - read
    pub view: ReadSignal<View>,
    /// Current page - write
    set_view: WriteSignal<View>,
    /// Units in the stored cart, kept in sync by the `cartUpdated` listener
    pub cart_count: ReadSignal<u32>,
}

impl AppContext {
    pub fn new(view: (ReadSignal<View>, WriteSignal<View>), cart_count: ReadSignal<u32>) -> Self {
        Self {
            view: view.0,
            set_view: view.1,
            cart_count,
        }
    }

    /// Switch page, push history and record a page view
    pub fn navigate(&self, view: View) {
        let page = browser::navigate_to(&view.path(), &format!("{} | Otaku Threads", view.title()));
        self.set_view.set(view);
        tracking::page_view(&page);
        scroll_to_top();
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

fn scroll_to_top() {
    if let Some(window) = web_sys::window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_links() {
        assert_eq!(View::from_path("/products/abc"), View::Product("abc".into()));
        assert_eq!(View::from_path("/track"), View::TrackOrder);
        assert_eq!(View::from_path("/admin"), View::AdminProducts);
        assert_eq!(View::from_path("/nope/nope/nope"), View::Shop { category: None });
        assert_eq!(View::from_path(&View::AdminCategories.path()), View::AdminCategories);
    }
}
