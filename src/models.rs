//! Frontend Models
//!
//! Data structures matching the REST backend's JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storefront_core::{CartItem, CustomDesign, OrderTotals, PaymentMethod, ShippingInfo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub customizable: bool,
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    pub fn image(&self) -> Option<String> {
        self.images.first().cloned()
    }

    pub fn in_stock(&self) -> bool {
        self.stock.map_or(true, |s| s > 0)
    }

    pub fn to_cart_item(&self, quantity: u32, size: Option<String>, color: Option<String>) -> CartItem {
        let mut item = CartItem::new(&self.id, &self.name, self.price, quantity).with_variant(size, color);
        item.image = self.image();
        item
    }
}

/// Create/update payload for the admin panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: Option<u32>,
    pub customizable: bool,
    pub featured: bool,
}

impl From<&Product> for ProductInput {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            compare_at_price: p.compare_at_price,
            images: p.images.clone(),
            category: p.category.clone(),
            sizes: p.sizes.clone(),
            colors: p.colors.clone(),
            stock: p.stock,
            customizable: p.customizable,
            featured: p.featured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    pub courier: String,
    pub cost: f64,
    #[serde(default)]
    pub estimated_days: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub custom_design: Option<CustomDesign>,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id().to_string(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
            custom_design: item.custom_design.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub totals: OrderTotals,
    /// Flat attribution fields for server-side conversion APIs
    pub attribution: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: f64,
    /// PIN for tracking without an account
    #[serde(default)]
    pub tracking_pin: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Printing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Fulfilment pipeline shown on the tracking page
    pub const PIPELINE: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Printing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order placed",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Printing => "Printing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unknown => "Processing",
        }
    }

    /// Position in the pipeline; cancelled/unknown orders have none
    pub fn progress(&self) -> Option<usize> {
        Self::PIPELINE.iter().position(|s| s == self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedOrder {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub totals: OrderTotals,
    #[serde(default)]
    pub status_history: Vec<StatusUpdate>,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    /// Grants invoice access for this order
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Amount in the configured currency, e.g. `₹1,499` or `₹249.50`
pub fn format_price(amount: f64) -> String {
    format_amount(amount, &crate::config::get().currency)
}

/// Amount without minor units when whole. Rupees use lakh grouping.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let cents = (rounded.abs() * 100.0).round() as i64;
    let (whole, fraction) = (cents / 100, cents % 100);
    let sign = if cents > 0 && rounded < 0.0 { "-" } else { "" };
    let code = currency.trim().to_ascii_uppercase();
    let grouped = if code == "INR" { group_indian(whole) } else { group_thousands(whole) };
    let symbol = match code.as_str() {
        "INR" => "₹".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        _ => format!("{} ", code),
    };
    if fraction == 0 {
        format!("{}{}{}", sign, symbol, grouped)
    } else {
        format!("{}{}{}.{:02}", sign, symbol, grouped, fraction)
    }
}

/// 1234567 -> 1,234,567
fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 1234567 -> 12,34,567
fn group_indian(n: i64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (a, b) = rest.split_at(rest.len() - 2);
        groups.push(b);
        rest = a;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_amount(499.0, "INR"), "₹499");
        assert_eq!(format_amount(1499.0, "INR"), "₹1,499");
        assert_eq!(format_amount(1234567.0, "INR"), "₹12,34,567");
        assert_eq!(format_amount(249.5, "INR"), "₹249.50");
    }

    #[test]
    fn test_negative_amounts_keep_their_sign() {
        assert_eq!(format_amount(-0.5, "INR"), "-₹0.50");
        assert_eq!(format_amount(-1499.0, "INR"), "-₹1,499");
        assert_eq!(format_amount(-0.001, "INR"), "₹0");
        assert_eq!(format_amount(0.0, "INR"), "₹0");
    }

    #[test]
    fn test_currency_symbol_and_grouping() {
        assert_eq!(format_amount(1234567.0, "usd"), "$1,234,567");
        assert_eq!(format_amount(19.99, "EUR"), "€19.99");
        assert_eq!(format_amount(1500.0, "JPY"), "JPY 1,500");
        assert_eq!(format_amount(999.0, "GBP"), "£999");
    }

    #[test]
    fn test_order_status_progress() {
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status.progress(), Some(3));
        let odd: OrderStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(odd, OrderStatus::Unknown);
        assert_eq!(OrderStatus::Cancelled.progress(), None);
    }

    #[test]
    fn test_product_to_cart_item() {
        let product: Product = serde_json::from_str(
            r#"{"_id":"p9","name":"Gojo Hoodie","price":1299,"images":["/img/gojo.png"],"sizes":["M","L"]}"#,
        )
        .unwrap();
        let item = product.to_cart_item(1, Some("L".into()), None);
        assert_eq!(item.id, "p9");
        assert_eq!(item.size.as_deref(), Some("L"));
        assert_eq!(item.image.as_deref(), Some("/img/gojo.png"));
        assert!(product.in_stock());
    }
}
