//! Checkout
//!
//! Linear step machines, shipping validation, coupon and order totals,
//! and the session-storage snapshot that survives a sign-in redirect.

use serde::{Deserialize, Serialize};

use crate::attribution::UserData;
use crate::domain::CartItem;
use crate::storage::{load_json, save_json, KeyValueStore, StoreResult, CHECKOUT_STATE_KEY};

/// `Checkout`: Shipping -> Payment -> Review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 3] = [CheckoutStep::Shipping, CheckoutStep::Payment, CheckoutStep::Review];

    pub fn next(self) -> Self {
        match self {
            CheckoutStep::Shipping => CheckoutStep::Payment,
            CheckoutStep::Payment | CheckoutStep::Review => CheckoutStep::Review,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            CheckoutStep::Review => CheckoutStep::Payment,
            CheckoutStep::Payment | CheckoutStep::Shipping => CheckoutStep::Shipping,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Review => "Review",
        }
    }
}

/// `EnhancedCheckout`: Cart Review -> Shipping -> Payment -> Confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnhancedCheckoutStep {
    #[default]
    CartReview,
    Shipping,
    Payment,
    Confirmation,
}

impl EnhancedCheckoutStep {
    pub const ALL: [EnhancedCheckoutStep; 4] = [
        EnhancedCheckoutStep::CartReview,
        EnhancedCheckoutStep::Shipping,
        EnhancedCheckoutStep::Payment,
        EnhancedCheckoutStep::Confirmation,
    ];

    pub fn next(self) -> Self {
        match self {
            EnhancedCheckoutStep::CartReview => EnhancedCheckoutStep::Shipping,
            EnhancedCheckoutStep::Shipping => EnhancedCheckoutStep::Payment,
            EnhancedCheckoutStep::Payment | EnhancedCheckoutStep::Confirmation => EnhancedCheckoutStep::Confirmation,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            // No way back once the order is placed
            EnhancedCheckoutStep::Confirmation => EnhancedCheckoutStep::Confirmation,
            EnhancedCheckoutStep::Payment => EnhancedCheckoutStep::Shipping,
            EnhancedCheckoutStep::Shipping | EnhancedCheckoutStep::CartReview => EnhancedCheckoutStep::CartReview,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            EnhancedCheckoutStep::CartReview => "Cart",
            EnhancedCheckoutStep::Shipping => "Shipping",
            EnhancedCheckoutStep::Payment => "Payment",
            EnhancedCheckoutStep::Confirmation => "Confirmation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,
    #[serde(rename = "online")]
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::Online => "online",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::Online => "Pay Online (UPI / Card)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for ShippingInfo {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: "India".to_string(),
        }
    }
}

impl ShippingInfo {
    /// Labels of required fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Full name", &self.full_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Address", &self.address_line1),
            ("City", &self.city),
            ("State", &self.state),
            ("PIN code", &self.postal_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// Presence check with the message shown to the shopper
    pub fn validate(&self) -> Result<(), String> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Please fill in all required shipping fields: {}", missing.join(", ")))
        }
    }

    pub fn to_user_data(&self) -> UserData {
        let mut names = self.full_name.split_whitespace();
        let first_name = names.next().map(str::to_string);
        let rest = names.collect::<Vec<_>>().join(" ");
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        UserData {
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            first_name,
            last_name: non_empty(&rest),
            city: non_empty(&self.city),
            state: non_empty(&self.state),
            postal_code: non_empty(&self.postal_code),
            country: non_empty(&self.country),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: f64,
    #[serde(default)]
    pub min_order_amount: Option<f64>,
    #[serde(default)]
    pub max_discount: Option<f64>,
}

impl Coupon {
    pub fn is_applicable(&self, subtotal: f64) -> bool {
        self.min_order_amount.map_or(true, |min| subtotal >= min)
    }

    /// Discount for `subtotal`, capped and never above the subtotal
    pub fn discount_for(&self, subtotal: f64) -> f64 {
        if !self.is_applicable(subtotal) {
            return 0.0;
        }
        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal * self.value / 100.0,
            DiscountType::Flat => self.value,
        };
        let capped = self.max_discount.map_or(raw, |cap| raw.min(cap));
        round2(capped.clamp(0.0, subtotal))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub shipping: f64,
    pub total: f64,
}

impl OrderTotals {
    /// Shipping is waived when the discounted subtotal reaches `free_shipping_threshold`
    pub fn compute(items: &[CartItem], coupon: Option<&Coupon>, shipping_rate: f64, free_shipping_threshold: f64) -> Self {
        let subtotal = round2(items.iter().map(CartItem::line_total).sum());
        let discount = coupon.map_or(0.0, |c| c.discount_for(subtotal));
        let discounted = subtotal - discount;
        let shipping = if items.is_empty() || discounted >= free_shipping_threshold { 0.0 } else { shipping_rate };
        Self {
            subtotal,
            discount,
            shipping,
            total: round2(discounted + shipping),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// In-progress checkout kept in session storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutSnapshot {
    pub step: CheckoutStep,
    pub enhanced_step: EnhancedCheckoutStep,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
}

impl CheckoutSnapshot {
    pub fn save(&self, store: &impl KeyValueStore) -> StoreResult<()> {
        save_json(store, CHECKOUT_STATE_KEY, self)
    }

    pub fn load(store: &impl KeyValueStore) -> Option<Self> {
        load_json(store, CHECKOUT_STATE_KEY)
    }

    pub fn clear(store: &impl KeyValueStore) {
        store.remove(CHECKOUT_STATE_KEY);
    }

    /// Save while the order is in progress; a confirmed order leaves nothing to resume
    pub fn sync(&self, store: &impl KeyValueStore) -> StoreResult<()> {
        if self.enhanced_step == EnhancedCheckoutStep::Confirmation {
            Self::clear(store);
            return Ok(());
        }
        self.save(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn filled() -> ShippingInfo {
        ShippingInfo {
            full_name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            address_line1: "12 MG Road".into(),
            city: "Pune".into(),
            state: "MH".into(),
            postal_code: "411001".into(),
            ..ShippingInfo::default()
        }
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let mut info = filled();
        assert!(info.validate().is_ok());

        info.city = "   ".into();
        info.phone.clear();
        let err = info.validate().unwrap_err();
        assert_eq!(info.missing_fields(), vec!["Phone", "City"]);
        assert!(err.contains("Phone, City"));
    }

    #[test]
    fn test_optional_address_line_not_required() {
        let info = filled();
        assert!(info.address_line2.is_empty());
        assert!(info.missing_fields().is_empty());
    }

    #[test]
    fn test_step_machines_saturate() {
        assert_eq!(CheckoutStep::Shipping.next().next().next(), CheckoutStep::Review);
        assert_eq!(CheckoutStep::Review.prev().prev().prev(), CheckoutStep::Shipping);
        assert_eq!(EnhancedCheckoutStep::CartReview.next(), EnhancedCheckoutStep::Shipping);
        assert_eq!(EnhancedCheckoutStep::Confirmation.prev(), EnhancedCheckoutStep::Confirmation);
        assert_eq!(EnhancedCheckoutStep::Payment.index(), 2);
    }

    #[test]
    fn test_totals_with_coupon_and_shipping() {
        let items = vec![CartItem::new("p1", "Tee", 500.0, 3)];
        let coupon = Coupon {
            code: "OTAKU10".into(),
            discount_type: DiscountType::Percentage,
            value: 10.0,
            min_order_amount: Some(1000.0),
            max_discount: Some(100.0),
        };

        let totals = OrderTotals::compute(&items, Some(&coupon), 80.0, 2000.0);
        assert_eq!(totals.subtotal, 1500.0);
        assert_eq!(totals.discount, 100.0);
        assert_eq!(totals.shipping, 80.0);
        assert_eq!(totals.total, 1480.0);

        let free = OrderTotals::compute(&items, None, 80.0, 1500.0);
        assert_eq!(free.shipping, 0.0);
        assert_eq!(free.total, 1500.0);
    }

    #[test]
    fn test_coupon_minimum_and_flat_cap() {
        let coupon = Coupon {
            code: "FLAT500".into(),
            discount_type: DiscountType::Flat,
            value: 500.0,
            min_order_amount: None,
            max_discount: None,
        };
        assert_eq!(coupon.discount_for(300.0), 300.0);

        let gated = Coupon { min_order_amount: Some(999.0), ..coupon };
        assert!(!gated.is_applicable(500.0));
        assert_eq!(gated.discount_for(500.0), 0.0);
    }

    #[test]
    fn test_snapshot_round_trip_and_clear() {
        let store = MemoryStore::new();
        let snapshot = CheckoutSnapshot {
            step: CheckoutStep::Payment,
            shipping: filled(),
            coupon_code: Some("OTAKU10".into()),
            ..CheckoutSnapshot::default()
        };
        snapshot.save(&store).unwrap();
        assert_eq!(CheckoutSnapshot::load(&store), Some(snapshot));

        CheckoutSnapshot::clear(&store);
        assert_eq!(CheckoutSnapshot::load(&store), None);
    }

    #[test]
    fn test_confirmed_snapshot_is_dropped() {
        let store = MemoryStore::new();
        let in_progress = CheckoutSnapshot {
            enhanced_step: EnhancedCheckoutStep::Payment,
            shipping: filled(),
            coupon_code: Some("OTAKU10".into()),
            ..CheckoutSnapshot::default()
        };
        in_progress.sync(&store).unwrap();
        assert_eq!(CheckoutSnapshot::load(&store), Some(in_progress.clone()));

        let confirmed = CheckoutSnapshot {
            enhanced_step: EnhancedCheckoutStep::Confirmation,
            ..in_progress
        };
        confirmed.sync(&store).unwrap();
        assert_eq!(CheckoutSnapshot::load(&store), None);
    }

    #[test]
    fn test_user_data_from_shipping() {
        let user = filled().to_user_data();
        assert_eq!(user.first_name.as_deref(), Some("Asha"));
        assert_eq!(user.last_name.as_deref(), Some("Rao"));
        assert_eq!(user.country.as_deref(), Some("India"));
    }
}
