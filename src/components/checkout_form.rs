//! Checkout Building Blocks
//!
//! Shipping form, totals summary and step indicator shared by both
//! checkout flows, plus the order submission itself.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use serde_json::{Map, Value};
use storefront_core::{CartItem, CheckoutSnapshot, Coupon, OrderTotals, PaymentMethod, ShippingInfo};

use crate::api;
use crate::browser::BrowserStorage;
use crate::config;
use crate::models::{format_price, CreateOrderRequest, Order, OrderItem};
use crate::tracking;

/// Simulated gateway round trip for online payments in test mode
const TEST_PAYMENT_DELAY_MS: u32 = 1500;

/// (key, label, input type, autocomplete)
const SHIPPING_FIELDS: &[(&str, &str, &str, &str)] = &[
    ("fullName", "Full name", "text", "name"),
    ("email", "Email", "email", "email"),
    ("phone", "Phone", "tel", "tel"),
    ("addressLine1", "Address", "text", "address-line1"),
    ("addressLine2", "Apartment, landmark (optional)", "text", "address-line2"),
    ("city", "City", "text", "address-level2"),
    ("state", "State", "text", "address-level1"),
    ("postalCode", "PIN code", "text", "postal-code"),
];

fn field(info: &ShippingInfo, key: &str) -> String {
    match key {
        "fullName" => info.full_name.clone(),
        "email" => info.email.clone(),
        "phone" => info.phone.clone(),
        "addressLine1" => info.address_line1.clone(),
        "addressLine2" => info.address_line2.clone(),
        "city" => info.city.clone(),
        "state" => info.state.clone(),
        "postalCode" => info.postal_code.clone(),
        _ => String::new(),
    }
}

fn set_field(info: &mut ShippingInfo, key: &str, value: String) {
    match key {
        "fullName" => info.full_name = value,
        "email" => info.email = value,
        "phone" => info.phone = value,
        "addressLine1" => info.address_line1 = value,
        "addressLine2" => info.address_line2 = value,
        "city" => info.city = value,
        "state" => info.state = value,
        "postalCode" => info.postal_code = value,
        _ => {}
    }
}

#[component]
pub fn ShippingForm(shipping: RwSignal<ShippingInfo>) -> impl IntoView {
    view! {
        <div class="shipping-form">
            {SHIPPING_FIELDS.iter().map(|&(key, label, kind, autocomplete)| view! {
                <label class="field">
                    <span>{label}</span>
                    <input
                        type=kind
                        name=key
                        autocomplete=autocomplete
                        prop:value=move || shipping.with(|s| field(s, key))
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            shipping.update(|s| set_field(s, key, value));
                        }
                    />
                </label>
            }).collect_view()}
        </div>
    }
}

#[component]
pub fn OrderSummary(#[prop(into)] totals: Signal<OrderTotals>) -> impl IntoView {
    view! {
        <dl class="order-summary">
            <dt>"Subtotal"</dt>
            <dd>{move || format_price(totals.get().subtotal)}</dd>
            <Show when=move || { totals.get().discount > 0.0 }>
                <dt>"Discount"</dt>
                <dd class="discount">"-" {move || format_price(totals.get().discount)}</dd>
            </Show>
            <dt>"Shipping"</dt>
            <dd>
                {move || {
                    let shipping = totals.get().shipping;
                    if shipping == 0.0 { "Free".to_string() } else { format_price(shipping) }
                }}
            </dd>
            <dt class="total">"Total"</dt>
            <dd class="total">{move || format_price(totals.get().total)}</dd>
        </dl>
    }
}

#[component]
pub fn StepIndicator(labels: Vec<&'static str>, #[prop(into)] current: Signal<usize>) -> impl IntoView {
    view! {
        <ol class="steps">
            {labels.into_iter().enumerate().map(|(i, label)| view! {
                <li
                    class:done=move || i < current.get()
                    class:active=move || i == current.get()
                >
                    <span class="step-number">{i + 1}</span>
                    {label}
                </li>
            }).collect_view()}
        </ol>
    }
}

/// Everything needed to submit an order
pub struct OrderDraft {
    pub items: Vec<CartItem>,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub coupon: Option<Coupon>,
    pub shipping_rate: f64,
}

impl OrderDraft {
    /// Order request for this draft, or the message to show when it cannot be submitted
    pub fn request(&self, free_shipping_threshold: f64, attribution: Map<String, Value>) -> Result<CreateOrderRequest, String> {
        self.shipping.validate()?;
        if self.items.is_empty() {
            return Err("Your cart is empty.".to_string());
        }
        let totals = OrderTotals::compute(&self.items, self.coupon.as_ref(), self.shipping_rate, free_shipping_threshold);
        Ok(CreateOrderRequest {
            items: self.items.iter().map(OrderItem::from).collect(),
            shipping: self.shipping.clone(),
            payment_method: self.payment_method,
            coupon_code: self.coupon.as_ref().map(|c| c.code.clone()),
            totals,
            attribution,
        })
    }
}

/// Validate, submit, record the purchase and empty the cart.
///
/// Validation failures return before any request is made.
pub async fn place_order(draft: OrderDraft) -> Result<Order, String> {
    let config = config::get();
    let request = draft.request(config.free_shipping_threshold, tracking::attribution_params())?;

    if config.test_mode && draft.payment_method == PaymentMethod::Online {
        log::info!("checkout: simulating online payment");
        TimeoutFuture::new(TEST_PAYMENT_DELAY_MS).await;
    }

    let order = api::create_order(&request).await?;
    log::info!("checkout: order {} placed ({})", order.order_number, format_price(order.total));

    if let Some(customer_id) = &order.customer_id {
        tracking::identify(customer_id);
    }
    tracking::purchase(&order.id, order.total, &draft.items, &draft.shipping.to_user_data());
    tracking::cart().clear();
    CheckoutSnapshot::clear(&BrowserStorage::Session);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            items: vec![CartItem::new("p1", "Akatsuki Tee", 799.0, 2)],
            shipping: ShippingInfo {
                full_name: "Asha Rao".into(),
                email: "asha@example.com".into(),
                phone: "9876543210".into(),
                address_line1: "12 MG Road".into(),
                city: "Pune".into(),
                state: "MH".into(),
                postal_code: "411001".into(),
                ..ShippingInfo::default()
            },
            payment_method: PaymentMethod::CashOnDelivery,
            coupon: None,
            shipping_rate: 60.0,
        }
    }

    #[test]
    fn test_blank_shipping_fields_block_the_request() {
        let mut incomplete = draft();
        incomplete.shipping.city.clear();
        incomplete.shipping.postal_code = "  ".into();
        let err = incomplete.request(999.0, Map::new()).unwrap_err();
        assert!(err.contains("City"));
        assert!(err.contains("PIN code"), "{}", err);
    }

    #[test]
    fn test_empty_cart_blocks_the_request() {
        let mut empty = draft();
        empty.items.clear();
        assert_eq!(empty.request(999.0, Map::new()).unwrap_err(), "Your cart is empty.");
    }

    #[test]
    fn test_request_carries_totals_and_attribution() {
        let mut attribution = Map::new();
        attribution.insert("utm_source".into(), Value::from("instagram"));
        let request = draft().request(999.0, attribution).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.totals.subtotal, 1598.0);
        assert_eq!(request.totals.shipping, 0.0);
        assert_eq!(request.coupon_code, None);
        assert_eq!(request.attribution.get("utm_source"), Some(&Value::from("instagram")));
    }
}
