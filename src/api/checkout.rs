//! Coupon and shipping lookups used during checkout

use serde::Serialize;
use storefront_core::Coupon;

use super::{encode, get_json, post_json};
use crate::models::ShippingRate;

#[derive(Serialize)]
struct ValidateCouponArgs<'a> {
    code: &'a str,
    subtotal: f64,
}

pub async fn validate_coupon(code: &str, subtotal: f64) -> Result<Coupon, String> {
    post_json("/coupons/validate", &ValidateCouponArgs { code: code.trim(), subtotal }).await
}

pub async fn shipping_rates(postal_code: &str) -> Result<Vec<ShippingRate>, String> {
    get_json(&format!("/shipping/rates?pincode={}", encode(postal_code.trim()))).await
}
