//! Order placement, secure tracking and invoices

use serde::{Deserialize, Serialize};

use super::{encode, get_json, get_text, post_json};
use crate::models::{CreateOrderRequest, Order, TrackedOrder};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackByPinArgs<'a> {
    order_number: &'a str,
    pin: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MagicLinkArgs<'a> {
    email: &'a str,
    order_number: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

pub async fn create_order(request: &CreateOrderRequest) -> Result<Order, String> {
    post_json("/orders", request).await
}

pub async fn track_order_by_pin(order_number: &str, pin: &str) -> Result<TrackedOrder, String> {
    let args = TrackByPinArgs {
        order_number: order_number.trim(),
        pin: pin.trim(),
    };
    post_json("/orders/track", &args).await
}

/// Token comes from the emailed magic link (`?token=...`)
pub async fn track_order_by_token(token: &str) -> Result<TrackedOrder, String> {
    get_json(&format!("/orders/track/{}", encode(token))).await
}

pub async fn request_magic_link(email: &str, order_number: &str) -> Result<String, String> {
    let args = MagicLinkArgs {
        email: email.trim(),
        order_number: order_number.trim(),
    };
    let response: MessageResponse = post_json("/orders/magic-link", &args).await?;
    Ok(response.message)
}

pub async fn invoice_html(order_id: &str, access_token: &str) -> Result<String, String> {
    get_text(&format!("/orders/{}/invoice?token={}", encode(order_id), encode(access_token))).await
}
