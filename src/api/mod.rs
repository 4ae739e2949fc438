//! REST Client
//!
//! Frontend bindings to the storefront backend, organized by resource.
//! Errors are plain strings ready to show the shopper.

mod catalog;
mod checkout;
mod orders;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_core::KeyValueStore;

use crate::browser::{BrowserStorage, ADMIN_TOKEN_KEY};
use crate::config;

// Re-export all public items
pub use catalog::*;
pub use checkout::*;
pub use orders::*;

fn url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default();
    format!("{}{}", config::absolute_api_base(&config::get().api_base_url, &origin), path)
}

fn request(method: Method, path: &str, admin: bool) -> RequestBuilder {
    let builder = reqwest::Client::new().request(method, url(path));
    if !admin {
        return builder;
    }
    match BrowserStorage::Local.get(ADMIN_TOKEN_KEY) {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Backend errors look like `{"message": "..."}`
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

async fn check(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_message(status.as_u16(), &body))
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message,
        _ => match status {
            401 | 403 => "You are not authorized to do that".to_string(),
            404 => "Not found".to_string(),
            _ => format!("Request failed ({})", status),
        },
    }
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, String> {
    let response = builder.send().await.map_err(|e| {
        log::warn!("api: network error: {}", e);
        "Network error, please try again".to_string()
    })?;
    let response = check(response).await?;
    response.json::<T>().await.map_err(|e| e.to_string())
}

pub(crate) async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    send(request(Method::GET, path, false)).await
}

pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, String> {
    send(request(Method::POST, path, false).json(body)).await
}

pub(crate) async fn admin_json<B: Serialize + ?Sized, T: DeserializeOwned>(method: Method, path: &str, body: &B) -> Result<T, String> {
    send(request(method, path, true).json(body)).await
}

pub(crate) async fn admin_delete(path: &str) -> Result<(), String> {
    let response = request(Method::DELETE, path, true)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check(response).await.map(|_| ())
}

pub(crate) async fn get_text(path: &str) -> Result<String, String> {
    let response = request(Method::GET, path, false)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check(response).await?.text().await.map_err(|e| e.to_string())
}

pub fn set_admin_token(token: &str) {
    if token.trim().is_empty() {
        BrowserStorage::Local.remove(ADMIN_TOKEN_KEY);
    } else if let Err(e) = BrowserStorage::Local.set(ADMIN_TOKEN_KEY, token.trim()) {
        log::warn!("api: could not store admin token: {}", e);
    }
}

pub fn has_admin_token() -> bool {
    BrowserStorage::Local.get(ADMIN_TOKEN_KEY).is_some()
}

/// Percent-encode a path segment or query value
pub(crate) fn encode(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, percent_encoding::NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_backend_text() {
        assert_eq!(error_message(400, r#"{"message":"Coupon expired"}"#), "Coupon expired");
        assert_eq!(error_message(404, "<html>"), "Not found");
        assert_eq!(error_message(502, ""), "Request failed (502)");
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode("ORD 1/2"), "ORD%201%2F2");
    }
}
