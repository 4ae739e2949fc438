//! Page Context
//!
//! What the trackers need to know about the page being viewed.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    /// Full URL including query string
    pub url: String,
    pub title: String,
    /// `document.referrer`, empty when none
    pub referrer: String,
}

impl PageContext {
    pub fn new(url: impl Into<String>, title: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            referrer: referrer.into(),
        }
    }

    /// Path component of the URL, without query or fragment
    pub fn path(&self) -> String {
        let without_scheme = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        let after_host = match without_scheme.find('/') {
            Some(idx) if self.url.contains("://") => &without_scheme[idx..],
            Some(_) => without_scheme,
            None => "/",
        };
        let end = after_host.find(['?', '#']).unwrap_or(after_host.len());
        let path = &after_host[..end];
        if path.is_empty() { "/".to_string() } else { path.to_string() }
    }

    pub fn query_params(&self) -> HashMap<String, String> {
        parse_query(&self.url)
    }

    pub fn host(&self) -> Option<String> {
        host_of(&self.url)
    }

    pub fn referrer_host(&self) -> Option<String> {
        if self.referrer.is_empty() {
            None
        } else {
            host_of(&self.referrer)
        }
    }
}

/// Decode the query string of a URL into a map. Later duplicates win.
pub fn parse_query(url: &str) -> HashMap<String, String> {
    let query = match url.split_once('?') {
        Some((_, q)) => q.split('#').next().unwrap_or(""),
        None => return HashMap::new(),
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(k);
            if key.is_empty() {
                return None;
            }
            Some((key, decode_component(v)))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().trim().to_string()
}

/// Lowercased host without a leading `www.`
pub fn host_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?.split(':').next()?.to_lowercase();
    if host.is_empty() {
        return None;
    }
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_decodes() {
        let params = parse_query("https://shop.test/?utm_source=insta%20gram&utm_campaign=summer+sale#top");
        assert_eq!(params.get("utm_source").map(String::as_str), Some("insta gram"));
        assert_eq!(params.get("utm_campaign").map(String::as_str), Some("summer sale"));
    }

    #[test]
    fn test_path_and_host() {
        let page = PageContext::new("https://www.Shop.test/products/42?x=1", "Tee", "");
        assert_eq!(page.path(), "/products/42");
        assert_eq!(page.host().as_deref(), Some("shop.test"));
        assert_eq!(page.referrer_host(), None);
    }
}
