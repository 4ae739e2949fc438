//! Attribution Manager
//!
//! Captures the marketing touchpoint for each page load, classifies it and
//! keeps it in local storage for the configured window.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::clock::Clock;
use crate::config::{AttributionModel, TrackingConfig};
use crate::domain::{new_id, AdPlatform, AttributionData, TrafficType};
use crate::page::PageContext;
use crate::storage::{load_json, save_json, KeyValueStore, ATTRIBUTION_KEY};

const PAID_MEDIUMS: &[&str] = &[
    "cpc", "ppc", "cpm", "cpv", "cpa", "display", "ads", "ad", "sponsored", "retargeting", "remarketing",
];
const EMAIL_MEDIUMS: &[&str] = &["email", "e-mail", "e_mail", "newsletter"];
const SOCIAL_MEDIUMS: &[&str] = &["social", "social-media", "social_media", "organic_social", "sm"];

const SEARCH_ENGINES: &[&str] = &["google", "bing", "yahoo", "duckduckgo", "baidu", "yandex", "ecosia", "search.brave.com"];
const SOCIAL_SITES: &[&str] = &[
    "facebook", "instagram", "twitter", "t.co", "x.com", "linkedin", "pinterest", "youtube", "tiktok", "reddit",
    "snapchat", "whatsapp", "telegram", "threads",
];
const WEBMAIL_HOSTS: &[&str] = &["mail.google.com", "outlook.live.com", "outlook.office.com", "mail.yahoo.com"];

/// PII supplied at checkout or sign-up, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashedAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// `user_data` block for Google enhanced conversions / Meta advanced matching
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancedConversionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_phone_number: Option<String>,
    pub address: HashedAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gclid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
}

pub struct AttributionManager<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    config: TrackingConfig,
    current: Option<AttributionData>,
}

impl<S: KeyValueStore, C: Clock> AttributionManager<S, C> {
    pub fn new(store: S, clock: C, config: TrackingConfig) -> Self {
        Self {
            store,
            clock,
            config,
            current: None,
        }
    }

    /// Resolve attribution for a page load and persist it
    pub fn capture(&mut self, page: &PageContext) -> &AttributionData {
        let now = self.clock.now();
        let visit_id = new_id("visit");
        let stored = self.load_within_window();
        let fresh = extract_from_url(page, now, &visit_id).or_else(|| extract_from_referrer(page, now, &visit_id));

        let resolved = match (stored, fresh) {
            (Some(mut previous), Some(fresh)) => match self.config.attribution_model {
                AttributionModel::FirstClick => {
                    previous.visit_count += 1;
                    previous.last_visit = now;
                    previous.session_id = visit_id;
                    previous
                }
                AttributionModel::LastClick => AttributionData {
                    first_visit: previous.first_visit,
                    visit_count: previous.visit_count + 1,
                    ..fresh
                },
            },
            (Some(mut previous), None) => {
                previous.visit_count += 1;
                previous.last_visit = now;
                previous.session_id = visit_id;
                previous
            }
            (None, Some(fresh)) => fresh,
            (None, None) => direct_attribution(page, now, &visit_id),
        };

        log::info!(
            "attribution: {} / {} ({}, visit {})",
            resolved.source(),
            resolved.medium(),
            resolved.traffic_type.as_str(),
            resolved.visit_count
        );
        if let Err(e) = save_json(&self.store, ATTRIBUTION_KEY, &resolved) {
            log::warn!("attribution: failed to persist: {}", e);
        }
        self.current.insert(resolved)
    }

    pub fn current(&self) -> Option<&AttributionData> {
        self.current.as_ref()
    }

    pub fn model(&self) -> AttributionModel {
        self.config.attribution_model
    }

    pub fn is_paid(&self) -> bool {
        self.current.as_ref().is_some_and(|a| a.traffic_type == TrafficType::Paid)
    }

    pub fn clear(&mut self) {
        self.store.remove(ATTRIBUTION_KEY);
        self.current = None;
    }

    /// Flat attribution fields merged into every enriched event
    pub fn attribution_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        let Some(a) = &self.current else {
            return params;
        };

        params.insert("traffic_source".into(), a.source().into());
        params.insert("traffic_medium".into(), a.medium().into());
        params.insert("traffic_type".into(), a.traffic_type.as_str().into());
        params.insert("attribution_model".into(), self.config.attribution_model.as_str().into());
        params.insert("visit_count".into(), a.visit_count.into());
        params.insert("landing_page".into(), a.landing_page.clone().into());
        if let Some(platform) = a.platform {
            params.insert("ad_platform".into(), platform.as_str().into());
        }
        let optional = [
            ("campaign", &a.utm_campaign),
            ("utm_term", &a.utm_term),
            ("utm_content", &a.utm_content),
            ("gclid", &a.gclid),
            ("fbclid", &a.fbclid),
            ("ttclid", &a.ttclid),
            ("msclkid", &a.msclkid),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                params.insert(key.into(), v.clone().into());
            }
        }
        params
    }

    /// Normalized, SHA-256 hashed user data for enhanced conversions
    pub fn enhanced_conversion_data(&self, user: &UserData) -> EnhancedConversionData {
        EnhancedConversionData {
            sha256_email_address: user.email.as_deref().and_then(|e| hash_normalized(&normalize_text(e))),
            sha256_phone_number: user.phone.as_deref().and_then(|p| hash_normalized(&normalize_phone(p))),
            address: HashedAddress {
                sha256_first_name: user.first_name.as_deref().and_then(|n| hash_normalized(&normalize_text(n))),
                sha256_last_name: user.last_name.as_deref().and_then(|n| hash_normalized(&normalize_text(n))),
                city: user.city.as_deref().map(normalize_text).filter(|s| !s.is_empty()),
                region: user.state.as_deref().map(normalize_text).filter(|s| !s.is_empty()),
                postal_code: user.postal_code.as_deref().map(|p| p.trim().to_string()).filter(|s| !s.is_empty()),
                country: user.country.as_deref().map(normalize_text).filter(|s| !s.is_empty()),
            },
            gclid: self.current.as_ref().and_then(|a| a.gclid.clone()),
            fbc: self.current.as_ref().and_then(AttributionData::fbc),
        }
    }

    fn load_within_window(&self) -> Option<AttributionData> {
        let stored: AttributionData = load_json(&self.store, ATTRIBUTION_KEY)?;
        let window = Duration::days(self.config.attribution_window_days);
        if self.clock.now() - stored.captured_at > window {
            log::info!("attribution: stored touchpoint older than {} days, discarding", self.config.attribution_window_days);
            self.store.remove(ATTRIBUTION_KEY);
            return None;
        }
        Some(stored)
    }
}

/// UTM parameters and click ids on the landing URL
fn extract_from_url(page: &PageContext, now: chrono::DateTime<chrono::Utc>, visit_id: &str) -> Option<AttributionData> {
    let params = page.query_params();
    let take = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

    let mut data = AttributionData::blank(page.path(), now, visit_id);
    data.utm_source = take("utm_source").map(|s| s.to_lowercase());
    data.utm_medium = take("utm_medium").map(|s| s.to_lowercase());
    data.utm_campaign = take("utm_campaign");
    data.utm_term = take("utm_term");
    data.utm_content = take("utm_content");
    data.gclid = take("gclid");
    data.gbraid = take("gbraid");
    data.wbraid = take("wbraid");
    data.fbclid = take("fbclid");
    data.ttclid = take("ttclid");
    data.msclkid = take("msclkid");

    let has_utm = data.utm_source.is_some() || data.utm_medium.is_some() || data.utm_campaign.is_some();
    if !has_utm && data.click_id().is_none() {
        return None;
    }

    let referrer_host = external_referrer(page);
    data.referrer = referrer_host.clone();
    let (traffic_type, platform) = classify(&data, referrer_host.as_deref());
    data.traffic_type = traffic_type;
    data.platform = platform;

    if data.utm_source.is_none() {
        data.utm_source = platform
            .map(|p| p.as_str().to_string())
            .or_else(|| referrer_host.as_deref().map(source_from_host));
    }
    if data.utm_medium.is_none() && traffic_type == TrafficType::Paid {
        data.utm_medium = Some("cpc".to_string());
    }
    Some(data)
}

/// Untagged visit arriving from another site
fn extract_from_referrer(page: &PageContext, now: chrono::DateTime<chrono::Utc>, visit_id: &str) -> Option<AttributionData> {
    let host = external_referrer(page)?;
    let traffic_type = classify_host(&host);
    let mut data = AttributionData::blank(page.path(), now, visit_id);
    data.utm_source = Some(source_from_host(&host));
    data.utm_medium = Some(
        match traffic_type {
            TrafficType::Organic => "organic",
            TrafficType::Social => "social",
            TrafficType::Email => "email",
            _ => "referral",
        }
        .to_string(),
    );
    data.referrer = Some(host);
    data.traffic_type = traffic_type;
    Some(data)
}

fn direct_attribution(page: &PageContext, now: chrono::DateTime<chrono::Utc>, visit_id: &str) -> AttributionData {
    let mut data = AttributionData::blank(page.path(), now, visit_id);
    data.utm_source = Some("direct".to_string());
    data.utm_medium = Some("organic".to_string());
    data.traffic_type = TrafficType::Direct;
    data
}

/// Referrer host, ignoring same-site navigation
fn external_referrer(page: &PageContext) -> Option<String> {
    let referrer = page.referrer_host()?;
    match page.host() {
        Some(own) if own == referrer => None,
        _ => Some(referrer),
    }
}

pub fn classify(data: &AttributionData, referrer_host: Option<&str>) -> (TrafficType, Option<AdPlatform>) {
    if let Some((name, _)) = data.click_id() {
        let platform = match name {
            "fbclid" => AdPlatform::Meta,
            "ttclid" => AdPlatform::TikTok,
            "msclkid" => AdPlatform::Microsoft,
            _ => AdPlatform::Google,
        };
        return (TrafficType::Paid, Some(platform));
    }

    let source = data.utm_source.as_deref().unwrap_or("");
    let medium = data.utm_medium.as_deref().unwrap_or("");
    let platform = platform_from_source(source).or_else(|| referrer_host.and_then(platform_from_source));

    if is_paid_medium(medium) {
        return (TrafficType::Paid, platform);
    }
    if EMAIL_MEDIUMS.contains(&medium) {
        return (TrafficType::Email, None);
    }
    if SOCIAL_MEDIUMS.contains(&medium) {
        return (TrafficType::Social, None);
    }
    if medium == "organic" {
        let traffic = if matches_any(source, SOCIAL_SITES) { TrafficType::Social } else { TrafficType::Organic };
        return (traffic, None);
    }
    if medium == "referral" {
        return (TrafficType::Referral, None);
    }

    if !source.is_empty() {
        let traffic = if matches_any(source, SEARCH_ENGINES) {
            TrafficType::Organic
        } else if matches_any(source, SOCIAL_SITES) {
            TrafficType::Social
        } else if EMAIL_MEDIUMS.contains(&source) {
            TrafficType::Email
        } else {
            TrafficType::Referral
        };
        return (traffic, None);
    }

    match referrer_host {
        Some(host) => (classify_host(host), None),
        None => (TrafficType::Direct, None),
    }
}

fn is_paid_medium(medium: &str) -> bool {
    PAID_MEDIUMS.contains(&medium) || medium.starts_with("paid")
}

fn classify_host(host: &str) -> TrafficType {
    if WEBMAIL_HOSTS.iter().any(|h| host == *h) {
        TrafficType::Email
    } else if matches_any(host, SEARCH_ENGINES) {
        TrafficType::Organic
    } else if matches_any(host, SOCIAL_SITES) {
        TrafficType::Social
    } else {
        TrafficType::Referral
    }
}

fn matches_any(value: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| matches_name(value, n))
}

/// Brand names match a whole label (`google` in `www.google.co.in`);
/// dotted names match the domain or a subdomain (`t.co`, never `microsoft.com`)
fn matches_name(value: &str, name: &str) -> bool {
    if name.contains('.') {
        value == name || value.ends_with(&format!(".{}", name))
    } else {
        value.split(['.', '_', '-', ' ']).any(|label| label == name)
    }
}

fn platform_from_source(source: &str) -> Option<AdPlatform> {
    let s = source.to_lowercase();
    if s.contains("google") || s.contains("adwords") || s.contains("youtube") {
        Some(AdPlatform::Google)
    } else if s.contains("facebook") || s.contains("instagram") || s.contains("meta") || s == "fb" || s == "ig" {
        Some(AdPlatform::Meta)
    } else if s.contains("tiktok") {
        Some(AdPlatform::TikTok)
    } else if s.contains("bing") || s.contains("microsoft") || s.contains("msn") {
        Some(AdPlatform::Microsoft)
    } else {
        None
    }
}

/// `l.facebook.com` -> `facebook`, `t.co` -> `twitter`
fn source_from_host(host: &str) -> String {
    let known = SEARCH_ENGINES
        .iter()
        .chain(SOCIAL_SITES.iter())
        .find(|name| matches_name(host, name));
    match known.copied() {
        Some("t.co" | "x.com") => "twitter".to_string(),
        Some("search.brave.com") => "brave".to_string(),
        Some(name) => name.to_string(),
        None => host.to_string(),
    }
}

fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn hash_normalized(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    Some(format!("{:x}", Sha256::digest(value.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap())
    }

    fn config(model: AttributionModel) -> TrackingConfig {
        TrackingConfig {
            attribution_model: model,
            ..TrackingConfig::default()
        }
    }

    fn landing(query: &str, referrer: &str) -> PageContext {
        PageContext::new(format!("https://shop.test/{}", query), "Shop", referrer)
    }

    #[test]
    fn test_first_click_keeps_original_source() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut manager = AttributionManager::new(&store, &clock, config(AttributionModel::FirstClick));

        manager.capture(&landing("?utm_source=instagram&utm_medium=paid_social&utm_campaign=naruto", ""));
        clock.advance(Duration::days(3));
        let mut later = AttributionManager::new(&store, &clock, config(AttributionModel::FirstClick));
        let data = later.capture(&landing("?utm_source=google&utm_medium=cpc", "")).clone();

        assert_eq!(data.utm_source.as_deref(), Some("instagram"));
        assert_eq!(data.utm_campaign.as_deref(), Some("naruto"));
        assert_eq!(data.platform, Some(AdPlatform::Meta));
        assert_eq!(data.visit_count, 2);
        assert_eq!(data.last_visit, clock.now());
    }

    #[test]
    fn test_last_click_overwrites() {
        let store = MemoryStore::new();
        let clock = clock();
        let first_seen = clock.now();
        AttributionManager::new(&store, &clock, config(AttributionModel::LastClick))
            .capture(&landing("?utm_source=newsletter&utm_medium=email", ""));

        clock.advance(Duration::hours(5));
        let mut manager = AttributionManager::new(&store, &clock, config(AttributionModel::LastClick));
        let data = manager.capture(&landing("?gclid=abc123", "")).clone();

        assert_eq!(data.traffic_type, TrafficType::Paid);
        assert_eq!(data.platform, Some(AdPlatform::Google));
        assert_eq!(data.utm_source.as_deref(), Some("google"));
        assert_eq!(data.first_visit, first_seen);
        assert_eq!(data.visit_count, 2);
        assert!(manager.is_paid());
    }

    #[test]
    fn test_expired_window_starts_over() {
        let store = MemoryStore::new();
        let clock = clock();
        AttributionManager::new(&store, &clock, config(AttributionModel::FirstClick))
            .capture(&landing("?utm_source=tiktok&utm_medium=cpc", ""));

        clock.advance(Duration::days(31));
        let mut manager = AttributionManager::new(&store, &clock, config(AttributionModel::FirstClick));
        let data = manager.capture(&landing("", "")).clone();

        assert_eq!(data.traffic_type, TrafficType::Direct);
        assert_eq!(data.utm_source.as_deref(), Some("direct"));
        assert_eq!(data.utm_medium.as_deref(), Some("organic"));
        assert_eq!(data.visit_count, 1);
    }

    #[test]
    fn test_referrer_classification() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut manager = AttributionManager::new(&store, &clock, TrackingConfig::default());

        let data = manager.capture(&landing("", "https://www.google.com/search?q=anime+tees")).clone();
        assert_eq!(data.traffic_type, TrafficType::Organic);
        assert_eq!(data.utm_source.as_deref(), Some("google"));
        assert_eq!(data.platform, None);

        manager.clear();
        let data = manager.capture(&landing("", "https://l.facebook.com/")).clone();
        assert_eq!(data.traffic_type, TrafficType::Social);
        assert_eq!(data.utm_source.as_deref(), Some("facebook"));

        manager.clear();
        let data = manager.capture(&landing("", "https://animeblog.example/post")).clone();
        assert_eq!(data.traffic_type, TrafficType::Referral);
        assert_eq!(data.utm_source.as_deref(), Some("animeblog.example"));
    }

    #[test]
    fn test_referrer_host_table() {
        let cases = [
            ("https://www.microsoft.com/x", TrafficType::Referral, "microsoft.com"),
            ("https://dropbox.com/s/1", TrafficType::Referral, "dropbox.com"),
            ("https://animeblogspot.com/", TrafficType::Referral, "animeblogspot.com"),
            ("https://otakuplanet.com/", TrafficType::Referral, "otakuplanet.com"),
            ("https://myfacebookfans.net/", TrafficType::Referral, "myfacebookfans.net"),
            ("https://t.co/abc", TrafficType::Social, "twitter"),
            ("https://mobile.x.com/home", TrafficType::Social, "twitter"),
            ("https://m.youtube.com/watch", TrafficType::Social, "youtube"),
            ("https://www.google.co.in/", TrafficType::Organic, "google"),
            ("https://search.brave.com/search", TrafficType::Organic, "brave"),
            ("https://mail.google.com/mail/u/0", TrafficType::Email, "google"),
        ];
        for (referrer, traffic, source) in cases {
            let store = MemoryStore::new();
            let clock = clock();
            let mut manager = AttributionManager::new(&store, &clock, TrackingConfig::default());
            let data = manager.capture(&landing("", referrer)).clone();
            assert_eq!(data.traffic_type, traffic, "{}", referrer);
            assert_eq!(data.utm_source.as_deref(), Some(source), "{}", referrer);
        }
    }

    #[test]
    fn test_utm_source_matches_whole_names() {
        assert!(matches_any("instagram", SOCIAL_SITES));
        assert!(matches_any("ig_story.instagram", SOCIAL_SITES));
        assert!(!matches_any("contoso", SOCIAL_SITES));
        assert!(!matches_any("googleish", SEARCH_ENGINES));
    }

    #[test]
    fn test_same_site_referrer_is_direct() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut manager = AttributionManager::new(&store, &clock, TrackingConfig::default());
        let data = manager.capture(&landing("", "https://shop.test/cart")).clone();
        assert_eq!(data.traffic_type, TrafficType::Direct);
    }

    #[test]
    fn test_click_id_platforms() {
        let cases = [
            ("?fbclid=x", AdPlatform::Meta),
            ("?ttclid=x", AdPlatform::TikTok),
            ("?msclkid=x", AdPlatform::Microsoft),
            ("?wbraid=x", AdPlatform::Google),
        ];
        for (query, expected) in cases {
            let data = extract_from_url(&landing(query, ""), Utc::now(), "v").unwrap();
            assert_eq!(data.traffic_type, TrafficType::Paid, "{}", query);
            assert_eq!(data.platform, Some(expected), "{}", query);
        }
    }

    #[test]
    fn test_utm_medium_classification() {
        let cases = [
            ("?utm_source=mailchimp&utm_medium=email", TrafficType::Email),
            ("?utm_source=instagram&utm_medium=social", TrafficType::Social),
            ("?utm_source=bing&utm_medium=cpc", TrafficType::Paid),
            ("?utm_source=partner-site", TrafficType::Referral),
            ("?utm_source=duckduckgo", TrafficType::Organic),
        ];
        for (query, expected) in cases {
            let data = extract_from_url(&landing(query, ""), Utc::now(), "v").unwrap();
            assert_eq!(data.traffic_type, expected, "{}", query);
        }
    }

    #[test]
    fn test_enhanced_conversion_hashing() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut manager = AttributionManager::new(&store, &clock, TrackingConfig::default());
        manager.capture(&landing("?gclid=g-1", ""));

        let user = UserData {
            email: Some("  Test@Example.com ".into()),
            phone: Some("+91 98765-43210".into()),
            first_name: Some("Asha".into()),
            city: Some(" Pune ".into()),
            ..UserData::default()
        };
        let data = manager.enhanced_conversion_data(&user);

        // sha256("test@example.com")
        assert_eq!(
            data.sha256_email_address.as_deref(),
            Some("973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b")
        );
        assert_eq!(data.sha256_phone_number.as_ref().map(String::len), Some(64));
        assert_eq!(data.address.city.as_deref(), Some("pune"));
        assert_eq!(data.address.sha256_last_name, None);
        assert_eq!(data.gclid.as_deref(), Some("g-1"));
    }

    #[test]
    fn test_attribution_params() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut manager = AttributionManager::new(&store, &clock, TrackingConfig::default());
        assert!(manager.attribution_params().is_empty());

        manager.capture(&landing("?utm_source=facebook&utm_medium=cpc&utm_campaign=drop-7&fbclid=F", ""));
        let params = manager.attribution_params();
        assert_eq!(params["traffic_source"], "facebook");
        assert_eq!(params["traffic_type"], "paid");
        assert_eq!(params["ad_platform"], "meta");
        assert_eq!(params["campaign"], "drop-7");
        assert_eq!(params["fbclid"], "F");
    }
}
