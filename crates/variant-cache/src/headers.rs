//! Cache debugging headers.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use variant_core::Variant;

use crate::cache::{CacheStatus, CachedPage};
use crate::key::Fingerprint;

/// Header names for cache debugging.
pub mod header_names {
    /// Cache status header (HIT, MISS, BYPASS, ERROR).
    pub const X_CACHE_STATUS: &str = "X-Cache-Status";
    /// Fingerprint used for lookup.
    pub const X_CACHE_KEY: &str = "X-Cache-Key";
    /// Cache age in seconds.
    pub const X_CACHE_AGE: &str = "X-Cache-Age";
    /// Cache TTL remaining.
    pub const X_CACHE_TTL: &str = "X-Cache-TTL";
    /// Variant the response was rendered as.
    pub const X_VARIANT: &str = "X-Variant";
}

/// Cache explain headers for debugging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheExplainHeaders {
    /// Overall cache status.
    pub status: Option<CacheStatus>,
    /// Fingerprint used.
    pub cache_key: Option<String>,
    /// Variant served.
    pub variant: Option<Variant>,
    /// Age of cached response in seconds.
    pub age_secs: Option<u64>,
    /// Remaining TTL in seconds.
    pub ttl_secs: Option<u64>,
}

impl CacheExplainHeaders {
    /// Create new explain headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache status.
    pub fn with_status(mut self, status: CacheStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the fingerprint, and the variant it encodes.
    pub fn with_fingerprint(mut self, fingerprint: &Fingerprint) -> Self {
        self.cache_key = Some(fingerprint.as_str().to_string());
        self.variant = Some(fingerprint.variant());
        self
    }

    /// Set age and remaining TTL from a cached entry.
    pub fn with_entry(mut self, page: &CachedPage, now: u64) -> Self {
        self.age_secs = Some(page.age(now));
        self.ttl_secs = page.remaining_ttl(now);
        self
    }

    /// Convert to HTTP headers.
    pub fn to_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        if let Some(status) = &self.status {
            headers.push((header_names::X_CACHE_STATUS.to_string(), status.to_string()));
        }

        if let Some(key) = &self.cache_key {
            headers.push((header_names::X_CACHE_KEY.to_string(), key.clone()));
        }

        if let Some(variant) = &self.variant {
            headers.push((header_names::X_VARIANT.to_string(), variant.to_string()));
        }

        if let Some(age) = self.age_secs {
            headers.push((header_names::X_CACHE_AGE.to_string(), age.to_string()));
        }

        if let Some(ttl) = self.ttl_secs {
            headers.push((header_names::X_CACHE_TTL.to_string(), ttl.to_string()));
        }

        headers
    }

    /// Write the headers into an HTTP header map, skipping any value that
    /// is not a valid header value.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.to_headers() {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.insert(name, value);
            }
        }
    }

    /// Convert to JSON for debugging endpoint.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::fingerprint;
    use std::time::Duration;
    use variant_core::ResourceId;

    #[test]
    fn test_to_headers() {
        let fp = fingerprint(&ResourceId::from(4), Variant::Tablet);
        let page = CachedPage::new("x", 100, Duration::from_secs(60));
        let explain = CacheExplainHeaders::new()
            .with_status(CacheStatus::Hit)
            .with_fingerprint(&fp)
            .with_entry(&page, 130);

        let headers = explain.to_headers();
        assert!(headers.contains(&("X-Cache-Status".to_string(), "HIT".to_string())));
        assert!(headers.contains(&("X-Cache-Key".to_string(), "4.tablet".to_string())));
        assert!(headers.contains(&("X-Variant".to_string(), "tablet".to_string())));
        assert!(headers.contains(&("X-Cache-Age".to_string(), "30".to_string())));
        assert!(headers.contains(&("X-Cache-TTL".to_string(), "30".to_string())));
    }

    #[test]
    fn test_unlimited_ttl_has_no_ttl_header() {
        let page = CachedPage::new("x", 100, Duration::ZERO);
        let explain = CacheExplainHeaders::new().with_entry(&page, 100);
        assert!(explain
            .to_headers()
            .iter()
            .all(|(name, _)| name != header_names::X_CACHE_TTL));
    }

    #[test]
    fn test_apply_to_header_map() {
        let fp = fingerprint(&ResourceId::from(9), Variant::Mobile);
        let mut map = HeaderMap::new();
        CacheExplainHeaders::new()
            .with_status(CacheStatus::Miss)
            .with_fingerprint(&fp)
            .apply(&mut map);

        assert_eq!(map.get("x-cache-status").unwrap(), "MISS");
        assert_eq!(map.get("x-cache-key").unwrap(), "9.mobile");
        assert_eq!(map.get("x-variant").unwrap(), "mobile");
    }

    #[test]
    fn test_to_json() {
        let json = CacheExplainHeaders::new()
            .with_status(CacheStatus::Bypass)
            .to_json();
        assert!(json.contains("\"bypass\""));
    }
}
