//! Variant cache over a reserved store namespace.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::CacheResult;
use crate::key::Fingerprint;
use crate::store::KvStore;

/// Default namespace for rendered variants.
pub const DEFAULT_NAMESPACE: &str = "resource_custom";

/// Whole seconds in `ttl`, rounded up so a non-zero ttl never becomes the
/// "never expires" value 0.
pub fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

/// Outcome of a cache decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the variant cache.
    Hit,
    /// Not cached (or expired); rendered fresh.
    Miss,
    /// Lookup skipped on request; rendered fresh.
    Bypass,
    /// The store failed; treated as a miss.
    Error,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Bypass => write!(f, "BYPASS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A cached page entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    /// The rendered output.
    pub content: String,
    /// When the entry was created (Unix seconds).
    pub created_at: u64,
    /// Time-to-live in seconds; 0 never expires.
    pub ttl_secs: u64,
}

impl CachedPage {
    /// Create a new entry.
    pub fn new(content: impl Into<String>, created_at: u64, ttl: Duration) -> Self {
        Self {
            content: content.into(),
            created_at,
            ttl_secs: ttl_secs(ttl),
        }
    }

    /// Check if the entry has expired at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.ttl_secs != 0 && now >= self.created_at.saturating_add(self.ttl_secs)
    }

    /// Remaining TTL in seconds, or `None` for entries that never expire.
    pub fn remaining_ttl(&self, now: u64) -> Option<u64> {
        if self.ttl_secs == 0 {
            return None;
        }
        Some(
            self.created_at
                .saturating_add(self.ttl_secs)
                .saturating_sub(now),
        )
    }

    /// Age in seconds at `now`.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }
}

/// Result of a cache get operation with metadata.
#[derive(Debug, Clone)]
pub struct CacheGetResult {
    /// The cached page (if found).
    pub page: Option<CachedPage>,
    /// Cache status.
    pub status: CacheStatus,
}

impl CacheGetResult {
    /// Create a hit result.
    pub fn hit(page: CachedPage) -> Self {
        Self {
            page: Some(page),
            status: CacheStatus::Hit,
        }
    }

    /// Create a miss result.
    pub fn miss() -> Self {
        Self {
            page: None,
            status: CacheStatus::Miss,
        }
    }

    /// Create an error result.
    pub fn error() -> Self {
        Self {
            page: None,
            status: CacheStatus::Error,
        }
    }

    /// Whether a usable entry was found.
    pub fn is_hit(&self) -> bool {
        self.status == CacheStatus::Hit
    }

    /// The cached content, if any.
    pub fn into_content(self) -> Option<String> {
        self.page.map(|p| p.content)
    }
}

/// Cache of rendered variants, confined to one namespace of a `KvStore`.
///
/// Lookups never fail: a store error is reported as `CacheStatus::Error`
/// and callers treat it as a miss.
pub struct VariantCache<S: KvStore, K: Clock = SystemClock> {
    store: S,
    clock: K,
    namespace: String,
    ttl: Duration,
}

impl<S: KvStore> VariantCache<S, SystemClock> {
    /// Create a cache over `namespace` whose entries never expire.
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            clock: SystemClock,
            namespace: namespace.into(),
            ttl: Duration::ZERO,
        }
    }
}

impl<S: KvStore, K: Clock> VariantCache<S, K> {
    /// Use a different time source.
    pub fn with_clock<K2: Clock>(self, clock: K2) -> VariantCache<S, K2> {
        VariantCache {
            store: self.store,
            clock,
            namespace: self.namespace,
            ttl: self.ttl,
        }
    }

    /// Set the default TTL. Zero keeps entries until the namespace is cleared.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The reserved namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The default TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The current time according to this cache's clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Look up a fingerprint.
    pub fn get(&self, fingerprint: &Fingerprint) -> CacheGetResult {
        let key = fingerprint.as_str();

        let bytes = match self.store.get(&self.namespace, key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CacheGetResult::miss(),
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, fingerprint = key, error = %e, "variant cache read failed");
                return CacheGetResult::error();
            }
        };

        let page: CachedPage = match serde_json::from_slice(&bytes) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, fingerprint = key, error = %e, "discarding undecodable cache entry");
                let _ = self.store.delete(&self.namespace, key);
                return CacheGetResult::error();
            }
        };

        if page.is_expired(self.clock.now()) {
            tracing::trace!(namespace = %self.namespace, fingerprint = key, "cache entry expired");
            let _ = self.store.delete(&self.namespace, key);
            return CacheGetResult::miss();
        }

        CacheGetResult::hit(page)
    }

    /// Store rendered output under the default TTL.
    pub fn set(&self, fingerprint: &Fingerprint, content: impl Into<String>) -> CacheResult<()> {
        self.set_with_ttl(fingerprint, content, self.ttl)
    }

    /// Store rendered output, overwriting any existing entry.
    pub fn set_with_ttl(
        &self,
        fingerprint: &Fingerprint,
        content: impl Into<String>,
        ttl: Duration,
    ) -> CacheResult<()> {
        let page = CachedPage::new(content, self.clock.now(), ttl);
        let bytes = serde_json::to_vec(&page)?;
        self.store.set(&self.namespace, fingerprint.as_str(), bytes)
    }

    /// Remove every entry in the namespace.
    pub fn clear_namespace(&self) -> CacheResult<u64> {
        self.store.clear_namespace(&self.namespace)
    }
}
