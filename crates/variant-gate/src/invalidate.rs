//! Namespace-wide invalidation on content updates.

use std::sync::Arc;

use variant_cache::{Clock, KvStore, SystemClock, VariantCache};

/// Result of firing the invalidation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationReport {
    /// The namespace that was cleared.
    pub namespace: String,
    /// Entries removed, or `None` if the store failed.
    pub cleared: Option<u64>,
}

impl InvalidationReport {
    /// Whether the namespace was cleared.
    pub fn succeeded(&self) -> bool {
        self.cleared.is_some()
    }
}

/// Clears every cached variant of every resource.
///
/// Fire it when content changes, before the host refreshes its own cache.
pub struct InvalidationHook<S: KvStore, K: Clock = SystemClock> {
    cache: Arc<VariantCache<S, K>>,
}

impl<S: KvStore, K: Clock> Clone for InvalidationHook<S, K> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: KvStore, K: Clock> InvalidationHook<S, K> {
    /// Create a hook over a shared cache.
    pub fn new(cache: Arc<VariantCache<S, K>>) -> Self {
        Self { cache }
    }

    /// Clear the variant namespace. Store failures are logged, never raised.
    pub fn fire(&self) -> InvalidationReport {
        let namespace = self.cache.namespace().to_string();

        let cleared = match self.cache.clear_namespace() {
            Ok(count) => {
                tracing::info!(namespace = %namespace, cleared = count, "variant cache cleared");
                Some(count)
            }
            Err(e) => {
                tracing::warn!(namespace = %namespace, error = %e, "variant cache clear failed");
                None
            }
        };

        InvalidationReport { namespace, cleared }
    }
}
