//! Pluggable namespaced key-value storage.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{CacheError, CacheResult};

/// Namespace the host uses for its own page cache.
///
/// The variant cache must never share it, so that clearing either one
/// leaves the other intact.
pub const HOST_DEFAULT_NAMESPACE: &str = "default";

/// Key-value storage partitioned into namespaces.
///
/// Implementations must be safe under concurrent use; callers add no
/// locking of their own.
pub trait KvStore: Send + Sync {
    /// Get a raw value. A missing key is `Ok(None)`.
    fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store a raw value, overwriting any previous one.
    fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> CacheResult<()>;

    /// Delete a single key. Deleting a missing key is not an error.
    fn delete(&self, namespace: &str, key: &str) -> CacheResult<()>;

    /// Remove every key in `namespace`, returning how many were removed.
    ///
    /// Must not touch or enumerate other namespaces.
    fn clear_namespace(&self, namespace: &str) -> CacheResult<u64>;
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).get(namespace, key)
    }

    fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> CacheResult<()> {
        (**self).set(namespace, key, value)
    }

    fn delete(&self, namespace: &str, key: &str) -> CacheResult<()> {
        (**self).delete(namespace, key)
    }

    fn clear_namespace(&self, namespace: &str) -> CacheResult<u64> {
        (**self).clear_namespace(namespace)
    }
}

/// In-process store keeping one map per namespace.
///
/// Clearing a namespace drops its whole map under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    namespaces: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .map(|ns| ns.get(namespace).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    /// Whether `namespace` holds no keys.
    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }
}

impl KvStore for InMemoryStore {
    fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let namespaces = self.namespaces.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(namespaces.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> CacheResult<()> {
        let mut namespaces = self.namespaces.write().map_err(|_| CacheError::LockPoisoned)?;
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> CacheResult<()> {
        let mut namespaces = self.namespaces.write().map_err(|_| CacheError::LockPoisoned)?;
        if let Some(ns) = namespaces.get_mut(namespace) {
            ns.remove(key);
        }
        Ok(())
    }

    fn clear_namespace(&self, namespace: &str) -> CacheResult<u64> {
        let mut namespaces = self.namespaces.write().map_err(|_| CacheError::LockPoisoned)?;
        Ok(namespaces
            .remove(namespace)
            .map_or(0, |ns| ns.len() as u64))
    }
}
