//! Namespaced page cache for rendered variants.
//!
//! This crate provides:
//! - `Fingerprint` / `FingerprintBuilder` - Cache keys for (resource, variant) pairs
//! - `KvStore` - Pluggable namespaced key-value storage, with `InMemoryStore`
//! - `VariantCache` - Get / set / clear over one reserved namespace, with ttl
//! - `CacheExplainHeaders` - Debug headers describing a cache decision
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use variant_cache::{FingerprintBuilder, InMemoryStore, VariantCache};
//! use variant_core::{ResourceId, Variant};
//!
//! let cache = VariantCache::new(Arc::new(InMemoryStore::new()), "resource_custom");
//! let fp = FingerprintBuilder::new().build(&ResourceId::from(12), Variant::Mobile);
//!
//! cache.set(&fp, "<html>…</html>")?;
//! assert!(cache.get(&fp).is_hit());
//! ```

mod cache;
mod clock;
mod error;
mod headers;
mod key;
mod store;

pub use cache::*;
pub use clock::*;
pub use error::*;
pub use headers::*;
pub use key::*;
pub use store::*;
