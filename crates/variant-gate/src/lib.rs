//! Variant-aware cache-or-render gate.
//!
//! On every page load the gate picks a presentation variant for the
//! requesting client, then serves that (resource, variant) pair from a
//! dedicated cache namespace, rendering and storing it on a miss. A
//! content-update event clears the namespace.
//!
//! This crate provides:
//! - `RenderGate` - The page-load decision
//! - `VariantResolver` - Override / classifier precedence
//! - `InvalidationHook` - Namespace-wide invalidation
//! - `GateConfig` - Process-wide configuration
//!
//! # Example
//!
//! ```ignore
//! use variant_gate::prelude::*;
//!
//! let gate = RenderGate::new(GateConfig::default(), InMemoryStore::new(), UserAgentClassifier)?;
//!
//! let mut request = RequestContext::from_http(&http_request);
//! match gate.on_page_load(&mut resource, &mut request, &renderer) {
//!     GateOutcome::Served(page) => page.explain.apply(response.headers_mut()),
//!     GateOutcome::Aborted { .. } | GateOutcome::Degraded { .. } => {}
//! }
//!
//! // On content updates
//! gate.on_before_cache_update();
//! ```

mod config;
mod gate;
mod invalidate;
mod resolve;

pub use config::*;
pub use gate::*;
pub use invalidate::*;
pub use resolve::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{GateConfig, GateOutcome, InvalidationHook, RenderGate, ServedPage};
    pub use variant_cache::{CacheStatus, InMemoryStore, KvStore, VariantCache};
    pub use variant_core::{
        ClientClassifier, Page, PageRenderer, RenderError, RequestContext, Resource,
        UserAgentClassifier, Variant, BROWSER_DETECTED,
    };
}
