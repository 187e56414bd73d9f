//! Core abstractions for the variant-aware response cache.
//!
//! This crate provides the fundamental types and traits:
//! - `Variant` / `VariantTemplates` - Presentation variants and their templates
//! - `Resource` trait - The page being served, owned by the host
//! - `CacheableGuard` - Scoped suppression of the host's own page cache
//! - `PageRenderer` trait - The host's rendering pipeline
//! - `ClientClassifier` trait - Client device classification
//! - `RequestContext` - Per-request overrides and metadata

mod classify;
mod context;
mod error;
mod render;
mod resource;
mod variant;

pub use classify::*;
pub use context::*;
pub use error::*;
pub use render::*;
pub use resource::*;
pub use variant::*;
