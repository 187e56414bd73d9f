//! Observability for the variant-aware response cache.
//!
//! This crate provides:
//! - `LogLevel` - Verbosity levels, parseable from the `tpldebug` override
//! - `RequestLogger` - Request-scoped diagnostics emitted through `tracing`

mod logging;

pub use logging::*;

// Re-export RequestId from variant-core for convenience
pub use variant_core::RequestId;
