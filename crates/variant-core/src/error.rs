//! Error types for variant resolution and rendering.

/// Errors that can occur while resolving a variant.
#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    /// The resource lacks one or more alternate template attributes.
    #[error("resource {resource} has no value for {}", .missing.join(", "))]
    ConfigurationIncomplete {
        /// The resource being served.
        resource: String,
        /// Names of the empty or absent attributes.
        missing: Vec<String>,
    },

    /// A forced variant name that matches no known variant.
    #[error("unknown variant override: {0:?}")]
    UnknownOverride(String),
}

/// Failure reported by a `PageRenderer`.
#[derive(Debug, thiserror::Error)]
#[error("render failed for {resource}: {message}")]
pub struct RenderError {
    /// The resource being rendered.
    pub resource: String,
    /// What went wrong.
    pub message: String,
}

impl RenderError {
    /// Create a render error.
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
        }
    }
}
