//! Fingerprints identifying a cached (resource, variant) pair.

use serde::{Deserialize, Serialize};
use variant_core::{ResourceId, Variant};

/// Separator between the resource ID and the variant slug.
///
/// Slugs never contain it, so the text after its last occurrence always
/// names the variant, even when the resource ID contains it.
pub const FINGERPRINT_SEPARATOR: char = '.';

/// A cache key uniquely identifying one rendered variant of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    key: String,
    resource: ResourceId,
    variant: Variant,
}

impl Fingerprint {
    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The resource this fingerprint belongs to.
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// The variant this fingerprint belongs to.
    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Builds fingerprints. Pure and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintBuilder;

impl FingerprintBuilder {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Self
    }

    /// Build the fingerprint for `resource` rendered as `variant`.
    pub fn build(&self, resource: &ResourceId, variant: Variant) -> Fingerprint {
        Fingerprint {
            key: format!("{}{}{}", resource, FINGERPRINT_SEPARATOR, variant.slug()),
            resource: resource.clone(),
            variant,
        }
    }
}

/// Shorthand for `FingerprintBuilder::new().build(resource, variant)`.
pub fn fingerprint(resource: &ResourceId, variant: Variant) -> Fingerprint {
    FingerprintBuilder::new().build(resource, variant)
}
