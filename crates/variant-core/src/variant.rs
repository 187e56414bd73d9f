//! Presentation variants and the templates they resolve to.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::resource::Resource;

/// A presentation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The resource's own template.
    #[default]
    Desktop,
    /// Larger alternate form.
    Tablet,
    /// Smaller alternate form.
    Mobile,
}

impl Variant {
    /// Every known variant.
    pub const ALL: [Variant; 3] = [Self::Desktop, Self::Tablet, Self::Mobile];

    /// Stable lowercase name, used in fingerprints and placeholders.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }

    /// Whether this is the default variant.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Desktop)
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Variant {
    type Err = VariantError;

    /// Exact, case-sensitive match on the slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.slug() == s)
            .ok_or_else(|| VariantError::UnknownOverride(s.to_string()))
    }
}

/// The concrete template for each variant of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantTemplates {
    /// The resource's own template.
    pub desktop: String,
    /// Template used for tablet clients.
    pub tablet: String,
    /// Template used for mobile clients.
    pub mobile: String,
}

impl VariantTemplates {
    /// Read the templates from a resource.
    ///
    /// Both alternate attributes must hold a non-empty value; otherwise the
    /// resource is not set up for variant switching.
    pub fn from_resource<R: Resource + ?Sized>(
        resource: &R,
        tablet_attr: &str,
        mobile_attr: &str,
    ) -> Result<Self, VariantError> {
        let read = |name: &str| {
            resource
                .attribute(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tablet = read(tablet_attr);
        let mobile = read(mobile_attr);

        match (tablet, mobile) {
            (Some(tablet), Some(mobile)) => Ok(Self {
                desktop: resource.template(),
                tablet,
                mobile,
            }),
            (tablet, mobile) => {
                let mut missing = Vec::new();
                if tablet.is_none() {
                    missing.push(tablet_attr.to_string());
                }
                if mobile.is_none() {
                    missing.push(mobile_attr.to_string());
                }
                Err(VariantError::ConfigurationIncomplete {
                    resource: resource.id().to_string(),
                    missing,
                })
            }
        }
    }

    /// The template a variant renders with.
    pub fn template_for(&self, variant: Variant) -> &str {
        match variant {
            Variant::Desktop => &self.desktop,
            Variant::Tablet => &self.tablet,
            Variant::Mobile => &self.mobile,
        }
    }
}
