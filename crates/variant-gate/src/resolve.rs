//! Variant resolution for one request.

use variant_core::{ClientClassifier, RequestContext, Resource, Variant, VariantError, VariantTemplates};
use variant_observability::RequestLogger;

use crate::config::GateConfig;

/// How a variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// A recognised `template` override.
    Override,
    /// The client classifier.
    Classified,
}

/// The variant chosen for a request and the template it renders with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Chosen variant.
    pub variant: Variant,
    /// Template the resource must render with.
    pub template: String,
    /// How the variant was chosen.
    pub source: ResolutionSource,
}

/// Picks the variant for a resource.
///
/// Order: a resource without both alternate templates is rejected outright,
/// even when an override is present; a known override wins without
/// consulting the classifier; anything else goes to the classifier.
pub struct VariantResolver<'a, C: ?Sized> {
    config: &'a GateConfig,
    classifier: &'a C,
}

impl<'a, C: ClientClassifier + ?Sized> VariantResolver<'a, C> {
    /// Create a resolver.
    pub fn new(config: &'a GateConfig, classifier: &'a C) -> Self {
        Self { config, classifier }
    }

    /// Resolve the variant for `resource`.
    ///
    /// Fails only with `VariantError::ConfigurationIncomplete`.
    pub fn resolve<R: Resource + ?Sized>(
        &self,
        resource: &R,
        request: &RequestContext,
        log: &RequestLogger,
    ) -> Result<Resolution, VariantError> {
        let templates = VariantTemplates::from_resource(
            resource,
            &self.config.tablet_template_attr,
            &self.config.mobile_template_attr,
        )?;

        if let Some(raw) = request.overrides.template.as_deref() {
            match raw.parse::<Variant>() {
                Ok(variant) => {
                    let template = templates.template_for(variant).to_string();
                    log.diag(&format!(
                        "manual override to {variant} template ({template})"
                    ));
                    return Ok(Resolution {
                        variant,
                        template,
                        source: ResolutionSource::Override,
                    });
                }
                Err(e) => log.diag(&format!("{e}; classifying client")),
            }
        }

        let variant = self.classifier.classify(request);
        log.diag(&format!("{variant} detected"));

        Ok(Resolution {
            variant,
            template: templates.template_for(variant).to_string(),
            source: ResolutionSource::Classified,
        })
    }
}
