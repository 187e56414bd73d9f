//! The cache-or-render decision for page loads.

use std::sync::Arc;
use std::time::Instant;

use variant_cache::{
    CacheExplainHeaders, CacheStatus, Clock, Fingerprint, FingerprintBuilder, KvStore,
    SystemClock, VariantCache,
};
use variant_core::{
    CacheableGuard, ClientClassifier, PageRenderer, RequestContext, Resource, Variant,
    BROWSER_DETECTED,
};
use variant_observability::RequestLogger;

use crate::config::{ConfigError, GateConfig};
use crate::invalidate::{InvalidationHook, InvalidationReport};
use crate::resolve::{ResolutionSource, VariantResolver};

/// A page served through the gate.
#[derive(Debug, Clone)]
pub struct ServedPage {
    /// Variant served.
    pub variant: Variant,
    /// How the variant was chosen.
    pub source: ResolutionSource,
    /// Cache key of the served content.
    pub fingerprint: Fingerprint,
    /// Whether the content came from the cache.
    pub status: CacheStatus,
    /// Debug headers describing the decision.
    pub explain: CacheExplainHeaders,
}

/// What the gate did with a page load.
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// The resource is not set up for variants; the host renders it as usual.
    Aborted {
        /// Why variant switching was skipped.
        reason: String,
    },
    /// The response content was replaced with the variant's output.
    Served(ServedPage),
    /// Rendering failed; the resource was put back as it was and the host
    /// renders it as usual.
    Degraded {
        /// Variant that failed to render.
        variant: Variant,
        /// Render error.
        error: String,
    },
}

impl GateOutcome {
    /// Whether the gate replaced the response content.
    pub fn is_served(&self) -> bool {
        matches!(self, Self::Served(_))
    }

    /// Cache status of a served page.
    pub fn status(&self) -> Option<CacheStatus> {
        match self {
            Self::Served(page) => Some(page.status),
            _ => None,
        }
    }

    /// Variant the gate settled on, if it got that far.
    pub fn variant(&self) -> Option<Variant> {
        match self {
            Self::Served(page) => Some(page.variant),
            Self::Degraded { variant, .. } => Some(*variant),
            Self::Aborted { .. } => None,
        }
    }

    /// Debug headers of a served page.
    pub fn explain(&self) -> Option<&CacheExplainHeaders> {
        match self {
            Self::Served(page) => Some(&page.explain),
            _ => None,
        }
    }
}

/// Serves each (resource, variant) pair from the variant cache, rendering
/// and storing it on a miss.
///
/// The gate never fails a request: every internal failure ends in either a
/// fresh render or the host's untouched pipeline.
pub struct RenderGate<S: KvStore, C: ClientClassifier, K: Clock = SystemClock> {
    config: GateConfig,
    cache: Arc<VariantCache<S, K>>,
    classifier: C,
    fingerprints: FingerprintBuilder,
}

impl<S: KvStore, C: ClientClassifier> RenderGate<S, C, SystemClock> {
    /// Create a gate over `store`, with entries timed by the system clock.
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: GateConfig, store: S, classifier: C) -> Result<Self, ConfigError> {
        let cache = VariantCache::new(store, config.namespace.clone());
        Self::with_cache(config, cache, classifier)
    }
}

impl<S: KvStore, C: ClientClassifier, K: Clock> RenderGate<S, C, K> {
    /// Create a gate over a prepared cache, e.g. one with a custom clock.
    ///
    /// The cache must use `config`'s namespace. Its ttl is replaced by
    /// `config`'s.
    pub fn with_cache(
        config: GateConfig,
        cache: VariantCache<S, K>,
        classifier: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if cache.namespace() != config.namespace {
            return Err(ConfigError::NamespaceMismatch {
                config: config.namespace.clone(),
                cache: cache.namespace().to_string(),
            });
        }

        let cache = cache.with_ttl(config.ttl());
        Ok(Self {
            config,
            cache: Arc::new(cache),
            classifier,
            fingerprints: FingerprintBuilder::new(),
        })
    }

    /// The gate's configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The variant cache.
    pub fn cache(&self) -> &VariantCache<S, K> {
        &self.cache
    }

    /// A hook sharing this gate's cache.
    pub fn invalidation_hook(&self) -> InvalidationHook<S, K> {
        InvalidationHook::new(Arc::clone(&self.cache))
    }

    /// Handle the content-update event: drop every cached variant.
    pub fn on_before_cache_update(&self) -> InvalidationReport {
        self.invalidation_hook().fire()
    }

    /// Handle a page load.
    ///
    /// On success the resource's template is switched to the variant's,
    /// its content is replaced with the variant's output, and the
    /// `browser_detected` placeholder names the variant.
    pub fn on_page_load<R, P>(
        &self,
        resource: &mut R,
        request: &mut RequestContext,
        renderer: &P,
    ) -> GateOutcome
    where
        R: Resource + ?Sized,
        P: PageRenderer<R> + ?Sized,
    {
        let log = RequestLogger::new(request.request_id.clone(), self.config.debug_level)
            .with_override(request.overrides.debug.as_deref());
        log.record("resource", resource.id());

        let resolution = match VariantResolver::new(&self.config, &self.classifier)
            .resolve(&*resource, request, &log)
        {
            Ok(resolution) => resolution,
            Err(e) => {
                log.warn(&format!("variant switching skipped: {e}"));
                return GateOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
        };

        let variant = resolution.variant;

        let fingerprint = self.fingerprints.build(resource.id(), variant);
        log.record("variant", &variant);
        log.record("fingerprint", &fingerprint);

        let default_template = resource.template();
        resource.set_template(&resolution.template);

        let lookup = if request.overrides.refresh {
            None
        } else {
            Some(self.cache.get(&fingerprint))
        };

        let (content, status, explain) = match lookup {
            Some(result) if result.is_hit() => {
                let explain = match &result.page {
                    Some(page) => CacheExplainHeaders::new().with_entry(page, self.cache.now()),
                    None => CacheExplainHeaders::new(),
                };
                let content = result.into_content().unwrap_or_default();
                log.diag(&format!("serving {fingerprint} from cache"));
                (content, CacheStatus::Hit, explain)
            }
            lookup => {
                let status = match lookup {
                    None => CacheStatus::Bypass,
                    Some(result) => result.status,
                };
                if status == CacheStatus::Error {
                    log.warn("variant cache unavailable; rendering fresh");
                }

                log.diag(&format!("rendering {fingerprint}"));
                let started = Instant::now();
                let rendered = {
                    let guard = CacheableGuard::suppress(&mut *resource);
                    renderer.render(&*guard)
                };

                let content = match rendered {
                    Ok(content) => content,
                    Err(e) => {
                        log.warn(&format!("render failed, falling back to host pipeline: {e}"));
                        resource.set_template(&default_template);
                        return GateOutcome::Degraded {
                            variant,
                            error: e.to_string(),
                        };
                    }
                };
                log.diag(&format!("rendered {fingerprint} in {:?}", started.elapsed()));

                if let Err(e) = self.cache.set(&fingerprint, content.clone()) {
                    log.warn(&format!("could not store {fingerprint}: {e}"));
                }

                (content, status, CacheExplainHeaders::new())
            }
        };

        log.record("status", &status);
        resource.set_content(content);
        request.placeholders.set(BROWSER_DETECTED, variant.slug());

        GateOutcome::Served(ServedPage {
            variant,
            source: resolution.source,
            explain: explain.with_status(status).with_fingerprint(&fingerprint),
            fingerprint,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use variant_cache::{InMemoryStore, HOST_DEFAULT_NAMESPACE};
    use variant_core::{Page, RenderError, UserAgentClassifier};

    use super::*;

    fn page() -> Page {
        Page::new(8, "1")
            .with_attribute("TabletTemplate", "2")
            .with_attribute("MobileTemplate", "3")
    }

    fn gate() -> RenderGate<InMemoryStore, UserAgentClassifier> {
        RenderGate::new(GateConfig::default(), InMemoryStore::new(), UserAgentClassifier).unwrap()
    }

    #[test]
    fn test_outcome_accessors() {
        let gate = gate();
        let renders = AtomicUsize::new(0);
        let renderer = |p: &Page| -> Result<String, RenderError> {
            renders.fetch_add(1, Ordering::SeqCst);
            Ok(format!("tpl {}", p.template()))
        };

        let mut page = page();
        let mut request = RequestContext::new("/").with_query("template", "mobile");
        let outcome = gate.on_page_load(&mut page, &mut request, &renderer);

        assert!(outcome.is_served());
        assert_eq!(outcome.status(), Some(CacheStatus::Miss));
        assert_eq!(outcome.variant(), Some(Variant::Mobile));
        assert_eq!(page.content(), Some("tpl 3"));
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        let headers = outcome.explain().unwrap().to_headers();
        assert!(headers.contains(&("X-Cache-Key".to_string(), "8.mobile".to_string())));
    }

    #[test]
    fn test_render_sees_non_cacheable_resource() {
        let gate = gate();
        let renderer = |p: &Page| -> Result<String, RenderError> {
            assert!(!p.is_cacheable());
            Ok("ok".to_string())
        };

        let mut page = page();
        let mut request = RequestContext::new("/");
        gate.on_page_load(&mut page, &mut request, &renderer);

        assert!(page.is_cacheable());
    }

    #[test]
    fn test_aborted_outcome_has_no_variant() {
        let gate = gate();
        let renderer = |_: &Page| -> Result<String, RenderError> { Ok(String::new()) };

        let mut page = Page::new(8, "1");
        let mut request = RequestContext::new("/");
        let outcome = gate.on_page_load(&mut page, &mut request, &renderer);

        assert!(matches!(outcome, GateOutcome::Aborted { .. }));
        assert_eq!(outcome.variant(), None);
        assert!(outcome.explain().is_none());
        assert_eq!(request.placeholders.get(BROWSER_DETECTED), None);
    }

    #[test]
    fn test_new_rejects_host_namespace() {
        let config = GateConfig::default().with_namespace(HOST_DEFAULT_NAMESPACE);
        let err = RenderGate::new(config, InMemoryStore::new(), UserAgentClassifier)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::ReservedNamespace(HOST_DEFAULT_NAMESPACE.to_string())
        );
    }

    #[test]
    fn test_with_cache_rejects_other_namespace() {
        let config = GateConfig::default().with_namespace("page_variants");
        let cache = VariantCache::new(InMemoryStore::new(), "resource_custom");

        let err = RenderGate::with_cache(config, cache, UserAgentClassifier)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::NamespaceMismatch {
                config: "page_variants".to_string(),
                cache: "resource_custom".to_string(),
            }
        );
    }

    #[test]
    fn test_with_cache_takes_config_ttl() {
        let config = GateConfig::default()
            .with_namespace("page_variants")
            .with_ttl(std::time::Duration::from_secs(90));
        let cache = VariantCache::new(InMemoryStore::new(), "page_variants");

        let gate = RenderGate::with_cache(config, cache, UserAgentClassifier).unwrap();
        assert_eq!(gate.cache().namespace(), gate.config().namespace);
        assert_eq!(gate.cache().ttl(), std::time::Duration::from_secs(90));
    }
}
