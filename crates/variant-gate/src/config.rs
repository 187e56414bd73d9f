//! Gate configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use variant_cache::{ttl_secs, DEFAULT_NAMESPACE, HOST_DEFAULT_NAMESPACE};
use variant_observability::LogLevel;

/// Default attribute holding the tablet template.
pub const DEFAULT_TABLET_ATTR: &str = "TabletTemplate";
/// Default attribute holding the mobile template.
pub const DEFAULT_MOBILE_ATTR: &str = "MobileTemplate";

/// A configuration that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The namespace is blank.
    #[error("cache namespace must not be empty")]
    EmptyNamespace,

    /// The namespace is the host's own cache namespace.
    #[error("cache namespace {0:?} is reserved for the host cache")]
    ReservedNamespace(String),

    /// A template attribute name is empty.
    #[error("template attribute names must not be empty")]
    EmptyAttribute,

    /// Both alternates read the same attribute.
    #[error("tablet and mobile templates both read from attribute {0:?}")]
    DuplicateAttribute(String),

    /// A prepared cache writes to a namespace other than the configured one.
    #[error("cache uses namespace {cache:?} but the gate is configured for {config:?}")]
    NamespaceMismatch {
        /// Namespace in the configuration.
        config: String,
        /// Namespace the cache writes to.
        cache: String,
    },
}

/// Process-wide gate configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Entry lifetime in seconds; 0 keeps entries until invalidation.
    #[serde(default)]
    pub ttl_secs: u64,

    /// Store namespace reserved for rendered variants.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Resource attribute holding the tablet template.
    #[serde(default = "default_tablet_attr")]
    pub tablet_template_attr: String,

    /// Resource attribute holding the mobile template.
    #[serde(default = "default_mobile_attr")]
    pub mobile_template_attr: String,

    /// Level diagnostics are logged at unless a request overrides it.
    #[serde(default)]
    pub debug_level: LogLevel,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_tablet_attr() -> String {
    DEFAULT_TABLET_ATTR.to_string()
}

fn default_mobile_attr() -> String {
    DEFAULT_MOBILE_ATTR.to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 0,
            namespace: default_namespace(),
            tablet_template_attr: default_tablet_attr(),
            mobile_template_attr: default_mobile_attr(),
            debug_level: LogLevel::default(),
        }
    }
}

impl GateConfig {
    /// Load config from a TOML or JSON file (chosen by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.namespace == HOST_DEFAULT_NAMESPACE {
            return Err(ConfigError::ReservedNamespace(self.namespace.clone()));
        }
        if self.tablet_template_attr.is_empty() || self.mobile_template_attr.is_empty() {
            return Err(ConfigError::EmptyAttribute);
        }
        if self.tablet_template_attr == self.mobile_template_attr {
            return Err(ConfigError::DuplicateAttribute(
                self.tablet_template_attr.clone(),
            ));
        }
        Ok(())
    }

    /// Entry lifetime as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Set the entry lifetime. Fractions of a second round up.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl_secs(ttl);
        self
    }

    /// Set the cache namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the attributes holding the alternate templates.
    pub fn with_template_attrs(
        mut self,
        tablet: impl Into<String>,
        mobile: impl Into<String>,
    ) -> Self {
        self.tablet_template_attr = tablet.into();
        self.mobile_template_attr = mobile.into();
        self
    }

    /// Set the diagnostic log level.
    pub fn with_debug_level(mut self, level: LogLevel) -> Self {
        self.debug_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("variant-gate-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.ttl(), Duration::ZERO);
        assert_eq!(config.namespace, "resource_custom");
        assert_eq!(config.tablet_template_attr, "TabletTemplate");
        assert_eq!(config.mobile_template_attr, "MobileTemplate");
        assert_eq!(config.debug_level, LogLevel::Debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            ttl_secs = 600
            debug_level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.ttl(), Duration::from_secs(600));
        assert_eq!(config.debug_level, LogLevel::Warn);
        assert_eq!(config.namespace, "resource_custom");
    }

    #[test]
    fn test_load_toml_file() {
        let path = write_temp(
            "gate.toml",
            r#"
            namespace = "page_variants"
            tablet_template_attr = "TabletTpl"
            mobile_template_attr = "PhoneTpl"
            "#,
        );

        let config = GateConfig::load(&path).unwrap();
        assert_eq!(config.namespace, "page_variants");
        assert_eq!(config.tablet_template_attr, "TabletTpl");
        assert_eq!(config.mobile_template_attr, "PhoneTpl");
    }

    #[test]
    fn test_load_json_file() {
        let path = write_temp("gate.json", r#"{ "ttl_secs": 30, "debug_level": "info" }"#);

        let config = GateConfig::load(&path).unwrap();
        assert_eq!(config.ttl_secs, 30);
        assert_eq!(config.debug_level, LogLevel::Info);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let path = write_temp("reserved.toml", r#"namespace = "default""#);
        let err = GateConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("reserved for the host cache"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GateConfig::load("/nonexistent/gate.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_sub_second_ttl_still_expires() {
        let config = GateConfig::default().with_ttl(Duration::from_millis(500));
        assert_eq!(config.ttl_secs, 1);

        let config = GateConfig::default().with_ttl(Duration::from_millis(2500));
        assert_eq!(config.ttl_secs, 3);

        let config = GateConfig::default().with_ttl(Duration::ZERO);
        assert_eq!(config.ttl_secs, 0);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            GateConfig::default().with_namespace(" ").validate(),
            Err(ConfigError::EmptyNamespace)
        );
        assert_eq!(
            GateConfig::default()
                .with_template_attrs("Alt", "Alt")
                .validate(),
            Err(ConfigError::DuplicateAttribute("Alt".to_string()))
        );
        assert_eq!(
            GateConfig::default().with_template_attrs("", "Alt").validate(),
            Err(ConfigError::EmptyAttribute)
        );
    }
}
