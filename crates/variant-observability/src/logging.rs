//! Request-scoped diagnostic logging.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::field::Empty;
use tracing::Span;
use variant_core::RequestId;

/// Log level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Step-by-step detail.
    Trace,
    /// Per-request decisions.
    #[default]
    Debug,
    /// Notable events.
    Info,
    /// Recoverable failures.
    Warn,
    /// Failures only.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A verbosity string that names no level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level: {0:?}")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    /// Accepts level names in any case, or numeric levels where `1` is the
    /// most severe (`1`=error, `2`=warn, `3`=info, `4`=debug, `5`=trace).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "5" => Ok(Self::Trace),
            "debug" | "4" => Ok(Self::Debug),
            "info" | "3" => Ok(Self::Info),
            "warn" | "warning" | "2" => Ok(Self::Warn),
            "error" | "1" => Ok(Self::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// Diagnostic logger for one request.
///
/// Diagnostics are emitted at the request's verbosity level, so a request
/// can raise them above the subscriber's filter. Warnings are always
/// emitted at warn. Every event is emitted inside a span carrying the
/// request ID plus the `resource`, `variant`, `fingerprint` and `status`
/// fields once recorded.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    level: LogLevel,
    span: Span,
}

impl RequestLogger {
    /// Create a logger emitting diagnostics at `level`.
    pub fn new(request_id: RequestId, level: LogLevel) -> Self {
        let span = tracing::info_span!(
            "variant_gate",
            request_id = %request_id,
            resource = Empty,
            variant = Empty,
            fingerprint = Empty,
            status = Empty,
        );

        Self { level, span }
    }

    /// Apply a per-request verbosity override. Unparseable values keep the
    /// configured level.
    pub fn with_override(mut self, raw: Option<&str>) -> Self {
        if let Some(raw) = raw {
            match raw.parse() {
                Ok(level) => self.level = level,
                Err(e) => self.warn(&format!("ignoring verbosity override: {e}")),
            }
        }
        self
    }

    /// The level diagnostics are emitted at.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Record a value on one of the span's declared fields.
    pub fn record(&self, field: &str, value: &dyn fmt::Display) {
        self.span.record(field, tracing::field::display(value));
    }

    /// Emit a diagnostic at the request's verbosity level.
    pub fn diag(&self, message: &str) {
        self.emit(self.level, message);
    }

    /// Emit a warning.
    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    fn emit(&self, level: LogLevel, message: &str) {
        let _entered = self.span.enter();
        match level {
            LogLevel::Trace => tracing::trace!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }
}
