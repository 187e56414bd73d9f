//! Request context with per-request overrides.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Query parameter that bypasses the variant cache.
pub const REFRESH_PARAM: &str = "refresh";
/// Query parameter that forces a variant by name.
pub const TEMPLATE_PARAM: &str = "template";
/// Query parameter that overrides diagnostic log verbosity.
pub const DEBUG_PARAM: &str = "tpldebug";

/// Header equivalents of the query parameters, consulted when the query
/// string does not carry the parameter.
pub mod header_names {
    /// Cache bypass.
    pub const X_VARIANT_REFRESH: &str = "X-Variant-Refresh";
    /// Forced variant name.
    pub const X_VARIANT_TEMPLATE: &str = "X-Variant-Template";
    /// Diagnostic log verbosity.
    pub const X_VARIANT_DEBUG: &str = "X-Variant-Debug";
}

/// Placeholder through which the resolved variant is exposed to templates.
pub const BROWSER_DETECTED: &str = "browser_detected";

/// Unique request identifier for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// HTTP headers.
pub type Headers = HashMap<String, String>;

/// Overrides a single request may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    /// Skip the cache lookup and render fresh.
    pub refresh: bool,
    /// Raw forced variant name; unknown names are ignored downstream.
    pub template: Option<String>,
    /// Raw verbosity override for diagnostic logging.
    pub debug: Option<String>,
}

/// Request-scoped placeholders readable by downstream templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders(HashMap<String, String>);

impl Placeholders {
    /// Create an empty placeholder set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a placeholder, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Get a placeholder value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    /// Number of placeholders set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no placeholder has been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed request context passed to the render gate.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Request path.
    pub path: String,
    /// Query string parameters.
    pub query: QueryParams,
    /// HTTP headers.
    pub headers: Headers,
    /// Overrides parsed from query or headers.
    pub overrides: RequestOverrides,
    /// Placeholders published for this request.
    pub placeholders: Placeholders,
}

impl RequestContext {
    /// Create a new request context with no metadata.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            overrides: RequestOverrides::default(),
            placeholders: Placeholders::new(),
        }
    }

    /// Build a context from an HTTP request, parsing overrides from its
    /// query string and headers.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        let mut ctx = Self::new(req.uri().path());

        if let Some(query) = req.uri().query() {
            ctx.query = parse_query(query);
        }

        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                ctx.headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        ctx.overrides = ctx.parse_overrides();
        ctx
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self.overrides = self.parse_overrides();
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self.overrides = self.parse_overrides();
        self
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }

    /// The client's User-Agent, if sent.
    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    fn parse_overrides(&self) -> RequestOverrides {
        let lookup = |param: &str, header: &str| {
            self.query_param(param)
                .or_else(|| self.header(header))
                .map(str::to_string)
        };

        RequestOverrides {
            refresh: lookup(REFRESH_PARAM, header_names::X_VARIANT_REFRESH)
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            template: lookup(TEMPLATE_PARAM, header_names::X_VARIANT_TEMPLATE)
                .filter(|v| !v.is_empty()),
            debug: lookup(DEBUG_PARAM, header_names::X_VARIANT_DEBUG).filter(|v| !v.is_empty()),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_query(query: &str) -> QueryParams {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Form-decode one query component: `+` is a space, then percent escapes.
/// Escapes that do not decode to UTF-8 leave the component as sent.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
