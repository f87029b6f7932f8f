use crate::error_handler::{ConfigError, Result, validate_http_endpoint};

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the question answering backend.
///
/// # Fields
///
/// - `base_url`: configured backend address. Empty means "same origin": paths are
///   resolved against `origin` instead. Stored without trailing slashes.
/// - `origin`: the address standing in for the page origin when `base_url` is empty.
/// - `timeout_secs`: optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use rag_gateway::config::gateway_config::GatewayConfig;
///
/// let cfg = GatewayConfig::new("http://localhost:8080//");
/// assert_eq!(cfg.base_url, "http://localhost:8080");
/// assert_eq!(cfg.url("/api/query"), "http://localhost:8080/api/query");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Backend base address, normalized (no trailing slash). May be empty.
    pub base_url: String,

    /// Origin used when `base_url` is empty.
    pub origin: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl GatewayConfig {
    /// Builds a config for an explicit base address (origin defaults to the same value).
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let base_url = normalize_base(base_url.as_ref());
        Self {
            origin: base_url.clone(),
            base_url,
            timeout_secs: None,
        }
    }

    /// Builds a same-origin config: empty base, requests resolved against `origin`.
    pub fn same_origin(origin: impl AsRef<str>) -> Self {
        Self {
            base_url: String::new(),
            origin: normalize_base(origin.as_ref()),
            timeout_secs: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// The address requests are actually sent to.
    pub fn effective_base(&self) -> &str {
        if self.base_url.is_empty() {
            &self.origin
        } else {
            &self.base_url
        }
    }

    /// Resolves a request path to the full URL used on the wire.
    pub fn url(&self, path: &str) -> String {
        join_url(self.effective_base(), path)
    }

    /// Validates scheme of whichever address will be used.
    ///
    /// # Errors
    /// - [`ConfigError::MissingVar`] when both base and origin are empty
    /// - [`ConfigError::InvalidFormat`] when the address lacks an http(s) scheme
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            if self.origin.is_empty() {
                return Err(ConfigError::MissingVar("RAG_API_BASE_URL or RAG_API_ORIGIN").into());
            }
            validate_http_endpoint("RAG_API_ORIGIN", &self.origin)
        } else {
            validate_http_endpoint("RAG_API_BASE_URL", &self.base_url)
        }
    }
}

/// Trims whitespace and every trailing `/` from a base address.
pub fn normalize_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Joins a base address and a request path with exactly one `/`.
///
/// An empty base yields the path unchanged (a same-origin relative reference).
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_uses_exactly_one_slash() {
        assert_eq!(join_url("http://h", "/api/query"), "http://h/api/query");
        assert_eq!(join_url("http://h", "api/query"), "http://h/api/query");
        assert_eq!(join_url("http://h/", "//health"), "http://h/health");
        assert_eq!(join_url("", "/api/status"), "/api/status");
    }

    #[test]
    fn base_is_normalized() {
        assert_eq!(normalize_base("  http://h:8080/// "), "http://h:8080");
        assert_eq!(normalize_base(""), "");
        assert_eq!(GatewayConfig::new("http://h/").base_url, "http://h");
    }

    #[test]
    fn empty_base_resolves_against_origin() {
        let cfg = GatewayConfig::same_origin("http://127.0.0.1:8080/");
        assert!(cfg.base_url.is_empty());
        assert_eq!(cfg.url("/health"), "http://127.0.0.1:8080/health");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validation_rejects_missing_scheme_and_empty_origin() {
        assert!(GatewayConfig::new("localhost:8080").validate().is_err());
        assert!(GatewayConfig::same_origin("").validate().is_err());
    }
}
