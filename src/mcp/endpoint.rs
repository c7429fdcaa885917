//! Endpoint Resolver
//!
//! Turns a user-supplied or environment-derived address into the fully
//! qualified URL of the Maestro MCP server.
//!
//! ## Normalization
//!
//! | Input | Endpoint |
//! |-------|----------|
//! | `https://host/api/` | `https://host/api/mcp` |
//! | `https://host/api/mcp` | unchanged |
//! | `localhost:9000` | `http://localhost:9000/mcp` |
//! | `example.com` | `http://example.com:8030/mcp` |
//!
//! Resolution is pure string work: no network I/O, deterministic, idempotent.

use std::fmt;

use crate::error::{MaestroError, Result};

/// Sub-path every endpoint ends with.
pub const MCP_PATH: &str = "/mcp";

/// Address used when neither the caller nor the environment supplies one.
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:8040";

/// Port appended to a bare host name.
pub const DEFAULT_PORT: u16 = 8030;

/// Normalized URL of the tool-invocation server.
///
/// Always carries a scheme and always ends with [`MCP_PATH`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Resolve the endpoint from an explicit value, then the environment, then the default.
    ///
    /// Empty (or whitespace-only) candidates are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MaestroError::ConfigError` if no candidate is usable. With the
    /// built-in default this cannot happen.
    pub fn resolve(explicit: Option<&str>, env_value: Option<&str>) -> Result<Self> {
        Self::resolve_with_default(explicit, env_value, Some(DEFAULT_SERVER_ADDRESS))
    }

    /// Same as [`Endpoint::resolve`] with a caller-chosen default.
    pub fn resolve_with_default(
        explicit: Option<&str>,
        env_value: Option<&str>,
        default: Option<&str>,
    ) -> Result<Self> {
        [explicit, env_value, default]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(Self::normalize)
            .ok_or_else(|| MaestroError::ConfigError {
                reason: "no MCP server URI given and no default available".to_string(),
            })
    }

    /// Normalize one address into an endpoint.
    pub fn normalize(address: &str) -> Self {
        let address = address.trim();

        if address.starts_with("http://") || address.starts_with("https://") {
            if address.ends_with(MCP_PATH) {
                return Self(address.to_string());
            }
            let base = address.strip_suffix('/').unwrap_or(address);
            return Self(format!("{base}{MCP_PATH}"));
        }

        // host:port
        if address.contains(':') {
            let base = address.strip_suffix('/').unwrap_or(address);
            return Self(format!("http://{base}{MCP_PATH}"));
        }

        Self(format!("http://{address}:{DEFAULT_PORT}{MCP_PATH}"))
    }

    /// The endpoint as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the endpoint uses TLS.
    pub fn is_secure(&self) -> bool {
        self.0.starts_with("https://")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_host_port_gets_scheme_and_path() {
        assert_eq!(
            Endpoint::normalize("localhost:9000").as_str(),
            "http://localhost:9000/mcp"
        );
    }

    #[test]
    fn test_host_port_trailing_slash_is_stripped() {
        assert_eq!(
            Endpoint::normalize("localhost:9000/").as_str(),
            "http://localhost:9000/mcp"
        );
    }

    #[test]
    fn test_bare_host_gets_default_port() {
        assert_eq!(
            Endpoint::normalize("example.com").as_str(),
            "http://example.com:8030/mcp"
        );
    }

    #[test]
    fn test_scheme_with_trailing_slash() {
        assert_eq!(
            Endpoint::normalize("https://host/api/").as_str(),
            "https://host/api/mcp"
        );
    }

    #[test]
    fn test_scheme_already_normalized_is_unchanged() {
        assert_eq!(
            Endpoint::normalize("https://host/api/mcp").as_str(),
            "https://host/api/mcp"
        );
    }

    #[test]
    fn test_explicit_wins_over_env() {
        let endpoint = Endpoint::resolve(Some("a:1"), Some("b:2")).unwrap();
        assert_eq!(endpoint.as_str(), "http://a:1/mcp");
    }

    #[test]
    fn test_empty_explicit_falls_back_to_env() {
        let endpoint = Endpoint::resolve(Some(""), Some("b:2")).unwrap();
        assert_eq!(endpoint.as_str(), "http://b:2/mcp");
    }

    #[test]
    fn test_default_when_nothing_given() {
        let endpoint = Endpoint::resolve(None, Some("   ")).unwrap();
        assert_eq!(endpoint.as_str(), "http://localhost:8040/mcp");
    }

    #[test]
    fn test_no_candidate_is_config_error() {
        let err = Endpoint::resolve_with_default(None, Some(""), None).unwrap_err();
        assert!(matches!(err, MaestroError::ConfigError { .. }));
    }

    #[test]
    fn test_is_secure() {
        assert!(Endpoint::normalize("https://h/mcp").is_secure());
        assert!(!Endpoint::normalize("h:1").is_secure());
    }
}
