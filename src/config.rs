//! Maestro Configuration Module
//!
//! Client settings come from the process environment, after an optional
//! `.env` file in the working directory has been loaded into it.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. `--mcp-server-uri` flag
//! 2. `MAESTRO_MAESTRO_MCP_SERVER_URI` (environment or `.env`)
//! 3. Default `localhost:8040`
//!
//! `MAESTRO_K_TEST_MODE=true` shortens the session deadline to 5 seconds.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MaestroError, Result};
use crate::mcp::Endpoint;

/// Environment variable holding the MCP server address.
pub const SERVER_URI_ENV: &str = "MAESTRO_MAESTRO_MCP_SERVER_URI";

/// Environment variable enabling the short test deadline.
pub const TEST_MODE_ENV: &str = "MAESTRO_K_TEST_MODE";

/// Environment variable set by `--dry-run` for the server side.
pub const DRY_RUN_ENV: &str = "DRY_RUN";

/// Session deadline in normal operation.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Session deadline when test mode is on.
pub const TEST_SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings of the MCP client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server address from the environment, not yet normalized
    pub server_uri: Option<String>,

    /// Short deadline for test runs
    pub test_mode: bool,
}

impl ClientConfig {
    /// Load `.env` from the working directory into the process environment.
    ///
    /// A missing file is not an error. Returns the path that was loaded.
    ///
    /// # Errors
    ///
    /// Returns `MaestroError::ConfigError` if the file exists but cannot be parsed.
    pub fn load_env_file() -> Result<Option<PathBuf>> {
        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "loaded .env file");
                Ok(Some(path))
            }
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(MaestroError::ConfigError {
                reason: format!("Failed to load .env file: {e}"),
            }),
        }
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let server_uri = std::env::var(SERVER_URI_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let test_mode = std::env::var(TEST_MODE_ENV).is_ok_and(|value| value == "true");

        Self {
            server_uri,
            test_mode,
        }
    }

    /// Override the server address.
    pub fn with_server_uri(mut self, uri: impl Into<String>) -> Self {
        self.server_uri = Some(uri.into());
        self
    }

    /// Deadline applied to every session.
    pub fn session_timeout(&self) -> Duration {
        if self.test_mode {
            TEST_SESSION_TIMEOUT
        } else {
            DEFAULT_SESSION_TIMEOUT
        }
    }

    /// Resolve the endpoint: `explicit` first, then the configured address, then the default.
    pub fn endpoint(&self, explicit: Option<&str>) -> Result<Endpoint> {
        Endpoint::resolve(explicit, self.server_uri.as_deref())
    }
}

/// Export `DRY_RUN=True` so the server side skips real side effects.
pub fn set_dry_run_env() {
    std::env::set_var(DRY_RUN_ENV, "True");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(SERVER_URI_ENV);
        std::env::remove_var(TEST_MODE_ENV);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = ClientConfig::from_env();

        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.session_timeout(), Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_test_mode_shortens_deadline() {
        clear_env();
        std::env::set_var(TEST_MODE_ENV, "true");

        let config = ClientConfig::from_env();
        clear_env();

        assert!(config.test_mode);
        assert_eq!(config.session_timeout(), Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_test_mode_requires_exact_true() {
        clear_env();
        std::env::set_var(TEST_MODE_ENV, "TRUE");

        let config = ClientConfig::from_env();
        clear_env();

        assert!(!config.test_mode);
    }

    #[test]
    #[serial]
    fn test_env_server_uri_used_when_no_flag() {
        clear_env();
        std::env::set_var(SERVER_URI_ENV, "maestro.internal");

        let config = ClientConfig::from_env();
        clear_env();

        assert_eq!(
            config.endpoint(None).unwrap().as_str(),
            "http://maestro.internal:8030/mcp"
        );
        assert_eq!(
            config.endpoint(Some("localhost:9000")).unwrap().as_str(),
            "http://localhost:9000/mcp"
        );
    }

    #[test]
    #[serial]
    fn test_blank_env_server_uri_is_ignored() {
        clear_env();
        std::env::set_var(SERVER_URI_ENV, "   ");

        let config = ClientConfig::from_env();
        clear_env();

        assert_eq!(config.server_uri, None);
        assert_eq!(
            config.endpoint(None).unwrap().as_str(),
            "http://localhost:8040/mcp"
        );
    }

    #[test]
    fn test_with_server_uri_overrides() {
        let config = ClientConfig::default().with_server_uri("https://host/api/");

        assert_eq!(config.endpoint(None).unwrap().as_str(), "https://host/api/mcp");
    }
}
