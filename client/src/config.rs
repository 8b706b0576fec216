//! Client configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
    /// Directory holding the credential slot
    pub credential_dir: PathBuf,
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive)
    pub log_level: String,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `LIBRIS_API_URL` | `http://localhost:8080/api` |
    /// | `LIBRIS_CREDENTIAL_DIR` | `.libris` |
    /// | `LIBRIS_LOG_LEVEL` | `info` |
    /// | `LIBRIS_USER_AGENT` | `libris-client/<version>` |
    /// | `LIBRIS_REQUEST_TIMEOUT` | `30` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    fn from_source(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: get("LIBRIS_API_URL")
                .map_or_else(|| DEFAULT_API_URL.to_string(), |url| trim_url(&url)),
            credential_dir: get("LIBRIS_CREDENTIAL_DIR")
                .map_or_else(|| PathBuf::from(".libris"), PathBuf::from),
            log_level: get("LIBRIS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            user_agent: get("LIBRIS_USER_AGENT")
                .unwrap_or_else(|| format!("libris-client/{}", env!("CARGO_PKG_VERSION"))),
            request_timeout: get("LIBRIS_REQUEST_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Use a different API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl AsRef<str>) -> Self {
        self.api_url = trim_url(url.as_ref());
        self
    }

    /// Keep the credential slot in `dir`.
    #[must_use]
    pub fn with_credential_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.credential_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the API URL is not an
    /// `http://` or `https://` URL with a host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidUrl { url: self.api_url.clone(), reason };

        let rest = self
            .api_url
            .strip_prefix("https://")
            .or_else(|| self.api_url.strip_prefix("http://"))
            .ok_or_else(|| invalid("scheme must be http or https"))?;

        if rest.is_empty() || rest.starts_with('/') {
            return Err(invalid("missing host"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_source(|_| None)
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
