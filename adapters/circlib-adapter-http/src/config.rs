//! Client configuration.
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (`CIRCLIB_URL`, `QE_CIRCUIT_URL`, `CIRCLIB_TOKEN`)
//! 2. Configuration file (YAML, `~/.circlib/config.yaml` by default)
//! 3. Default values

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Base URL of the circuit service.
pub const URL_ENV: &str = "CIRCLIB_URL";

/// Older name for [`URL_ENV`], read when it is unset.
pub const LEGACY_URL_ENV: &str = "QE_CIRCUIT_URL";

/// Bearer token for the circuit service.
pub const TOKEN_ENV: &str = "CIRCLIB_TOKEN";

/// Request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for [`CircuitClient`](crate::CircuitClient).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://circuits.example.com/api`.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Optional bearer token.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Default config file location, `~/.circlib/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".circlib").join("config.yaml"))
    }

    /// Read a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml_ng::from_str(&contents)?)
    }

    /// Settings from the environment only.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Load from `path` (or the default file if it exists), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Loading client config from {}", path.display());
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };
        Ok(config.merge_env())
    }

    /// Apply environment overrides.
    #[must_use]
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    #[must_use]
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(URL_ENV).or_else(|| lookup(LEGACY_URL_ENV)) {
            self.endpoint = Some(url);
        }
        if let Some(token) = lookup(TOKEN_ENV) {
            self.token = Some(token);
        }
        self
    }

    /// Parsed endpoint URL.
    pub fn endpoint_url(&self) -> ClientResult<Url> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(ClientError::MissingEndpoint)?;
        let url = Url::parse(endpoint)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(matches!(
            config.endpoint_url(),
            Err(ClientError::MissingEndpoint)
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = ClientConfig::new()
            .with_endpoint("https://file.example.com")
            .merge_vars(vars(&[("CIRCLIB_URL", "https://env.example.com")]));
        assert_eq!(config.endpoint.as_deref(), Some("https://env.example.com"));
    }

    #[test]
    fn test_legacy_url_variable() {
        let config = ClientConfig::new().merge_vars(vars(&[
            ("QE_CIRCUIT_URL", "https://legacy.example.com"),
            ("CIRCLIB_TOKEN", "secret"),
        ]));
        assert_eq!(config.endpoint.as_deref(), Some("https://legacy.example.com"));
        assert_eq!(config.token.as_deref(), Some("secret"));

        let config = ClientConfig::new().merge_vars(vars(&[
            ("QE_CIRCUIT_URL", "https://legacy.example.com"),
            ("CIRCLIB_URL", "https://new.example.com"),
        ]));
        assert_eq!(config.endpoint.as_deref(), Some("https://new.example.com"));
    }

    #[test]
    fn test_yaml_parsing() {
        let config: ClientConfig = serde_yaml_ng::from_str(
            "endpoint: https://circuits.example.com/api\ntimeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "https://circuits.example.com/api"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ClientConfig::new().with_endpoint("not a url");
        assert!(matches!(
            config.endpoint_url(),
            Err(ClientError::InvalidEndpoint(_))
        ));
        let config = ClientConfig::new().with_endpoint("mailto:ops@example.com");
        assert!(matches!(
            config.endpoint_url(),
            Err(ClientError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new().with_token("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
