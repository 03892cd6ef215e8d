//! Client configuration
//!
//! Loaded from a YAML file and/or CLI flags. Set once at construction and
//! read-only afterwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Configuration for connecting to an array
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the array management interface
    pub url: String,
    pub username: String,
    pub password: String,
    /// Tenant name to scope requests to
    pub tenant: Option<String>,
    /// Fixed request timeout in seconds
    pub timeout_secs: u64,
    /// Blanket retry count for connection-level failures
    pub retry_count: u32,
    /// Arrays ship self-signed management certificates
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            tenant: None,
            timeout_secs: 5,
            retry_count: 3,
            accept_invalid_certs: true,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tenant", &self.tenant)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_count", &self.retry_count)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    ///
    /// Missing keys take their defaults; call [`validate`](Self::validate)
    /// once any overrides have been applied.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: ClientConfig = serde_yaml::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Check that the configuration can be used to build a client
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::Configuration("url is required".into()));
        }
        reqwest::Url::parse(&self.url)
            .map_err(|e| Error::Configuration(format!("invalid url {}: {}", self.url, e)))?;
        if self.username.is_empty() {
            return Err(Error::Configuration("username is required".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Configuration("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
