//! Configuration surface consumed from the application's config loader.
//!
//! The loader itself lives outside this crate; it hands over a
//! deserialized [`ClientConfig`]. Defaults match a locally hosted
//! OpenAI-compatible server.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Settings for one client instance (one upstream endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
    #[serde(default)]
    pub cache_enabled: bool,
    /// Default TTL for cached responses, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl: u64,
    /// Maximum entry count of the in-memory cache tier.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Directory for the persistent cache tier. The tier is disabled
    /// when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub circuit_breaker: BreakerConfig,
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    #[serde(default = "default_fail_max")]
    pub fail_max: u32,
    /// Cooldown before an open breaker admits a probe, in seconds.
    #[serde(default = "default_reset_timeout_secs")]
    pub reset_timeout: u64,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_cache_size() -> usize {
    128
}
fn default_fail_max() -> u32 {
    3
}
fn default_reset_timeout_secs() -> u64 {
    60
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            fail_max: default_fail_max(),
            reset_timeout: default_reset_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Create a config with defaults for everything but the endpoint.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: default_timeout_secs(),
            cache_enabled: false,
            cache_ttl: default_cache_ttl_secs(),
            cache_size: default_cache_size(),
            cache_dir: None,
            circuit_breaker: BreakerConfig::default(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Validate the config and return the normalized base URL (no
    /// trailing slash).
    pub(crate) fn validate(&self) -> Result<String> {
        let trimmed = self.base_url.trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout == 0 {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        if self.cache_size == 0 {
            return Err(Error::Config("cache_size must be greater than zero".into()));
        }
        if self.circuit_breaker.fail_max == 0 {
            return Err(Error::Config(
                "circuit_breaker.fail_max must be greater than zero".into(),
            ));
        }
        if self.circuit_breaker.reset_timeout == 0 {
            return Err(Error::Config(
                "circuit_breaker.reset_timeout must be greater than zero".into(),
            ));
        }
        Ok(trimmed.to_string())
    }
}
