//! Client configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use facetnav_query::{PageKind, PageProfile};
use serde::{Deserialize, Serialize};

use crate::timeout::TimeoutConfig;

/// Environment variable that overrides [`ClientConfig::base_url`].
pub const API_HOST_ENV: &str = "FACETNAV_API_HOST";

/// Search client configuration file.
///
/// ```toml
/// base_url = "http://localhost:8000"
///
/// [timeout]
/// connect_ms = 2000
/// # optional, defaults to total_ms
/// response_ms = 5000
/// total_ms = 10000
///
/// [endpoints]
/// problem = "/api/v2/search/problem"
///
/// [headers]
/// x-client = "facetnav"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeouts.
    #[serde(default)]
    pub timeout: TimeoutSettings,

    /// Per-page endpoint overrides, keyed by page name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,

    /// Headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: TimeoutSettings::default(),
            endpoints: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load config from a file and apply the environment override.
    ///
    /// `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        Ok(config.apply_env())
    }

    /// Parse a TOML config.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON config.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `FACETNAV_API_HOST`, if set.
    pub fn apply_env(self) -> Self {
        self.with_api_host(std::env::var(API_HOST_ENV).ok())
    }

    /// Replace the base URL when `host` is a non-blank value.
    pub fn with_api_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host.map(|h| h.trim().to_string()).filter(|h| !h.is_empty()) {
            tracing::debug!(base_url = %host, "base URL overridden from environment");
            self.base_url = host;
        }
        self
    }

    /// Set the endpoint override for a page.
    pub fn with_endpoint(mut self, kind: PageKind, path: impl Into<String>) -> Self {
        self.endpoints.insert(kind.as_str().to_string(), path.into());
        self
    }

    /// Endpoint path for a page, honoring overrides.
    pub fn endpoint_for<'a>(&'a self, profile: &'a PageProfile) -> &'a str {
        self.endpoints
            .get(profile.kind.as_str())
            .map(String::as_str)
            .unwrap_or(&profile.endpoint)
    }

    /// Absolute URL for a backend path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Timeout configuration.
    pub fn timeout_config(&self) -> TimeoutConfig {
        let config = TimeoutConfig::from_millis(self.timeout.connect_ms, self.timeout.total_ms);
        match self.timeout.response_ms {
            Some(ms) => config.with_response(Duration::from_millis(ms)),
            None => config,
        }
    }
}

/// Timeout section of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,

    /// Time until response headers arrive, in milliseconds. Unset means
    /// the whole total; larger values are capped at it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_ms: Option<u64>,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_total_ms")]
    pub total_ms: u64,
}

fn default_connect_ms() -> u64 {
    2_000
}

fn default_total_ms() -> u64 {
    10_000
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            response_ms: None,
            total_ms: default_total_ms(),
        }
    }
}
