//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the EchoMind proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, mount prefix).
    pub listener: ListenerConfig,

    /// Upstream EchoMind API settings.
    pub upstream: UpstreamConfig,

    /// Caller authentication settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path prefix every route is nested under (e.g., "/api/v1"). Empty for none.
    pub mount_prefix: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            mount_prefix: String::new(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the EchoMind API (e.g., "http://api:8000").
    /// Absent or blank disables proxying entirely.
    pub base_url: Option<String>,

    /// Total timeout for one proxied call (connect + full response) in seconds.
    pub timeout_secs: u64,

    /// Path probed by the health check.
    pub health_path: String,

    /// Health probe timeout in seconds.
    pub health_timeout_secs: u64,

    /// Maximum redirects followed per call. 0 disables redirect following.
    pub max_redirects: usize,

    /// Honor HTTP_PROXY / HTTPS_PROXY / NO_PROXY from the environment.
    pub trust_env_proxy: bool,

    /// Maximum inbound request body forwarded upstream.
    pub max_request_body_bytes: usize,
}

impl UpstreamConfig {
    /// Normalized base URL, or `None` when proxying is disabled.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Whether an upstream is configured.
    pub fn enabled(&self) -> bool {
        self.base_url().is_some()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 300,
            health_path: "/health".to_string(),
            health_timeout_secs: 5,
            max_redirects: 10,
            trust_env_proxy: true,
            max_request_body_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

/// Caller authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require a verified caller on proxied routes.
    pub enabled: bool,

    /// Accepted bearer tokens.
    pub tokens: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tokens: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
