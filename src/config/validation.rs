//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream base URL and value ranges (timeouts > 0)
//! - Reject auth settings that would lock every caller out
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.base_url `{url}` is not a valid URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("upstream.base_url `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("listener.mount_prefix `{0}` must be empty or start with '/' and not end with '/'")]
    InvalidMountPrefix(String),

    #[error("auth is enabled but auth.tokens is empty")]
    NoAuthTokens,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base) = config.upstream.base_url() {
        match Url::parse(base) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                errors.push(ValidationError::UnsupportedScheme(base.to_string()));
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidBaseUrl {
                url: base.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.upstream.health_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.health_timeout_secs"));
    }
    if config.upstream.max_request_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("upstream.max_request_body_bytes"));
    }

    let prefix = &config.listener.mount_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::InvalidMountPrefix(prefix.clone()));
    }

    if config.auth.enabled && config.auth.tokens.iter().all(|t| t.trim().is_empty()) {
        errors.push(ValidationError::NoAuthTokens);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
