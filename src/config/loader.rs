//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Upstream base URL override.
pub const ENV_API_URL: &str = "ECHOMIND_API_URL";
/// Upstream total timeout override, in seconds.
pub const ENV_API_TIMEOUT_SECS: &str = "ECHOMIND_API_TIMEOUT_SECS";
/// Listener bind address override.
pub const ENV_BIND: &str = "ECHOMIND_PROXY_BIND";
/// Comma separated bearer tokens.
pub const ENV_TOKENS: &str = "ECHOMIND_PROXY_TOKENS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ProxyConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build configuration from defaults plus the environment only.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    let mut config = ProxyConfig::default();

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto a parsed configuration.
///
/// `lookup` abstracts `std::env::var` so overrides can be exercised without
/// touching process state.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL) {
        config.upstream.base_url = Some(url);
    }

    if let Some(raw) = lookup(ENV_API_TIMEOUT_SECS) {
        config.upstream.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Env {
            name: ENV_API_TIMEOUT_SECS,
            value: raw.clone(),
        })?;
    }

    if let Some(bind) = lookup(ENV_BIND) {
        config.listener.bind_address = bind;
    }

    if let Some(raw) = lookup(ENV_TOKENS) {
        config.auth.tokens = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = Some("http://file:1".into());

        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_API_URL, "http://env:2"),
                (ENV_API_TIMEOUT_SECS, " 42 "),
                (ENV_TOKENS, "a, b,,"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.base_url(), Some("http://env:2"));
        assert_eq!(config.upstream.timeout_secs, 42);
        assert_eq!(config.auth.tokens, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn empty_api_url_disables_proxying() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = Some("http://file:1".into());

        apply_env_overrides(&mut config, env(&[(ENV_API_URL, "")])).unwrap();
        assert!(!config.upstream.enabled());
    }

    #[test]
    fn rejects_bad_timeout() {
        let mut config = ProxyConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_API_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: ENV_API_TIMEOUT_SECS, .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/echomind-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::NoAuthTokens,
            ValidationError::ZeroValue("upstream.timeout_secs"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: auth is enabled but auth.tokens is empty, upstream.timeout_secs must be greater than zero"
        );
    }
}
