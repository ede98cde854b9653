//! Upstream health probing.
//!
//! # Responsibilities
//! - One-shot GET against the upstream health path
//! - Report disabled / healthy / unhealthy / error without ever failing
//!
//! # Design Decisions
//! - Own client with its own short timeout, independent of proxied calls
//! - No idle pooling: the probe's connection is closed before it returns
//! - Disabled upstream means no network call at all
//! - Any 2xx is healthy, so a 204 from the health path counts

use std::time::Duration;

use serde::Serialize;

use crate::config::UpstreamConfig;
use crate::proxy::error::describe;

/// Result of one probe, serialized as the health endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthStatus {
    Disabled {
        message: String,
    },
    Healthy {
        echomind_api_url: String,
    },
    Unhealthy {
        echomind_api_url: String,
        response_status: u16,
    },
    Error {
        echomind_api_url: String,
        error: String,
    },
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Disabled { .. } => "disabled",
            HealthStatus::Healthy { .. } => "healthy",
            HealthStatus::Unhealthy { .. } => "unhealthy",
            HealthStatus::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone)]
struct Target {
    base_url: String,
    probe_url: String,
}

/// Probes the configured upstream's health endpoint.
#[derive(Debug, Clone)]
pub struct HealthProber {
    target: Option<Target>,
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let target = config.base_url().map(|base| Target {
            base_url: base.to_string(),
            probe_url: format!("{base}/{}", config.health_path.trim_start_matches('/')),
        });

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.health_timeout_secs))
            .pool_max_idle_per_host(0);
        if !config.trust_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            target,
            client: builder.build()?,
        })
    }

    pub async fn probe(&self) -> HealthStatus {
        let Some(target) = &self.target else {
            return HealthStatus::Disabled {
                message: "ECHOMIND_API_URL not configured".to_string(),
            };
        };

        let status = match self
            .client
            .get(&target.probe_url)
            .header("user-agent", "echomind-proxy-health-check")
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                drop(response);
                if status.is_success() {
                    HealthStatus::Healthy {
                        echomind_api_url: target.base_url.clone(),
                    }
                } else {
                    tracing::warn!(url = %target.probe_url, %status, "Health check failed: non-success status");
                    HealthStatus::Unhealthy {
                        echomind_api_url: target.base_url.clone(),
                        response_status: status.as_u16(),
                    }
                }
            }
            Err(e) => {
                let error = describe(&e);
                tracing::warn!(url = %target.probe_url, error = %error, "Health check failed: request error");
                HealthStatus::Error {
                    echomind_api_url: target.base_url.clone(),
                    error,
                }
            }
        };

        tracing::debug!(status = status.label(), "Health probe complete");
        status
    }
}
