//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Issue exactly one request per exchange (no retries)
//! - Enforce a single total timeout covering connect and full response
//! - Apply the configured redirect and environment proxy policy
//!
//! # Design Decisions
//! - Redirects: followed up to `max_redirects` (default 10), disabled at 0.
//!   Exceeding the limit means the upstream answered, so it is reported as an
//!   internal error (500), not as unreachable
//! - A response hyper cannot parse is an internal error (500); connect,
//!   timeout and broken-connection failures are unreachable (502)
//! - Environment proxies (HTTP_PROXY, HTTPS_PROXY, NO_PROXY) are honored unless
//!   `trust_env_proxy = false`
//! - gzip, br, deflate and zstd bodies are decoded here, so the relayed body
//!   never carries an upstream content-encoding
//! - Connections may be pooled; a response dropped before its end closes its
//!   connection instead of returning it to the pool

use std::time::Duration;

use axum::body::Bytes;
use axum::http::HeaderMap;
use reqwest::redirect::Policy;

use crate::config::UpstreamConfig;
use crate::proxy::target::ProxyMethod;

/// Everything needed to send one outbound request.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: ProxyMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Client for the configured upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let redirect = match config.max_redirects {
            0 => Policy::none(),
            n => Policy::limited(n),
        };

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect);
        if !config.trust_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Send the request and return once response headers are available.
    pub async fn send(&self, request: OutboundRequest) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method.as_method(), request.url)
            .headers(request.headers);

        // An empty body is sent as no body at all.
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        builder.send().await
    }
}
