//! Proxy dispatcher: one inbound request in, one upstream exchange out.
//!
//! # Exchange states
//! ```text
//! START → DISABLED                          (no upstream configured)
//! START → OUTBOUND_SENT → STREAMING → CLOSED
//!                       → UPSTREAM_ERROR    (502)
//!                       → INTERNAL_ERROR    (500)
//! ```
//!
//! # Design Decisions
//! - The disabled check runs before anything is read or opened
//! - The lease is opened right before the request is sent; every path after
//!   that point releases it exactly once
//! - No retries

use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use futures_util::StreamExt;
use tracing::Instrument;

use crate::config::UpstreamConfig;
use crate::proxy::client::{OutboundRequest, UpstreamClient};
use crate::proxy::error::{describe, ProxyError};
use crate::proxy::headers::filter_inbound;
use crate::proxy::relay::{relay, ExchangeId, ExchangeTracker};
use crate::proxy::target::{target_url, ProxyMethod, ResourcePath};

#[derive(Debug, Clone)]
struct Upstream {
    base_url: String,
    client: UpstreamClient,
}

/// Composes translation, the upstream client and the relay.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    upstream: Option<Upstream>,
    tracker: ExchangeTracker,
    max_body_bytes: usize,
}

impl Dispatcher {
    /// Build from upstream settings. A missing base URL yields a dispatcher
    /// that rejects every exchange with [`ProxyError::NotConfigured`].
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let upstream = match config.base_url() {
            Some(base_url) => Some(Upstream {
                base_url: base_url.to_string(),
                client: UpstreamClient::new(config)?,
            }),
            None => None,
        };

        Ok(Self {
            upstream,
            tracker: ExchangeTracker::new(),
            max_body_bytes: config.max_request_body_bytes,
        })
    }

    pub fn enabled(&self) -> bool {
        self.upstream.is_some()
    }

    /// Lease accounting for every exchange this dispatcher has opened.
    pub fn tracker(&self) -> &ExchangeTracker {
        &self.tracker
    }

    /// Forward `request` to `{base}/api/v1/{resource}` and relay the answer.
    pub async fn dispatch(
        &self,
        method: ProxyMethod,
        resource: ResourcePath,
        request: Request<Body>,
    ) -> Result<Response, ProxyError> {
        let Some(upstream) = &self.upstream else {
            tracing::debug!(%method, %resource, "Proxy disabled, rejecting request");
            return Err(ProxyError::NotConfigured);
        };

        let exchange_id = ExchangeId::new();
        let span = tracing::info_span!("exchange", exchange_id = %exchange_id, %method, %resource);

        async move {
            let (parts, body) = request.into_parts();
            let body = read_body(body, self.max_body_bytes).await?;

            let outbound = OutboundRequest {
                method,
                url: target_url(&upstream.base_url, &resource, parts.uri.query()),
                headers: filter_inbound(&parts.headers),
                body,
            };
            tracing::debug!(url = %outbound.url, body_bytes = outbound.body.len(), "Proxying request");

            let lease = self.tracker.open(exchange_id);
            match upstream.client.send(outbound).await {
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "Upstream responded");
                    Ok(relay(response, lease))
                }
                Err(e) => {
                    drop(lease);
                    let err = ProxyError::from_transport(&e);
                    match &err {
                        ProxyError::UpstreamUnreachable(_) => {
                            tracing::warn!(error = %err, "Upstream request failed");
                        }
                        _ => tracing::error!(error = %err, "Unexpected error proxying request"),
                    }
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Read the whole inbound body, refusing anything over `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ProxyError::Internal(describe(&e)))?;
        if buf.len() + chunk.len() > limit {
            return Err(ProxyError::PayloadTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}
