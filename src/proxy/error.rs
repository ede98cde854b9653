//! Dispatcher error taxonomy and its caller-facing rendering.
//!
//! Every failure stops here: the dispatcher never lets a transport error
//! escape as anything but one of these variants.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failures of a single proxy exchange.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No upstream configured; nothing was sent.
    #[error("EchoMind API integration is not configured. Set ECHOMIND_API_URL.")]
    NotConfigured,

    /// Connect, DNS, TLS or timeout failure reaching the upstream.
    #[error("Failed to connect to EchoMind API: {0}")]
    UpstreamUnreachable(String),

    /// Inbound body larger than the configured limit.
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Anything else that went wrong while dispatching.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a transport error from the upstream client.
    ///
    /// Connect and timeout failures are unreachable. A request error is
    /// unreachable unless hyper rejected what the upstream sent back, in which
    /// case the upstream answered and the answer was malformed. Redirect
    /// failures and everything else are internal.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let cause = describe(err);
        let unreachable = err.is_connect()
            || err.is_timeout()
            || (err.is_request() && !rejected_by_hyper(err));

        if unreachable {
            ProxyError::UpstreamUnreachable(cause)
        } else {
            ProxyError::Internal(cause)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Whether the source chain holds a hyper error for a response hyper could
/// not parse (bad status line, bad headers, oversized head).
fn rejected_by_hyper(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(cause) = source {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            return hyper_err.is_parse() || hyper_err.is_parse_status() || hyper_err.is_user();
        }
        source = cause.source();
    }
    false
}

/// Render an error with its whole `source()` chain, outermost first.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
