//! Streaming relay of upstream responses and exchange lifetime tracking.
//!
//! # Responsibilities
//! - Attach status and filtered headers before any body bytes flow
//! - Forward body chunks lazily and in order
//! - Release the upstream connection exactly once on end, error or drop
//!
//! # Design Decisions
//! - Each exchange holds an [`ExchangeLease`]; releasing it is idempotent
//! - Terminal events drop the upstream stream immediately instead of waiting
//!   for the response body to be dropped by the server
//! - A mid-stream error is surfaced as an aborted body, never a new status

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::response::Response;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use uuid::Uuid;

use crate::proxy::headers::filter_outbound;

/// Unique identifier for a proxy exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ex-{}", self.0.simple())
    }
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicU64,
    released: AtomicU64,
}

/// Counts exchange leases so open upstream sessions are observable.
#[derive(Debug, Clone, Default)]
pub struct ExchangeTracker {
    counters: Arc<Counters>,
}

impl ExchangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new upstream session. The returned lease releases it.
    pub fn open(&self, id: ExchangeId) -> ExchangeLease {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        ExchangeLease {
            counters: Arc::clone(&self.counters),
            id,
            released: false,
        }
    }

    /// Leases ever opened.
    pub fn opened(&self) -> u64 {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Leases ever released.
    pub fn released(&self) -> u64 {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Sessions currently open.
    pub fn active(&self) -> u64 {
        // Read released first: it can never overtake a later read of opened.
        let released = self.released();
        self.opened() - released
    }
}

/// Ownership of one exchange's upstream session.
///
/// Released explicitly on a terminal stream event or implicitly on drop,
/// whichever comes first; the counter moves exactly once.
#[derive(Debug)]
pub struct ExchangeLease {
    counters: Arc<Counters>,
    id: ExchangeId,
    released: bool,
}

impl ExchangeLease {
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(exchange_id = %self.id, "Upstream session released");
    }
}

impl Drop for ExchangeLease {
    fn drop(&mut self) {
        self.release();
    }
}

/// Byte stream relayed to the caller.
///
/// Holds the upstream body until its terminal event, then drops it together
/// with the lease. Polling after the terminal event yields `None`.
pub struct RelayStream {
    upstream: Option<BoxStream<'static, Result<Bytes, reqwest::Error>>>,
    lease: ExchangeLease,
    relayed: u64,
}

impl RelayStream {
    pub fn new<S>(upstream: S, lease: ExchangeLease) -> Self
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    {
        Self {
            upstream: Some(upstream.boxed()),
            lease,
            relayed: 0,
        }
    }

    fn close(&mut self) {
        self.upstream = None;
        self.lease.release();
    }
}

impl Stream for RelayStream {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let Some(upstream) = this.upstream.as_mut() else {
            return Poll::Ready(None);
        };

        match upstream.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.relayed += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(
                    exchange_id = %this.lease.id(),
                    relayed_bytes = this.relayed,
                    error = %e,
                    "Upstream body failed mid-stream, truncating response"
                );
                this.close();
                Poll::Ready(Some(Err(std::io::Error::other(e))))
            }
            Poll::Ready(None) => {
                tracing::debug!(
                    exchange_id = %this.lease.id(),
                    relayed_bytes = this.relayed,
                    "Upstream body complete"
                );
                this.close();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Turn an open upstream response into the caller's streaming response.
///
/// Status and headers are fixed here, before the first body chunk.
pub fn relay(upstream: reqwest::Response, lease: ExchangeLease) -> Response {
    let status = upstream.status();
    let headers = filter_outbound(upstream.headers());
    let body = Body::from_stream(RelayStream::new(upstream.bytes_stream(), lease));

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
