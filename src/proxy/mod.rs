//! Proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (method, resource path, headers, body, query)
//!     → headers.rs (drop host / content-length)
//!     → target.rs ({base}/api/v1/{resource}?{query})
//!     → client.rs (one upstream request, bounded total timeout)
//!     → relay.rs (status + filtered headers now, body chunks lazily)
//!     → Caller
//!
//! Any failure before the relay starts:
//!     → error.rs (503 / 502 / 500 with {"detail": ...})
//! ```
//!
//! # Design Decisions
//! - Exactly one upstream request per inbound request
//! - Response bodies are never buffered
//! - Upstream session release is tracked per exchange

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod headers;
pub mod relay;
pub mod target;

pub use dispatcher::Dispatcher;
pub use error::ProxyError;
pub use relay::{ExchangeTracker, RelayStream};
pub use target::{ProxyMethod, ResourcePath};
