//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /echomind/health
//!     → probe.rs (disabled? → no network call)
//!     → one GET {base}/health with a short timeout
//!     → HealthStatus (disabled | healthy | unhealthy | error)
//! ```
//!
//! # Design Decisions
//! - Probing is on demand, not periodic
//! - Failures are values, never errors

pub mod probe;

pub use probe::{HealthProber, HealthStatus};
