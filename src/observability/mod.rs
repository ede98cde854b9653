//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, exchange_id per proxy exchange)
//!     → logging.rs (EnvFilter + pretty or JSON fmt layer)
//!
//! Consumers:
//!     → stdout, collected by the container runtime
//! ```

pub mod logging;

pub use logging::init_logging;
