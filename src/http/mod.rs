//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, access log)
//!     → middleware/auth.rs (verified caller required on proxied routes)
//!     → routes.rs (resource group → ResourcePath)
//!     → proxy::Dispatcher
//!     → Send streaming response to client
//! ```

pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{AppState, HttpServer};
