//! EchoMind API proxy library.
//!
//! Streams authenticated front-end requests to a single EchoMind API
//! upstream and relays the responses back without buffering them.

pub mod auth;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
