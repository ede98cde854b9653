//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (access log, authentication)
//! - Mount routes under the configured prefix
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::auth::{self, Authenticator};
use crate::config::ProxyConfig;
use crate::health::HealthProber;
use crate::http::middleware::require_verified_user;
use crate::http::routes;
use crate::proxy::{Dispatcher, ExchangeTracker};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub prober: Arc<HealthProber>,
}

/// HTTP server for the EchoMind proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let authenticator = auth::from_config(&config.auth);
        Self::with_authenticator(config, authenticator)
    }

    /// Create a server that verifies callers with a custom authenticator.
    pub fn with_authenticator(
        config: ProxyConfig,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self, reqwest::Error> {
        let dispatcher = Arc::new(Dispatcher::from_config(&config.upstream)?);
        let prober = Arc::new(HealthProber::new(&config.upstream)?);

        let state = AppState {
            dispatcher: Arc::clone(&dispatcher),
            prober,
        };

        let router = Self::build_router(&config, state, authenticator);
        Ok(Self {
            router,
            config,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ProxyConfig,
        state: AppState,
        authenticator: Arc<dyn Authenticator>,
    ) -> Router {
        let proxied = routes::resource_groups()
            .route_layer(middleware::from_fn_with_state(authenticator, require_verified_user));

        let app = Router::new()
            .merge(proxied)
            .merge(routes::health())
            .with_state(state);

        let app = match config.listener.mount_prefix.as_str() {
            "" => app,
            prefix => Router::new().nest(prefix, app),
        };

        // Access log only: no request or response headers are added here.
        app.layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = self.config.upstream.base_url().unwrap_or("<disabled>"),
            mount_prefix = %self.config.listener.mount_prefix,
            "HTTP server starting"
        );
        if !self.dispatcher.enabled() {
            tracing::warn!("No upstream configured, proxied routes will answer 503");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving or in-process calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Lease accounting for upstream exchanges.
    pub fn exchanges(&self) -> ExchangeTracker {
        self.dispatcher.tracker().clone()
    }
}
