//! Route table for the proxied resource groups and the health endpoint.
//!
//! Every resource group gets the same three routes (`/{group}`, `/{group}/`,
//! `/{group}/{*rest}`) for GET/POST/PUT/DELETE/PATCH, all forwarding to
//! `{base}/api/v1/{group}[/{rest}]`.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter, MethodRouter},
    Json, Router,
};

use crate::http::server::AppState;
use crate::proxy::{ProxyError, ProxyMethod, ResourcePath};

/// Resource groups exposed by the EchoMind API.
pub const RESOURCE_GROUPS: &[&str] = &[
    "documents",
    "connectors",
    "assistants",
    "llms",
    "embedding-models",
    "teams",
    "chat",
];

/// Unauthenticated health route.
pub const HEALTH_PATH: &str = "/echomind/health";

const PROXY_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH);

/// Register the exact, trailing-slash and wildcard routes for one group.
pub fn resource_group(router: Router<AppState>, group: &'static str) -> Router<AppState> {
    let methods = move || -> MethodRouter<AppState> {
        on(PROXY_METHODS, move |State(state): State<AppState>, request: Request<Body>| {
            proxy_group(state, group, request)
        })
    };

    router
        .route(&format!("/{group}"), methods())
        .route(&format!("/{group}/"), methods())
        .route(&format!("/{group}/{{*rest}}"), methods())
}

/// All resource groups in [`RESOURCE_GROUPS`].
pub fn resource_groups() -> Router<AppState> {
    RESOURCE_GROUPS
        .iter()
        .copied()
        .fold(Router::new(), |router, group| resource_group(router, group))
}

/// Health route, outside the authentication layer.
pub fn health() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(echomind_health))
}

async fn proxy_group(
    state: AppState,
    group: &'static str,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let Ok(method) = ProxyMethod::try_from(request.method()) else {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    };
    let resource = ResourcePath::from_request_path(group, request.uri().path());

    state.dispatcher.dispatch(method, resource, request).await
}

async fn echomind_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.prober.probe().await)
}
