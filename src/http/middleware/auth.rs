//! Authentication middleware for proxied routes.
//! Rejects unverified callers before the dispatcher is reached.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::Authenticator;

/// Verify the caller and attach a `VerifiedUser` to the request extensions.
pub async fn require_verified_user(
    State(authenticator): State<Arc<dyn Authenticator>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticator.verify(req.headers()) {
        Ok(user) => {
            tracing::trace!(subject = %user.subject, "Caller verified");
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, path = %req.uri().path(), "Rejecting unauthenticated request");
            (StatusCode::UNAUTHORIZED, Json(json!({ "detail": e.to_string() }))).into_response()
        }
    }
}
