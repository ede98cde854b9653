//! Caller authentication.
//!
//! The proxy core never validates credentials itself; it only requires that
//! an [`Authenticator`] has produced a [`VerifiedUser`] before dispatch.

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::config::AuthConfig;

/// Identity attached to requests that passed authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingCredentials,

    #[error("Invalid token")]
    InvalidToken,
}

/// Verifies the caller of an inbound request.
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    fn verify(&self, headers: &HeaderMap) -> Result<VerifiedUser, AuthError>;
}

/// Accepts `Authorization: Bearer <token>` for a fixed token list.
#[derive(Debug, Clone)]
pub struct BearerTokenAuthenticator {
    tokens: Vec<String>,
}

impl BearerTokenAuthenticator {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().filter(|t| !t.trim().is_empty()).collect(),
        }
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn verify(&self, headers: &HeaderMap) -> Result<VerifiedUser, AuthError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::InvalidToken);
        }

        let token = token.trim();
        self.tokens
            .iter()
            .position(|t| t == token)
            .map(|idx| VerifiedUser {
                subject: format!("bearer#{idx}"),
            })
            .ok_or(AuthError::InvalidToken)
    }
}

/// Used when verification happens in front of this service.
#[derive(Debug, Clone, Default)]
pub struct TrustedUpstreamAuthenticator;

impl Authenticator for TrustedUpstreamAuthenticator {
    fn verify(&self, _headers: &HeaderMap) -> Result<VerifiedUser, AuthError> {
        Ok(VerifiedUser {
            subject: "anonymous".to_string(),
        })
    }
}

/// Pick the authenticator for a configuration.
pub fn from_config(config: &AuthConfig) -> Arc<dyn Authenticator> {
    if config.enabled {
        Arc::new(BearerTokenAuthenticator::new(config.tokens.iter().cloned()))
    } else {
        Arc::new(TrustedUpstreamAuthenticator)
    }
}
