//! Auth Middleware
//!
//! Extracts the bearer token from an HTTP request, verifies it and records the
//! outcome as an [`AuthContext`] in the request extensions. Requests are never
//! rejected here; the tool guard decides what an unauthenticated caller may do.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use http::{header::AUTHORIZATION, HeaderMap};
use pushover_core::{AuthConfig, ConfigError};
use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::context::{AuthContext, Identity};
use super::token::{verify_token_at, TokenError};
use crate::logging::TraceContext;

/// Why a request failed to authenticate
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("missing or invalid authorization header")]
    MissingCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("token expired")]
    Expired,
}

/// Authentication mode, fixed at construction
pub enum AuthMode {
    Enforced { secret: Zeroizing<Vec<u8>> },
    Disabled,
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enforced { .. } => f.write_str("Enforced { secret: \"***\" }"),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Process-wide authenticator, shared read-only behind an `Arc`
#[derive(Debug)]
pub struct AuthMiddleware {
    mode: AuthMode,
}

impl AuthMiddleware {
    pub fn enforced(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: AuthMode::Enforced {
                secret: Zeroizing::new(secret.into()),
            },
        }
    }

    pub fn disabled() -> Self {
        Self {
            mode: AuthMode::Disabled,
        }
    }

    /// Build from configuration, failing when auth is enabled without a secret
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.enabled {
            Ok(Self::enforced(config.secret_key.as_bytes()))
        } else {
            Ok(Self::disabled())
        }
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    pub fn is_enforced(&self) -> bool {
        matches!(self.mode, AuthMode::Enforced { .. })
    }

    /// Signing secret, when enforced
    pub fn secret(&self) -> Option<&[u8]> {
        match &self.mode {
            AuthMode::Enforced { secret } => Some(secret.as_slice()),
            AuthMode::Disabled => None,
        }
    }

    /// Build the context for a request at the current time
    pub fn build_context(&self, method: &str, headers: &HeaderMap) -> AuthContext {
        self.build_context_at(method, headers, chrono::Utc::now().timestamp())
    }

    pub fn build_context_at(&self, method: &str, headers: &HeaderMap, now: i64) -> AuthContext {
        let secret = match &self.mode {
            AuthMode::Disabled => return AuthContext::bypassed(method),
            AuthMode::Enforced { secret } => secret,
        };

        let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        match authenticate(secret, header, now) {
            Ok(identity) => AuthContext::authenticated(method, identity),
            Err(failure) => AuthContext::rejected(method, failure.to_string()),
        }
    }
}

/// Validate an `Authorization` header value and return the caller identity.
///
/// This is the only place token expiry is enforced.
fn authenticate(secret: &[u8], header: Option<&str>, now: i64) -> Result<Identity, AuthFailure> {
    let token = header
        .and_then(extract_bearer_token)
        .ok_or(AuthFailure::MissingCredentials)?;

    let claims = verify_token_at(secret, token, now)?;
    if claims.is_expired_at(now) {
        return Err(AuthFailure::Expired);
    }

    Ok(Identity {
        subject_id: claims.subject_id,
        display_name: claims.display_name,
        role: claims.role,
    })
}

/// Extract the token from `Bearer <token>`.
///
/// The value must split on whitespace into exactly two parts and the scheme
/// is matched case-insensitively.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token)
}

/// axum middleware attaching an [`AuthContext`] to every request
pub async fn auth_context_middleware(
    State(auth): State<Arc<AuthMiddleware>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = auth.build_context(request.method().as_str(), request.headers());

    if !context.is_authenticated() {
        let trace_id = request
            .extensions()
            .get::<TraceContext>()
            .map(|ctx| ctx.trace_id.clone())
            .unwrap_or_else(|| "??????".to_string());
        warn!(
            trace_id = %trace_id,
            reason = %context.auth_error(),
            "[Auth] Request not authenticated"
        );
    } else if let Some(identity) = context.identity() {
        debug!(subject = %identity.subject_id, "[Auth] Request authenticated");
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}
