//! Bearer token authentication for the HTTP transport
//!
//! - `token`: compact HMAC-SHA256 signed tokens (issue / verify)
//! - `middleware`: turns an inbound request into an `AuthContext`
//! - `context`: the typed per-request identity read by tool handlers

mod context;
mod middleware;
mod token;

pub use context::{AuthContext, AuthState, Identity};
pub use middleware::{
    auth_context_middleware, extract_bearer_token, AuthFailure, AuthMiddleware, AuthMode,
};
pub use token::{
    encode_token, issue_token, verify_token, verify_token_at, Claims, TokenError,
    CLOCK_SKEW_LEEWAY_SECS, TOKEN_ALGORITHM, TOKEN_AUDIENCE, TOKEN_ISSUER,
};
