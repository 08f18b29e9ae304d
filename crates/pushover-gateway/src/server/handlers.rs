//! HTTP handlers for the plain JSON endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pushover_core::branding;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::{encode_token, AuthMiddleware, Claims};
use crate::mcp::handler::{SEND_NOTIFICATION_PARAMS, SEND_NOTIFICATION_TOOL};

const DEFAULT_TOKEN_USER_ID: &str = "default_user";
const DEFAULT_TOKEN_USERNAME: &str = "pushover_user";
const DEFAULT_TOKEN_ROLE: &str = "user";
const DEFAULT_TOKEN_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthMiddleware>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: branding::SERVICE_NAME.to_string(),
    })
}

/// Describe the server, its tool and whether authentication is enforced
pub async fn capabilities(State(state): State<AppState>) -> Json<Value> {
    let parameters: serde_json::Map<String, Value> = SEND_NOTIFICATION_PARAMS
        .iter()
        .map(|(name, description)| (name.to_string(), Value::from(*description)))
        .collect();

    Json(json!({
        "name": branding::SERVICE_NAME,
        "version": branding::VERSION,
        "description": branding::SERVICE_DESCRIPTION,
        "transport": "http",
        "tools": [{
            "name": SEND_NOTIFICATION_TOOL,
            "description": "Send a notification via Pushover",
            "parameters": parameters,
        }],
        "authentication": {
            "enabled": state.auth.is_enforced(),
            "type": "JWT",
        },
        "features": ["notifications", "health_check", "capabilities_discovery"],
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub user_id: String,
    pub username: String,
    pub role: String,
    /// Lifetime in hours
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub expires_in: i64,
    pub expires_at: String,
}

/// Issue a token (development helper, opt-in)
///
/// Empty fields take defaults; a non-positive lifetime becomes 24 hours.
pub async fn generate_token(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(secret) = state.auth.secret() else {
        return (StatusCode::NOT_FOUND, "Authentication is disabled").into_response();
    };

    let request: TokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TokenRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                debug!("[Gateway] Invalid token request: {}", e);
                return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
            }
        }
    };

    let user_id = or_default(request.user_id, DEFAULT_TOKEN_USER_ID);
    let username = or_default(request.username, DEFAULT_TOKEN_USERNAME);
    let role = or_default(request.role, DEFAULT_TOKEN_ROLE);
    let expires_in = if request.expires_in > 0 {
        request.expires_in
    } else {
        DEFAULT_TOKEN_HOURS
    };

    let claims = Claims::new(&user_id, &username, &role, expires_in);
    let token = match encode_token(secret, &claims) {
        Ok(token) => token,
        Err(e) => {
            warn!("[Gateway] Failed to generate token: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate token")
                .into_response();
        }
    };

    info!(subject = %user_id, role = %role, "[Gateway] Issued token over HTTP");

    Json(TokenResponse {
        token,
        user_id,
        username,
        role,
        expires_in,
        expires_at: claims
            .expires_at_utc()
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_default(),
    })
    .into_response()
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
