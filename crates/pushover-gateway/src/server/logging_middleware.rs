//! HTTP Request Logging Middleware
//!
//! Assigns a trace id to every request and logs one entry and one exit line.
//! Request bodies are buffered only to read the JSON-RPC method; response
//! bodies are never buffered so SSE streams pass through untouched.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, Limited};
use tracing::{debug, warn, Instrument};

use crate::logging::{RequestSpan, TraceContext};

/// Largest request body buffered for method extraction (4MB)
const MAX_REQUEST_BODY: usize = 4 * 1024 * 1024;

/// Headers that should be redacted
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key"];

/// Compact header summary for DEBUG logs. Credentials are never printed.
fn redact_headers_compact(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| {
            matches!(
                name.as_str(),
                "content-type"
                    | "accept"
                    | "user-agent"
                    | "authorization"
                    | "mcp-session-id"
                    | "mcp-protocol-version"
            )
        })
        .map(|(name, value)| {
            if SENSITIVE_HEADERS.contains(&name.as_str()) {
                format!("{}=[REDACTED]", name)
            } else {
                format!("{}={:?}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract MCP method from JSON-RPC body
pub fn extract_mcp_method(bytes: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    json.get("method")
        .and_then(|m| m.as_str())
        .map(String::from)
}

pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let mut ctx = TraceContext::new(request.method().as_str(), request.uri().path());
    let span = RequestSpan::enter(&ctx);

    async move {
        debug!(
            trace_id = %ctx.trace_id,
            headers = %redact_headers_compact(request.headers()),
            "HTTP request"
        );

        let request = if request.method() == Method::POST {
            let (parts, body) = request.into_parts();
            let bytes = match Limited::new(body, MAX_REQUEST_BODY).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!(trace_id = %ctx.trace_id, "Failed to read request body: {}", e);
                    return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
                        .into_response();
                }
            };
            ctx = ctx.with_mcp_method(extract_mcp_method(&bytes));
            Request::from_parts(parts, Body::from(bytes))
        } else {
            request
        };

        RequestSpan::log_entry(&ctx);

        let mut request = request;
        request.extensions_mut().insert(ctx.clone());

        let response = next.run(request).await;
        RequestSpan::log_exit(&ctx, response.status().as_u16());
        response
    }
    .instrument(span)
    .await
}
