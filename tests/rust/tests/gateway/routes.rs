//! `/health`, `/capabilities` and `/generate-token`

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use pushover_core::HttpConfig;
use pushover_gateway::auth::verify_token;
use pushover_gateway::{AuthMiddleware, HttpServer};
use serde_json::Value;
use tests::{test_handler, test_http_config, RecordingClient, TEST_SECRET};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn router(config: HttpConfig, auth: AuthMiddleware) -> Router {
    let handler = test_handler(auth, Arc::new(RecordingClient::new()));
    HttpServer::new(config, handler).router(CancellationToken::new())
}

fn with_token_endpoint() -> HttpConfig {
    HttpConfig {
        token_endpoint: true,
        ..test_http_config()
    }
}

async fn call(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: Router, path: &str) -> (StatusCode, Value) {
    let request = Request::get(path).body(Body::empty()).unwrap();
    let (status, body) = call(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn post(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, json) =
        get_json(router(test_http_config(), AuthMiddleware::disabled()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].as_str().is_some());
    assert!(json["service"].as_str().is_some());
}

#[tokio::test]
async fn test_health_needs_no_token_when_auth_enforced() {
    let (status, _) = get_json(
        router(test_http_config(), AuthMiddleware::enforced(TEST_SECRET)),
        "/health",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_capabilities_reflect_auth_mode() {
    let (status, json) = get_json(
        router(test_http_config(), AuthMiddleware::enforced(TEST_SECRET)),
        "/capabilities",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transport"], "http");
    assert_eq!(json["authentication"]["enabled"], true);
    assert_eq!(json["tools"][0]["name"], "send_notification");

    let (_, json) = get_json(
        router(test_http_config(), AuthMiddleware::disabled()),
        "/capabilities",
    )
    .await;
    assert_eq!(json["authentication"]["enabled"], false);
}

#[tokio::test]
async fn test_token_endpoint_off_by_default() {
    let router = router(test_http_config(), AuthMiddleware::enforced(TEST_SECRET));
    let (status, _) = call(router, post("/generate-token", "{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_endpoint_needs_auth_enabled() {
    let router = router(with_token_endpoint(), AuthMiddleware::disabled());
    let (status, _) = call(router, post("/generate-token", "{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_endpoint_issues_verifiable_token() {
    let router = router(with_token_endpoint(), AuthMiddleware::enforced(TEST_SECRET));
    let body = r#"{"user_id":"u42","username":"Alice","role":"user","expires_in":2}"#;
    let (status, body) = call(router, post("/generate-token", body)).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["user_id"], "u42");
    assert_eq!(json["username"], "Alice");
    assert_eq!(json["expires_in"], 2);
    assert!(json["expires_at"].as_str().unwrap().ends_with('Z'));

    let claims = verify_token(TEST_SECRET.as_bytes(), json["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.subject_id, "u42");
    assert_eq!(claims.display_name, "Alice");
    assert_eq!(claims.role, "user");
}

#[tokio::test]
async fn test_token_endpoint_defaults_and_bad_json() {
    let router_a = router(with_token_endpoint(), AuthMiddleware::enforced(TEST_SECRET));
    let (status, body) = call(router_a, post("/generate-token", "")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["user_id"], "default_user");
    assert_eq!(json["username"], "pushover_user");
    assert_eq!(json["role"], "user");
    assert_eq!(json["expires_in"], 24);

    let router_b = router(with_token_endpoint(), AuthMiddleware::enforced(TEST_SECRET));
    let (status, _) = call(router_b, post("/generate-token", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/mcp")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

async fn preflight_headers(config: HttpConfig, origin: &str) -> axum::http::HeaderMap {
    router(config, AuthMiddleware::enforced(TEST_SECRET))
        .oneshot(preflight(origin))
        .await
        .unwrap()
        .headers()
        .clone()
}

fn with_origins(origins: &[&str]) -> HttpConfig {
    HttpConfig {
        cors_origins: origins.iter().map(|o| o.to_string()).collect(),
        ..test_http_config()
    }
}

fn header<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_cors_wildcard_preflight() {
    let headers = preflight_headers(with_origins(&["*"]), "https://anywhere.example").await;

    assert_eq!(header(&headers, "access-control-allow-origin"), Some("*"));
    assert_eq!(header(&headers, "access-control-max-age"), Some("86400"));

    let methods = header(&headers, "access-control-allow-methods")
        .unwrap()
        .to_ascii_uppercase();
    for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "{} missing from {}", method, methods);
    }

    let allowed = header(&headers, "access-control-allow-headers")
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"), "{}", allowed);
    assert!(allowed.contains("authorization"), "{}", allowed);
}

#[tokio::test]
async fn test_cors_listed_origin_allowed() {
    let config = with_origins(&["https://app.example", "https://other.example"]);
    let headers = preflight_headers(config, "https://app.example").await;

    assert_eq!(
        header(&headers, "access-control-allow-origin"),
        Some("https://app.example")
    );
    assert_eq!(header(&headers, "access-control-max-age"), Some("86400"));
}

#[tokio::test]
async fn test_cors_unlisted_origin_not_allowed() {
    let config = with_origins(&["https://app.example"]);
    let headers = preflight_headers(config, "https://evil.example").await;

    assert_eq!(header(&headers, "access-control-allow-origin"), None);
}

#[tokio::test]
async fn test_cors_disabled_sends_no_cors_headers() {
    let config = HttpConfig {
        cors_enabled: false,
        ..test_http_config()
    };
    let headers = preflight_headers(config, "https://app.example").await;

    assert!(
        !headers
            .keys()
            .any(|name| name.as_str().starts_with("access-control-")),
        "{:?}",
        headers
    );
}
