//! MCP Server transports
//!
//! - stdio: one MCP session over stdin/stdout, never subject to token checks
//! - HTTP: Streamable HTTP at the configured path, plus `/health`,
//!   `/capabilities` and the optional `/generate-token`

mod handlers;
pub mod logging_middleware;

pub use handlers::{AppState, HealthResponse, TokenRequest, TokenResponse};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use pushover_core::HttpConfig;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServiceExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::auth::{auth_context_middleware, AuthMiddleware};
use crate::mcp::PushoverMcpHandler;

const MCP_SESSION_ID: HeaderName = HeaderName::from_static("mcp-session-id");
const MCP_PROTOCOL_VERSION: HeaderName = HeaderName::from_static("mcp-protocol-version");

/// Serve one MCP session over stdin/stdout until the client disconnects
pub async fn serve_stdio(handler: PushoverMcpHandler) -> anyhow::Result<()> {
    info!("[Gateway] Starting MCP server on stdio");

    let service = handler
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start stdio transport")?;
    let reason = service.waiting().await?;

    info!("[Gateway] stdio session ended: {:?}", reason);
    Ok(())
}

/// Streamable HTTP server
pub struct HttpServer {
    config: HttpConfig,
    handler: PushoverMcpHandler,
}

impl HttpServer {
    pub fn new(config: HttpConfig, handler: PushoverMcpHandler) -> Self {
        Self { config, handler }
    }

    fn auth(&self) -> Arc<AuthMiddleware> {
        self.handler.guard().auth().clone()
    }

    /// Build the Axum router. Cancelling `ct` closes open MCP sessions.
    pub fn router(&self, ct: CancellationToken) -> Router {
        let auth = self.auth();
        let handler = self.handler.clone();

        let mcp_service = StreamableHttpService::new(
            move || {
                debug!("[Gateway] Creating handler instance for MCP session");
                Ok(handler.clone())
            },
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig {
                stateful_mode: !self.config.stateless,
                sse_keep_alive: Some(self.config.heartbeat).filter(|d| !d.is_zero()),
                sse_retry: Some(Duration::from_secs(3)),
                cancellation_token: ct,
            },
        );

        // axum cannot nest at the root
        let mcp_routes = if self.config.path == "/" {
            Router::new().fallback_service(mcp_service)
        } else {
            Router::new().nest_service(&self.config.path, mcp_service)
        };
        let mcp_routes = mcp_routes.layer(middleware::from_fn_with_state(
            auth.clone(),
            auth_context_middleware,
        ));

        let mut api_routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/capabilities", get(handlers::capabilities));

        if auth.is_enforced() && self.config.token_endpoint {
            warn!("[Gateway] /generate-token endpoint enabled: anyone reaching this server can mint tokens");
            api_routes = api_routes.route("/generate-token", post(handlers::generate_token));
        }

        // SSE streams are long-lived, so the timeout only covers the JSON endpoints
        let api_routes = api_routes
            .with_state(AppState { auth })
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.timeout,
            ));

        let mut router = api_routes
            .merge(mcp_routes)
            .layer(middleware::from_fn(
                logging_middleware::http_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            router = router.layer(cors_layer(&self.config.cors_origins));
        }

        router
    }

    /// Bind the configured address and serve until Ctrl-C / SIGTERM
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.listen_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        let ct = CancellationToken::new();
        tokio::spawn(shutdown_on_signal(ct.clone()));

        self.serve(listener, ct).await
    }

    /// Serve on an already bound listener until `ct` is cancelled
    pub async fn serve(self, listener: TcpListener, ct: CancellationToken) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;

        info!("[Gateway] Starting on {}", local_addr);
        info!("[Gateway] MCP endpoint: {}", self.config.path);
        info!(
            "[Gateway] Authentication: {}",
            if self.auth().is_enforced() {
                "enabled"
            } else {
                "disabled"
            }
        );
        info!(
            "[Gateway] CORS: {}",
            if self.config.cors_enabled {
                "enabled"
            } else {
                "disabled"
            }
        );

        let router = self.router(ct.child_token());

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { ct.cancelled_owned().await })
            .await
            .context("HTTP server error")?;

        info!("[Gateway] Server stopped");
        Ok(())
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            MCP_SESSION_ID,
            MCP_PROTOCOL_VERSION,
        ])
        .expose_headers([MCP_SESSION_ID])
        .max_age(Duration::from_secs(86400));

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("[Gateway] Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn shutdown_on_signal(ct: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("[Gateway] Ctrl+C received, shutting down"),
        _ = terminate => info!("[Gateway] SIGTERM received, shutting down"),
    }
    ct.cancel();
}
