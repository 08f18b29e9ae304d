//! Pushover MCP Gateway
//!
//! MCP server exposing the `send_notification` tool that provides:
//! - Signed bearer token issuance and verification
//! - Per-request authentication context for HTTP transport
//! - Tool invocation guard shared by stdio and HTTP transports
//! - Streamable HTTP server with health and capability endpoints

pub mod auth;
pub mod logging;
pub mod mcp;
pub mod server;

pub use auth::{
    issue_token, verify_token, AuthContext, AuthFailure, AuthMiddleware, AuthMode, Claims,
    TokenError,
};
pub use mcp::{PushoverMcpHandler, ToolGuard};
pub use server::{serve_stdio, HttpServer};
