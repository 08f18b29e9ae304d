//! MCP server
//!
//! - `handler`: `ServerHandler` exposing the `send_notification` tool
//! - `guard`: authorization check wrapped around every tool invocation
//! - `context`: reads the per-request `AuthContext` out of rmcp extensions

pub mod context;
pub mod guard;
pub mod handler;

pub use context::auth_context_from_extensions;
pub use guard::ToolGuard;
pub use handler::{PushoverMcpHandler, SEND_NOTIFICATION_TOOL};
