//! Centralized naming constants
//!
//! All product naming used in server info, logs and HTTP payloads comes from
//! this module.

/// Name reported in MCP server info and HTTP endpoints
pub const SERVICE_NAME: &str = "pushover-mcp-server";

/// Human readable description of the service
pub const SERVICE_DESCRIPTION: &str = "MCP server for sending Pushover notifications";

/// Crate version, shared by every front-end
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
