//! # Pushover MCP Core Library
//!
//! Configuration, notification domain and provider client shared by the
//! CLI and the MCP gateway.
//!
//! ## Modules
//!
//! - `branding` - Service naming constants
//! - `config` - Environment-driven runtime configuration
//! - `domain` - Notification entities and validation
//! - `service` - Notification provider client

pub mod branding;
pub mod config;
pub mod domain;
pub mod service;

// Re-export commonly used types
pub use config::{AuthConfig, ConfigError, HttpConfig, McpConfig, PushoverSettings};
pub use domain::*;
pub use service::*;
