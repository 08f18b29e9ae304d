//! Pushover MCP Handler
//!
//! Implements the MCP ServerHandler trait exposing a single tool,
//! `send_notification`, backed by a [`NotificationClient`].

use std::sync::Arc;

use pushover_core::{
    branding, Notification, NotificationClient, NotificationError, NotificationRequest,
    Priority, PushoverSettings, MAX_MESSAGE_CHARS,
};
use rmcp::{model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::context::auth_context_from_extensions;
use super::guard::ToolGuard;
use crate::auth::{AuthContext, AuthMiddleware};

pub const SEND_NOTIFICATION_TOOL: &str = "send_notification";

/// Tool parameters and their descriptions, shared with `/capabilities`
pub const SEND_NOTIFICATION_PARAMS: &[(&str, &str)] = &[
    ("message", "The notification message to send (required)"),
    ("title", "Optional title for the notification"),
    ("priority", "Priority level (-2 to 2, default: -1)"),
    ("device", "Optional specific device to send to"),
    ("sound", "Optional notification sound"),
    ("expire", "Optional expiration time in seconds (for priority 2)"),
];

#[derive(Clone)]
pub struct PushoverMcpHandler {
    settings: Arc<PushoverSettings>,
    client: Arc<dyn NotificationClient>,
    guard: ToolGuard,
}

impl PushoverMcpHandler {
    pub fn new(
        settings: Arc<PushoverSettings>,
        client: Arc<dyn NotificationClient>,
        auth: Arc<AuthMiddleware>,
    ) -> Self {
        Self {
            settings,
            client,
            guard: ToolGuard::new(auth),
        }
    }

    pub fn guard(&self) -> &ToolGuard {
        &self.guard
    }

    fn send_notification_tool() -> Tool {
        let properties: serde_json::Map<String, Value> = SEND_NOTIFICATION_PARAMS
            .iter()
            .map(|(name, description)| {
                (
                    name.to_string(),
                    json!({ "type": "string", "description": description }),
                )
            })
            .collect();

        let schema = json!({
            "type": "object",
            "properties": properties,
            "required": ["message"],
        });
        let schema = match schema {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };

        Tool::new(
            SEND_NOTIFICATION_TOOL,
            "Send a notification via Pushover",
            Arc::new(schema),
        )
    }

    /// Body of the `send_notification` tool, run behind the guard
    async fn send_notification(
        &self,
        arguments: Option<JsonObject>,
        ctx: AuthContext,
    ) -> Result<CallToolResult, McpError> {
        let arguments = arguments.unwrap_or_default();

        let request = match parse_notification_arguments(&arguments) {
            Ok(request) => request,
            Err(message) => return Ok(tool_error(message)),
        };

        let notification = match Notification::from_request(request, &self.settings) {
            Ok(notification) => notification,
            Err(e) => return Ok(tool_error(e.to_string())),
        };

        debug!(
            priority = %notification.priority,
            device = notification.device.as_deref().unwrap_or("-"),
            "[MCP] Sending notification"
        );

        let receipt = match self.client.send(&notification).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("[MCP] Failed to send notification: {}", e);
                return Ok(tool_error(format!("Failed to send notification: {}", e)));
            }
        };

        let mut text = "Notification sent successfully".to_string();
        if let Some(receipt) = receipt.receipt.as_deref().filter(|r| !r.is_empty()) {
            text.push_str(&format!(". Receipt: {}", receipt));
        }
        if ctx.is_http() && ctx.is_authenticated() && !ctx.display_name().is_empty() {
            text.push_str(&format!(" (sent by {})", ctx.display_name()));
        }

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Read an argument as a string. Numbers are accepted for numeric fields.
fn string_arg(arguments: &JsonObject, key: &str) -> Option<String> {
    match arguments.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn raw tool arguments into a notification request.
///
/// Returns the caller-facing error text on invalid input.
fn parse_notification_arguments(arguments: &JsonObject) -> Result<NotificationRequest, String> {
    let message = string_arg(arguments, "message")
        .filter(|m| !m.is_empty())
        .ok_or_else(|| "Message parameter is required".to_string())?;

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_CHARS
        ));
    }

    let mut request = NotificationRequest::new(message);
    request.title = string_arg(arguments, "title");
    request.device = string_arg(arguments, "device");
    request.sound = string_arg(arguments, "sound");

    if let Some(priority) = string_arg(arguments, "priority").filter(|p| !p.trim().is_empty()) {
        request.priority = Some(priority.parse::<Priority>().map_err(|e| match e {
            NotificationError::PriorityOutOfRange(_) => {
                "Priority must be between -2 and 2".to_string()
            }
            _ => "Invalid priority value".to_string(),
        })?);
    }

    if let Some(expire) = string_arg(arguments, "expire").filter(|e| !e.trim().is_empty()) {
        let expire = expire
            .trim()
            .parse::<u32>()
            .map_err(|_| "Invalid expire value".to_string())?;
        request.expire_secs = Some(expire);
    }

    Ok(request)
}

impl ServerHandler for PushoverMcpHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: branding::SERVICE_NAME.to_string(),
                version: branding::VERSION.to_string(),
                ..Default::default()
            },
            instructions: Some(branding::SERVICE_DESCRIPTION.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(vec![
            Self::send_notification_tool(),
        ]))
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = auth_context_from_extensions(&context.extensions);

        info!(tool = %params.name, "[MCP] call_tool");

        if params.name != SEND_NOTIFICATION_TOOL {
            return Err(McpError::invalid_params(
                format!("Unknown tool: {}", params.name),
                None,
            ));
        }

        let arguments = params.arguments;
        self.guard
            .invoke(&ctx, SEND_NOTIFICATION_TOOL, |ctx| {
                self.send_notification(arguments, ctx)
            })
            .await
    }
}
