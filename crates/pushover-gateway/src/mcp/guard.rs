//! Tool Invocation Guard
//!
//! Wraps a tool operation with the authorization check and outcome logging.
//! HTTP callers must be authenticated when auth is enforced; stdio callers
//! never are subject to token checks.

use std::future::Future;
use std::sync::Arc;

use rmcp::{model::*, ErrorData as McpError};
use tracing::{info, warn};

use crate::auth::{AuthContext, AuthMiddleware};

#[derive(Clone)]
pub struct ToolGuard {
    auth: Arc<AuthMiddleware>,
}

impl ToolGuard {
    pub fn new(auth: Arc<AuthMiddleware>) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> &Arc<AuthMiddleware> {
        &self.auth
    }

    /// Whether `ctx` may run a tool. Returns the failure reason otherwise.
    pub fn check(&self, ctx: &AuthContext) -> Result<(), String> {
        if ctx.is_http() && self.auth.is_enforced() && !ctx.is_authenticated() {
            return Err(ctx.auth_error().to_string());
        }
        Ok(())
    }

    /// Run `operation` if `ctx` passes the check.
    ///
    /// A rejected caller gets a tool error (`is_error = true`) and the
    /// operation is never called. Otherwise the operation's result is
    /// returned unchanged.
    pub async fn invoke<F, Fut>(
        &self,
        ctx: &AuthContext,
        tool_name: &str,
        operation: F,
    ) -> Result<CallToolResult, McpError>
    where
        F: FnOnce(AuthContext) -> Fut,
        Fut: Future<Output = Result<CallToolResult, McpError>>,
    {
        info!(
            tool = %tool_name,
            transport = if ctx.is_http() { "http" } else { "stdio" },
            "[Guard] Tool invocation started"
        );

        if let Err(reason) = self.check(ctx) {
            warn!(tool = %tool_name, reason = %reason, "[Guard] Authentication required");
            return Ok(CallToolResult::error(vec![Content::text(format!(
                "Authentication required: {}",
                reason
            ))]));
        }

        let result = operation(ctx.clone()).await;

        let succeeded = matches!(&result, Ok(r) if r.is_error != Some(true));
        match (succeeded, ctx.identity()) {
            (true, Some(identity)) => info!(
                tool = %tool_name,
                subject = %identity.subject_id,
                name = %identity.display_name,
                role = %identity.role,
                "[Guard] Tool invocation succeeded"
            ),
            (true, None) => info!(tool = %tool_name, "[Guard] Tool invocation succeeded"),
            (false, Some(identity)) => warn!(
                tool = %tool_name,
                subject = %identity.subject_id,
                name = %identity.display_name,
                role = %identity.role,
                "[Guard] Tool invocation failed"
            ),
            (false, None) => warn!(tool = %tool_name, "[Guard] Tool invocation failed"),
        }

        result
    }
}
