//! `pushover mcp`: token tooling or an MCP server on the chosen transport

use std::sync::Arc;

use anyhow::{Context, Result};
use pushover_core::{McpConfig, PushoverClient};
use pushover_gateway::{serve_stdio, AuthMiddleware, HttpServer, PushoverMcpHandler};
use tracing::info;

use super::token;
use crate::{McpArgs, Transport};

pub async fn run(args: McpArgs) -> Result<()> {
    if args.generate_token {
        return token::generate(
            &args.token_user_id,
            &args.token_username,
            &args.token_role,
            args.token_expiration,
        );
    }

    if let Some(token) = args.token_info.as_deref() {
        return token::info(token);
    }

    let config = McpConfig::from_env(args.auth_enabled).context("failed to load configuration")?;

    let client = PushoverClient::new(&config.pushover).context("failed to create Pushover client")?;
    let auth = AuthMiddleware::from_config(&config.auth)?;
    let handler = PushoverMcpHandler::new(
        Arc::new(config.pushover),
        Arc::new(client),
        Arc::new(auth),
    );

    match args.transport {
        Transport::Stdio => serve_stdio(handler).await,
        Transport::Http => {
            info!(
                "Starting MCP server with HTTP transport on {}{}",
                config.http.address, config.http.path
            );
            HttpServer::new(config.http, handler).run().await
        }
    }
}
