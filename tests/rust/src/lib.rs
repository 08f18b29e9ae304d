//! Shared test utilities and fixtures for Pushover MCP integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pushover_core::{
    HttpConfig, Notification, NotificationClient, Priority, ProviderError, PushoverSettings,
    SendReceipt,
};
use pushover_gateway::{AuthMiddleware, HttpServer, PushoverMcpHandler};

pub use pushover_core::McpConfig;

/// Secret used by every test that enforces authentication
pub const TEST_SECRET: &str = "integration-test-secret";

/// Provider settings that never reach the real API
pub fn test_settings() -> PushoverSettings {
    PushoverSettings {
        app_key: "test-app-key".to_string(),
        recipient_key: "test-recipient-key".to_string(),
        device_name: None,
        default_title: None,
        priority: Priority::Low,
        sound: "vibrate".to_string(),
        expire_secs: 180,
    }
}

/// Lookup function over a fixed set of variables, for `McpConfig::from_lookup`
pub fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| {
        vars.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

/// Notification client double recording every delivered notification
#[derive(Default)]
pub struct RecordingClient {
    sent: Mutex<Vec<Notification>>,
    receipt: Option<String>,
    failure: Option<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with a receipt, as the provider does for emergency messages
    pub fn with_receipt(receipt: &str) -> Self {
        Self {
            receipt: Some(receipt.to_string()),
            ..Self::default()
        }
    }

    /// Reject every notification with the given provider error
    pub fn failing(error: &str) -> Self {
        Self {
            failure: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationClient for RecordingClient {
    async fn send(&self, notification: &Notification) -> Result<SendReceipt, ProviderError> {
        if let Some(error) = &self.failure {
            return Err(ProviderError::Rejected {
                status: 400,
                errors: vec![error.clone()],
            });
        }

        self.sent.lock().unwrap().push(notification.clone());
        Ok(SendReceipt {
            request_id: format!("req-{}", self.sent_count()),
            receipt: self.receipt.clone(),
        })
    }
}

/// Handler wired to a recording client
pub fn test_handler(auth: AuthMiddleware, client: Arc<RecordingClient>) -> PushoverMcpHandler {
    PushoverMcpHandler::new(Arc::new(test_settings()), client, Arc::new(auth))
}

/// HTTP settings for tests: defaults, MCP endpoint at `/mcp`
pub fn test_http_config() -> HttpConfig {
    HttpConfig {
        address: "127.0.0.1:0".to_string(),
        heartbeat: std::time::Duration::from_secs(15),
        ..HttpConfig::default()
    }
}

/// Server harness: a real HTTP server on a random local port
pub mod server {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    pub struct TestServer {
        pub base_url: String,
        pub ct: CancellationToken,
    }

    impl TestServer {
        pub fn mcp_url(&self) -> String {
            format!("{}/mcp", self.base_url)
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            self.ct.cancel();
        }
    }

    pub async fn start(config: HttpConfig, handler: PushoverMcpHandler) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to random port");
        let addr = listener.local_addr().unwrap();
        let ct = CancellationToken::new();

        let server = HttpServer::new(config, handler);
        let server_ct = ct.clone();
        tokio::spawn(async move {
            server.serve(listener, server_ct).await.unwrap();
        });

        // Give server a moment to start
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        TestServer {
            base_url: format!("http://127.0.0.1:{}", addr.port()),
            ct,
        }
    }
}

/// MCP client helpers
pub mod client {
    use rmcp::{
        model::*,
        service::RunningService,
        transport::{
            streamable_http_client::StreamableHttpClientTransportConfig,
            StreamableHttpClientTransport,
        },
        RoleClient, ServiceExt,
    };

    pub type TestClient = RunningService<RoleClient, ClientInfo>;

    fn client_info() -> ClientInfo {
        ClientInfo {
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "test-client".to_string(),
                version: "1.0.0".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Connect, sending `authorization` verbatim as the Authorization header
    pub async fn connect(url: &str, authorization: Option<&str>) -> TestClient {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(value) = authorization {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(value).unwrap(),
            );
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap();

        let transport = StreamableHttpClientTransport::with_client(
            http,
            StreamableHttpClientTransportConfig::with_uri(url),
        );
        client_info()
            .serve(transport)
            .await
            .expect("client should connect")
    }

    pub async fn connect_with_token(url: &str, token: &str) -> TestClient {
        connect(url, Some(&format!("Bearer {}", token))).await
    }

    pub async fn send_notification(
        client: &TestClient,
        arguments: serde_json::Value,
    ) -> CallToolResult {
        client
            .call_tool(CallToolRequestParams {
                name: "send_notification".into(),
                arguments: arguments.as_object().cloned(),
                task: None,
                meta: None,
            })
            .await
            .expect("call_tool should return a result")
    }

    /// Concatenated text content of a tool result
    pub fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
