//! HTTP client for the Pushover message API.
//!
//! Front-ends depend on the `NotificationClient` trait so tests can swap in a
//! recording double. `PushoverClient` is the production implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::branding;
use crate::config::PushoverSettings;
use crate::domain::Notification;

/// Production API base URL
pub const PUSHOVER_API_URL: &str = "https://api.pushover.net";

/// Errors raised while delivering a notification
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to Pushover failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pushover rejected the message (HTTP {status}): {}", errors.join("; "))]
    Rejected { status: u16, errors: Vec<String> },
}

/// Provider acknowledgement for a delivered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Request identifier assigned by the provider
    pub request_id: String,
    /// Receipt for emergency notifications (used to poll acknowledgement)
    pub receipt: Option<String>,
}

/// Anything able to deliver a notification
#[async_trait]
pub trait NotificationClient: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<SendReceipt, ProviderError>;
}

/// Form body of `POST /1/messages.json`
#[derive(Debug, Serialize)]
struct MessageForm<'a> {
    token: &'a str,
    user: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    priority: i8,
    sound: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<&'a str>,
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expire: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<u32>,
}

/// Response of `POST /1/messages.json`
#[derive(Debug, Deserialize)]
struct MessageResponse {
    status: i64,
    #[serde(default)]
    request: String,
    #[serde(default)]
    receipt: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Client for the Pushover message API
pub struct PushoverClient {
    base_url: String,
    app_key: String,
    recipient_key: String,
    client: reqwest::Client,
}

impl PushoverClient {
    /// Create a client for the production API
    pub fn new(settings: &PushoverSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("{}/{}", branding::SERVICE_NAME, branding::VERSION))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            base_url: PUSHOVER_API_URL.to_string(),
            app_key: settings.app_key.clone(),
            recipient_key: settings.recipient_key.clone(),
            client,
        })
    }

    /// Point the client at another API host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl NotificationClient for PushoverClient {
    async fn send(&self, notification: &Notification) -> Result<SendReceipt, ProviderError> {
        let url = format!("{}/1/messages.json", self.base_url);

        // Expire/retry are only meaningful (and required) for emergency priority
        let (expire, retry) = if notification.priority.is_emergency() {
            (Some(notification.expire_secs), Some(notification.retry_secs))
        } else {
            (None, None)
        };

        let form = MessageForm {
            token: &self.app_key,
            user: &self.recipient_key,
            message: &notification.message,
            title: notification.title.as_deref(),
            priority: notification.priority.value(),
            sound: &notification.sound,
            device: notification.device.as_deref(),
            timestamp: notification.timestamp,
            expire,
            retry,
        };

        debug!(
            priority = %notification.priority,
            device = notification.device.as_deref().unwrap_or("-"),
            "[Pushover] Sending notification"
        );

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();
        let body: MessageResponse = response.json().await?;

        if !status.is_success() || body.status != 1 {
            warn!(status = %status, errors = ?body.errors, "[Pushover] Message rejected");
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                errors: body.errors,
            });
        }

        info!(request = %body.request, "[Pushover] Notification delivered");

        Ok(SendReceipt {
            request_id: body.request,
            receipt: body.receipt,
        })
    }
}
