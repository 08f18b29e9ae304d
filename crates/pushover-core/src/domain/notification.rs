//! Notification entity
//!
//! A `NotificationRequest` is what a caller asks for (CLI flags or MCP tool
//! arguments). Resolving it against the configured `PushoverSettings` yields a
//! validated `Notification` ready to hand to a provider client.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::PushoverSettings;

/// Maximum message length accepted by the provider (in characters)
pub const MAX_MESSAGE_CHARS: usize = 1024;

/// Maximum title length accepted by the provider (in characters)
pub const MAX_TITLE_CHARS: usize = 250;

/// Default sound when none is configured
pub const DEFAULT_SOUND: &str = "vibrate";

/// Default expiry for emergency notifications (seconds)
pub const DEFAULT_EXPIRE_SECS: u32 = 180;

/// Retry interval for emergency notifications (seconds, provider minimum is 30)
pub const DEFAULT_RETRY_SECS: u32 = 60;

/// Errors raised while validating a notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("message is required")]
    EmptyMessage,

    #[error("message too long ({length} characters, max {max})")]
    MessageTooLong { length: usize, max: usize },

    #[error("title too long ({length} characters, max {max})")]
    TitleTooLong { length: usize, max: usize },

    #[error("invalid priority value: {0}")]
    InvalidPriority(String),

    #[error("priority must be between -2 and 2, got {0}")]
    PriorityOutOfRange(i64),

    #[error("expire must be > 0 for emergency priority messages")]
    EmergencyWithoutExpire,
}

/// Delivery priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Lowest,
    #[default]
    Low,
    Normal,
    High,
    Emergency,
}

impl Priority {
    /// Numeric value used on the wire
    pub fn value(self) -> i8 {
        match self {
            Priority::Lowest => -2,
            Priority::Low => -1,
            Priority::Normal => 0,
            Priority::High => 1,
            Priority::Emergency => 2,
        }
    }

    pub fn is_emergency(self) -> bool {
        matches!(self, Priority::Emergency)
    }
}

impl TryFrom<i64> for Priority {
    type Error = NotificationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Priority::Lowest),
            -1 => Ok(Priority::Low),
            0 => Ok(Priority::Normal),
            1 => Ok(Priority::High),
            2 => Ok(Priority::Emergency),
            other => Err(NotificationError::PriorityOutOfRange(other)),
        }
    }
}

impl FromStr for Priority {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| NotificationError::InvalidPriority(s.to_string()))?;
        Priority::try_from(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Caller-supplied notification parameters.
///
/// Every optional field falls back to the configured default when unset
/// or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRequest {
    pub message: String,
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub sound: Option<String>,
    pub device: Option<String>,
    pub expire_secs: Option<u32>,
}

impl NotificationRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_expire(mut self, expire_secs: u32) -> Self {
        self.expire_secs = Some(expire_secs);
        self
    }
}

/// A validated notification, ready to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub title: Option<String>,
    pub priority: Priority,
    pub sound: String,
    pub device: Option<String>,
    pub expire_secs: u32,
    pub retry_secs: u32,
    /// Unix timestamp shown as the message time on the device
    pub timestamp: i64,
}

impl Notification {
    /// Resolve a request against configured defaults and validate it.
    pub fn from_request(
        request: NotificationRequest,
        defaults: &PushoverSettings,
    ) -> Result<Self, NotificationError> {
        if request.message.trim().is_empty() {
            return Err(NotificationError::EmptyMessage);
        }

        let length = request.message.chars().count();
        if length > MAX_MESSAGE_CHARS {
            return Err(NotificationError::MessageTooLong {
                length,
                max: MAX_MESSAGE_CHARS,
            });
        }

        let title = non_empty(request.title).or_else(|| defaults.default_title.clone());
        if let Some(title) = &title {
            let length = title.chars().count();
            if length > MAX_TITLE_CHARS {
                return Err(NotificationError::TitleTooLong {
                    length,
                    max: MAX_TITLE_CHARS,
                });
            }
        }

        let priority = request.priority.unwrap_or(defaults.priority);
        let expire_secs = request.expire_secs.unwrap_or(defaults.expire_secs);
        if priority.is_emergency() && expire_secs == 0 {
            return Err(NotificationError::EmergencyWithoutExpire);
        }

        Ok(Self {
            message: request.message,
            title,
            priority,
            sound: non_empty(request.sound).unwrap_or_else(|| defaults.sound.clone()),
            device: non_empty(request.device).or_else(|| defaults.device_name.clone()),
            expire_secs,
            retry_secs: DEFAULT_RETRY_SECS,
            timestamp: chrono::Utc::now().timestamp(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
