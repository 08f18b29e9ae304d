//! Runtime configuration
//!
//! Built once at startup from environment variables and passed by reference
//! into every component. Values are read through a lookup function so tests
//! can supply their own environment without touching the process.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::domain::{Priority, DEFAULT_EXPIRE_SECS, DEFAULT_SOUND};

pub const DEFAULT_HTTP_ADDRESS: &str = ":8080";
pub const DEFAULT_HTTP_PATH: &str = "/mcp";
pub const DEFAULT_HTTP_HEARTBEAT: Duration = Duration::from_secs(30);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors. Any of these refuses startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("PUSHOVER_PRIORITY must be between -2 and 2, got {0}")]
    PriorityOutOfRange(i64),

    #[error("PUSHOVER_AUTH_SECRET_KEY is required when authentication is enabled")]
    MissingAuthSecret,
}

/// Full MCP server configuration
#[derive(Debug, Clone)]
pub struct McpConfig {
    pub http: HttpConfig,
    pub auth: AuthConfig,
    pub pushover: PushoverSettings,
}

impl McpConfig {
    /// Load from the process environment.
    ///
    /// `auth_enabled_flag` comes from the command line and wins over
    /// `PUSHOVER_AUTH_ENABLED` when set.
    pub fn from_env(auth_enabled_flag: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup, auth_enabled_flag)
    }

    pub fn from_lookup<F>(lookup: F, auth_enabled_flag: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            http: HttpConfig::from_lookup(&lookup),
            auth: AuthConfig::from_lookup(&lookup, auth_enabled_flag),
            pushover: PushoverSettings::from_lookup(&lookup)?,
        };

        config.auth.validate()?;

        debug!(
            address = %config.http.address,
            path = %config.http.path,
            auth_enabled = config.auth.enabled,
            "[Config] Loaded MCP configuration"
        );

        Ok(config)
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Bind address, Go-style `:8080` or `host:port`
    pub address: String,
    /// Path the MCP endpoint is mounted at
    pub path: String,
    /// Disable MCP session management
    pub stateless: bool,
    /// SSE keep-alive interval (zero disables)
    pub heartbeat: Duration,
    /// Timeout for plain JSON endpoints
    pub timeout: Duration,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
    /// Expose `POST /generate-token` (only honoured when auth is enabled)
    pub token_endpoint: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_HTTP_ADDRESS.to_string(),
            path: DEFAULT_HTTP_PATH.to_string(),
            stateless: false,
            heartbeat: DEFAULT_HTTP_HEARTBEAT,
            timeout: DEFAULT_HTTP_TIMEOUT,
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
            token_endpoint: false,
        }
    }
}

impl HttpConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            address: string_or(lookup, "PUSHOVER_HTTP_ADDRESS", defaults.address),
            path: normalize_path(&string_or(lookup, "PUSHOVER_HTTP_PATH", defaults.path)),
            stateless: bool_or(lookup, "PUSHOVER_HTTP_STATELESS", defaults.stateless),
            heartbeat: duration_or(lookup, "PUSHOVER_HTTP_HEARTBEAT", defaults.heartbeat),
            timeout: duration_or(lookup, "PUSHOVER_HTTP_TIMEOUT", defaults.timeout),
            cors_enabled: bool_or(lookup, "PUSHOVER_HTTP_CORS_ENABLED", defaults.cors_enabled),
            cors_origins: list_or(lookup, "PUSHOVER_HTTP_CORS_ORIGINS", defaults.cors_origins),
            token_endpoint: bool_or(
                lookup,
                "PUSHOVER_HTTP_TOKEN_ENDPOINT",
                defaults.token_endpoint,
            ),
        }
    }

    /// Address suitable for `TcpListener::bind`
    pub fn listen_address(&self) -> String {
        if self.address.starts_with(':') {
            format!("0.0.0.0{}", self.address)
        } else {
            self.address.clone()
        }
    }
}

/// Authentication settings
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub enabled: bool,
    pub secret_key: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl AuthConfig {
    pub fn from_lookup<F>(lookup: &F, auth_enabled_flag: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            enabled: auth_enabled_flag || bool_or(lookup, "PUSHOVER_AUTH_ENABLED", false),
            secret_key: string_or(lookup, "PUSHOVER_AUTH_SECRET_KEY", String::new()),
        }
    }

    /// Token tooling only needs the secret, not the provider keys.
    pub fn from_env(auth_enabled_flag: bool) -> Self {
        Self::from_lookup(&env_lookup, auth_enabled_flag)
    }

    /// An enabled configuration must carry a secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.secret_key.is_empty() {
            return Err(ConfigError::MissingAuthSecret);
        }
        Ok(())
    }
}

/// Provider credentials and notification defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushoverSettings {
    pub app_key: String,
    pub recipient_key: String,
    pub device_name: Option<String>,
    pub default_title: Option<String>,
    pub priority: Priority,
    pub sound: String,
    pub expire_secs: u32,
}

impl PushoverSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_key = non_empty(lookup, "APP_KEY").ok_or(ConfigError::Missing("APP_KEY"))?;
        let recipient_key =
            non_empty(lookup, "RECIPIENT_KEY").ok_or(ConfigError::Missing("RECIPIENT_KEY"))?;

        // Unparsable values fall back to the default, out-of-range values are rejected
        let raw_priority = non_empty(lookup, "PUSHOVER_PRIORITY")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(Priority::default().value() as i64);
        let priority = Priority::try_from(raw_priority)
            .map_err(|_| ConfigError::PriorityOutOfRange(raw_priority))?;

        let expire_secs = non_empty(lookup, "PUSHOVER_EXPIRE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|e| *e != 0)
            .unwrap_or(DEFAULT_EXPIRE_SECS);

        Ok(Self {
            app_key,
            recipient_key,
            device_name: non_empty(lookup, "DEVICE_NAME"),
            default_title: non_empty(lookup, "DEFAULT_TITLE"),
            priority,
            sound: string_or(lookup, "PUSHOVER_SOUND", DEFAULT_SOUND.to_string()),
            expire_secs,
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty())
}

fn string_or<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).unwrap_or(default)
}

fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn duration_or<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .and_then(|v| parse_duration(&v))
        .unwrap_or(default)
}

fn list_or<F>(lookup: &F, key: &str, default: Vec<String>) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let items: Vec<String> = non_empty(lookup, key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        default
    } else {
        items
    }
}

/// Accepts `1/t/true/0/f/false` in any case
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

/// Parse `<n>ms`, `<n>s`, `<n>m` or `<n>h`
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let split = value.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount.parse().ok()?;

    match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(amount.checked_mul(3600)?)),
        _ => None,
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
