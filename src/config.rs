//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset or unparseable numeric values
//! fall back to their defaults; malformed URLs and view kinds are errors.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::service::ViewKind;
use crate::ws::ReconnectPolicy;

/// Default Remote Service base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Default push-channel endpoint.
pub const DEFAULT_LOG_STREAM_URL: &str = "ws://localhost:8080/ticketUpdates";

/// Output format of the monitor binary's log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Unrecognised log format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format '{0}' (expected 'text' or 'json')")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ParseLogFormatError(s.to_string())),
        }
    }
}

/// Top-level synchronization configuration.
///
/// Loaded once at startup via [`SyncConfig::from_env`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Remote Service base URL (e.g. `http://localhost:8080/api/v1`).
    pub api_base_url: String,

    /// Push-channel WebSocket URL.
    pub log_stream_url: String,

    /// Poll cadence for operator views.
    pub operator_poll_interval: Duration,

    /// Poll cadence for the customer browsing view.
    pub browse_poll_interval: Duration,

    /// Per-request timeout for REST calls.
    pub request_timeout: Duration,

    /// Capacity of the notification broadcast channel.
    pub notification_capacity: usize,

    /// Push-channel reconnection policy. Disabled by default.
    pub reconnect: ReconnectPolicy,

    /// Name attached to purchases, if any.
    pub buyer_name: Option<String>,

    /// View opened by the monitor binary.
    pub view_kind: ViewKind,

    /// Log line format of the monitor binary.
    pub log_format: LogFormat,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_stream_url: DEFAULT_LOG_STREAM_URL.to_string(),
            operator_poll_interval: Duration::from_millis(1000),
            browse_poll_interval: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(10),
            notification_capacity: 256,
            reconnect: ReconnectPolicy::default(),
            buyer_name: None,
            view_kind: ViewKind::Operator,
            log_format: LogFormat::Text,
        }
    }
}

impl SyncConfig {
    /// Defaults pointed at a service on `host` (e.g. `127.0.0.1:8080`).
    #[must_use]
    pub fn for_host(host: &str) -> Self {
        Self {
            api_base_url: format!("http://{host}/api/v1"),
            log_stream_url: format!("ws://{host}/ticketUpdates"),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `API_BASE_URL` or `LOG_STREAM_URL` is not a
    /// valid URL, `VIEW_KIND` is neither `operator` nor `browsing`, or
    /// `LOG_FORMAT` is neither `text` nor `json`.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let api_base_url = std::env::var("API_BASE_URL").unwrap_or(defaults.api_base_url);
        Url::parse(&api_base_url)?;

        let log_stream_url = std::env::var("LOG_STREAM_URL").unwrap_or(defaults.log_stream_url);
        Url::parse(&log_stream_url)?;

        let operator_poll_interval =
            Duration::from_millis(parse_env("OPERATOR_POLL_INTERVAL_MS", 1000));
        let browse_poll_interval =
            Duration::from_millis(parse_env("BROWSE_POLL_INTERVAL_MS", 5000));
        let request_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 10));
        let notification_capacity = parse_env("NOTIFICATION_CAPACITY", 256);

        let reconnect = ReconnectPolicy::bounded(
            parse_env("LOG_STREAM_RECONNECT_MAX_RETRIES", 0),
            Duration::from_millis(parse_env("LOG_STREAM_RECONNECT_INITIAL_DELAY_MS", 500)),
            Duration::from_millis(parse_env("LOG_STREAM_RECONNECT_MAX_DELAY_MS", 10_000)),
        );

        let buyer_name = std::env::var("BUYER_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty());

        let view_kind = match std::env::var("VIEW_KIND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.view_kind,
        };

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.log_format,
        };

        Ok(Self {
            api_base_url,
            log_stream_url,
            operator_poll_interval,
            browse_poll_interval,
            request_timeout,
            notification_capacity,
            reconnect,
            buyer_name,
            view_kind,
            log_format,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
