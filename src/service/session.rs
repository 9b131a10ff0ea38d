//! View sessions: tie poller and log-stream lifetimes to an open view.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::ws::LogStreamClient;

use super::poller::StatePoller;

/// Which screen is open; selects the poll cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Admin and vendor dashboards.
    #[default]
    Operator,
    /// Customer event browsing.
    Browsing,
}

impl ViewKind {
    /// Poll cadence for this view.
    #[must_use]
    pub const fn poll_interval(self, config: &SyncConfig) -> Duration {
        match self {
            Self::Operator => config.operator_poll_interval,
            Self::Browsing => config.browse_poll_interval,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Browsing => "browsing",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised view name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view kind '{0}' (expected 'operator' or 'browsing')")]
pub struct ParseViewKindError(String);

impl FromStr for ViewKind {
    type Err = ParseViewKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" | "admin" | "vendor" => Ok(Self::Operator),
            "browsing" | "customer" => Ok(Self::Browsing),
            _ => Err(ParseViewKindError(s.to_string())),
        }
    }
}

/// An open view.
///
/// Opening starts the poller at the view's cadence. Closing (or dropping)
/// stops the poller and disconnects the log stream, so no timer outlives
/// the view.
#[derive(Debug)]
pub struct ViewSession {
    kind: ViewKind,
    poller: Arc<StatePoller>,
    log_stream: Option<LogStreamClient>,
    closed: bool,
}

impl ViewSession {
    /// Opens a view and starts polling every `interval`.
    #[must_use]
    pub fn open(kind: ViewKind, poller: Arc<StatePoller>, interval: Duration) -> Self {
        poller.start(interval);
        tracing::info!(view = %kind, ?interval, "view opened");
        Self {
            kind,
            poller,
            log_stream: None,
            closed: false,
        }
    }

    /// The kind of view.
    #[must_use]
    pub const fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Connects the log stream and ties it to this view.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] if the handshake fails.
    pub async fn tail_logs(&mut self, client: LogStreamClient) -> Result<(), SyncError> {
        client.connect().await?;
        self.log_stream = Some(client);
        Ok(())
    }

    /// Closes the view, waiting for the log stream to disconnect.
    pub async fn close(mut self) {
        self.closed = true;
        self.poller.stop();
        if let Some(stream) = self.log_stream.take() {
            stream.disconnect().await;
        }
        tracing::info!(view = %self.kind, "view closed");
    }
}

impl Drop for ViewSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.poller.stop();
        if let Some(stream) = self.log_stream.take()
            && let Ok(runtime) = tokio::runtime::Handle::try_current()
        {
            runtime.spawn(async move { stream.disconnect().await });
        }
        tracing::debug!(view = %self.kind, "view dropped");
    }
}
