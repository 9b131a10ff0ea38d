//! Broadcast channel for user-visible notifications.
//!
//! [`Notifier`] wraps a [`tokio::sync::broadcast`] channel. The poller
//! publishes one error notification per failed tick and the dispatcher
//! publishes the outcome of every action; the presentation layer
//! subscribes and renders them as transient messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{ErrorKind, SyncError};

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// An action completed.
    Success,
    /// Something failed; the snapshot is unchanged.
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Unique notification id.
    pub id: Uuid,
    /// Success or error.
    pub severity: Severity,
    /// Human-readable text.
    pub message: String,
    /// Failure category, for error notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Publication time.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Builds a success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity: Severity::Success,
            message: message.into(),
            kind: None,
            timestamp: Utc::now(),
        }
    }

    /// Builds an error notification from a [`SyncError`].
    #[must_use]
    pub fn failure(err: &SyncError) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity: Severity::Error,
            message: err.user_message(),
            kind: Some(err.kind()),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus for [`Notification`]s.
///
/// When the ring buffer is full, the oldest notifications are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Creates a new `Notifier` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers. With no receivers the notification
    /// is silently dropped.
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    /// Publishes a success notification.
    pub fn success(&self, message: impl Into<String>) -> usize {
        self.publish(Notification::success(message))
    }

    /// Publishes an error notification for `err`.
    pub fn failure(&self, err: &SyncError) -> usize {
        self.publish(Notification::failure(err))
    }

    /// Creates a receiver for all future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
