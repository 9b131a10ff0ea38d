//! Push-channel record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Wire shape of a push-channel frame: `{ "logMessage": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFrame {
    /// The log line.
    pub log_message: String,
}

/// A log line delivered to listeners, stamped with its local arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// The log line.
    pub message: String,
    /// When the frame arrived.
    pub received_at: DateTime<Utc>,
}

impl LogRecord {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Parse`] if the frame is not a JSON object with a
    /// string `logMessage` field.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let frame: LogFrame =
            serde_json::from_str(text).map_err(|e| SyncError::Parse(e.to_string()))?;
        Ok(Self {
            message: frame.log_message,
            received_at: Utc::now(),
        })
    }
}
