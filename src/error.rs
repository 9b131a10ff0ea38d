//! Client error types with failure-category classification.
//!
//! [`SyncError`] is the central error type for the synchronization core.
//! Each variant belongs to one [`ErrorKind`] and carries a numeric code, so
//! the presentation layer can decide how to surface it without matching on
//! every variant.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::EventId;

/// Failure category as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed local input, rejected before any network call.
    ValidationFailure,
    /// The request could not complete.
    NetworkFailure,
    /// The Remote Service answered with a non-success status.
    ServerRejection,
    /// A push-channel record could not be parsed.
    ParseFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ValidationFailure => "validation failure",
            Self::NetworkFailure => "network failure",
            Self::ServerRejection => "server rejection",
            Self::ParseFailure => "parse failure",
        };
        f.write_str(label)
    }
}

/// Per-field validation messages, keyed by wire field name.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Client-side error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category          |
/// |-----------|-------------------|
/// | 1000–1999 | Validation        |
/// | 2000–2999 | Network           |
/// | 3000–3999 | Server rejection  |
/// | 4000–4999 | Push-channel parse|
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Ticket count below one.
    #[error("ticket count must be at least 1 (got {0})")]
    InvalidTicketCount(u32),

    /// The event is not present in the current snapshot.
    #[error("event {0} is not in the current snapshot")]
    UnknownEvent(EventId),

    /// One or more event fields failed validation.
    #[error("invalid event fields: {}", join_fields(.0))]
    InvalidDraft(FieldErrors),

    /// Transport-level failure: connect error, timeout, broken socket.
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered 2xx with a body that could not be decoded.
    #[error("malformed response payload: {0}")]
    MalformedResponse(String),

    /// Non-success response from the Remote Service.
    #[error("{message}")]
    ServerRejection {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or a generic fallback.
        message: String,
    },

    /// Malformed push-channel record.
    #[error("malformed log record: {0}")]
    Parse(String),
}

impl SyncError {
    /// Returns the failure category for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTicketCount(_) | Self::UnknownEvent(_) | Self::InvalidDraft(_) => {
                ErrorKind::ValidationFailure
            }
            Self::Network(_) | Self::MalformedResponse(_) => ErrorKind::NetworkFailure,
            Self::ServerRejection { .. } => ErrorKind::ServerRejection,
            Self::Parse(_) => ErrorKind::ParseFailure,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidTicketCount(_) => 1001,
            Self::UnknownEvent(_) => 1002,
            Self::InvalidDraft(_) => 1003,
            Self::Network(_) => 2001,
            Self::MalformedResponse(_) => 2002,
            Self::ServerRejection { .. } => 3000,
            Self::Parse(_) => 4001,
        }
    }

    /// Returns `true` when a later poll or a manual retry may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::NetworkFailure)
    }

    /// Text suitable for a user-visible notification.
    ///
    /// Server rejections show the server's message verbatim; everything
    /// else uses the error's display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ServerRejection { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SyncError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Network(err.to_string())
    }
}

fn join_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}
