//! Push channel: the broadcast log stream.
//!
//! [`LogStreamClient`] owns the WebSocket connection and its state
//! machine; [`ListenerRegistry`] fans each parsed [`LogRecord`] out to the
//! registered callbacks in registration order.

pub mod connection;
pub mod listeners;
pub mod log_stream;
pub mod messages;
pub mod reconnect;

pub use listeners::{ListenerId, ListenerRegistry, LogListener};
pub use log_stream::{ConnectionState, LogStreamClient};
pub use messages::{LogFrame, LogRecord};
pub use reconnect::ReconnectPolicy;
