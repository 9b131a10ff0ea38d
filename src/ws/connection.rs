//! Read loop for a single push-channel connection.
//!
//! Parses every inbound text frame into a [`LogRecord`] and hands it to
//! the listener registry, until the server closes the socket, the
//! transport fails, or the owner asks for shutdown.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::listeners::ListenerRegistry;
use super::messages::LogRecord;

/// Client-side WebSocket stream type.
pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connection loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CloseReason {
    /// The owner requested shutdown (or dropped the shutdown handle).
    Requested,
    /// The server sent a close frame or the stream ended.
    Remote,
    /// The transport failed.
    Failed(String),
}

/// Runs the read loop for one connection.
///
/// A malformed frame is logged and dropped; it never reaches listeners and
/// never stops the loop.
pub(crate) async fn run_connection(
    stream: WsStream,
    listeners: &ListenerRegistry,
    shutdown: &mut oneshot::Receiver<()>,
) -> CloseReason {
    let (mut ws_tx, mut ws_rx) = stream.split();

    loop {
        tokio::select! {
            // Owner asked to disconnect
            _ = &mut *shutdown => {
                if let Err(err) = ws_tx.send(Message::Close(None)).await {
                    tracing::debug!(error = %err, "close frame not sent");
                }
                let _ = ws_tx.close().await;
                return CloseReason::Requested;
            }
            // Frame from the server
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => dispatch_frame(text.as_str(), listeners),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => dispatch_frame(text, listeners),
                        Err(err) => {
                            tracing::warn!(error = %err, "dropping non-UTF-8 binary frame");
                        }
                    },
                    Some(Ok(Message::Close(close))) => {
                        tracing::debug!(?close, "push channel closed by server");
                        return CloseReason::Remote;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "push channel transport error");
                        return CloseReason::Failed(err.to_string());
                    }
                    None => return CloseReason::Remote,
                }
            }
        }
    }
}

/// Parses one frame and delivers it, or logs and drops it.
fn dispatch_frame(text: &str, listeners: &ListenerRegistry) {
    match LogRecord::parse(text) {
        Ok(record) => {
            let delivered = listeners.deliver(&record);
            tracing::trace!(delivered, "log record delivered");
        }
        Err(err) => {
            tracing::warn!(error = %err, frame_len = text.len(), "dropping malformed log frame");
        }
    }
}
