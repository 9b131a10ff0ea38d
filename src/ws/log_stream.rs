//! Push-channel client with an explicit connection state machine.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──handshake ok──▶ Connected
//!      ▲                          │                            │
//!      └────── handshake failed ──┘         disconnect() / server close
//!      ▲                                                       │
//!      └───────────────────── Disconnecting ◀─────────────────┘
//! ```
//!
//! Records are delivered independently of polling. There is no replay
//! buffer: a listener only sees records that arrive after it registered.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::connection::{CloseReason, WsStream, run_connection};
use super::listeners::{ListenerId, ListenerRegistry, LogListener};
use super::messages::LogRecord;
use super::reconnect::ReconnectPolicy;
use crate::error::SyncError;

/// Lifecycle of the push-channel connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Receiving records.
    Connected,
    /// Close requested, waiting for the read loop to finish.
    Disconnecting,
}

#[derive(Debug)]
struct ConnectionHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct Link {
    state: ConnectionState,
    generation: u64,
    handle: Option<ConnectionHandle>,
}

#[derive(Debug)]
struct StreamShared {
    url: String,
    policy: ReconnectPolicy,
    listeners: ListenerRegistry,
    link: Mutex<Link>,
}

impl StreamShared {
    fn link(&self) -> MutexGuard<'_, Link> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the given connection generation to `state`, unless a newer
    /// connection replaced it or a disconnect is in progress.
    fn transition(&self, generation: u64, state: ConnectionState) -> bool {
        let mut link = self.link();
        let live = matches!(
            link.state,
            ConnectionState::Connected | ConnectionState::Connecting
        );
        if link.generation != generation || !live {
            return false;
        }
        link.state = state;
        if state == ConnectionState::Disconnected {
            link.handle = None;
        }
        true
    }
}

/// Client for the broadcast log channel.
///
/// Cheap to clone; clones share the connection and the listener list.
/// Dropping the last clone closes an open connection.
#[derive(Debug, Clone)]
pub struct LogStreamClient {
    shared: Arc<StreamShared>,
}

impl LogStreamClient {
    /// Creates a disconnected client for `url`
    /// (e.g. `ws://localhost:8080/ticketUpdates`).
    #[must_use]
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            shared: Arc::new(StreamShared {
                url: url.into(),
                policy,
                listeners: ListenerRegistry::new(),
                link: Mutex::new(Link::default()),
            }),
        }
    }

    /// Endpoint this client connects to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.link().state
    }

    /// Opens the push channel.
    ///
    /// Does nothing if the client is already `Connecting` or `Connected`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] if the handshake fails; the client is
    /// left `Disconnected`.
    pub async fn connect(&self) -> Result<(), SyncError> {
        {
            let mut link = self.shared.link();
            match link.state {
                ConnectionState::Connecting | ConnectionState::Connected => {
                    tracing::debug!(state = ?link.state, "log stream already connected");
                    return Ok(());
                }
                ConnectionState::Disconnected | ConnectionState::Disconnecting => {
                    link.state = ConnectionState::Connecting;
                }
            }
        }

        let stream = match handshake(&self.shared.url).await {
            Ok(stream) => stream,
            Err(err) => {
                let mut link = self.shared.link();
                if link.state == ConnectionState::Connecting {
                    link.state = ConnectionState::Disconnected;
                }
                tracing::warn!(url = %self.shared.url, error = %err, "log stream handshake failed");
                return Err(err);
            }
        };

        let mut link = self.shared.link();
        if link.state != ConnectionState::Connecting {
            tracing::debug!("connect superseded by disconnect; dropping new stream");
            return Ok(());
        }
        link.generation = link.generation.wrapping_add(1);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let supervisor = Supervisor::new(&self.shared, link.generation);
        let task = tokio::spawn(supervisor.run(stream, shutdown_rx));
        link.handle = Some(ConnectionHandle { shutdown, task });
        link.state = ConnectionState::Connected;
        tracing::info!(url = %self.shared.url, "log stream connected");
        Ok(())
    }

    /// Closes the push channel and waits for the read loop to finish.
    ///
    /// Listener registrations are kept.
    pub async fn disconnect(&self) {
        let handle = {
            let mut link = self.shared.link();
            if link.state == ConnectionState::Disconnected {
                return;
            }
            link.state = ConnectionState::Disconnecting;
            link.handle.take()
        };

        if let Some(handle) = handle {
            let _ = handle.shutdown.send(());
            if let Err(err) = handle.task.await {
                tracing::warn!(error = %err, "log stream task ended abnormally");
            }
        }

        let mut link = self.shared.link();
        if link.state == ConnectionState::Disconnecting {
            link.state = ConnectionState::Disconnected;
        }
        tracing::info!(url = %self.shared.url, "log stream disconnected");
    }

    /// Registers a listener; duplicates are allowed and delivered twice.
    pub fn add_listener(&self, listener: LogListener) -> ListenerId {
        self.shared.listeners.add(listener)
    }

    /// Registers a closure as a listener.
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&LogRecord) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(callback))
    }

    /// Removes one registration by handle.
    pub fn remove(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    /// Removes every registration of `listener`.
    pub fn remove_listener(&self, listener: &LogListener) -> usize {
        self.shared.listeners.remove_listener(listener)
    }

    /// Number of listener registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }
}

/// Performs the WebSocket handshake.
async fn handshake(url: &str) -> Result<WsStream, SyncError> {
    let (stream, response) = tokio_tungstenite::connect_async(url).await?;
    tracing::debug!(status = response.status().as_u16(), "push channel handshake complete");
    Ok(stream)
}

/// Connection task state. The shared client state is held weakly, so
/// dropping the last [`LogStreamClient`] drops the shutdown sender and the
/// task closes its socket and exits.
struct Supervisor {
    shared: Weak<StreamShared>,
    url: String,
    policy: ReconnectPolicy,
    listeners: ListenerRegistry,
    generation: u64,
}

impl Supervisor {
    fn new(shared: &Arc<StreamShared>, generation: u64) -> Self {
        Self {
            shared: Arc::downgrade(shared),
            url: shared.url.clone(),
            policy: shared.policy.clone(),
            listeners: shared.listeners.clone(),
            generation,
        }
    }

    /// Returns `false` once every client handle is gone.
    fn transition(&self, state: ConnectionState) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.transition(self.generation, state))
    }

    /// Owns a connection until shutdown; handles unexpected closes
    /// according to the reconnect policy.
    async fn run(self, mut stream: WsStream, mut shutdown: oneshot::Receiver<()>) {
        loop {
            let reason = run_connection(stream, &self.listeners, &mut shutdown).await;
            if reason == CloseReason::Requested {
                return;
            }
            tracing::warn!(?reason, url = %self.url, "log stream closed unexpectedly");

            if !self.policy.is_enabled() || !self.transition(ConnectionState::Connecting) {
                self.transition(ConnectionState::Disconnected);
                return;
            }

            match self.reconnect(&mut shutdown).await {
                Some(next) => {
                    if !self.transition(ConnectionState::Connected) {
                        return;
                    }
                    stream = next;
                }
                None => {
                    self.transition(ConnectionState::Disconnected);
                    return;
                }
            }
        }
    }

    /// Retries the handshake with backoff. Returns `None` when retries are
    /// exhausted or shutdown was requested.
    async fn reconnect(&self, shutdown: &mut oneshot::Receiver<()>) -> Option<WsStream> {
        for attempt in 0..self.policy.max_retries {
            let delay = self.policy.delay_for_attempt(attempt);
            tokio::select! {
                _ = &mut *shutdown => return None,
                () = tokio::time::sleep(delay) => {}
            }
            tokio::select! {
                _ = &mut *shutdown => return None,
                result = handshake(&self.url) => match result {
                    Ok(stream) => {
                        tracing::info!(attempt, url = %self.url, "log stream reconnected");
                        return Some(stream);
                    }
                    Err(err) => {
                        tracing::warn!(attempt, error = %err, "log stream reconnect attempt failed");
                    }
                }
            }
        }
        tracing::warn!(retries = self.policy.max_retries, "giving up on log stream reconnection");
        None
    }
}
