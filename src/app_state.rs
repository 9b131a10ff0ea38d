//! Shared client state, wired once at startup.

use std::sync::Arc;

use crate::config::SyncConfig;
use crate::domain::{Notifier, SnapshotStore};
use crate::error::SyncError;
use crate::remote::RemoteClient;
use crate::service::{ActionDispatcher, StatePoller, ViewKind, ViewSession};
use crate::ws::LogStreamClient;

/// Every long-lived component of the synchronization core.
///
/// Cheap to clone; clones share the same store, poller and connection.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration the state was built from.
    pub config: Arc<SyncConfig>,
    /// The event snapshot.
    pub store: SnapshotStore,
    /// Notification bus for user-visible outcomes.
    pub notifier: Notifier,
    /// REST client for the Remote Service.
    pub remote: RemoteClient,
    /// Snapshot refresher.
    pub poller: Arc<StatePoller>,
    /// User action entry point.
    pub dispatcher: ActionDispatcher,
    /// Push-channel client.
    pub log_stream: LogStreamClient,
}

impl AppState {
    /// Builds every component from `config`. Nothing is started yet.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: SyncConfig) -> Result<Self, SyncError> {
        let remote = RemoteClient::new(&config.api_base_url, config.request_timeout)?;
        let store = SnapshotStore::new();
        let notifier = Notifier::new(config.notification_capacity);
        let poller = Arc::new(StatePoller::new(
            remote.clone(),
            store.clone(),
            notifier.clone(),
        ));

        let mut dispatcher = ActionDispatcher::new(
            remote.clone(),
            store.clone(),
            notifier.clone(),
            Arc::clone(&poller),
        );
        if let Some(buyer) = &config.buyer_name {
            dispatcher = dispatcher.with_buyer(buyer.clone());
        }

        let log_stream = LogStreamClient::new(&config.log_stream_url, config.reconnect.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            notifier,
            remote,
            poller,
            dispatcher,
            log_stream,
        })
    }

    /// Opens a view, starting the poller at that view's cadence.
    #[must_use]
    pub fn open_view(&self, kind: ViewKind) -> ViewSession {
        ViewSession::open(kind, Arc::clone(&self.poller), kind.poll_interval(&self.config))
    }
}
