//! Action dispatcher: translates user intents into remote calls.
//!
//! Every outcome, success or failure, is also published on the
//! [`Notifier`]. Only `delete` touches the snapshot directly; every other
//! change reaches the snapshot through a later poll.

use std::sync::Arc;

use crate::domain::{
    EventDraft, EventId, Notifier, PurchaseRequest, SnapshotAction, SnapshotStore,
};
use crate::error::SyncError;
use crate::remote::{Confirmation, RemoteClient};

use super::poller::StatePoller;

/// Executes user-initiated mutations against the Remote Service.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    remote: RemoteClient,
    store: SnapshotStore,
    notifier: Notifier,
    poller: Arc<StatePoller>,
    buyer: Option<String>,
}

impl ActionDispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new(
        remote: RemoteClient,
        store: SnapshotStore,
        notifier: Notifier,
        poller: Arc<StatePoller>,
    ) -> Self {
        Self {
            remote,
            store,
            notifier,
            poller,
            buyer: None,
        }
    }

    /// Attaches a buyer name to every purchase.
    #[must_use]
    pub fn with_buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = Some(buyer.into());
        self
    }

    /// Buys `ticket_count` tickets for `event_id`.
    ///
    /// Price and title come from the current snapshot. On success an
    /// out-of-band refresh is requested so availability updates quickly.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidTicketCount`] for a zero count and
    /// [`SyncError::UnknownEvent`] for an event missing from the snapshot;
    /// neither reaches the network. Remote failures are passed through.
    pub async fn purchase(
        &self,
        event_id: EventId,
        ticket_count: u32,
    ) -> Result<Confirmation, SyncError> {
        let result = self.submit_purchase(event_id, ticket_count).await;
        if result.is_ok() && !self.poller.request_refresh() {
            // Not polling: fetch once inline so the snapshot still catches up.
            self.poller.refresh_now().await;
        }
        self.settle("purchase", Some(event_id), result)
    }

    async fn submit_purchase(
        &self,
        event_id: EventId,
        ticket_count: u32,
    ) -> Result<Confirmation, SyncError> {
        PurchaseRequest::check_count(ticket_count)?;
        let snapshot = self.store.current();
        let event = snapshot
            .get(event_id)
            .ok_or(SyncError::UnknownEvent(event_id))?;
        let request = PurchaseRequest::for_event(event, ticket_count, self.buyer.clone())?;
        tracing::debug!(
            %event_id,
            ticket_count,
            total_price = request.total_price(),
            "submitting purchase"
        );
        self.remote.purchase(&request).await
    }

    /// Starts a not-yet-started event. The snapshot changes on a later poll.
    ///
    /// # Errors
    ///
    /// Returns the remote failure unchanged.
    pub async fn start(&self, event_id: EventId) -> Result<Confirmation, SyncError> {
        let result = self.remote.start_event(event_id).await;
        self.settle("start", Some(event_id), result)
    }

    /// Stops a running event. The snapshot changes on a later poll.
    ///
    /// # Errors
    ///
    /// Returns the remote failure unchanged.
    pub async fn stop(&self, event_id: EventId) -> Result<Confirmation, SyncError> {
        let result = self.remote.stop_event(event_id).await;
        self.settle("stop", Some(event_id), result)
    }

    /// Deletes an event and, once confirmed, drops it from the snapshot.
    ///
    /// A poll issued before the delete completed may briefly bring the
    /// event back; the next poll corrects it.
    ///
    /// # Errors
    ///
    /// Returns the remote failure unchanged; the snapshot is untouched.
    pub async fn delete(&self, event_id: EventId) -> Result<Confirmation, SyncError> {
        let result = self.remote.delete_event(event_id).await;
        if result.is_ok() {
            self.store.apply(SnapshotAction::Remove(event_id));
        }
        self.settle("delete", Some(event_id), result)
    }

    /// Validates and submits a new event.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidDraft`] without a network call if any
    /// field is invalid; remote failures are passed through.
    pub async fn create(&self, draft: &EventDraft) -> Result<Confirmation, SyncError> {
        let result = match draft.validate() {
            Ok(()) => self.remote.create_event(draft).await,
            Err(err) => Err(err),
        };
        self.settle("create", None, result)
    }

    /// Logs the outcome and publishes it as a notification.
    fn settle(
        &self,
        action: &'static str,
        event_id: Option<EventId>,
        result: Result<Confirmation, SyncError>,
    ) -> Result<Confirmation, SyncError> {
        match &result {
            Ok(confirmation) => {
                tracing::info!(action, ?event_id, message = %confirmation.message, "action confirmed");
                self.notifier.success(confirmation.message.clone());
            }
            Err(err) => {
                tracing::warn!(
                    action,
                    ?event_id,
                    error = %err,
                    kind = %err.kind(),
                    code = err.error_code(),
                    "action failed"
                );
                self.notifier.failure(err);
            }
        }
        result
    }
}
