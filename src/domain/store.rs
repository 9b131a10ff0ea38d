//! Owned snapshot container with a single mutation entry point.
//!
//! [`SnapshotStore`] keeps the current [`Snapshot`] behind a
//! [`tokio::sync::watch`] channel of `Arc<Snapshot>`. Every accepted
//! [`SnapshotAction`] installs a brand-new `Arc`, so a reader that cloned
//! the previous one keeps a consistent view and never sees a half-applied
//! update.

use std::sync::Arc;

use tokio::sync::watch;

use super::{Event, EventId, Lifecycle, Snapshot};

/// The only ways the snapshot may change.
#[derive(Debug, Clone)]
pub enum SnapshotAction {
    /// A successful poll: replace every event with the payload.
    Replace(Vec<Event>),
    /// Optimistic removal after a confirmed delete.
    Remove(EventId),
}

/// Central store for the client's event snapshot.
///
/// Cheap to clone; clones share the same underlying channel.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    sender: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Creates a store holding the unloaded empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.sender.borrow())
    }

    /// Returns a receiver that is notified after every accepted action.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.sender.subscribe()
    }

    /// Applies an action, returning `true` if the snapshot changed.
    pub fn apply(&self, action: SnapshotAction) -> bool {
        self.sender.send_if_modified(|current| {
            let Some(next) = reduce(current, action) else {
                return false;
            };
            tracing::trace!(version = next.version(), events = next.len(), "snapshot replaced");
            *current = Arc::new(next);
            true
        })
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the successor snapshot, or `None` when the action is a no-op.
fn reduce(current: &Snapshot, action: SnapshotAction) -> Option<Snapshot> {
    let version = current.version().saturating_add(1);
    match action {
        SnapshotAction::Replace(events) => {
            audit_lifecycle(current, &events);
            Some(Snapshot::from_poll(events, version))
        }
        SnapshotAction::Remove(id) => {
            if !current.contains(id) {
                return None;
            }
            Some(current.without(id, version))
        }
    }
}

/// Logs lifecycle back-edges and payload invariant violations.
fn audit_lifecycle(current: &Snapshot, incoming: &[Event]) {
    for event in incoming {
        for violation in event.invariant_violations() {
            tracing::warn!(event_id = %event.id, violation, "event violates data model invariant");
        }
        if let Some(previous) = current.get(event.id)
            && previous.lifecycle() == Lifecycle::Completed
            && event.lifecycle() != Lifecycle::Completed
        {
            tracing::warn!(event_id = %event.id, "completed event reverted in poll payload");
        }
    }
}
