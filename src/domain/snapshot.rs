//! Immutable client-side copy of all events.

use chrono::{DateTime, Utc};

use super::{Event, EventId};

/// The full client-side cache of all events as of the most recent
/// successful poll.
///
/// Never edited in place: every change produces a new `Snapshot` that the
/// [`super::SnapshotStore`] swaps in behind a fresh `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    events: Vec<Event>,
    version: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Builds a loaded snapshot from a poll payload.
    #[must_use]
    pub(crate) fn from_poll(events: Vec<Event>, version: u64) -> Self {
        Self {
            events,
            version,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Returns a copy without the given event, keeping the poll timestamp.
    #[must_use]
    pub(crate) fn without(&self, id: EventId, version: u64) -> Self {
        Self {
            events: self.events.iter().filter(|e| e.id != id).cloned().collect(),
            version,
            fetched_at: self.fetched_at,
        }
    }

    /// Returns `false` until the first successful poll.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// Monotonic change counter; `0` for the initial unloaded snapshot.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Time of the poll this snapshot derives from.
    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// All events, in server order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Returns `true` if the event is present.
    #[must_use]
    pub fn contains(&self, id: EventId) -> bool {
        self.get(id).is_some()
    }

    /// Event ids, in server order.
    #[must_use]
    pub fn ids(&self) -> Vec<EventId> {
        self.events.iter().map(|e| e.id).collect()
    }

    /// Events listed to customers: only those whose release has started.
    pub fn browsable(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.started)
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if there are no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
