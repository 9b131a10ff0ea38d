//! Ordered listener registry for push-channel records.
//!
//! Registrations are kept in insertion order and delivery walks them in
//! that order. Each registration gets its own [`ListenerId`], so the same
//! callback registered twice is delivered to twice and can be removed
//! either one registration at a time or all at once.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::messages::LogRecord;

/// Callback invoked for every delivered [`LogRecord`].
pub type LogListener = Arc<dyn Fn(&LogRecord) + Send + Sync>;

/// Handle identifying one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registrations {
    next_id: u64,
    entries: Vec<(ListenerId, LogListener)>,
}

/// Shared, ordered set of listener registrations.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Registrations>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registrations> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a registration and returns its handle.
    pub fn add(&self, listener: LogListener) -> ListenerId {
        let mut regs = self.lock();
        let id = ListenerId(regs.next_id);
        regs.next_id = regs.next_id.wrapping_add(1);
        regs.entries.push((id, listener));
        id
    }

    /// Removes one registration. Returns `false` if it was already gone.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut regs = self.lock();
        let before = regs.entries.len();
        regs.entries.retain(|(entry_id, _)| *entry_id != id);
        regs.entries.len() != before
    }

    /// Removes every registration of `listener`, returning how many.
    pub fn remove_listener(&self, listener: &LogListener) -> usize {
        let mut regs = self.lock();
        let before = regs.entries.len();
        regs.entries
            .retain(|(_, registered)| !Arc::ptr_eq(registered, listener));
        before - regs.entries.len()
    }

    /// Delivers a record to every current registration, in order.
    ///
    /// The registration list is copied first, so listeners may add or
    /// remove registrations from inside the callback. Returns the number of
    /// deliveries.
    pub fn deliver(&self, record: &LogRecord) -> usize {
        let targets: Vec<LogListener> = self
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &targets {
            listener(record);
        }
        targets.len()
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
