//! State poller: keeps the snapshot in sync with the Remote Service.
//!
//! Each successful fetch replaces the snapshot wholesale. A failed fetch
//! leaves the snapshot untouched and publishes exactly one error
//! notification. Within a run at most one fetch is in flight; ticks that
//! fire while a fetch is outstanding are skipped. A fetch left over from a
//! stopped run never blocks the next run and its result is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::{Notifier, SnapshotAction, SnapshotStore};
use crate::error::SyncError;
use crate::remote::RemoteClient;

/// Result of a single fetch attempt.
#[derive(Debug)]
pub enum PollOutcome {
    /// The snapshot was replaced with `events` events.
    Applied {
        /// Number of events in the new snapshot.
        events: usize,
    },
    /// Another fetch was already in flight; nothing was sent.
    Skipped,
    /// The poller was stopped while the fetch was in flight; the result
    /// was thrown away.
    Discarded,
    /// The fetch failed; the snapshot is unchanged.
    Failed(SyncError),
}

impl PollOutcome {
    /// Returns `true` if the snapshot was replaced.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[derive(Debug)]
struct PollerShared {
    remote: RemoteClient,
    store: SnapshotStore,
    notifier: Notifier,
    /// Flags used by `refresh_now` while no run is active.
    idle: Arc<RunFlags>,
}

/// Per-run state. Each `start` gets fresh flags, so a fetch left over from
/// a previous run neither blocks the new run nor lands in the snapshot.
#[derive(Debug, Default)]
struct RunFlags {
    stopped: AtomicBool,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the fetch ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PollerShared {
    async fn poll_once(&self, flags: &RunFlags) -> PollOutcome {
        if flags
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("fetch already in flight, skipping");
            return PollOutcome::Skipped;
        }
        let _guard = InFlight(&flags.in_flight);

        let result = self.remote.list_events().await;
        if flags.stopped.load(Ordering::Acquire) {
            tracing::debug!("poller stopped during fetch, discarding result");
            return PollOutcome::Discarded;
        }

        match result {
            Ok(events) => {
                let count = events.len();
                self.store.apply(SnapshotAction::Replace(events));
                tracing::debug!(events = count, "snapshot refreshed");
                PollOutcome::Applied { events: count }
            }
            Err(err) => {
                tracing::warn!(error = %err, code = err.error_code(), "poll failed, keeping previous snapshot");
                self.notifier.failure(&err);
                PollOutcome::Failed(err)
            }
        }
    }
}

#[derive(Debug)]
struct PollRun {
    interval: Duration,
    flags: Arc<RunFlags>,
    wake: Arc<Notify>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollRun {
    fn halt(&self) {
        self.flags.stopped.store(true, Ordering::Release);
        self.wake.notify_one();
    }
}

/// Periodic fetcher that owns the snapshot refresh cadence.
#[derive(Debug)]
pub struct StatePoller {
    shared: Arc<PollerShared>,
    run: Mutex<Option<PollRun>>,
}

impl StatePoller {
    /// Creates a stopped poller.
    #[must_use]
    pub fn new(remote: RemoteClient, store: SnapshotStore, notifier: Notifier) -> Self {
        Self {
            shared: Arc::new(PollerShared {
                remote,
                store,
                notifier,
                idle: Arc::new(RunFlags::default()),
            }),
            run: Mutex::new(None),
        }
    }

    fn run(&self) -> MutexGuard<'_, Option<PollRun>> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts polling: one fetch immediately, then one every `interval`.
    ///
    /// A running poller is restarted with the new cadence. The new run
    /// fetches immediately even if the previous run still has a fetch
    /// outstanding; that older result is discarded. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        let flags = Arc::new(RunFlags::default());
        let wake = Arc::new(Notify::new());
        let refresh = Arc::new(Notify::new());
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.shared),
            interval,
            Arc::clone(&flags),
            Arc::clone(&wake),
            Arc::clone(&refresh),
        ));

        let previous = self.run().replace(PollRun {
            interval,
            flags,
            wake,
            refresh,
            task,
        });
        if let Some(previous) = previous {
            previous.halt();
            tracing::info!(?interval, "poller restarted");
        } else {
            tracing::info!(?interval, "poller started");
        }
    }

    /// Stops polling. Returns `false` if the poller was not running.
    ///
    /// A fetch already in flight may complete, but its result changes
    /// nothing and publishes nothing.
    pub fn stop(&self) -> bool {
        let Some(run) = self.run().take() else {
            return false;
        };
        run.halt();
        drop(run.task);
        tracing::info!("poller stopped");
        true
    }

    /// Returns `true` while the poll loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run().is_some()
    }

    /// Current cadence, if running.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.run().as_ref().map(|run| run.interval)
    }

    /// Asks the running loop for an immediate extra fetch.
    ///
    /// Requests made while a fetch is in flight coalesce into one follow-up
    /// fetch. Returns `false` if the poller is not running.
    pub fn request_refresh(&self) -> bool {
        match self.run().as_ref() {
            Some(run) => {
                run.refresh.notify_one();
                true
            }
            None => false,
        }
    }

    /// Fetches right now on the caller's task.
    ///
    /// Returns [`PollOutcome::Skipped`] if a fetch is already in flight.
    pub async fn refresh_now(&self) -> PollOutcome {
        let flags = self
            .run()
            .as_ref()
            .map_or_else(|| Arc::clone(&self.shared.idle), |run| Arc::clone(&run.flags));
        self.shared.poll_once(&flags).await
    }
}

impl Drop for StatePoller {
    fn drop(&mut self) {
        if let Some(run) = self.run().take() {
            run.halt();
        }
    }
}

async fn poll_loop(
    shared: Arc<PollerShared>,
    interval: Duration,
    flags: Arc<RunFlags>,
    wake: Arc<Notify>,
    refresh: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = wake.notified() => {}
            _ = ticker.tick() => {}
            () = refresh.notified() => {
                tracing::debug!("out-of-band refresh");
            }
        }
        if flags.stopped.load(Ordering::Acquire) {
            break;
        }
        shared.poll_once(&flags).await;
    }
    tracing::debug!("poll loop exited");
}
