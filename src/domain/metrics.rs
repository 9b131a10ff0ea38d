//! Aggregates shown on the vendor dashboard.

use serde::Serialize;

use super::{Lifecycle, Snapshot};

/// Totals derived from one [`Snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardMetrics {
    /// Number of events.
    pub total_events: usize,
    /// Sum of `totalTickets`.
    pub total_tickets: u64,
    /// Sum of `soldTickets`.
    pub tickets_sold: u64,
    /// Sum of `soldTickets × ticketPrice`.
    pub revenue: f64,
    /// Events whose release has not begun.
    pub yet_to_start: usize,
    /// Events currently releasing tickets.
    pub in_progress: usize,
    /// Events whose release has finished.
    pub completed: usize,
}

impl DashboardMetrics {
    /// Computes the totals for a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        snapshot
            .events()
            .iter()
            .fold(Self::default(), |mut acc, event| {
                acc.total_events += 1;
                acc.total_tickets += u64::from(event.total_tickets);
                acc.tickets_sold += u64::from(event.sold_tickets);
                acc.revenue += event.revenue();
                match event.lifecycle() {
                    Lifecycle::NotStarted => acc.yet_to_start += 1,
                    Lifecycle::Started => acc.in_progress += 1,
                    Lifecycle::Completed => acc.completed += 1,
                }
                acc
            })
    }
}
