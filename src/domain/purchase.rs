//! Ticket purchase request built for a single dispatch call.

use super::{Event, EventId};
use crate::error::SyncError;

/// A validated request to buy `ticket_count` tickets for one event.
///
/// Lives only for the duration of a purchase dispatch; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRequest {
    event_id: EventId,
    ticket_count: u32,
    ticket_price: f64,
    title: String,
    buyer: Option<String>,
}

impl PurchaseRequest {
    /// Checks the ticket count before anything else is looked up.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidTicketCount`] if `ticket_count < 1`.
    pub const fn check_count(ticket_count: u32) -> Result<(), SyncError> {
        if ticket_count < 1 {
            return Err(SyncError::InvalidTicketCount(ticket_count));
        }
        Ok(())
    }

    /// Builds a request priced from the event's current ticket price.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidTicketCount`] if `ticket_count < 1`.
    pub fn for_event(
        event: &Event,
        ticket_count: u32,
        buyer: Option<String>,
    ) -> Result<Self, SyncError> {
        Self::check_count(ticket_count)?;
        Ok(Self {
            event_id: event.id,
            ticket_count,
            ticket_price: event.ticket_price,
            title: event.name.clone(),
            buyer,
        })
    }

    /// Target event.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Number of tickets (always ≥ 1).
    #[must_use]
    pub const fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    /// `ticket_count × ticket_price`.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        f64::from(self.ticket_count) * self.ticket_price
    }

    /// Event name at the time of purchase.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Buyer identity, if the session has one.
    #[must_use]
    pub fn buyer(&self) -> Option<&str> {
        self.buyer.as_deref()
    }
}
