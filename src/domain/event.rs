//! Ticketed event as reported by the Remote Service.

use serde::{Deserialize, Deserializer, Serialize};

use super::EventId;

/// Lifecycle position derived from the `started` / `completed` flag pair.
///
/// Transitions are linear: `NotStarted → Started → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Created but ticket release has not begun.
    NotStarted,
    /// Tickets are being released and sold.
    Started,
    /// Ticket release has finished.
    Completed,
}

/// Reads `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A sellable occasion with finite ticket inventory.
///
/// Field names follow the Remote Service's camelCase JSON. Inventory
/// counters and release-simulation parameters are owned by the server;
/// the client only reads them. Missing or `null` fields other than `id`
/// decode to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Server-assigned identity.
    pub id: EventId,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Venue.
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    /// Calendar date as sent by the server (ISO-8601 date).
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// Start time as sent by the server.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    /// Free-form description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Image reference.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Price of a single ticket.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ticket_price: f64,
    /// Total inventory.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tickets: u32,
    /// Tickets sold so far.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sold_tickets: u32,
    /// Tickets currently released and purchasable, when the server reports it.
    #[serde(default)]
    pub available_tickets: Option<u32>,
    /// Capacity of the server-side ticket pool.
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_ticket_capacity: u32,
    /// Server-side release rate.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ticket_release_rate: f64,
    /// Server-side customer retrieval rate.
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_retrieval_rate: f64,
    /// Ticket release has begun.
    #[serde(default, deserialize_with = "null_as_default")]
    pub started: bool,
    /// Ticket release has finished.
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
}

impl Event {
    /// Returns the lifecycle position.
    ///
    /// A payload claiming `completed` without `started` is reported as
    /// `Completed`; [`Event::invariant_violations`] flags it.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        if self.completed {
            Lifecycle::Completed
        } else if self.started {
            Lifecycle::Started
        } else {
            Lifecycle::NotStarted
        }
    }

    /// Tickets a customer can still buy.
    ///
    /// Uses the server's `availableTickets` when present, otherwise the
    /// unsold remainder of the total inventory.
    #[must_use]
    pub fn tickets_available(&self) -> u32 {
        self.available_tickets
            .unwrap_or_else(|| self.total_tickets.saturating_sub(self.sold_tickets))
    }

    /// Returns `true` when no tickets can be bought right now.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.tickets_available() == 0
    }

    /// Revenue collected so far (`soldTickets × ticketPrice`).
    #[must_use]
    pub fn revenue(&self) -> f64 {
        f64::from(self.sold_tickets) * self.ticket_price
    }

    /// Lists violated data-model invariants.
    ///
    /// The client cannot repair server data, so callers only log these.
    #[must_use]
    pub fn invariant_violations(&self) -> Vec<&'static str> {
        let mut violations = Vec::new();
        if self.sold_tickets > self.total_tickets {
            violations.push("soldTickets exceeds totalTickets");
        }
        if self.completed && !self.started {
            violations.push("completed event was never started");
        }
        violations
    }
}
