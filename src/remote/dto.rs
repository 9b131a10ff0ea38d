//! Wire bodies exchanged with the Remote Service.

use serde::{Deserialize, Serialize};

use crate::domain::{EventDraft, EventId, PurchaseRequest};

/// Body of `POST /ticket/purchaseTicket`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTicketBody<'a> {
    /// Number of tickets.
    pub ticket_count: u32,
    /// Target event.
    pub ticket_id: EventId,
    /// `ticketCount × ticketPrice`.
    pub total_price: f64,
    /// Event name.
    pub title: &'a str,
    /// Buyer identity; `null` when the session has none.
    pub user_name: Option<&'a str>,
}

impl<'a> From<&'a PurchaseRequest> for PurchaseTicketBody<'a> {
    fn from(req: &'a PurchaseRequest) -> Self {
        Self {
            ticket_count: req.ticket_count(),
            ticket_id: req.event_id(),
            total_price: req.total_price(),
            title: req.title(),
            user_name: req.buyer(),
        }
    }
}

/// Body of `POST /events/addEvent`: the draft plus `started: false`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEventBody<'a> {
    /// Vendor-supplied fields.
    #[serde(flatten)]
    pub draft: &'a EventDraft,
    /// New events are never started.
    pub started: bool,
}

impl<'a> From<&'a EventDraft> for CreateEventBody<'a> {
    fn from(draft: &'a EventDraft) -> Self {
        Self {
            draft,
            started: false,
        }
    }
}

/// Error body optionally returned with a non-success status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure reason.
    #[serde(default)]
    pub message: Option<String>,
}

/// Success body carrying a confirmation message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    /// Confirmation text.
    #[serde(default)]
    pub message: Option<String>,
    /// Identity of a created event, when echoed back.
    #[serde(default)]
    pub id: Option<EventId>,
}
