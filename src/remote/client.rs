//! HTTP client for the Remote Service.

use std::time::Duration;

use reqwest::{Client, Method, Response};

use super::dto::{CreateEventBody, ErrorBody, MessageBody, PurchaseTicketBody};
use crate::domain::{Event, EventDraft, EventId, PurchaseRequest};
use crate::error::SyncError;

/// Successful outcome of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Text for the user: the server's message if it sent one.
    pub message: String,
    /// Event the call referred to or created, when known.
    pub event_id: Option<EventId>,
}

/// The remote operations the synchronization core performs.
///
/// Each method is a single request/response exchange. Non-success statuses
/// become [`SyncError::ServerRejection`] carrying the body's `message` or
/// the operation's generic failure text.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
}

impl RemoteClient {
    /// Creates a client for the service rooted at `base_url`
    /// (e.g. `http://localhost:8080/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /events/getAllEvents`: read all events.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure, rejection, or an
    /// undecodable payload.
    pub async fn list_events(&self) -> Result<Vec<Event>, SyncError> {
        let response = self
            .send(self.request(Method::GET, "events/getAllEvents"), "Failed to fetch events.")
            .await?;
        Ok(response.json::<Vec<Event>>().await?)
    }

    /// `POST /events/addEvent`: create an event from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure or rejection.
    pub async fn create_event(&self, draft: &EventDraft) -> Result<Confirmation, SyncError> {
        let builder = self
            .request(Method::POST, "events/addEvent")
            .json(&CreateEventBody::from(draft));
        let response = self
            .send(builder, "Failed to create event. Please try again.")
            .await?;
        confirm(response, None, "Event created successfully!").await
    }

    /// `POST /events/startEvent/{id}`: begin ticket release.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure or rejection.
    pub async fn start_event(&self, id: EventId) -> Result<Confirmation, SyncError> {
        let path = format!("events/startEvent/{id}");
        let response = self
            .send(self.request(Method::POST, &path), "Failed to start event.")
            .await?;
        confirm(response, Some(id), "Event started successfully!").await
    }

    /// `POST /events/stopEvent/{id}`: end ticket release.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure or rejection.
    pub async fn stop_event(&self, id: EventId) -> Result<Confirmation, SyncError> {
        let path = format!("events/stopEvent/{id}");
        let response = self
            .send(self.request(Method::POST, &path), "Failed to stop event.")
            .await?;
        confirm(response, Some(id), "Event stopped successfully!").await
    }

    /// `DELETE /events/deleteEvent/{id}`: remove an event.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure or rejection.
    pub async fn delete_event(&self, id: EventId) -> Result<Confirmation, SyncError> {
        let path = format!("events/deleteEvent/{id}");
        let response = self
            .send(self.request(Method::DELETE, &path), "Error deleting event.")
            .await?;
        confirm(response, Some(id), "Event deleted successfully").await
    }

    /// `POST /ticket/purchaseTicket`: buy tickets.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure or rejection.
    pub async fn purchase(&self, req: &PurchaseRequest) -> Result<Confirmation, SyncError> {
        let builder = self
            .request(Method::POST, "ticket/purchaseTicket")
            .json(&PurchaseTicketBody::from(req));
        let response = self
            .send(
                builder,
                "There was an error processing the purchase. Please try again.",
            )
            .await?;
        confirm(response, Some(req.event_id()), "Ticket purchased successfully!").await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, path))
    }

    /// Sends the request and turns non-success statuses into rejections.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        generic_failure: &str,
    ) -> Result<Response, SyncError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| generic_failure.to_string());
        tracing::debug!(status = status.as_u16(), %message, "remote service rejected request");
        Err(SyncError::ServerRejection {
            status: status.as_u16(),
            message,
        })
    }
}

/// Reads a success body into a [`Confirmation`].
async fn confirm(
    response: Response,
    event_id: Option<EventId>,
    default_message: &str,
) -> Result<Confirmation, SyncError> {
    let body = response.text().await?;
    let (message, echoed_id) = confirmation_text(&body, default_message);
    Ok(Confirmation {
        message,
        event_id: event_id.or(echoed_id),
    })
}

/// Extracts the user-facing text from a success body.
///
/// Accepts an object with a `message` field, a JSON string, or plain
/// text; anything else falls back to `default_message`.
fn confirmation_text(body: &str, default_message: &str) -> (String, Option<EventId>) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (default_message.to_string(), None);
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => (text, None),
        Ok(value @ serde_json::Value::Object(_)) => {
            let parsed = serde_json::from_value::<MessageBody>(value).unwrap_or_default();
            let message = parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| default_message.to_string());
            (message, parsed.id)
        }
        Ok(_) => (default_message.to_string(), None),
        Err(_) => (trimmed.to_string(), None),
    }
}
