//! Field set for creating a new event.

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, SyncError};

/// Vendor-supplied fields for a new event.
///
/// The server assigns identity, inventory counters and lifecycle flags, so
/// none of those appear here. Call [`EventDraft::validate`] before posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Display name.
    pub name: String,
    /// Venue.
    pub location: String,
    /// Price of a single ticket; must be positive.
    pub ticket_price: f64,
    /// Total inventory; must be positive.
    pub total_tickets: u32,
    /// Free-form description.
    pub description: String,
    /// Capacity of the server-side ticket pool; must be positive.
    pub max_ticket_capacity: u32,
    /// Server-side customer retrieval rate; must not be negative.
    pub customer_retrieval_rate: f64,
    /// Server-side ticket release rate; must not be negative.
    pub ticket_release_rate: f64,
    /// Calendar date (ISO-8601).
    pub date: String,
    /// Start time.
    pub time: String,
    /// Image reference.
    pub image_url: String,
}

impl EventDraft {
    /// Checks every field and reports all violations at once.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidDraft`] listing each offending field.
    pub fn validate(&self) -> Result<(), SyncError> {
        let mut errors = FieldErrors::new();

        let required = [
            ("name", &self.name, "Event Name is required."),
            ("location", &self.location, "Location is required."),
            ("imageUrl", &self.image_url, "Image URL is required."),
            ("description", &self.description, "Description is required."),
            ("date", &self.date, "Event Date is required."),
            ("time", &self.time, "Event Time is required."),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(field, message);
            }
        }

        if self.ticket_price.is_nan() || self.ticket_price <= 0.0 {
            errors.insert("ticketPrice", "Ticket Price must be greater than 0.");
        }
        if self.total_tickets == 0 {
            errors.insert("totalTickets", "Total Tickets must be greater than 0.");
        }
        if self.max_ticket_capacity == 0 {
            errors.insert("maxTicketCapacity", "Max Ticket Capacity must be greater than 0.");
        }
        if self.customer_retrieval_rate.is_nan() || self.customer_retrieval_rate < 0.0 {
            errors.insert(
                "customerRetrievalRate",
                "Customer Retrieval Rate must not be negative.",
            );
        }
        if self.ticket_release_rate.is_nan() || self.ticket_release_rate < 0.0 {
            errors.insert("ticketReleaseRate", "Ticket Release Rate must not be negative.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError::InvalidDraft(errors))
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn valid_draft() -> EventDraft {
        EventDraft {
            name: "Jazz Night".to_string(),
            location: "Kandy".to_string(),
            ticket_price: 1500.0,
            total_tickets: 200,
            description: "Live jazz by the lake".to_string(),
            max_ticket_capacity: 50,
            customer_retrieval_rate: 2.0,
            ticket_release_rate: 3.0,
            date: "2024-12-20".to_string(),
            time: "19:30".to_string(),
            image_url: "https://img.example/jazz.jpg".to_string(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let Err(SyncError::InvalidDraft(errors)) = EventDraft::default().validate() else {
            panic!("empty draft must fail");
        };
        // Rates of 0 are allowed.
        assert_eq!(errors.len(), 9);
        assert!(errors.contains_key("ticketPrice"));
        assert!(!errors.contains_key("ticketReleaseRate"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut draft = valid_draft();
        draft.location = "   ".to_string();
        let Err(SyncError::InvalidDraft(errors)) = draft.validate() else {
            panic!("blank location must fail");
        };
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["location"]);
    }

    #[test]
    fn negative_and_nan_rates_fail() {
        let mut draft = valid_draft();
        draft.ticket_release_rate = -1.0;
        draft.customer_retrieval_rate = f64::NAN;
        let Err(SyncError::InvalidDraft(errors)) = draft.validate() else {
            panic!("bad rates must fail");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn nan_and_zero_prices_fail() {
        for price in [f64::NAN, 0.0, -5.0] {
            let mut draft = valid_draft();
            draft.ticket_price = price;
            let Err(SyncError::InvalidDraft(errors)) = draft.validate() else {
                panic!("price {price} must fail");
            };
            assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["ticketPrice"]);
        }
    }

    #[test]
    fn nan_release_rate_fails() {
        let mut draft = valid_draft();
        draft.ticket_release_rate = f64::NAN;
        let Err(SyncError::InvalidDraft(errors)) = draft.validate() else {
            panic!("NaN release rate must fail");
        };
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["ticketReleaseRate"]);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(valid_draft()).unwrap_or_default();
        assert_eq!(
            json.get("imageUrl").and_then(|v| v.as_str()),
            Some("https://img.example/jazz.jpg")
        );
        assert_eq!(
            json.get("maxTicketCapacity").and_then(serde_json::Value::as_u64),
            Some(50)
        );
    }
}
