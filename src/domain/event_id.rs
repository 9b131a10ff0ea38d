//! Type-safe event identifier.
//!
//! [`EventId`] wraps the server-assigned numeric id so it cannot be confused
//! with ticket counts or prices. The Remote Service is not consistent about
//! the JSON type of ids, so deserialization accepts both `7` and `"7"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier of an [`super::Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for EventId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(Self(n)),
            RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_number() {
        let Ok(id) = serde_json::from_str::<EventId>("7") else {
            panic!("numeric id should parse");
        };
        assert_eq!(id, EventId::new(7));
    }

    #[test]
    fn deserializes_from_numeric_string() {
        let Ok(id) = serde_json::from_str::<EventId>("\"42\"") else {
            panic!("string id should parse");
        };
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn rejects_non_numeric_string() {
        assert!(serde_json::from_str::<EventId>("\"abc\"").is_err());
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&EventId::new(5)).unwrap_or_default();
        assert_eq!(json, "5");
    }

    #[test]
    fn display_and_from_str_agree() {
        let id = EventId::new(19);
        assert_eq!(id.to_string().parse::<EventId>().ok(), Some(id));
    }
}
