//! Placed orders as remembered by the client.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The order number returned by the checkout endpoint.
///
/// The store returns either a JSON string or a JSON number; both are kept as
/// their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Create an order number from its textual form.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OrderNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => Self(s),
            Wire::Unsigned(n) => Self(n.to_string()),
            Wire::Signed(n) => Self(n.to_string()),
        })
    }
}

/// An entry in the local order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Number assigned by the store.
    pub order_number: OrderNumber,
    /// When the client received the confirmation.
    pub placed_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Record an order confirmed at `placed_at`.
    #[must_use]
    pub const fn new(order_number: OrderNumber, placed_at: DateTime<Utc>) -> Self {
        Self {
            order_number,
            placed_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_from_string_or_number() {
        let from_text: OrderNumber = serde_json::from_str("\"A-1042\"").unwrap();
        assert_eq!(from_text.as_str(), "A-1042");

        let from_number: OrderNumber = serde_json::from_str("1042").unwrap();
        assert_eq!(from_number.as_str(), "1042");
    }

    #[test]
    fn test_order_number_rejects_other_shapes() {
        assert!(serde_json::from_str::<OrderNumber>("{\"n\":1}").is_err());
        assert!(serde_json::from_str::<OrderNumber>("null").is_err());
    }

    #[test]
    fn test_order_record_serde_shape() {
        let placed_at = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = OrderRecord::new(OrderNumber::new("77"), placed_at);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["orderNumber"], "77");
        assert!(value["placedAt"].as_str().unwrap().starts_with("2026-03-01T10:00:00"));
    }
}
