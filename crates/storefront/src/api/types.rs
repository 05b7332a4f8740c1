//! Store API request and response types.

use serde::{Deserialize, Serialize};
use souq_core::{Item, ItemUuid, OrderNumber, Quantity};

use crate::handshake::EncryptedToken;

// =============================================================================
// Validation
// =============================================================================

/// Body of `POST api/v1/public/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    /// Hex ciphertext of the fingerprint.
    pub check: String,
}

/// Response from the validation authority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ValidateResponse {
    /// Interpret the response. Only `status == "success"` with a non-empty
    /// token grants a token.
    #[must_use]
    pub fn into_verdict(self) -> TokenVerdict {
        match (self.status.as_deref(), self.token) {
            (Some("success"), Some(token)) if !token.is_empty() => {
                TokenVerdict::Granted(Token(token))
            }
            _ => TokenVerdict::Denied {
                message: self.message.filter(|m| !m.is_empty()),
            },
        }
    }
}

/// A single-use token issued by the validation authority.
///
/// Never sent back as-is; it is encrypted into an
/// [`EncryptedToken`](crate::handshake::EncryptedToken) first.
pub struct Token(String);

impl Token {
    /// The raw token. Only the handshake's encryption step should read it.
    #[must_use]
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

/// Outcome of a validation request.
#[derive(Debug)]
pub enum TokenVerdict {
    Granted(Token),
    Denied { message: Option<String> },
}

// =============================================================================
// Checkout
// =============================================================================

/// A cart line as sent to the checkout endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_uuid: ItemUuid,
    pub quan: Quantity,
    pub notes: String,
}

/// The order itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub fullname: String,
    pub phone1: String,
    /// Always present on the wire; `null` when no second number was given.
    pub phone2: Option<String>,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Delivery notes; `"none"` when the customer left them blank.
    pub notes: String,
    pub items: Vec<OrderLine>,
}

/// Body of `POST api/v1/public/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    token: String,
    data: OrderData,
}

impl CheckoutRequest {
    /// Pair an order with the token that authorizes it, consuming the token.
    #[must_use]
    pub fn new(token: EncryptedToken, data: OrderData) -> Self {
        Self {
            token: token.into_inner(),
            data,
        }
    }

    /// The encrypted token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The order.
    #[must_use]
    pub const fn data(&self) -> &OrderData {
        &self.data
    }
}

/// Response from the checkout endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    #[serde(rename = "orderNumber")]
    pub order_number: OrderNumber,
}

// =============================================================================
// Catalog
// =============================================================================

/// Response from `GET api/v1/public/items`.
#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    #[serde(default)]
    pub data: ItemsData,
    #[serde(rename = "currentPage", default)]
    pub current_page: Option<u32>,
    #[serde(rename = "totalRecords", default)]
    pub total_records: Option<u64>,
}

/// Item list wrapper.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsData {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

impl ItemsData {
    /// Parse each item, dropping (and logging) any that fail validation.
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Item>(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed catalog item");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn verdict(json: &str) -> TokenVerdict {
        serde_json::from_str::<ValidateResponse>(json)
            .unwrap()
            .into_verdict()
    }

    #[test]
    fn test_success_grants_token() {
        match verdict(r#"{"status":"success","token":"T"}"#) {
            TokenVerdict::Granted(token) => assert_eq!(token.expose(), "T"),
            TokenVerdict::Denied { .. } => panic!("expected a token"),
        }
    }

    #[test]
    fn test_non_success_is_denied_with_message() {
        match verdict(r#"{"status":"error","message":"Too many requests"}"#) {
            TokenVerdict::Denied { message } => {
                assert_eq!(message.as_deref(), Some("Too many requests"));
            }
            TokenVerdict::Granted(_) => panic!("expected denial"),
        }
    }

    #[test]
    fn test_success_without_token_is_denied() {
        assert!(matches!(
            verdict(r#"{"status":"success","token":""}"#),
            TokenVerdict::Denied { message: None }
        ));
        assert!(matches!(verdict("{}"), TokenVerdict::Denied { message: None }));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        assert_eq!(format!("{:?}", Token("secret".to_string())), "Token([REDACTED])");
    }

    #[test]
    fn test_order_data_keeps_null_second_phone() {
        let data = OrderData {
            fullname: "Zainab Ali".to_string(),
            phone1: "07701234567".to_string(),
            phone2: None,
            address: "Karrada, Baghdad".to_string(),
            longitude: 44.42,
            latitude: 33.31,
            notes: "none".to_string(),
            items: vec![OrderLine {
                item_uuid: ItemUuid::new("kb-1"),
                quan: Quantity::new(2).unwrap(),
                notes: String::new(),
            }],
        };

        let value = serde_json::to_value(&data).unwrap();
        assert!(value["phone2"].is_null());
        assert_eq!(value["items"][0]["item_uuid"], "kb-1");
        assert_eq!(value["items"][0]["quan"], 2);
    }

    #[test]
    fn test_items_response_skips_malformed_items() {
        let json = r#"{
            "data": {"items": [
                {"uuid":"a","title":"Tea","price":750},
                {"uuid":"b","title":"Broken","price":-1},
                {"title":"No uuid","price":10}
            ]},
            "currentPage": 1,
            "totalRecords": 3
        }"#;
        let response: ItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_records, Some(3));

        let items = response.data.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Tea");
    }
}
