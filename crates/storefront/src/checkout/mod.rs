//! Order submission.
//!
//! # Architecture
//!
//! - `form` validates the customer's contact and delivery details
//! - `history` keeps the local order list and the confirmation flag
//! - [`CheckoutSubmitter`] posts an order under an encrypted token and, on
//!   success, records it and empties the cart
//!
//! The token is single-use. A failed submission never retries with the same
//! token; the caller starts a new handshake instead. There is no client-side
//! idempotency key, so duplicate orders are prevented only by the store
//! rejecting a spent token.

mod form;
mod history;

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use souq_core::{CartEntry, Coordinates, OrderRecord, Price};

pub use form::{
    CheckoutForm, EMPTY_NOTES, FieldError, FormField, FormValidationError, ValidatedForm,
};
pub use history::OrderHistory;

use crate::api::{CheckoutRequest, OrderData, OrderLine, StoreApi};
use crate::cart::CartEngine;
use crate::error::CheckoutError;
use crate::handshake::EncryptedToken;

/// Totals shown on the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub item_total: Price,
    pub delivery_fee: Price,
    pub grand_total: Price,
}

impl CheckoutSummary {
    #[must_use]
    pub fn new(item_total: Price, delivery_fee: Price) -> Self {
        Self {
            item_total,
            delivery_fee,
            grand_total: item_total + delivery_fee,
        }
    }
}

/// Build the order body from a validated form, location and cart snapshot.
#[must_use]
pub fn build_order(form: &ValidatedForm, location: Coordinates, entries: &[CartEntry]) -> OrderData {
    OrderData {
        fullname: form.full_name.clone(),
        phone1: form.phone.to_string(),
        phone2: form.second_phone.as_ref().map(ToString::to_string),
        address: form.address.clone(),
        longitude: location.longitude(),
        latitude: location.latitude(),
        notes: form.notes.clone(),
        items: entries
            .iter()
            .map(|entry| OrderLine {
                item_uuid: entry.item.uuid.clone(),
                quan: entry.quantity,
                notes: entry.notes.clone(),
            })
            .collect(),
    }
}

/// Posts one order and applies its local side effects.
pub struct CheckoutSubmitter<'a, A> {
    api: &'a A,
    cart: &'a Mutex<CartEngine>,
    history: &'a Mutex<OrderHistory>,
}

impl<'a, A: StoreApi> CheckoutSubmitter<'a, A> {
    #[must_use]
    pub const fn new(
        api: &'a A,
        cart: &'a Mutex<CartEngine>,
        history: &'a Mutex<OrderHistory>,
    ) -> Self {
        Self { api, cart, history }
    }

    /// Submit `order` under `token`.
    ///
    /// On success the order is appended to the history and the cart is
    /// cleared. On failure nothing local changes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Network`] if the request fails or the store
    /// rejects it.
    pub async fn submit(
        self,
        token: EncryptedToken,
        order: OrderData,
    ) -> Result<OrderRecord, CheckoutError> {
        let request = CheckoutRequest::new(token, order);
        let order_number = self.api.checkout(&request).await?;

        let record = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(order_number, Utc::now());
        self.cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_cart();

        tracing::info!(order_number = %record.order_number, "Checkout complete");
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use souq_core::{Item, ItemUuid, Quantity};

    fn entry(uuid: &str, quantity: u32, notes: &str) -> CartEntry {
        CartEntry::new(
            Item {
                uuid: ItemUuid::new(uuid),
                title: uuid.to_string(),
                price: Price::from(1000),
                collection: "Grill".into(),
                image: String::new(),
            },
            Quantity::new(quantity).unwrap(),
            notes.to_string(),
        )
    }

    #[test]
    fn test_summary_adds_delivery_fee() {
        let summary = CheckoutSummary::new(Price::from(12_000), Price::from(5000));
        assert_eq!(summary.grand_total, Price::from(17_000));
    }

    #[test]
    fn test_build_order_maps_lines_and_contacts() {
        let form = CheckoutForm {
            full_name: "Zainab Ali".to_string(),
            phone: "07701234567".to_string(),
            second_phone: String::new(),
            address: "Karrada".to_string(),
            notes: String::new(),
        }
        .validate()
        .unwrap();
        let location = Coordinates::new(33.31, 44.42).unwrap();

        let order = build_order(
            &form,
            location,
            &[entry("A", 2, "no onions"), entry("B", 1, "")],
        );

        assert_eq!(order.phone2, None);
        assert_eq!(order.notes, EMPTY_NOTES);
        assert!((order.latitude - 33.31).abs() < f64::EPSILON);
        assert_eq!(
            order.items,
            vec![
                OrderLine {
                    item_uuid: ItemUuid::new("A"),
                    quan: Quantity::new(2).unwrap(),
                    notes: "no onions".to_string(),
                },
                OrderLine {
                    item_uuid: ItemUuid::new("B"),
                    quan: Quantity::ONE,
                    notes: String::new(),
                },
            ]
        );
    }
}
