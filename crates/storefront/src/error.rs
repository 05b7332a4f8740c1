//! Checkout error handling with Sentry integration.
//!
//! Every failure of a checkout attempt is a [`CheckoutError`]. The UI turns
//! it into exactly one [`Notification`] via [`CheckoutError::notification`];
//! the pipeline calls [`CheckoutError::report`] once so that infrastructure
//! failures reach Sentry.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::FormValidationError;
use crate::config::Environment;
use crate::crypto::CipherError;

/// Shown in place of store-provided messages outside development.
pub const GENERIC_FAILURE: &str = "Network error. Please try again.";

/// Why a checkout attempt did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields failed validation. Nothing was sent.
    #[error("Invalid checkout form: {0}")]
    Form(#[from] FormValidationError),

    /// The cart has no lines. Nothing was sent.
    #[error("Cart is empty")]
    EmptyCart,

    /// No delivery location has been chosen. Nothing was sent.
    #[error("Delivery location is not set")]
    MissingLocation,

    /// Another attempt is already between handshake and completion.
    #[error("A checkout is already in progress")]
    InFlight,

    /// The fingerprint or token could not be encrypted.
    #[error("Encryption failed: {0}")]
    Encryption(#[from] CipherError),

    /// The validation authority answered but did not issue a token.
    #[error("Validation denied: {}", .message.as_deref().unwrap_or("no reason given"))]
    HandshakeDenied {
        /// Reason supplied by the store, if any.
        message: Option<String>,
    },

    /// A request failed in transport or returned a non-success status.
    #[error("Network error: {0}")]
    Network(#[from] ApiError),
}

/// A single user-facing message for a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }
}

impl CheckoutError {
    /// Whether the user can simply try again.
    ///
    /// A retry always starts a fresh handshake; tokens are never reused.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::HandshakeDenied { .. } | Self::Network(_) | Self::Encryption(_)
        )
    }

    /// The message to show the user.
    ///
    /// Store-provided denial reasons are only shown in development.
    #[must_use]
    pub fn notification(&self, environment: Environment) -> Notification {
        // Don't expose internal error details to users
        match self {
            Self::Form(err) => Notification::new("Please check your details", err.to_string()),
            Self::EmptyCart => Notification::new(
                "Your cart is empty",
                "Add something to your cart before checking out.",
            ),
            Self::MissingLocation => Notification::new(
                "Choose a delivery location",
                "Pick where your order should be delivered.",
            ),
            Self::InFlight => Notification::new(
                "Order in progress",
                "Your order is already being submitted.",
            ),
            Self::Encryption(_) => Notification::new("There is an error", GENERIC_FAILURE),
            Self::HandshakeDenied { message } => {
                let description = match message {
                    Some(message) if environment.is_development() => message.clone(),
                    _ => GENERIC_FAILURE.to_string(),
                };
                Notification::new("There is an error", description)
            }
            Self::Network(_) => Notification::new(
                "Error sending cart data",
                "Please check your connection and try again.",
            ),
        }
    }

    /// Log the failure, capturing infrastructure errors to Sentry.
    pub fn report(&self) {
        match self {
            Self::Network(_) | Self::Encryption(_) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Checkout error"
                );
            }
            Self::HandshakeDenied { .. } => {
                tracing::info!(error = %self, "Checkout token denied");
            }
            _ => tracing::warn!(error = %self, "Checkout attempt rejected"),
        }
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("uuid", "kb-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{FieldError, FormField};

    fn denied(message: Option<&str>) -> CheckoutError {
        CheckoutError::HandshakeDenied {
            message: message.map(String::from),
        }
    }

    #[test]
    fn test_denial_message_only_in_development() {
        let err = denied(Some("Too many attempts"));

        assert_eq!(
            err.notification(Environment::Development).description,
            "Too many attempts"
        );
        assert_eq!(
            err.notification(Environment::Production).description,
            GENERIC_FAILURE
        );
        assert_eq!(
            denied(None).notification(Environment::Development).description,
            GENERIC_FAILURE
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(denied(None).is_retryable());
        assert!(CheckoutError::Network(ApiError::Api {
            status: 502,
            message: "Bad Gateway".to_string()
        })
        .is_retryable());
        assert!(!CheckoutError::EmptyCart.is_retryable());
        assert!(!CheckoutError::InFlight.is_retryable());
        assert!(!CheckoutError::MissingLocation.is_retryable());
    }

    #[test]
    fn test_form_notification_lists_fields() {
        let err = CheckoutError::Form(FormValidationError::new(vec![FieldError::Required(
            FormField::Address,
        )]));
        let notification = err.notification(Environment::Production);
        assert!(notification.description.contains("address"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            denied(Some("blocked")).to_string(),
            "Validation denied: blocked"
        );
        assert_eq!(denied(None).to_string(), "Validation denied: no reason given");
    }
}
