//! Store API client.
//!
//! # Architecture
//!
//! - [`StoreApi`] is the seam between the checkout pipeline and the network
//! - [`HttpStoreApi`] talks to the real store over HTTPS via `reqwest`
//! - `types` holds the JSON request/response shapes, parsed at the boundary
//!
//! # Endpoints
//!
//! | Method | Path                       | Purpose                       |
//! |--------|----------------------------|-------------------------------|
//! | POST   | `api/v1/public/validate`   | Exchange a fingerprint for a token |
//! | POST   | `api/v1/public/checkout`   | Place an order                |
//! | GET    | `api/v1/public/items`      | Catalog listing and search    |

mod http;
pub mod types;

use std::future::Future;

use souq_core::OrderNumber;
use thiserror::Error;

use crate::catalog::{CatalogQuery, ItemPage};

pub use http::HttpStoreApi;
pub use types::{CheckoutRequest, OrderData, OrderLine, Token, TokenVerdict};

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Operations the client needs from the store.
pub trait StoreApi: Send + Sync {
    /// Submit an encrypted fingerprint to the validation authority.
    ///
    /// A 2xx response is a verdict, granted or denied. Any other status is
    /// an error.
    fn validate(&self, check: &str) -> impl Future<Output = Result<TokenVerdict, ApiError>> + Send;

    /// Place an order.
    fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<OrderNumber, ApiError>> + Send;

    /// List catalog items.
    fn search_items(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<ItemPage, ApiError>> + Send;
}
