//! Souq storefront client.
//!
//! The client side of the Souq order pipeline: a cart and favorites list
//! persisted across restarts, and a checkout that must first trade an
//! interaction fingerprint for a single-use token.
//!
//! # Architecture
//!
//! - [`Storefront`] is the application object; build one at startup
//! - [`cart`] and [`favorites`] are collections mirrored to [`storage`]
//! - [`handshake`] runs the fingerprint/token exchange
//! - [`checkout`] validates the form and submits the order
//! - [`api`] talks to the store; [`catalog`] caches listings
//! - [`geocode`] suggests an address for the delivery point

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod crypto;
pub mod error;
pub mod favorites;
pub mod geocode;
pub mod handshake;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;

pub use config::{Environment, StorefrontConfig};
pub use error::{CheckoutError, Notification};
pub use state::Storefront;
