//! Souq Core - Shared types library.
//!
//! This crate provides the domain types used across all Souq components:
//! - `storefront` - The client-side order pipeline (cart, favorites, checkout)
//! - `cli` - Command-line driver for the pipeline
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Item and cart records, type-safe keys, prices, quantities,
//!   phone numbers and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
