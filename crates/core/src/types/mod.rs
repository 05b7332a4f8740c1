//! Core types for Souq.
//!
//! This module provides type-safe wrappers for the order pipeline's domain
//! concepts, validated when parsed at the boundary.

pub mod id;
pub mod item;
pub mod location;
pub mod order;
pub mod phone;
pub mod price;
pub mod quantity;

pub use id::*;
pub use item::{CartEntry, FavoriteEntry, Item, Keyed};
pub use location::{Coordinates, CoordinatesError};
pub use order::{OrderNumber, OrderRecord};
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
