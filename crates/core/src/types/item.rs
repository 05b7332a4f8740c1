//! Catalog items and the collections built from them.
//!
//! The JSON shapes match what the store API returns for catalog items and
//! what the client persists for its cart and favorites lists.

use serde::{Deserialize, Serialize};

use super::id::{CollectionName, ItemUuid};
use super::price::Price;
use super::quantity::Quantity;

/// A record that is unique by item key within its collection.
pub trait Keyed {
    /// The item key this record is unique by.
    fn key(&self) -> &ItemUuid;
}

/// A purchasable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item key.
    pub uuid: ItemUuid,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Collection (category) tag.
    #[serde(default)]
    pub collection: CollectionName,
    /// Image reference, relative to the store's image host.
    #[serde(default)]
    pub image: String,
}

impl Keyed for Item {
    fn key(&self) -> &ItemUuid {
        &self.uuid
    }
}

/// A line in the shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The item this line is for.
    #[serde(flatten)]
    pub item: Item,
    /// Number of units; never zero.
    #[serde(rename = "quan")]
    pub quantity: Quantity,
    /// Free-text notes for this line (e.g. "no onions").
    #[serde(default)]
    pub notes: String,
}

impl CartEntry {
    /// Create a cart line.
    #[must_use]
    pub const fn new(item: Item, quantity: Quantity, notes: String) -> Self {
        Self {
            item,
            quantity,
            notes,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.price.times(self.quantity)
    }
}

impl Keyed for CartEntry {
    fn key(&self) -> &ItemUuid {
        &self.item.uuid
    }
}

/// A favorited item. Membership is the only state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteEntry {
    /// The favorited item.
    pub item: Item,
}

impl From<Item> for FavoriteEntry {
    fn from(item: Item) -> Self {
        Self { item }
    }
}

impl Keyed for FavoriteEntry {
    fn key(&self) -> &ItemUuid {
        &self.item.uuid
    }
}
