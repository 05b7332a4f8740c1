//! Command implementations.

#![allow(clippy::print_stdout)]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod orders;

use clap::Args;
use rust_decimal::Decimal;
use souq_core::{CollectionName, Item, ItemUuid, Price, PriceError};

/// Item details supplied on the command line.
#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Item uuid as listed by `souq search`
    #[arg(long)]
    pub uuid: String,

    /// Display title
    #[arg(long)]
    pub title: String,

    /// Unit price
    #[arg(long)]
    pub price: Decimal,

    /// Collection the item belongs to
    #[arg(long, default_value = "")]
    pub collection: String,

    /// Image reference
    #[arg(long, default_value = "")]
    pub image: String,
}

impl TryFrom<ItemArgs> for Item {
    type Error = PriceError;

    fn try_from(args: ItemArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            uuid: ItemUuid::new(args.uuid),
            title: args.title,
            price: Price::new(args.price)?,
            collection: CollectionName::new(args.collection),
            image: args.image,
        })
    }
}
