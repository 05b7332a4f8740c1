//! Favorites commands.

use souq_core::{Item, ItemUuid};
use souq_storefront::Storefront;

use super::ItemArgs;

pub fn list(storefront: &Storefront) {
    let favorites = storefront.favorites();
    if favorites.entries().is_empty() {
        println!("No favorites yet");
        return;
    }
    for entry in favorites.entries() {
        println!(
            "{:<30} {:>12}  [{}]",
            entry.item.title,
            entry.item.price.display(),
            entry.item.uuid
        );
    }
}

/// # Errors
///
/// Returns an error if the price is invalid.
pub fn add(storefront: &Storefront, item: ItemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let item = Item::try_from(item)?;
    let title = item.title.clone();
    storefront.favorites().add_favorite(item);
    println!("Saved {title} to favorites");
    Ok(())
}

/// # Errors
///
/// Returns an error if the price is invalid.
pub fn toggle(storefront: &Storefront, item: ItemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let item = Item::try_from(item)?;
    let title = item.title.clone();
    if storefront.favorites().toggle_favorite(item) {
        println!("Saved {title} to favorites");
    } else {
        println!("Removed {title} from favorites");
    }
    Ok(())
}

pub fn remove(storefront: &Storefront, uuid: &str) {
    storefront.favorites().remove_favorite(&ItemUuid::new(uuid));
    list(storefront);
}

pub fn clear(storefront: &Storefront) {
    storefront.favorites().clear_favorites();
    println!("Favorites cleared");
}
