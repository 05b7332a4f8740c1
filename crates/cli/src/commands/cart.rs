//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! souq cart add --uuid kb-1 --title Kebab --price 4000 --quantity 2 --notes "no onions"
//! souq cart inc kb-1
//! souq cart dec kb-1
//! souq cart notes kb-1 "extra bread"
//! souq cart show
//! souq cart clear
//! ```

use souq_core::{Item, ItemUuid, Quantity};
use souq_storefront::Storefront;
use souq_storefront::cart::{AddOptions, CartEngine};
use souq_storefront::error::add_breadcrumb;

use super::ItemArgs;

/// Print every cart line and the totals.
pub fn show(storefront: &Storefront) {
    print_cart(&storefront.cart());
    let summary = storefront.summary();
    println!("Delivery:  {}", summary.delivery_fee.display());
    println!("Total:     {}", summary.grand_total.display());
}

/// Add an item, or bump its quantity if already present.
///
/// # Errors
///
/// Returns an error if the price or quantity is invalid.
pub fn add(
    storefront: &Storefront,
    item: ItemArgs,
    quantity: Option<u32>,
    notes: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = Item::try_from(item)?;
    let quantity = quantity.map(Quantity::new).transpose()?;
    add_breadcrumb("cart", "Added item", Some(&[("uuid", item.uuid.as_str())]));

    let mut cart = storefront.cart();
    cart.add_to_cart(item, AddOptions { quantity, notes });
    print_cart(&cart);
    Ok(())
}

/// Bump the quantity of one line.
pub fn increment(storefront: &Storefront, uuid: &str) {
    let mut cart = storefront.cart();
    cart.increment_quantity(&ItemUuid::new(uuid));
    print_cart(&cart);
}

/// Lower the quantity of one line, removing it at one.
pub fn decrement(storefront: &Storefront, uuid: &str) {
    let mut cart = storefront.cart();
    cart.decrement_quantity(&ItemUuid::new(uuid));
    print_cart(&cart);
}

/// Remove one line.
pub fn remove(storefront: &Storefront, uuid: &str) {
    add_breadcrumb("cart", "Removed item", Some(&[("uuid", uuid)]));
    let mut cart = storefront.cart();
    cart.remove_from_cart(&ItemUuid::new(uuid));
    print_cart(&cart);
}

/// Replace the notes on one line.
pub fn notes(storefront: &Storefront, uuid: &str, notes: &str) {
    let mut cart = storefront.cart();
    cart.update_item_notes(&ItemUuid::new(uuid), notes);
    print_cart(&cart);
}

/// Empty the cart.
pub fn clear(storefront: &Storefront) {
    storefront.cart().clear_cart();
    println!("Cart cleared");
}

fn print_cart(cart: &CartEngine) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for entry in cart.entries() {
        println!(
            "{:>3} x {:<30} {:>12}  [{}]",
            entry.quantity,
            entry.item.title,
            entry.line_total().display(),
            entry.item.uuid
        );
        if !entry.notes.is_empty() {
            println!("        note: {}", entry.notes);
        }
    }
    println!(
        "Items: {}  Subtotal: {}",
        cart.total_item_count(),
        cart.cart_total().display()
    );
}
