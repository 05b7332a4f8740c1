//! Order history commands.

use souq_storefront::Storefront;

/// Print every order placed from this client.
pub fn list(storefront: &Storefront) {
    let orders = storefront.orders();
    if orders.records().is_empty() {
        println!("No orders yet");
        return;
    }
    for record in orders.records() {
        println!(
            "#{:<12} {}",
            record.order_number,
            record.placed_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
}

/// Show the confirmation for the last checkout, once.
pub fn confirm(storefront: &Storefront) {
    match storefront.orders().take_confirmation() {
        Some(number) => println!("Thank you! Your order number is {number}"),
        None => println!("Nothing to confirm"),
    }
}
