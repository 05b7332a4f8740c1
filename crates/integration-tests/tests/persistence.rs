//! Cart, favorites and order history survive a restart.

#![allow(clippy::unwrap_used)]

use souq_core::{Coordinates, ItemUuid, Quantity};
use souq_integration_tests::{FIRST_ORDER_NUMBER, FakeStore, sample_catalog};
use souq_storefront::cart::AddOptions;
use souq_storefront::checkout::CheckoutForm;
use souq_storefront::handshake::ViewportSignals;

#[tokio::test]
async fn test_cart_and_favorites_survive_reopen() {
    let store = FakeStore::start().await;
    let dir = tempfile::tempdir().unwrap();
    let catalog = sample_catalog();

    {
        let storefront = store.storefront(dir.path());
        let mut cart = storefront.cart();
        cart.add_to_cart(catalog[1].clone(), AddOptions::default());
        cart.add_to_cart(catalog[1].clone(), AddOptions::default());
        cart.add_to_cart(
            catalog[3].clone(),
            AddOptions {
                quantity: None,
                notes: Some("extra syrup".to_string()),
            },
        );
        drop(cart);

        let mut favorites = storefront.favorites();
        favorites.add_favorite(catalog[2].clone());
        assert!(favorites.toggle_favorite(catalog[4].clone()));
    }

    let reopened = store.storefront(dir.path());
    let cart = reopened.cart();
    assert_eq!(cart.entries().len(), 2);
    assert_eq!(
        cart.quantity_of(&ItemUuid::new("tk-2")),
        Some(Quantity::new(2).unwrap())
    );
    assert_eq!(cart.notes_for(&ItemUuid::new("bq-4")), "extra syrup");
    drop(cart);

    let favorites = reopened.favorites();
    assert!(favorites.is_favorite(&ItemUuid::new("dl-3")));
    assert!(favorites.is_favorite(&ItemUuid::new("tea-5")));
    assert_eq!(favorites.entries().len(), 2);
}

#[tokio::test]
async fn test_confirmation_shown_once_after_restart() {
    let store = FakeStore::start().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let storefront = store.storefront(dir.path());
        storefront
            .cart()
            .add_to_cart(sample_catalog()[0].clone(), AddOptions::default());
        let form = CheckoutForm {
            full_name: "Omar Hassan".to_string(),
            phone: "+9647801234567".to_string(),
            second_phone: "07901234567".to_string(),
            address: "Mansour, Baghdad".to_string(),
            notes: "Call on arrival".to_string(),
        };
        let viewport = ViewportSignals {
            screen_width: 1280,
            screen_height: 800,
            inner_width: 1280,
            inner_height: 720,
            trigger_top: 300.0,
            trigger_left: 900.0,
        };
        storefront
            .checkout(
                &form,
                Some(Coordinates::new(33.31, 44.32).unwrap()),
                &viewport,
            )
            .await
            .unwrap();
    }

    let orders = store.state().orders();
    assert_eq!(orders[0].data().phone2.as_deref(), Some("07901234567"));
    assert_eq!(orders[0].data().notes, "Call on arrival");

    let reopened = store.storefront(dir.path());
    assert!(reopened.cart().is_empty());
    assert_eq!(reopened.orders().records().len(), 1);

    let number = reopened.orders().take_confirmation().unwrap();
    assert_eq!(number.as_str(), FIRST_ORDER_NUMBER.to_string());
    assert_eq!(reopened.orders().take_confirmation(), None);

    let again = store.storefront(dir.path());
    assert_eq!(again.orders().take_confirmation(), None);
    assert_eq!(again.orders().latest(), Some(number));
}

#[tokio::test]
async fn test_corrupt_cart_file_starts_empty() {
    let store = FakeStore::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cart.json"), "{not json").unwrap();

    let storefront = store.storefront(dir.path());
    assert!(storefront.cart().is_empty());

    storefront
        .cart()
        .add_to_cart(sample_catalog()[4].clone(), AddOptions::default());
    let reopened = store.storefront(dir.path());
    assert_eq!(reopened.cart().entries().len(), 1);
}
