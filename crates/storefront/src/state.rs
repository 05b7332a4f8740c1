//! The storefront client object.
//!
//! Built once at startup and passed to whatever drives the UI. It owns the
//! cart, favorites, order history and handshake; there is no global state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use souq_core::{Coordinates, OrderRecord};
use tracing::instrument;

use crate::api::{ApiError, HttpStoreApi, StoreApi};
use crate::cart::CartEngine;
use crate::catalog::Catalog;
use crate::checkout::{CheckoutForm, CheckoutSubmitter, CheckoutSummary, OrderHistory, build_order};
use crate::config::StorefrontConfig;
use crate::crypto::ObfuscationCipher;
use crate::error::{CheckoutError, add_breadcrumb};
use crate::favorites::FavoritesEngine;
use crate::geocode::Geocoder;
use crate::handshake::{ValidationHandshake, ViewportSignals};
use crate::storage::{DurableStorage, PersistentCollectionStore, keys, open_storage};

/// Storefront client state.
///
/// This struct is cheaply cloneable via `Arc`; clones share one cart,
/// one favorites list and one handshake.
pub struct Storefront<A = HttpStoreApi> {
    inner: Arc<StorefrontInner<A>>,
}

struct StorefrontInner<A> {
    config: StorefrontConfig,
    api: Arc<A>,
    catalog: Catalog<A>,
    geocoder: Option<Geocoder>,
    cart: Mutex<CartEngine>,
    favorites: Mutex<FavoritesEngine>,
    orders: Mutex<OrderHistory>,
    handshake: ValidationHandshake,
}

impl<A> Clone for Storefront<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Storefront<HttpStoreApi> {
    /// Open the storefront against the configured store and data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage = open_storage(&config.data_dir);
        let api = HttpStoreApi::new(&config)?;
        Ok(Self::new(config, api, storage))
    }
}

impl<A: StoreApi> Storefront<A> {
    /// Create a storefront over `api`, restoring state from `storage`.
    #[must_use]
    pub fn new(config: StorefrontConfig, api: A, storage: Arc<dyn DurableStorage>) -> Self {
        let api = Arc::new(api);
        let cart = CartEngine::load(PersistentCollectionStore::new(
            Arc::clone(&storage),
            keys::CART,
        ));
        let favorites = FavoritesEngine::load(PersistentCollectionStore::new(
            Arc::clone(&storage),
            keys::FAVORITES,
        ));
        let orders = OrderHistory::load(storage);

        let geocoder = config.geocoding.as_ref().and_then(|geocoding| {
            Geocoder::new(geocoding)
                .inspect_err(|e| tracing::warn!(error = %e, "Reverse geocoding disabled"))
                .ok()
        });

        Self {
            inner: Arc::new(StorefrontInner {
                catalog: Catalog::new(Arc::clone(&api)),
                config,
                api,
                geocoder,
                cart: Mutex::new(cart),
                favorites: Mutex::new(favorites),
                orders: Mutex::new(orders),
                handshake: ValidationHandshake::new(ObfuscationCipher::default()),
            }),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the store API client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Get the catalog reader.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<A> {
        &self.inner.catalog
    }

    /// Get the validation handshake (for interaction counters and phase).
    #[must_use]
    pub fn handshake(&self) -> &ValidationHandshake {
        &self.inner.handshake
    }

    /// Lock the cart.
    pub fn cart(&self) -> MutexGuard<'_, CartEngine> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the favorites list.
    pub fn favorites(&self) -> MutexGuard<'_, FavoritesEngine> {
        self.inner
            .favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the order history.
    pub fn orders(&self) -> MutexGuard<'_, OrderHistory> {
        self.inner.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current totals including the delivery fee.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary::new(self.cart().cart_total(), self.inner.config.delivery_fee)
    }

    /// Prepare for a new visit to the checkout screen.
    ///
    /// Interaction counters start from zero on every visit.
    #[must_use]
    pub fn enter_checkout(&self) -> CheckoutSummary {
        self.inner.handshake.counters().reset();
        add_breadcrumb("navigation", "Opened checkout", None);
        self.summary()
    }

    /// Suggest an address for `location`, if geocoding is configured.
    pub async fn suggest_address(&self, location: Coordinates) -> Option<String> {
        match &self.inner.geocoder {
            Some(geocoder) => geocoder.reverse(location).await,
            None => None,
        }
    }

    /// Place an order for the current cart.
    ///
    /// Runs a fresh validation handshake, then submits. While this is in
    /// progress any other call fails with [`CheckoutError::InFlight`].
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`]; the cart is untouched on every error.
    #[instrument(skip_all)]
    pub async fn checkout(
        &self,
        form: &CheckoutForm,
        location: Option<Coordinates>,
        viewport: &ViewportSignals,
    ) -> Result<OrderRecord, CheckoutError> {
        let result = self.run_checkout(form, location, viewport).await;
        match &result {
            Ok(record) => add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_number", record.order_number.as_str())]),
            ),
            Err(e) => e.report(),
        }
        result
    }

    async fn run_checkout(
        &self,
        form: &CheckoutForm,
        location: Option<Coordinates>,
        viewport: &ViewportSignals,
    ) -> Result<OrderRecord, CheckoutError> {
        let form = form.validate()?;
        let location = location.ok_or(CheckoutError::MissingLocation)?;
        if self.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let handshake = &self.inner.handshake;
        let guard = handshake.try_begin()?;
        add_breadcrumb("checkout", "Requested checkout token", None);
        let token = handshake
            .obtain_token(&guard, self.inner.api.as_ref(), viewport)
            .await?;

        // Snapshot after the token arrives so lines edited meanwhile are sent.
        let entries = self.cart().entries().to_vec();
        if entries.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let order = build_order(&form, location, &entries);

        let record = CheckoutSubmitter::new(
            self.inner.api.as_ref(),
            &self.inner.cart,
            &self.inner.orders,
        )
        .submit(token, order)
        .await?;

        drop(guard);
        Ok(record)
    }
}
