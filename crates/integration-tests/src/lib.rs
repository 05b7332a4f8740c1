//! Integration tests for Souq.
//!
//! The tests drive a real [`Storefront`] over HTTP against [`FakeStore`], an
//! in-process axum server that speaks the public store API:
//!
//! - `POST api/v1/public/validate` decrypts the fingerprint and issues a
//!   single-use token
//! - `POST api/v1/public/checkout` accepts an order only with the encrypted
//!   form of an issued token
//! - `GET api/v1/public/items` serves a small catalog
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p souq-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use souq_core::{CollectionName, Item, ItemUuid, Price};
use souq_storefront::api::CheckoutRequest;
use souq_storefront::api::types::ValidateRequest;
use souq_storefront::crypto::ObfuscationCipher;
use souq_storefront::{Storefront, StorefrontConfig};
use tokio::task::JoinHandle;

/// First order number the fake store assigns.
pub const FIRST_ORDER_NUMBER: u64 = 1001;

/// How the fake validation authority answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateMode {
    /// Issue a fresh token.
    Grant,
    /// Answer 200 without a token.
    Deny(Option<String>),
    /// Answer with this HTTP status.
    Fail(u16),
}

/// How the fake checkout endpoint answers a correctly authorized order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    Accept,
    Fail(u16),
}

// =============================================================================
// Store State
// =============================================================================

/// Everything the fake store has seen and how it is configured to answer.
#[derive(Debug)]
pub struct StoreState {
    cipher: ObfuscationCipher,
    catalog: Vec<Item>,
    validate_mode: Mutex<ValidateMode>,
    checkout_mode: Mutex<CheckoutMode>,
    validate_delay: Mutex<Duration>,
    issued: Mutex<Vec<String>>,
    fingerprints: Mutex<Vec<Value>>,
    orders: Mutex<Vec<CheckoutRequest>>,
    raw_bodies: Mutex<Vec<Value>>,
    validate_calls: AtomicUsize,
    checkout_calls: AtomicUsize,
    next_token: AtomicU64,
    next_order: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StoreState {
    fn new(catalog: Vec<Item>) -> Self {
        Self {
            cipher: ObfuscationCipher::default(),
            catalog,
            validate_mode: Mutex::new(ValidateMode::Grant),
            checkout_mode: Mutex::new(CheckoutMode::Accept),
            validate_delay: Mutex::new(Duration::ZERO),
            issued: Mutex::new(Vec::new()),
            fingerprints: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            raw_bodies: Mutex::new(Vec::new()),
            validate_calls: AtomicUsize::new(0),
            checkout_calls: AtomicUsize::new(0),
            next_token: AtomicU64::new(1),
            next_order: AtomicU64::new(FIRST_ORDER_NUMBER),
        }
    }

    /// Tokens issued so far, in their raw form.
    #[must_use]
    pub fn issued_tokens(&self) -> Vec<String> {
        lock(&self.issued).clone()
    }

    /// Decrypted fingerprints received by the validation endpoint.
    #[must_use]
    pub fn fingerprints(&self) -> Vec<Value> {
        lock(&self.fingerprints).clone()
    }

    /// Orders the checkout endpoint accepted.
    #[must_use]
    pub fn orders(&self) -> Vec<CheckoutRequest> {
        lock(&self.orders).clone()
    }

    /// Raw JSON bodies of every checkout POST, accepted or not.
    #[must_use]
    pub fn checkout_bodies(&self) -> Vec<Value> {
        lock(&self.raw_bodies).clone()
    }

    #[must_use]
    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn checkout_calls(&self) -> usize {
        self.checkout_calls.load(Ordering::SeqCst)
    }

    /// Consume an issued token if `encrypted` is its encrypted form.
    fn redeem(&self, encrypted: &str) -> bool {
        let Ok(raw) = self.cipher.decrypt_hex(encrypted) else {
            return false;
        };
        let mut issued = lock(&self.issued);
        match issued.iter().position(|t| *t == raw) {
            Some(index) => {
                issued.remove(index);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn validate(
    State(store): State<Arc<StoreState>>,
    Json(body): Json<ValidateRequest>,
) -> Response {
    store.validate_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *lock(&store.validate_delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let fingerprint = store
        .cipher
        .decrypt_hex(&body.check)
        .ok()
        .and_then(|plain| serde_json::from_str::<Value>(&plain).ok());
    let Some(fingerprint) = fingerprint else {
        return Json(json!({"status": "error", "message": "Invalid check"})).into_response();
    };
    lock(&store.fingerprints).push(fingerprint);

    let mode = lock(&store.validate_mode).clone();
    match mode {
        ValidateMode::Grant => {
            let token = format!("tok-{}", store.next_token.fetch_add(1, Ordering::SeqCst));
            lock(&store.issued).push(token.clone());
            Json(json!({"status": "success", "token": token})).into_response()
        }
        ValidateMode::Deny(message) => {
            Json(json!({"status": "error", "message": message})).into_response()
        }
        ValidateMode::Fail(status) => status_response(status, "validation unavailable"),
    }
}

async fn checkout(State(store): State<Arc<StoreState>>, Json(body): Json<Value>) -> Response {
    store.checkout_calls.fetch_add(1, Ordering::SeqCst);
    lock(&store.raw_bodies).push(body.clone());

    let Ok(request) = serde_json::from_value::<CheckoutRequest>(body) else {
        return status_response(400, "Malformed order");
    };
    if !store.redeem(request.token()) {
        return status_response(403, "Invalid token");
    }

    let mode = *lock(&store.checkout_mode);
    match mode {
        CheckoutMode::Accept => {
            let number = store.next_order.fetch_add(1, Ordering::SeqCst);
            lock(&store.orders).push(request);
            Json(json!({"orderNumber": number})).into_response()
        }
        CheckoutMode::Fail(status) => status_response(status, "Order could not be placed"),
    }
}

async fn items(
    State(store): State<Arc<StoreState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(25);
    let keyword = params.get("keyword").map(|k| k.to_lowercase());
    let collection = params.get("collection");

    let matching: Vec<&Item> = store
        .catalog
        .iter()
        .filter(|item| {
            keyword
                .as_ref()
                .is_none_or(|k| item.title.to_lowercase().contains(k))
        })
        .filter(|item| collection.is_none_or(|c| item.collection.as_str() == c.as_str()))
        .collect();

    let page_items: Vec<&Item> = matching
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .copied()
        .collect();

    Json(json!({
        "data": {"items": page_items},
        "currentPage": page,
        "totalRecords": matching.len(),
    }))
    .into_response()
}

fn status_response(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"message": message}))).into_response()
}

// =============================================================================
// Fake Store Server
// =============================================================================

/// A running fake store API bound to a local port.
#[derive(Debug)]
pub struct FakeStore {
    addr: SocketAddr,
    state: Arc<StoreState>,
    server: JoinHandle<()>,
}

impl FakeStore {
    /// Start a fake store serving [`sample_catalog`].
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        Self::with_catalog(sample_catalog()).await
    }

    /// Start a fake store serving `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn with_catalog(catalog: Vec<Item>) -> Self {
        let state = Arc::new(StoreState::new(catalog));
        let app = Router::new()
            .route("/api/v1/public/validate", post(validate))
            .route("/api/v1/public/checkout", post(checkout))
            .route("/api/v1/public/items", get(items))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake store");
        let addr = listener.local_addr().expect("Failed to read local address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the store API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// What the store has seen so far.
    #[must_use]
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn set_validate_mode(&self, mode: ValidateMode) {
        *lock(&self.state.validate_mode) = mode;
    }

    pub fn set_checkout_mode(&self, mode: CheckoutMode) {
        *lock(&self.state.checkout_mode) = mode;
    }

    /// Hold every validation response for `delay`.
    pub fn set_validate_delay(&self, delay: Duration) {
        *lock(&self.state.validate_delay) = delay;
    }

    /// Configuration for a storefront talking to this store.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self, data_dir: &Path) -> StorefrontConfig {
        let vars = HashMap::from([
            ("SOUQ_BASE_URL".to_string(), self.base_url()),
            (
                "SOUQ_DATA_DIR".to_string(),
                data_dir.to_string_lossy().into_owned(),
            ),
            ("SOUQ_ENV".to_string(), "development".to_string()),
            ("SOUQ_REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
        ]);
        StorefrontConfig::from_map(&vars).expect("Fake store configuration is valid")
    }

    /// Open a storefront over HTTP with its state under `data_dir`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn storefront(&self, data_dir: &Path) -> Storefront {
        Storefront::open(self.config(data_dir)).expect("Failed to open storefront")
    }
}

impl Drop for FakeStore {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Build a catalog item.
#[must_use]
pub fn item(uuid: &str, title: &str, price: u32, collection: &str) -> Item {
    Item {
        uuid: ItemUuid::new(uuid),
        title: title.to_string(),
        price: Price::from(price),
        collection: CollectionName::new(collection),
        image: format!("items/{uuid}.jpg"),
    }
}

/// A small catalog across two collections.
#[must_use]
pub fn sample_catalog() -> Vec<Item> {
    vec![
        item("kb-1", "Lamb Kebab", 4000, "Grill"),
        item("tk-2", "Chicken Tikka", 3500, "Grill"),
        item("dl-3", "Dolma", 3000, "Mains"),
        item("bq-4", "Baklava", 1500, "Sweets"),
        item("tea-5", "Iraqi Tea", 500, "Drinks"),
    ]
}
