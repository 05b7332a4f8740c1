//! In-process store API double for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use souq_core::{Item, ItemUuid, OrderNumber, Price};
use tokio::sync::Notify;

use crate::api::types::ValidateResponse;
use crate::api::{ApiError, CheckoutRequest, StoreApi, TokenVerdict};
use crate::catalog::{CatalogQuery, ItemPage};

#[derive(Debug, Clone, Default)]
pub enum ValidateBehavior {
    #[default]
    Grant,
    Deny(Option<String>),
    Fail(u16),
}

#[derive(Debug, Clone, Default)]
pub enum CheckoutBehavior {
    #[default]
    Accept,
    Fail(u16),
}

#[derive(Debug, Default)]
pub struct FakeStoreApi {
    validate: ValidateBehavior,
    checkout: CheckoutBehavior,
    validate_gate: Option<Arc<Notify>>,
    checks: Mutex<Vec<String>>,
    checkouts: Mutex<Vec<CheckoutRequest>>,
    searches: AtomicUsize,
}

impl FakeStoreApi {
    pub const ISSUED_TOKEN: &'static str = "tok-4f1c";
    pub const ORDER_NUMBER: &'static str = "1042";

    pub fn with_validate(mut self, behavior: ValidateBehavior) -> Self {
        self.validate = behavior;
        self
    }

    pub fn with_checkout(mut self, behavior: CheckoutBehavior) -> Self {
        self.checkout = behavior;
        self
    }

    /// Hold every validation response until `gate` is notified.
    pub fn with_validate_gate(mut self, gate: Arc<Notify>) -> Self {
        self.validate_gate = Some(gate);
        self
    }

    pub fn last_check(&self) -> Option<String> {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn checkout_requests(&self) -> Vec<CheckoutRequest> {
        self.checkouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

fn status_error(status: u16) -> ApiError {
    ApiError::Api {
        status,
        message: "fake failure".to_string(),
    }
}

impl StoreApi for FakeStoreApi {
    async fn validate(&self, check: &str) -> Result<TokenVerdict, ApiError> {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(check.to_string());

        if let Some(gate) = &self.validate_gate {
            gate.notified().await;
        }

        let response = match &self.validate {
            ValidateBehavior::Grant => ValidateResponse {
                status: Some("success".to_string()),
                token: Some(Self::ISSUED_TOKEN.to_string()),
                message: None,
            },
            ValidateBehavior::Deny(message) => ValidateResponse {
                status: Some("error".to_string()),
                token: None,
                message: message.clone(),
            },
            ValidateBehavior::Fail(status) => return Err(status_error(*status)),
        };
        Ok(response.into_verdict())
    }

    async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderNumber, ApiError> {
        self.checkouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match self.checkout {
            CheckoutBehavior::Accept => Ok(OrderNumber::new(Self::ORDER_NUMBER)),
            CheckoutBehavior::Fail(status) => Err(status_error(status)),
        }
    }

    async fn search_items(&self, query: &CatalogQuery) -> Result<ItemPage, ApiError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let title = query.keyword.clone().unwrap_or_else(|| "Tea".to_string());
        Ok(ItemPage {
            items: vec![Item {
                uuid: ItemUuid::new(format!("item-{title}")),
                title,
                price: Price::from(750),
                collection: query.collection.clone().unwrap_or_default(),
                image: String::new(),
            }],
            current_page: query.page,
            total_records: 1,
        })
    }
}
