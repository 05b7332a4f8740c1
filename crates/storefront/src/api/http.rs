//! HTTP implementation of [`StoreApi`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use souq_core::OrderNumber;
use tracing::instrument;
use url::Url;

use super::types::{
    CheckoutRequest, CheckoutResponse, ItemsResponse, ValidateRequest, ValidateResponse,
};
use super::{ApiError, StoreApi, TokenVerdict};
use crate::catalog::{CatalogQuery, ItemPage};
use crate::config::StorefrontConfig;

const VALIDATE_PATH: &str = "api/v1/public/validate";
const CHECKOUT_PATH: &str = "api/v1/public/checkout";
const ITEMS_PATH: &str = "api/v1/public/items";

/// Store API client over HTTP.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct HttpStoreApi {
    inner: Arc<HttpStoreApiInner>,
}

struct HttpStoreApiInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpStoreApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStoreApi")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpStoreApi {
    /// Create a client for the configured store.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("souq-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpStoreApiInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        read_json(response).await
    }
}

async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

impl StoreApi for HttpStoreApi {
    #[instrument(skip(self, check))]
    async fn validate(&self, check: &str) -> Result<TokenVerdict, ApiError> {
        let body = ValidateRequest {
            check: check.to_string(),
        };
        let response: ValidateResponse = self.post_json(VALIDATE_PATH, &body).await?;
        Ok(response.into_verdict())
    }

    #[instrument(skip(self, request), fields(lines = request.data().items.len()))]
    async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderNumber, ApiError> {
        let response: CheckoutResponse = self.post_json(CHECKOUT_PATH, request).await?;
        tracing::info!(order_number = %response.order_number, "Order accepted");
        Ok(response.order_number)
    }

    #[instrument(skip(self))]
    async fn search_items(&self, query: &CatalogQuery) -> Result<ItemPage, ApiError> {
        let url = self.endpoint(ITEMS_PATH)?;
        let response = self
            .inner
            .client
            .get(url)
            .query(&query.to_params())
            .send()
            .await?;
        let body: ItemsResponse = read_json(response).await?;

        Ok(ItemPage {
            current_page: body.current_page.unwrap_or(query.page),
            total_records: body.total_records.unwrap_or_default(),
            items: body.data.into_items(),
        })
    }
}
