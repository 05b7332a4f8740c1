//! Catalog browsing and search with a short-lived response cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use souq_core::{CollectionName, Item};

use crate::api::{ApiError, StoreApi};

/// Collection name the store uses for "no filter".
pub const ALL_COLLECTIONS: &str = "All";

/// Page size used when the query does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// A catalog listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    pub keyword: Option<String>,
    pub collection: Option<CollectionName>,
    pub page: u32,
    pub limit: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            collection: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogQuery {
    /// Search by keyword.
    #[must_use]
    pub fn search(keyword: &str) -> Self {
        let keyword = keyword.trim();
        Self {
            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
            ..Self::default()
        }
    }

    /// Browse one collection. `"All"` means every collection.
    #[must_use]
    pub fn in_collection(collection: &str) -> Self {
        let collection = collection.trim();
        Self {
            collection: (!collection.is_empty() && collection != ALL_COLLECTIONS)
                .then(|| CollectionName::new(collection)),
            ..Self::default()
        }
    }

    /// Select a page (1-based).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Query string parameters, omitting unset filters.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(keyword) = &self.keyword {
            params.push(("keyword", keyword.clone()));
        }
        if let Some(collection) = &self.collection {
            params.push(("collection", collection.to_string()));
        }
        params
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub current_page: u32,
    pub total_records: u64,
}

/// Catalog reader with response caching.
///
/// Results are cached for five minutes, up to 1000 distinct queries.
pub struct Catalog<A> {
    api: Arc<A>,
    cache: Cache<CatalogQuery, ItemPage>,
}

impl<A: StoreApi> Catalog<A> {
    /// Create a catalog reader over `api`.
    #[must_use]
    pub fn new(api: Arc<A>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();
        Self { api, cache }
    }

    /// Fetch a page of items, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the store API request fails. Failures are not cached.
    pub async fn search(&self, query: CatalogQuery) -> Result<ItemPage, ApiError> {
        if let Some(page) = self.cache.get(&query).await {
            tracing::debug!(?query, "Catalog cache hit");
            return Ok(page);
        }

        let page = self.api.search_items(&query).await?;
        self.cache.insert(query, page.clone()).await;
        Ok(page)
    }

    /// Drop all cached pages.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
