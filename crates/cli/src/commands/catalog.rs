//! Catalog search.

use souq_storefront::Storefront;
use souq_storefront::api::ApiError;
use souq_storefront::catalog::CatalogQuery;

/// List catalog items matching a keyword or collection.
///
/// # Errors
///
/// Returns an error if the store API request fails.
pub async fn search(
    storefront: &Storefront,
    keyword: Option<&str>,
    collection: Option<&str>,
    page: u32,
) -> Result<(), ApiError> {
    let query = match (keyword, collection) {
        (Some(keyword), _) => CatalogQuery::search(keyword),
        (None, Some(collection)) => CatalogQuery::in_collection(collection),
        (None, None) => CatalogQuery::default(),
    }
    .page(page);

    let result = storefront.catalog().search(query).await?;
    if result.items.is_empty() {
        println!("No items found");
        return Ok(());
    }

    let favorites = storefront.favorites();
    for item in &result.items {
        let marker = if favorites.is_favorite(&item.uuid) { "*" } else { " " };
        println!(
            "{marker} {:<30} {:>12}  {:<12} [{}]",
            item.title,
            item.price.display(),
            item.collection,
            item.uuid
        );
    }
    println!(
        "Page {} ({} items total)",
        result.current_page, result.total_records
    );
    Ok(())
}
