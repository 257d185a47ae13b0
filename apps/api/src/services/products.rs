//! Product catalogue operations.

use std::collections::BTreeMap;

use tracing::info;

use storefront_core::analytics;
use storefront_core::validation::parse_amount;
use storefront_core::{CoreError, Page, PageRequest, Product, ProductDraft, SortDirection};
use storefront_db::Database;

use crate::error::ApiResult;

pub async fn list(db: &Database, request: PageRequest) -> ApiResult<Page<Product>> {
    Ok(db.products().find_page(request).await?)
}

pub async fn get(db: &Database, id: &str) -> ApiResult<Product> {
    db.products()
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
}

pub async fn create(db: &Database, draft: ProductDraft) -> ApiResult<Product> {
    let product = Product::new(draft);
    db.products().insert(&product).await?;
    info!(id = %product.id, title = %product.title, "Product created");
    Ok(product)
}

pub async fn update(db: &Database, id: &str, draft: ProductDraft) -> ApiResult<Product> {
    let mut product = get(db, id).await?;
    product.apply(draft);
    db.products().update(&product).await?;
    info!(id = %product.id, "Product updated");
    Ok(product)
}

/// Deletes a product and, through the cascade, every cart line for it.
pub async fn delete(db: &Database, id: &str) -> ApiResult<()> {
    if !db.products().delete(id).await? {
        return Err(CoreError::ProductNotFound(id.to_string()).into());
    }
    info!(id = %id, "Product deleted");
    Ok(())
}

pub async fn search(db: &Database, keyword: &str) -> ApiResult<Vec<Product>> {
    Ok(db.products().search_title_or_description(keyword).await?)
}

pub async fn top_expensive(db: &Database, top_n: i64) -> ApiResult<Vec<Product>> {
    let products = db
        .products()
        .find_all_sorted_by_price(SortDirection::Descending)
        .await?;
    Ok(analytics::top_expensive(products, top_n))
}

pub async fn top_cheapest(db: &Database, top_n: i64) -> ApiResult<Vec<Product>> {
    let products = db
        .products()
        .find_all_sorted_by_price(SortDirection::Ascending)
        .await?;
    Ok(analytics::top_cheapest(products, top_n))
}

pub async fn average_price_per_category(db: &Database) -> ApiResult<BTreeMap<String, f64>> {
    let products = db.products().find_all().await?;
    Ok(analytics::average_price_per_category(&products))
}

/// Products priced within `[min, max]`; an inverted range is empty.
pub async fn price_range(db: &Database, min: f64, max: f64) -> ApiResult<Vec<Product>> {
    let min = parse_amount("min", min)?;
    let max = parse_amount("max", max)?;
    Ok(db.products().find_by_price_between(min, max).await?)
}
