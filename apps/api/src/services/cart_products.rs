//! Cart line operations and the cart/product analytics.
//!
//! ## Adding a Line
//! ```text
//! POST /cart-products/{cartId} { productId: "3", quantity: 3 }
//!
//! cart has  [ {p1, 2}, {p3, 1} ]
//!                         │
//!        add_line("3", 3) │ increment-if-present
//!                         ▼
//! cart has  [ {p1, 2}, {p3, 4} ]  ──► save (one transaction) ──► 201 {p3, 4}
//! ```
//!
//! Analytics read a [`Snapshot`](storefront_core::Snapshot) so carts and
//! products come from the same read transaction.

use std::collections::BTreeMap;

use tracing::info;

use storefront_core::analytics::{self, ProductRevenue, ProductSales};
use storefront_core::validation::{validate_id, validate_quantity};
use storefront_core::CoreError;
use storefront_db::Database;

use crate::dto::{line_responses, CartLineResponse};
use crate::error::ApiResult;
use crate::services::carts;

/// Lines of a cart with product title and price.
pub async fn lines(db: &Database, cart_id: &str) -> ApiResult<Vec<CartLineResponse>> {
    let cart = carts::find(db, cart_id).await?;
    let products = carts::products_for(db, std::slice::from_ref(&cart)).await?;
    Ok(line_responses(&cart, &carts::index(&products)))
}

/// Adds `quantity` of a product to a cart, merging into an existing line.
pub async fn add(
    db: &Database,
    cart_id: &str,
    product_id: &str,
    quantity: i64,
) -> ApiResult<CartLineResponse> {
    validate_id("productId", product_id)?;
    validate_quantity(quantity)?;

    let mut cart = carts::find(db, cart_id).await?;
    let product = db
        .products()
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let merged = cart.add_line(product_id, quantity)?.quantity;
    db.carts().save(&cart).await?;

    info!(
        cart_id = %cart.id,
        product_id = %product_id,
        added = quantity,
        quantity = merged,
        "Cart line added"
    );
    Ok(CartLineResponse::new(&product, merged))
}

/// Removes a product's line from a cart.
pub async fn remove(db: &Database, cart_id: &str, product_id: &str) -> ApiResult<()> {
    let mut cart = carts::find(db, cart_id).await?;
    cart.remove_line(product_id)?;
    db.carts().save(&cart).await?;

    info!(cart_id = %cart.id, product_id = %product_id, "Cart line removed");
    Ok(())
}

pub async fn most_sold(db: &Database, top_n: i64) -> ApiResult<Vec<ProductSales>> {
    let snapshot = db.snapshot().await?;
    Ok(analytics::most_sold(&snapshot, top_n))
}

/// Revenue per product id, ordered by id.
pub async fn revenue(db: &Database) -> ApiResult<BTreeMap<String, ProductRevenue>> {
    let snapshot = db.snapshot().await?;
    Ok(analytics::revenue_per_product(&snapshot))
}

pub async fn total_items(db: &Database) -> ApiResult<i64> {
    let carts = db.carts().find_all().await?;
    Ok(analytics::total_items(&carts))
}

pub async fn carts_by_product(db: &Database, product_id: &str) -> ApiResult<Vec<String>> {
    let carts = db.carts().find_all().await?;
    Ok(analytics::carts_containing_product(&carts, product_id))
}
