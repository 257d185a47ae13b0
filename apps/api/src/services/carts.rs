//! Cart assembly and cart queries.
//!
//! ## Cart Assembly
//! ```text
//! CartRequest { userId, products: [{productId, quantity}, ...] }
//!      │
//!      ├── user exists?                 no ──► UserNotFound (404)
//!      │
//!      ├── build_lines (request order)  first unknown product ──► ProductNotFound (404)
//!      │     duplicate ids merge by summing quantity
//!      │
//!      └── db.carts().save(&cart)       one transaction, cart row + all lines
//! ```
//! Nothing is written unless every check passes.

use std::collections::{HashMap, HashSet};

use tracing::info;

use storefront_core::analytics;
use storefront_core::cart::build_lines;
use storefront_core::{Cart, CoreError, LineItem, LineRequest, Money, Page, PageRequest, Product};
use storefront_db::Database;

use crate::dto::CartResponse;
use crate::error::ApiResult;

pub async fn list(db: &Database, request: PageRequest) -> ApiResult<Page<CartResponse>> {
    let page = db.carts().find_page(request).await?;
    let products = products_for(db, &page.content).await?;
    let index = index(&products);
    Ok(page.map(|cart| CartResponse::build(&cart, &index)))
}

pub async fn get(db: &Database, id: &str) -> ApiResult<CartResponse> {
    let cart = find(db, id).await?;
    response(db, &cart).await
}

/// Assembles and stores a new cart for `user_id`.
pub async fn create(
    db: &Database,
    user_id: String,
    requested: Vec<LineRequest>,
) -> ApiResult<CartResponse> {
    ensure_user(db, &user_id).await?;
    let lines = resolve_lines(db, &requested).await?;

    let mut cart = Cart::new(user_id.clone());
    cart.replace(user_id, lines);
    db.carts().save(&cart).await?;

    info!(id = %cart.id, user_id = %cart.user_id, lines = cart.len(), "Cart created");
    response(db, &cart).await
}

/// Replaces the owner and every line of an existing cart.
pub async fn update(
    db: &Database,
    id: &str,
    user_id: String,
    requested: Vec<LineRequest>,
) -> ApiResult<CartResponse> {
    let mut cart = find(db, id).await?;
    ensure_user(db, &user_id).await?;
    let lines = resolve_lines(db, &requested).await?;

    cart.replace(user_id, lines);
    db.carts().save(&cart).await?;

    info!(id = %cart.id, lines = cart.len(), "Cart updated");
    response(db, &cart).await
}

pub async fn delete(db: &Database, id: &str) -> ApiResult<()> {
    if !db.carts().delete(id).await? {
        return Err(CoreError::CartNotFound(id.to_string()).into());
    }
    info!(id = %id, "Cart deleted");
    Ok(())
}

pub async fn by_user(db: &Database, user_id: &str) -> ApiResult<Vec<CartResponse>> {
    let carts = db.carts().find_by_user_id(user_id).await?;
    responses(db, &carts).await
}

pub async fn by_product(db: &Database, product_id: &str) -> ApiResult<Vec<CartResponse>> {
    let carts = db.carts().find_by_product_id(product_id).await?;
    responses(db, &carts).await
}

/// Sum of quantities across the user's carts (0 for an unknown user).
pub async fn total_products_for_user(db: &Database, user_id: &str) -> ApiResult<i64> {
    let carts = db.carts().find_by_user_id(user_id).await?;
    Ok(analytics::total_products_for_user(&carts, user_id))
}

/// Carts whose value is strictly greater than `threshold`.
pub async fn with_total_value_above(
    db: &Database,
    threshold: Money,
) -> ApiResult<Vec<CartResponse>> {
    let snapshot = db.snapshot().await?;
    let index = snapshot.product_index();
    Ok(analytics::carts_with_total_value_above(&snapshot, threshold)
        .into_iter()
        .map(|cart| CartResponse::build(cart, &index))
        .collect())
}

// =============================================================================
// Helpers
// =============================================================================

pub(crate) async fn find(db: &Database, id: &str) -> ApiResult<Cart> {
    db.carts()
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::CartNotFound(id.to_string()).into())
}

async fn ensure_user(db: &Database, user_id: &str) -> ApiResult<()> {
    match db.users().find_by_id(user_id).await? {
        Some(_) => Ok(()),
        None => Err(CoreError::UserNotFound(user_id.to_string()).into()),
    }
}

async fn resolve_lines(
    db: &Database,
    requested: &[LineRequest],
) -> ApiResult<Vec<LineItem>> {
    let ids: Vec<String> = requested.iter().map(|r| r.product_id.clone()).collect();
    let known: HashSet<String> = db
        .products()
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    Ok(build_lines(requested, |id| known.contains(id))?)
}

/// Products referenced by any line of `carts`.
pub(crate) async fn products_for(db: &Database, carts: &[Cart]) -> ApiResult<Vec<Product>> {
    let ids: Vec<String> = carts
        .iter()
        .flat_map(|cart| cart.items().map(|line| line.product_id.clone()))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    Ok(db.products().find_by_ids(&ids).await?)
}

pub(crate) fn index(products: &[Product]) -> HashMap<&str, &Product> {
    products.iter().map(|p| (p.id.as_str(), p)).collect()
}

async fn response(db: &Database, cart: &Cart) -> ApiResult<CartResponse> {
    let products = products_for(db, std::slice::from_ref(cart)).await?;
    Ok(CartResponse::build(cart, &index(&products)))
}

async fn responses(db: &Database, carts: &[Cart]) -> ApiResult<Vec<CartResponse>> {
    let products = products_for(db, carts).await?;
    let index = index(&products);
    Ok(carts
        .iter()
        .map(|cart| CartResponse::build(cart, &index))
        .collect())
}
