pub mod cart_products;
pub mod carts;
pub mod health;
pub mod products;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;

use storefront_core::Page;

use crate::state::AppState;

/// Build the resource route tree.
///
/// Route hierarchy:
///
/// ```text
/// /products                                        list (paged), create
/// /products/{id}                                   get, update, delete
/// /products/search?keyword=                        title/description search
/// /products/top-expensive?topN=                    most expensive first
/// /products/top-cheapest?topN=                     cheapest first
/// /products/average-price-category                 mean price per category
/// /products/price-range?min=&max=                  inclusive price filter
///
/// /users                                           list (paged), create
/// /users/{id}                                      get, update, delete
/// /users/by-username?username=                     exact username
/// /users/by-email?email=                           exact email
/// /users/search?keyword=                           username search
/// /users/count                                     number of users
///
/// /carts                                           list (paged), create
/// /carts/{id}                                      get, update, delete
/// /carts/user/{userId}                             carts of a user
/// /carts/user/{userId}/total-products              summed quantities
/// /carts/product/{productId}                       carts containing product
/// /carts/total-value?minTotal=                     carts worth more than minTotal
///
/// /cart-products/{cartId}                          lines of a cart, add line
/// /cart-products/{cartId}/{productId}              remove line
/// /cart-products/analytics/most-sold?topN=         best sellers
/// /cart-products/analytics/revenue                 revenue per product
/// /cart-products/analytics/total-items             summed quantities
/// /cart-products/analytics/carts-by-product/{id}   cart ids containing product
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(users::router())
        .merge(carts::router())
        .merge(cart_products::router())
}

/// 200 with the page envelope, or 204 when the page has no content.
pub(crate) fn page_response<T: Serialize>(page: Page<T>) -> Response {
    if page.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(page).into_response()
    }
}
