//! `/cart-products` handlers: cart lines and cart analytics.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::dto::{
    CartLineRequest, CartLineResponse, ProductRevenueResponse, ProductSalesResponse, TopNParams,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::services::cart_products;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart-products/analytics/most-sold", get(most_sold))
        .route("/cart-products/analytics/revenue", get(revenue))
        .route("/cart-products/analytics/total-items", get(total_items))
        .route(
            "/cart-products/analytics/carts-by-product/{product_id}",
            get(carts_by_product),
        )
        .route("/cart-products/{cart_id}", get(list_lines).post(add_line))
        .route("/cart-products/{cart_id}/{product_id}", delete(remove_line))
}

async fn list_lines(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<Json<Vec<CartLineResponse>>> {
    Ok(Json(cart_products::lines(&state.db, &cart_id).await?))
}

/// POST /cart-products/{cartId}
///
/// Responds with the line as it stands after merging.
async fn add_line(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    ApiJson(body): ApiJson<CartLineRequest>,
) -> ApiResult<impl IntoResponse> {
    let line = body.into_line()?;
    let added =
        cart_products::add(&state.db, &cart_id, &line.product_id, line.quantity).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

async fn remove_line(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    cart_products::remove(&state.db, &cart_id, &product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn most_sold(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TopNParams>,
) -> ApiResult<Json<Vec<ProductSalesResponse>>> {
    let top = cart_products::most_sold(&state.db, params.top_n()).await?;
    Ok(Json(top.into_iter().map(Into::into).collect()))
}

/// GET /cart-products/analytics/revenue -- keyed by product id.
async fn revenue(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, ProductRevenueResponse>>> {
    let revenue = cart_products::revenue(&state.db).await?;
    Ok(Json(
        revenue
            .into_iter()
            .map(|(id, entry)| (id, entry.into()))
            .collect(),
    ))
}

async fn total_items(State(state): State<AppState>) -> ApiResult<Json<i64>> {
    Ok(Json(cart_products::total_items(&state.db).await?))
}

async fn carts_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        cart_products::carts_by_product(&state.db, &product_id).await?,
    ))
}
