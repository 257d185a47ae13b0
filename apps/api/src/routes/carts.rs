//! `/carts` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::{CartRequest, CartResponse, MinTotalParams, PageParams};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::page_response;
use crate::services::carts;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/carts", get(list_carts).post(create_cart))
        .route("/carts/total-value", get(total_value_above))
        .route("/carts/user/{user_id}", get(carts_by_user))
        .route("/carts/user/{user_id}/total-products", get(total_products))
        .route("/carts/product/{product_id}", get(carts_by_product))
        .route(
            "/carts/{id}",
            get(get_cart).put(update_cart).delete(delete_cart),
        )
}

async fn list_carts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Response> {
    let page = carts::list(&state.db, params.to_request()?).await?;
    Ok(page_response(page))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    Ok(Json(carts::get(&state.db, &id).await?))
}

/// POST /carts
///
/// 404 if the user or any listed product does not exist; nothing is stored
/// in that case.
async fn create_cart(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CartRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user_id, lines) = body.into_parts()?;
    let cart = carts::create(&state.db, user_id, lines).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// PUT /carts/{id} -- replaces owner and all lines.
async fn update_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CartRequest>,
) -> ApiResult<Json<CartResponse>> {
    let (user_id, lines) = body.into_parts()?;
    Ok(Json(carts::update(&state.db, &id, user_id, lines).await?))
}

async fn delete_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    carts::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn carts_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<CartResponse>>> {
    Ok(Json(carts::by_user(&state.db, &user_id).await?))
}

async fn total_products(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<i64>> {
    Ok(Json(
        carts::total_products_for_user(&state.db, &user_id).await?,
    ))
}

async fn carts_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<CartResponse>>> {
    Ok(Json(carts::by_product(&state.db, &product_id).await?))
}

/// GET /carts/total-value?minTotal= -- strictly greater than `minTotal`.
async fn total_value_above(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MinTotalParams>,
) -> ApiResult<Json<Vec<CartResponse>>> {
    let threshold = params.threshold()?;
    Ok(Json(
        carts::with_total_value_above(&state.db, threshold).await?,
    ))
}
