//! `/products` handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::{
    KeywordParams, PageParams, PriceRangeParams, ProductRequest, ProductResponse, TopNParams,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::page_response;
use crate::services::products;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/top-expensive", get(top_expensive))
        .route("/products/top-cheapest", get(top_cheapest))
        .route("/products/average-price-category", get(average_price_per_category))
        .route("/products/price-range", get(price_range))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// GET /products?page=&size=
///
/// Returns 204 if the requested page is empty.
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Response> {
    let page = products::list(&state.db, params.to_request()?).await?;
    Ok(page_response(page.map(ProductResponse::from)))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let product = products::get(&state.db, &id).await?;
    Ok(Json(product.into()))
}

/// POST /products
async fn create_product(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = products::create(&state.db, body.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// PUT /products/{id}
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = products::update(&state.db, &id, body.into_draft()?).await?;
    Ok(Json(product.into()))
}

/// DELETE /products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    products::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /products/search?keyword=
async fn search_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<KeywordParams>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let found = products::search(&state.db, &params.keyword).await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

/// GET /products/top-expensive?topN=
async fn top_expensive(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TopNParams>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let top = products::top_expensive(&state.db, params.top_n()).await?;
    Ok(Json(top.into_iter().map(Into::into).collect()))
}

/// GET /products/top-cheapest?topN=
async fn top_cheapest(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TopNParams>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let top = products::top_cheapest(&state.db, params.top_n()).await?;
    Ok(Json(top.into_iter().map(Into::into).collect()))
}

/// GET /products/average-price-category
async fn average_price_per_category(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, f64>>> {
    Ok(Json(products::average_price_per_category(&state.db).await?))
}

/// GET /products/price-range?min=&max=
async fn price_range(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PriceRangeParams>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let found = products::price_range(&state.db, params.min, params.max).await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}
