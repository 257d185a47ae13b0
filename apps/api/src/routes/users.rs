//! `/users` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::{EmailParams, KeywordParams, PageParams, UserRequest, UserResponse, UsernameParams};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::page_response;
use crate::services::users;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/by-username", get(get_by_username))
        .route("/users/by-email", get(get_by_email))
        .route("/users/search", get(search_users))
        .route("/users/count", get(count_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Response> {
    let page = users::list(&state.db, params.to_request()?).await?;
    Ok(page_response(page.map(UserResponse::from)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(users::get(&state.db, &id).await?.into()))
}

/// POST /users -- the password is stored as an Argon2 hash.
async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = users::create(&state.db, body.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::update(&state.db, &id, body.into_draft()?).await?;
    Ok(Json(user.into()))
}

/// DELETE /users/{id}
///
/// Fails with 400 while the user still owns carts.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    users::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_by_username(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UsernameParams>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::get_by_username(&state.db, &params.username).await?;
    Ok(Json(user.into()))
}

async fn get_by_email(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EmailParams>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::get_by_email(&state.db, &params.email).await?;
    Ok(Json(user.into()))
}

async fn search_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<KeywordParams>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let found = users::search(&state.db, &params.keyword).await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

async fn count_users(State(state): State<AppState>) -> ApiResult<Json<u64>> {
    Ok(Json(users::count(&state.db).await?))
}
