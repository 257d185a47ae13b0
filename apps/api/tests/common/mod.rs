#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use storefront_api::config::{ApiConfig, ServerConfig};
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_db::{Database, DbConfig};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8080,
        request_timeout_secs: 30,
        cors_origins: vec!["http://localhost:3000".to_string()],
    }
}

/// Build the full application router over a fresh in-memory database.
///
/// Returns the database too so tests can arrange state directly.
pub async fn build_test_app() -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    let config = ApiConfig {
        server: test_config(),
        ..ApiConfig::default()
    };
    let server = config.server.clone();
    let app = build_app_router(AppState::new(db.clone(), config), &server);
    (app, db)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures (created through the API, returning the new id)
// ---------------------------------------------------------------------------

pub async fn create_product(app: &Router, title: &str, price: f64, category: &str) -> String {
    let response = post_json(
        app,
        "/products",
        json!({ "title": title, "price": price, "category": category }),
    )
    .await;
    assert_eq!(response.status(), 201, "create product {title}");
    body_json(response).await["id"].as_str().unwrap().to_string()
}

pub async fn create_user(app: &Router, username: &str, email: &str) -> String {
    let response = post_json(
        app,
        "/users",
        json!({ "username": username, "email": email, "password": "secret-pass" }),
    )
    .await;
    assert_eq!(response.status(), 201, "create user {username}");
    body_json(response).await["id"].as_str().unwrap().to_string()
}

pub async fn create_cart(app: &Router, user_id: &str, lines: &[(&str, i64)]) -> String {
    let products: Vec<Value> = lines
        .iter()
        .map(|(id, qty)| json!({ "productId": id, "quantity": qty }))
        .collect();
    let response = post_json(
        app,
        "/carts",
        json!({ "userId": user_id, "products": products }),
    )
    .await;
    assert_eq!(response.status(), 201, "create cart for {user_id}");
    body_json(response).await["id"].as_str().unwrap().to_string()
}
