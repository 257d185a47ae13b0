//! Integration tests for `/products`.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, create_product, delete, get, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: create then fetch a product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_product() {
    let (app, _db) = common::build_test_app().await;

    let response = post_json(
        &app,
        "/products",
        json!({
            "title": "Backpack",
            "price": 109.95,
            "description": "Fits 15 inch laptops",
            "category": "bags",
            "image": "https://img.example/backpack.png"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["price"], 109.95);

    let fetched = body_json(get(&app, &format!("/products/{id}")).await).await;
    assert_eq!(fetched, created);
}

// ---------------------------------------------------------------------------
// Test: validation failures return the JSON error body with the path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_product_without_price_is_rejected() {
    let (app, _db) = common::build_test_app().await;

    let response = post_json(
        &app,
        "/products",
        json!({ "title": "Mug", "category": "kitchen" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
    assert_eq!(json["error"], "Invalid request.");
    assert_eq!(json["message"], "price is required");
    assert_eq!(json["path"], "/products");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (app, _db) = common::build_test_app().await;

    let response = post_json(&app, "/products", json!("not an object")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request.");
}

#[tokio::test]
async fn non_positive_price_is_rejected() {
    let (app, _db) = common::build_test_app().await;

    let response = post_json(
        &app,
        "/products",
        json!({ "title": "Mug", "price": 0.0, "category": "kitchen" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: missing product is 404 with the standard message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_product_returns_404_body() {
    let (app, _db) = common::build_test_app().await;

    let response = get(&app, "/products/42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Resource not found with the specified identifier or criteria."
    );
    assert_eq!(json["message"], "Product not found with ID: 42");
    assert_eq!(json["path"], "/products/42");
}

// ---------------------------------------------------------------------------
// Test: update and delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_then_delete_product() {
    let (app, _db) = common::build_test_app().await;
    let id = create_product(&app, "Mug", 8.5, "kitchen").await;

    let response = put_json(
        &app,
        &format!("/products/{id}"),
        json!({ "title": "Big Mug", "price": 12.0, "category": "kitchen" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Big Mug");
    assert_eq!(updated["price"], 12.0);

    let response = delete(&app, &format!("/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(&app, &format!("/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: paging returns 204 past the end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_products_pages_and_204_when_empty() {
    let (app, _db) = common::build_test_app().await;

    let response = get(&app, "/products").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    for (title, price) in [("A", 1.0), ("B", 2.0), ("C", 3.0)] {
        create_product(&app, title, price, "misc").await;
    }

    let json = body_json(get(&app, "/products?page=1&size=2").await).await;
    assert_eq!(json["content"].as_array().unwrap().len(), 1);
    assert_eq!(json["content"][0]["title"], "C");
    assert_eq!(json["page"]["totalElements"], 3);
    assert_eq!(json["page"]["totalPages"], 2);

    let response = get(&app, "/products?page=5&size=2").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Test: search, price range, top N, category averages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_queries() {
    let (app, _db) = common::build_test_app().await;
    create_product(&app, "Laptop Backpack", 100.0, "bags").await;
    create_product(&app, "Tote", 20.0, "bags").await;
    create_product(&app, "Monitor", 300.0, "electronics").await;
    create_product(&app, "Cable", 5.0, "electronics").await;

    let found = body_json(get(&app, "/products/search?keyword=backpack").await).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Laptop Backpack");

    let ranged = body_json(get(&app, "/products/price-range?min=20&max=100").await).await;
    let titles: Vec<&str> = ranged
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Tote", "Laptop Backpack"]);

    let top = body_json(get(&app, "/products/top-expensive?topN=2").await).await;
    assert_eq!(top[0]["title"], "Monitor");
    assert_eq!(top[1]["title"], "Laptop Backpack");

    let cheap = body_json(get(&app, "/products/top-cheapest").await).await;
    assert_eq!(cheap.as_array().unwrap().len(), 4);
    assert_eq!(cheap[0]["title"], "Cable");

    let averages = body_json(get(&app, "/products/average-price-category").await).await;
    assert_eq!(averages["bags"], 60.0);
    assert_eq!(averages["electronics"], 152.5);
}

#[tokio::test]
async fn missing_query_parameter_is_a_bad_request() {
    let (app, _db) = common::build_test_app().await;

    let response = get(&app, "/products/price-range?min=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["path"], "/products/price-range");
}
