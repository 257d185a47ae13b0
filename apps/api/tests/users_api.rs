//! Integration tests for `/users`.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_cart, create_product, create_user, delete, get, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: create hides the password and stores a hash
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_user_stores_hashed_password() {
    let (app, db) = common::build_test_app().await;

    let response = post_json(
        &app,
        "/users",
        json!({ "username": "ana", "email": "ana@mail.com", "password": "secret-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["username"], "ana");
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());

    let id = json["id"].as_str().unwrap();
    let stored = db.users().find_by_id(id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "secret-pass");
    assert!(storefront_core::password::verify_password("secret-pass", &stored.password_hash).unwrap());
}

// ---------------------------------------------------------------------------
// Test: duplicate email is rejected on create and update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (app, _db) = common::build_test_app().await;
    create_user(&app, "ana", "ana@mail.com").await;
    let bob = create_user(&app, "bob", "bob@mail.com").await;

    let response = post_json(
        &app,
        "/users",
        json!({ "username": "ana2", "email": "ana@mail.com", "password": "secret-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Email address already in use.");
    assert_eq!(
        json["message"],
        "The email address 'ana@mail.com' is already associated with an existing account."
    );

    let response = put_json(
        &app,
        &format!("/users/{bob}"),
        json!({ "username": "bob", "email": "ana@mail.com", "password": "secret-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Keeping one's own email is fine.
    let response = put_json(
        &app,
        &format!("/users/{bob}"),
        json!({ "username": "bobby", "email": "bob@mail.com", "password": "new-secret" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "bobby");
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let (app, _db) = common::build_test_app().await;

    let response = post_json(
        &app,
        "/users",
        json!({ "username": "ana", "email": "not-an-email", "password": "secret-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: lookups by username, email, keyword and count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_lookups() {
    let (app, _db) = common::build_test_app().await;
    create_user(&app, "johnd", "john@gmail.com").await;
    create_user(&app, "mor_2314", "morrison@gmail.com").await;

    let json = body_json(get(&app, "/users/by-username?username=johnd").await).await;
    assert_eq!(json["email"], "john@gmail.com");

    let json = body_json(get(&app, "/users/by-email?email=morrison@gmail.com").await).await;
    assert_eq!(json["username"], "mor_2314");

    let response = get(&app, "/users/by-username?username=nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "User not found with username: nobody"
    );

    let found = body_json(get(&app, "/users/search?keyword=JOHN").await).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    assert_eq!(body_json(get(&app, "/users/count").await).await, 2);

    let page = body_json(get(&app, "/users?size=1").await).await;
    assert_eq!(page["content"][0]["username"], "johnd");
    assert_eq!(page["page"]["totalPages"], 2);
}

// ---------------------------------------------------------------------------
// Test: a user owning carts cannot be deleted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_user_with_carts_is_a_constraint_error() {
    let (app, _db) = common::build_test_app().await;
    let user = create_user(&app, "ana", "ana@mail.com").await;
    let product = create_product(&app, "Mug", 5.0, "kitchen").await;
    let cart = create_cart(&app, &user, &[(&product, 1)]).await;

    let response = delete(&app, &format!("/users/{user}")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Database integrity violation.");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Database error detected: "));

    assert_eq!(
        delete(&app, &format!("/carts/{cart}")).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        delete(&app, &format!("/users/{user}")).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(&app, &format!("/users/{user}")).await.status(),
        StatusCode::NOT_FOUND
    );
}
