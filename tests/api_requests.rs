//! End-to-end marketplace walkthrough plus request-shape edge cases.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bigdecimal::BigDecimal;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use readhub_backend::app::AppState;
use readhub_backend::{create_router, create_router_with_cors};
use readhub_backend::test_utils::MockGateway;

fn test_app() -> Router {
    let gateway = Arc::new(MockGateway::new());
    let state = Arc::new(AppState::new(
        gateway.clone(),
        gateway.clone(),
        gateway.clone(),
        gateway,
    ));
    create_router(state)
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// A seller lists a book, a buyer registers, logs in, and buys it.
#[tokio::test]
async fn test_marketplace_walkthrough() {
    let app = test_app();

    // Seller and buyer sign up
    let (status, seller) = request(
        &app,
        "POST",
        "/api/users",
        Some(json!({
            "username": "seller",
            "email": "seller@readhub.io",
            "password": "s3cret",
            "walletAddress": "bc1qseller"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let seller_id = seller["id"].as_i64().unwrap();

    let (status, buyer) = request(
        &app,
        "POST",
        "/api/users",
        Some(json!({
            "username": "buyer",
            "email": "buyer@readhub.io",
            "password": "pa55",
            "walletAddress": "bc1qbuyer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let buyer_id = buyer["id"].as_i64().unwrap();
    assert_ne!(seller_id, buyer_id);

    // Seller lists a book
    let (status, book) = request(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "userId": seller_id,
            "title": "Mastering Bitcoin",
            "description": "Programming the open blockchain",
            "author": "Andreas Antonopoulos",
            "publisher": "O'Reilly",
            "year": 2017,
            "coverImageUrl": "https://covers.example/mb.png",
            "priceBTC": "0.0021",
            "quantity": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let book_id = book["id"].as_i64().unwrap();

    // Buyer finds it in the catalogue
    let (_, listing) = request(&app, "GET", "/api/books", None).await;
    assert_eq!(listing.as_array().unwrap().len(), 1);

    // Buyer logs in
    let (status, login) = request(
        &app,
        "POST",
        "/api/users/login",
        Some(json!({"email": "buyer@readhub.io", "password": "pa55"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["success"], true);

    // The sale is recorded at the listed price
    let (status, tx) = request(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "buyerUserId": buyer_id,
            "sellerUserId": seller_id,
            "bookId": book_id,
            "amountBTC": "0.0021"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        BigDecimal::from_str(tx["amountBTC"].as_str().unwrap()).unwrap(),
        BigDecimal::from_str("0.0021").unwrap()
    );

    // Both parties see the sale in their histories
    let (_, bought) = request(
        &app,
        "GET",
        &format!("/api/transactions/buyer/{buyer_id}"),
        None,
    )
    .await;
    assert_eq!(bought.as_array().unwrap().len(), 1);

    let (_, sold) = request(
        &app,
        "GET",
        &format!("/api/transactions/seller/{seller_id}"),
        None,
    )
    .await;
    assert_eq!(sold.as_array().unwrap().len(), 1);

    // The listing comes down; the transaction record stays
    let (status, _) = request(&app, "DELETE", &format!("/api/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = request(&app, "GET", "/api/transactions", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

/// Deleting a seller leaves their listings and sales untouched.
#[tokio::test]
async fn test_orphaned_records_survive_user_deletion() {
    let app = test_app();

    request(
        &app,
        "POST",
        "/api/users",
        Some(json!({
            "username": "seller",
            "email": "seller@readhub.io",
            "password": "s3cret",
            "walletAddress": "bc1qseller"
        })),
    )
    .await;

    request(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "userId": 1,
            "title": "T",
            "description": "D",
            "author": "A",
            "publisher": "P",
            "year": 2020,
            "coverImageUrl": "http://img",
            "priceBTC": "0.5",
            "quantity": 1
        })),
    )
    .await;

    let (status, _) = request(&app, "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, book) = request(&app, "GET", "/api/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["userId"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app();

    let (status, _) = request(&app, "GET", "/api/reviews", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let app = test_app();

    let (status, _) = request(&app, "DELETE", "/api/users", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_malformed_json_is_a_client_error() {
    let app = test_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let gateway = Arc::new(MockGateway::new());
    let state = Arc::new(AppState::new(
        gateway.clone(),
        gateway.clone(),
        gateway.clone(),
        gateway,
    ));
    let app = create_router_with_cors(state, "http://localhost:5173");

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/books")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
}
