//! Cart page over HTTP: quantities, stock limits, save-for-later and
//! promo codes.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use common::TestApp;

/// First cart line id on the cart page.
fn first_line_id(body: &str) -> String {
    let start = body.find("id=\"line-").unwrap() + "id=\"line-".len();
    let end = body[start..].find('"').unwrap();
    body[start..start + end].to_string()
}

#[tokio::test]
async fn test_empty_cart() {
    let mut app = TestApp::new();
    let page = app.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_to_cart_updates_badge_and_notice() {
    let mut app = TestApp::new();
    app.add_headphones().await;

    let page = app.get("/cart").await;
    assert!(page.body.contains("Premium Wireless Bluetooth Headphones added to your cart"));
    assert!(page.body.contains("$199.99"));
    assert!(page.body.contains("FREE"));

    // The notice is shown once.
    let page = app.get("/cart").await;
    assert!(!page.body.contains("added to your cart"));
}

#[tokio::test]
async fn test_quantity_limited_by_stock() {
    let mut app = TestApp::new();
    app.add_headphones().await;
    let line_id = first_line_id(&app.get("/cart").await.body);

    let response = app
        .post("/cart/update", &[("line_id", &line_id), ("quantity", "2")])
        .await;
    assert_eq!(response.redirect(), "/cart");
    assert!(app.get("/cart").await.body.contains("$399.98"));

    app.post("/cart/update", &[("line_id", &line_id), ("quantity", "99")])
        .await;
    let page = app.get("/cart").await;
    assert!(page.body.contains("Please choose a quantity between 1 and 15"));
    assert!(page.body.contains("$399.98"));
}

#[tokio::test]
async fn test_remove_unknown_line_shows_notice() {
    let mut app = TestApp::new();
    app.add_headphones().await;

    app.post("/cart/remove", &[("line_id", "does-not-exist")]).await;
    let page = app.get("/cart").await;
    assert!(page.body.contains("That item is no longer in your cart"));
    assert!(!page.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_save_for_later_moves_line_to_wishlist() {
    let mut app = TestApp::new();
    app.add_headphones().await;
    let line_id = first_line_id(&app.get("/cart").await.body);

    let response = app.post("/cart/save-for-later", &[("line_id", &line_id)]).await;
    assert_eq!(response.redirect(), "/cart");

    let page = app.get("/cart").await;
    assert!(page.body.contains("Saved for later"));
    assert!(page.body.contains("Your cart is empty"));
    assert!(page.body.contains("1 saved for later"));
}

#[tokio::test]
async fn test_cart_promo_code() {
    let mut app = TestApp::new();
    app.add_headphones().await;

    app.post("/cart/promo", &[("code", " welcome20 ")]).await;
    let page = app.get("/cart").await;
    assert!(page.body.contains("WELCOME20"));
    assert!(page.body.contains("-$20.00"));

    app.post("/cart/promo", &[("code", "NOPE")]).await;
    let page = app.get("/cart").await;
    assert!(page.body.contains("Invalid promo code"));
    assert!(!page.body.contains("-$20.00"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut app = TestApp::new();
    let page = app.get("/products/999").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("Page Not Found"));

    let response = app.post("/products/999/cart", &[("quantity", "1")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let mut app = TestApp::new();
    let page = app.get("/no/such/page").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("Page Not Found"));

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");
}
