//! End-to-end checkout over HTTP: guest prompt, the three steps, promo
//! codes and order placement.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{SHIPPING, TestApp};
use ecommerce_hub_storefront::config::SimulatedDelays;

/// Shipping fields plus the submit action for step one.
fn shipping_form() -> Vec<(&'static str, &'static str)> {
    let mut form = SHIPPING.to_vec();
    form.push(("_action", "continue"));
    form
}

async fn guest_at_step_one() -> TestApp {
    guest_at_step_one_with(TestApp::new()).await
}

async fn guest_at_step_one_with(mut app: TestApp) -> TestApp {
    app.add_headphones().await;
    let response = app.post("/checkout/guest", &[]).await;
    assert_eq!(response.redirect(), "/checkout");
    app
}

/// Fill in shipping and pay with PayPal, landing on the review step.
async fn reach_review(app: &mut TestApp) {
    app.post("/checkout/shipping", &shipping_form()).await;
    app.post(
        "/checkout/payment",
        &[("payment_method", "paypal"), ("same_as_shipping", "true")],
    )
    .await;
    assert!(app.get("/checkout").await.body.contains("Step 3: Review"));
}

/// Text of the element with the given id.
fn element_text<'a>(body: &'a str, id: &str) -> &'a str {
    let marker = format!("id=\"{id}\">");
    let start = body.find(&marker).unwrap() + marker.len();
    let end = start + body[start..].find('<').unwrap();
    &body[start..end]
}

#[tokio::test]
async fn test_checkout_with_empty_cart_returns_to_cart() {
    let mut app = TestApp::new();
    let response = app.get("/checkout").await;
    assert_eq!(response.redirect(), "/cart");
}

#[tokio::test]
async fn test_guest_prompt_shown_before_steps() {
    let mut app = TestApp::new();
    app.add_headphones().await;

    let page = app.get("/checkout").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Continue as Guest"));
    assert!(!page.body.contains("Step 1: Shipping"));

    app.post("/checkout/guest", &[]).await;
    let page = app.get("/checkout").await;
    assert!(page.body.contains("Step 1: Shipping"));
}

#[tokio::test]
async fn test_shipping_step_reports_missing_fields() {
    let mut app = guest_at_step_one().await;

    let response = app
        .post("/checkout/shipping", &[("first_name", "Ada"), ("_action", "continue")])
        .await;
    assert_eq!(response.redirect(), "/checkout");

    let page = app.get("/checkout").await;
    assert!(page.body.contains("Step 1: Shipping"));
    assert!(page.body.contains("Last name is required"));
    assert!(page.body.contains("ZIP code is required"));
    assert!(!page.body.contains("First name is required"));
}

#[tokio::test]
async fn test_card_fields_required_for_card_payment() {
    let mut app = guest_at_step_one().await;
    app.post("/checkout/shipping", &shipping_form()).await;

    let page = app.get("/checkout").await;
    assert!(page.body.contains("Step 2: Payment"));

    app.post(
        "/checkout/payment",
        &[("payment_method", "card"), ("same_as_shipping", "true")],
    )
    .await;
    let page = app.get("/checkout").await;
    assert!(page.body.contains("Step 2: Payment"));
    assert!(page.body.contains("Card number is required"));
    assert!(page.body.contains("CVV is required"));
}

#[tokio::test]
async fn test_guest_places_order() {
    let mut app = guest_at_step_one().await;
    app.post("/checkout/shipping", &shipping_form()).await;
    app.post(
        "/checkout/payment",
        &[
            ("payment_method", "card"),
            ("card_number", "4242 4242 4242 4242"),
            ("cardholder_name", "Ada Lovelace"),
            ("expiry_month", "12"),
            ("expiry_year", "2030"),
            ("cvv", "123"),
            ("same_as_shipping", "true"),
        ],
    )
    .await;

    let review = app.get("/checkout").await;
    assert!(review.body.contains("Step 3: Review"));
    assert!(review.body.contains("12 Analytical Way"));

    let response = app.post("/checkout/place-order", &[]).await;
    assert_eq!(response.redirect(), "/checkout/complete");

    let confirmation = app.get("/checkout/complete").await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert!(confirmation.body.contains("Order Confirmed!"));
    assert!(confirmation.body.contains("order-number"));
    assert!(confirmation.body.contains("Premium Wireless Bluetooth Headphones"));

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("Your cart is empty"));

    // A finished flow does not linger: an empty cart goes back to the cart page.
    let response = app.get("/checkout").await;
    assert_eq!(response.redirect(), "/cart");
}

#[tokio::test]
async fn test_place_order_before_review_is_refused() {
    let mut app = guest_at_step_one().await;
    let response = app.post("/checkout/place-order", &[]).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_back_and_edit_move_between_steps() {
    let mut app = guest_at_step_one().await;
    app.post("/checkout/shipping", &shipping_form()).await;
    app.post(
        "/checkout/payment",
        &[("payment_method", "paypal"), ("same_as_shipping", "true")],
    )
    .await;
    assert!(app.get("/checkout").await.body.contains("Step 3: Review"));

    let response = app.post("/checkout/edit/1", &[]).await;
    assert_eq!(response.redirect(), "/checkout");
    let page = app.get("/checkout").await;
    assert!(page.body.contains("Step 1: Shipping"));
    assert!(page.body.contains("value=\"Lovelace\""));

    // Step one has nothing before it but the cart.
    let response = app.post("/checkout/back", &[]).await;
    assert_eq!(response.redirect(), "/cart");

    let response = app.post("/checkout/edit/9", &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_promo_code_lowers_order_total() {
    let mut app = guest_at_step_one().await;

    let response = app.post("/checkout/promo", &[("code", "save10")]).await;
    assert_eq!(response.redirect(), "/checkout");
    let page = app.get("/checkout").await;
    assert!(page.body.contains("SAVE10"));
    assert!(page.body.contains("-$10.00"));

    app.post("/checkout/promo", &[("code", "BOGUS")]).await;
    let page = app.get("/checkout").await;
    assert!(page.body.contains("Invalid promo code"));
    assert!(!page.body.contains("-$10.00"));
}

#[tokio::test]
async fn test_signed_in_shopper_skips_guest_prompt() {
    let mut app = TestApp::new();
    app.add_headphones().await;

    let response = app.post("/checkout/sign-in", &[]).await;
    assert_eq!(response.redirect(), "/login?return_to=%2Fcheckout");

    let response = app.sign_in("/checkout").await;
    assert_eq!(response.redirect(), "/checkout");

    let page = app.get("/checkout").await;
    assert!(!page.body.contains("Continue as Guest"));
    assert!(page.body.contains("Step 1: Shipping"));
}

#[tokio::test]
async fn test_confirmation_total_matches_review() {
    let mut app = guest_at_step_one().await;
    app.post("/checkout/promo", &[("code", "SAVE10")]).await;
    reach_review(&mut app).await;

    let review = app.get("/checkout").await;
    let quoted = element_text(&review.body, "place-order-total").to_string();
    assert_eq!(quoted, element_text(&review.body, "order-total"));

    let response = app.post("/checkout/place-order", &[]).await;
    assert_eq!(response.redirect(), "/checkout/complete");
    let confirmation = app.get("/checkout/complete").await;
    assert_eq!(element_text(&confirmation.body, "order-total"), quoted);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_order_returns_to_review() {
    let app = TestApp::with_delays(SimulatedDelays {
        order: Duration::from_millis(300),
        ..SimulatedDelays::NONE
    });
    let mut app = guest_at_step_one_with(app).await;
    reach_review(&mut app).await;

    // The shopper leaves while the processor is still working.
    let submit = tokio::time::timeout(
        Duration::from_millis(50),
        app.post("/checkout/place-order", &[]),
    )
    .await;
    assert!(submit.is_err());

    let page = app.get("/checkout").await;
    assert!(page.body.contains("Processing your order..."));
    let response = app.post("/checkout/place-order", &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    app.clock.advance(chrono::Duration::seconds(15));
    let page = app.get("/checkout").await;
    assert!(page.body.contains("Step 3: Review"));

    let response = app.post("/checkout/place-order", &[]).await;
    assert_eq!(response.redirect(), "/checkout/complete");
    let confirmation = app.get("/checkout/complete").await;
    assert!(confirmation.body.contains("Order Confirmed!"));
}
