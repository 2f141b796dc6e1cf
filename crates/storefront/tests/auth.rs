//! Sign-in over HTTP: demo accounts, the captcha and cooldown gate and
//! the account dashboard behind it.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestApp;

/// Solve the captcha shown on the login page.
fn captcha_answer(body: &str) -> String {
    let marker = "id=\"captcha-challenge\">";
    let start = body.find(marker).unwrap() + marker.len();
    let end = body[start..].find("</span>").unwrap();
    let parts: Vec<&str> = body[start..start + end].split_whitespace().collect();
    let left: i32 = parts[0].parse().unwrap();
    let right: i32 = parts[2].parse().unwrap();
    let answer = if parts[1] == "+" { left + right } else { left - right };
    answer.to_string()
}

async fn wrong_password(app: &mut TestApp, captcha: Option<&str>) -> String {
    let mut form = vec![
        ("email", "customer@example.com"),
        ("password", "wrong"),
        ("return_to", "/account"),
    ];
    if let Some(answer) = captcha {
        form.push(("captcha_answer", answer));
    }
    let response = app.post("/login", &form).await;
    response.redirect().to_string()
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let mut app = TestApp::new();
    let response = app.get("/account?tab=orders").await;
    assert_eq!(
        response.redirect(),
        "/login?return_to=%2Faccount%3Ftab%3Dorders"
    );
}

#[tokio::test]
async fn test_demo_account_signs_in_and_out() {
    let mut app = TestApp::new();
    let response = app.sign_in("/account").await;
    assert_eq!(response.redirect(), "/account");

    let page = app.get("/account").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Welcome back"));
    assert!(page.body.contains("customer@example.com"));

    // Signed-in visitors skip the login page.
    let response = app.get("/login").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = app.post("/logout", &[]).await;
    assert_eq!(response.redirect(), "/");
    let response = app.get("/account").await;
    assert_eq!(response.redirect(), "/login?return_to=%2Faccount");
}

#[tokio::test]
async fn test_wrong_password_shows_error() {
    let mut app = TestApp::new();
    let location = wrong_password(&mut app, None).await;
    assert!(location.starts_with("/login?error=credentials"));

    let page = app.get(&location).await;
    assert!(page.body.contains("login-error"));
    assert!(page.body.contains("Invalid email or password"));
    assert!(!page.body.contains("captcha-challenge"));
}

#[tokio::test]
async fn test_incomplete_form_does_not_count_as_failure() {
    let mut app = TestApp::new();
    for _ in 0..4 {
        let response = app
            .post("/login", &[("email", "customer@example.com"), ("password", "")])
            .await;
        assert!(response.redirect().starts_with("/login?error=missing"));
    }
    let page = app.get("/login").await;
    assert!(!page.body.contains("captcha-challenge"));
}

#[tokio::test]
async fn test_captcha_then_cooldown_after_repeated_failures() {
    let mut app = TestApp::new();
    for _ in 0..3 {
        wrong_password(&mut app, None).await;
    }

    let page = app.get("/login").await;
    assert!(page.body.contains("captcha-challenge"));

    // Correct password without the captcha is still refused.
    let response = app.sign_in("/account").await;
    assert!(response.redirect().starts_with("/login?error=captcha"));

    for _ in 0..2 {
        let answer = captcha_answer(&app.get("/login").await.body);
        let location = wrong_password(&mut app, Some(&answer)).await;
        assert!(location.starts_with("/login?error=credentials"));
    }

    let page = app.get("/login").await;
    assert!(page.body.contains("id=\"cooldown\""));
    let answer = captcha_answer(&page.body);
    let location = wrong_password(&mut app, Some(&answer)).await;
    assert!(location.starts_with("/login?error=cooldown"));

    app.clock.advance(Duration::seconds(31));
    let page = app.get("/login").await;
    assert!(!page.body.contains("id=\"cooldown\""));

    let answer = captcha_answer(&page.body);
    let response = app
        .post(
            "/login",
            &[
                ("email", "customer@example.com"),
                ("password", "customer123"),
                ("captcha_answer", &answer),
                ("return_to", "/account"),
            ],
        )
        .await;
    assert_eq!(response.redirect(), "/account");
    assert!(app.get("/account").await.body.contains("Welcome back"));
}

#[tokio::test]
async fn test_social_login() {
    let mut app = TestApp::new();
    let response = app
        .post("/login/social/google", &[("return_to", "/account")])
        .await;
    assert_eq!(response.redirect(), "/account");
    assert_eq!(app.get("/account").await.status, StatusCode::OK);

    let response = app.post("/login/social/myspace", &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_tabs_render() {
    let mut app = TestApp::new();
    app.sign_in("/account").await;

    let page = app.get("/account?tab=orders&status=delivered").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Order History"));

    let page = app.get("/account?tab=wishlist").await;
    assert!(page.body.contains("My Wishlist"));
}
