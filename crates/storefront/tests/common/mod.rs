//! In-process test client for the storefront router.
//!
//! Requests go straight through `tower::ServiceExt::oneshot`; the session
//! cookie is carried between calls like a browser would.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use ecommerce_hub_core::clock::ManualClock;
use ecommerce_hub_storefront::app;
use ecommerce_hub_storefront::config::{SimulatedDelays, StorefrontConfig};
use ecommerce_hub_storefront::middleware::create_session_layer;
use ecommerce_hub_storefront::state::AppState;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// A demo shopper's shipping details, accepted by presence-only validation.
pub const SHIPPING: [(&str, &str); 11] = [
    ("first_name", "Ada"),
    ("last_name", "Lovelace"),
    ("email", "ada@example.com"),
    ("phone", "555-0100"),
    ("address", "12 Analytical Way"),
    ("apartment", ""),
    ("city", "Austin"),
    ("state", "TX"),
    ("zip_code", "73301"),
    ("country", "US"),
    ("delivery_option", "standard"),
];

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Assert a 303 redirect and return its target.
    pub fn redirect(&self) -> &str {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        self.location.as_deref().expect("redirect without Location")
    }
}

pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_delays(SimulatedDelays::NONE)
    }

    pub fn with_delays(delays: SimulatedDelays) -> Self {
        let config = StorefrontConfig {
            delays,
            ..StorefrontConfig::default()
        };
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap(),
        ));
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::with_clock(config, clock.clone());
        Self {
            router: app(state, session_layer),
            cookie: None,
            clock,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Add the first demo product to the cart.
    pub async fn add_headphones(&mut self) {
        let response = self.post("/products/1/cart", &[("quantity", "1")]).await;
        assert_eq!(response.redirect(), "/cart");
    }

    /// Sign in with a demo account, landing on `return_to`.
    pub async fn sign_in(&mut self, return_to: &str) -> TestResponse {
        self.post(
            "/login",
            &[
                ("email", "customer@example.com"),
                ("password", "customer123"),
                ("return_to", return_to),
            ],
        )
        .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
