//! HTTP route handlers for storefront.
//!
//! Every mutation is a form POST answered with a 303 redirect; pages are
//! server-rendered with Askama.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! POST /newsletter                - Newsletter signup
//! GET  /health                    - Health check
//!
//! # Products
//! GET  /products/{id}             - Product detail
//! POST /products/{id}/cart        - Add to cart
//! POST /products/{id}/wishlist    - Save to wishlist
//! POST /products/{id}/reviews     - Submit a review
//!
//! # Cart
//! GET  /cart                      - Cart page
//! POST /cart/update               - Set line quantity
//! POST /cart/remove               - Remove line
//! POST /cart/save-for-later       - Move line to wishlist
//! POST /cart/promo                - Apply or clear promo code
//!
//! # Checkout
//! GET  /checkout                  - Guest prompt, steps or processing view
//! POST /checkout/guest            - Continue as guest
//! POST /checkout/sign-in          - Sign in, then return to checkout
//! POST /checkout/shipping         - Save shipping step (and continue)
//! POST /checkout/shipping/saved   - Fill shipping from a saved address
//! POST /checkout/payment          - Save payment step (and continue)
//! POST /checkout/payment/saved    - Pay with a saved card
//! POST /checkout/back             - Previous step
//! POST /checkout/edit/{step}      - Jump back to an earlier step
//! POST /checkout/promo            - Apply or clear promo code
//! POST /checkout/place-order      - Submit the order
//! GET  /checkout/complete         - Order confirmation
//!
//! # Auth
//! GET  /login                     - Login page
//! POST /login                     - Password sign-in (rate limited)
//! POST /login/captcha             - New captcha challenge
//! POST /login/social/{provider}   - Social sign-in
//! POST /logout                    - Sign out
//!
//! # Account (requires auth)
//! GET  /account                   - Dashboard tabs
//! POST /account/wishlist/remove   - Remove wishlist entry
//! POST /account/wishlist/move-to-cart - Move wishlist entry to cart
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod newsletter;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::login_rate_limiter;
use crate::models::LocalStorage;
use crate::state::AppState;

/// Header data shared by every page: cart badge and sign-in state.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub cart_count: u32,
    pub user_email: Option<String>,
}

impl Layout {
    #[must_use]
    pub fn from_storage(storage: &LocalStorage) -> Self {
        Self {
            cart_count: storage.cart().item_count(),
            user_email: storage.current_user().map(|user| user.email),
        }
    }
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Render the not-found page with a 404 status.
#[must_use]
pub fn not_found_page(layout: Layout) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { layout }).into_response()
}

/// Fallback for unmatched paths.
pub async fn fallback(storage: Result<LocalStorage, AppError>) -> Response {
    not_found_page(storage.as_ref().map(Layout::from_storage).unwrap_or_default())
}

/// Split a posted form into `(name, value)` updates, dropping control
/// fields (names starting with `_`).
fn field_updates(fields: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    fields
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

/// Value of a control field such as `_action`.
fn control<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/cart", post(products::add_to_cart))
        .route("/{id}/wishlist", post(products::add_to_wishlist))
        .route("/{id}/reviews", post(products::submit_review))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/save-for-later", post(cart::save_for_later))
        .route("/promo", post(cart::apply_promo))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/guest", post(checkout::continue_as_guest))
        .route("/sign-in", post(checkout::sign_in))
        .route("/shipping", post(checkout::save_shipping))
        .route("/shipping/saved", post(checkout::use_saved_address))
        .route("/payment", post(checkout::save_payment))
        .route("/payment/saved", post(checkout::use_saved_payment))
        .route("/back", post(checkout::back))
        .route("/edit/{step}", post(checkout::edit))
        .route("/promo", post(checkout::apply_promo))
        .route("/place-order", post(checkout::place_order))
        .route("/complete", get(checkout::complete))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(login_rate_limiter())),
        )
        .route("/login/captcha", post(auth::refresh_captcha))
        .route("/login/social/{provider}", post(auth::social_login))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/wishlist/remove", post(account::remove_from_wishlist))
        .route("/wishlist/move-to-cart", post(account::move_to_cart))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/newsletter", post(newsletter::subscribe))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .merge(auth_routes())
        .fallback(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_field_updates_skip_control_fields() {
        let posted = fields(&[("_action", "save"), ("first_name", "Ada"), ("city", "Paris")]);
        let updates: Vec<_> = field_updates(&posted).collect();
        assert_eq!(updates, [("first_name", "Ada"), ("city", "Paris")]);
        assert_eq!(control(&posted, "_action"), Some("save"));
        assert_eq!(control(&posted, "_missing"), None);
    }
}
