//! Session keys and typed access helpers.
//!
//! The local-storage snapshot is one value; the remaining keys hold state
//! that only lives as long as the visit, such as the checkout flow and the
//! login gate.

use serde::de::DeserializeOwned;
use tower_sessions::Session;
use tower_sessions::session::Error;
use tracing::warn;

/// Session keys for per-visitor state.
pub mod keys {
    /// Serialized `MemoryStore` with the fixed local-storage layout.
    pub const LOCAL_STORAGE: &str = "local_storage";

    /// The in-progress `CheckoutFlow`.
    pub const CHECKOUT_FLOW: &str = "checkout_flow";

    /// Set once the visitor chose to continue as a guest.
    pub const GUEST_PROMPT_DISMISSED: &str = "guest_prompt_dismissed";

    /// Promo applied on the cart page, carried into checkout.
    pub const APPLIED_PROMO: &str = "applied_promo";

    /// One-shot promo error shown on the next cart page render.
    pub const PROMO_ERROR: &str = "promo_error";

    /// One-shot notice shown on the next cart page render.
    pub const CART_NOTICE: &str = "cart_notice";

    /// One-shot notice shown on the next product page render.
    pub const PRODUCT_NOTICE: &str = "product_notice";

    /// Confirmation of the most recently placed order.
    pub const LAST_ORDER: &str = "last_order";

    /// Every order placed in this session, newest last.
    pub const SESSION_ORDERS: &str = "session_orders";

    /// The `LoginGate` tracking failed sign-in attempts.
    pub const LOGIN_GATE: &str = "login_gate";
}

/// Read a typed session value; a value that no longer decodes reads as
/// absent.
///
/// # Errors
///
/// Returns the session store error.
pub async fn read<T: DeserializeOwned>(session: &Session, key: &str) -> Result<Option<T>, Error> {
    match session.get::<T>(key).await {
        Err(Error::SerdeJson(err)) => {
            warn!(key, error = %err, "Discarding unreadable session value");
            Ok(None)
        }
        other => other,
    }
}

/// Remove and return a one-shot value.
///
/// # Errors
///
/// Returns the session store error.
pub async fn take<T: DeserializeOwned>(session: &Session, key: &str) -> Result<Option<T>, Error> {
    match session.remove::<T>(key).await {
        Err(Error::SerdeJson(err)) => {
            warn!(key, error = %err, "Discarding unreadable session value");
            Ok(None)
        }
        other => other,
    }
}
