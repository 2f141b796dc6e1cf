//! Cart route handlers.
//!
//! The cart lives in the local-storage snapshot under `shopping-cart`; the
//! applied promo lives in the session and carries into checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use ecommerce_hub_core::cart::{CartError, CartItem, CartSummary};
use ecommerce_hub_core::checkout::{AppliedPromo, resolve_promo};
use ecommerce_hub_core::Money;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use super::products::{ProductCardView, cart_error_message};
use crate::catalog::CART_SUGGESTIONS;
use crate::error::Result;
use crate::models::{LocalStorage, session, session_keys};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub line_id: String,
    pub product_id: String,
    pub name: String,
    pub variant: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub stock: u32,
    pub line_total: String,
    pub image: String,
    pub at_stock_limit: bool,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            line_id: item.line_id.clone(),
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            variant: item.variant.clone(),
            unit_price: item.unit_price.to_string(),
            quantity: item.quantity,
            stock: item.stock,
            line_total: item.line_total().to_string(),
            image: item.image.clone(),
            at_stock_limit: item.quantity >= item.stock,
        }
    }
}

/// Cart totals display data for templates.
#[derive(Debug, Clone)]
pub struct CartSummaryView {
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub free_shipping: bool,
    pub free_shipping_remaining: Option<String>,
    pub discount: Option<String>,
    pub total: String,
}

impl From<&CartSummary> for CartSummaryView {
    fn from(summary: &CartSummary) -> Self {
        let free_shipping = summary.shipping == Money::ZERO;
        let remaining = CartSummary::free_shipping_threshold() - summary.subtotal;
        Self {
            item_count: summary.item_count,
            subtotal: summary.subtotal.to_string(),
            tax: summary.tax.to_string(),
            shipping: if free_shipping {
                "FREE".to_string()
            } else {
                summary.shipping.to_string()
            },
            free_shipping,
            free_shipping_remaining: (!free_shipping && !remaining.is_negative())
                .then(|| remaining.to_string()),
            discount: (summary.discount != Money::ZERO).then(|| summary.discount.to_string()),
            total: summary.total.to_string(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub items: Vec<CartLineView>,
    pub summary: CartSummaryView,
    pub promo_code: Option<String>,
    pub promo_error: Option<String>,
    pub notice: Option<String>,
    pub suggestions: Vec<ProductCardView>,
    pub saved_count: usize,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: String,
}

/// Form naming a single cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub line_id: String,
}

/// Promo code form data.
#[derive(Debug, Deserialize)]
pub struct PromoForm {
    #[serde(default)]
    pub code: String,
}

/// The promo applied on the cart page, if any.
///
/// # Errors
///
/// Returns the session store error.
pub async fn applied_promo(session: &Session) -> Result<Option<AppliedPromo>> {
    Ok(session::read(session, session_keys::APPLIED_PROMO).await?)
}

/// Display cart page.
#[instrument(skip(state, storage))]
pub async fn show(State(state): State<AppState>, storage: LocalStorage) -> Result<Response> {
    let session = storage.session();
    let cart = storage.cart();
    let promo = applied_promo(session).await?;
    let promo_error = session::take::<String>(session, session_keys::PROMO_ERROR).await?;
    let notice = session::take::<String>(session, session_keys::CART_NOTICE).await?;

    let discount = promo.as_ref().map_or(Money::ZERO, |promo| promo.discount);
    let summary = CartSummary::compute(&cart, discount);

    Ok(CartShowTemplate {
        layout: Layout::from_storage(&storage),
        items: cart.items().iter().map(CartLineView::from).collect(),
        summary: CartSummaryView::from(&summary),
        promo_code: promo.map(|promo| promo.code),
        promo_error,
        notice,
        suggestions: state
            .catalog()
            .select(&CART_SUGGESTIONS)
            .into_iter()
            .map(ProductCardView::from)
            .collect(),
        saved_count: storage.wishlist().len(),
    }
    .into_response())
}

async fn refuse(storage: &LocalStorage, err: &CartError) -> Result<Response> {
    tracing::debug!(error = %err, "Cart change refused");
    storage
        .session()
        .insert(session_keys::CART_NOTICE, cart_error_message(err))
        .await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Set a line's quantity (1 to stock).
#[instrument(skip(storage))]
pub async fn update(mut storage: LocalStorage, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = storage.cart();
    let result = form
        .quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| {
            let max = cart.line(&form.line_id).map_or(0, |line| line.stock);
            CartError::QuantityOutOfRange { requested: 0, max }
        })
        .and_then(|quantity| cart.set_quantity(&form.line_id, quantity));

    if let Err(err) = result {
        return refuse(&storage, &err).await;
    }
    storage.set_cart(&cart)?;
    storage.save().await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Remove a line.
#[instrument(skip(storage))]
pub async fn remove(mut storage: LocalStorage, Form(form): Form<LineForm>) -> Result<Response> {
    let mut cart = storage.cart();
    if let Err(err) = cart.remove(&form.line_id) {
        return refuse(&storage, &err).await;
    }
    storage.set_cart(&cart)?;
    storage.save().await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Move a line to the wishlist.
#[instrument(skip(state, storage))]
pub async fn save_for_later(
    State(state): State<AppState>,
    mut storage: LocalStorage,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut cart = storage.cart();
    let mut wishlist = storage.wishlist();
    if let Err(err) = cart.save_for_later(&form.line_id, &mut wishlist, state.now()) {
        return refuse(&storage, &err).await;
    }
    storage.set_cart(&cart)?;
    storage.set_wishlist(&wishlist)?;
    storage.save().await?;
    storage
        .session()
        .insert(session_keys::CART_NOTICE, "Saved for later")
        .await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Record the outcome of a promo submission in the session.
///
/// An empty code clears the promo; an unknown code clears it and leaves a
/// one-shot error.
///
/// # Errors
///
/// Returns the session store error.
pub async fn store_promo(session: &Session, code: &str) -> Result<Option<AppliedPromo>> {
    if code.trim().is_empty() {
        session
            .remove::<AppliedPromo>(session_keys::APPLIED_PROMO)
            .await?;
        return Ok(None);
    }
    match resolve_promo(code) {
        Ok(found) => {
            let applied = AppliedPromo::from(found);
            session.insert(session_keys::APPLIED_PROMO, &applied).await?;
            tracing::info!(code = %applied.code, "Promo applied");
            Ok(Some(applied))
        }
        Err(err) => {
            session
                .remove::<AppliedPromo>(session_keys::APPLIED_PROMO)
                .await?;
            session
                .insert(session_keys::PROMO_ERROR, err.to_string())
                .await?;
            Ok(None)
        }
    }
}

/// Apply or clear a promo code.
#[instrument(skip(storage))]
pub async fn apply_promo(storage: LocalStorage, Form(form): Form<PromoForm>) -> Result<Response> {
    store_promo(storage.session(), &form.code).await?;
    Ok(Redirect::to("/cart").into_response())
}
