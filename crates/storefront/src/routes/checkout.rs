//! Checkout route handlers.
//!
//! One `CheckoutFlow` per session drives the pages: the guest prompt, the
//! three steps, the processing view and the confirmation. Each POST updates
//! the flow and redirects back to `/checkout`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use std::time::Duration;

use chrono::{Datelike, TimeDelta};
use ecommerce_hub_core::Money;
use ecommerce_hub_core::cart::CartItem;
use ecommerce_hub_core::checkout::{
    AppliedPromo, CheckoutError, CheckoutFlow, CheckoutPhase, DeliveryOption, FieldErrors,
    OrderConfirmation, OrderTotals, PaymentDescriptor, PaymentForm, PaymentMethod, SavedAddress,
    SavedPaymentMethod, ShippingForm, Step,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CartLineView, PromoForm, applied_promo, store_promo};
use super::{Layout, control, field_updates};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::login_redirect;
use crate::models::{LocalStorage, session, session_keys};
use crate::services::{account, orders};
use crate::state::AppState;

/// Country choices offered on the shipping step.
pub const COUNTRIES: [(&str, &str); 4] = [
    ("US", "United States"),
    ("CA", "Canada"),
    ("UK", "United Kingdom"),
    ("AU", "Australia"),
];

/// State choices offered on the shipping step.
pub const STATES: [(&str, &str); 4] = [
    ("CA", "California"),
    ("NY", "New York"),
    ("TX", "Texas"),
    ("FL", "Florida"),
];

/// How many expiry years the payment step offers.
const EXPIRY_YEARS: i32 = 10;

/// Step indicator entry.
#[derive(Debug, Clone)]
pub struct StepView {
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub current: bool,
}

/// A `<select>` or radio choice.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub description: String,
    pub price: Option<String>,
    pub selected: bool,
}

/// Order summary totals.
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub delivery: String,
    pub tax: String,
    pub discount: Option<String>,
    pub total: String,
}

impl From<&OrderTotals> for TotalsView {
    fn from(totals: &OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            delivery: totals.delivery.to_string(),
            tax: totals.tax.to_string(),
            discount: (totals.discount != Money::ZERO).then(|| totals.discount.to_string()),
            total: totals.total.to_string(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub guest_prompt: bool,
    pub processing: bool,
    pub step: u8,
    pub step_title: &'static str,
    pub steps: Vec<StepView>,
    pub shipping: ShippingForm,
    pub payment: PaymentForm,
    pub errors: FieldErrors,
    pub countries: Vec<ChoiceView>,
    pub states: Vec<ChoiceView>,
    pub delivery_options: Vec<ChoiceView>,
    pub payment_methods: Vec<ChoiceView>,
    pub expiry_months: Vec<ChoiceView>,
    pub expiry_years: Vec<ChoiceView>,
    pub card_fields: bool,
    pub saved_addresses: Vec<SavedAddress>,
    pub saved_payments: Vec<SavedPaymentMethod>,
    pub delivery_label: String,
    pub payment_label: String,
    pub items: Vec<CartLineView>,
    pub totals: TotalsView,
    pub promo_code: Option<String>,
    pub promo_error: Option<String>,
}

/// Confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CompleteTemplate {
    pub layout: Layout,
    pub order_number: String,
    pub placed_at: String,
    pub estimated_delivery: String,
    pub items: Vec<CartLineView>,
    pub unit_count: u32,
    pub totals: TotalsView,
    pub ship_to: String,
    pub address_lines: Vec<String>,
    pub delivery_label: String,
    pub payment_label: String,
    pub promo_code: Option<String>,
}

/// Saved address selection.
#[derive(Debug, Deserialize)]
pub struct SavedAddressForm {
    pub address_id: String,
}

/// Saved card selection.
#[derive(Debug, Deserialize)]
pub struct SavedPaymentForm {
    pub payment_id: String,
}

fn choices<'a>(
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
    selected: &str,
) -> Vec<ChoiceView> {
    options
        .into_iter()
        .map(|(value, label)| ChoiceView {
            value: value.to_string(),
            label: label.to_string(),
            description: String::new(),
            price: None,
            selected: value == selected,
        })
        .collect()
}

fn step_views(current: Step) -> Vec<StepView> {
    Step::ALL
        .into_iter()
        .map(|step| StepView {
            number: step.number(),
            title: step.title(),
            description: step.description(),
            completed: step < current,
            current: step == current,
        })
        .collect()
}

fn delivery_choices(selected: DeliveryOption) -> Vec<ChoiceView> {
    DeliveryOption::ALL
        .into_iter()
        .map(|option| ChoiceView {
            value: option.id().to_string(),
            label: option.name().to_string(),
            description: option.description().to_string(),
            price: Some(option.price().to_string()),
            selected: option == selected,
        })
        .collect()
}

fn payment_choices(selected: PaymentMethod) -> Vec<ChoiceView> {
    PaymentMethod::ALL
        .into_iter()
        .map(|method| ChoiceView {
            value: method.id().to_string(),
            label: method.name().to_string(),
            description: method.description().to_string(),
            price: None,
            selected: method == selected,
        })
        .collect()
}

fn expiry_choices(payment: &PaymentForm, this_year: i32) -> (Vec<ChoiceView>, Vec<ChoiceView>) {
    let months: Vec<String> = (1..=12).map(|month| format!("{month:02}")).collect();
    let years: Vec<String> = (this_year..this_year + EXPIRY_YEARS)
        .map(|year| year.to_string())
        .collect();
    (
        choices(
            months.iter().map(|m| (m.as_str(), m.as_str())),
            &payment.expiry_month,
        ),
        choices(
            years.iter().map(|y| (y.as_str(), y.as_str())),
            &payment.expiry_year,
        ),
    )
}

/// Load the session's flow, starting a fresh one when none is in progress.
/// How long past the simulated processing delay a submission may stay
/// pending before it is returned to review.
const ORDER_STALL_GRACE: Duration = Duration::from_secs(10);

async fn load_flow(state: &AppState, storage: &LocalStorage) -> Result<CheckoutFlow> {
    let session = storage.session();
    let stored = session::read::<CheckoutFlow>(session, session_keys::CHECKOUT_FLOW).await?;
    let mut flow = match stored {
        Some(flow) if flow.phase() != CheckoutPhase::Completed => flow,
        _ => {
            let dismissed = session::read::<bool>(session, session_keys::GUEST_PROMPT_DISMISSED)
                .await?
                .unwrap_or(false);
            CheckoutFlow::new(
                storage.is_authenticated() || dismissed,
                state.config().validation,
            )
        }
    };
    if storage.is_authenticated() {
        flow.dismiss_guest_prompt();
    }
    let timeout = TimeDelta::from_std(state.config().delays.order.saturating_add(ORDER_STALL_GRACE))
        .unwrap_or(TimeDelta::MAX);
    if flow.recover_stalled(state.now(), timeout) {
        tracing::warn!("Abandoned order submission returned to review");
    }
    Ok(flow)
}

async fn save_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session.insert(session_keys::CHECKOUT_FLOW, flow).await?;
    Ok(())
}

fn to_checkout() -> Response {
    Redirect::to("/checkout").into_response()
}

/// Render the guest prompt, the current step or the processing view.
#[instrument(skip(state, storage))]
pub async fn show(State(state): State<AppState>, storage: LocalStorage) -> Result<Response> {
    let cart = storage.cart();
    let session = storage.session();
    let mut flow = load_flow(&state, &storage).await?;

    if cart.is_empty() && flow.phase() != CheckoutPhase::Processing {
        return Ok(Redirect::to("/cart").into_response());
    }

    if flow.phase() == CheckoutPhase::Steps {
        flow.set_promo(applied_promo(session).await?);
    }
    save_flow(session, &flow).await?;
    let promo_error = session::take::<String>(session, session_keys::PROMO_ERROR).await?;

    let form = flow.form();
    let signed_in = storage.is_authenticated();
    let (expiry_months, expiry_years) = expiry_choices(&form.payment, state.now().year());
    let totals = flow.totals(cart.items());

    Ok(CheckoutTemplate {
        layout: Layout::from_storage(&storage),
        guest_prompt: flow.phase() == CheckoutPhase::GuestPrompt,
        processing: flow.phase() == CheckoutPhase::Processing,
        step: flow.step().number(),
        step_title: flow.step().title(),
        steps: step_views(flow.step()),
        shipping: form.shipping.clone(),
        payment: form.payment.clone(),
        errors: flow.errors().clone(),
        countries: choices(COUNTRIES, &form.shipping.country),
        states: choices(STATES, &form.shipping.state),
        delivery_options: delivery_choices(form.shipping.delivery_option),
        payment_methods: payment_choices(form.payment.payment_method),
        expiry_months,
        expiry_years,
        card_fields: form.payment.payment_method.requires_card()
            && !form.payment.uses_saved_method(),
        saved_addresses: if signed_in {
            account::saved_checkout_addresses()
        } else {
            Vec::new()
        },
        saved_payments: if signed_in {
            account::saved_payment_methods()
        } else {
            Vec::new()
        },
        delivery_label: form.shipping.delivery_option.name().to_string(),
        payment_label: PaymentDescriptor::from_form(&form.payment).masked(),
        items: cart.items().iter().map(CartLineView::from).collect(),
        totals: TotalsView::from(&totals),
        promo_code: flow.promo().map(|promo| promo.code.clone()),
        promo_error,
    }
    .into_response())
}

/// Leave the guest prompt without signing in.
#[instrument(skip(state, storage))]
pub async fn continue_as_guest(
    State(state): State<AppState>,
    storage: LocalStorage,
) -> Result<Response> {
    let session = storage.session();
    session
        .insert(session_keys::GUEST_PROMPT_DISMISSED, true)
        .await?;
    let mut flow = load_flow(&state, &storage).await?;
    flow.dismiss_guest_prompt();
    save_flow(session, &flow).await?;
    Ok(to_checkout())
}

/// Send a guest to the login page, returning to checkout afterwards.
pub async fn sign_in() -> Redirect {
    login_redirect("/checkout")
}

/// Apply posted step fields. `defaults` are applied first so that
/// unchecked checkboxes read as `false`.
fn apply_fields(
    flow: &mut CheckoutFlow,
    defaults: &[(&str, &str)],
    fields: &[(String, String)],
) -> Result<()> {
    let updates = defaults.iter().copied().chain(field_updates(fields));
    flow.update(updates)?;
    Ok(())
}

/// Save the step and, unless `_action=save`, validate and move on.
async fn submit_step(
    state: &AppState,
    storage: &LocalStorage,
    step: Step,
    defaults: &[(&str, &str)],
    fields: &[(String, String)],
) -> Result<Response> {
    let mut flow = load_flow(state, storage).await?;
    if flow.phase() != CheckoutPhase::Steps || flow.step() != step {
        return Ok(to_checkout());
    }
    apply_fields(&mut flow, defaults, fields)?;
    if control(fields, "_action") != Some("save") {
        let passed = flow.advance()?;
        tracing::debug!(step = step.number(), passed, "Checkout step submitted");
    }
    save_flow(storage.session(), &flow).await?;
    Ok(to_checkout())
}

/// Save the shipping step.
#[instrument(skip(state, storage, fields))]
pub async fn save_shipping(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    submit_step(
        &state,
        &storage,
        Step::Shipping,
        &[("save_address", "false")],
        &fields,
    )
    .await
}

/// Save the payment step.
#[instrument(skip(state, storage, fields))]
pub async fn save_payment(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    submit_step(
        &state,
        &storage,
        Step::Payment,
        &[("same_as_shipping", "false"), ("save_payment_method", "false")],
        &fields,
    )
    .await
}

/// Fill the shipping step from a saved address.
#[instrument(skip(state, storage))]
pub async fn use_saved_address(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(form): Form<SavedAddressForm>,
) -> Result<Response> {
    if !storage.is_authenticated() {
        return Ok(to_checkout());
    }
    let saved = account::saved_checkout_addresses()
        .into_iter()
        .find(|address| address.id == form.address_id)
        .ok_or_else(|| AppError::NotFound(format!("saved address {}", form.address_id)))?;
    let mut flow = load_flow(&state, &storage).await?;
    flow.use_saved_address(&saved)?;
    save_flow(storage.session(), &flow).await?;
    Ok(to_checkout())
}

/// Pay with a saved card.
#[instrument(skip(state, storage))]
pub async fn use_saved_payment(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(form): Form<SavedPaymentForm>,
) -> Result<Response> {
    if !storage.is_authenticated() {
        return Ok(to_checkout());
    }
    let saved = account::saved_payment_methods()
        .into_iter()
        .find(|method| method.id == form.payment_id)
        .ok_or_else(|| AppError::NotFound(format!("saved payment method {}", form.payment_id)))?;
    let mut flow = load_flow(&state, &storage).await?;
    flow.use_saved_payment(&saved)?;
    save_flow(storage.session(), &flow).await?;
    Ok(to_checkout())
}

/// Go back one step; from shipping, back to the cart.
#[instrument(skip(state, storage))]
pub async fn back(State(state): State<AppState>, storage: LocalStorage) -> Result<Response> {
    let mut flow = load_flow(&state, &storage).await?;
    if flow.phase() != CheckoutPhase::Steps || flow.step() == Step::FIRST {
        return Ok(Redirect::to("/cart").into_response());
    }
    flow.retreat()?;
    save_flow(storage.session(), &flow).await?;
    Ok(to_checkout())
}

/// Jump back to an earlier step from the review page.
#[instrument(skip(state, storage))]
pub async fn edit(
    State(state): State<AppState>,
    storage: LocalStorage,
    Path(number): Path<u8>,
) -> Result<Response> {
    let step = Step::from_number(number)
        .ok_or_else(|| AppError::BadRequest(format!("no checkout step {number}")))?;
    let mut flow = load_flow(&state, &storage).await?;
    if !flow.edit(step)? {
        tracing::debug!(step = number, "Ignoring forward jump");
    }
    save_flow(storage.session(), &flow).await?;
    Ok(to_checkout())
}

/// Apply or clear a promo code from the order summary.
#[instrument(skip(state, storage))]
pub async fn apply_promo(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(form): Form<PromoForm>,
) -> Result<Response> {
    let applied = store_promo(storage.session(), &form.code).await?;
    let mut flow = load_flow(&state, &storage).await?;
    flow.set_promo(applied);
    save_flow(storage.session(), &flow).await?;
    Ok(to_checkout())
}

/// Submit the order, wait for the simulated processor and show the
/// confirmation.
#[instrument(skip(state, storage))]
pub async fn place_order(
    State(state): State<AppState>,
    mut storage: LocalStorage,
) -> Result<Response> {
    let session = storage.session().clone();
    let mut cart = storage.cart();
    let mut flow = load_flow(&state, &storage).await?;

    match flow.begin_order(cart.items(), state.now()) {
        Ok(()) => {}
        Err(CheckoutError::PaymentInvalid) => {
            save_flow(&session, &flow).await?;
            return Ok(to_checkout());
        }
        Err(CheckoutError::EmptyCart) => return Ok(Redirect::to("/cart").into_response()),
        Err(err) => return Err(err.into()),
    }
    // Persist the processing phase first so a second submit is refused.
    save_flow(&session, &flow).await?;
    session.save().await?;

    add_breadcrumb("checkout", "Order submitted", None);
    orders::process_payment(&state.config().delays).await;

    let items: Vec<CartItem> = cart.items().to_vec();
    let confirmation = flow.complete(items, state.now())?;
    save_flow(&session, &flow).await?;

    cart.clear();
    storage.set_cart(&cart)?;
    storage.save().await?;
    session
        .remove::<AppliedPromo>(session_keys::APPLIED_PROMO)
        .await?;

    session
        .insert(session_keys::LAST_ORDER, &confirmation)
        .await?;
    let mut placed = session::read::<Vec<OrderConfirmation>>(&session, session_keys::SESSION_ORDERS)
        .await?
        .unwrap_or_default();
    placed.push(confirmation.clone());
    session
        .insert(session_keys::SESSION_ORDERS, &placed)
        .await?;

    tracing::info!(
        order_number = %confirmation.order_number,
        total = %confirmation.totals.total,
        units = confirmation.unit_count(),
        "Order placed"
    );
    Ok(Redirect::to("/checkout/complete").into_response())
}

/// Show the confirmation of the last placed order.
#[instrument(skip(storage))]
pub async fn complete(storage: LocalStorage) -> Result<Response> {
    let Some(order) =
        session::read::<OrderConfirmation>(storage.session(), session_keys::LAST_ORDER).await?
    else {
        return Ok(to_checkout());
    };

    let shipping = &order.shipping;
    let address_lines = [
        shipping.address.trim().to_string(),
        shipping.apartment.trim().to_string(),
        format!(
            "{}, {} {}",
            shipping.city.trim(),
            shipping.state.trim(),
            shipping.zip_code.trim()
        ),
        shipping.country.trim().to_string(),
    ]
    .into_iter()
    .filter(|line| !line.is_empty())
    .collect();

    Ok(CompleteTemplate {
        layout: Layout::from_storage(&storage),
        order_number: order.order_number.to_string(),
        placed_at: order.placed_at.format("%B %-d, %Y").to_string(),
        estimated_delivery: order.estimated_delivery_display(),
        items: order.items.iter().map(CartLineView::from).collect(),
        unit_count: order.unit_count(),
        totals: TotalsView::from(&order.totals),
        ship_to: shipping.full_name(),
        address_lines,
        delivery_label: order.delivery_option.name().to_string(),
        payment_label: order.payment.masked(),
        promo_code: order.promo_code.clone(),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_step_views_mark_progress() {
        let steps = step_views(Step::Payment);
        assert!(steps[0].completed);
        assert!(steps[1].current);
        assert!(!steps[2].completed && !steps[2].current);
    }

    #[test]
    fn test_expiry_choices_start_this_year() {
        let payment = PaymentForm {
            expiry_month: "07".to_string(),
            expiry_year: "2028".to_string(),
            ..PaymentForm::default()
        };
        let (months, years) = expiry_choices(&payment, 2026);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].value, "01");
        assert!(months[6].selected);
        assert_eq!(years.first().map(|y| y.value.as_str()), Some("2026"));
        assert_eq!(years.len(), 10);
        assert!(years[2].selected);
    }

    #[test]
    fn test_apply_fields_defaults_unchecked_boxes() {
        let mut flow = CheckoutFlow::new(true, Default::default());
        let posted = vec![
            ("_action".to_string(), "save".to_string()),
            ("first_name".to_string(), "Ada".to_string()),
        ];
        apply_fields(&mut flow, &[("save_address", "false")], &posted).unwrap();
        assert_eq!(flow.form().shipping.first_name, "Ada");
        assert!(!flow.form().shipping.save_address);
    }
}
