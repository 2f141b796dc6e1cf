//! Authentication route handlers.
//!
//! Password sign-in against the demo accounts, simulated social sign-in and
//! sign-out. Failed attempts are tracked by a per-session `LoginGate`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use ecommerce_hub_core::auth::{
    COOLDOWN_SECONDS, CaptchaChallenge, CaptchaOperator, LoginBlocked, LoginGate,
};
use ecommerce_hub_core::checkout::CheckoutFlow;
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, not_found_page};
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::safe_return_path;
use crate::models::{LocalStorage, session, session_keys};
use crate::services::auth::{AuthError, AuthService, DEMO_ACCOUNTS, SocialProvider};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: Option<String>,
    pub captcha_answer: Option<String>,
    pub return_to: Option<String>,
}

/// Form carrying only the post-login destination.
#[derive(Debug, Deserialize)]
pub struct ReturnForm {
    pub return_to: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub email: Option<String>,
    pub return_to: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Social sign-in button.
#[derive(Debug, Clone)]
pub struct ProviderView {
    pub id: &'static str,
    pub label: &'static str,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub email: String,
    pub return_to: String,
    pub captcha: Option<String>,
    pub cooldown_seconds: Option<i64>,
    pub failed_attempts: u32,
    pub providers: Vec<ProviderView>,
    pub demo_accounts: Vec<(&'static str, &'static str)>,
}

// =============================================================================
// Helpers
// =============================================================================

fn random_challenge() -> CaptchaChallenge {
    let mut rng = rand::rng();
    let operator = if rng.random_bool(0.5) {
        CaptchaOperator::Plus
    } else {
        CaptchaOperator::Minus
    };
    CaptchaChallenge::new(rng.random_range(1..=10), rng.random_range(1..=10), operator)
}

async fn load_gate(session: &Session) -> Result<LoginGate> {
    Ok(session::read::<LoginGate>(session, session_keys::LOGIN_GATE)
        .await?
        .unwrap_or_default())
}

/// Message shown for an error code from the query string.
fn error_message(code: &str, cooldown: Option<i64>) -> Option<String> {
    let message = match code {
        "credentials" => AuthError::InvalidCredentials.to_string(),
        "missing" => AuthError::MissingCredentials.to_string(),
        "invalid_email" => "Please enter a valid email address".to_string(),
        "captcha" => LoginBlocked::CaptchaRequired.to_string(),
        "cooldown" => LoginBlocked::CoolingDown {
            seconds: cooldown.unwrap_or(COOLDOWN_SECONDS),
        }
        .to_string(),
        "social" => "Social sign-in failed. Please try again.".to_string(),
        _ => return None,
    };
    Some(message)
}

fn back_to_login(code: &str, email: &str, return_to: &str) -> Redirect {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", code)
        .append_pair("email", email.trim())
        .append_pair("return_to", return_to)
        .finish();
    Redirect::to(&format!("/login?{query}"))
}

async fn complete_sign_in(
    storage: &mut LocalStorage,
    email: &str,
    remember_me: bool,
) -> Result<()> {
    let session = storage.session().clone();
    session
        .remove::<LoginGate>(session_keys::LOGIN_GATE)
        .await?;
    storage.sign_in(email, remember_me);
    storage.save().await?;
    set_sentry_user(email);
    add_breadcrumb("auth", "Signed in", None);
    tracing::info!(email, remember_me, "Signed in");
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(state, storage))]
pub async fn login_page(
    State(state): State<AppState>,
    storage: LocalStorage,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    let return_to = safe_return_path(query.return_to.as_deref()).to_string();
    if storage.is_authenticated() {
        return Ok(Redirect::to(&return_to).into_response());
    }

    let gate = load_gate(storage.session()).await?;
    let cooldown_seconds = gate.cooldown_remaining(state.now());

    Ok(LoginTemplate {
        layout: Layout::from_storage(&storage),
        error: query
            .error
            .as_deref()
            .and_then(|code| error_message(code, cooldown_seconds)),
        email: query.email.unwrap_or_default(),
        return_to,
        captcha: gate.captcha().map(ToString::to_string),
        cooldown_seconds,
        failed_attempts: gate.failed_attempts(),
        providers: SocialProvider::ALL
            .into_iter()
            .map(|provider| ProviderView {
                id: provider.as_str(),
                label: provider.label(),
            })
            .collect(),
        demo_accounts: DEMO_ACCOUNTS.to_vec(),
    }
    .into_response())
}

/// Handle login form submission.
///
/// The gate is checked before the credentials; only wrong credentials
/// count as a failed attempt.
#[instrument(skip(state, storage, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    mut storage: LocalStorage,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let return_to = safe_return_path(form.return_to.as_deref()).to_string();
    let session = storage.session().clone();
    let mut gate = load_gate(&session).await?;

    if let Err(blocked) = gate.check(state.now(), form.captcha_answer.as_deref()) {
        tracing::debug!(reason = %blocked, "Login attempt blocked");
        let code = match blocked {
            LoginBlocked::CaptchaRequired => "captcha",
            LoginBlocked::CoolingDown { .. } => "cooldown",
        };
        return Ok(back_to_login(code, &form.email, &return_to).into_response());
    }

    let remember_me = form
        .remember_me
        .as_deref()
        .is_some_and(|value| matches!(value, "on" | "true" | "1"));

    match AuthService::new(&state.config().delays)
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(email) => {
            complete_sign_in(&mut storage, email.as_str(), remember_me).await?;
            Ok(Redirect::to(&return_to).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            gate.record_failure(state.now(), random_challenge);
            session.insert(session_keys::LOGIN_GATE, &gate).await?;
            tracing::warn!(
                failed_attempts = gate.failed_attempts(),
                "Login failed"
            );
            Ok(back_to_login("credentials", &form.email, &return_to).into_response())
        }
        Err(AuthError::InvalidEmail(_)) => {
            Ok(back_to_login("invalid_email", &form.email, &return_to).into_response())
        }
        Err(err) => {
            tracing::debug!(error = %err, "Login form incomplete");
            Ok(back_to_login("missing", &form.email, &return_to).into_response())
        }
    }
}

/// Replace the captcha challenge.
#[instrument(skip(storage))]
pub async fn refresh_captcha(storage: LocalStorage, Form(form): Form<ReturnForm>) -> Result<Response> {
    let session = storage.session();
    let mut gate = load_gate(session).await?;
    gate.refresh_captcha(random_challenge());
    session.insert(session_keys::LOGIN_GATE, &gate).await?;

    let return_to = safe_return_path(form.return_to.as_deref());
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("return_to", return_to)
        .finish();
    Ok(Redirect::to(&format!("/login?{query}")).into_response())
}

/// Sign in through a social provider.
#[instrument(skip(state, storage))]
pub async fn social_login(
    State(state): State<AppState>,
    mut storage: LocalStorage,
    Path(provider): Path<String>,
    Form(form): Form<ReturnForm>,
) -> Result<Response> {
    let Ok(provider) = provider.parse::<SocialProvider>() else {
        return Ok(not_found_page(Layout::from_storage(&storage)));
    };
    let return_to = safe_return_path(form.return_to.as_deref()).to_string();

    match AuthService::new(&state.config().delays)
        .login_with_provider(provider)
        .await
    {
        Ok(email) => {
            complete_sign_in(&mut storage, email.as_str(), false).await?;
            Ok(Redirect::to(&return_to).into_response())
        }
        Err(err) => {
            tracing::warn!(provider = provider.as_str(), error = %err, "Social sign-in failed");
            Ok(back_to_login("social", "", &return_to).into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out. Cart and wishlist are kept.
#[instrument(skip(storage))]
pub async fn logout(mut storage: LocalStorage) -> Result<Response> {
    storage.sign_out();
    storage.save().await?;
    let session = storage.session();
    session
        .remove::<CheckoutFlow>(session_keys::CHECKOUT_FLOW)
        .await?;
    session
        .remove::<bool>(session_keys::GUEST_PROMPT_DISMISSED)
        .await?;
    clear_sentry_user();
    tracing::info!("Signed out");
    Ok(Redirect::to("/").into_response())
}
