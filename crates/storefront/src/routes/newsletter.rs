//! Newsletter signup handler.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use super::home::{HomeTemplate, NewsletterView};
use crate::models::LocalStorage;
use crate::services::newsletter;
use crate::state::AppState;

/// Newsletter form data.
#[derive(Debug, Deserialize)]
pub struct NewsletterForm {
    #[serde(default)]
    pub email: String,
}

/// Subscribe, then show the thank-you state. Invalid input re-renders the
/// home page with the error beside the field.
#[instrument(skip(state, storage, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    storage: LocalStorage,
    Form(form): Form<NewsletterForm>,
) -> Response {
    match newsletter::subscribe(&form.email, &state.config().delays).await {
        Ok(()) => Redirect::to("/?newsletter=subscribed#newsletter").into_response(),
        Err(err) => {
            let view = NewsletterView {
                email: form.email,
                error: Some(err.to_string()),
                subscribed: false,
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                HomeTemplate::new(&state, Layout::from_storage(&storage), view),
            )
                .into_response()
        }
    }
}
