//! Authentication extractors.
//!
//! Sign-in state lives in the local-storage snapshot (`isAuthenticated`,
//! `userEmail`), so both extractors read it through [`LocalStorage`].

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, LocalStorage};

/// Where sign-in sends visitors when no return path is given.
pub const DEFAULT_RETURN_PATH: &str = "/account";

/// Extractor that requires a signed-in visitor.
///
/// If nobody is signed in, redirects to the login page with the requested
/// path as `return_to`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the visitor is not
/// signed in.
pub enum AuthRejection {
    /// Redirect to the login page, then back to the given path.
    RedirectToLogin(String),
    /// Session layer missing or unreadable.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(return_to) => login_redirect(&return_to).into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unavailable)?;
        let storage = LocalStorage::load(session)
            .await
            .map_err(|_| AuthRejection::Unavailable)?;

        // Nested routers see a stripped path; return to the full one.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        let return_to = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string);

        storage
            .current_user()
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin(return_to))
    }
}

/// Extractor that optionally gets the signed-in visitor.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => LocalStorage::load(session.clone())
                .await
                .ok()
                .and_then(|storage| storage.current_user()),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Redirect to the login page carrying a return path.
#[must_use]
pub fn login_redirect(return_to: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("return_to", return_to)
        .finish();
    Redirect::to(&format!("/login?{query}"))
}

/// Accept only same-site absolute paths as a post-login destination.
#[must_use]
pub fn safe_return_path(candidate: Option<&str>) -> &str {
    candidate
        .map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
        .unwrap_or(DEFAULT_RETURN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/checkout")), "/checkout");
        assert_eq!(safe_return_path(Some("/account?tab=orders")), "/account?tab=orders");
        assert_eq!(safe_return_path(None), DEFAULT_RETURN_PATH);
        assert_eq!(safe_return_path(Some("")), DEFAULT_RETURN_PATH);
        assert_eq!(safe_return_path(Some("https://evil.example")), DEFAULT_RETURN_PATH);
        assert_eq!(safe_return_path(Some("//evil.example")), DEFAULT_RETURN_PATH);
        assert_eq!(safe_return_path(Some("/\\evil.example")), DEFAULT_RETURN_PATH);
    }

    #[test]
    fn test_login_redirect_encodes_return_path() {
        let response = login_redirect("/account?tab=orders").into_response();
        let location = response
            .headers()
            .get("location")
            .and_then(|value| value.to_str().ok());
        assert_eq!(location, Some("/login?return_to=%2Faccount%3Ftab%3Dorders"));
    }
}
