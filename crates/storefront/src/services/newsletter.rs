//! Newsletter signup (simulated).

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::instrument;

use crate::config::SimulatedDelays;

/// `local@domain.tld` shape accepted by the signup form.
#[allow(clippy::expect_used)]
static EMAIL_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Signup form errors, shown inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NewsletterError {
    #[error("Email address is required")]
    Required,

    #[error("Please enter a valid email address")]
    Invalid,
}

/// Check the submitted address.
///
/// # Errors
///
/// `Required` for blank input, `Invalid` when the shape does not match.
pub fn validate(email: &str) -> Result<&str, NewsletterError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(NewsletterError::Required);
    }
    if !EMAIL_SHAPE_RE.is_match(email) {
        return Err(NewsletterError::Invalid);
    }
    Ok(email)
}

/// Validate and subscribe after the simulated round trip.
///
/// # Errors
///
/// Returns the validation error without waiting.
#[instrument(skip(delays))]
pub async fn subscribe(email: &str, delays: &SimulatedDelays) -> Result<(), NewsletterError> {
    let email = validate(email)?;
    tokio::time::sleep(delays.newsletter).await;
    tracing::info!(email, "Newsletter subscription recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert_eq!(validate("  "), Err(NewsletterError::Required));
        assert_eq!(validate("no-at-sign"), Err(NewsletterError::Invalid));
        assert_eq!(validate("a@b"), Err(NewsletterError::Invalid));
        assert_eq!(validate("a b@c.io"), Err(NewsletterError::Invalid));
        assert_eq!(validate(" me@shop.io "), Ok("me@shop.io"));
    }

    #[tokio::test]
    async fn test_subscribe_rejects_before_waiting() {
        let result = subscribe("", &SimulatedDelays::default()).await;
        assert_eq!(result, Err(NewsletterError::Required));
    }
}
