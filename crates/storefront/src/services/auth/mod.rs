//! Authentication service.
//!
//! Sign-in is simulated: a fixed set of demo accounts is accepted after a
//! configurable delay, and social sign-in always succeeds as
//! `user@<provider>.com`.

mod error;

pub use error::AuthError;

use std::str::FromStr;

use ecommerce_hub_core::Email;
use tracing::instrument;

use crate::config::SimulatedDelays;

/// Demo accounts accepted by password sign-in.
pub const DEMO_ACCOUNTS: [(&str, &str); 3] = [
    ("admin@ecommercehub.com", "admin123"),
    ("customer@example.com", "customer123"),
    ("guest@example.com", "guest123"),
];

/// Supported social sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub const ALL: [Self; 2] = [Self::Google, Self::Facebook];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
        }
    }
}

impl FromStr for SocialProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AuthError::UnknownProvider(s.to_string()))
    }
}

/// Authentication service over the demo accounts.
pub struct AuthService<'a> {
    delays: &'a SimulatedDelays,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(delays: &'a SimulatedDelays) -> Self {
        Self { delays }
    }

    /// Check the submitted credentials against the demo accounts.
    ///
    /// Waits the configured login delay before answering, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for blank input,
    /// `AuthError::InvalidEmail` for a malformed address and
    /// `AuthError::InvalidCredentials` when no demo account matches.
    #[instrument(skip(self, password))]
    pub async fn login_with_password(&self, email: &str, password: &str) -> Result<Email, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let email = Email::parse(email)?;

        tokio::time::sleep(self.delays.login).await;

        DEMO_ACCOUNTS
            .iter()
            .any(|(account, secret)| *account == email.as_str() && *secret == password)
            .then_some(email)
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Sign in through a social provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` only if the derived address were
    /// malformed, which the fixed providers never produce.
    #[instrument(skip(self))]
    pub async fn login_with_provider(&self, provider: SocialProvider) -> Result<Email, AuthError> {
        tokio::time::sleep(self.delays.social_login).await;
        Ok(Email::parse(&format!("user@{}.com", provider.as_str()))?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_accounts_sign_in() {
        let service = AuthService::new(&SimulatedDelays::NONE);
        for (email, password) in DEMO_ACCOUNTS {
            let signed_in = service.login_with_password(email, password).await.unwrap();
            assert_eq!(signed_in.as_str(), email);
        }
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let service = AuthService::new(&SimulatedDelays::NONE);
        let result = service
            .login_with_password("customer@example.com", "admin123")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_blank_and_malformed_input() {
        let service = AuthService::new(&SimulatedDelays::NONE);
        assert!(matches!(
            service.login_with_password("", "secret").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            service.login_with_password("not-an-email", "secret").await,
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_waits_for_delay() {
        let delays = SimulatedDelays::default();
        let service = AuthService::new(&delays);
        let started = tokio::time::Instant::now();
        service
            .login_with_password("guest@example.com", "guest123")
            .await
            .unwrap();
        assert!(started.elapsed() >= delays.login);
    }

    #[tokio::test]
    async fn test_social_provider() {
        let service = AuthService::new(&SimulatedDelays::NONE);
        let provider: SocialProvider = "Google".parse().unwrap();
        let email = service.login_with_provider(provider).await.unwrap();
        assert_eq!(email.as_str(), "user@google.com");
        assert!("myspace".parse::<SocialProvider>().is_err());
    }
}
