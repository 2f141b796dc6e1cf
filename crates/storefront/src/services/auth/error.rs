//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password missing.
    #[error("Please enter your email and password")]
    MissingCredentials,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ecommerce_hub_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,

    /// Social provider not offered.
    #[error("unknown sign-in provider: {0}")]
    UnknownProvider(String),
}
