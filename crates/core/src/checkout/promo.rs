//! Promo code table.

use thiserror::Error;

use crate::types::Money;

/// The promo code was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    #[error("Invalid promo code")]
    Unknown(String),
}

/// A recognised promo code with its flat discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromoCode {
    pub code: &'static str,
    pub discount_dollars: u32,
}

impl PromoCode {
    #[must_use]
    pub fn discount(&self) -> Money {
        Money::from_dollars(self.discount_dollars)
    }
}

pub const PROMO_CODES: [PromoCode; 3] = [
    PromoCode {
        code: "SAVE10",
        discount_dollars: 10,
    },
    PromoCode {
        code: "WELCOME20",
        discount_dollars: 20,
    },
    PromoCode {
        code: "FIRST15",
        discount_dollars: 15,
    },
];

/// Look up a code, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns `PromoError::Unknown` with the normalized code when no entry
/// matches.
pub fn resolve(code: &str) -> Result<PromoCode, PromoError> {
    let normalized = code.trim().to_ascii_uppercase();
    PROMO_CODES
        .iter()
        .find(|promo| promo.code == normalized)
        .copied()
        .ok_or(PromoError::Unknown(normalized))
}

/// A promo that has been applied to a cart or checkout.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    pub discount: Money,
}

impl From<PromoCode> for AppliedPromo {
    fn from(promo: PromoCode) -> Self {
        Self {
            code: promo.code.to_owned(),
            discount: promo.discount(),
        }
    }
}
