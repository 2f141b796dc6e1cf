//! Exact money arithmetic.
//!
//! All storefront amounts are USD. Arithmetic keeps full decimal precision
//! (8% tax on 499.98 is exactly 39.9984); rounding to cents happens only when
//! an amount is displayed.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A USD amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Create an amount from whole dollars.
    #[must_use]
    pub fn from_dollars(dollars: u32) -> Self {
        Self(Decimal::from(dollars))
    }

    /// The underlying decimal amount, unrounded.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply by a plain decimal factor (tax rates, percentages).
    #[must_use]
    pub fn scale(self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }

    /// Round half-away-from-zero to whole cents.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Format for display, e.g. `$545.97`.
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded.abs())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(19_999).amount(), Decimal::new(19_999, 2));
        assert_eq!(Money::from_cents(-599).amount(), Decimal::new(-599, 2));
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Money::new(Decimal::new(5_459_684, 4)).display(), "$545.97");
        assert_eq!(Money::from_cents(500).display(), "$5.00");
        assert_eq!(Money::ZERO.display(), "$0.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::from_cents(-1_050).display(), "-$10.50");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let subtotal = Money::from_cents(19_999) + Money::from_cents(29_999);
        assert_eq!(subtotal, Money::from_cents(49_998));
        let tax = subtotal.scale(Decimal::new(8, 2));
        assert_eq!(tax.amount(), Decimal::new(399_984, 4));
    }

    #[test]
    fn test_multiply_by_quantity_and_sum() {
        let lines = [Money::from_cents(2_999) * 2, Money::from_cents(100) * 3];
        assert_eq!(lines.into_iter().sum::<Money>(), Money::from_cents(6_298));
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::from_cents(1).is_negative());
    }
}
