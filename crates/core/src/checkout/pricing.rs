//! Checkout totals.

use serde::{Deserialize, Serialize};

use super::form::DeliveryOption;
use crate::cart::{CartItem, tax_rate};
use crate::types::Money;

/// Totals shown in the order summary and captured in the confirmation.
///
/// `total = subtotal + delivery + tax - discount`, where the discount never
/// exceeds the subtotal. Amounts are exact; round only for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub delivery: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    #[must_use]
    pub fn compute(items: &[CartItem], delivery: DeliveryOption, discount: Money) -> Self {
        let subtotal: Money = items.iter().map(CartItem::line_total).sum();
        let delivery = delivery.price();
        let tax = subtotal.scale(tax_rate());
        let discount = discount.max(Money::ZERO).min(subtotal);
        Self {
            subtotal,
            delivery,
            tax,
            discount,
            total: subtotal + delivery + tax - discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::ProductId;

    fn item(id: u32, cents: i64, quantity: u32) -> CartItem {
        CartItem::new(
            ProductId::new(id),
            format!("Product {id}"),
            Money::from_cents(cents),
            quantity,
            10,
            "/images/product.jpg",
            None,
        )
    }

    #[test]
    fn test_default_checkout_totals() {
        let items = [item(1, 19_999, 1), item(2, 29_999, 1)];
        let totals = OrderTotals::compute(&items, DeliveryOption::Standard, Money::ZERO);

        assert_eq!(totals.subtotal, Money::from_cents(49_998));
        assert_eq!(totals.delivery, Money::from_cents(599));
        assert_eq!(totals.tax.amount(), Decimal::new(399_984, 4));
        assert_eq!(totals.total.amount(), Decimal::new(5_459_684, 4));
        assert_eq!(totals.total.display(), "$545.97");
    }

    #[test]
    fn test_delivery_option_changes_only_delivery() {
        let items = [item(1, 10_000, 2)];
        let standard = OrderTotals::compute(&items, DeliveryOption::Standard, Money::ZERO);
        let overnight = OrderTotals::compute(&items, DeliveryOption::Overnight, Money::ZERO);

        assert_eq!(standard.subtotal, overnight.subtotal);
        assert_eq!(standard.tax, overnight.tax);
        assert_eq!(
            overnight.total - standard.total,
            Money::from_cents(2_499 - 599)
        );
    }

    #[test]
    fn test_discount_subtracted() {
        let items = [item(1, 10_000, 1)];
        let totals = OrderTotals::compute(&items, DeliveryOption::Express, Money::from_dollars(20));
        // 100 + 12.99 + 8 - 20
        assert_eq!(totals.total, Money::from_cents(10_099));
    }

    #[test]
    fn test_discount_capped_at_subtotal() {
        let items = [item(1, 500, 1)];
        let totals = OrderTotals::compute(&items, DeliveryOption::Standard, Money::from_dollars(20));
        assert_eq!(totals.discount, Money::from_cents(500));
        assert!(!totals.total.is_negative());
        assert_eq!(totals.total, Money::from_cents(599 + 40));
    }

    #[test]
    fn test_empty_cart() {
        let totals = OrderTotals::compute(&[], DeliveryOption::Standard, Money::from_dollars(10));
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.discount, Money::ZERO);
        assert_eq!(totals.total, Money::from_cents(599));
    }
}
