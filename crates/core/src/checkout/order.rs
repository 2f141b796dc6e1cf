//! Order confirmation built at the end of checkout.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::form::{CheckoutForm, DeliveryOption, PaymentForm, PaymentMethod, ShippingForm};
use super::pricing::OrderTotals;
use crate::cart::CartItem;
use crate::types::OrderNumber;

/// Days from placement to the estimated delivery date.
pub const DELIVERY_ESTIMATE_DAYS: i64 = 7;

/// Last four digits shown when the card number has fewer than four.
const FALLBACK_LAST_FOUR: &str = "4242";

/// How the order was paid, safe to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDescriptor {
    pub method: PaymentMethod,
    pub last_four: Option<String>,
}

impl PaymentDescriptor {
    #[must_use]
    pub fn from_form(payment: &PaymentForm) -> Self {
        let last_four = payment.payment_method.requires_card().then(|| {
            payment
                .card_last_four()
                .unwrap_or_else(|| FALLBACK_LAST_FOUR.to_owned())
        });
        Self {
            method: payment.payment_method,
            last_four,
        }
    }

    /// `**** **** **** 4242`, `Razorpay Payment` or `PayPal`.
    #[must_use]
    pub fn masked(&self) -> String {
        match self.method {
            PaymentMethod::Card => format!(
                "**** **** **** {}",
                self.last_four.as_deref().unwrap_or(FALLBACK_LAST_FOUR)
            ),
            PaymentMethod::Razorpay => "Razorpay Payment".to_owned(),
            PaymentMethod::PayPal => "PayPal".to_owned(),
        }
    }
}

/// Snapshot of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
    pub shipping: ShippingForm,
    pub delivery_option: DeliveryOption,
    pub payment: PaymentDescriptor,
    pub promo_code: Option<String>,
}

impl OrderConfirmation {
    #[must_use]
    pub fn build(
        items: Vec<CartItem>,
        form: &CheckoutForm,
        totals: OrderTotals,
        promo_code: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_number: OrderNumber::from_timestamp(now),
            placed_at: now,
            estimated_delivery: now + Duration::days(DELIVERY_ESTIMATE_DAYS),
            items,
            totals,
            shipping: form.shipping.clone(),
            delivery_option: form.shipping.delivery_option,
            payment: PaymentDescriptor::from_form(&form.payment),
            promo_code,
        }
    }

    /// Long date, e.g. `Wednesday, October 21, 2026`.
    #[must_use]
    pub fn estimated_delivery_display(&self) -> String {
        self.estimated_delivery.format("%A, %B %-d, %Y").to_string()
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
