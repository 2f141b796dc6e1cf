//! Order processing (simulated) and order history.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use ecommerce_hub_core::checkout::OrderConfirmation;
use ecommerce_hub_core::{Money, OrderStatus};
use tracing::instrument;

use crate::config::SimulatedDelays;

/// One product line of a listed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub price: Money,
    pub image: String,
}

/// An order as the account dashboard lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub order_number: String,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub tracking_number: Option<String>,
    pub items: Vec<OrderLine>,
}

impl From<&OrderConfirmation> for OrderRecord {
    fn from(order: &OrderConfirmation) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            status: OrderStatus::Processing,
            placed_at: order.placed_at,
            subtotal: order.totals.subtotal,
            shipping: order.totals.delivery,
            tax: order.totals.tax,
            discount: order.totals.discount,
            total: order.totals.total,
            tracking_number: None,
            items: order
                .items
                .iter()
                .map(|item| OrderLine {
                    name: item.name.clone(),
                    variant: item.variant.clone(),
                    quantity: item.quantity,
                    price: item.line_total(),
                    image: item.image.clone(),
                })
                .collect(),
        }
    }
}

impl OrderRecord {
    /// Processing orders can still be cancelled.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.status == OrderStatus::Processing
    }

    /// Delivered orders can be returned.
    #[must_use]
    pub fn can_return(&self) -> bool {
        self.status == OrderStatus::Delivered
    }
}

/// Order list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    AmountHigh,
    AmountLow,
}

impl OrderSort {
    pub const ALL: [Self; 4] = [Self::Newest, Self::Oldest, Self::AmountHigh, Self::AmountLow];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::AmountHigh => "amount-high",
            Self::AmountLow => "amount-low",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest First",
            Self::Oldest => "Oldest First",
            Self::AmountHigh => "Amount: High to Low",
            Self::AmountLow => "Amount: Low to High",
        }
    }
}

impl FromStr for OrderSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or(())
    }
}

/// Filter by status (`None` keeps all) and sort.
#[must_use]
pub fn filter_orders(
    orders: &[OrderRecord],
    status: Option<OrderStatus>,
    sort: OrderSort,
) -> Vec<OrderRecord> {
    let mut listed: Vec<OrderRecord> = orders
        .iter()
        .filter(|order| status.is_none_or(|status| order.status == status))
        .cloned()
        .collect();
    match sort {
        OrderSort::Newest => listed.sort_by(|a, b| b.placed_at.cmp(&a.placed_at)),
        OrderSort::Oldest => listed.sort_by(|a, b| a.placed_at.cmp(&b.placed_at)),
        OrderSort::AmountHigh => listed.sort_by(|a, b| b.total.cmp(&a.total)),
        OrderSort::AmountLow => listed.sort_by(|a, b| a.total.cmp(&b.total)),
    }
    listed
}

/// Stand-in for the payment round trip: waits the configured order delay.
#[instrument(skip(delays))]
pub async fn process_payment(delays: &SimulatedDelays) {
    tokio::time::sleep(delays.order).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::account;

    #[test]
    fn test_filter_by_status() {
        let orders = account::order_history();
        let shipped = filter_orders(&orders, Some(OrderStatus::Shipped), OrderSort::Newest);
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped[0].order_number, "ORD-2024-002");

        let cancelled = filter_orders(&orders, Some(OrderStatus::Cancelled), OrderSort::Newest);
        assert!(cancelled.is_empty());
    }

    #[test]
    fn test_sorting() {
        let orders = account::order_history();
        let numbers = |sort| {
            filter_orders(&orders, None, sort)
                .into_iter()
                .map(|order| order.order_number)
                .collect::<Vec<_>>()
        };
        assert_eq!(numbers(OrderSort::Newest), ["ORD-2024-003", "ORD-2024-002", "ORD-2024-001"]);
        assert_eq!(numbers(OrderSort::Oldest), ["ORD-2024-001", "ORD-2024-002", "ORD-2024-003"]);
        assert_eq!(numbers(OrderSort::AmountLow), ["ORD-2024-001", "ORD-2024-002", "ORD-2024-003"]);
        assert_eq!(numbers(OrderSort::AmountHigh), ["ORD-2024-003", "ORD-2024-002", "ORD-2024-001"]);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("amount-high".parse::<OrderSort>(), Ok(OrderSort::AmountHigh));
        assert!("cheapest".parse::<OrderSort>().is_err());
    }
}
