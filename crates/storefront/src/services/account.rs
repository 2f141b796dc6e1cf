//! Demo account data for the dashboard and checkout shortcuts.
//!
//! Every signed-in visitor sees the same profile, history and address book;
//! only the email shown comes from the sign-in.

use chrono::{DateTime, NaiveDate, Utc};
use ecommerce_hub_core::checkout::{SavedAddress, SavedPaymentMethod};
use ecommerce_hub_core::{Money, OrderStatus};

use super::orders::{OrderLine, OrderRecord};

/// Dashboard profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub member_since: NaiveDate,
    pub total_orders: u32,
    pub loyalty_points: u32,
    pub wishlist_count: u32,
    pub total_spent: Money,
}

impl Profile {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// e.g. `March 2022`.
    #[must_use]
    pub fn member_since_display(&self) -> String {
        self.member_since.format("%B %Y").to_string()
    }
}

/// Whether an address-book entry is for shipping or billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Shipping,
    Billing,
}

impl AddressKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Billing => "Billing",
        }
    }
}

/// An address-book entry on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAddress {
    pub kind: AddressKind,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
}

/// The demo profile, showing the signed-in email.
#[must_use]
pub fn profile(email: &str, wishlist_count: usize) -> Profile {
    Profile {
        first_name: "Sarah".to_string(),
        last_name: "Johnson".to_string(),
        email: email.to_string(),
        phone: "+1 (555) 123-4567".to_string(),
        member_since: NaiveDate::from_ymd_opt(2022, 3, 15).unwrap_or_default(),
        total_orders: 24,
        loyalty_points: 1250,
        wishlist_count: u32::try_from(wishlist_count).unwrap_or(u32::MAX),
        total_spent: Money::from_cents(284_750),
    }
}

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_default()
}

fn line(name: &str, cents: i64, variant: &str, image: &str) -> OrderLine {
    OrderLine {
        name: name.to_string(),
        variant: Some(variant.to_string()),
        quantity: 1,
        price: Money::from_cents(cents),
        image: image.to_string(),
    }
}

/// The demo order history.
#[must_use]
pub fn order_history() -> Vec<OrderRecord> {
    vec![
        OrderRecord {
            order_number: "ORD-2024-001".to_string(),
            status: OrderStatus::Delivered,
            placed_at: at("2024-08-20T10:30:00Z"),
            subtotal: Money::from_cents(7999),
            shipping: Money::from_cents(599),
            tax: Money::from_cents(401),
            discount: Money::ZERO,
            total: Money::from_cents(8999),
            tracking_number: Some("1Z999AA1234567890".to_string()),
            items: vec![line(
                "Wireless Bluetooth Headphones",
                7999,
                "Black",
                "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=300&h=300&fit=crop",
            )],
        },
        OrderRecord {
            order_number: "ORD-2024-002".to_string(),
            status: OrderStatus::Shipped,
            placed_at: at("2024-08-22T15:45:00Z"),
            subtotal: Money::from_cents(13_998),
            shipping: Money::from_cents(799),
            tax: Money::from_cents(850),
            discount: Money::ZERO,
            total: Money::from_cents(15_647),
            tracking_number: Some("1Z999AA1234567891".to_string()),
            items: vec![line(
                "Smart Fitness Watch",
                13_998,
                "Silver",
                "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=300&h=300&fit=crop",
            )],
        },
        OrderRecord {
            order_number: "ORD-2024-003".to_string(),
            status: OrderStatus::Processing,
            placed_at: at("2024-08-24T09:15:00Z"),
            subtotal: Money::from_cents(21_999),
            shipping: Money::from_cents(999),
            tax: Money::from_cents(1601),
            discount: Money::ZERO,
            total: Money::from_cents(24_599),
            tracking_number: None,
            items: vec![line(
                "Premium Coffee Maker",
                21_999,
                "Stainless Steel",
                "https://images.unsplash.com/photo-1495474472287-4d71bcdd2085?w=300&h=300&fit=crop",
            )],
        },
    ]
}

/// The demo address book.
#[must_use]
pub fn addresses() -> Vec<AccountAddress> {
    vec![
        AccountAddress {
            kind: AddressKind::Shipping,
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            company: None,
            address1: "123 Main Street".to_string(),
            address2: Some("Apt 4B".to_string()),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip_code: "10001".to_string(),
            country: "United States".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            is_default: true,
        },
        AccountAddress {
            kind: AddressKind::Billing,
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            company: Some("Tech Solutions Inc.".to_string()),
            address1: "456 Business Ave".to_string(),
            address2: Some("Suite 200".to_string()),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip_code: "10002".to_string(),
            country: "United States".to_string(),
            phone: "+1 (555) 987-6543".to_string(),
            is_default: false,
        },
    ]
}

/// Addresses offered on the checkout shipping step.
#[must_use]
pub fn saved_checkout_addresses() -> Vec<SavedAddress> {
    vec![SavedAddress {
        id: "addr1".to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone: "+1 (555) 123-4567".to_string(),
        address: "123 Main Street".to_string(),
        apartment: "Apt 4B".to_string(),
        city: "New York".to_string(),
        state: "NY".to_string(),
        zip_code: "10001".to_string(),
        country: "US".to_string(),
    }]
}

/// Cards offered on the checkout payment step.
#[must_use]
pub fn saved_payment_methods() -> Vec<SavedPaymentMethod> {
    vec![SavedPaymentMethod {
        id: "pm1".to_string(),
        cardholder_name: "John Doe".to_string(),
        last_four: "4242".to_string(),
        brand: "Visa".to_string(),
        expiry_month: "12".to_string(),
        expiry_year: "2027".to_string(),
    }]
}
