//! Cart lines and the cart page summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, ProductId};

/// Sales tax applied to the subtotal (8%).
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be between 1 and {max}")]
    QuantityOutOfRange { requested: u32, max: u32 },
    #[error("item is out of stock")]
    OutOfStock,
    #[error("cart line not found: {0}")]
    LineNotFound(String),
}

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product + variant identity; lines with the same id are merged.
    pub line_id: String,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// Units available; quantity never exceeds this.
    pub stock: u32,
    pub image: String,
    pub variant: Option<String>,
}

impl CartItem {
    /// Build a line, deriving the line id from product and variant.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
        stock: u32,
        image: impl Into<String>,
        variant: Option<String>,
    ) -> Self {
        Self {
            line_id: line_id(product_id, variant.as_deref()),
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            stock,
            image: image.into(),
            variant,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Stable line id: `"<product>"` or `"<product>:<variant-slug>"`.
#[must_use]
pub fn line_id(product_id: ProductId, variant: Option<&str>) -> String {
    match variant {
        None => product_id.to_string(),
        Some(variant) => {
            let slug: String = variant
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() {
                        c.to_ascii_lowercase()
                    } else {
                        '-'
                    }
                })
                .collect();
            format!("{product_id}:{slug}")
        }
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Wrap existing lines, dropping empty ones and capping quantities at
    /// stock.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let items = items
            .into_iter()
            .filter(|item| item.quantity > 0 && item.stock > 0)
            .map(|mut item| {
                item.quantity = item.quantity.min(item.stock);
                item
            })
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// `Σ unit_price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn line(&self, line_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.line_id == line_id)
    }

    /// Add a line, merging into an existing line with the same id.
    ///
    /// The merged quantity is capped at stock. Returns the resulting
    /// quantity of that line.
    ///
    /// # Errors
    ///
    /// Returns `OutOfStock` when the item has no stock and
    /// `QuantityOutOfRange` for a zero or over-stock quantity.
    pub fn add(&mut self, item: CartItem) -> Result<u32, CartError> {
        if item.stock == 0 {
            return Err(CartError::OutOfStock);
        }
        check_quantity(item.quantity, item.stock)?;

        if let Some(existing) = self.items.iter_mut().find(|line| line.line_id == item.line_id) {
            existing.stock = item.stock;
            existing.unit_price = item.unit_price;
            existing.quantity = existing.quantity.saturating_add(item.quantity).min(item.stock);
            return Ok(existing.quantity);
        }

        let quantity = item.quantity;
        self.items.push(item);
        Ok(quantity)
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `LineNotFound` for an unknown line and `QuantityOutOfRange`
    /// when the quantity is zero or above stock.
    pub fn set_quantity(&mut self, line_id: &str, quantity: u32) -> Result<(), CartError> {
        let line = self
            .items
            .iter_mut()
            .find(|line| line.line_id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_owned()))?;
        check_quantity(quantity, line.stock)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line and return it.
    ///
    /// # Errors
    ///
    /// Returns `LineNotFound` for an unknown line.
    pub fn remove(&mut self, line_id: &str) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_owned()))?;
        Ok(self.items.remove(index))
    }

    /// Move a line into the wishlist, stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns `LineNotFound` for an unknown line.
    pub fn save_for_later(
        &mut self,
        line_id: &str,
        wishlist: &mut Wishlist,
        now: DateTime<Utc>,
    ) -> Result<(), CartError> {
        let item = self.remove(line_id)?;
        wishlist.push(item, now);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn check_quantity(quantity: u32, stock: u32) -> Result<(), CartError> {
    if quantity == 0 || quantity > stock {
        return Err(CartError::QuantityOutOfRange {
            requested: quantity,
            max: stock,
        });
    }
    Ok(())
}

/// An item saved for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    #[serde(flatten)]
    pub item: CartItem,
    pub added_at: DateTime<Utc>,
}

/// Saved-for-later items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item; an existing entry for the same line is replaced.
    pub fn push(&mut self, item: CartItem, now: DateTime<Utc>) {
        self.items.retain(|saved| saved.item.line_id != item.line_id);
        self.items.push(WishlistItem {
            item,
            added_at: now,
        });
    }

    /// Remove and return an entry.
    pub fn take(&mut self, line_id: &str) -> Option<WishlistItem> {
        let index = self
            .items
            .iter()
            .position(|saved| saved.item.line_id == line_id)?;
        Some(self.items.remove(index))
    }
}

/// Cart page totals.
///
/// The cart page quotes a flat shipping estimate rather than a delivery
/// option; the checkout's own pricing replaces it once a delivery option is
/// chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
}

impl CartSummary {
    /// Subtotal above which shipping is free.
    #[must_use]
    pub fn free_shipping_threshold() -> Money {
        Money::from_dollars(75)
    }

    /// Estimated shipping below the threshold.
    #[must_use]
    pub fn flat_shipping() -> Money {
        Money::from_cents(999)
    }

    /// Summarize a cart with a flat promo discount (capped at the subtotal).
    #[must_use]
    pub fn compute(cart: &Cart, discount: Money) -> Self {
        let subtotal = cart.subtotal();
        let tax = subtotal.scale(tax_rate());
        let shipping = if cart.is_empty() || subtotal > Self::free_shipping_threshold() {
            Money::ZERO
        } else {
            Self::flat_shipping()
        };
        let discount = discount.min(subtotal);
        Self {
            item_count: cart.item_count(),
            subtotal,
            tax,
            shipping,
            discount,
            total: subtotal + tax + shipping - discount,
        }
    }
}
