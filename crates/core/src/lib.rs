//! EcommerceHub Core - Storefront domain library.
//!
//! This crate holds everything the storefront decides without touching the
//! outside world:
//! - `types` - Newtype wrappers for ids, money, emails, and statuses
//! - `cart` - Cart lines, stock-capped quantities, the cart page summary
//! - `checkout` - The multi-step checkout flow (steps, form store,
//!   validation, pricing, promo codes, order confirmation)
//! - `auth` - Login attempt gate (captcha and cooldown thresholds)
//! - `storage` - The named-key store that stands in for browser local storage
//! - `clock` - Injectable time source
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP, no
//! timers. The storefront binary owns sessions, latency simulation and
//! rendering, and drives these types from request handlers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod storage;
pub mod types;

pub use types::*;
