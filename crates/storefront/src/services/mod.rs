//! Business logic services for storefront.
//!
//! Everything behind these modules is simulated: fixed demo data and
//! configurable delays stand in for a real back end.
//!
//! # Services
//!
//! - `auth` - Password and social sign-in against demo accounts
//! - `orders` - Payment round trip and order history listing
//! - `account` - Demo profile, history, address book and saved checkout records
//! - `newsletter` - Homepage signup
//! - `reviews` - Demo product reviews and review submission

pub mod account;
pub mod auth;
pub mod newsletter;
pub mod orders;
pub mod reviews;
