//! Per-visitor state carried in the session.
//!
//! - `local_storage` - The browser-storage snapshot (cart, wishlist, sign-in flags)
//! - `session` - Keys for everything else the storefront keeps per visitor
//! - `user` - The signed-in visitor

pub mod local_storage;
pub mod session;
pub mod user;

pub use local_storage::LocalStorage;
pub use session::keys as session_keys;
pub use user::CurrentUser;
