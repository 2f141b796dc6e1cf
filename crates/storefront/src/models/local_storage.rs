//! Local-storage snapshot kept in the visitor's session.
//!
//! Each request loads the snapshot once, mutates it through the
//! `KeyValueStore` interface and writes it back with [`LocalStorage::save`].
//! Unreadable values fall back to defaults and are logged, never shown.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::warn;

use ecommerce_hub_core::cart::{Cart, CartItem, Wishlist};
use ecommerce_hub_core::storage::{JsonStoreExt, KeyValueStore, MemoryStore, keys};

use super::CurrentUser;
use super::session::keys as session_keys;
use crate::error::{AppError, Result};

/// The visitor's storage snapshot plus the session it came from.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    session: Session,
    store: MemoryStore,
}

impl LocalStorage {
    /// Load the snapshot from a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when the session store fails. A snapshot
    /// that no longer decodes is replaced by an empty one.
    pub async fn load(session: Session) -> Result<Self> {
        let store = match session.get::<MemoryStore>(session_keys::LOCAL_STORAGE).await {
            Ok(store) => store.unwrap_or_default(),
            Err(tower_sessions::session::Error::SerdeJson(err)) => {
                warn!(error = %err, "Discarding unreadable local storage snapshot");
                MemoryStore::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { session, store })
    }

    /// The session this snapshot belongs to.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Cart lines stored under `shopping-cart`.
    #[must_use]
    pub fn cart(&self) -> Cart {
        let read = self.store.read_json::<Vec<CartItem>>(keys::CART);
        if read.is_corrupt() {
            warn!(key = keys::CART, "Ignoring unreadable cart");
        }
        Cart::from_items(read.into_value())
    }

    /// Persist the cart; an empty cart removes the key.
    ///
    /// # Errors
    ///
    /// Returns the serializer error when the cart cannot be encoded.
    pub fn set_cart(&mut self, cart: &Cart) -> std::result::Result<(), serde_json::Error> {
        if cart.is_empty() {
            self.store.remove(keys::CART);
            Ok(())
        } else {
            self.store.write_json(keys::CART, &cart.items())
        }
    }

    /// Saved-for-later items stored under `wishlist`.
    #[must_use]
    pub fn wishlist(&self) -> Wishlist {
        let read = self.store.read_json::<Wishlist>(keys::WISHLIST);
        if read.is_corrupt() {
            warn!(key = keys::WISHLIST, "Ignoring unreadable wishlist");
        }
        read.into_value()
    }

    /// Persist the wishlist; an empty list removes the key.
    ///
    /// # Errors
    ///
    /// Returns the serializer error when the list cannot be encoded.
    pub fn set_wishlist(&mut self, wishlist: &Wishlist) -> std::result::Result<(), serde_json::Error> {
        if wishlist.is_empty() {
            self.store.remove(keys::WISHLIST);
            Ok(())
        } else {
            self.store.write_json(keys::WISHLIST, wishlist)
        }
    }

    /// The signed-in visitor, when `isAuthenticated` is `"true"`.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        if !self.store.read_flag(keys::IS_AUTHENTICATED) {
            return None;
        }
        Some(CurrentUser {
            email: self.store.get(keys::USER_EMAIL).unwrap_or_default(),
            remember_me: self.store.read_flag(keys::REMEMBER_ME),
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.read_flag(keys::IS_AUTHENTICATED)
    }

    /// Record a successful sign-in.
    pub fn sign_in(&mut self, email: &str, remember_me: bool) {
        self.store.write_flag(keys::IS_AUTHENTICATED, true);
        self.store.set(keys::USER_EMAIL, email.to_owned());
        if remember_me {
            self.store.write_flag(keys::REMEMBER_ME, true);
        } else {
            self.store.remove(keys::REMEMBER_ME);
        }
    }

    /// Remove the sign-in keys. Cart and wishlist stay.
    pub fn sign_out(&mut self) {
        self.store.remove(keys::IS_AUTHENTICATED);
        self.store.remove(keys::USER_EMAIL);
        self.store.remove(keys::REMEMBER_ME);
    }

    /// Write the snapshot back to the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when the session cannot be modified.
    pub async fn save(&self) -> Result<()> {
        self.session
            .insert(session_keys::LOCAL_STORAGE, &self.store)
            .await?;
        Ok(())
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.store.set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.store.remove(key);
    }
}

impl<S> FromRequestParts<S> for LocalStorage
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;
        Self::load(session).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use ecommerce_hub_core::{Money, ProductId};
    use tower_sessions::MemoryStore as SessionMemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(SessionMemoryStore::default()), None)
    }

    fn item(quantity: u32) -> CartItem {
        CartItem::new(
            ProductId::new(2),
            "Organic Cotton T-Shirt",
            Money::from_cents(2999),
            quantity,
            8,
            "/images/tshirt.jpg",
            None,
        )
    }

    #[tokio::test]
    async fn test_cart_round_trips_through_session() {
        let session = session();
        let mut storage = LocalStorage::load(session.clone()).await.unwrap();
        let mut cart = storage.cart();
        cart.add(item(2)).unwrap();
        storage.set_cart(&cart).unwrap();
        storage.save().await.unwrap();

        let reloaded = LocalStorage::load(session).await.unwrap();
        assert_eq!(reloaded.cart().item_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_cart_removes_key() {
        let mut storage = LocalStorage::load(session()).await.unwrap();
        let mut cart = Cart::default();
        cart.add(item(1)).unwrap();
        storage.set_cart(&cart).unwrap();
        assert!(storage.get(keys::CART).is_some());

        storage.set_cart(&Cart::default()).unwrap();
        assert!(storage.get(keys::CART).is_none());
    }

    #[tokio::test]
    async fn test_corrupt_values_fall_back_to_defaults() {
        let mut storage = LocalStorage::load(session()).await.unwrap();
        storage.set(keys::CART, "{not json".to_string());
        storage.set(keys::WISHLIST, "42".to_string());
        assert!(storage.cart().is_empty());
        assert!(storage.wishlist().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let mut storage = LocalStorage::load(session()).await.unwrap();
        assert!(storage.current_user().is_none());

        storage.sign_in("customer@example.com", true);
        assert_eq!(storage.get(keys::IS_AUTHENTICATED).as_deref(), Some("true"));
        let user = storage.current_user().unwrap();
        assert_eq!(user.email, "customer@example.com");
        assert!(user.remember_me);

        let mut wishlist = Wishlist::default();
        wishlist.push(item(1), Utc::now());
        storage.set_wishlist(&wishlist).unwrap();

        storage.sign_out();
        assert!(storage.current_user().is_none());
        assert!(storage.get(keys::USER_EMAIL).is_none());
        assert_eq!(storage.wishlist().len(), 1);
    }
}
