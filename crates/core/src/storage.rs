//! Named-key storage standing in for browser local storage.
//!
//! Call sites only see [`KeyValueStore`]; the storefront keeps a
//! [`MemoryStore`] snapshot inside each visitor's session, and tests use a
//! bare `MemoryStore`. Writes are last-write-wins with no versioning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Fixed keys of the persisted layout.
pub mod keys {
    /// Cart lines, JSON array of `CartItem`.
    pub const CART: &str = "shopping-cart";
    /// `"true"` when a visitor has signed in.
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    /// Email of the signed-in visitor.
    pub const USER_EMAIL: &str = "userEmail";
    /// `"true"` when the visitor ticked "remember me".
    pub const REMEMBER_ME: &str = "rememberMe";
    /// Saved-for-later items, JSON array of `WishlistItem`.
    pub const WISHLIST: &str = "wishlist";
}

/// A string key/value store.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Delete `key` if present.
    fn remove(&mut self, key: &str);
}

/// Outcome of reading a structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Read<T> {
    /// The key holds a valid value.
    Found(T),
    /// Nothing is stored under the key.
    Missing,
    /// The stored value did not parse; the default was substituted.
    Corrupt(T),
}

impl<T> Read<T> {
    /// The value, whether found or substituted.
    pub fn into_value(self) -> T
    where
        T: Default,
    {
        match self {
            Self::Found(value) | Self::Corrupt(value) => value,
            Self::Missing => T::default(),
        }
    }

    /// Whether the stored value failed to parse.
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

/// JSON helpers available on every store.
pub trait JsonStoreExt: KeyValueStore {
    /// Read a JSON value, substituting the default on parse failure.
    fn read_json<T>(&self, key: &str) -> Read<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.get(key) {
            None => Read::Missing,
            Some(raw) => serde_json::from_str(&raw).map_or_else(|_| Read::Corrupt(T::default()), Read::Found),
        }
    }

    /// Write a value as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the value cannot be encoded; the
    /// store is left unchanged.
    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw);
        Ok(())
    }

    /// Read a `"true"`/`"false"` flag; anything else counts as false.
    fn read_flag(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    /// Write a flag as `"true"`/`"false"`.
    fn write_flag(&mut self, key: &str, value: bool) {
        self.set(key, value.to_string());
    }
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {}

/// In-memory store. Serializable so it can be carried as one session value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
