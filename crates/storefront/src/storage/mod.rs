//! Local key/value store for client state.
//!
//! Plays the role browser local storage plays for a web storefront: the cart,
//! the signed-in user, the auth token, and in-flight checkout state survive
//! between invocations by living here as JSON documents under fixed keys.
//!
//! # Backends
//!
//! - [`FileStore`] - one `<key>.json` file per key under a data directory
//! - [`MemoryStore`] - process-local map, used by tests

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when reading or writing the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded as JSON.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Key being written.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters that cannot be used as a file name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key/value store.
///
/// Values are opaque strings; use [`load_json`] and [`save_json`] for typed
/// access.
pub trait LocalStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. A missing key is
    /// `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys for persisted client state.
pub mod keys {
    /// Key for the cart line list.
    pub const CART: &str = "cart";

    /// Key for the signed-in user.
    pub const CURRENT_USER: &str = "currentUser";

    /// Key for the bearer token returned at login.
    pub const TOKEN: &str = "token";

    /// Key for the in-flight checkout phase.
    pub const CHECKOUT: &str = "checkout";
}

/// Load and decode a JSON value.
///
/// A stored value that no longer decodes is logged and treated as absent, so
/// a corrupted entry never blocks the user.
///
/// # Errors
///
/// Returns an error only if the backend itself fails.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn LocalStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable stored value");
            Ok(None)
        }
    }
}

/// Encode and store a JSON value.
///
/// # Errors
///
/// Returns an error if encoding or the backend write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn LocalStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}
