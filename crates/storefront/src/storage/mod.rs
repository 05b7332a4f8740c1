//! Durable client storage.
//!
//! # Architecture
//!
//! - [`DurableStorage`] is a small string key/value interface, the client's
//!   equivalent of browser local storage
//! - [`FileStorage`] keeps one JSON document per key in a data directory
//! - [`MemoryStorage`] is the session-only fallback when no directory is usable
//! - [`PersistentCollectionStore`] mirrors an in-memory collection to one key
//!
//! Storage is best-effort. The engines built on top of it own their state in
//! memory; a storage failure is logged and never reaches the caller.
//!
//! Two processes pointed at the same data directory are not coordinated. The
//! last write wins.

mod collection;
mod file;
mod memory;

use std::path::Path;
use std::sync::Arc;

pub use collection::{PersistentCollectionStore, dedupe_by_key};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on storage key '{key}': {source}")]
    Io {
        /// Storage key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The storage location could not be prepared.
    #[error("Storage unavailable at {path}: {source}")]
    Unavailable {
        /// Data directory that was requested.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A synchronous string key/value store that survives restarts.
///
/// Writes are synchronous: a `get` following a `set` on the same thread
/// observes the write.
pub trait DurableStorage: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Open file-backed storage in `dir`, degrading to memory if that fails.
///
/// A degraded session keeps working; it simply forgets everything on exit.
#[must_use]
pub fn open_storage(dir: &Path) -> Arc<dyn DurableStorage> {
    match FileStorage::open(dir) {
        Ok(storage) => {
            tracing::debug!(path = %dir.display(), "Opened durable storage");
            Arc::new(storage)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Durable storage unavailable, falling back to in-memory storage for this session"
            );
            Arc::new(MemoryStorage::default())
        }
    }
}

/// Fixed storage keys.
pub mod keys {
    /// Cart entries (JSON array of cart lines).
    pub const CART: &str = "cart";

    /// Favorite items (JSON array of items).
    pub const FAVORITES: &str = "favorites";

    /// Order number of the most recent successful checkout.
    pub const LATEST_ORDER: &str = "latestOrder";

    /// Append-only order history (JSON array of order records).
    pub const ORDERS: &str = "orders";

    /// Set after a successful checkout until the confirmation is shown.
    pub const CAME_FROM_CHECKOUT: &str = "cameFromCheckout";
}
