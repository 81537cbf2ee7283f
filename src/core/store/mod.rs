//! Secret store access.
//!
//! The rotation engine reads and writes payloads through the [`SecretStore`]
//! trait. A store holds versioned documents, one per secret path; each
//! document maps storage keys to payload strings.
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `http.rs`)
//! 3. Re-export from this module
//!
//! ## Example
//!
//! ```ignore
//! struct Remote { /* ... */ }
//!
//! impl SecretStore for Remote {
//!     fn fetch(&self, path: &str, storage_key: &str) -> Result<Fetched> {
//!         // GET the document, pick `storage_key`
//!     }
//!     fn write(&self, path: &str, storage_key: &str, payload: &str, cas: Version) -> Result<Version> {
//!         // PUT with check-and-set
//!     }
//! }
//! ```

use std::fmt;

use crate::core::types::Version;
use crate::error::Result;

mod fs;
mod memory;

pub use fs::FileStore;
pub use memory::MemoryStore;

/// A payload and the document version it was read at.
#[derive(Clone, PartialEq, Eq)]
pub struct Fetched {
    pub payload: String,
    pub version: Version,
}

impl Fetched {
    pub fn new(payload: impl Into<String>, version: Version) -> Self {
        Self {
            payload: payload.into(),
            version,
        }
    }
}

impl fmt::Debug for Fetched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetched")
            .field("payload", &format_args!("<{} bytes>", self.payload.len()))
            .field("version", &self.version)
            .finish()
    }
}

/// Versioned key-value secret storage.
///
/// Implementations must be safe to share between worker threads.
pub trait SecretStore: Send + Sync {
    /// Read the payload stored under `storage_key` at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the path or the storage key does
    /// not exist, or `StoreError::AccessDenied`.
    fn fetch(&self, path: &str, storage_key: &str) -> Result<Fetched>;

    /// Replace the payload under `storage_key` at `path`.
    ///
    /// The write only succeeds if the document is still at version `cas`.
    /// Other storage keys of the document are kept.
    ///
    /// # Returns
    ///
    /// The new document version.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` on a version mismatch, or
    /// `StoreError::AccessDenied`.
    fn write(&self, path: &str, storage_key: &str, payload: &str, cas: Version) -> Result<Version>;
}

impl<T: SecretStore + ?Sized> SecretStore for &T {
    fn fetch(&self, path: &str, storage_key: &str) -> Result<Fetched> {
        (**self).fetch(path, storage_key)
    }

    fn write(&self, path: &str, storage_key: &str, payload: &str, cas: Version) -> Result<Version> {
        (**self).write(path, storage_key, payload, cas)
    }
}

impl<T: SecretStore + ?Sized> SecretStore for Box<T> {
    fn fetch(&self, path: &str, storage_key: &str) -> Result<Fetched> {
        (**self).fetch(path, storage_key)
    }

    fn write(&self, path: &str, storage_key: &str, payload: &str, cas: Version) -> Result<Version> {
        (**self).write(path, storage_key, payload, cas)
    }
}
