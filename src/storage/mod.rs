//! Scoped key/value storage areas and the bearer-token store built on them.
//!
//! SYSTEM CONTEXT
//! ==============
//! A storage area is one persistence scope (browser `sessionStorage`,
//! `localStorage`, a state directory on disk, or memory in tests). The
//! [`token_store::TokenStore`] layers the current/legacy lookup on top of two
//! areas; nothing else in the crate touches an area directly.
//!
//! ERROR HANDLING
//! ==============
//! Areas report failures as [`StorageError`]. The token store swallows them
//! (logging at `warn`) so a disabled storage backend degrades to "no token"
//! instead of surfacing to callers.

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
pub mod memory;
pub mod token_store;
#[cfg(feature = "hydrate")]
pub mod web;

/// Error reported by a [`StorageArea`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backend is missing or disabled (e.g. storage blocked by the browser).
    #[error("storage area unavailable")]
    Unavailable,

    /// The backend exists but the operation failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One scoped key/value persistence area.
///
/// Methods take `&self`; implementations provide their own interior
/// mutability since areas are shared with the single-threaded session core.
pub trait StorageArea {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the area cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the area cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the area cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
