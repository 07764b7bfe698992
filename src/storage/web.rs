//! Browser `sessionStorage` / `localStorage` areas.
//!
//! TRADE-OFFS
//! ==========
//! The `Storage` handle is looked up on every call instead of cached; a
//! browser can revoke storage access mid-session and a stale handle would
//! throw instead of reporting [`StorageError::Unavailable`].

use super::token_store::TokenStore;
use super::{StorageArea, StorageError};
use crate::config::ClientConfig;

/// Lifetime scope of a browser storage area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebScope {
    /// Cleared when the tab closes. Current home of the bearer token.
    Session,
    /// Survives browser restarts. Where older builds kept the token.
    Local,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WebStorageArea {
    scope: WebScope,
}

impl WebStorageArea {
    pub fn session() -> Self {
        Self { scope: WebScope::Session }
    }

    pub fn local() -> Self {
        Self { scope: WebScope::Local }
    }

    pub fn scope(self) -> WebScope {
        self.scope
    }

    fn storage(self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self.scope {
            WebScope::Session => window.session_storage(),
            WebScope::Local => window.local_storage(),
        };
        storage.ok().flatten().ok_or(StorageError::Unavailable)
    }
}

fn js_error(err: &wasm_bindgen::JsValue) -> StorageError {
    StorageError::Backend(format!("{err:?}"))
}

impl StorageArea for WebStorageArea {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(|e| js_error(&e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(|e| js_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(|e| js_error(&e))
    }
}

/// Token store over `sessionStorage`, migrating tokens left in `localStorage`.
pub fn browser_token_store(config: &ClientConfig) -> TokenStore<WebStorageArea> {
    TokenStore::new(WebStorageArea::session(), WebStorageArea::local(), config)
}
