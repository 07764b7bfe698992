//! Two-tier bearer-token persistence.
//!
//! DESIGN
//! ======
//! The token lives in the *current* area. Older clients kept it in a
//! longer-lived *legacy* area; the first `load` that finds it only there
//! moves it across and deletes the legacy copy. Callers never see which tier
//! answered.
//!
//! ERROR HANDLING
//! ==============
//! Every storage failure is logged and swallowed. An unavailable current area
//! makes `load` return `None` without touching the legacy area, so a token is
//! never deleted from legacy before it has a new home.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use tracing::{debug, warn};

use super::StorageArea;
use crate::config::ClientConfig;

pub struct TokenStore<S> {
    current: S,
    legacy: S,
    key: String,
    legacy_key: String,
}

impl<S: StorageArea> TokenStore<S> {
    pub fn new(current: S, legacy: S, config: &ClientConfig) -> Self {
        Self {
            current,
            legacy,
            key: config.token_key.clone(),
            legacy_key: config.legacy_token_key.clone(),
        }
    }

    /// Persist `token` in the current area and drop any legacy copy.
    pub fn save(&self, token: &str) {
        if let Err(err) = self.current.set(&self.key, token) {
            warn!(error = %err, tier = "current", "failed to save token");
            return;
        }
        self.remove_legacy();
    }

    /// Return the stored token, migrating it out of the legacy area if needed.
    pub fn load(&self) -> Option<String> {
        match self.current.get(&self.key) {
            Ok(Some(token)) if !token.is_empty() => return Some(token),
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, tier = "current", "failed to read token");
                return None;
            }
        }

        let token = match self.legacy.get(&self.legacy_key) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return None,
            Err(err) => {
                warn!(error = %err, tier = "legacy", "failed to read token");
                return None;
            }
        };

        if let Err(err) = self.current.set(&self.key, &token) {
            warn!(error = %err, tier = "current", "token migration failed; leaving legacy copy");
            return Some(token);
        }
        self.remove_legacy();
        debug!("migrated token from legacy storage");
        Some(token)
    }

    /// Delete the token from both areas.
    pub fn clear(&self) {
        if let Err(err) = self.current.remove(&self.key) {
            warn!(error = %err, tier = "current", "failed to clear token");
        }
        self.remove_legacy();
    }

    fn remove_legacy(&self) {
        if let Err(err) = self.legacy.remove(&self.legacy_key) {
            warn!(error = %err, tier = "legacy", "failed to clear token");
        }
    }
}
