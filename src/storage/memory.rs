//! In-memory storage area.
//!
//! Clones share the same map, so a test can keep a handle to an area it has
//! handed to a [`super::token_store::TokenStore`] and inspect it afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{StorageArea, StorageError};

/// Storage area backed by a shared `HashMap`.
///
/// `None` inside models a disabled backend: every operation reports
/// [`StorageError::Unavailable`].
#[derive(Clone, Debug)]
pub struct MemoryArea {
    entries: Rc<RefCell<Option<HashMap<String, String>>>>,
}

impl Default for MemoryArea {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArea {
    pub fn new() -> Self {
        Self { entries: Rc::new(RefCell::new(Some(HashMap::new()))) }
    }

    /// An area whose backend is disabled.
    pub fn unavailable() -> Self {
        Self { entries: Rc::new(RefCell::new(None)) }
    }

    /// Build an available area pre-populated with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let area = Self::new();
        if let Some(map) = area.entries.borrow_mut().as_mut() {
            map.insert(key.to_owned(), value.to_owned());
        }
        area
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.borrow();
        let map = entries.as_ref().ok_or(StorageError::Unavailable)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.borrow_mut();
        let map = entries.as_mut().ok_or(StorageError::Unavailable)?;
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.borrow_mut();
        let map = entries.as_mut().ok_or(StorageError::Unavailable)?;
        map.remove(key);
        Ok(())
    }
}
