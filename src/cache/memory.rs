//! In-process cache store.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{CacheResult, CacheStore};

/// Session-local [`CacheStore`]; dropped with its owner.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl CacheStore for MemoryCache {
    fn load(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn store(&self, key: &str, json: &str) -> CacheResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), json.to_string());
        Ok(())
    }
}
