//! In-process key/value store.

use super::{KeyValueStore, StorageBridge};
use crate::errors::AppResult;
use std::cell::RefCell;
use std::collections::HashMap;
use std::task::Poll;

/// Volatile store backed by a `HashMap`.
///
/// Usable both as the built-in store and as a bridge, which makes it the
/// workhorse of the unit tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value directly, bypassing the adapter.
    pub fn insert(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

impl StorageBridge for MemoryStore {
    fn name(&self) -> &str {
        "memory bridge"
    }

    fn get(&self, key: &str) -> AppResult<Poll<Option<String>>> {
        KeyValueStore::get(self, key).map(Poll::Ready)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<Poll<()>> {
        KeyValueStore::set(self, key, value).map(Poll::Ready)
    }

    fn remove(&self, key: &str) -> AppResult<Poll<()>> {
        KeyValueStore::remove(self, key).map(Poll::Ready)
    }
}
