//! In-memory implementation of [`KvStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! sessions. It holds JSON values in a `BTreeMap` behind an `RwLock`, with
//! the same observable semantics as the SQLite backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::traits::KvStore;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        guard.keys().cloned().collect()
    }

    /// Removes a key. Used by tests to simulate partially migrated stores.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(key)
    }
}

impl KvStore for InMemoryStore {
    fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(keys
            .iter()
            .filter_map(|k| guard.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn save(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for (key, value) in entries {
            guard.insert(key, value);
        }
        Ok(())
    }
}
