//! The [`KvStore`] trait defining the storage contract for the vocabulary store.
//!
//! The contract is deliberately small: read a set of keys, write a set of
//! keys. Backends give no cross-call transactions, so two contexts sharing
//! one store may interleave their load/save pairs. Keeping the store
//! convergent under that interleaving is the projector's and reconciler's
//! job, not the backend's.
//!
//! Both methods take `&self` so one backing store can be shared between
//! several services through `&S` or `Arc<S>`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::StorageError;

/// A JSON key-value blob store.
pub trait KvStore {
    /// Reads `keys`. Keys without a stored value are absent from the result.
    fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError>;

    /// Writes every entry of `entries`, replacing existing values.
    ///
    /// A single call is atomic on backends that support it (SQLite); the
    /// in-memory backend applies it under one lock.
    fn save(&self, entries: Map<String, Value>) -> Result<(), StorageError>;

    /// Convenience: loads a single key.
    fn load_one(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.load(&[key])?.remove(key))
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        (**self).load(keys)
    }

    fn save(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        (**self).save(entries)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        (**self).load(keys)
    }

    fn save(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        (**self).save(entries)
    }
}
