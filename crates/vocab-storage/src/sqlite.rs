//! SQLite implementation of [`KvStore`].
//!
//! [`SqliteStore`] keeps every key in one `kv` table, values as JSON TEXT.
//! Each `save` runs in a single transaction, so a packed document and its
//! flat projection always land together. Several `SqliteStore`s opened on
//! the same file behave like independent browser contexts sharing storage.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::traits::KvStore;

/// SQLite-backed implementation of [`KvStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        tracing::info!(path, "opened sqlite store");
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

impl KvStore for SqliteStore {
    fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
            let mut out = HashMap::with_capacity(keys.len());
            for key in keys {
                let raw: Option<String> = stmt
                    .query_row(params![key], |row| row.get(0))
                    .optional()?;
                if let Some(raw) = raw {
                    out.insert(key.to_string(), serde_json::from_str(&raw)?);
                }
            }
            Ok(out)
        })
    }

    fn save(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = CAST(strftime('%s', 'now') AS INTEGER) * 1000",
                )?;
                for (key, value) in &entries {
                    let raw = serde_json::to_string(value)?;
                    stmt.execute(params![key, raw])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}
