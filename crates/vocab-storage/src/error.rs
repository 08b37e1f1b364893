//! Storage error types for vocab-storage.
//!
//! [`StorageError`] covers the failure modes of the key-value backends
//! (SQLite, migrations, lock poisoning) and of decoding stored documents.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQLite backend reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A backend failure that is not tied to a specific driver.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored document exists but does not decode to the expected shape.
    #[error("corrupt document under key {key}: {reason}")]
    CorruptDocument { key: String, reason: String },
}
