//! Storage layer for the vocabulary store.
//!
//! Provides the [`KvStore`] trait defining the key-value contract that all
//! backends implement, the [`InMemoryStore`] and [`SqliteStore`] backends,
//! and the logic that sits directly on top of stored data: the content
//! hash, the packed/flat layout conversion, the [`reconcile`] merge and the
//! [`Projector`] that keeps both layouts in agreement.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: store key constants
//! - [`traits`]: KvStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema and migration setup
//! - [`sqlite`]: SqliteStore implementation
//! - [`hash`]: blake3 content hashing
//! - [`dirty`]: entity-level change detection
//! - [`convert`]: packed and flat layout conversion
//! - [`reconcile`]: pure merge of two store versions
//! - [`projector`]: canonical load/save over both layouts

pub mod convert;
pub mod dirty;
pub mod error;
pub mod hash;
pub mod memory;
pub mod projector;
pub mod reconcile;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use dirty::{compute_dirty_set, DirtySet, StateDiff};
pub use error::StorageError;
pub use hash::{content_hash, hash_quote, hash_word};
pub use memory::InMemoryStore;
pub use projector::{LoadSource, Loaded, Projector};
pub use reconcile::{reconcile, MergePolicy, MergeStats, Reconciliation};
pub use sqlite::SqliteStore;
pub use traits::KvStore;
