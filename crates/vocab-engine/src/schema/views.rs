//! Command response payloads.
//!
//! Each type is serialized and flattened into a
//! [`CommandResponse`](super::common::CommandResponse).

use serde::Serialize;
use serde_json::{Map, Value};

use vocab_core::types::{AssetMeta, ReviewConfig, Status};
use vocab_storage::MergeStats;

use super::asset::AssetSnapshot;

/// Outcome of a state-changing command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitView {
    /// False when the command was a no-op and nothing was written.
    pub committed: bool,
    pub revision: u64,
    pub content_hash: String,
}

/// Outcome of a delete or purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteView {
    #[serde(flatten)]
    pub commit: CommitView,
    /// Entities actually deleted; unknown or already-deleted ids are skipped.
    pub affected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    #[serde(flatten)]
    pub commit: CommitView,
    pub mastery: u8,
    pub next_review_at: i64,
    /// The word became (or stayed) difficult on this rating.
    pub difficult: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    #[serde(flatten)]
    pub commit: CommitView,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportView {
    #[serde(flatten)]
    pub commit: CommitView,
    pub stats: MergeStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportView {
    pub asset: AssetSnapshot,
}

/// Result of a matching write acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AckView {
    pub dirty: bool,
    pub revision: u64,
    pub content_hash: String,
}

/// The full state as readers see it: the flat layout plus derived lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    /// Flat legacy layout (`vocabList`, `vocabDict`, ...).
    pub db: Map<String, Value>,
    pub asset: AssetMeta,
    pub word_count: usize,
    pub yellow_list: Vec<String>,
    pub green_list: Vec<String>,
    pub difficult_list: Vec<String>,
    pub review_config: ReviewConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueWord {
    pub id: String,
    pub meaning: String,
    pub status: Status,
    /// Effective next review time; 0 for never-reviewed words.
    pub due_at: i64,
    pub mastery: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueView {
    pub due: Vec<DueWord>,
    pub difficult_list: Vec<String>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkView {
    #[serde(flatten)]
    pub commit: CommitView,
    /// Words created or changed.
    pub words: usize,
    /// Quotes created or merged into existing ones.
    pub quotes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub changed: bool,
    pub review_config: ReviewConfig,
}
