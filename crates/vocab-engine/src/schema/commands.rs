//! Command request types.
//!
//! Every state-changing or reading operation is one variant of [`Command`],
//! an internally tagged enum: `{"type": "upsertWord", "word": "apple", ...}`.
//! Optional string fields follow one rule throughout: absent or blank means
//! "leave unchanged", except where a field documents that blank clears it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vocab_core::types::{Accents, ReviewConfig};

/// A single command accepted by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Create or update a word; reviving it if tombstoned.
    UpsertWord(UpsertWord),
    /// Set or clear the note of an existing word.
    SetWordNote(SetWordNote),
    /// Set the status of existing words.
    SetWordStatus(SetWordStatus),
    /// Soft delete.
    DeleteWords(WordIds),
    /// Irreversible delete.
    HardDeleteWords(WordIds),
    /// Soft-delete every active word.
    ClearAllWords,
    /// Record a review rating.
    RateWord(RateWord),
    AddQuote(AddQuote),
    UpdateQuote(UpdateQuote),
    DeleteQuotes(QuoteIds),
    PurgeQuotes(QuoteIds),
    /// Many upserts and quote captures in one commit.
    BulkUpsert(BulkUpsert),
    SetReviewConfig(ReviewConfig),
    ExportAsset,
    ImportAsset(ImportAsset),
    MarkAssetWritten(MarkAssetWritten),
    GetState,
    ReviewQueue(ReviewQueueRequest),
}

impl Command {
    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpsertWord(_) => "upsertWord",
            Command::SetWordNote(_) => "setWordNote",
            Command::SetWordStatus(_) => "setWordStatus",
            Command::DeleteWords(_) => "deleteWords",
            Command::HardDeleteWords(_) => "hardDeleteWords",
            Command::ClearAllWords => "clearAllWords",
            Command::RateWord(_) => "rateWord",
            Command::AddQuote(_) => "addQuote",
            Command::UpdateQuote(_) => "updateQuote",
            Command::DeleteQuotes(_) => "deleteQuotes",
            Command::PurgeQuotes(_) => "purgeQuotes",
            Command::BulkUpsert(_) => "bulkUpsert",
            Command::SetReviewConfig(_) => "setReviewConfig",
            Command::ExportAsset => "exportAsset",
            Command::ImportAsset(_) => "importAsset",
            Command::MarkAssetWritten(_) => "markAssetWritten",
            Command::GetState => "getState",
            Command::ReviewQueue(_) => "reviewQueue",
        }
    }
}

/// Word fields to upsert. Blank values never overwrite stored ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertWord {
    pub word: String,
    #[serde(default)]
    pub meaning: Option<String>,
    /// Cut to the first six non-blank entries.
    #[serde(default)]
    pub english_meaning: Option<Vec<String>>,
    #[serde(default)]
    pub note: Option<String>,
    /// `red`, `yellow`, `green` or a legacy alias.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub phonetics: Option<Accents>,
    #[serde(default)]
    pub audio: Option<Accents>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_label: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl UpsertWord {
    pub fn new(word: impl Into<String>) -> Self {
        UpsertWord {
            word: word.into(),
            ..Self::default()
        }
    }

    pub fn meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// An empty `note` clears the note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWordNote {
    pub word: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWordStatus {
    pub words: Vec<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordIds {
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateWord {
    pub word: String,
    /// `0..=5`, lower is harder.
    pub quality: i64,
}

/// A captured quote. Matching an existing quote by text fills its blanks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddQuote {
    pub text: String,
    pub translation: String,
    pub url: String,
    pub title: String,
    pub note: String,
    pub source_label: String,
    /// Preferred id, used by bulk imports of previously captured quotes.
    #[serde(alias = "id")]
    pub created_at: Option<i64>,
}

/// `translation`, `url` and `title` only overwrite with non-blank values;
/// `note` may be cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuote {
    pub id: i64,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteIds {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUpsert {
    pub words: Vec<UpsertWord>,
    #[serde(alias = "sentences")]
    pub quotes: Vec<AddQuote>,
}

/// An exported asset snapshot, as opaque JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAsset {
    pub asset: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAssetWritten {
    pub content_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewQueueRequest {
    /// Overrides the configured session limit.
    pub limit: Option<u32>,
}
