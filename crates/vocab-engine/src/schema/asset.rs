//! Asset snapshot wire format.
//!
//! The asset is the portable export of the whole store: every word and quote,
//! tombstones included, plus the asset metadata. Field names follow the
//! exported file format (`englishMeaning`, `lastReviewedAt`), which differs
//! from the in-store names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vocab_core::id::{QuoteId, WordId};
use vocab_core::state::VocabState;
use vocab_core::types::{english_meanings, Accents, Quote, Status, Word, WordMeta, SCHEMA_VERSION};
use vocab_storage::reconcile::{merge_word, MergePolicy};
use vocab_storage::content_hash;

use crate::error::EngineError;

/// A complete exported snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub content_hash: String,
    pub words: Vec<AssetWord>,
    pub quotes: Vec<AssetQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetWord {
    pub id: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub english_meaning: Vec<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub phonetics: Accents,
    #[serde(default)]
    pub audio: Accents,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub last_reviewed_at: i64,
    #[serde(default)]
    pub next_review_at: i64,
    #[serde(default)]
    pub mastery: u32,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_streak: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_difficult: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuote {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub device_id: String,
}

impl From<&Word> for AssetWord {
    fn from(word: &Word) -> Self {
        AssetWord {
            id: word.id.to_string(),
            meaning: word.meaning.clone(),
            english_meaning: word.english_meanings.to_vec(),
            note: word.note.clone(),
            status: word.status.as_str().to_string(),
            phonetics: word.phonetics.clone(),
            audio: word.audio.clone(),
            review_count: word.meta.review_count,
            created_at: word.meta.created_at,
            updated_at: word.meta.updated_at,
            last_reviewed_at: word.meta.last_review_at,
            next_review_at: word.meta.next_review_at,
            mastery: u32::from(word.meta.mastery),
            is_favorite: word.is_favorite,
            tags: word.tags.clone(),
            source_url: word.meta.source_url.clone(),
            source_label: word.meta.source_label.clone(),
            is_deleted: word.meta.is_deleted,
            device_id: word.meta.device_id.clone(),
            low_streak: Some(word.meta.low_streak),
            is_difficult: Some(word.meta.is_difficult),
        }
    }
}

impl AssetWord {
    fn into_word(self, index: usize) -> Result<Word, EngineError> {
        let id = WordId::parse(&self.id)
            .map_err(|_| EngineError::BadAsset(format!("word #{index} has an empty id")))?;
        let status: Status = self
            .status
            .parse()
            .map_err(|err| EngineError::BadAsset(format!("word '{id}': {err}")))?;
        Ok(Word {
            id,
            meaning: self.meaning,
            english_meanings: english_meanings(&self.english_meaning),
            note: self.note,
            phonetics: self.phonetics,
            audio: self.audio,
            status,
            tags: self.tags,
            is_favorite: self.is_favorite,
            meta: WordMeta {
                created_at: self.created_at,
                updated_at: self.updated_at,
                review_count: self.review_count,
                last_review_at: self.last_reviewed_at,
                next_review_at: self.next_review_at,
                mastery: self.mastery.min(100) as u8,
                low_streak: self.low_streak.unwrap_or(0),
                is_difficult: self.is_difficult.unwrap_or(false),
                is_deleted: self.is_deleted,
                device_id: self.device_id,
                source_url: self.source_url,
                source_label: self.source_label,
            },
        })
    }
}

impl From<&Quote> for AssetQuote {
    fn from(quote: &Quote) -> Self {
        AssetQuote {
            id: quote.id.0,
            text: quote.text.clone(),
            translation: quote.translation.clone(),
            note: quote.note.clone(),
            url: quote.url.clone(),
            title: quote.title.clone(),
            source_label: quote.source_label.clone(),
            updated_at: quote.updated_at,
            is_deleted: quote.is_deleted,
            review_count: quote.review_count,
            tags: quote.tags.clone(),
            is_favorite: quote.is_favorite,
            device_id: quote.device_id.clone(),
        }
    }
}

impl AssetQuote {
    fn into_quote(self) -> Result<Quote, EngineError> {
        if self.text.trim().is_empty() {
            return Err(EngineError::BadAsset(format!(
                "quote {} has empty text",
                self.id
            )));
        }
        Ok(Quote {
            id: QuoteId(self.id),
            text: self.text,
            translation: self.translation,
            note: self.note,
            url: self.url,
            title: self.title,
            source_label: self.source_label,
            updated_at: match self.updated_at {
                0 => self.id,
                ts => ts,
            },
            is_deleted: self.is_deleted,
            review_count: self.review_count,
            tags: self.tags,
            is_favorite: self.is_favorite,
            device_id: self.device_id,
        })
    }
}

/// Builds the export snapshot of `state`. The content hash is recomputed.
pub fn snapshot_from_state(state: &VocabState) -> AssetSnapshot {
    AssetSnapshot {
        schema_version: SCHEMA_VERSION,
        revision: state.asset.revision,
        updated_at: state.asset.updated_at,
        device_id: state.asset.device_id.clone(),
        content_hash: content_hash(state),
        words: state.words.values().map(AssetWord::from).collect(),
        quotes: state.quotes.values().map(AssetQuote::from).collect(),
    }
}

/// Parses an imported snapshot. Any malformed part rejects the whole asset.
pub fn parse_snapshot(value: Value) -> Result<VocabState, EngineError> {
    let Value::Object(map) = &value else {
        return Err(EngineError::BadAsset("asset is not an object".into()));
    };
    match map.get("schemaVersion").and_then(Value::as_u64) {
        Some(v) if v == u64::from(SCHEMA_VERSION) => {}
        Some(v) => {
            return Err(EngineError::BadAsset(format!(
                "unsupported schemaVersion {v}"
            )))
        }
        None => return Err(EngineError::BadAsset("missing schemaVersion".into())),
    }
    for field in ["words", "quotes"] {
        if !map.get(field).is_some_and(Value::is_array) {
            return Err(EngineError::BadAsset(format!("missing '{field}' array")));
        }
    }

    let snapshot: AssetSnapshot = serde_json::from_value(value)
        .map_err(|err| EngineError::BadAsset(format!("unreadable entry: {err}")))?;

    let mut state = VocabState::new();
    for (index, raw) in snapshot.words.into_iter().enumerate() {
        let word = raw.into_word(index)?;
        let combined = match state.words.get(&word.id) {
            Some(existing) => merge_word(existing, &word, MergePolicy::LatestWins),
            None => word,
        };
        state.words.insert(combined.id.clone(), combined);
    }
    for raw in snapshot.quotes {
        let mut quote = raw.into_quote()?;
        quote.id = state.free_quote_id(quote.id);
        state.quotes.insert(quote.id, quote);
    }
    state.normalize_indices();

    state.asset.revision = snapshot.revision;
    state.asset.updated_at = snapshot.updated_at;
    state.asset.device_id = snapshot.device_id;
    state.asset.content_hash = content_hash(&state);
    Ok(state)
}
