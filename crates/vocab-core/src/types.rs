//! Entity types of the vocabulary store.
//!
//! [`Word`] and [`Quote`] are the two entity kinds; [`AssetMeta`] describes
//! the version of the whole store. All types serialize with camelCase field
//! names, which is the layout of the packed document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;
use crate::id::{QuoteId, WordId};

/// Packed document / asset schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// Upper bound on stored English meanings per word.
pub const MAX_ENGLISH_MEANINGS: usize = 6;

/// Ordered English glosses. Never longer than [`MAX_ENGLISH_MEANINGS`].
pub type EnglishMeanings = SmallVec<[String; MAX_ENGLISH_MEANINGS]>;

/// Builds an [`EnglishMeanings`] list from raw input: entries are trimmed,
/// blanks dropped, and the list cut at [`MAX_ENGLISH_MEANINGS`].
pub fn english_meanings<I, S>(raw: I) -> EnglishMeanings
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_ENGLISH_MEANINGS)
        .collect()
}

/// Learning status of a word.
///
/// `Red` is both the default and the "unknown" state. The legacy aliases
/// `陌生`, `new` and `unknown` all read as `Red`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    #[serde(alias = "陌生", alias = "new", alias = "unknown", alias = "")]
    Red,
    Yellow,
    Green,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Red => "red",
            Status::Yellow => "yellow",
            Status::Green => "green",
        }
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "red" | "陌生" | "new" | "unknown" => Ok(Status::Red),
            "yellow" => Ok(Status::Yellow),
            "green" => Ok(Status::Green),
            other => Err(CoreError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A US/UK pair, used for both phonetic transcriptions and audio URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accents {
    pub us: String,
    pub uk: String,
}

impl Accents {
    pub fn is_empty(&self) -> bool {
        self.us.is_empty() && self.uk.is_empty()
    }
}

/// Per-word bookkeeping: timestamps, review scheduling, lifecycle, provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordMeta {
    pub created_at: i64,
    pub updated_at: i64,
    pub review_count: u32,
    pub last_review_at: i64,
    pub next_review_at: i64,
    /// Retention score in `0..=100`.
    pub mastery: u8,
    pub low_streak: u32,
    pub is_difficult: bool,
    pub is_deleted: bool,
    pub device_id: String,
    pub source_url: String,
    pub source_label: String,
}

/// A vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub english_meanings: EnglishMeanings,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub phonetics: Accents,
    #[serde(default)]
    pub audio: Accents,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub meta: WordMeta,
}

impl Word {
    /// A fresh, empty word created at `now`.
    pub fn new(id: WordId, now: i64) -> Self {
        Word {
            id,
            meaning: String::new(),
            english_meanings: EnglishMeanings::new(),
            note: String::new(),
            phonetics: Accents::default(),
            audio: Accents::default(),
            status: Status::Red,
            tags: Vec::new(),
            is_favorite: false,
            meta: WordMeta {
                created_at: now,
                updated_at: now,
                ..WordMeta::default()
            },
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.meta.is_deleted
    }

    pub fn is_active(&self) -> bool {
        !self.meta.is_deleted
    }

    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }
}

/// A collected sentence/quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
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

impl Quote {
    /// A quote holding only `text`, created at `id`'s timestamp.
    pub fn new(id: QuoteId, text: String) -> Self {
        Quote {
            id,
            text,
            translation: String::new(),
            note: String::new(),
            url: String::new(),
            title: String::new(),
            source_label: String::new(),
            updated_at: id.0,
            is_deleted: false,
            review_count: 0,
            tags: Vec::new(),
            is_favorite: false,
            device_id: String::new(),
        }
    }

    pub fn created_at(&self) -> i64 {
        self.id.0
    }
}

/// Version metadata of the whole store (the "asset").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetMeta {
    pub schema_version: u32,
    /// Monotonic; never decreases.
    pub revision: u64,
    pub updated_at: i64,
    /// Set on every effective commit, cleared by a matching write acknowledgment.
    pub dirty: bool,
    pub content_hash: String,
    pub device_id: String,
    pub app_version: String,
}

impl Default for AssetMeta {
    fn default() -> Self {
        AssetMeta {
            schema_version: SCHEMA_VERSION,
            revision: 0,
            updated_at: 0,
            dirty: false,
            content_hash: String::new(),
            device_id: String::new(),
            app_version: String::new(),
        }
    }
}

/// Which fields a review card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub cn: bool,
    pub en: bool,
    pub note: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            cn: true,
            en: false,
            note: false,
        }
    }
}

/// Review session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewConfig {
    pub limit: u32,
    pub include_red: bool,
    pub include_yellow: bool,
    pub display: DisplayConfig,
}

impl ReviewConfig {
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Replaces a zero limit with the default.
    pub fn normalized(mut self) -> Self {
        if self.limit == 0 {
            self.limit = Self::DEFAULT_LIMIT;
        }
        self
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig {
            limit: Self::DEFAULT_LIMIT,
            include_red: true,
            include_yellow: true,
            display: DisplayConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_legacy_aliases() {
        for raw in ["\"red\"", "\"陌生\"", "\"new\"", "\"unknown\""] {
            let status: Status = serde_json::from_str(raw).unwrap();
            assert_eq!(status, Status::Red, "alias {raw}");
        }
        assert_eq!("Yellow".parse::<Status>().unwrap(), Status::Yellow);
        assert!("purple".parse::<Status>().is_err());
    }

    #[test]
    fn english_meanings_are_trimmed_and_capped() {
        let list = english_meanings(["a", " ", "b ", "c", "d", "e", "f", "g"]);
        assert_eq!(list.len(), MAX_ENGLISH_MEANINGS);
        assert_eq!(list[0], "a");
        assert_eq!(list[1], "b");
    }

    #[test]
    fn word_deserializes_with_missing_fields() {
        let word: Word = serde_json::from_str(r#"{"id":"Apple","meaning":"苹果"}"#).unwrap();
        assert_eq!(word.id.as_str(), "apple");
        assert_eq!(word.status, Status::Red);
        assert!(word.is_active());
    }

    #[test]
    fn review_config_zero_limit_uses_default() {
        let cfg = ReviewConfig {
            limit: 0,
            ..ReviewConfig::default()
        };
        assert_eq!(cfg.normalized().limit, ReviewConfig::DEFAULT_LIMIT);
    }
}
