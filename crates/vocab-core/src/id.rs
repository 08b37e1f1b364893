//! Identifier newtypes for vocabulary entities.
//!
//! [`WordId`] can only be obtained through [`WordId::parse`] (directly or via
//! serde), so every word id in the system is trimmed and lowercased.
//! [`QuoteId`] is the quote's creation timestamp in milliseconds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Case-normalised word identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WordId(String);

impl WordId {
    /// Trims and lowercases `raw`. Fails when nothing is left.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CoreError::EmptyWordId);
        }
        Ok(WordId(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WordId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WordId::parse(&value)
    }
}

impl From<WordId> for String {
    fn from(id: WordId) -> Self {
        id.0
    }
}

impl AsRef<str> for WordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Quote identity: the creation timestamp (ms since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub i64);

impl QuoteId {
    /// The id immediately after this one, or `None` at `i64::MAX`.
    pub fn next(self) -> Option<QuoteId> {
        self.0.checked_add(1).map(QuoteId)
    }

    /// The id immediately before this one, or `None` at `i64::MIN`.
    pub fn prev(self) -> Option<QuoteId> {
        self.0.checked_sub(1).map(QuoteId)
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised text key used to match quotes captured on different devices.
pub fn quote_text_key(text: &str) -> String {
    text.trim().to_lowercase()
}
