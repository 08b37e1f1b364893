//! Core error types for vocab-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! validation failures in the vocabulary data model.

use thiserror::Error;

/// Core errors produced by the vocab-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A word id was empty after trimming.
    #[error("word id must not be empty")]
    EmptyWordId,

    /// A quote's text was empty after trimming.
    #[error("quote text must not be empty")]
    EmptyQuoteText,

    /// A review rating fell outside `0..=5`.
    #[error("rating quality {quality} is outside 0..=5")]
    QualityOutOfRange { quality: i64 },

    /// A status string did not name any known status.
    #[error("unknown status: '{value}'")]
    UnknownStatus { value: String },
}
