pub mod error;
pub mod id;
pub mod scheduler;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use id::{quote_text_key, QuoteId, WordId};
pub use scheduler::{Quality, RatingOutcome};
pub use state::{VocabState, DIFFICULT_LIST_CAP};
pub use types::{
    english_meanings, Accents, AssetMeta, DisplayConfig, EnglishMeanings, Quote, ReviewConfig,
    Status, Word, WordMeta, MAX_ENGLISH_MEANINGS, SCHEMA_VERSION,
};
