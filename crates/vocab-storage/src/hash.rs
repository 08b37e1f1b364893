//! Deterministic content hashing of the vocabulary store using blake3.
//!
//! The content hash identifies a version of the entity content. It is
//! derived state: recomputed on every commit, never trusted from input.
//!
//! # Determinism
//!
//! - Entities are hashed in id order, never in map iteration order.
//! - Every field is fed explicitly with a length prefix, so two different
//!   field layouts can never produce the same byte stream.
//! - Asset metadata (`revision`, `dirty`, timestamps of the asset itself)
//!   and review settings are excluded; only words and quotes count.

use blake3::Hasher;

use vocab_core::state::VocabState;
use vocab_core::types::{Accents, Quote, Word};

/// Domain separators so a word can never hash like a quote.
const WORD_TAG: &[u8] = b"word\0";
const QUOTE_TAG: &[u8] = b"quote\0";

fn feed_str(hasher: &mut Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn feed_i64(hasher: &mut Hasher, v: i64) {
    hasher.update(&v.to_le_bytes());
}

fn feed_bool(hasher: &mut Hasher, v: bool) {
    hasher.update(&[u8::from(v)]);
}

fn feed_list<S: AsRef<str>>(hasher: &mut Hasher, items: &[S]) {
    hasher.update(&(items.len() as u64).to_le_bytes());
    for item in items {
        feed_str(hasher, item.as_ref());
    }
}

fn feed_accents(hasher: &mut Hasher, accents: &Accents) {
    feed_str(hasher, &accents.us);
    feed_str(hasher, &accents.uk);
}

/// Feeds every content field of `word` into `hasher`.
fn feed_word(hasher: &mut Hasher, word: &Word) {
    hasher.update(WORD_TAG);
    feed_str(hasher, word.id.as_str());
    feed_str(hasher, &word.meaning);
    feed_list(hasher, word.english_meanings.as_slice());
    feed_str(hasher, &word.note);
    feed_accents(hasher, &word.phonetics);
    feed_accents(hasher, &word.audio);
    feed_str(hasher, word.status.as_str());
    feed_list(hasher, word.tags.as_slice());
    feed_bool(hasher, word.is_favorite);

    let meta = &word.meta;
    feed_i64(hasher, meta.created_at);
    feed_i64(hasher, meta.updated_at);
    feed_i64(hasher, i64::from(meta.review_count));
    feed_i64(hasher, meta.last_review_at);
    feed_i64(hasher, meta.next_review_at);
    feed_i64(hasher, i64::from(meta.mastery));
    feed_i64(hasher, i64::from(meta.low_streak));
    feed_bool(hasher, meta.is_difficult);
    feed_bool(hasher, meta.is_deleted);
    feed_str(hasher, &meta.device_id);
    feed_str(hasher, &meta.source_url);
    feed_str(hasher, &meta.source_label);
}

/// Feeds every content field of `quote` into `hasher`.
fn feed_quote(hasher: &mut Hasher, quote: &Quote) {
    hasher.update(QUOTE_TAG);
    feed_i64(hasher, quote.id.0);
    feed_str(hasher, &quote.text);
    feed_str(hasher, &quote.translation);
    feed_str(hasher, &quote.note);
    feed_str(hasher, &quote.url);
    feed_str(hasher, &quote.title);
    feed_str(hasher, &quote.source_label);
    feed_i64(hasher, quote.updated_at);
    feed_bool(hasher, quote.is_deleted);
    feed_i64(hasher, i64::from(quote.review_count));
    feed_list(hasher, quote.tags.as_slice());
    feed_bool(hasher, quote.is_favorite);
    feed_str(hasher, &quote.device_id);
}

/// Hash of a single word's content.
pub fn hash_word(word: &Word) -> blake3::Hash {
    let mut hasher = Hasher::new();
    feed_word(&mut hasher, word);
    hasher.finalize()
}

/// Hash of a single quote's content.
pub fn hash_quote(quote: &Quote) -> blake3::Hash {
    let mut hasher = Hasher::new();
    feed_quote(&mut hasher, quote);
    hasher.finalize()
}

/// Hex content hash of the whole store.
///
/// Composed from per-entity hashes in id order, so the result does not
/// depend on how the maps were built.
pub fn content_hash(state: &VocabState) -> String {
    let mut words: Vec<&Word> = state.words.values().collect();
    words.sort_by(|a, b| a.id.cmp(&b.id));
    let mut quotes: Vec<&Quote> = state.quotes.values().collect();
    quotes.sort_by_key(|q| q.id);

    let mut hasher = Hasher::new();
    hasher.update(&(words.len() as u64).to_le_bytes());
    for word in words {
        hasher.update(hash_word(word).as_bytes());
    }
    hasher.update(&(quotes.len() as u64).to_le_bytes());
    for quote in quotes {
        hasher.update(hash_quote(quote).as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::id::{QuoteId, WordId};

    fn word(id: &str) -> Word {
        let mut w = Word::new(WordId::parse(id).unwrap(), 100);
        w.meaning = format!("meaning of {id}");
        w
    }

    fn state_of(words: Vec<Word>) -> VocabState {
        let mut state = VocabState::new();
        for w in words {
            state.words.insert(w.id.clone(), w);
        }
        state
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn test_hash_is_stable() {
        let state = state_of(vec![word("apple"), word("pear")]);
        assert_eq!(content_hash(&state), content_hash(&state));
        assert_eq!(content_hash(&state).len(), 64);
    }

    #[test]
    fn test_hash_ignores_insertion_order() {
        let a = state_of(vec![word("apple"), word("pear")]);
        let b = state_of(vec![word("pear"), word("apple")]);
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_hash_ignores_asset_and_settings() {
        let a = state_of(vec![word("apple")]);
        let mut b = a.clone();
        b.asset.revision = 42;
        b.asset.dirty = true;
        b.review_config.limit = 5;
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    // -----------------------------------------------------------------------
    // Sensitivity
    // -----------------------------------------------------------------------

    #[test]
    fn test_hash_changes_with_field_edits() {
        let base = state_of(vec![word("apple")]);
        let id = WordId::parse("apple").unwrap();

        let mut noted = base.clone();
        noted.words[&id].note = "n".into();
        assert_ne!(content_hash(&base), content_hash(&noted));

        let mut deleted = base.clone();
        deleted.words[&id].meta.is_deleted = true;
        assert_ne!(content_hash(&base), content_hash(&deleted));
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        let mut a = word("x");
        a.meaning = "ab".into();
        a.note = "c".into();
        let mut b = word("x");
        b.meaning = "a".into();
        b.note = "bc".into();
        assert_ne!(hash_word(&a), hash_word(&b));
    }

    #[test]
    fn test_quotes_contribute() {
        let base = state_of(vec![word("apple")]);
        let mut with_quote = base.clone();
        with_quote
            .quotes
            .insert(QuoteId(1), Quote::new(QuoteId(1), "hello".into()));
        assert_ne!(content_hash(&base), content_hash(&with_quote));
    }
}
