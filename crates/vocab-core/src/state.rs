//! The canonical in-memory vocabulary document.
//!
//! [`VocabState`] owns every word and quote (tombstoned ones included) plus
//! the asset metadata. The active list and the yellow/green highlight sets
//! are computed from entity fields on demand; only the difficult list is
//! stored, because its recency order cannot be recomputed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::{quote_text_key, QuoteId, WordId};
use crate::types::{AssetMeta, Quote, ReviewConfig, Status, Word};

/// Maximum length of the difficult-word list.
pub const DIFFICULT_LIST_CAP: usize = 500;

/// The whole store: entities, difficult list, review settings, asset metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabState {
    /// Words by id, tombstones included.
    pub words: IndexMap<WordId, Word>,
    /// Quotes by id, tombstones included, in capture order.
    pub quotes: IndexMap<QuoteId, Quote>,
    /// Most-recently-difficult first.
    pub difficult: Vec<WordId>,
    pub review_config: ReviewConfig,
    pub asset: AssetMeta,
}

impl VocabState {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------
    // Derived indices
    // -------------------------------------------------------------------

    /// Ids of words that are not tombstoned, in storage order.
    pub fn active_words(&self) -> Vec<&WordId> {
        self.words
            .values()
            .filter(|w| w.is_active())
            .map(|w| &w.id)
            .collect()
    }

    pub fn active_word_count(&self) -> usize {
        self.words.values().filter(|w| w.is_active()).count()
    }

    /// Active words with the given status.
    pub fn with_status(&self, status: Status) -> Vec<&WordId> {
        self.words
            .values()
            .filter(|w| w.is_active() && w.status == status)
            .map(|w| &w.id)
            .collect()
    }

    pub fn yellow_list(&self) -> Vec<&WordId> {
        self.with_status(Status::Yellow)
    }

    pub fn green_list(&self) -> Vec<&WordId> {
        self.with_status(Status::Green)
    }

    /// Active words carrying a non-empty note.
    pub fn note_count(&self) -> usize {
        self.words
            .values()
            .filter(|w| w.is_active() && w.has_note())
            .count()
    }

    pub fn active_quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values().filter(|q| !q.is_deleted)
    }

    pub fn active_word(&self, id: &WordId) -> Option<&Word> {
        self.words.get(id).filter(|w| w.is_active())
    }

    /// Finds a quote (tombstoned or not) by normalised text.
    pub fn find_quote_by_text(&self, text: &str) -> Option<QuoteId> {
        let key = quote_text_key(text);
        self.quotes
            .values()
            .find(|q| quote_text_key(&q.text) == key)
            .map(|q| q.id)
    }

    /// `preferred` if free, otherwise the next free id after it. When every
    /// id up to `i64::MAX` is taken, the nearest free id below it.
    pub fn free_quote_id(&self, preferred: QuoteId) -> QuoteId {
        let upward = std::iter::successors(Some(preferred), |id| id.next());
        let downward = std::iter::successors(preferred.prev(), |id| id.prev());
        upward
            .chain(downward)
            .find(|id| !self.quotes.contains_key(id))
            .unwrap_or(preferred)
    }

    // -------------------------------------------------------------------
    // Difficult list
    // -------------------------------------------------------------------

    /// Moves `id` to the front of the difficult list.
    pub fn promote_difficult(&mut self, id: &WordId) {
        self.difficult.retain(|d| d != id);
        self.difficult.insert(0, id.clone());
        self.difficult.truncate(DIFFICULT_LIST_CAP);
    }

    pub fn remove_difficult(&mut self, id: &WordId) {
        self.difficult.retain(|d| d != id);
    }

    /// Restores the difficult-list invariants: only active words flagged
    /// difficult, no duplicates, at most [`DIFFICULT_LIST_CAP`] entries.
    /// Flagged words missing from the list are appended in storage order.
    pub fn normalize_indices(&mut self) {
        let mut seen = std::collections::HashSet::new();
        let words = &self.words;
        self.difficult.retain(|id| {
            words
                .get(id)
                .map(|w| w.is_active() && w.meta.is_difficult)
                .unwrap_or(false)
                && seen.insert(id.clone())
        });
        for word in self.words.values() {
            if word.is_active() && word.meta.is_difficult && !seen.contains(&word.id) {
                seen.insert(word.id.clone());
                self.difficult.push(word.id.clone());
            }
        }
        self.difficult.truncate(DIFFICULT_LIST_CAP);
    }

    /// Difficult list as stored, restricted to active words.
    pub fn difficult_list(&self) -> Vec<&WordId> {
        self.difficult
            .iter()
            .filter(|id| self.active_word(id).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str, status: Status) -> Word {
        let mut w = Word::new(WordId::parse(id).unwrap(), 1);
        w.status = status;
        w
    }

    fn state_with(words: Vec<Word>) -> VocabState {
        let mut state = VocabState::new();
        for w in words {
            state.words.insert(w.id.clone(), w);
        }
        state
    }

    #[test]
    fn test_derived_lists_skip_tombstones() {
        let mut gone = word("gone", Status::Yellow);
        gone.meta.is_deleted = true;
        let state = state_with(vec![
            word("apple", Status::Yellow),
            word("pear", Status::Green),
            word("plum", Status::Red),
            gone,
        ]);

        let active: Vec<&str> = state.active_words().iter().map(|i| i.as_str()).collect();
        assert_eq!(active, vec!["apple", "pear", "plum"]);
        assert_eq!(state.yellow_list().len(), 1);
        assert_eq!(state.green_list().len(), 1);
        assert!(state.words.contains_key(&WordId::parse("gone").unwrap()));
    }

    #[test]
    fn test_promote_difficult_moves_to_front() {
        let mut state = state_with(vec![word("a", Status::Red), word("b", Status::Red)]);
        let a = WordId::parse("a").unwrap();
        let b = WordId::parse("b").unwrap();
        state.promote_difficult(&a);
        state.promote_difficult(&b);
        state.promote_difficult(&a);
        assert_eq!(state.difficult, vec![a, b]);
    }

    #[test]
    fn test_difficult_list_capped() {
        let mut state = VocabState::new();
        for i in 0..(DIFFICULT_LIST_CAP + 10) {
            state.promote_difficult(&WordId::parse(&format!("w{i}")).unwrap());
        }
        assert_eq!(state.difficult.len(), DIFFICULT_LIST_CAP);
        assert_eq!(state.difficult[0].as_str(), format!("w{}", DIFFICULT_LIST_CAP + 9));
    }

    #[test]
    fn test_normalize_indices_drops_deleted_and_adds_flagged() {
        let mut deleted = word("deleted", Status::Red);
        deleted.meta.is_difficult = true;
        deleted.meta.is_deleted = true;
        let mut flagged = word("flagged", Status::Red);
        flagged.meta.is_difficult = true;
        let mut state = state_with(vec![deleted, flagged, word("plain", Status::Red)]);
        state.difficult = vec![
            WordId::parse("deleted").unwrap(),
            WordId::parse("plain").unwrap(),
            WordId::parse("missing").unwrap(),
        ];

        state.normalize_indices();
        assert_eq!(state.difficult, vec![WordId::parse("flagged").unwrap()]);
    }

    #[test]
    fn test_free_quote_id_skips_taken() {
        let mut state = VocabState::new();
        state.quotes.insert(QuoteId(5), Quote::new(QuoteId(5), "a".into()));
        state.quotes.insert(QuoteId(6), Quote::new(QuoteId(6), "b".into()));
        assert_eq!(state.free_quote_id(QuoteId(5)), QuoteId(7));
        assert_eq!(state.free_quote_id(QuoteId(9)), QuoteId(9));
    }

    #[test]
    fn test_free_quote_id_at_max_searches_downward() {
        let mut state = VocabState::new();
        for id in [i64::MAX, i64::MAX - 1] {
            state.quotes.insert(QuoteId(id), Quote::new(QuoteId(id), "a".into()));
        }
        assert_eq!(state.free_quote_id(QuoteId(i64::MAX)), QuoteId(i64::MAX - 2));
        assert_eq!(state.free_quote_id(QuoteId(i64::MAX - 1)), QuoteId(i64::MAX - 2));
    }

    #[test]
    fn test_find_quote_by_text_is_case_insensitive() {
        let mut state = VocabState::new();
        state
            .quotes
            .insert(QuoteId(1), Quote::new(QuoteId(1), "Hello World".into()));
        assert_eq!(state.find_quote_by_text("  hello world "), Some(QuoteId(1)));
        assert_eq!(state.find_quote_by_text("other"), None);
    }
}
