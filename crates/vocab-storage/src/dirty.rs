//! Entity-level change detection between two store versions.
//!
//! Compares per-entity content hashes of a previous and a current
//! [`VocabState`] and sorts every entity into new, modified or removed.
//! Used for merge statistics and commit logging.

use std::collections::BTreeSet;

use vocab_core::id::{QuoteId, WordId};
use vocab_core::state::VocabState;

use crate::hash::{hash_quote, hash_word};

/// Entities of one kind that differ between two versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtySet<K: Ord> {
    /// Present now, absent before.
    pub new: BTreeSet<K>,
    /// Present in both with different content.
    pub modified: BTreeSet<K>,
    /// Present before, absent now (hard deletes).
    pub removed: BTreeSet<K>,
}

impl<K: Ord> Default for DirtySet<K> {
    fn default() -> Self {
        DirtySet {
            new: BTreeSet::new(),
            modified: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }
}

impl<K: Ord> DirtySet<K> {
    /// Returns true if nothing changed.
    pub fn is_clean(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.new.len() + self.modified.len() + self.removed.len()
    }
}

/// Word and quote changes between two versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDiff {
    pub words: DirtySet<WordId>,
    pub quotes: DirtySet<QuoteId>,
}

impl StateDiff {
    pub fn is_clean(&self) -> bool {
        self.words.is_clean() && self.quotes.is_clean()
    }
}

/// Computes which entities changed going from `previous` to `current`.
pub fn compute_dirty_set(previous: &VocabState, current: &VocabState) -> StateDiff {
    let mut diff = StateDiff::default();

    for (id, word) in &current.words {
        match previous.words.get(id) {
            Some(prev) => {
                if hash_word(prev) != hash_word(word) {
                    diff.words.modified.insert(id.clone());
                }
            }
            None => {
                diff.words.new.insert(id.clone());
            }
        }
    }
    for id in previous.words.keys() {
        if !current.words.contains_key(id) {
            diff.words.removed.insert(id.clone());
        }
    }

    for (id, quote) in &current.quotes {
        match previous.quotes.get(id) {
            Some(prev) => {
                if hash_quote(prev) != hash_quote(quote) {
                    diff.quotes.modified.insert(*id);
                }
            }
            None => {
                diff.quotes.new.insert(*id);
            }
        }
    }
    for id in previous.quotes.keys() {
        if !current.quotes.contains_key(id) {
            diff.quotes.removed.insert(*id);
        }
    }

    diff
}
