//! Deterministic merge of two versions of the vocabulary store.
//!
//! [`reconcile`] is a pure function: it never reads the clock or the store.
//! Entities present on one side only are taken as they are. Entities
//! present on both sides are merged field by field so that no non-empty
//! value is lost to an empty one, and so that under [`MergePolicy::LatestWins`]
//! swapping the arguments yields the same content.
//!
//! Tombstones: when exactly one side has deleted an entity, the side with
//! the later `updatedAt` wins outright; on a tie the live side wins.

use std::cmp::Ordering;

use serde::Serialize;

use vocab_core::id::{quote_text_key, QuoteId, WordId};
use vocab_core::state::VocabState;
use vocab_core::types::{Accents, EnglishMeanings, Quote, Word, WordMeta};

use crate::dirty::compute_dirty_set;
use crate::hash::content_hash;

/// How scalar conflicts between two non-empty values are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The side with the later `updatedAt` wins; ties break on the value.
    LatestWins,
    /// The local side wins; the other side only fills blanks.
    PreferLocal,
}

/// Entity counts relative to the local side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    pub added_words: usize,
    pub updated_words: usize,
    pub added_quotes: usize,
    pub updated_quotes: usize,
}

/// Result of a merge.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub merged: VocabState,
    /// Merged content differs from the local content.
    pub changed: bool,
    /// `max(local, other) + 1`, already stored in `merged.asset.revision`.
    pub revision: u64,
    pub stats: MergeStats,
}

/// Which side a resolved conflict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Local,
    Other,
    Tie,
}

/// Decides which side is "newer" for scalar conflicts.
fn newer(policy: MergePolicy, local_ts: i64, other_ts: i64) -> Side {
    match policy {
        MergePolicy::PreferLocal => Side::Local,
        MergePolicy::LatestWins => match local_ts.cmp(&other_ts) {
            Ordering::Greater => Side::Local,
            Ordering::Less => Side::Other,
            Ordering::Equal => Side::Tie,
        },
    }
}

/// Picks between two strings: non-empty beats empty, then the newer side,
/// then the longer and lexicographically greater value.
fn pick_str(local: &str, other: &str, side: Side) -> String {
    match (local.trim().is_empty(), other.trim().is_empty()) {
        (false, true) => return local.to_string(),
        (true, false) => return other.to_string(),
        _ if local == other => return local.to_string(),
        _ => {}
    }
    match side {
        Side::Local => local.to_string(),
        Side::Other => other.to_string(),
        Side::Tie => {
            let by_len = local.chars().count().cmp(&other.chars().count());
            match by_len.then_with(|| local.cmp(other)) {
                Ordering::Less => other.to_string(),
                _ => local.to_string(),
            }
        }
    }
}

/// Picks the longer list; equal lengths follow the newer side, ties break on
/// content.
fn pick_list<T: Clone + Ord>(local: &[T], other: &[T], side: Side) -> Vec<T> {
    match local.len().cmp(&other.len()) {
        Ordering::Greater => local.to_vec(),
        Ordering::Less => other.to_vec(),
        Ordering::Equal => match side {
            Side::Local => local.to_vec(),
            Side::Other => other.to_vec(),
            Side::Tie => std::cmp::max(local, other).to_vec(),
        },
    }
}

fn pick_accents(local: &Accents, other: &Accents, side: Side) -> Accents {
    Accents {
        us: pick_str(&local.us, &other.us, side),
        uk: pick_str(&local.uk, &other.uk, side),
    }
}

fn earliest_non_zero(a: i64, b: i64) -> i64 {
    match (a, b) {
        (0, b) => b,
        (a, 0) => a,
        (a, b) => a.min(b),
    }
}

fn scheduler_key(meta: &WordMeta) -> (i64, i64, u8, u32) {
    (
        meta.last_review_at,
        meta.next_review_at,
        meta.mastery,
        meta.low_streak,
    )
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// Field-level merge of two records of the same word. The tombstone flag is
/// set by the caller.
fn merge_word_fields(local: &Word, other: &Word, policy: MergePolicy) -> Word {
    let side = newer(policy, local.meta.updated_at, other.meta.updated_at);

    let status = match side {
        Side::Local => local.status,
        Side::Other => other.status,
        Side::Tie => std::cmp::max(local.status, other.status),
    };
    let is_favorite = match side {
        Side::Local => local.is_favorite,
        Side::Other => other.is_favorite,
        Side::Tie => local.is_favorite || other.is_favorite,
    };

    // Scheduler fields travel together from the most recently reviewed side.
    let schedule = if scheduler_key(&local.meta) >= scheduler_key(&other.meta) {
        &local.meta
    } else {
        &other.meta
    };

    let meta = WordMeta {
        created_at: earliest_non_zero(local.meta.created_at, other.meta.created_at),
        updated_at: local.meta.updated_at.max(other.meta.updated_at),
        review_count: local.meta.review_count.max(other.meta.review_count),
        last_review_at: schedule.last_review_at,
        next_review_at: schedule.next_review_at,
        mastery: schedule.mastery,
        low_streak: schedule.low_streak,
        is_difficult: local.meta.is_difficult || other.meta.is_difficult,
        is_deleted: local.meta.is_deleted,
        device_id: pick_str(&local.meta.device_id, &other.meta.device_id, side),
        source_url: pick_str(&local.meta.source_url, &other.meta.source_url, side),
        source_label: pick_str(&local.meta.source_label, &other.meta.source_label, side),
    };

    Word {
        id: local.id.clone(),
        meaning: pick_str(&local.meaning, &other.meaning, side),
        english_meanings: EnglishMeanings::from_vec(pick_list(
            local.english_meanings.as_slice(),
            other.english_meanings.as_slice(),
            side,
        )),
        note: pick_str(&local.note, &other.note, side),
        phonetics: pick_accents(&local.phonetics, &other.phonetics, side),
        audio: pick_accents(&local.audio, &other.audio, side),
        status,
        tags: pick_list(local.tags.as_slice(), other.tags.as_slice(), side),
        is_favorite,
        meta,
    }
}

/// Merges two records of the same word.
pub fn merge_word(local: &Word, other: &Word, policy: MergePolicy) -> Word {
    match (local.is_deleted(), other.is_deleted()) {
        (true, true) | (false, false) => merge_word_fields(local, other, policy),
        (local_deleted, _) => {
            let local_wins = match local.meta.updated_at.cmp(&other.meta.updated_at) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => !local_deleted,
            };
            if local_wins {
                local.clone()
            } else {
                other.clone()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Merges two records of the same quote. The id is chosen by the caller.
pub fn merge_quote(local: &Quote, other: &Quote, policy: MergePolicy) -> Quote {
    if local.is_deleted != other.is_deleted {
        let local_wins = match local.updated_at.cmp(&other.updated_at) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => !local.is_deleted,
        };
        return if local_wins {
            local.clone()
        } else {
            other.clone()
        };
    }

    let side = newer(policy, local.updated_at, other.updated_at);
    let is_favorite = match side {
        Side::Local => local.is_favorite,
        Side::Other => other.is_favorite,
        Side::Tie => local.is_favorite || other.is_favorite,
    };
    Quote {
        id: local.id,
        text: pick_str(&local.text, &other.text, side),
        translation: pick_str(&local.translation, &other.translation, side),
        note: pick_str(&local.note, &other.note, side),
        url: pick_str(&local.url, &other.url, side),
        title: pick_str(&local.title, &other.title, side),
        source_label: pick_str(&local.source_label, &other.source_label, side),
        updated_at: local.updated_at.max(other.updated_at),
        is_deleted: local.is_deleted,
        review_count: local.review_count.max(other.review_count),
        tags: pick_list(local.tags.as_slice(), other.tags.as_slice(), side),
        is_favorite,
        device_id: pick_str(&local.device_id, &other.device_id, side),
    }
}

/// Folds `incoming` into `merged`, matching by id, then by normalised text.
fn fold_quote(merged: &mut VocabState, incoming: &Quote, policy: MergePolicy) {
    let key = quote_text_key(&incoming.text);

    if let Some(existing) = merged.quotes.get(&incoming.id) {
        if quote_text_key(&existing.text) == key {
            let combined = merge_quote(existing, incoming, policy);
            merged.quotes.insert(incoming.id, Quote { id: incoming.id, ..combined });
            return;
        }
    }

    if let Some(existing_id) = merged.find_quote_by_text(&incoming.text) {
        if let Some(existing) = merged.quotes.get(&existing_id) {
            let mut combined = merge_quote(existing, incoming, policy);
            // Same quote captured twice: keep the earlier creation id when free.
            let target = if incoming.id < existing_id && !merged.quotes.contains_key(&incoming.id) {
                incoming.id
            } else {
                existing_id
            };
            combined.id = target;
            if target != existing_id {
                merged.quotes.shift_remove(&existing_id);
            }
            merged.quotes.insert(target, combined);
        }
        return;
    }

    let id = merged.free_quote_id(incoming.id);
    merged.quotes.insert(
        id,
        Quote {
            id,
            ..incoming.clone()
        },
    );
}

// ---------------------------------------------------------------------------
// Whole-store merge
// ---------------------------------------------------------------------------

/// Merges `other` into `local`.
///
/// The merged revision is `max(local, other) + 1` whether or not content
/// changed; callers persist only when `changed` is true.
pub fn reconcile(local: &VocabState, other: &VocabState, policy: MergePolicy) -> Reconciliation {
    let mut merged = local.clone();

    for (id, incoming) in &other.words {
        let combined = match merged.words.get(id) {
            Some(existing) => merge_word(existing, incoming, policy),
            None => incoming.clone(),
        };
        merged.words.insert(id.clone(), combined);
    }

    for incoming in other.quotes.values() {
        fold_quote(&mut merged, incoming, policy);
    }

    let mut seen: std::collections::HashSet<WordId> = merged.difficult.iter().cloned().collect();
    for id in &other.difficult {
        if seen.insert(id.clone()) {
            merged.difficult.push(id.clone());
        }
    }
    merged.normalize_indices();

    let local_hash = content_hash(local);
    let merged_hash = content_hash(&merged);
    let changed = merged_hash != local_hash;
    let revision = local.asset.revision.max(other.asset.revision).saturating_add(1);

    merged.asset.revision = revision;
    merged.asset.content_hash = merged_hash;
    merged.asset.updated_at = local.asset.updated_at.max(other.asset.updated_at);
    merged.asset.dirty = local.asset.dirty || changed;

    let diff = compute_dirty_set(local, &merged);
    let stats = MergeStats {
        added_words: diff.words.new.len(),
        updated_words: diff.words.modified.len(),
        added_quotes: diff.quotes.new.len(),
        updated_quotes: diff.quotes.modified.len() + diff.quotes.removed.len(),
    };

    tracing::debug!(
        changed,
        revision,
        added_words = stats.added_words,
        updated_words = stats.updated_words,
        "reconciled store versions"
    );

    Reconciliation {
        merged,
        changed,
        revision,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vocab_core::types::Status;

    fn id(s: &str) -> WordId {
        WordId::parse(s).unwrap()
    }

    fn word(name: &str, updated_at: i64) -> Word {
        let mut w = Word::new(id(name), 1);
        w.meta.updated_at = updated_at;
        w
    }

    fn state_of(words: Vec<Word>, revision: u64) -> VocabState {
        let mut state = VocabState::new();
        for w in words {
            state.words.insert(w.id.clone(), w);
        }
        state.asset.revision = revision;
        state.normalize_indices();
        state
    }

    // -----------------------------------------------------------------------
    // Whole-store properties
    // -----------------------------------------------------------------------

    #[test]
    fn test_self_merge_is_unchanged() {
        let mut apple = word("apple", 10);
        apple.meaning = "苹果".into();
        let state = state_of(vec![apple, word("pear", 20)], 3);

        let result = reconcile(&state, &state, MergePolicy::LatestWins);
        assert!(!result.changed);
        assert_eq!(content_hash(&result.merged), content_hash(&state));
        assert_eq!(result.stats, MergeStats::default());
    }

    #[test]
    fn test_revision_is_max_plus_one() {
        let local = state_of(vec![word("a", 1)], 3);
        let other = state_of(vec![word("b", 1)], 5);
        let result = reconcile(&local, &other, MergePolicy::LatestWins);
        assert_eq!(result.revision, 6);
        assert_eq!(result.merged.asset.revision, 6);
        assert!(result.changed);
        assert_eq!(result.stats.added_words, 1);
    }

    #[test]
    fn test_union_of_disjoint_words() {
        let local = state_of(vec![word("a", 1)], 0);
        let other = state_of(vec![word("b", 1)], 0);
        let result = reconcile(&local, &other, MergePolicy::LatestWins);
        assert_eq!(result.merged.words.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Field rules
    // -----------------------------------------------------------------------

    #[test]
    fn test_empty_never_overwrites_non_empty() {
        let mut local = word("apple", 10);
        local.meaning = "苹果".into();
        let mut other = word("apple", 99);
        other.note = "newer note".into();

        let merged = merge_word(&local, &other, MergePolicy::LatestWins);
        assert_eq!(merged.meaning, "苹果");
        assert_eq!(merged.note, "newer note");
        assert_eq!(merged.meta.updated_at, 99);
    }

    #[test]
    fn test_newer_side_wins_string_conflict() {
        let mut local = word("apple", 10);
        local.meaning = "old".into();
        let mut other = word("apple", 20);
        other.meaning = "new".into();
        assert_eq!(merge_word(&local, &other, MergePolicy::LatestWins).meaning, "new");
        assert_eq!(merge_word(&other, &local, MergePolicy::LatestWins).meaning, "new");
        assert_eq!(merge_word(&local, &other, MergePolicy::PreferLocal).meaning, "old");
    }

    #[test]
    fn test_equal_timestamps_resolve_symmetrically() {
        let mut a = word("apple", 10);
        a.meaning = "short".into();
        let mut b = word("apple", 10);
        b.meaning = "much longer".into();
        let ab = merge_word(&a, &b, MergePolicy::LatestWins);
        let ba = merge_word(&b, &a, MergePolicy::LatestWins);
        assert_eq!(ab.meaning, "much longer");
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_counters_and_scheduler_fields() {
        let mut local = word("apple", 10);
        local.meta.review_count = 3;
        local.meta.last_review_at = 100;
        local.meta.mastery = 40;
        local.meta.created_at = 0;
        let mut other = word("apple", 5);
        other.meta.review_count = 5;
        other.meta.last_review_at = 200;
        other.meta.next_review_at = 500;
        other.meta.mastery = 60;
        other.meta.created_at = 7;
        other.meta.is_difficult = true;

        let merged = merge_word(&local, &other, MergePolicy::LatestWins);
        assert_eq!(merged.meta.review_count, 5);
        assert_eq!(merged.meta.last_review_at, 200);
        assert_eq!(merged.meta.next_review_at, 500);
        assert_eq!(merged.meta.mastery, 60);
        assert_eq!(merged.meta.created_at, 7);
        assert!(merged.meta.is_difficult);
    }

    #[test]
    fn test_longer_list_wins() {
        let mut local = word("apple", 10);
        local.tags = vec!["a".into()];
        let mut other = word("apple", 1);
        other.tags = vec!["a".into(), "b".into()];
        assert_eq!(merge_word(&local, &other, MergePolicy::LatestWins).tags.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Tombstones
    // -----------------------------------------------------------------------

    #[test]
    fn test_later_tombstone_wins() {
        let live = word("apple", 10);
        let mut dead = word("apple", 20);
        dead.meta.is_deleted = true;
        assert!(merge_word(&live, &dead, MergePolicy::LatestWins).is_deleted());
        assert!(merge_word(&dead, &live, MergePolicy::LatestWins).is_deleted());
    }

    #[test]
    fn test_later_edit_revives() {
        let mut dead = word("apple", 10);
        dead.meta.is_deleted = true;
        let live = word("apple", 20);
        assert!(!merge_word(&dead, &live, MergePolicy::LatestWins).is_deleted());
    }

    #[test]
    fn test_tombstone_tie_goes_to_live_side() {
        let live = word("apple", 10);
        let mut dead = word("apple", 10);
        dead.meta.is_deleted = true;
        assert!(!merge_word(&live, &dead, MergePolicy::LatestWins).is_deleted());
        assert!(!merge_word(&dead, &live, MergePolicy::LatestWins).is_deleted());
    }

    #[test]
    fn test_both_tombstoned_keeps_tombstone() {
        let mut a = word("apple", 10);
        a.meta.is_deleted = true;
        a.meaning = "苹果".into();
        let mut b = word("apple", 20);
        b.meta.is_deleted = true;
        b.note = "n".into();
        let merged = merge_word(&a, &b, MergePolicy::LatestWins);
        assert!(merged.is_deleted());
        assert_eq!(merged.meaning, "苹果");
        assert_eq!(merged.note, "n");
    }

    #[test]
    fn test_deleted_word_leaves_difficult_list() {
        let mut hard = word("hard", 10);
        hard.meta.is_difficult = true;
        let local = state_of(vec![hard.clone()], 1);
        assert_eq!(local.difficult.len(), 1);

        let mut dead = hard;
        dead.meta.is_deleted = true;
        dead.meta.updated_at = 20;
        let other = state_of(vec![dead], 1);

        let result = reconcile(&local, &other, MergePolicy::LatestWins);
        assert!(result.merged.difficult.is_empty());
        assert!(result.merged.active_words().is_empty());
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    #[test]
    fn test_quotes_match_by_text() {
        let mut local = VocabState::new();
        local
            .quotes
            .insert(QuoteId(10), Quote::new(QuoteId(10), "Hello".into()));
        let mut other = VocabState::new();
        let mut q = Quote::new(QuoteId(20), "hello ".into());
        q.translation = "你好".into();
        other.quotes.insert(q.id, q);

        let result = reconcile(&local, &other, MergePolicy::LatestWins);
        assert_eq!(result.merged.quotes.len(), 1);
        let merged = &result.merged.quotes[&QuoteId(10)];
        assert_eq!(merged.translation, "你好");
        assert_eq!(result.stats.updated_quotes, 1);
    }

    #[test]
    fn test_quote_id_collision_gets_next_id() {
        let mut local = VocabState::new();
        local
            .quotes
            .insert(QuoteId(10), Quote::new(QuoteId(10), "one".into()));
        let mut other = VocabState::new();
        other
            .quotes
            .insert(QuoteId(10), Quote::new(QuoteId(10), "two".into()));

        let result = reconcile(&local, &other, MergePolicy::LatestWins);
        assert_eq!(result.merged.quotes.len(), 2);
        assert_eq!(result.merged.quotes[&QuoteId(11)].text, "two");
        assert_eq!(result.stats.added_quotes, 1);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_word(name: &'static str) -> impl Strategy<Value = Word> {
        (
            ("[a-z]{0,6}", "[a-z]{0,6}", 0i64..50, 0u32..10),
            (0i64..1000, 0u8..=100, any::<bool>(), any::<bool>()),
            prop_oneof![Just(Status::Red), Just(Status::Yellow), Just(Status::Green)],
            proptest::collection::vec("[a-z]{1,4}", 0..3),
        )
            .prop_map(
                move |((meaning, note, updated, reviews), (last, mastery, deleted, difficult), status, tags)| {
                    let mut w = Word::new(WordId::parse(name).unwrap(), 1);
                    w.meaning = meaning;
                    w.note = note;
                    w.meta.updated_at = updated;
                    w.meta.review_count = reviews;
                    w.meta.last_review_at = last;
                    w.meta.mastery = mastery;
                    w.meta.is_deleted = deleted;
                    w.meta.is_difficult = difficult;
                    w.status = status;
                    w.tags = tags;
                    w
                },
            )
    }

    const QUOTE_TEXTS: [&str; 3] = ["Hello there", "The cat sat.", "Rain again"];

    /// A quote carrying one of the shared texts, possibly in another case, so
    /// quotes from different states fold together by text.
    fn arb_quote(id: i64, text: &'static str) -> impl Strategy<Value = Quote> {
        (any::<bool>(), "[a-z]{0,4}", 0i64..50, any::<bool>(), 0u32..5).prop_map(
            move |(lower, translation, updated, deleted, reviews)| {
                let text = if lower { text.to_lowercase() } else { text.to_string() };
                let mut q = Quote::new(QuoteId(id), text);
                q.translation = translation;
                q.updated_at = updated;
                q.is_deleted = deleted;
                q.review_count = reviews;
                q
            },
        )
    }

    /// States whose quote ids start at `quote_base`. Two states built from
    /// different bases never share a quote id.
    fn arb_state(quote_base: i64) -> impl Strategy<Value = VocabState> {
        (
            proptest::option::of(arb_word("alpha")),
            proptest::option::of(arb_word("beta")),
            proptest::option::of(arb_word("gamma")),
            proptest::option::of(arb_quote(quote_base, QUOTE_TEXTS[0])),
            proptest::option::of(arb_quote(quote_base + 1, QUOTE_TEXTS[1])),
            proptest::option::of(arb_quote(quote_base + 2, QUOTE_TEXTS[2])),
            0u64..20,
        )
            .prop_map(|(a, b, c, q1, q2, q3, revision)| {
                let mut state = state_of(a.into_iter().chain(b).chain(c).collect(), revision);
                for q in q1.into_iter().chain(q2).chain(q3) {
                    state.quotes.insert(q.id, q);
                }
                state
            })
    }

    fn difficult_set(state: &VocabState) -> std::collections::BTreeSet<WordId> {
        state.difficult.iter().cloned().collect()
    }

    proptest! {
        #[test]
        fn prop_self_merge_is_idempotent(state in arb_state(100)) {
            let result = reconcile(&state, &state, MergePolicy::LatestWins);
            prop_assert!(!result.changed);
            prop_assert_eq!(content_hash(&result.merged), content_hash(&state));
            prop_assert_eq!(difficult_set(&result.merged), difficult_set(&state));
        }

        #[test]
        fn prop_merge_is_convergent(a in arb_state(100), b in arb_state(200)) {
            let ab = reconcile(&a, &b, MergePolicy::LatestWins);
            let ba = reconcile(&b, &a, MergePolicy::LatestWins);
            prop_assert_eq!(content_hash(&ab.merged), content_hash(&ba.merged));
            prop_assert_eq!(difficult_set(&ab.merged), difficult_set(&ba.merged));
            prop_assert_eq!(ab.merged.quotes.len(), ba.merged.quotes.len());
            prop_assert_eq!(ab.revision, ba.revision);
        }

        #[test]
        fn prop_merged_quotes_fold_by_text(a in arb_state(100), b in arb_state(200)) {
            let merged = reconcile(&a, &b, MergePolicy::LatestWins).merged;
            let mut keys: Vec<String> =
                merged.quotes.values().map(|q| quote_text_key(&q.text)).collect();
            let total = keys.len();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(keys.len(), total);
            for q in merged.quotes.values() {
                prop_assert!(q.id.0 >= 100 && q.id.0 < 203);
            }
        }

        #[test]
        fn prop_tombstone_against_edit_follows_timestamps(
            a in arb_word("alpha"),
            b in arb_word("alpha"),
        ) {
            let merged = merge_word(&a, &b, MergePolicy::LatestWins);
            if a.is_deleted() != b.is_deleted() {
                let expect_deleted = match a.meta.updated_at.cmp(&b.meta.updated_at) {
                    Ordering::Greater => a.is_deleted(),
                    Ordering::Less => b.is_deleted(),
                    Ordering::Equal => false,
                };
                prop_assert_eq!(merged.is_deleted(), expect_deleted);
            } else {
                prop_assert_eq!(merged.is_deleted(), a.is_deleted());
            }
        }

        #[test]
        fn prop_merge_revision_exceeds_inputs(a in arb_state(100), b in arb_state(200)) {
            let result = reconcile(&a, &b, MergePolicy::LatestWins);
            prop_assert!(result.revision > a.asset.revision);
            prop_assert!(result.revision > b.asset.revision);
        }
    }
}
