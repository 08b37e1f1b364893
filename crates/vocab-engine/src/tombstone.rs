//! Soft and hard deletion.
//!
//! Soft deletes set `isDeleted` and keep every field so the deletion can
//! travel through sync and be revived by a later write. Purges remove the
//! entity outright. Unknown and already-deleted ids are skipped; each
//! function returns how many entities it actually changed.

use vocab_core::id::{QuoteId, WordId};

use crate::committer::Mutation;

pub fn soft_delete_words(mutation: &mut Mutation, ids: &[WordId]) -> usize {
    let now = mutation.now();
    let device_id = mutation.device_id().to_string();
    let state = mutation.state_mut();
    let mut affected = 0;
    for id in ids {
        let Some(word) = state.words.get_mut(id) else {
            continue;
        };
        if word.meta.is_deleted {
            continue;
        }
        word.meta.is_deleted = true;
        word.meta.updated_at = now;
        word.meta.device_id = device_id.clone();
        state.remove_difficult(id);
        affected += 1;
    }
    if affected > 0 {
        mutation.mark_effective();
    }
    affected
}

/// Irreversible: the word and its difficult-list entry are gone.
pub fn purge_words(mutation: &mut Mutation, ids: &[WordId]) -> usize {
    let state = mutation.state_mut();
    let mut affected = 0;
    for id in ids {
        if state.words.shift_remove(id).is_some() {
            state.remove_difficult(id);
            affected += 1;
        }
    }
    if affected > 0 {
        mutation.mark_effective();
    }
    affected
}

/// Soft-deletes every active word.
pub fn clear_all_words(mutation: &mut Mutation) -> usize {
    let ids: Vec<WordId> = mutation
        .state()
        .active_words()
        .into_iter()
        .cloned()
        .collect();
    soft_delete_words(mutation, &ids)
}

pub fn soft_delete_quotes(mutation: &mut Mutation, ids: &[QuoteId]) -> usize {
    let now = mutation.now();
    let device_id = mutation.device_id().to_string();
    let state = mutation.state_mut();
    let mut affected = 0;
    for id in ids {
        let Some(quote) = state.quotes.get_mut(id) else {
            continue;
        };
        if quote.is_deleted {
            continue;
        }
        quote.is_deleted = true;
        quote.updated_at = now;
        quote.device_id = device_id.clone();
        affected += 1;
    }
    if affected > 0 {
        mutation.mark_effective();
    }
    affected
}

pub fn purge_quotes(mutation: &mut Mutation, ids: &[QuoteId]) -> usize {
    let state = mutation.state_mut();
    let affected = ids
        .iter()
        .filter(|id| state.quotes.shift_remove(*id).is_some())
        .count();
    if affected > 0 {
        mutation.mark_effective();
    }
    affected
}
