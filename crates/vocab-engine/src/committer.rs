//! Mutation committer: the only path by which the store changes.
//!
//! Every state-changing command runs as one [`Committer::commit`] pass:
//! load the canonical state, apply the command to a working copy through a
//! [`Mutation`], and persist only if something effectively changed. A failed
//! command drops the working copy, so no partial state is ever written.

use vocab_core::id::{QuoteId, WordId};
use vocab_core::state::VocabState;
use vocab_core::types::{Quote, ReviewConfig, Word, SCHEMA_VERSION};
use vocab_storage::{content_hash, KvStore, Projector, Reconciliation};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::entitlements::Entitlements;
use crate::error::{EngineError, LimitKind};
use crate::schema::views::{AckView, CommitView};

/// Whether an edit may create the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Create the word if absent; revive it if tombstoned.
    CreateOrRevive,
    /// The word must already be stored (tombstoned words are revived).
    Existing,
}

/// Result of a commit pass.
#[derive(Debug, Clone)]
pub struct Commit<T> {
    pub value: T,
    /// False for no-op commands: nothing was written.
    pub committed: bool,
    pub revision: u64,
    pub content_hash: String,
}

impl<T> Commit<T> {
    pub fn view(&self) -> CommitView {
        CommitView {
            committed: self.committed,
            revision: self.revision,
            content_hash: self.content_hash.clone(),
        }
    }
}

/// A working copy of the state plus effectiveness bookkeeping.
///
/// Edits report whether they changed anything; only changing edits stamp
/// `updatedAt`/`deviceId` on the entity and make the commit effective.
#[derive(Debug)]
pub struct Mutation {
    state: VocabState,
    now: i64,
    device_id: String,
    effective: bool,
    settings_changed: bool,
    fixed_revision: Option<u64>,
}

/// Assigns `value` to `slot`, returning true if it differed.
pub fn assign<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl Mutation {
    pub(crate) fn new(state: VocabState, now: i64, device_id: &str) -> Self {
        Mutation {
            state,
            now,
            device_id: device_id.to_string(),
            effective: false,
            settings_changed: false,
            fixed_revision: None,
        }
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The working copy.
    pub fn state(&self) -> &VocabState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut VocabState {
        &mut self.state
    }

    pub(crate) fn mark_effective(&mut self) {
        self.effective = true;
    }

    pub fn is_effective(&self) -> bool {
        self.effective
    }

    /// Applies `edit` to the word `id`. `edit` returns true if it changed a
    /// field. Creation and revival always count as changes.
    pub fn edit_word<F>(&mut self, id: &WordId, presence: Presence, edit: F) -> Result<bool, EngineError>
    where
        F: FnOnce(&mut Word) -> bool,
    {
        let now = self.now;
        let mut changed = false;
        if !self.state.words.contains_key(id) {
            if presence == Presence::Existing {
                return Err(EngineError::NotFound(format!("word '{id}'")));
            }
            self.state.words.insert(id.clone(), Word::new(id.clone(), now));
            changed = true;
        }
        let Some(word) = self.state.words.get_mut(id) else {
            return Err(EngineError::NotFound(format!("word '{id}'")));
        };
        if word.meta.is_deleted {
            word.meta.is_deleted = false;
            changed = true;
        }
        changed |= edit(word);
        if changed {
            word.meta.updated_at = now;
            word.meta.device_id = self.device_id.clone();
            self.effective = true;
        }
        Ok(changed)
    }

    /// Applies `edit` to the stored quote `id`, reviving it if tombstoned.
    pub fn edit_quote<F>(&mut self, id: QuoteId, edit: F) -> Result<bool, EngineError>
    where
        F: FnOnce(&mut Quote) -> bool,
    {
        let Some(quote) = self.state.quotes.get_mut(&id) else {
            return Err(EngineError::NotFound(format!("quote {id}")));
        };
        let mut changed = false;
        if quote.is_deleted {
            quote.is_deleted = false;
            changed = true;
        }
        changed |= edit(quote);
        if changed {
            quote.updated_at = self.now;
            quote.device_id = self.device_id.clone();
            self.effective = true;
        }
        Ok(changed)
    }

    /// Stores a new quote at its id, or the next free id after it.
    pub fn insert_quote(&mut self, mut quote: Quote) -> QuoteId {
        quote.id = self.state.free_quote_id(quote.id);
        quote.updated_at = self.now;
        quote.device_id = self.device_id.clone();
        quote.is_deleted = false;
        let id = quote.id;
        self.state.quotes.insert(id, quote);
        self.effective = true;
        id
    }

    /// Moves `id` to the front of the difficult list.
    pub fn promote_difficult(&mut self, id: &WordId) {
        self.state.promote_difficult(id);
    }

    /// Review settings live outside the asset content; changing them is
    /// persisted without a revision bump.
    pub fn set_review_config(&mut self, config: ReviewConfig) -> bool {
        let changed = assign(&mut self.state.review_config, config.normalized());
        self.settings_changed |= changed;
        changed
    }

    /// Replaces the working copy with a merge result. The commit takes the
    /// merge revision instead of `previous + 1`.
    pub fn adopt(&mut self, reconciliation: Reconciliation) {
        if !reconciliation.changed {
            return;
        }
        self.fixed_revision = Some(reconciliation.revision);
        self.state = reconciliation.merged;
        self.effective = true;
    }
}

/// Loads, mutates and persists the state through a [`Projector`].
#[derive(Debug)]
pub struct Committer<S, C> {
    projector: Projector<S>,
    clock: C,
    config: EngineConfig,
}

impl<S: KvStore, C: Clock> Committer<S, C> {
    pub fn new(store: S, clock: C, config: EngineConfig) -> Self {
        Committer {
            projector: Projector::new(store),
            clock,
            config,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.projector.store()
    }

    /// The current canonical state.
    pub fn load(&self) -> Result<VocabState, EngineError> {
        Ok(self.projector.load(self.now())?.state)
    }

    /// Runs `apply` against a fresh working copy and persists the outcome.
    ///
    /// Errors from `apply` and quota violations discard the working copy.
    pub fn commit<T, F>(&self, entitlements: &Entitlements, apply: F) -> Result<Commit<T>, EngineError>
    where
        F: FnOnce(&mut Mutation) -> Result<T, EngineError>,
    {
        let previous = self.load()?;
        let mut mutation = Mutation::new(previous.clone(), self.now(), &self.config.device_id);
        let value = apply(&mut mutation)?;

        let Mutation {
            mut state,
            now,
            effective,
            settings_changed,
            fixed_revision,
            ..
        } = mutation;
        state.normalize_indices();

        if !effective {
            if settings_changed {
                self.projector.save(&state)?;
                tracing::debug!("persisted settings change without revision bump");
            } else {
                tracing::debug!(revision = previous.asset.revision, "command was a no-op");
            }
            return Ok(Commit {
                value,
                committed: false,
                revision: state.asset.revision,
                content_hash: state.asset.content_hash,
            });
        }

        check_quota(&previous, &state, entitlements)?;

        let next = previous.asset.revision.saturating_add(1);
        state.asset.revision = fixed_revision.map_or(next, |r| r.max(next));
        state.asset.schema_version = SCHEMA_VERSION;
        state.asset.updated_at = now;
        state.asset.dirty = true;
        state.asset.device_id = self.config.device_id.clone();
        state.asset.app_version = self.config.app_version.clone();
        state.asset.content_hash = content_hash(&state);
        self.projector.save(&state)?;

        tracing::info!(
            revision = state.asset.revision,
            words = state.active_word_count(),
            content_hash = %state.asset.content_hash,
            "committed mutation"
        );
        Ok(Commit {
            value,
            committed: true,
            revision: state.asset.revision,
            content_hash: state.asset.content_hash,
        })
    }

    /// Clears `dirty` if `expected` is the current content hash.
    pub fn acknowledge_write(&self, expected: &str) -> Result<AckView, EngineError> {
        let mut state = self.load()?;
        let current = content_hash(&state);
        if current != expected {
            tracing::warn!(expected, current = %current, "write acknowledgment for stale content");
            return Err(EngineError::HashMismatch {
                expected: expected.to_string(),
                current,
            });
        }
        if state.asset.dirty {
            state.asset.dirty = false;
            state.asset.content_hash = current.clone();
            self.projector.save(&state)?;
            tracing::info!(revision = state.asset.revision, "asset write acknowledged");
        }
        Ok(AckView {
            dirty: false,
            revision: state.asset.revision,
            content_hash: current,
        })
    }
}

/// Rejects a mutation that grows a quota-limited count past its limit.
/// Mutations that do not add (or that shrink an already-exceeded count)
/// always pass.
fn check_quota(
    before: &VocabState,
    after: &VocabState,
    entitlements: &Entitlements,
) -> Result<(), EngineError> {
    let checks = [
        (LimitKind::Words, entitlements.word_limit, before.active_word_count(), after.active_word_count()),
        (LimitKind::Notes, entitlements.note_limit, before.note_count(), after.note_count()),
    ];
    for (kind, limit, was, now) in checks {
        if let Some(limit) = limit {
            if now > was && now > limit {
                return Err(EngineError::LimitExceeded { kind, limit });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;
    use vocab_storage::InMemoryStore;

    type TestCommitter = Committer<Arc<InMemoryStore>, ManualClock>;

    fn committer(clock: &ManualClock) -> TestCommitter {
        Committer::new(
            Arc::new(InMemoryStore::new()),
            clock.clone(),
            EngineConfig::new("dev-test"),
        )
    }

    fn id(s: &str) -> WordId {
        WordId::parse(s).unwrap()
    }

    fn add(c: &TestCommitter, name: &str) -> Commit<bool> {
        c.commit(&Entitlements::unlimited(), |m| {
            m.edit_word(&id(name), Presence::CreateOrRevive, |w| assign(&mut w.meaning, name.to_uppercase()))
        })
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Effectiveness
    // -----------------------------------------------------------------------

    #[test]
    fn test_effective_commit_bumps_revision_and_stamps() {
        let clock = ManualClock::new(1_000);
        let c = committer(&clock);
        let commit = add(&c, "apple");
        assert!(commit.committed);
        assert_eq!(commit.revision, 1);

        let state = c.load().unwrap();
        let apple = &state.words[&id("apple")];
        assert_eq!(apple.meta.updated_at, 1_000);
        assert_eq!(apple.meta.device_id, "dev-test");
        assert!(state.asset.dirty);
        assert_eq!(state.asset.updated_at, 1_000);
        assert_eq!(state.asset.content_hash, commit.content_hash);
    }

    #[test]
    fn test_noop_commit_writes_nothing() {
        let clock = ManualClock::new(1_000);
        let c = committer(&clock);
        let first = add(&c, "apple");
        clock.advance(500);
        let second = add(&c, "apple");
        assert!(!second.committed);
        assert_eq!(second.revision, first.revision);
        assert_eq!(second.content_hash, first.content_hash);
        let state = c.load().unwrap();
        assert_eq!(state.words[&id("apple")].meta.updated_at, 1_000);
    }

    #[test]
    fn test_failed_apply_discards_working_copy() {
        let clock = ManualClock::new(1);
        let c = committer(&clock);
        let result: Result<Commit<()>, _> = c.commit(&Entitlements::unlimited(), |m| {
            m.edit_word(&id("apple"), Presence::CreateOrRevive, |_| true)?;
            Err(EngineError::Validation("late failure".into()))
        });
        assert!(result.is_err());
        assert!(c.load().unwrap().words.is_empty());
    }

    #[test]
    fn test_existing_presence_requires_word() {
        let clock = ManualClock::new(1);
        let c = committer(&clock);
        let result = c.commit(&Entitlements::unlimited(), |m| {
            m.edit_word(&id("ghost"), Presence::Existing, |_| true)
        });
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_settings_change_keeps_revision() {
        let clock = ManualClock::new(1);
        let c = committer(&clock);
        add(&c, "apple");
        let commit = c
            .commit(&Entitlements::unlimited(), |m| {
                Ok(m.set_review_config(ReviewConfig {
                    limit: 5,
                    ..ReviewConfig::default()
                }))
            })
            .unwrap();
        assert!(commit.value);
        assert!(!commit.committed);
        let state = c.load().unwrap();
        assert_eq!(state.review_config.limit, 5);
        assert_eq!(state.asset.revision, 1);
    }

    // -----------------------------------------------------------------------
    // Quotas
    // -----------------------------------------------------------------------

    #[test]
    fn test_word_limit_rejects_growth() {
        let clock = ManualClock::new(1);
        let c = committer(&clock);
        let limits = Entitlements::free(1, 10);
        c.commit(&limits, |m| m.edit_word(&id("a"), Presence::CreateOrRevive, |_| false))
            .unwrap();
        let result = c.commit(&limits, |m| {
            m.edit_word(&id("b"), Presence::CreateOrRevive, |_| false)
        });
        assert!(matches!(
            result,
            Err(EngineError::LimitExceeded {
                kind: LimitKind::Words,
                limit: 1
            })
        ));
        assert_eq!(c.load().unwrap().active_word_count(), 1);

        // Editing an existing word is still allowed at the limit.
        let edit = c
            .commit(&limits, |m| {
                m.edit_word(&id("a"), Presence::Existing, |w| assign(&mut w.meaning, "x".into()))
            })
            .unwrap();
        assert!(edit.committed);
    }

    #[test]
    fn test_note_limit_counts_words_with_notes() {
        let clock = ManualClock::new(1);
        let c = committer(&clock);
        let limits = Entitlements::free(10, 1);
        c.commit(&limits, |m| {
            m.edit_word(&id("a"), Presence::CreateOrRevive, |w| assign(&mut w.note, "n".into()))
        })
        .unwrap();
        let result = c.commit(&limits, |m| {
            m.edit_word(&id("b"), Presence::CreateOrRevive, |w| assign(&mut w.note, "n".into()))
        });
        assert!(matches!(
            result,
            Err(EngineError::LimitExceeded {
                kind: LimitKind::Notes,
                ..
            })
        ));
    }

    // -----------------------------------------------------------------------
    // Write acknowledgment
    // -----------------------------------------------------------------------

    #[test]
    fn test_acknowledge_write_clears_dirty_only_on_match() {
        let clock = ManualClock::new(1);
        let c = committer(&clock);
        let commit = add(&c, "apple");

        let err = c.acknowledge_write("not-the-hash").unwrap_err();
        assert!(matches!(err, EngineError::HashMismatch { .. }));
        assert!(c.load().unwrap().asset.dirty);

        let ack = c.acknowledge_write(&commit.content_hash).unwrap();
        assert!(!ack.dirty);
        assert_eq!(ack.revision, commit.revision);
        let state = c.load().unwrap();
        assert!(!state.asset.dirty);
        assert_eq!(state.asset.revision, commit.revision);
    }
}
