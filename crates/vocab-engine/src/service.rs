//! VocabService: the single coordinator between callers and the
//! core/storage crates.
//!
//! All business logic flows through [`VocabService`]. Callers either use the
//! typed methods or hand a [`Command`] to [`VocabService::execute`], which
//! never fails: every error becomes a failed [`CommandResponse`].

use serde_json::Value;

use vocab_core::id::{QuoteId, WordId};
use vocab_core::scheduler::{apply_rating, effective_next_review, is_due, Quality};
use vocab_core::state::VocabState;
use vocab_core::types::{english_meanings, Accents, Quote, ReviewConfig, Status};
use vocab_core::CoreError;
use vocab_storage::convert::to_flat;
use vocab_storage::{reconcile, KvStore, MergePolicy, MergeStats};

use crate::clock::{Clock, SystemClock};
use crate::committer::{assign, Commit, Committer, Mutation, Presence};
use crate::config::EngineConfig;
use crate::entitlements::{Capability, EntitlementProvider, Entitlements};
use crate::error::EngineError;
use crate::schema::asset::{parse_snapshot, snapshot_from_state};
use crate::schema::commands::{AddQuote, BulkUpsert, Command, UpdateQuote, UpsertWord};
use crate::schema::common::CommandResponse;
use crate::schema::views::{
    AckView, BulkView, CommitView, DeleteView, DueWord, ExportView, ImportView, QuoteView,
    RatingView, ReviewQueueView, SettingsView, StateView,
};
use crate::tombstone;

/// Command service over one injected store.
///
/// Holds no cached state: every command reloads from the store, so several
/// services sharing one store see each other's writes.
#[derive(Debug)]
pub struct VocabService<S, E = Entitlements, C = SystemClock> {
    committer: Committer<S, C>,
    entitlements: E,
}

impl<S: KvStore, E: EntitlementProvider> VocabService<S, E, SystemClock> {
    /// Opens a service on the wall clock, resolving the device id from the
    /// environment or the store.
    pub fn open(store: S, entitlements: E) -> Result<Self, EngineError> {
        let config = EngineConfig::from_env(&store)?;
        Ok(Self::new(store, entitlements, SystemClock, config))
    }
}

impl<S: KvStore, E: EntitlementProvider, C: Clock> VocabService<S, E, C> {
    pub fn new(store: S, entitlements: E, clock: C, config: EngineConfig) -> Self {
        VocabService {
            committer: Committer::new(store, clock, config),
            entitlements,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.committer.config()
    }

    pub fn store(&self) -> &S {
        self.committer.store()
    }

    /// The current canonical state.
    pub fn load_state(&self) -> Result<VocabState, EngineError> {
        self.committer.load()
    }

    fn commit<T, F>(&self, apply: F) -> Result<Commit<T>, EngineError>
    where
        F: FnOnce(&mut Mutation) -> Result<T, EngineError>,
    {
        let entitlements = self.entitlements.entitlements();
        self.committer.commit(&entitlements, apply)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Runs one command. Never panics or returns an error.
    pub fn execute(&self, command: Command) -> CommandResponse {
        let name = command.name();
        let response = match command {
            Command::UpsertWord(p) => CommandResponse::from_result(self.upsert_word(&p)),
            Command::SetWordNote(p) => {
                CommandResponse::from_result(self.set_word_note(&p.word, &p.note))
            }
            Command::SetWordStatus(p) => {
                CommandResponse::from_result(self.set_word_status(&p.words, &p.status))
            }
            Command::DeleteWords(p) => CommandResponse::from_result(self.delete_words(&p.words)),
            Command::HardDeleteWords(p) => {
                CommandResponse::from_result(self.hard_delete_words(&p.words))
            }
            Command::ClearAllWords => CommandResponse::from_result(self.clear_all_words()),
            Command::RateWord(p) => CommandResponse::from_result(self.rate_word(&p.word, p.quality)),
            Command::AddQuote(p) => CommandResponse::from_result(self.add_quote(&p)),
            Command::UpdateQuote(p) => CommandResponse::from_result(self.update_quote(&p)),
            Command::DeleteQuotes(p) => CommandResponse::from_result(self.delete_quotes(&p.ids)),
            Command::PurgeQuotes(p) => CommandResponse::from_result(self.purge_quotes(&p.ids)),
            Command::BulkUpsert(p) => CommandResponse::from_result(self.bulk_upsert(&p)),
            Command::SetReviewConfig(p) => CommandResponse::from_result(self.set_review_config(p)),
            Command::ExportAsset => CommandResponse::from_result(self.export_asset()),
            Command::ImportAsset(p) => CommandResponse::from_result(self.import_asset(p.asset)),
            Command::MarkAssetWritten(p) => {
                CommandResponse::from_result(self.mark_asset_written(&p.content_hash))
            }
            Command::GetState => CommandResponse::from_result(self.get_state()),
            Command::ReviewQueue(p) => CommandResponse::from_result(self.review_queue(p.limit)),
        };
        if response.ok {
            tracing::debug!(command = name, "command succeeded");
        } else {
            tracing::debug!(
                command = name,
                error = response.error.as_deref().unwrap_or_default(),
                "command failed"
            );
        }
        response
    }

    // -----------------------------------------------------------------------
    // Words
    // -----------------------------------------------------------------------

    /// Creates or updates a word. Blank fields leave stored values alone.
    pub fn upsert_word(&self, payload: &UpsertWord) -> Result<CommitView, EngineError> {
        let commit = self.commit(|m| apply_upsert(m, payload))?;
        Ok(commit.view())
    }

    /// Sets the note of a stored word; an empty note clears it.
    pub fn set_word_note(&self, word: &str, note: &str) -> Result<CommitView, EngineError> {
        let id = WordId::parse(word)?;
        let commit = self.commit(|m| {
            m.edit_word(&id, Presence::Existing, |w| {
                assign(&mut w.note, note.trim().to_string())
            })
        })?;
        Ok(commit.view())
    }

    /// Sets the status of every listed word. Any unknown id fails the whole
    /// command.
    pub fn set_word_status(&self, words: &[String], status: &str) -> Result<CommitView, EngineError> {
        let ids = parse_word_ids(words)?;
        if status.trim().is_empty() {
            return Err(EngineError::Validation("status is required".into()));
        }
        let status: Status = status.parse()?;
        let commit = self.commit(|m| {
            for id in &ids {
                m.edit_word(id, Presence::Existing, |w| assign(&mut w.status, status))?;
            }
            Ok(())
        })?;
        Ok(commit.view())
    }

    pub fn delete_words(&self, words: &[String]) -> Result<DeleteView, EngineError> {
        let ids = parse_word_ids(words)?;
        let commit = self.commit(|m| Ok(tombstone::soft_delete_words(m, &ids)))?;
        Ok(DeleteView {
            commit: commit.view(),
            affected: commit.value,
        })
    }

    pub fn hard_delete_words(&self, words: &[String]) -> Result<DeleteView, EngineError> {
        let ids = parse_word_ids(words)?;
        let commit = self.commit(|m| Ok(tombstone::purge_words(m, &ids)))?;
        if commit.value > 0 {
            tracing::info!(purged = commit.value, "hard-deleted words");
        }
        Ok(DeleteView {
            commit: commit.view(),
            affected: commit.value,
        })
    }

    pub fn clear_all_words(&self) -> Result<DeleteView, EngineError> {
        let commit = self.commit(|m| Ok(tombstone::clear_all_words(m)))?;
        Ok(DeleteView {
            commit: commit.view(),
            affected: commit.value,
        })
    }

    /// Records a review rating and moves a newly difficult word to the front
    /// of the difficult list.
    pub fn rate_word(&self, word: &str, quality: i64) -> Result<RatingView, EngineError> {
        let id = WordId::parse(word)?;
        let quality = Quality::new(quality)?;
        let commit = self.commit(|m| {
            let now = m.now();
            let mut rated = None;
            m.edit_word(&id, Presence::Existing, |w| {
                let outcome = apply_rating(&mut w.meta, quality, now);
                rated = Some((outcome, w.meta.mastery, w.meta.next_review_at));
                true
            })?;
            let Some((outcome, mastery, next_review_at)) = rated else {
                return Err(EngineError::NotFound(format!("word '{id}'")));
            };
            if outcome.difficult {
                m.promote_difficult(&id);
            }
            Ok((outcome.difficult, mastery, next_review_at))
        })?;
        let (difficult, mastery, next_review_at) = commit.value;
        Ok(RatingView {
            commit: commit.view(),
            mastery,
            next_review_at,
            difficult,
        })
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    pub fn add_quote(&self, payload: &AddQuote) -> Result<QuoteView, EngineError> {
        let commit = self.commit(|m| apply_add_quote(m, payload))?;
        let (id, _) = commit.value;
        Ok(QuoteView {
            commit: commit.view(),
            id: id.0,
        })
    }

    pub fn update_quote(&self, payload: &UpdateQuote) -> Result<QuoteView, EngineError> {
        let commit = self.commit(|m| {
            m.edit_quote(QuoteId(payload.id), |q| {
                let mut changed = fill(&mut q.translation, payload.translation.as_deref());
                changed |= fill(&mut q.url, payload.url.as_deref());
                changed |= fill(&mut q.title, payload.title.as_deref());
                if let Some(note) = &payload.note {
                    changed |= assign(&mut q.note, note.trim().to_string());
                }
                changed
            })
        })?;
        Ok(QuoteView {
            commit: commit.view(),
            id: payload.id,
        })
    }

    pub fn delete_quotes(&self, ids: &[i64]) -> Result<DeleteView, EngineError> {
        let ids = quote_ids(ids)?;
        let commit = self.commit(|m| Ok(tombstone::soft_delete_quotes(m, &ids)))?;
        Ok(DeleteView {
            commit: commit.view(),
            affected: commit.value,
        })
    }

    pub fn purge_quotes(&self, ids: &[i64]) -> Result<DeleteView, EngineError> {
        let ids = quote_ids(ids)?;
        let commit = self.commit(|m| Ok(tombstone::purge_quotes(m, &ids)))?;
        Ok(DeleteView {
            commit: commit.view(),
            affected: commit.value,
        })
    }

    // -----------------------------------------------------------------------
    // Bulk, settings, asset
    // -----------------------------------------------------------------------

    /// All upserts and quote captures land in one commit, or none do.
    pub fn bulk_upsert(&self, payload: &BulkUpsert) -> Result<BulkView, EngineError> {
        self.entitlements.entitlements().require(Capability::BulkEdit)?;
        let commit = self.commit(|m| {
            let mut words = 0;
            for word in &payload.words {
                if apply_upsert(m, word)? {
                    words += 1;
                }
            }
            let mut quotes = 0;
            for quote in &payload.quotes {
                if apply_add_quote(m, quote)?.1 {
                    quotes += 1;
                }
            }
            Ok((words, quotes))
        })?;
        let (words, quotes) = commit.value;
        Ok(BulkView {
            commit: commit.view(),
            words,
            quotes,
        })
    }

    /// Changing anything other than the session limit needs
    /// [`Capability::ReviewModeAdvanced`].
    pub fn set_review_config(&self, config: ReviewConfig) -> Result<SettingsView, EngineError> {
        let entitlements = self.entitlements.entitlements();
        let requested = config.normalized();
        let commit = self.committer.commit(&entitlements, |m| {
            let limit_only = ReviewConfig {
                limit: requested.limit,
                ..m.state().review_config
            };
            if requested != limit_only {
                entitlements.require(Capability::ReviewModeAdvanced)?;
            }
            Ok(m.set_review_config(requested))
        })?;
        Ok(SettingsView {
            changed: commit.value,
            review_config: requested,
        })
    }

    pub fn export_asset(&self) -> Result<ExportView, EngineError> {
        self.entitlements.entitlements().require(Capability::ImportExport)?;
        let state = self.committer.load()?;
        Ok(ExportView {
            asset: snapshot_from_state(&state),
        })
    }

    /// Merges an exported snapshot into the store, newest edits winning.
    pub fn import_asset(&self, asset: Value) -> Result<ImportView, EngineError> {
        self.entitlements.entitlements().require(Capability::ImportExport)?;
        let incoming = parse_snapshot(asset)?;
        let commit = self.commit(|m| {
            let merged = reconcile(m.state(), &incoming, MergePolicy::LatestWins);
            let stats: MergeStats = merged.stats;
            m.adopt(merged);
            Ok(stats)
        })?;
        tracing::info!(
            committed = commit.committed,
            added_words = commit.value.added_words,
            updated_words = commit.value.updated_words,
            added_quotes = commit.value.added_quotes,
            "imported asset"
        );
        Ok(ImportView {
            commit: commit.view(),
            stats: commit.value,
        })
    }

    pub fn mark_asset_written(&self, content_hash: &str) -> Result<AckView, EngineError> {
        self.committer.acknowledge_write(content_hash)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_state(&self) -> Result<StateView, EngineError> {
        let state = self.committer.load()?;
        let names = |ids: Vec<&WordId>| -> Vec<String> { ids.into_iter().map(WordId::to_string).collect() };
        Ok(StateView {
            db: to_flat(&state)?,
            word_count: state.active_word_count(),
            yellow_list: names(state.yellow_list()),
            green_list: names(state.green_list()),
            difficult_list: names(state.difficult_list()),
            review_config: state.review_config,
            asset: state.asset.clone(),
        })
    }

    /// Due words by due time then id, capped at `limit` or the configured
    /// session limit. Green words never appear.
    pub fn review_queue(&self, limit: Option<u32>) -> Result<ReviewQueueView, EngineError> {
        let state = self.committer.load()?;
        let now = self.committer.now();
        let config = state.review_config.normalized();
        let limit = limit.filter(|l| *l > 0).unwrap_or(config.limit);

        let mut due: Vec<DueWord> = state
            .words
            .values()
            .filter(|w| w.is_active())
            .filter(|w| match w.status {
                Status::Red => config.include_red,
                Status::Yellow => config.include_yellow,
                Status::Green => false,
            })
            .filter(|w| is_due(&w.meta, now))
            .map(|w| DueWord {
                id: w.id.to_string(),
                meaning: w.meaning.clone(),
                status: w.status,
                due_at: effective_next_review(&w.meta),
                mastery: w.meta.mastery,
            })
            .collect();
        due.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.id.cmp(&b.id)));
        due.truncate(limit as usize);

        Ok(ReviewQueueView {
            due,
            difficult_list: state
                .difficult_list()
                .into_iter()
                .map(WordId::to_string)
                .collect(),
            limit,
        })
    }
}

// ---------------------------------------------------------------------------
// Mutation helpers
// ---------------------------------------------------------------------------

/// Overwrites `slot` with the trimmed value when it is non-blank.
fn fill(slot: &mut String, value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => assign(slot, v.to_string()),
        _ => false,
    }
}

fn fill_accents(slot: &mut Accents, value: Option<&Accents>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let us = fill(&mut slot.us, Some(&value.us));
    let uk = fill(&mut slot.uk, Some(&value.uk));
    us || uk
}

fn apply_upsert(m: &mut Mutation, p: &UpsertWord) -> Result<bool, EngineError> {
    let id = WordId::parse(&p.word)?;
    let status = match p.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<Status>()?),
        _ => None,
    };
    let english = p.english_meaning.as_ref().map(english_meanings);
    let tags: Option<Vec<String>> = p.tags.as_ref().map(|tags| {
        tags.iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    });

    m.edit_word(&id, Presence::CreateOrRevive, |w| {
        let mut changed = fill(&mut w.meaning, p.meaning.as_deref());
        if let Some(list) = english.filter(|l| !l.is_empty()) {
            changed |= assign(&mut w.english_meanings, list);
        }
        changed |= fill(&mut w.note, p.note.as_deref());
        if let Some(status) = status {
            changed |= assign(&mut w.status, status);
        }
        changed |= fill_accents(&mut w.phonetics, p.phonetics.as_ref());
        changed |= fill_accents(&mut w.audio, p.audio.as_ref());
        changed |= fill(&mut w.meta.source_url, p.source_url.as_deref());
        changed |= fill(&mut w.meta.source_label, p.source_label.as_deref());
        if let Some(tags) = tags.filter(|t| !t.is_empty()) {
            changed |= assign(&mut w.tags, tags);
        }
        if let Some(favorite) = p.is_favorite {
            changed |= assign(&mut w.is_favorite, favorite);
        }
        changed
    })
}

/// Fills the blanks of a quote with the same text, or stores a new one.
/// Returns the quote's id and whether anything changed.
fn apply_add_quote(m: &mut Mutation, p: &AddQuote) -> Result<(QuoteId, bool), EngineError> {
    let text = p.text.trim();
    if text.is_empty() {
        return Err(CoreError::EmptyQuoteText.into());
    }

    if let Some(existing) = m.state().find_quote_by_text(text) {
        let changed = m.edit_quote(existing, |q| {
            let mut changed = fill_blank(&mut q.translation, &p.translation);
            changed |= fill_blank(&mut q.url, &p.url);
            changed |= fill_blank(&mut q.title, &p.title);
            changed |= fill_blank(&mut q.note, &p.note);
            changed |= fill_blank(&mut q.source_label, &p.source_label);
            changed
        })?;
        return Ok((existing, changed));
    }

    let preferred = QuoteId(p.created_at.filter(|t| *t > 0).unwrap_or_else(|| m.now()));
    let mut quote = Quote::new(preferred, text.to_string());
    quote.translation = p.translation.trim().to_string();
    quote.url = p.url.trim().to_string();
    quote.title = p.title.trim().to_string();
    quote.note = p.note.trim().to_string();
    quote.source_label = p.source_label.trim().to_string();
    Ok((m.insert_quote(quote), true))
}

/// Sets `slot` only while it is still blank.
fn fill_blank(slot: &mut String, value: &str) -> bool {
    if slot.trim().is_empty() {
        fill(slot, Some(value))
    } else {
        false
    }
}

fn parse_word_ids(words: &[String]) -> Result<Vec<WordId>, EngineError> {
    if words.is_empty() {
        return Err(EngineError::Validation("no words given".into()));
    }
    words
        .iter()
        .map(|w| WordId::parse(w).map_err(EngineError::from))
        .collect()
}

fn quote_ids(ids: &[i64]) -> Result<Vec<QuoteId>, EngineError> {
    if ids.is_empty() {
        return Err(EngineError::Validation("no quote ids given".into()));
    }
    Ok(ids.iter().copied().map(QuoteId).collect())
}
