//! Dual-representation projector.
//!
//! The store holds two layouts of the same data: the packed document and the
//! flat legacy keys. [`Projector::save`] always writes both in one store call,
//! the flat one derived from the canonical state. [`Projector::load`] reads
//! both and reconciles them when they disagree, so data written by an older
//! reader into the flat keys is never lost.

use serde_json::{json, Map, Value};

use vocab_core::state::VocabState;

use crate::convert::{decode_packed, flat_has_content, from_flat, pack, to_flat};
use crate::error::StorageError;
use crate::hash::content_hash;
use crate::reconcile::{reconcile, MergePolicy};
use crate::traits::KvStore;
use crate::types::{backup_key, FLAT_KEYS, PACKED_KEY};

/// Where a loaded state came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing was stored; an empty state was created and persisted.
    Empty,
    /// The packed document, with the flat layout already in agreement.
    Packed,
    /// Only the flat layout existed; it was migrated into the packed one.
    Flat,
    /// Both layouts existed and differed; they were merged and persisted.
    Merged { backup_key: Option<String> },
}

/// A loaded state and how it was obtained.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub state: VocabState,
    pub source: LoadSource,
}

/// Canonical load/save over a [`KvStore`].
#[derive(Debug)]
pub struct Projector<S> {
    store: S,
}

impl<S: KvStore> Projector<S> {
    pub fn new(store: S) -> Self {
        Projector { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes the packed document and the flat projection in one call.
    pub fn save(&self, state: &VocabState) -> Result<(), StorageError> {
        let mut entries = to_flat(state)?;
        entries.insert(PACKED_KEY.to_string(), serde_json::to_value(pack(state))?);
        self.store.save(entries)
    }

    /// Loads the canonical state. `now` stamps backup keys.
    pub fn load(&self, now: i64) -> Result<Loaded, StorageError> {
        let mut keys: Vec<&str> = Vec::with_capacity(FLAT_KEYS.len() + 1);
        keys.push(PACKED_KEY);
        keys.extend(FLAT_KEYS);
        let mut raw = self.store.load(&keys)?;

        let packed_raw = raw.remove(PACKED_KEY);
        let packed = match packed_raw.clone() {
            Some(value) => match decode_packed(PACKED_KEY, value) {
                Ok(state) => Some(state),
                Err(err) => {
                    tracing::warn!(error = %err, "packed document unreadable, treating as absent");
                    if let Some(value) = &packed_raw {
                        self.write_backup(now, json!({ "packed": value }));
                    }
                    None
                }
            },
            None => None,
        };

        let flat_map: Map<String, Value> = raw.into_iter().collect();
        let flat = flat_has_content(&flat_map).then(|| from_flat(&flat_map));

        match (packed, flat) {
            (None, None) => {
                let mut state = VocabState::new();
                state.asset.content_hash = content_hash(&state);
                self.save(&state)?;
                tracing::info!("initialized empty vocabulary store");
                Ok(Loaded {
                    state,
                    source: LoadSource::Empty,
                })
            }
            (Some(mut state), None) => {
                state.asset.content_hash = content_hash(&state);
                if to_flat(&state)? != flat_map {
                    self.save(&state)?;
                    tracing::info!("projected packed document into flat layout");
                }
                Ok(Loaded {
                    state,
                    source: LoadSource::Packed,
                })
            }
            (None, Some(mut state)) => {
                state.asset.content_hash = content_hash(&state);
                self.save(&state)?;
                tracing::info!(
                    words = state.words.len(),
                    quotes = state.quotes.len(),
                    "migrated flat layout into packed document"
                );
                Ok(Loaded {
                    state,
                    source: LoadSource::Flat,
                })
            }
            (Some(mut packed), Some(flat)) => {
                packed.asset.content_hash = content_hash(&packed);
                if content_hash(&flat) == packed.asset.content_hash {
                    return Ok(Loaded {
                        state: packed,
                        source: LoadSource::Packed,
                    });
                }

                let result = reconcile(&packed, &flat, MergePolicy::PreferLocal);
                if !result.changed {
                    tracing::debug!("flat layout adds nothing to packed document");
                    return Ok(Loaded {
                        state: packed,
                        source: LoadSource::Packed,
                    });
                }

                let merged_count = result.merged.active_word_count();
                let backup = if merged_count != packed.active_word_count()
                    || merged_count != flat.active_word_count()
                {
                    let snapshot = json!({
                        "packed": packed_raw.unwrap_or(Value::Null),
                        "root": Value::Object(flat_map),
                    });
                    self.write_backup(now, snapshot)
                } else {
                    None
                };

                self.save(&result.merged)?;
                tracing::info!(
                    revision = result.revision,
                    added_words = result.stats.added_words,
                    updated_words = result.stats.updated_words,
                    "merged flat layout into packed document"
                );
                Ok(Loaded {
                    state: result.merged,
                    source: LoadSource::Merged { backup_key: backup },
                })
            }
        }
    }

    /// Best-effort backup write; failures are logged and swallowed.
    fn write_backup(&self, now: i64, snapshot: Value) -> Option<String> {
        let key = backup_key(now);
        let mut entries = Map::new();
        entries.insert(key.clone(), snapshot);
        match self.store.save(entries) {
            Ok(()) => Some(key),
            Err(err) => {
                tracing::warn!(error = %err, key = %key, "failed to write pre-merge backup");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::types::{VOCAB_DICT, VOCAB_LIST, VOCAB_META, VOCAB_NOTES};
    use vocab_core::id::WordId;
    use vocab_core::types::Word;

    fn put(store: &InMemoryStore, key: &str, value: Value) {
        let mut entries = Map::new();
        entries.insert(key.to_string(), value);
        store.save(entries).unwrap();
    }

    fn state_with_apple() -> VocabState {
        let mut state = VocabState::new();
        let mut apple = Word::new(WordId::parse("apple").unwrap(), 10);
        apple.meaning = "苹果".into();
        state.words.insert(apple.id.clone(), apple);
        state.asset.revision = 4;
        state
    }

    #[test]
    fn test_empty_store_initializes_both_layouts() {
        let store = InMemoryStore::new();
        let projector = Projector::new(&store);
        let loaded = projector.load(1).unwrap();
        assert_eq!(loaded.source, LoadSource::Empty);
        assert!(loaded.state.words.is_empty());
        assert!(store.load_one(PACKED_KEY).unwrap().is_some());
        assert!(store.load_one(VOCAB_LIST).unwrap().is_some());
    }

    #[test]
    fn test_save_then_load_is_stable() {
        let store = InMemoryStore::new();
        let projector = Projector::new(&store);
        let state = state_with_apple();
        projector.save(&state).unwrap();

        let loaded = projector.load(1).unwrap();
        assert_eq!(loaded.source, LoadSource::Packed);
        assert_eq!(loaded.state.asset.revision, 4);
        assert_eq!(content_hash(&loaded.state), content_hash(&state));

        projector.save(&loaded.state).unwrap();
        let again = projector.load(2).unwrap();
        assert_eq!(again.state.asset.revision, 4);
    }

    #[test]
    fn test_blank_flat_keys_are_reprojected_without_merge() {
        let store = InMemoryStore::new();
        let projector = Projector::new(&store);
        projector.save(&state_with_apple()).unwrap();
        put(&store, VOCAB_LIST, json!([]));
        put(&store, VOCAB_DICT, json!({}));
        put(&store, VOCAB_META, json!({}));

        let loaded = projector.load(1).unwrap();
        assert_eq!(loaded.source, LoadSource::Packed);
        assert_eq!(loaded.state.asset.revision, 4);
        assert_eq!(store.load_one(VOCAB_LIST).unwrap(), Some(json!(["apple"])));
        assert!(store.load_one("vb_backup_1").unwrap().is_none());
    }

    #[test]
    fn test_flat_only_is_migrated() {
        let store = InMemoryStore::new();
        put(&store, VOCAB_LIST, json!(["Apple"]));
        put(&store, VOCAB_DICT, json!({"apple": "苹果"}));

        let projector = Projector::new(&store);
        let loaded = projector.load(1).unwrap();
        assert_eq!(loaded.source, LoadSource::Flat);
        assert_eq!(loaded.state.words.len(), 1);
        assert!(store.load_one(PACKED_KEY).unwrap().is_some());
    }

    #[test]
    fn test_flat_additions_are_merged_with_backup() {
        let store = InMemoryStore::new();
        let projector = Projector::new(&store);
        projector.save(&state_with_apple()).unwrap();

        // An older reader added a word and a note through the flat keys only.
        put(&store, VOCAB_LIST, json!(["apple", "pear"]));
        put(&store, VOCAB_DICT, json!({"apple": "苹果", "pear": "梨"}));
        put(&store, VOCAB_NOTES, json!({"apple": "red fruit"}));

        let loaded = projector.load(77).unwrap();
        assert_eq!(
            loaded.source,
            LoadSource::Merged {
                backup_key: Some("vb_backup_77".to_string())
            }
        );
        assert_eq!(loaded.state.active_word_count(), 2);
        let apple = &loaded.state.words[&WordId::parse("apple").unwrap()];
        assert_eq!(apple.meaning, "苹果");
        assert_eq!(apple.note, "red fruit");
        assert_eq!(loaded.state.asset.revision, 5);
        assert!(store.load_one("vb_backup_77").unwrap().is_some());

        // Persisted once: the next load agrees without another merge.
        let again = projector.load(78).unwrap();
        assert_eq!(again.source, LoadSource::Packed);
        assert_eq!(again.state.asset.revision, 5);
    }

    #[test]
    fn test_corrupt_packed_is_backed_up_and_ignored() {
        let store = InMemoryStore::new();
        put(&store, PACKED_KEY, json!("garbage"));
        put(&store, VOCAB_LIST, json!(["apple"]));

        let projector = Projector::new(&store);
        let loaded = projector.load(9).unwrap();
        assert_eq!(loaded.source, LoadSource::Flat);
        assert_eq!(loaded.state.words.len(), 1);
        assert_eq!(
            store.load_one("vb_backup_9").unwrap(),
            Some(json!({"packed": "garbage"}))
        );
    }
}
