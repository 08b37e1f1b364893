//! Conversion between [`VocabState`] and its two stored layouts.
//!
//! # Packed layout
//!
//! One JSON document under [`PACKED_KEY`](crate::types::PACKED_KEY):
//! [`PackedDocument`], entity lists plus asset metadata. [`pack`] and
//! [`unpack`] convert in both directions.
//!
//! # Flat layout
//!
//! The legacy top-level keys (`vocabList`, `vocabDict`, ...). [`to_flat`] always
//! derives it from the canonical state. [`from_flat`] is the migration path
//! and is lenient: keys are case-folded, duplicate keys merged preferring
//! non-empty values, and older value shapes (string sentences, `{meaning}`
//! dictionary entries, scalar English meanings) are accepted.
//!
//! Per-word fields that the legacy layout had no place for (status of a
//! tombstoned word, tags, favourite flag) ride along inside the `vocabMeta`
//! entry, which makes the projection lossless for entity content.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use vocab_core::id::{quote_text_key, QuoteId, WordId};
use vocab_core::state::VocabState;
use vocab_core::types::{
    english_meanings, Accents, AssetMeta, EnglishMeanings, Quote, ReviewConfig, Status, Word,
    WordMeta, SCHEMA_VERSION,
};

use crate::error::StorageError;
use crate::types::{
    COLLECTED_SENTENCES, CONFIG, DIFFICULT_LIST, FLAT_KEYS, GREEN_LIST, VOCAB_AUDIO, VOCAB_DICT,
    VOCAB_EN, VOCAB_LIST, VOCAB_META, VOCAB_NOTES, VOCAB_PHONETICS, YELLOW_LIST,
};

/// The packed canonical document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub words: Vec<Word>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub difficult_list: Vec<WordId>,
    #[serde(default)]
    pub review_config: ReviewConfig,
    #[serde(default)]
    pub asset: AssetMeta,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

// ---------------------------------------------------------------------------
// Packed layout
// ---------------------------------------------------------------------------

/// Flattens the state into a [`PackedDocument`].
pub fn pack(state: &VocabState) -> PackedDocument {
    PackedDocument {
        schema_version: SCHEMA_VERSION,
        words: state.words.values().cloned().collect(),
        quotes: state.quotes.values().cloned().collect(),
        difficult_list: state.difficult.clone(),
        review_config: state.review_config,
        asset: state.asset.clone(),
    }
}

/// Rebuilds a state from a [`PackedDocument`].
///
/// Duplicate word ids keep the most recently updated record; colliding
/// quote ids are moved to the next free id.
pub fn unpack(doc: PackedDocument) -> VocabState {
    let mut state = VocabState::new();
    for word in doc.words {
        match state.words.get(&word.id) {
            Some(existing) if existing.meta.updated_at >= word.meta.updated_at => {}
            _ => {
                state.words.insert(word.id.clone(), word);
            }
        }
    }
    for mut quote in doc.quotes {
        quote.id = state.free_quote_id(quote.id);
        state.quotes.insert(quote.id, quote);
    }
    state.difficult = doc.difficult_list;
    state.review_config = doc.review_config.normalized();
    state.asset = doc.asset;
    state.normalize_indices();
    state
}

/// Decodes whatever is stored under the packed key.
///
/// Older builds stored the flat-shaped object under the packed key too; such
/// documents are read through [`from_flat`].
pub fn decode_packed(key: &str, value: Value) -> Result<VocabState, StorageError> {
    let Value::Object(obj) = value else {
        return Err(StorageError::CorruptDocument {
            key: key.to_string(),
            reason: "not a JSON object".to_string(),
        });
    };
    if obj.contains_key("words") {
        let doc: PackedDocument =
            serde_json::from_value(Value::Object(obj)).map_err(|e| StorageError::CorruptDocument {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        return Ok(unpack(doc));
    }
    if FLAT_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Ok(from_flat(&obj));
    }
    Err(StorageError::CorruptDocument {
        key: key.to_string(),
        reason: "neither packed nor flat layout".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Flat layout: write side
// ---------------------------------------------------------------------------

/// `vocabMeta` entry: the word metadata plus fields the legacy layout lacks.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatMetaOut<'a> {
    #[serde(flatten)]
    meta: &'a WordMeta,
    status: Status,
    tags: &'a [String],
    is_favorite: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatQuoteOut<'a> {
    created_at: i64,
    #[serde(flatten)]
    quote: &'a Quote,
}

fn ids_value<'a>(ids: impl IntoIterator<Item = &'a WordId>) -> Value {
    Value::Array(ids.into_iter().map(|id| json!(id.as_str())).collect())
}

/// Derives the flat legacy layout from the canonical state.
///
/// Tombstoned words keep their per-id entries (`vocabMeta` carries
/// `isDeleted`) but are left out of every list.
pub fn to_flat(state: &VocabState) -> Result<Map<String, Value>, StorageError> {
    let mut dict = Map::new();
    let mut notes = Map::new();
    let mut meta = Map::new();
    let mut en = Map::new();
    let mut phonetics = Map::new();
    let mut audio = Map::new();

    for word in state.words.values() {
        let key = word.id.as_str().to_string();
        if !word.meaning.is_empty() {
            dict.insert(key.clone(), json!(word.meaning));
        }
        if !word.note.is_empty() {
            notes.insert(key.clone(), json!(word.note));
        }
        if !word.english_meanings.is_empty() {
            en.insert(key.clone(), serde_json::to_value(&word.english_meanings)?);
        }
        if !word.phonetics.is_empty() {
            phonetics.insert(key.clone(), serde_json::to_value(&word.phonetics)?);
        }
        if !word.audio.is_empty() {
            audio.insert(key.clone(), serde_json::to_value(&word.audio)?);
        }
        let entry = FlatMetaOut {
            meta: &word.meta,
            status: word.status,
            tags: &word.tags,
            is_favorite: word.is_favorite,
        };
        meta.insert(key, serde_json::to_value(entry)?);
    }

    let sentences = state
        .quotes
        .values()
        .map(|quote| {
            serde_json::to_value(FlatQuoteOut {
                created_at: quote.created_at(),
                quote,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut flat = Map::new();
    flat.insert(VOCAB_LIST.into(), ids_value(state.active_words()));
    flat.insert(VOCAB_DICT.into(), Value::Object(dict));
    flat.insert(VOCAB_NOTES.into(), Value::Object(notes));
    flat.insert(VOCAB_META.into(), Value::Object(meta));
    flat.insert(VOCAB_EN.into(), Value::Object(en));
    flat.insert(VOCAB_PHONETICS.into(), Value::Object(phonetics));
    flat.insert(VOCAB_AUDIO.into(), Value::Object(audio));
    flat.insert(YELLOW_LIST.into(), ids_value(state.yellow_list()));
    flat.insert(GREEN_LIST.into(), ids_value(state.green_list()));
    flat.insert(DIFFICULT_LIST.into(), ids_value(state.difficult_list()));
    flat.insert(COLLECTED_SENTENCES.into(), Value::Array(sentences));
    flat.insert(
        CONFIG.into(),
        json!({ "reviewConfig": serde_json::to_value(state.review_config)? }),
    );
    Ok(flat)
}

// ---------------------------------------------------------------------------
// Flat layout: read side
// ---------------------------------------------------------------------------

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Merges two values found under case-variant keys of the same map.
fn prefer_non_empty(a: Value, b: Value) -> Value {
    match (a, b) {
        (a, b) if is_blank(&a) => {
            if is_blank(&b) {
                a
            } else {
                b
            }
        }
        (Value::String(a), Value::String(b)) => {
            if a.trim().len() >= b.trim().len() {
                Value::String(a)
            } else {
                Value::String(b)
            }
        }
        (Value::Object(mut a), Value::String(b)) => {
            if a.get("meaning").map(is_blank).unwrap_or(true) {
                a.insert("meaning".into(), Value::String(b));
            }
            Value::Object(a)
        }
        (Value::String(a), Value::Object(mut b)) => {
            if b.get("meaning").map(is_blank).unwrap_or(true) {
                b.insert("meaning".into(), Value::String(a));
            }
            Value::Object(b)
        }
        (Value::Object(mut a), Value::Object(b)) => {
            for (k, v) in b {
                let missing = a.get(&k).map(is_blank).unwrap_or(true);
                if missing && !is_blank(&v) {
                    a.insert(k, v);
                }
            }
            Value::Object(a)
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() >= b.len() {
                Value::Array(a)
            } else {
                Value::Array(b)
            }
        }
        (a, _) => a,
    }
}

/// Per-id map with case-folded keys; unparseable keys are dropped.
fn keyed_map(value: Option<&Value>) -> BTreeMap<WordId, Value> {
    let mut out: BTreeMap<WordId, Value> = BTreeMap::new();
    let Some(Value::Object(src)) = value else {
        return out;
    };
    for (raw_key, v) in src {
        let Ok(id) = WordId::parse(raw_key) else {
            continue;
        };
        let merged = match out.remove(&id) {
            Some(existing) => prefer_non_empty(existing, v.clone()),
            None => v.clone(),
        };
        out.insert(id, merged);
    }
    out
}

/// De-duplicated, case-folded id list.
fn id_list(value: Option<&Value>) -> Vec<WordId> {
    let mut seen = HashSet::new();
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| WordId::parse(s).ok())
                .filter(|id| seen.insert(id.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Reads an integer, accepting floats and numeric strings from older writers.
fn int_field(obj: &Map<String, Value>, key: &str) -> i64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    }
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn meaning_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => str_field(obj, "meaning"),
        _ => String::new(),
    }
}

fn english_from(value: &Value) -> EnglishMeanings {
    match value {
        Value::Array(items) => english_meanings(items.iter().filter_map(Value::as_str)),
        Value::String(s) => english_meanings([s.as_str()]),
        _ => EnglishMeanings::new(),
    }
}

fn accents_from(value: &Value) -> Accents {
    match value {
        Value::Object(obj) => Accents {
            us: str_field(obj, "us"),
            uk: str_field(obj, "uk"),
        },
        _ => Accents::default(),
    }
}

fn clamp_u32(v: i64) -> u32 {
    v.clamp(0, i64::from(u32::MAX)) as u32
}

/// Reads a `vocabMeta` entry. Returns the metadata and, when present, the
/// extra fields carried alongside it.
fn meta_from(value: &Value) -> (WordMeta, Option<Status>, Vec<String>, bool) {
    let Value::Object(obj) = value else {
        return (WordMeta::default(), None, Vec::new(), false);
    };
    let meta = WordMeta {
        created_at: int_field(obj, "createdAt"),
        updated_at: int_field(obj, "updatedAt"),
        review_count: clamp_u32(int_field(obj, "reviewCount")),
        last_review_at: int_field(obj, "lastReviewAt"),
        next_review_at: int_field(obj, "nextReviewAt"),
        mastery: int_field(obj, "mastery").clamp(0, 100) as u8,
        low_streak: clamp_u32(int_field(obj, "lowStreak")),
        is_difficult: bool_field(obj, "isDifficult"),
        is_deleted: bool_field(obj, "isDeleted"),
        device_id: str_field(obj, "deviceId"),
        source_url: str_field(obj, "sourceUrl"),
        source_label: str_field(obj, "sourceLabel"),
    };
    let status = obj
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Status>().ok());
    let tags = string_list(obj.get("tags"));
    let favorite = bool_field(obj, "isFavorite");
    (meta, status, tags, favorite)
}

/// Reads one `collectedSentences` entry: a bare string or an object.
fn quote_from(value: &Value) -> Option<Quote> {
    match value {
        Value::String(text) if !text.trim().is_empty() => {
            Some(Quote::new(QuoteId(0), text.trim().to_string()))
        }
        Value::Object(obj) => {
            let text = str_field(obj, "text").trim().to_string();
            if text.is_empty() {
                return None;
            }
            let created = match int_field(obj, "createdAt") {
                0 => int_field(obj, "id"),
                ts => ts,
            };
            let mut quote = Quote::new(QuoteId(created), text);
            quote.translation = str_field(obj, "translation");
            quote.note = str_field(obj, "note");
            quote.url = str_field(obj, "url");
            quote.title = str_field(obj, "title");
            quote.source_label = str_field(obj, "sourceLabel");
            quote.updated_at = if obj.contains_key("updatedAt") {
                int_field(obj, "updatedAt")
            } else {
                created
            };
            quote.is_deleted = bool_field(obj, "isDeleted");
            quote.review_count = clamp_u32(int_field(obj, "reviewCount"));
            quote.tags = string_list(obj.get("tags"));
            quote.is_favorite = bool_field(obj, "isFavorite");
            quote.device_id = str_field(obj, "deviceId");
            Some(quote)
        }
        _ => None,
    }
}

fn fill_blank(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        *target = source.to_string();
    }
}

/// Builds a canonical state from the flat legacy layout.
///
/// The word set is the union of `vocabList` and the keys of every per-id
/// map. Status comes from the `vocabMeta` entry when present, otherwise
/// from yellow/green list membership. Ids on `difficultList` are flagged
/// difficult. Asset metadata is left at its defaults.
pub fn from_flat(flat: &Map<String, Value>) -> VocabState {
    let dict = keyed_map(flat.get(VOCAB_DICT));
    let notes = keyed_map(flat.get(VOCAB_NOTES));
    let metas = keyed_map(flat.get(VOCAB_META));
    let en = keyed_map(flat.get(VOCAB_EN));
    let phonetics = keyed_map(flat.get(VOCAB_PHONETICS));
    let audio = keyed_map(flat.get(VOCAB_AUDIO));
    let yellow: HashSet<WordId> = id_list(flat.get(YELLOW_LIST)).into_iter().collect();
    let green: HashSet<WordId> = id_list(flat.get(GREEN_LIST)).into_iter().collect();
    let difficult = id_list(flat.get(DIFFICULT_LIST));

    let mut order = id_list(flat.get(VOCAB_LIST));
    let mut seen: HashSet<WordId> = order.iter().cloned().collect();
    for map in [&dict, &notes, &metas, &en, &phonetics, &audio] {
        for id in map.keys() {
            if seen.insert(id.clone()) {
                order.push(id.clone());
            }
        }
    }

    let mut state = VocabState::new();
    for id in order {
        let (meta, status, tags, is_favorite) = metas
            .get(&id)
            .map(meta_from)
            .unwrap_or_else(|| (WordMeta::default(), None, Vec::new(), false));
        let status = status.unwrap_or(if green.contains(&id) {
            Status::Green
        } else if yellow.contains(&id) {
            Status::Yellow
        } else {
            Status::Red
        });
        let mut word = Word {
            id: id.clone(),
            meaning: dict.get(&id).map(meaning_text).unwrap_or_default(),
            english_meanings: en.get(&id).map(english_from).unwrap_or_default(),
            note: notes
                .get(&id)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default(),
            phonetics: phonetics.get(&id).map(accents_from).unwrap_or_default(),
            audio: audio.get(&id).map(accents_from).unwrap_or_default(),
            status,
            tags,
            is_favorite,
            meta,
        };
        if difficult.contains(&id) && word.is_active() {
            word.meta.is_difficult = true;
        }
        state.words.insert(id, word);
    }
    state.difficult = difficult;

    if let Some(Value::Array(items)) = flat.get(COLLECTED_SENTENCES) {
        for quote in items.iter().filter_map(quote_from) {
            if let Some(existing_id) = state.find_quote_by_text(&quote.text) {
                if let Some(existing) = state.quotes.get_mut(&existing_id) {
                    fill_blank(&mut existing.translation, &quote.translation);
                    fill_blank(&mut existing.note, &quote.note);
                    fill_blank(&mut existing.url, &quote.url);
                    fill_blank(&mut existing.title, &quote.title);
                    fill_blank(&mut existing.source_label, &quote.source_label);
                }
                continue;
            }
            let mut quote = quote;
            let id = state.free_quote_id(quote.id);
            if quote.updated_at == quote.id.0 {
                quote.updated_at = id.0;
            }
            quote.id = id;
            state.quotes.insert(id, quote);
        }
    }

    state.review_config = flat
        .get(CONFIG)
        .and_then(|c| c.get("reviewConfig"))
        .and_then(|rc| serde_json::from_value::<ReviewConfig>(rc.clone()).ok())
        .unwrap_or_default()
        .normalized();

    state.normalize_indices();
    state
}

/// True when `flat` carries at least one word or sentence.
pub fn flat_has_content(flat: &Map<String, Value>) -> bool {
    let non_empty = |key: &str| flat.get(key).map(|v| !is_blank(v)).unwrap_or(false);
    non_empty(VOCAB_LIST) || non_empty(VOCAB_DICT) || non_empty(VOCAB_META) || non_empty(COLLECTED_SENTENCES)
}
