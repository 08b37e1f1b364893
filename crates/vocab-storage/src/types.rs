//! Store keys shared by the projector and the engine.
//!
//! The packed document lives under [`PACKED_KEY`]; the flat legacy layout is
//! spread over [`FLAT_KEYS`]. Everything else in the store (backups, device
//! identity) uses its own reserved key or prefix.

/// Key of the packed canonical document.
pub const PACKED_KEY: &str = "vocab_builder_db";

/// Prefix of timestamped pre-merge backups (`vb_backup_<ms>`).
pub const BACKUP_PREFIX: &str = "vb_backup_";

/// Key holding the persisted device identifier.
pub const DEVICE_ID_KEY: &str = "vb_device_id";

pub const VOCAB_LIST: &str = "vocabList";
pub const VOCAB_DICT: &str = "vocabDict";
pub const VOCAB_NOTES: &str = "vocabNotes";
pub const VOCAB_META: &str = "vocabMeta";
pub const VOCAB_EN: &str = "vocabEn";
pub const VOCAB_PHONETICS: &str = "vocabPhonetics";
pub const VOCAB_AUDIO: &str = "vocabAudio";
pub const YELLOW_LIST: &str = "yellowList";
pub const GREEN_LIST: &str = "greenList";
pub const DIFFICULT_LIST: &str = "difficultList";
pub const COLLECTED_SENTENCES: &str = "collectedSentences";
pub const CONFIG: &str = "config";

/// Every top-level key of the flat legacy layout.
pub const FLAT_KEYS: [&str; 12] = [
    VOCAB_LIST,
    VOCAB_DICT,
    VOCAB_NOTES,
    VOCAB_META,
    VOCAB_EN,
    VOCAB_PHONETICS,
    VOCAB_AUDIO,
    YELLOW_LIST,
    GREEN_LIST,
    DIFFICULT_LIST,
    COLLECTED_SENTENCES,
    CONFIG,
];

/// Backup key for a merge performed at `now_ms`.
pub fn backup_key(now_ms: i64) -> String {
    format!("{BACKUP_PREFIX}{now_ms}")
}
