//! Engine configuration.
//!
//! Reads configuration from environment variables:
//! - `VOCAB_DEVICE_ID`: device identifier stamped on committed entities
//!   (default: the id persisted under `vb_device_id`, or a fresh UUID v4
//!   which is then persisted)

use serde_json::{Map, Value};

use vocab_storage::types::DEVICE_ID_KEY;
use vocab_storage::KvStore;

use crate::error::EngineError;

/// Environment variable overriding the device id.
pub const DEVICE_ID_ENV: &str = "VOCAB_DEVICE_ID";

/// Identity of this engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub device_id: String,
    pub app_version: String,
}

impl EngineConfig {
    pub fn new(device_id: impl Into<String>) -> Self {
        EngineConfig {
            device_id: device_id.into(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Resolves the device id from the environment, then the store.
    pub fn from_env<S: KvStore>(store: &S) -> Result<Self, EngineError> {
        let from_env = std::env::var(DEVICE_ID_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        match from_env {
            Some(id) => Ok(Self::new(id)),
            None => Self::from_store(store),
        }
    }

    /// Uses the persisted device id, creating and persisting one if absent.
    pub fn from_store<S: KvStore>(store: &S) -> Result<Self, EngineError> {
        let persisted = store
            .load_one(DEVICE_ID_KEY)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|v| !v.trim().is_empty());
        if let Some(id) = persisted {
            return Ok(Self::new(id));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut entries = Map::new();
        entries.insert(DEVICE_ID_KEY.to_string(), Value::String(id.clone()));
        store.save(entries)?;
        tracing::info!(device_id = %id, "generated new device id");
        Ok(Self::new(id))
    }
}
