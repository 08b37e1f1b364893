//! Common command response envelope.
//!
//! [`CommandResponse`] is returned by every command. Successful responses
//! carry `ok: true` and the command's payload flattened beside it; failed
//! ones carry the wire code in `error` and a human-readable `message`.

use serde::Serialize;
use serde_json::{Map, Value};

use vocab_storage::StorageError;

use crate::error::EngineError;

/// Standard response envelope: `{ ok, error?, message?, ...extra }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub ok: bool,
    /// Machine-readable error code, only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Command-specific payload fields.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl CommandResponse {
    /// A successful response whose payload is `data` serialized as an object.
    /// Non-object payloads are placed under a `result` field.
    pub fn success<T: Serialize>(data: &T) -> Result<Self, EngineError> {
        let value = serde_json::to_value(data).map_err(StorageError::from)?;
        let data = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        Ok(CommandResponse {
            ok: true,
            error: None,
            message: None,
            data,
        })
    }

    pub fn failure(err: &EngineError) -> Self {
        CommandResponse {
            ok: false,
            error: Some(err.code().to_string()),
            message: Some(err.to_string()),
            data: Map::new(),
        }
    }

    /// Converts a command result into a response; errors never escape.
    pub fn from_result<T: Serialize>(result: Result<T, EngineError>) -> Self {
        match result.and_then(|data| Self::success(&data)) {
            Ok(response) => response,
            Err(err) => Self::failure(&err),
        }
    }

    /// Payload field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}
