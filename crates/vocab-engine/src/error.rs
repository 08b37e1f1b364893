//! Engine error taxonomy with stable wire codes.
//!
//! [`EngineError`] is the unified error type for every command. Each variant
//! maps to one machine-readable code via [`EngineError::code`]; the service
//! turns errors into a failed [`CommandResponse`](crate::schema::common::CommandResponse)
//! instead of propagating them across the command boundary.

use serde::Serialize;

use vocab_core::CoreError;
use vocab_storage::StorageError;

use crate::entitlements::Capability;

/// Which quota a command would have exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitKind {
    Words,
    Notes,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::Words => f.write_str("words"),
            LimitKind::Notes => f.write_str("notes"),
        }
    }
}

/// Command failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed input: empty id, quality out of range, unknown status.
    #[error("validation error: {0}")]
    Validation(String),

    /// An adding mutation would exceed the entitlement quota.
    #[error("limit exceeded: at most {limit} {kind}")]
    LimitExceeded { kind: LimitKind, limit: usize },

    /// The addressed word or quote does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write acknowledgment named a hash other than the current one.
    #[error("content hash mismatch: expected {expected}, current {current}")]
    HashMismatch { expected: String, current: String },

    /// An imported snapshot is not a valid asset.
    #[error("bad asset: {0}")]
    BadAsset(String),

    /// The command needs a capability the entitlements do not grant.
    #[error("capability locked: {0}")]
    CapabilityLocked(Capability),

    /// The store adapter failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::HashMismatch { .. } => "HASH_MISMATCH",
            EngineError::BadAsset(_) => "BAD_ASSET",
            EngineError::CapabilityLocked(_) => "CAPABILITY_LOCKED",
            EngineError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::EmptyWordId
            | CoreError::EmptyQuoteText
            | CoreError::QualityOutOfRange { .. }
            | CoreError::UnknownStatus { .. } => EngineError::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(EngineError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(
            EngineError::LimitExceeded {
                kind: LimitKind::Words,
                limit: 3
            }
            .code(),
            "LIMIT_EXCEEDED"
        );
        assert_eq!(
            EngineError::CapabilityLocked(Capability::ImportExport).code(),
            "CAPABILITY_LOCKED"
        );
        assert_eq!(
            EngineError::from(StorageError::Backend("down".into())).code(),
            "STORAGE_ERROR"
        );
    }

    #[test]
    fn test_core_errors_become_validation() {
        let err = EngineError::from(CoreError::QualityOutOfRange { quality: 9 });
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
