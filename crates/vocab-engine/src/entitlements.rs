//! Read-only capability and quota checks.
//!
//! Licensing itself lives outside the engine; the engine only asks an
//! [`EntitlementProvider`] for the current [`Entitlements`] and refuses
//! commands that need a capability it lacks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Feature switches that gate commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    ImportExport,
    BulkEdit,
    ReviewModeAdvanced,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ImportExport => "importExport",
            Capability::BulkEdit => "bulkEdit",
            Capability::ReviewModeAdvanced => "reviewModeAdvanced",
        };
        f.write_str(name)
    }
}

/// Quotas and capability switches. `None` limits mean unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlements {
    pub word_limit: Option<usize>,
    /// Counts active words carrying a note.
    pub note_limit: Option<usize>,
    pub import_export_enabled: bool,
    pub bulk_edit_enabled: bool,
    pub review_mode_advanced: bool,
}

impl Entitlements {
    /// Everything enabled, no quotas.
    pub fn unlimited() -> Self {
        Entitlements {
            word_limit: None,
            note_limit: None,
            import_export_enabled: true,
            bulk_edit_enabled: true,
            review_mode_advanced: true,
        }
    }

    /// The free tier: capped words and notes, no import/export or bulk edit.
    pub fn free(word_limit: usize, note_limit: usize) -> Self {
        Entitlements {
            word_limit: Some(word_limit),
            note_limit: Some(note_limit),
            import_export_enabled: false,
            bulk_edit_enabled: false,
            review_mode_advanced: false,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ImportExport => self.import_export_enabled,
            Capability::BulkEdit => self.bulk_edit_enabled,
            Capability::ReviewModeAdvanced => self.review_mode_advanced,
        }
    }

    /// `Err(CapabilityLocked)` unless `capability` is granted.
    pub fn require(&self, capability: Capability) -> Result<(), EngineError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(EngineError::CapabilityLocked(capability))
        }
    }
}

impl Default for Entitlements {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Source of the current entitlements. Consulted once per command.
pub trait EntitlementProvider {
    fn entitlements(&self) -> Entitlements;
}

impl EntitlementProvider for Entitlements {
    fn entitlements(&self) -> Entitlements {
        self.clone()
    }
}

impl<P: EntitlementProvider + ?Sized> EntitlementProvider for &P {
    fn entitlements(&self) -> Entitlements {
        (**self).entitlements()
    }
}
