//! Command engine for the vocabulary store.
//!
//! Accepts tagged [`Command`](schema::commands::Command)s, applies them to
//! the canonical state through the mutation committer, and answers with a
//! [`CommandResponse`](schema::common::CommandResponse). This crate contains
//! the command schema, error taxonomy, entitlement checks and the asset
//! wire format.

pub mod clock;
pub mod committer;
pub mod config;
pub mod entitlements;
pub mod error;
pub mod schema;
pub mod service;
pub mod tombstone;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use entitlements::{Capability, EntitlementProvider, Entitlements};
pub use error::{EngineError, LimitKind};
pub use schema::commands::Command;
pub use schema::common::CommandResponse;
pub use service::VocabService;
