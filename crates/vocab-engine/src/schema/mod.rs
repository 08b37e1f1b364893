//! Command schema types.
//!
//! Each sub-module defines the request or response types for one part of
//! the command surface. Types use serde derives with camelCase wire names.

pub mod asset;
pub mod commands;
pub mod common;
pub mod views;
