//! Domain types used throughout the sync.
//!
//! This module defines:
//!
//! - units of work and records (`Slice`, `RawRate`, `ExchangeRate`)
//! - persisted cursor state (`CursorState`)
//! - validated configuration (`SourceConfig`)
//! - host-facing messages (`Message`)

pub mod messages;
pub mod types;

pub use messages::*;
pub use types::*;
