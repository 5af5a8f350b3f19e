//! Input/output helpers.
//!
//! - config file loading (`config`)
//! - persisted stream state (`state`)

pub mod config;
pub mod state;

pub use config::*;
pub use state::*;
