//! `exchangerate-source` library crate.
//!
//! Incrementally extracts daily historical exchange rates from
//! exchangerate-api.com. The binary (`exrate`) is a thin wrapper around this
//! library so that:
//!
//! - the slicing/parsing/cursor logic is testable without HTTP or processes
//! - a different host can drive `ExchangeRateStream` directly

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod source;
pub mod stream;
