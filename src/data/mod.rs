//! Remote data access.

pub mod client;

pub use client::{HttpTransport, Transport};
