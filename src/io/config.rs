//! Load the connector config file.
//!
//! The config is kept as raw JSON so `check` can report on incomplete files;
//! `SourceConfig::from_value` does the strict validation.

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SourceError};

/// Environment variable consulted when the config file has no `api_key`.
pub const API_KEY_ENV: &str = "EXCHANGERATE_API_KEY";

/// Read a JSON config file, filling a missing `api_key` from the environment (`.env` included).
pub fn load_config(path: &Path) -> Result<Value> {
    let file = File::open(path)
        .map_err(|e| SourceError::Config(format!("Failed to open config '{}': {e}", path.display())))?;
    let mut config: Value = serde_json::from_reader(file)
        .map_err(|e| SourceError::Config(format!("Invalid config JSON '{}': {e}", path.display())))?;

    if !config.is_object() {
        return Err(SourceError::Config(format!(
            "Config '{}' must be a JSON object.",
            path.display()
        )));
    }

    if config.get("api_key").is_none() {
        dotenvy::dotenv().ok();
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            log::debug!("Using api_key from {API_KEY_ENV}");
            config["api_key"] = Value::String(key);
        }
    }

    Ok(config)
}
