//! Source entry points the host calls: connection check, stream list, catalog.

use std::sync::Arc;

use serde_json::Value;

use crate::data::HttpTransport;
use crate::domain::{SourceConfig, StreamDescriptor};
use crate::error::{Result, SourceError};
use crate::stream::{Clock, ExchangeRateStream, SystemClock};

#[derive(Debug, Clone)]
pub struct ExchangeRateSource {
    clock: Arc<dyn Clock>,
}

impl Default for ExchangeRateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeRateSource {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock handed to every stream this source builds.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Succeeds when the config carries an `api_key`.
    pub fn check_connection(&self, config: &Value) -> Result<()> {
        match config.get("api_key") {
            Some(Value::String(key)) if !key.is_empty() => Ok(()),
            Some(_) => Err(SourceError::Config("'api_key' must be a non-empty string.".to_string())),
            None => Err(SourceError::Config("Missing 'api_key'.".to_string())),
        }
    }

    pub fn streams(&self, config: &Value) -> Result<Vec<ExchangeRateStream>> {
        let config = SourceConfig::from_value(config)?;
        let stream = ExchangeRateStream::new(config.base_currency, config.start_date)
            .with_clock(self.clock.clone());
        Ok(vec![stream])
    }

    pub fn discover(&self, config: &Value) -> Result<Vec<StreamDescriptor>> {
        Ok(self.streams(config)?.iter().map(|s| s.descriptor()).collect())
    }

    /// Authenticated transport for the streams built from `config`.
    pub fn transport(&self, config: &Value) -> Result<HttpTransport> {
        let config = SourceConfig::from_value(config)?;
        HttpTransport::new(config.api_key)
    }
}
