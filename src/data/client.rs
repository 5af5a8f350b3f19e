//! HTTP transport for the exchangerate-api v6 endpoints.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{Result, SourceError};
use crate::stream::URL_BASE;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Performs a GET for a path relative to the API base and returns the JSON body.
pub trait Transport {
    fn get(&self, path: &str) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
    url_base: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url_base: URL_BASE.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Point at a different base URL (must end with `/`).
    pub fn with_url_base(mut self, url_base: impl Into<String>) -> Self {
        self.url_base = url_base.into();
        self
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url_base, path)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| SourceError::Transport(format!("Request to {path} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(SourceError::Transport(format!(
                "Request to {path} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| SourceError::MalformedResponse(format!("Failed to parse body of {path}: {e}")))
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, path: &str) -> Result<Value> {
        (**self).get(path)
    }
}
