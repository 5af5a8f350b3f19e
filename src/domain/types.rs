//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the chunker, the stream and the sync pipeline
//! - emitted downstream as JSON messages
//! - persisted between runs (cursor state)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SourceError};

/// Calendar date format used in slices, state and config.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Record field holding the derived date. Also the record's primary key.
pub const RECORD_CURSOR_FIELD: &str = "exchange_rate_date";

/// Key of the date inside persisted stream state.
pub const STATE_CURSOR_KEY: &str = "date";

/// `YYYY-MM-DD` serde for `NaiveDate`.
pub mod ymd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Sync mode requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Start from the configured start date and ignore stored state.
    FullRefresh,
    /// Resume from the stored cursor.
    Incremental,
}

/// One unit of fetch work: a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slice {
    #[serde(with = "ymd")]
    pub date: NaiveDate,
}

/// Rates object as returned by the history endpoint.
///
/// Only the date components are required. Everything else (`base_code`,
/// `conversion_rates`, `result`, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawRate {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }

    /// Calendar date named by `year`/`month`/`day`.
    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            SourceError::MalformedResponse(format!(
                "{:04}-{:02}-{:02} is not a calendar date",
                self.year, self.month, self.day
            ))
        })
    }
}

/// A rates object plus its derived `exchange_rate_date`.
///
/// Only built through [`ExchangeRate::from_raw`], so the derived date always
/// matches the three integer fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    #[serde(flatten)]
    raw: RawRate,
    #[serde(with = "ymd")]
    exchange_rate_date: NaiveDate,
}

impl ExchangeRate {
    pub fn from_raw(mut raw: RawRate) -> Result<Self> {
        let exchange_rate_date = raw.date()?;
        // The derived field replaces any provider value of the same name.
        raw.fields.remove(RECORD_CURSOR_FIELD);
        Ok(Self {
            raw,
            exchange_rate_date,
        })
    }

    pub fn exchange_rate_date(&self) -> NaiveDate {
        self.exchange_rate_date
    }

    /// Unique key within the stream: one record per calendar date.
    pub fn primary_key(&self) -> NaiveDate {
        self.exchange_rate_date
    }

    /// Provider-specific field, e.g. `base_code` or `conversion_rates`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.raw.fields.get(name)
    }
}

/// Persisted cursor: the latest date seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CursorState {
    #[serde(with = "ymd")]
    pub date: NaiveDate,
}

impl CursorState {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Read state persisted by the host.
    ///
    /// A missing `date` key means "no state yet". A present but unparseable
    /// date is an error; it is never repaired.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        let Some(raw) = value.get(STATE_CURSOR_KEY) else {
            return Ok(None);
        };
        let raw = raw.as_str().ok_or_else(|| {
            SourceError::InvalidState(format!("'{STATE_CURSOR_KEY}' must be a string, got {raw}"))
        })?;
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|e| SourceError::InvalidState(format!("Invalid state date '{raw}': {e}")))?;
        Ok(Some(Self { date }))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            STATE_CURSOR_KEY.to_string(),
            Value::String(self.date.format(DATE_FORMAT).to_string()),
        );
        Value::Object(map)
    }
}

/// Validated source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub api_key: String,
    pub base_currency: String,
    pub start_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_key: Option<String>,
    base_currency: Option<String>,
    start_date: Option<String>,
}

impl SourceConfig {
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(value.clone())
            .map_err(|e| SourceError::Config(format!("Malformed config: {e}")))?;

        let api_key = raw
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SourceError::Config("Missing 'api_key'.".to_string()))?;

        let base_currency = raw
            .base_currency
            .map(|c| c.trim().to_ascii_uppercase())
            .ok_or_else(|| SourceError::Config("Missing 'base_currency'.".to_string()))?;
        if base_currency.len() != 3 || !base_currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SourceError::Config(format!(
                "'base_currency' must be a three-letter ISO code, got '{base_currency}'."
            )));
        }

        let start_raw = raw
            .start_date
            .ok_or_else(|| SourceError::Config("Missing 'start_date'.".to_string()))?;
        let start_date = parse_date(&start_raw).ok_or_else(|| {
            SourceError::Config(format!("'start_date' must be YYYY-MM-DD, got '{start_raw}'."))
        })?;

        Ok(Self {
            api_key,
            base_currency,
            start_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn exchange_rate_adds_derived_date_and_keeps_extra_fields() {
        let raw = RawRate::from_value(json!({
            "result": "success",
            "year": 2021,
            "month": 3,
            "day": 7,
            "base_code": "USD",
            "conversion_rates": { "EUR": 0.84 }
        }))
        .unwrap();
        let rate = ExchangeRate::from_raw(raw).unwrap();
        assert_eq!(rate.exchange_rate_date(), date(2021, 3, 7));
        assert_eq!(rate.primary_key(), rate.exchange_rate_date());

        let out = serde_json::to_value(&rate).unwrap();
        assert_eq!(out[RECORD_CURSOR_FIELD], "2021-03-07");
        assert_eq!(out["base_code"], "USD");
        assert_eq!(out["conversion_rates"]["EUR"], 0.84);
        assert_eq!(out["year"], 2021);
    }

    #[test]
    fn derived_date_overrides_provider_field_of_same_name() {
        let raw = RawRate::from_value(json!({
            "year": 2021,
            "month": 1,
            "day": 1,
            "exchange_rate_date": "bogus"
        }))
        .unwrap();
        let rate = ExchangeRate::from_raw(raw).unwrap();
        assert_eq!(rate.field(RECORD_CURSOR_FIELD), None);

        let line = serde_json::to_string(&rate).unwrap();
        assert_eq!(line.matches(RECORD_CURSOR_FIELD).count(), 1);
        let out: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(out[RECORD_CURSOR_FIELD], "2021-01-01");
    }

    #[test]
    fn invalid_calendar_date_is_malformed() {
        let raw = RawRate::from_value(json!({ "year": 2021, "month": 2, "day": 30 })).unwrap();
        assert!(matches!(
            ExchangeRate::from_raw(raw),
            Err(SourceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_date_component_is_malformed() {
        let err = RawRate::from_value(json!({ "year": 2021, "day": 1 })).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
    }

    #[test]
    fn cursor_state_uses_date_key() {
        let state = CursorState::new(date(2021, 12, 1));
        assert_eq!(state.to_value(), json!({ "date": "2021-12-01" }));
        assert_eq!(serde_json::to_value(state).unwrap(), json!({ "date": "2021-12-01" }));
        assert_eq!(CursorState::from_value(&json!({ "date": "2021-12-01" })).unwrap(), Some(state));
    }

    #[test]
    fn cursor_state_without_date_is_absent() {
        assert_eq!(CursorState::from_value(&json!({})).unwrap(), None);
    }

    #[test]
    fn unparseable_cursor_state_is_an_error() {
        let err = CursorState::from_value(&json!({ "date": "01/12/2021" })).unwrap_err();
        assert!(matches!(err, SourceError::InvalidState(_)));
    }

    #[test]
    fn slice_serializes_as_date_string() {
        let slice = Slice { date: date(2021, 1, 1) };
        assert_eq!(serde_json::to_value(slice).unwrap(), json!({ "date": "2021-01-01" }));
    }

    #[test]
    fn config_normalizes_currency_and_parses_start_date() {
        let cfg = SourceConfig::from_value(&json!({
            "api_key": "k",
            "base_currency": "usd",
            "start_date": "2021-01-01"
        }))
        .unwrap();
        assert_eq!(cfg.base_currency, "USD");
        assert_eq!(cfg.start_date, date(2021, 1, 1));
    }

    #[test]
    fn config_rejects_bad_values() {
        let missing_key = json!({ "base_currency": "USD", "start_date": "2021-01-01" });
        assert!(matches!(SourceConfig::from_value(&missing_key), Err(SourceError::Config(_))));

        let bad_currency = json!({ "api_key": "k", "base_currency": "DOLLAR", "start_date": "2021-01-01" });
        assert!(matches!(SourceConfig::from_value(&bad_currency), Err(SourceError::Config(_))));

        let bad_date = json!({ "api_key": "k", "base_currency": "USD", "start_date": "2021-13-01" });
        assert!(matches!(SourceConfig::from_value(&bad_date), Err(SourceError::Config(_))));
    }
}
