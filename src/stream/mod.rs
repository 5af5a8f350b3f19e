//! The `exchange_rates` stream.
//!
//! Owns the incremental logic of the connector:
//! - which dates to fetch (`stream_slices`)
//! - what path to request for a date (`build_request_path`)
//! - how a response becomes a record (`parse_response`)
//! - how the cursor advances (`compute_updated_state`)
//!
//! Performing the HTTP call is left to a `Transport`.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::{
    CursorState, ExchangeRate, RECORD_CURSOR_FIELD, RawRate, Slice, StreamDescriptor, SyncMode,
};
use crate::error::Result;

pub mod chunker;
pub mod clock;

pub use chunker::DateRangeChunker;
pub use clock::{Clock, FixedClock, SystemClock};

pub const URL_BASE: &str = "https://v6.exchangerate-api.com/v6/";
pub const STREAM_NAME: &str = "exchange_rates";

/// Slices between state checkpoints.
pub const STATE_CHECKPOINT_INTERVAL: usize = 30;

#[derive(Debug, Clone)]
pub struct ExchangeRateStream {
    base_currency: String,
    start_date: NaiveDate,
    clock: Arc<dyn Clock>,
}

impl ExchangeRateStream {
    pub fn new(base_currency: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            base_currency: base_currency.into(),
            start_date,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &'static str {
        STREAM_NAME
    }

    pub fn url_base(&self) -> &'static str {
        URL_BASE
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn cursor_field(&self) -> &'static str {
        RECORD_CURSOR_FIELD
    }

    pub fn primary_key(&self) -> &'static str {
        RECORD_CURSOR_FIELD
    }

    pub fn state_checkpoint_interval(&self) -> usize {
        STATE_CHECKPOINT_INTERVAL
    }

    pub fn supports_incremental(&self) -> bool {
        true
    }

    pub fn source_defined_cursor(&self) -> bool {
        true
    }

    pub fn descriptor(&self) -> StreamDescriptor {
        StreamDescriptor {
            name: STREAM_NAME.to_string(),
            supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
            source_defined_cursor: self.source_defined_cursor(),
            default_cursor_field: vec![self.cursor_field().to_string()],
            source_defined_primary_key: vec![vec![self.primary_key().to_string()]],
        }
    }

    /// `history/{base}/{YYYY}/{MM}/{DD}`, relative to [`URL_BASE`].
    pub fn build_request_path(&self, slice: &Slice) -> String {
        format!("history/{}/{}", self.base_currency, slice.date.format("%Y/%m/%d"))
    }

    /// The history endpoint returns one object per date; there is never a next page.
    pub fn next_page_token(&self, _response: &Value) -> Option<Value> {
        None
    }

    /// Normalize one response body into its single record.
    pub fn parse_response(&self, body: Value) -> Result<Vec<ExchangeRate>> {
        let raw = RawRate::from_value(body)?;
        Ok(vec![ExchangeRate::from_raw(raw)?])
    }

    /// Advance the cursor past `latest`.
    ///
    /// Without a stored date the cursor is seeded with the configured start date.
    pub fn compute_updated_state(
        &self,
        current: Option<&CursorState>,
        latest: &ExchangeRate,
    ) -> CursorState {
        match current {
            Some(state) => CursorState::new(state.date.max(latest.exchange_rate_date())),
            None => CursorState::new(self.start_date),
        }
    }

    /// Dates to fetch, resuming from the stored date (inclusive) when there is one.
    pub fn stream_slices(&self, state: Option<&CursorState>) -> DateRangeChunker {
        let start = state.map(|s| s.date).unwrap_or(self.start_date);
        DateRangeChunker::new(start, self.clock.as_ref())
    }

    pub fn slices_for(&self, mode: SyncMode, state: Option<&CursorState>) -> DateRangeChunker {
        match mode {
            SyncMode::FullRefresh => self.stream_slices(None),
            SyncMode::Incremental => self.stream_slices(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use proptest::prelude::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stream() -> ExchangeRateStream {
        ExchangeRateStream::new("USD", date(2021, 1, 1)).with_clock(Arc::new(FixedClock(date(2021, 1, 10))))
    }

    fn record(y: i32, m: u32, d: u32) -> ExchangeRate {
        stream()
            .parse_response(json!({ "year": y, "month": m, "day": d }))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn request_path_uses_base_and_date_segments() {
        let slice = Slice { date: date(2021, 1, 1) };
        assert_eq!(stream().build_request_path(&slice), "history/USD/2021/01/01");
    }

    #[test]
    fn parse_response_yields_exactly_one_record() {
        let body = json!({
            "result": "success",
            "year": 2021, "month": 1, "day": 2,
            "base_code": "USD",
            "conversion_rates": { "EUR": 0.82, "GBP": 0.73 }
        });
        let s = stream();
        assert_eq!(s.next_page_token(&body), None);
        let records = s.parse_response(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exchange_rate_date(), date(2021, 1, 2));
        assert_eq!(records[0].field("base_code"), Some(&json!("USD")));
    }

    #[test]
    fn parse_response_rejects_missing_date_fields() {
        let err = stream().parse_response(json!({ "result": "error" })).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
    }

    #[test]
    fn updated_state_takes_later_record_date() {
        let current = CursorState::new(date(2021, 1, 1));
        let next = stream().compute_updated_state(Some(&current), &record(2021, 12, 1));
        assert_eq!(next.to_value(), json!({ "date": "2021-12-01" }));
    }

    #[test]
    fn updated_state_never_moves_backwards() {
        let current = CursorState::new(date(2021, 6, 1));
        let next = stream().compute_updated_state(Some(&current), &record(2021, 3, 1));
        assert_eq!(next, current);
    }

    #[test]
    fn updated_state_without_state_is_start_date() {
        let next = stream().compute_updated_state(None, &record(2021, 5, 5));
        assert_eq!(next.to_value(), json!({ "date": "2021-01-01" }));
    }

    #[test]
    fn field_names_and_checkpointing() {
        let s = stream();
        assert_eq!(s.cursor_field(), "exchange_rate_date");
        assert_eq!(s.primary_key(), "exchange_rate_date");
        assert_eq!(s.state_checkpoint_interval(), 30);
        assert!(s.supports_incremental());
        assert!(s.source_defined_cursor());
        assert_eq!(s.url_base(), "https://v6.exchangerate-api.com/v6/");
    }

    #[test]
    fn slices_resume_from_stored_date_inclusive() {
        let s = stream();
        let state = CursorState::new(date(2021, 1, 8));
        let dates: Vec<_> = s.stream_slices(Some(&state)).map(|sl| sl.date).collect();
        assert_eq!(dates, vec![date(2021, 1, 8), date(2021, 1, 9), date(2021, 1, 10)]);

        assert_eq!(s.stream_slices(None).len(), 10);
        assert_eq!(s.slices_for(SyncMode::FullRefresh, Some(&state)).len(), 10);
        assert_eq!(s.slices_for(SyncMode::Incremental, Some(&state)).len(), 3);
    }

    proptest! {
        #[test]
        fn updated_state_is_idempotent_and_monotonic(state_off in 0i64..3000, rec_off in 0i64..3000) {
            let s = stream();
            let base = date(2015, 1, 1);
            let current = CursorState::new(base + chrono::Duration::days(state_off));
            let rec_date = base + chrono::Duration::days(rec_off);
            let rec = record(
                chrono::Datelike::year(&rec_date),
                chrono::Datelike::month(&rec_date),
                chrono::Datelike::day(&rec_date),
            );

            let once = s.compute_updated_state(Some(&current), &rec);
            let twice = s.compute_updated_state(Some(&once), &rec);
            prop_assert_eq!(once, twice);
            prop_assert!(once.date >= current.date);
            prop_assert!(once.date >= rec_date);
        }
    }
}
