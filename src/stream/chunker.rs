//! Daily date-range chunking.
//!
//! Turns a start date into one `Slice` per calendar day up to and including
//! today. "Today" is read from the clock once, when the chunker is built, so
//! the range does not grow if the wall clock crosses midnight mid-sync.

use std::iter::FusedIterator;

use chrono::NaiveDate;

use crate::domain::Slice;
use crate::stream::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeChunker {
    start: NaiveDate,
    end: NaiveDate,
    next: Option<NaiveDate>,
}

impl DateRangeChunker {
    pub fn new(start: NaiveDate, clock: &dyn Clock) -> Self {
        Self::between(start, clock.today())
    }

    /// Every date in `start..=end`; empty when `start > end`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            next: (start <= end).then_some(start),
        }
    }

    /// Last date the chunker will yield (if non-empty).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Rewind to the first date, keeping the same end date.
    pub fn restart(&mut self) {
        self.next = (self.start <= self.end).then_some(self.start);
    }
}

impl Iterator for DateRangeChunker {
    type Item = Slice;

    fn next(&mut self) -> Option<Slice> {
        let date = self.next?;
        self.next = date.succ_opt().filter(|d| *d <= self.end);
        Some(Slice { date })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self
            .next
            .map(|d| (self.end - d).num_days() as usize + 1)
            .unwrap_or(0);
        (n, Some(n))
    }
}

impl ExactSizeIterator for DateRangeChunker {}

impl FusedIterator for DateRangeChunker {}
