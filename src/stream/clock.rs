//! Source of "today" for slice generation.

use chrono::{Local, NaiveDate};

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
