//! Clock port, so dates ("today", week start) are injectable in tests.

use chrono::{Local, NaiveDate};

pub trait Clock: Send + Sync {
    /// Today's date in the session's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the machine's local time zone.
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
