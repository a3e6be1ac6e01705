//! Source of "today" for calendar calculations

use chrono::{NaiveDate, Utc};

/// Supplies the current date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the process clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
