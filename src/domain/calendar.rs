//! Iteration calendar
//!
//! Partitions time into fixed-length iterations that begin on a configured
//! weekday. Iteration 1 starts on the most recent start weekday on or before
//! the anchor date (or today when no anchor is set). Earlier dates fall in
//! iterations numbered 0, -1, and so on.
//!
//! A [`Calendar`] is resolved from a [`CadenceConfig`] for a single call and
//! then thrown away, so edits to the cadence always show up in the next
//! calculation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::EngineError;

/// Sprint cadence of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Weekday iterations start on, 0 = Sunday through 6 = Saturday
    pub start_day: u8,

    /// Length of one iteration in whole weeks
    pub length_weeks: u32,

    /// Explicit project start; today is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_date: Option<NaiveDate>,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            start_day: 1,
            length_weeks: 1,
            anchor_date: None,
        }
    }
}

impl CadenceConfig {
    pub fn new(start_day: u8, length_weeks: u32) -> Self {
        Self {
            start_day,
            length_weeks,
            anchor_date: None,
        }
    }

    /// Sets the explicit anchor date
    pub fn anchored_at(mut self, date: NaiveDate) -> Self {
        self.anchor_date = Some(date);
        self
    }

    /// Checks the cadence can partition time
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.length_weeks == 0 {
            return Err(EngineError::InvalidConfiguration(
                "iteration length must be at least one week".to_string(),
            ));
        }
        if self.start_day > 6 {
            return Err(EngineError::InvalidConfiguration(format!(
                "iteration start day must be 0 (Sunday) through 6 (Saturday), got {}",
                self.start_day
            )));
        }
        Ok(())
    }
}

/// One iteration and its half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Iteration {
    pub number: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Iteration {
    /// Returns true if the date falls inside this iteration
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Last day that still belongs to this iteration
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.end)
    }
}

/// A cadence resolved against a concrete "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    start: NaiveDate,
    length_days: i64,
}

impl Calendar {
    /// Resolves the first iteration start for the cadence
    pub fn resolve(cadence: &CadenceConfig, today: NaiveDate) -> Result<Self, EngineError> {
        cadence.validate()?;

        let start = iteration_start_date(cadence, today)?;
        let length_days = i64::from(cadence.length_weeks) * 7;
        debug!(%start, length_days, "resolved iteration calendar");

        Ok(Self { start, length_days })
    }

    /// Start date of iteration 1
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Length of one iteration in days
    pub fn length_days(&self) -> i64 {
        self.length_days
    }

    /// Number of the iteration the date falls in
    pub fn iteration_number_for(&self, date: NaiveDate) -> i64 {
        let elapsed = (date - self.start).num_days();
        elapsed.div_euclid(self.length_days) + 1
    }

    /// Start date of iteration `number`
    pub fn date_for_iteration_number(&self, number: i64) -> Result<NaiveDate, EngineError> {
        number
            .checked_sub(1)
            .and_then(|offset| offset.checked_mul(self.length_days))
            .and_then(Duration::try_days)
            .and_then(|delta| self.start.checked_add_signed(delta))
            .ok_or(EngineError::IterationOutOfRange(number))
    }

    /// Full date range of iteration `number`
    pub fn iteration(&self, number: i64) -> Result<Iteration, EngineError> {
        let start = self.date_for_iteration_number(number)?;
        let end = start
            .checked_add_signed(Duration::days(self.length_days))
            .ok_or(EngineError::IterationOutOfRange(number))?;

        Ok(Iteration { number, start, end })
    }

    /// The iteration the date falls in
    pub fn iteration_containing(&self, date: NaiveDate) -> Result<Iteration, EngineError> {
        self.iteration(self.iteration_number_for(date))
    }
}

/// Most recent start weekday on or before the anchor (or today)
pub fn iteration_start_date(
    cadence: &CadenceConfig,
    today: NaiveDate,
) -> Result<NaiveDate, EngineError> {
    cadence.validate()?;

    let basis = cadence.anchor_date.unwrap_or(today);
    let weekday = i64::from(basis.weekday().num_days_from_sunday());
    let back = (weekday - i64::from(cadence.start_day)).rem_euclid(7);

    basis
        .checked_sub_signed(Duration::days(back))
        .ok_or(EngineError::IterationOutOfRange(1))
}

/// Number of the iteration `date` falls in under `cadence`
pub fn iteration_number_for(
    date: NaiveDate,
    cadence: &CadenceConfig,
    today: NaiveDate,
) -> Result<i64, EngineError> {
    Ok(Calendar::resolve(cadence, today)?.iteration_number_for(date))
}

/// Start date of iteration `number` under `cadence`
pub fn date_for_iteration_number(
    number: i64,
    cadence: &CadenceConfig,
    today: NaiveDate,
) -> Result<NaiveDate, EngineError> {
    Calendar::resolve(cadence, today)?.date_for_iteration_number(number)
}
