//! Output formatting for CLI commands
//!
//! Commands print their own text tables through the helpers here and hand
//! structured values to [`Output::data`] in JSON mode.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{Iteration, IterationDetails};
use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a one-line confirmation, wrapped in an object for JSON
    pub fn success(&self, message: &str) {
        if self.is_json() {
            println!("{}", serde_json::json!({ "success": true, "message": message }));
        } else {
            println!("{}", message);
        }
    }

    /// Prints a report value as a single JSON document
    pub fn data<T: Serialize>(&self, data: &T) -> Result<()> {
        let json = if self.is_json() {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        }
        .context("Failed to serialize report")?;

        println!("{}", json);
        Ok(())
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// Prints a table header followed by a rule of `width` dashes
pub fn table_header(header: &str, width: usize) {
    println!("{}", header);
    println!("{}", "-".repeat(width));
}

/// Text for an estimate, `-` when the story has none
pub fn points_cell(points: Option<u32>) -> String {
    points.map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// `Iteration N: first day to last day`
pub fn iteration_line(iteration: &Iteration) -> String {
    format!(
        "Iteration {}: {} to {}",
        iteration.number,
        iteration.start,
        iteration.last_day()
    )
}

/// One indented line per reported state
pub fn print_details(details: &IterationDetails) {
    for (state, count) in details.entries() {
        println!("  {:<10} {}", state, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn points_cell_marks_missing_estimates() {
        assert_eq!(points_cell(Some(5)), "5");
        assert_eq!(points_cell(None), "-");
    }

    #[test]
    fn iteration_line_shows_inclusive_range() {
        let iteration = Iteration {
            number: 15,
            start: NaiveDate::from_ymd_opt(2016, 8, 16).unwrap(),
            end: NaiveDate::from_ymd_opt(2016, 8, 23).unwrap(),
        };
        assert_eq!(iteration_line(&iteration), "Iteration 15: 2016-08-16 to 2016-08-22");
    }

    #[test]
    fn global_format_converts() {
        assert_eq!(OutputFormat::from(storage::OutputFormat::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(storage::OutputFormat::Text), OutputFormat::Text);
    }
}
