//! Iteration calendar commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::{iteration_line, points_cell, table_header, Output};
use super::session::Session;
use crate::domain::report;

#[derive(Subcommand)]
pub enum IterationCommands {
    /// Show the iteration containing today
    Current,

    /// Show which iteration a date falls in
    Number {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Show the start date of an iteration
    Date {
        /// Iteration number (may be zero or negative)
        #[arg(allow_hyphen_values = true)]
        number: i64,
    },

    /// Show an iteration's date range and the stories accepted in it
    Show {
        /// Iteration number (may be zero or negative)
        #[arg(allow_hyphen_values = true)]
        number: i64,
    },
}

pub fn run(cmd: IterationCommands, output: &Output, today: Option<NaiveDate>) -> Result<()> {
    let session = Session::open(output, today)?;

    match cmd {
        IterationCommands::Current => current(&session, output),
        IterationCommands::Number { date } => number(&session, output, date),
        IterationCommands::Date { number } => date(&session, output, number),
        IterationCommands::Show { number } => show(&session, output, number),
    }
}

fn current(session: &Session, output: &Output) -> Result<()> {
    let iteration = session.service.current_iteration(session.cadence())?;

    if output.is_json() {
        output.data(&iteration)?;
    } else {
        println!("{}", iteration_line(&iteration));
    }

    Ok(())
}

fn number(session: &Session, output: &Output, date: NaiveDate) -> Result<()> {
    let number = session.service.iteration_number_for(session.cadence(), date)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "date": date,
            "iteration": number,
        }))?;
    } else {
        println!("{} is in iteration {}", date, number);
    }

    Ok(())
}

fn date(session: &Session, output: &Output, number: i64) -> Result<()> {
    let start = session
        .service
        .date_for_iteration_number(session.cadence(), number)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "iteration": number,
            "start": start,
        }))?;
    } else {
        println!("Iteration {} starts {}", number, start);
    }

    Ok(())
}

fn show(session: &Session, output: &Output, number: i64) -> Result<()> {
    let (iteration, stories) = session
        .service
        .accepted_in(session.cadence(), &session.stories, number)?;
    output.verbose_ctx(
        "iteration",
        &format!("{} stories accepted in iteration {}", stories.len(), number),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "iteration": iteration,
            "stories": stories,
        }))?;
        return Ok(());
    }

    println!("{}", iteration_line(&iteration));
    println!();

    if stories.is_empty() {
        println!("No stories accepted in this iteration.");
        return Ok(());
    }

    table_header(
        &format!("{:<12} {:<8} {:>6} {:<16} TITLE", "ID", "KIND", "POINTS", "OWNER"),
        70,
    );
    for story in &stories {
        println!(
            "{:<12} {:<8} {:>6} {:<16} {}",
            story.id.to_string(),
            story.kind.as_str(),
            points_cell(story.points),
            story.owner.as_deref().unwrap_or("-"),
            story.title
        );
    }

    let total = report::total_points(stories.iter().copied());
    println!();
    println!("{} stories, {} points", stories.len(), total);

    Ok(())
}
