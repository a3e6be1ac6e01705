//! Project status overview

use anyhow::Result;
use chrono::NaiveDate;

use super::output::{iteration_line, print_details, Output};
use super::session::Session;
use crate::domain::StoryState;

/// Show where the project stands today
pub fn status(output: &Output, today: Option<NaiveDate>) -> Result<()> {
    let session = Session::open(output, today)?;
    let cadence = session.cadence();

    let current = session.service.current_iteration(cadence)?;
    let velocity = session.planning_velocity(output, None)?;
    let plan = session
        .service
        .backlog_iterations(cadence, &session.stories, velocity)?;
    let details = session
        .service
        .current_iteration_details(&plan, &session.stories);

    let accepted = session
        .stories
        .iter()
        .filter(|s| s.state == StoryState::Accepted)
        .count();
    let backlog = session
        .stories
        .iter()
        .filter(|s| s.state.is_backlog())
        .count();

    if output.is_json() {
        output.data(&serde_json::json!({
            "today": session.service.today(),
            "iteration": current,
            "cadence": cadence,
            "velocity": velocity,
            "stories": {
                "total": session.stories.len(),
                "accepted": accepted,
                "backlog": backlog,
            },
            "projected_iterations": plan.len(),
            "current_iteration": details,
        }))?;
        return Ok(());
    }

    println!("Project Status");
    println!("{}", "=".repeat(40));
    println!();
    println!(
        "{} (every {} week(s))",
        iteration_line(&current),
        cadence.length_weeks
    );
    println!("Velocity:  {}", velocity);
    println!();
    println!("Stories: {} total", session.stories.len());
    println!("  [x] Accepted: {}", accepted);
    println!("  [ ] Backlog:  {}", backlog);
    println!();
    println!("Backlog projects into {} iteration(s)", plan.len());
    if plan.current().is_some() {
        println!("Current iteration:");
        print_details(&details);
    }

    Ok(())
}
