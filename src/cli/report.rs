//! Velocity and backlog report commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::{points_cell, print_details, table_header, Output};
use super::session::Session;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Points of each accepted story, per iteration
    Iterations,

    /// Accepted points per iteration and the resulting velocity
    Velocity,

    /// Accepted bugs per iteration
    Bugs,

    /// Accepted points per contributor per iteration
    Developers,

    /// Project the backlog into future iterations
    Backlog {
        /// Capacity per iteration (defaults to measured velocity)
        #[arg(long)]
        velocity: Option<u32>,
    },

    /// Story states in the current projected iteration
    Current {
        /// Capacity per iteration (defaults to measured velocity)
        #[arg(long)]
        velocity: Option<u32>,
    },
}

pub fn run(cmd: ReportCommands, output: &Output, today: Option<NaiveDate>) -> Result<()> {
    let session = Session::open(output, today)?;

    match cmd {
        ReportCommands::Iterations => iterations(&session, output),
        ReportCommands::Velocity => velocity(&session, output),
        ReportCommands::Bugs => bugs(&session, output),
        ReportCommands::Developers => developers(&session, output),
        ReportCommands::Backlog { velocity } => backlog(&session, output, velocity),
        ReportCommands::Current { velocity } => current(&session, output, velocity),
    }
}

fn iterations(session: &Session, output: &Output) -> Result<()> {
    let groups = session
        .service
        .group_by_iteration(session.cadence(), &session.stories)?;

    if output.is_json() {
        output.data(&groups)?;
    } else if groups.is_empty() {
        println!("No accepted stories yet.");
    } else {
        table_header(&format!("{:<10} POINTS", "ITERATION"), 40);
        for (number, points) in &groups {
            let points: Vec<String> = points.iter().map(|p| p.to_string()).collect();
            println!("{:<10} {}", number, points.join(", "));
        }
    }

    Ok(())
}

fn velocity(session: &Session, output: &Output) -> Result<()> {
    let groups = session
        .service
        .group_by_velocity(session.cadence(), &session.stories)?;
    let velocity = session.service.velocity(session.cadence(), &session.stories)?;
    let recent = match session.settings.reports.velocity_iterations {
        Some(window) => Some(session.service.recent_velocity(
            session.cadence(),
            &session.stories,
            window,
        )?),
        None => None,
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "iterations": groups,
            "velocity": velocity,
            "recent_velocity": recent,
        }))?;
        return Ok(());
    }

    if groups.is_empty() {
        println!("No accepted stories yet.");
    } else {
        table_header(&format!("{:<10} POINTS", "ITERATION"), 20);
        for (number, points) in &groups {
            println!("{:<10} {}", number, points);
        }
        println!();
    }
    println!("Velocity: {}", velocity);
    if let (Some(recent), Some(window)) = (recent, session.settings.reports.velocity_iterations) {
        println!("Recent velocity (last {} iterations): {}", window, recent);
    }

    Ok(())
}

fn bugs(session: &Session, output: &Output) -> Result<()> {
    let groups = session
        .service
        .group_by_bugs(session.cadence(), &session.stories)?;

    if output.is_json() {
        output.data(&groups)?;
    } else if groups.is_empty() {
        println!("No accepted stories yet.");
    } else {
        table_header(&format!("{:<10} BUGS", "ITERATION"), 20);
        for (number, count) in &groups {
            println!("{:<10} {}", number, count);
        }
    }

    Ok(())
}

fn developers(session: &Session, output: &Output) -> Result<()> {
    let developers = session
        .service
        .group_by_developer(session.cadence(), &session.stories)?;

    if output.is_json() {
        output.data(&developers)?;
    } else if developers.is_empty() {
        println!("No accepted stories with an owner yet.");
    } else {
        for (i, developer) in developers.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", developer.name);
            for (number, points) in &developer.data {
                println!("  iteration {:<6} {}", number, points);
            }
        }
    }

    Ok(())
}

fn backlog(session: &Session, output: &Output, explicit: Option<u32>) -> Result<()> {
    let velocity = session.planning_velocity(output, explicit)?;
    let plan = session
        .service
        .backlog_iterations(session.cadence(), &session.stories, velocity)?;
    output.verbose_ctx(
        "backlog",
        &format!("Projected {} iterations at velocity {}", plan.len(), velocity),
    );

    if output.is_json() {
        output.data(&plan)?;
        return Ok(());
    }

    if plan.is_empty() {
        println!("Backlog is empty.");
        return Ok(());
    }

    println!("Velocity: {}", velocity);
    for (iteration, stories) in plan.iterations.iter().zip(plan.resolve(&session.stories)) {
        println!();
        println!(
            "Iteration {} (starts {}) - {} points",
            iteration.number, iteration.start, iteration.points
        );
        for story in stories {
            println!(
                "  {:<12} {:<10} {:>4}  {}",
                story.id.to_string(),
                story.state.as_str(),
                points_cell(story.points),
                story.title
            );
        }
    }

    Ok(())
}

fn current(session: &Session, output: &Output, explicit: Option<u32>) -> Result<()> {
    let velocity = session.planning_velocity(output, explicit)?;
    let plan = session
        .service
        .backlog_iterations(session.cadence(), &session.stories, velocity)?;
    let details = session
        .service
        .current_iteration_details(&plan, &session.stories);

    if output.is_json() {
        output.data(&details)?;
        return Ok(());
    }

    match plan.current() {
        Some(iteration) => println!(
            "Iteration {} (starts {})",
            iteration.number, iteration.start
        ),
        None => println!("Backlog is empty."),
    }
    print_details(&details);

    Ok(())
}
