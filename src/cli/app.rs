//! Main CLI application structure

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use super::output::{Output, OutputFormat};
use super::{iteration, report, status};
use crate::storage::{Config, Project, ProjectConfig};

#[derive(Parser)]
#[command(name = "sprint")]
#[command(author, version, about = "Iteration scheduling and velocity reporting")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, env = "SPRINT_TODAY")]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sprint project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Weekday iterations start on (0 = Sunday ... 6 = Saturday)
        #[arg(long, default_value = "1")]
        start_day: u8,

        /// Iteration length in weeks
        #[arg(long, default_value = "1")]
        length_weeks: u32,

        /// Project start date (YYYY-MM-DD); today is used when omitted
        #[arg(long)]
        anchor_date: Option<NaiveDate>,
    },

    /// Iteration calendar
    #[command(subcommand)]
    Iteration(iteration::IterationCommands),

    /// Velocity and backlog reports
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// Show project status overview
    Status,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("Sprint CLI starting");

    match cli.command {
        Commands::Init {
            path,
            start_day,
            length_weeks,
            anchor_date,
        } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));

            let mut config = ProjectConfig::default();
            config.cadence.start_day = start_day;
            config.cadence.length_weeks = length_weeks;
            config.cadence.anchor_date = anchor_date;

            let project = Project::init(&path, &config)?;
            output.verbose_ctx(
                "init",
                &format!("Created .sprint directory at: {}", project.sprint_dir().display()),
            );
            output.success(&format!(
                "Initialized sprint project at {}",
                project.root().display()
            ));
        }

        Commands::Iteration(cmd) => iteration::run(cmd, &output, cli.today)?,
        Commands::Report(cmd) => report::run(cmd, &output, cli.today)?,

        Commands::Status => {
            output.verbose("Gathering project status");
            status::status(&output, cli.today)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Installs a stderr subscriber for library events
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` shows debug events and
/// the default shows warnings only.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    // Already set when embedded in another binary's subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}
