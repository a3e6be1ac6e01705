//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup and overview | `init`, `status` |
//! | Iteration | Calendar lookups | `iteration current`, `iteration number 2016-08-22` |
//! | Report | Velocity and backlog | `report velocity`, `report backlog` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Pinning Today
//!
//! Use `--today` (or `SPRINT_TODAY`) to report as of a fixed date:
//! ```bash
//! sprint --today 2016-08-31 report current
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod session;
mod iteration;
mod report;
mod status;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
