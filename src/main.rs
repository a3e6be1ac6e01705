//! Sprint CLI - Iteration scheduling and velocity reporting

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = sprint_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
