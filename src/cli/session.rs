//! Shared setup for commands that report on a project

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::{CadenceConfig, Clock, FixedClock, IterationService, Story, SystemClock};
use crate::storage::{Project, ProjectConfig};

/// A loaded project plus the service that reports on it
pub struct Session {
    pub project: Project,
    pub settings: ProjectConfig,
    pub stories: Vec<Story>,
    pub service: IterationService<FixedClock>,
}

impl Session {
    /// Opens the current project, pinning "today" for the whole command
    pub fn open(output: &Output, today: Option<NaiveDate>) -> Result<Self> {
        let project = Project::open_current()?;
        output.verbose_ctx(
            "session",
            &format!("Opened project at: {}", project.root().display()),
        );

        let settings = project.settings()?.clone();
        let stories = project.stories()?;
        output.verbose_ctx("session", &format!("Loaded {} stories", stories.len()));

        let today = today.unwrap_or_else(|| SystemClock.today());
        output.verbose_ctx("session", &format!("Today is {}", today));

        Ok(Self {
            project,
            settings,
            stories,
            service: IterationService::new(FixedClock(today)),
        })
    }

    pub fn cadence(&self) -> &CadenceConfig {
        &self.settings.cadence
    }

    /// Capacity used for backlog projection
    ///
    /// An explicit override wins, then the configured trailing window, then
    /// the whole history.
    pub fn planning_velocity(&self, output: &Output, explicit: Option<u32>) -> Result<u32> {
        if let Some(velocity) = explicit {
            output.verbose_ctx("velocity", &format!("Using explicit velocity {}", velocity));
            return Ok(velocity);
        }

        let velocity = match self.settings.reports.velocity_iterations {
            Some(window) => {
                output.verbose_ctx(
                    "velocity",
                    &format!("Averaging the last {} iterations", window),
                );
                self.service
                    .recent_velocity(self.cadence(), &self.stories, window)?
            }
            None => self.service.velocity(self.cadence(), &self.stories)?,
        };

        Ok(velocity)
    }
}
