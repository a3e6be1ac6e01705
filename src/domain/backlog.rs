//! Backlog projection
//!
//! Packs outstanding stories into future iterations using velocity as the
//! capacity of each one. Started stories are already committed and always
//! open the first (current) iteration. Everything else is taken in
//! `sequence` order and poured into iterations until the next story would
//! overflow the capacity.
//!
//! A [`BacklogPlan`] only records story IDs. Looking stories up again when
//! reporting keeps membership fixed for a reporting session while the
//! stories themselves move through their lifecycle.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::calendar::Calendar;
use super::error::EngineError;
use super::id::StoryId;
use super::story::{Story, StoryState};

/// One future iteration filled from the backlog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedIteration {
    /// Iteration number this bucket would occupy
    pub number: i64,
    pub start: NaiveDate,
    /// Sum of velocity points of the stories in this bucket
    pub points: u32,
    pub stories: Vec<StoryId>,
}

/// Projected iterations, first one being the current iteration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BacklogPlan {
    pub velocity: u32,
    pub iterations: Vec<ProjectedIteration>,
}

impl BacklogPlan {
    /// The current iteration, if there is any backlog at all
    pub fn current(&self) -> Option<&ProjectedIteration> {
        self.iterations.first()
    }

    /// Number of projected iterations
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Looks the planned stories up in `stories`
    ///
    /// IDs that no longer exist in `stories` are skipped.
    pub fn resolve<'a>(&self, stories: &'a [Story]) -> Vec<Vec<&'a Story>> {
        let index: HashMap<&StoryId, &Story> = stories.iter().map(|s| (&s.id, s)).collect();

        self.iterations
            .iter()
            .map(|iteration| {
                iteration
                    .stories
                    .iter()
                    .filter_map(|id| index.get(id).copied())
                    .collect()
            })
            .collect()
    }
}

/// Story counts by state for the current iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IterationDetails {
    pub started: usize,
    pub finished: usize,
    pub delivered: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl IterationDetails {
    /// Tallies stories by state; states outside the report are ignored
    pub fn tally<'a>(stories: impl IntoIterator<Item = &'a Story>) -> Self {
        let mut details = Self::default();

        for story in stories {
            match story.state {
                StoryState::Started => details.started += 1,
                StoryState::Finished => details.finished += 1,
                StoryState::Delivered => details.delivered += 1,
                StoryState::Accepted => details.accepted += 1,
                StoryState::Rejected => details.rejected += 1,
                StoryState::Unstarted | StoryState::Unscheduled => {}
            }
        }

        details
    }

    /// Pairs of state label and count, in lifecycle order
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            (StoryState::Started.as_str(), self.started),
            (StoryState::Finished.as_str(), self.finished),
            (StoryState::Delivered.as_str(), self.delivered),
            (StoryState::Accepted.as_str(), self.accepted),
            (StoryState::Rejected.as_str(), self.rejected),
        ]
    }
}

struct Bucket<'a> {
    points: u32,
    stories: Vec<&'a Story>,
}

impl<'a> Bucket<'a> {
    fn new() -> Self {
        Self {
            points: 0,
            stories: Vec::new(),
        }
    }

    fn push(&mut self, story: &'a Story) {
        self.points = self.points.saturating_add(story.velocity_points());
        self.stories.push(story);
    }

    fn has_room_for(&self, story: &Story, velocity: u32) -> bool {
        if self.stories.is_empty() {
            return true;
        }
        velocity > 0 && self.points.saturating_add(story.velocity_points()) <= velocity
    }
}

/// Greedily packs backlog stories into iterations of capacity `velocity`
///
/// Buckets are numbered from the iteration containing `today`.
pub fn backlog_iterations(
    calendar: &Calendar,
    today: NaiveDate,
    stories: &[Story],
    velocity: u32,
) -> Result<BacklogPlan, EngineError> {
    let mut backlog: Vec<&Story> = stories.iter().filter(|s| s.state.is_backlog()).collect();
    backlog.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));

    let (started, pending): (Vec<&Story>, Vec<&Story>) = backlog
        .into_iter()
        .partition(|s| s.state == StoryState::Started);

    let mut buckets = Vec::new();
    let mut current = Bucket::new();
    for story in started {
        current.push(story);
    }

    for story in pending {
        if !current.has_room_for(story, velocity) {
            buckets.push(std::mem::replace(&mut current, Bucket::new()));
        }
        current.push(story);
    }
    if !current.stories.is_empty() {
        buckets.push(current);
    }

    let first = calendar.iteration_number_for(today);
    let mut iterations = Vec::with_capacity(buckets.len());
    for (offset, bucket) in (0_i64..).zip(buckets) {
        let number = first + offset;
        iterations.push(ProjectedIteration {
            number,
            start: calendar.date_for_iteration_number(number)?,
            points: bucket.points,
            stories: bucket.stories.iter().map(|s| s.id.clone()).collect(),
        });
    }

    debug!(velocity, iterations = iterations.len(), "projected backlog");
    Ok(BacklogPlan {
        velocity,
        iterations,
    })
}

/// State counts of the stories planned into the current iteration
///
/// States are read from `stories` as they are now, so progress made since
/// the plan was computed is reflected.
pub fn current_iteration_details(plan: &BacklogPlan, stories: &[Story]) -> IterationDetails {
    plan.resolve(stories)
        .into_iter()
        .next()
        .map(IterationDetails::tally)
        .unwrap_or_default()
}
