//! Reporting session over a project's cadence and stories
//!
//! [`IterationService`] resolves the calendar from the cadence handed to each
//! call and remembers only one thing between calls: the date it first read
//! from its clock. That keeps every report in a session on the same "today"
//! even if the session straddles midnight.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;

use super::backlog::{self, BacklogPlan, IterationDetails};
use super::calendar::{self, CadenceConfig, Calendar, Iteration};
use super::clock::Clock;
use super::error::EngineError;
use super::report::{self, DeveloperVelocity};
use super::story::Story;

pub struct IterationService<C: Clock> {
    clock: C,
    today: OnceLock<NaiveDate>,
}

impl<C: Clock> IterationService<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            today: OnceLock::new(),
        }
    }

    /// The session's "today", read from the clock on first use
    pub fn today(&self) -> NaiveDate {
        *self.today.get_or_init(|| self.clock.today())
    }

    /// Resolves the calendar for the cadence as it is right now
    pub fn calendar(&self, cadence: &CadenceConfig) -> Result<Calendar, EngineError> {
        Calendar::resolve(cadence, self.today())
    }

    pub fn iteration_start_date(&self, cadence: &CadenceConfig) -> Result<NaiveDate, EngineError> {
        calendar::iteration_start_date(cadence, self.today())
    }

    pub fn iteration_number_for(
        &self,
        cadence: &CadenceConfig,
        date: NaiveDate,
    ) -> Result<i64, EngineError> {
        calendar::iteration_number_for(date, cadence, self.today())
    }

    pub fn date_for_iteration_number(
        &self,
        cadence: &CadenceConfig,
        number: i64,
    ) -> Result<NaiveDate, EngineError> {
        calendar::date_for_iteration_number(number, cadence, self.today())
    }

    /// The iteration containing today
    pub fn current_iteration(&self, cadence: &CadenceConfig) -> Result<Iteration, EngineError> {
        self.calendar(cadence)?.iteration_containing(self.today())
    }

    /// Accepted stories whose acceptance date falls in iteration `number`
    pub fn accepted_in<'a>(
        &self,
        cadence: &CadenceConfig,
        stories: &'a [Story],
        number: i64,
    ) -> Result<(Iteration, Vec<&'a Story>), EngineError> {
        let iteration = self.calendar(cadence)?.iteration(number)?;

        let mut members = Vec::new();
        for story in stories.iter().filter(|s| s.state.is_accepted()) {
            let accepted_at = story
                .accepted_at
                .ok_or_else(|| EngineError::InconsistentItemState {
                    story: story.id.clone(),
                })?;
            if iteration.contains(accepted_at.date_naive()) {
                members.push((accepted_at, story));
            }
        }
        members.sort_by_key(|(at, _)| *at);

        Ok((iteration, members.into_iter().map(|(_, s)| s).collect()))
    }

    pub fn group_by_iteration(
        &self,
        cadence: &CadenceConfig,
        stories: &[Story],
    ) -> Result<BTreeMap<i64, Vec<u32>>, EngineError> {
        report::group_by_iteration(&self.calendar(cadence)?, stories)
    }

    pub fn group_by_velocity(
        &self,
        cadence: &CadenceConfig,
        stories: &[Story],
    ) -> Result<BTreeMap<i64, u32>, EngineError> {
        report::group_by_velocity(&self.calendar(cadence)?, stories)
    }

    pub fn group_by_bugs(
        &self,
        cadence: &CadenceConfig,
        stories: &[Story],
    ) -> Result<BTreeMap<i64, usize>, EngineError> {
        report::group_by_bugs(&self.calendar(cadence)?, stories)
    }

    pub fn group_by_developer(
        &self,
        cadence: &CadenceConfig,
        stories: &[Story],
    ) -> Result<Vec<DeveloperVelocity>, EngineError> {
        report::group_by_developer(&self.calendar(cadence)?, stories)
    }

    pub fn velocity(&self, cadence: &CadenceConfig, stories: &[Story]) -> Result<u32, EngineError> {
        report::velocity(&self.calendar(cadence)?, stories)
    }

    pub fn recent_velocity(
        &self,
        cadence: &CadenceConfig,
        stories: &[Story],
        iterations: usize,
    ) -> Result<u32, EngineError> {
        report::recent_velocity(&self.calendar(cadence)?, stories, iterations)
    }

    pub fn backlog_iterations(
        &self,
        cadence: &CadenceConfig,
        stories: &[Story],
        velocity: u32,
    ) -> Result<BacklogPlan, EngineError> {
        backlog::backlog_iterations(&self.calendar(cadence)?, self.today(), stories, velocity)
    }

    /// State counts for the current iteration of a previously computed plan
    pub fn current_iteration_details(&self, plan: &BacklogPlan, stories: &[Story]) -> IterationDetails {
        backlog::current_iteration_details(plan, stories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::id::StoryId;
    use crate::domain::story::{StoryKind, StoryState};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service() -> IterationService<FixedClock> {
        IterationService::new(FixedClock(date("2016-08-31")))
    }

    /// Counts how often the clock is read
    struct CountingClock(AtomicU32);

    impl Clock for CountingClock {
        fn today(&self) -> NaiveDate {
            let reads = self.0.fetch_add(1, Ordering::SeqCst);
            date("2016-08-31") + Duration::days(i64::from(reads))
        }
    }

    fn make_story(token: u32, state: StoryState, points: Option<u32>) -> Story {
        let id: StoryId = format!("s-{}", token).parse().unwrap();
        let mut story = Story::new(id, format!("Story {}", token));
        story.state = state;
        story.points = points;
        story.sequence = u64::from(token);
        story.owner = Some("Dummy".to_string());
        story
    }

    /// Ten accepted stories, one every 4 days from 2016-07-01, plus a backlog
    fn project_stories() -> Vec<Story> {
        let start = Utc.with_ymd_and_hms(2016, 7, 1, 12, 0, 0).unwrap();
        let mut stories: Vec<Story> = (0..10)
            .map(|i| {
                let mut story = make_story(i, StoryState::Accepted, Some(i % 4 + 1));
                if i % 5 == 4 {
                    story.kind = StoryKind::Bug;
                    story.points = None;
                }
                story.accepted_at = Some(start + Duration::days(i64::from(i) * 4));
                story
            })
            .collect();

        stories.extend((10..16).map(|i| make_story(i, StoryState::Unstarted, Some(3))));
        stories[10].state = StoryState::Started;
        stories
    }

    #[test]
    fn today_is_read_once_per_session() {
        let service = IterationService::new(CountingClock(AtomicU32::new(0)));
        assert_eq!(service.today(), date("2016-08-31"));
        assert_eq!(service.today(), date("2016-08-31"));
    }

    #[test]
    fn cadence_changes_apply_to_next_call() {
        let service = service();
        let mut cadence = CadenceConfig::new(1, 1).anchored_at(date("2011-07-25"));

        assert_eq!(service.iteration_number_for(&cadence, date("2011-08-01")).unwrap(), 2);
        cadence.length_weeks = 2;
        assert_eq!(service.iteration_number_for(&cadence, date("2011-08-01")).unwrap(), 1);

        cadence.length_weeks = 4;
        assert_eq!(service.date_for_iteration_number(&cadence, 5).unwrap(), date("2011-11-14"));
        cadence.start_day = 0;
        assert_eq!(service.iteration_start_date(&cadence).unwrap(), date("2011-07-24"));
    }

    #[test]
    fn unanchored_cadence_uses_today() {
        let service = service();
        // 2016-08-31 is a Wednesday
        let cadence = CadenceConfig::new(2, 1);

        assert_eq!(service.iteration_start_date(&cadence).unwrap(), date("2016-08-30"));
        let current = service.current_iteration(&cadence).unwrap();
        assert_eq!(current.number, 1);
        assert_eq!(current.end, date("2016-09-06"));
    }

    #[test]
    fn reports_agree_with_each_other() {
        let service = service();
        let cadence = CadenceConfig::new(5, 1).anchored_at(date("2016-07-01"));
        let stories = project_stories();

        let by_iteration = service.group_by_iteration(&cadence, &stories).unwrap();
        let by_velocity = service.group_by_velocity(&cadence, &stories).unwrap();
        let by_bugs = service.group_by_bugs(&cadence, &stories).unwrap();
        let developers = service.group_by_developer(&cadence, &stories).unwrap();

        assert_eq!(by_iteration.len(), by_velocity.len());
        for (number, points) in &by_iteration {
            assert_eq!(points.iter().sum::<u32>(), by_velocity[number]);
        }
        assert_eq!(by_bugs.values().sum::<usize>(), 2);
        assert_eq!(developers[0].data, by_velocity);

        let velocity = service.velocity(&cadence, &stories).unwrap();
        let total: u32 = by_velocity.values().sum();
        assert_eq!(velocity, total / by_velocity.len() as u32);
    }

    #[test]
    fn accepted_in_lists_iteration_members() {
        let service = service();
        let cadence = CadenceConfig::new(5, 1).anchored_at(date("2016-07-01"));
        let stories = project_stories();

        // Iteration 1 is 2016-07-01..2016-07-08: stories accepted on day 0 and 4
        let (iteration, members) = service.accepted_in(&cadence, &stories, 1).unwrap();
        assert_eq!(iteration.start, date("2016-07-01"));
        let ids: Vec<String> = members.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["s-0", "s-1"]);
    }

    #[test]
    fn backlog_plan_feeds_current_details() {
        let service = service();
        let cadence = CadenceConfig::new(5, 1).anchored_at(date("2016-07-01"));
        let mut stories = project_stories();

        let plan = service.backlog_iterations(&cadence, &stories, 9).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.iterations[0].stories.len(), 3);
        assert_eq!(plan.iterations[1].stories.len(), 3);

        stories[11].start();
        stories[12].start();
        stories[12].finish();

        let details = service.current_iteration_details(&plan, &stories);
        assert_eq!(details.started, 2);
        assert_eq!(details.finished, 1);
        assert_eq!(details.accepted + details.delivered + details.rejected, 0);
    }

    #[test]
    fn invalid_cadence_fails_every_report() {
        let service = service();
        let cadence = CadenceConfig::new(1, 0);
        let stories = project_stories();

        assert!(matches!(
            service.group_by_velocity(&cadence, &stories),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(service.backlog_iterations(&cadence, &stories, 5).is_err());
        assert!(service.current_iteration(&cadence).is_err());
    }
}
