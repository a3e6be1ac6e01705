//! Historical iteration reports
//!
//! Every report looks only at accepted stories and buckets them by the
//! iteration their `accepted_at` date falls in. Buckets are sparse: an
//! iteration with no accepted story has no entry at all.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::calendar::Calendar;
use super::error::EngineError;
use super::story::Story;

/// Points a single contributor delivered per iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeveloperVelocity {
    pub name: String,
    pub data: BTreeMap<i64, u32>,
}

/// Accepted stories paired with their iteration number, in acceptance order
fn accepted_by_iteration<'a>(
    calendar: &Calendar,
    stories: &'a [Story],
) -> Result<Vec<(i64, &'a Story)>, EngineError> {
    let mut accepted = Vec::new();

    for story in stories.iter().filter(|s| s.state.is_accepted()) {
        let accepted_at = story
            .accepted_at
            .ok_or_else(|| EngineError::InconsistentItemState {
                story: story.id.clone(),
            })?;
        accepted.push((accepted_at, story));
    }

    // Stable, so stories accepted at the same instant keep input order
    accepted.sort_by_key(|(at, _)| *at);

    Ok(accepted
        .into_iter()
        .map(|(at, story)| (calendar.iteration_number_for(at.date_naive()), story))
        .collect())
}

/// Points of each accepted story per iteration, in acceptance order
///
/// Bugs show up as a `0` entry so the length of each list matches the
/// number of stories accepted in that iteration.
pub fn group_by_iteration(
    calendar: &Calendar,
    stories: &[Story],
) -> Result<BTreeMap<i64, Vec<u32>>, EngineError> {
    let mut groups: BTreeMap<i64, Vec<u32>> = BTreeMap::new();

    for (number, story) in accepted_by_iteration(calendar, stories)? {
        groups.entry(number).or_default().push(story.velocity_points());
    }

    Ok(groups)
}

/// Total accepted points per iteration
pub fn group_by_velocity(
    calendar: &Calendar,
    stories: &[Story],
) -> Result<BTreeMap<i64, u32>, EngineError> {
    let mut groups: BTreeMap<i64, u32> = BTreeMap::new();

    for (number, story) in accepted_by_iteration(calendar, stories)? {
        let total = groups.entry(number).or_default();
        *total = total.saturating_add(story.velocity_points());
    }

    Ok(groups)
}

/// Number of accepted bugs per iteration
pub fn group_by_bugs(
    calendar: &Calendar,
    stories: &[Story],
) -> Result<BTreeMap<i64, usize>, EngineError> {
    let mut groups: BTreeMap<i64, usize> = BTreeMap::new();

    for (number, story) in accepted_by_iteration(calendar, stories)? {
        let count = groups.entry(number).or_default();
        if story.is_bug() {
            *count += 1;
        }
    }

    Ok(groups)
}

/// Accepted points per contributor per iteration, ordered by name
///
/// Stories without an owner are left out of this report.
pub fn group_by_developer(
    calendar: &Calendar,
    stories: &[Story],
) -> Result<Vec<DeveloperVelocity>, EngineError> {
    let mut by_owner: BTreeMap<&str, BTreeMap<i64, u32>> = BTreeMap::new();

    for (number, story) in accepted_by_iteration(calendar, stories)? {
        let Some(owner) = story.owner.as_deref() else {
            continue;
        };
        let total = by_owner.entry(owner).or_default().entry(number).or_default();
        *total = total.saturating_add(story.velocity_points());
    }

    Ok(by_owner
        .into_iter()
        .map(|(name, data)| DeveloperVelocity {
            name: name.to_string(),
            data,
        })
        .collect())
}

/// Sum of velocity points, saturating at `u32::MAX`
pub fn total_points<'a>(stories: impl IntoIterator<Item = &'a Story>) -> u32 {
    stories
        .into_iter()
        .fold(0_u32, |total, story| total.saturating_add(story.velocity_points()))
}

/// Floor of the mean of the given per-iteration totals, 0 when empty
pub fn mean_velocity<'a>(totals: impl IntoIterator<Item = &'a u32>) -> u32 {
    let (sum, count) = totals
        .into_iter()
        .fold((0_u64, 0_u64), |(sum, count), points| {
            (sum + u64::from(*points), count + 1)
        });

    if count == 0 {
        0
    } else {
        // The mean never exceeds the largest total, so it fits in u32
        u32::try_from(sum / count).unwrap_or(u32::MAX)
    }
}

/// Typical accepted points per iteration over the whole history
pub fn velocity(calendar: &Calendar, stories: &[Story]) -> Result<u32, EngineError> {
    let groups = group_by_velocity(calendar, stories)?;
    let velocity = mean_velocity(groups.values());
    debug!(iterations = groups.len(), velocity, "computed velocity");
    Ok(velocity)
}

/// Velocity over only the last `iterations` iterations that have accepted work
///
/// A window of 0 means the whole history.
pub fn recent_velocity(
    calendar: &Calendar,
    stories: &[Story],
    iterations: usize,
) -> Result<u32, EngineError> {
    let groups = group_by_velocity(calendar, stories)?;
    let skip = if iterations == 0 {
        0
    } else {
        groups.len().saturating_sub(iterations)
    };

    let velocity = mean_velocity(groups.values().skip(skip));
    debug!(window = iterations, velocity, "computed recent velocity");
    Ok(velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::CadenceConfig;
    use crate::domain::id::StoryId;
    use crate::domain::story::{StoryKind, StoryState};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn calendar() -> Calendar {
        // Tuesday iterations, one week long, starting 2016-07-05
        let cadence = CadenceConfig::new(2, 1).anchored_at(date("2016-07-05"));
        Calendar::resolve(&cadence, date("2016-08-31")).unwrap()
    }

    fn at(day: &str, hour: u32) -> DateTime<Utc> {
        let d = date(day);
        Utc.from_utc_datetime(&d.and_hms_opt(hour, 0, 0).unwrap())
    }

    fn accepted(token: u32, kind: StoryKind, points: Option<u32>, when: DateTime<Utc>, owner: &str) -> Story {
        let id: StoryId = format!("s-{}", token).parse().unwrap();
        let mut story = Story::new(id, format!("Story {}", token));
        story.kind = kind;
        story.points = points;
        story.state = StoryState::Accepted;
        story.accepted_at = Some(when);
        story.owner = Some(owner.to_string());
        story
    }

    /// Small hand-checked history over iterations 1, 2 and 4
    fn history() -> Vec<Story> {
        vec![
            accepted(1, StoryKind::Feature, Some(3), at("2016-07-06", 9), "Ana"),
            accepted(2, StoryKind::Bug, None, at("2016-07-05", 9), "Ben"),
            accepted(3, StoryKind::Chore, Some(1), at("2016-07-11", 17), "Ana"),
            accepted(4, StoryKind::Feature, Some(5), at("2016-07-12", 8), "Ben"),
            accepted(5, StoryKind::Bug, Some(2), at("2016-07-13", 8), "Ana"),
            accepted(6, StoryKind::Feature, None, at("2016-07-26", 8), "Ana"),
            accepted(7, StoryKind::Feature, Some(8), at("2016-07-27", 8), "Ben"),
        ]
    }

    #[test]
    fn groups_points_by_iteration_in_acceptance_order() {
        let groups = group_by_iteration(&calendar(), &history()).unwrap();

        let expected: BTreeMap<i64, Vec<u32>> =
            BTreeMap::from([(1, vec![0, 3, 1]), (2, vec![5, 0]), (4, vec![0, 8])]);
        assert_eq!(groups, expected);
    }

    #[test]
    fn groups_velocity_by_iteration() {
        let groups = group_by_velocity(&calendar(), &history()).unwrap();
        assert_eq!(groups, BTreeMap::from([(1, 4), (2, 5), (4, 8)]));
    }

    #[test]
    fn counts_bugs_including_empty_buckets() {
        let groups = group_by_bugs(&calendar(), &history()).unwrap();
        assert_eq!(groups, BTreeMap::from([(1, 1), (2, 1), (4, 0)]));
    }

    #[test]
    fn groups_by_developer() {
        let groups = group_by_developer(&calendar(), &history()).unwrap();

        assert_eq!(
            groups,
            vec![
                DeveloperVelocity {
                    name: "Ana".to_string(),
                    data: BTreeMap::from([(1, 4), (2, 0), (4, 0)]),
                },
                DeveloperVelocity {
                    name: "Ben".to_string(),
                    data: BTreeMap::from([(1, 0), (2, 5), (4, 8)]),
                },
            ]
        );
    }

    #[test]
    fn developer_report_skips_unowned_stories() {
        let mut stories = history();
        for story in &mut stories {
            if story.owner.as_deref() == Some("Ben") {
                story.owner = None;
            }
        }

        let groups = group_by_developer(&calendar(), &stories).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Ana");
    }

    #[test]
    fn velocity_is_floored_mean_of_nonempty_iterations() {
        // (4 + 5 + 8) / 3 = 5.67
        assert_eq!(velocity(&calendar(), &history()).unwrap(), 5);
    }

    #[test]
    fn recent_velocity_uses_trailing_window() {
        // (5 + 8) / 2 = 6.5
        assert_eq!(recent_velocity(&calendar(), &history(), 2).unwrap(), 6);
        assert_eq!(recent_velocity(&calendar(), &history(), 10).unwrap(), 5);
        assert_eq!(recent_velocity(&calendar(), &history(), 0).unwrap(), 5);
    }

    #[test]
    fn velocity_without_history_is_zero() {
        assert_eq!(velocity(&calendar(), &[]).unwrap(), 0);
        assert!(group_by_velocity(&calendar(), &[]).unwrap().is_empty());
    }

    #[test]
    fn ignores_stories_that_are_not_accepted() {
        let mut stories = history();
        stories[0].state = StoryState::Delivered;
        stories[3].state = StoryState::Started;
        stories[3].accepted_at = None;

        let groups = group_by_iteration(&calendar(), &stories).unwrap();
        assert_eq!(groups[&1], vec![0, 1]);
        assert_eq!(groups[&2], vec![0]);
    }

    #[test]
    fn accepted_without_timestamp_is_inconsistent() {
        let mut stories = history();
        stories[2].accepted_at = None;

        let err = group_by_velocity(&calendar(), &stories).unwrap_err();
        assert_eq!(
            err,
            EngineError::InconsistentItemState {
                story: "s-3".parse().unwrap()
            }
        );
        assert!(group_by_bugs(&calendar(), &stories).is_err());
        assert!(group_by_developer(&calendar(), &stories).is_err());
    }

    #[test]
    fn developer_report_serializes_as_name_and_data() {
        let groups = group_by_developer(&calendar(), &history()[..1]).unwrap();
        let json = serde_json::to_value(&groups).unwrap();
        assert_eq!(json, serde_json::json!([{ "name": "Ana", "data": { "1": 3 } }]));
    }

    #[test]
    fn huge_estimates_saturate_instead_of_overflowing() {
        let stories = vec![
            accepted(1, StoryKind::Feature, Some(3_000_000_000), at("2016-07-06", 9), "Ana"),
            accepted(2, StoryKind::Feature, Some(3_000_000_000), at("2016-07-07", 9), "Ana"),
        ];

        let by_velocity = group_by_velocity(&calendar(), &stories).unwrap();
        assert_eq!(by_velocity, BTreeMap::from([(1, u32::MAX)]));

        let developers = group_by_developer(&calendar(), &stories).unwrap();
        assert_eq!(developers[0].data, BTreeMap::from([(1, u32::MAX)]));

        assert_eq!(total_points(&stories), u32::MAX);
        assert_eq!(velocity(&calendar(), &stories).unwrap(), u32::MAX);
    }

    #[test]
    fn total_points_skips_bugs() {
        let stories = history();
        // 3 + 1 + 5 + 8, bug estimates ignored
        assert_eq!(total_points(&stories), 17);
        assert_eq!(total_points(&[]), 0);
    }

    /// Deterministic pseudo-random history: 65 stories over 9 iterations
    fn seeded_history() -> Vec<Story> {
        let point_scale = [0, 1, 2, 3, 5, 8];
        let kinds = [StoryKind::Feature, StoryKind::Feature, StoryKind::Bug, StoryKind::Feature];
        let mut seed: u64 = 666;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (seed >> 33) % bound
        };

        (0..65)
            .map(|i| {
                let kind = kinds[next(4) as usize];
                let points = match kind {
                    StoryKind::Bug => None,
                    _ => Some(point_scale[next(6) as usize]),
                };
                let when = at("2016-07-05", 10) + Duration::days(i * 63 / 65);
                accepted(i as u32, kind, points, when, "Dummy")
            })
            .collect()
    }

    #[test]
    fn seeded_history_velocity_matches_iteration_sums() {
        let stories = seeded_history();
        let by_iteration = group_by_iteration(&calendar(), &stories).unwrap();
        let by_velocity = group_by_velocity(&calendar(), &stories).unwrap();
        let by_bugs = group_by_bugs(&calendar(), &stories).unwrap();

        assert_eq!(by_iteration.keys().copied().collect::<Vec<_>>(), (1..=9).collect::<Vec<_>>());
        assert_eq!(by_iteration.values().map(Vec::len).sum::<usize>(), 65);

        for (number, points) in &by_iteration {
            assert_eq!(points.iter().sum::<u32>(), by_velocity[number]);
        }

        let bugs = stories.iter().filter(|s| s.is_bug()).count();
        assert_eq!(by_bugs.values().sum::<usize>(), bugs);

        let total: u32 = by_velocity.values().sum();
        assert_eq!(velocity(&calendar(), &stories).unwrap(), total / 9);

        let developers = group_by_developer(&calendar(), &stories).unwrap();
        assert_eq!(developers.len(), 1);
        assert_eq!(developers[0].data, by_velocity);
    }
}
