//! Story domain model
//!
//! Stories are the units of work that iterations are measured in. Only the
//! fields the scheduling engine reads are modelled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::StoryId;

/// Kind of a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryKind {
    #[default]
    Feature,
    Chore,
    /// Bugs carry no estimate by convention but are counted on their own
    Bug,
    Release,
}

impl StoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryKind::Feature => "feature",
            StoryKind::Chore => "chore",
            StoryKind::Bug => "bug",
            StoryKind::Release => "release",
        }
    }
}

/// Lifecycle state of a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryState {
    #[default]
    Unstarted,
    Unscheduled,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
}

impl StoryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryState::Unstarted => "unstarted",
            StoryState::Unscheduled => "unscheduled",
            StoryState::Started => "started",
            StoryState::Finished => "finished",
            StoryState::Delivered => "delivered",
            StoryState::Accepted => "accepted",
            StoryState::Rejected => "rejected",
        }
    }

    /// Returns true if this state counts toward historical velocity
    pub fn is_accepted(&self) -> bool {
        matches!(self, StoryState::Accepted)
    }

    /// Returns true if stories in this state are still waiting in the backlog
    pub fn is_backlog(&self) -> bool {
        matches!(
            self,
            StoryState::Unstarted | StoryState::Unscheduled | StoryState::Started
        )
    }
}

/// A story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Unique identifier
    pub id: StoryId,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub kind: StoryKind,

    /// Point estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,

    #[serde(default)]
    pub state: StoryState,

    /// When the story was accepted (only set once accepted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,

    /// Display name of the contributor credited with the story
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Backlog order (lower comes first)
    #[serde(default)]
    pub sequence: u64,
}

impl Story {
    /// Creates a new unstarted feature with the given ID and title
    pub fn new(id: StoryId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            kind: StoryKind::Feature,
            points: None,
            state: StoryState::Unstarted,
            accepted_at: None,
            owner: None,
            sequence: 0,
        }
    }

    /// Points this story contributes to velocity
    ///
    /// Bugs contribute nothing, even when someone estimated them.
    pub fn velocity_points(&self) -> u32 {
        match self.kind {
            StoryKind::Bug => 0,
            _ => self.points.unwrap_or(0),
        }
    }

    /// Returns true if this is a bug
    pub fn is_bug(&self) -> bool {
        self.kind == StoryKind::Bug
    }

    /// Transitions unstarted/unscheduled to started
    pub fn start(&mut self) {
        if matches!(self.state, StoryState::Unstarted | StoryState::Unscheduled) {
            self.state = StoryState::Started;
        }
    }

    /// Transitions started to finished
    pub fn finish(&mut self) {
        if self.state == StoryState::Started {
            self.state = StoryState::Finished;
        }
    }

    /// Transitions finished to delivered
    pub fn deliver(&mut self) {
        if self.state == StoryState::Finished {
            self.state = StoryState::Delivered;
        }
    }

    /// Transitions delivered to accepted, recording when
    pub fn accept(&mut self, at: DateTime<Utc>) {
        if self.state == StoryState::Delivered {
            self.state = StoryState::Accepted;
            self.accepted_at = Some(at);
        }
    }

    /// Transitions delivered to rejected
    pub fn reject(&mut self) {
        if self.state == StoryState::Delivered {
            self.state = StoryState::Rejected;
        }
    }

    /// Transitions rejected back to started
    pub fn restart(&mut self) {
        if self.state == StoryState::Rejected {
            self.state = StoryState::Started;
        }
    }
}
