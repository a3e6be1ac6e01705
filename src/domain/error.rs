//! Errors raised by the scheduling engine

use thiserror::Error;

use super::id::StoryId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Iteration {0} is outside the representable calendar")]
    IterationOutOfRange(i64),

    #[error("Story {story} is accepted but has no accepted_at timestamp")]
    InconsistentItemState { story: StoryId },
}
