//! Sprint CLI - Iteration scheduling and velocity reporting
//!
//! Sprint partitions time into fixed-length iterations, buckets accepted
//! stories into them to measure velocity, and projects the remaining backlog
//! into future iterations.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{CadenceConfig, IterationService, Story, StoryId, StoryKind, StoryState};
