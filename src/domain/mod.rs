//! Domain models for Sprint CLI
//!
//! Contains the iteration calendar and the reporting engine, without any I/O
//! concerns.

mod id;
mod story;
mod clock;
mod error;
pub mod calendar;
pub mod report;
pub mod backlog;
mod service;

pub use id::{StoryId, IdError};
pub use story::{Story, StoryKind, StoryState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::EngineError;
pub use calendar::{CadenceConfig, Calendar, Iteration};
pub use report::DeveloperVelocity;
pub use backlog::{BacklogPlan, IterationDetails, ProjectedIteration};
pub use service::IterationService;
