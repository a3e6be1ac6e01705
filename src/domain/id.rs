//! Story identifiers
//!
//! ID Format: `s-{token}` (e.g., `s-42`, `s-7f2b4c1`)
//!
//! The token is assigned by whatever tool created the story; this crate only
//! reads IDs, so it validates the shape and otherwise treats them as opaque.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid story ID format: expected 's-{{token}}', got '{0}'")]
    InvalidStoryId(String),
}

/// Story ID in the format `s-{token}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoryId {
    token: String,
}

impl StoryId {
    /// Returns the token portion of the ID
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s-{}", self.token)
    }
}

impl FromStr for StoryId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let token = s
            .strip_prefix("s-")
            .ok_or_else(|| IdError::InvalidStoryId(s.to_string()))?;

        let valid = !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(IdError::InvalidStoryId(s.to_string()));
        }

        Ok(Self {
            token: token.to_string(),
        })
    }
}

impl TryFrom<String> for StoryId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StoryId> for String {
    fn from(id: StoryId) -> Self {
        id.to_string()
    }
}
