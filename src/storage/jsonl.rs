//! JSONL storage for stories
//!
//! Stories are stored in `.sprint/stories.jsonl` with one JSON object per line.
//! The file is maintained by whatever tool tracks the stories; this store only
//! reads it, under a shared lock so a concurrent writer never hands us half a
//! file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::config::PROJECT_DIR;
use crate::domain::{Story, StoryId};

/// Store for story data in JSONL format
pub struct StoryStore {
    path: PathBuf,
}

impl StoryStore {
    /// Creates a new story store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("stories.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all stories in file order
    ///
    /// A later line with an ID already seen replaces the earlier story in
    /// place, so appended updates win.
    pub fn read_all(&self) -> Result<Vec<Story>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open story store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on story store")?;

        let reader = BufReader::new(&file);
        let mut stories: Vec<Story> = Vec::new();
        let mut positions: HashMap<StoryId, usize> = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let story: Story = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse story at line {}", line_num + 1))?;

            match positions.get(&story.id).copied() {
                Some(index) => stories[index] = story,
                None => {
                    positions.insert(story.id.clone(), stories.len());
                    stories.push(story);
                }
            }
        }

        // Lock is released when file is dropped
        Ok(stories)
    }
}
