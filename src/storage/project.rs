//! Project management
//!
//! Handles project initialization and provides access to the story store and
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{ProjectConfig, PROJECT_DIR};
use super::{Config, StoryStore};
use crate::domain::Story;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a sprint project. Run 'sprint init' first.")]
    NotInProject,
}

/// A Sprint project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left untouched, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>, project_config: &ProjectConfig) -> Result<Self> {
        let root = root.into();
        let sprint_dir = root.join(PROJECT_DIR);

        project_config.validate()?;

        fs::create_dir_all(&sprint_dir).with_context(|| {
            format!("Failed to create .sprint directory: {}", sprint_dir.display())
        })?;

        let config_path = sprint_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, project_config.to_toml()?)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let stories_path = sprint_dir.join("stories.jsonl");
        if !stories_path.exists() {
            fs::write(&stories_path, "").with_context(|| {
                format!("Failed to create story store: {}", stories_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .sprint directory path
    pub fn sprint_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the validated project configuration
    pub fn settings(&self) -> Result<&ProjectConfig> {
        self.config.project.validate()?;
        Ok(&self.config.project)
    }

    /// Returns the story store
    pub fn story_store(&self) -> StoryStore {
        StoryStore::for_project(&self.root)
    }

    /// Reads every story in the project
    pub fn stories(&self) -> Result<Vec<Story>> {
        self.story_store().read_all()
    }
}
