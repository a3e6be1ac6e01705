//! Configuration handling for Sprint CLI
//!
//! Configuration is stored in `.sprint/config.toml` (project) and
//! `~/.config/sprint-cli/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CadenceConfig, EngineError};

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".sprint";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for velocity reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Average velocity over only this many recent iterations (all when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_iterations: Option<usize>,
}

/// Project-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Iteration cadence
    pub cadence: CadenceConfig,

    /// Report settings
    pub reports: ReportsConfig,
}

impl ProjectConfig {
    /// Checks the settings before any report runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cadence.validate().map_err(|e| match e {
            EngineError::InvalidConfiguration(reason) => ConfigError::Invalid(reason),
            other => ConfigError::Invalid(other.to_string()),
        })?;

        if self.reports.velocity_iterations == Some(0) {
            return Err(ConfigError::Invalid(
                "reports.velocity_iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Renders the config file written by `sprint init`
    pub fn to_toml(&self) -> Result<String> {
        let body = toml::to_string_pretty(self).context("Failed to serialize project config")?;
        Ok(format!(
            "# Sprint CLI configuration\n\
             #\n\
             # cadence.start_day: 0 = Sunday ... 6 = Saturday\n\
             # cadence.anchor_date: optional project start (YYYY-MM-DD)\n\
             # reports.velocity_iterations: optional trailing window for velocity\n\n{}",
            body
        ))
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

/// Reads a TOML file, or the defaults when it does not exist
fn read_toml_or_default<T>(path: &Path, what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}: {}", what, path.display()))?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .with_context(|| format!("Failed to parse {}", what))
}

impl Config {
    /// Loads the global settings and those of the project at `project_root`
    pub fn for_project(project_root: &Path) -> Result<Self> {
        Ok(Self {
            project: Self::load_project_config(project_root)?,
            global: Self::load_global()?,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "sprint", "sprint-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, falling back to defaults when absent
    pub fn load_global() -> Result<GlobalConfig> {
        match Self::global_config_dir() {
            Some(dir) => read_toml_or_default(&dir.join("config.toml"), "global config"),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Loads `.sprint/config.toml` under `project_root`
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        read_toml_or_default(
            &project_root.join(PROJECT_DIR).join("config.toml"),
            "project config",
        )
    }

    /// Finds the project root by looking for `.sprint/` from the current directory up
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root by looking for `.sprint/` from `start` up
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
