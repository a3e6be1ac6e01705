//! # Storage Layer
//!
//! Persistence layer for Sprint CLI with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Stories | JSONL (one JSON per line) | `.sprint/stories.jsonl` |
//! | Config | TOML | `.sprint/config.toml` |
//!
//! ## Project Structure
//!
//! ```text
//! .sprint/
//! ├── stories.jsonl         # All stories in JSONL format
//! └── config.toml           # Cadence and report settings
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a Sprint project
//! - [`StoryStore`] - Read stories from JSONL
//! - [`Config`] - Project and global configuration

mod jsonl;
mod config;
mod project;

pub use jsonl::StoryStore;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, ReportsConfig, PROJECT_DIR};
pub use project::{Project, ProjectError};
