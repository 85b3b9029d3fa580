//! Configuration management for filemerge
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use filemerge::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Engine: {}", config.engine.program);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `FILEMERGE__<section>__<key>`
//!
//! Examples:
//! - `FILEMERGE__ENGINE__PROGRAM=/opt/pig/bin/pig`
//! - `FILEMERGE__NAMING__GRANULARITY=month`
//! - `FILEMERGE__JOB__DEFAULT_REDUCERS=20`
//! - `FILEMERGE__ENGINE__ARGS="-useHCatalog -f {job}"` (split on spaces)
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/filemerge.toml`.
//! This can be overridden using the `FILEMERGE_CONFIG` environment variable
//! or the `--config` flag.

mod models;
mod sources;
mod validation;

pub use models::{
    Config, EngineConfig, JOB_PLACEHOLDER, JobConfig, NamingConfig, RunnerConfig, TemplateConfig,
    TemplateTokens,
};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`FILEMERGE__*`)
    /// 2. TOML file (default: `config/filemerge.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (bad naming pattern, duplicate tokens, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
