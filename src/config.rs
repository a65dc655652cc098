//! Configuration System
//!
//! Layered settings: built-in defaults, the user config file, workspace
//! config files, then `PATHFINDER__SECTION__KEY` environment variables.
//! Later layers override earlier ones.

use crate::error::PathfinderError;
use crate::logging::LoggingConfig;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::global_file::global_config_path;

pub const ENV_PREFIX: &str = "PATHFINDER";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathfinderConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub replay: ReplayConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where state documents live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Rename unreadable documents aside instead of failing the load
    #[serde(default)]
    pub quarantine_corrupt: bool,
}

fn default_storage_root() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".pathfinder"))
        .unwrap_or_else(|| PathBuf::from(".pathfinder"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            quarantine_corrupt: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Pause between paced replay steps
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
}

fn default_step_interval_ms() -> u64 {
    500
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_import_limit")]
    pub default_limit: usize,

    /// Relevance assigned to every imported node
    #[serde(default = "default_import_relevance")]
    pub default_relevance: f64,
}

fn default_import_limit() -> usize {
    100
}

fn default_import_relevance() -> f64 {
    0.5
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_limit: default_import_limit(),
            default_relevance: default_import_relevance(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Storage(String),
    Replay(String),
    Import(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Replay(msg) => write!(f, "Replay: {}", msg),
            ValidationError::Import(msg) => write!(f, "Import: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PathfinderConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.storage.root.as_os_str().is_empty() {
            errors.push(ValidationError::Storage("root cannot be empty".to_string()));
        }
        if self.import.default_limit == 0 {
            errors.push(ValidationError::Import("default_limit must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.import.default_relevance) {
            errors.push(ValidationError::Import(format!(
                "default_relevance {} is outside [0, 1]",
                self.import.default_relevance
            )));
        }
        if self.replay.step_interval_ms > 60_000 {
            errors.push(ValidationError::Replay(format!(
                "step_interval_ms {} exceeds one minute",
                self.replay.step_interval_ms
            )));
        }
        errors.extend(
            crate::logging::validate_logging(&self.logging)
                .into_iter()
                .map(ValidationError::Logging),
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// `validate` folded into a single error for callers that stop at the first failure.
    pub fn validated(self) -> Result<Self, PathfinderError> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            PathfinderError::Config(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(self)
    }
}

/// Builds a [`PathfinderConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, user file, workspace files and environment overrides.
    pub fn load(workspace_root: &Path) -> Result<PathfinderConfig, PathfinderError> {
        Self::load_with(workspace_root, None)
    }

    /// As [`ConfigLoader::load`], with an explicit file layered above the
    /// workspace files and below the environment.
    pub fn load_with(
        workspace_root: &Path,
        explicit_file: Option<&Path>,
    ) -> Result<PathfinderConfig, PathfinderError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder)?;
        builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        if let Some(file) = explicit_file {
            if !file.exists() {
                return Err(PathfinderError::Config(format!(
                    "Config file not found: {}",
                    file.display()
                )));
            }
            builder = builder.add_source(File::from(file).required(true));
        }
        builder = builder.add_source(Self::environment());

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load a single file over the defaults, ignoring every other layer.
    pub fn load_from_file(path: &Path) -> Result<PathfinderConfig, PathfinderError> {
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Path of the user-level config file, when one can be located.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_config_path()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }
}
