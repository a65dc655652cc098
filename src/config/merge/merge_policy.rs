//! Merge rules: defaults first, later sources override earlier ones.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with defaults for every scalar setting.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    let defaults = super::super::PathfinderConfig::default();
    Config::builder()
        .set_default("storage.root", defaults.storage.root.to_string_lossy().into_owned())?
        .set_default("storage.quarantine_corrupt", defaults.storage.quarantine_corrupt)?
        .set_default("replay.step_interval_ms", defaults.replay.step_interval_ms)?
        .set_default("import.default_limit", defaults.import.default_limit as u64)?
        .set_default("import.default_relevance", defaults.import.default_relevance)
}
