//! Workspace config files: `config/config.toml`, then `config/{PATHFINDER_ENV}.toml`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_SELECTOR: &str = "PATHFINDER_ENV";
const DEFAULT_ENV: &str = "development";
const BASE_NAME: &str = "config";

/// Existing workspace config files for `env_name`, lowest precedence first.
///
/// The environment name must be a bare file stem; anything that could
/// escape `config/` is rejected.
pub fn workspace_config_files(workspace_root: &Path, env_name: &str) -> Result<Vec<PathBuf>, ConfigError> {
    if env_name.is_empty() || env_name.contains(['/', '\\']) || env_name.starts_with('.') {
        return Err(ConfigError::Message(format!(
            "{} must be a plain name, got `{}`",
            ENV_SELECTOR, env_name
        )));
    }

    let config_dir = workspace_root.join("config");
    let mut stems = vec![BASE_NAME];
    if env_name != BASE_NAME {
        stems.push(env_name);
    }
    Ok(stems
        .into_iter()
        .map(|stem| config_dir.join(format!("{}.toml", stem)))
        .filter(|path| path.is_file())
        .collect())
}

/// Layer the workspace files for the selected environment onto `builder`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env_name = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let files = workspace_config_files(workspace_root, &env_name)?;
    if files.is_empty() {
        debug!(workspace = %workspace_root.display(), env = %env_name, "No workspace config files");
    }

    Ok(files.into_iter().fold(builder, |builder, path| {
        debug!(config_path = %path.display(), env = %env_name, "Layering workspace config");
        builder.add_source(File::from(path).format(FileFormat::Toml))
    }))
}
