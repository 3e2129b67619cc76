use crate::chat::chatgpt;
use crate::config::schema::RobotConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
static CONFIG_TEST_ENV_LOCK: Mutex<()> = Mutex::new(());

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
}

/// Loads the robot configuration
///
/// Layer 1 is the JSON file (explicit path, else `~/.viam-chatgpt/config.json`).
/// Layer 2 fills a missing or empty `api_key` on chat components from
/// `OPENAI_API_KEY`.
pub fn load_robot_config(cli_config_path: Option<PathBuf>) -> Result<RobotConfig> {
    tracing::debug!("Loading configuration");

    let path = cli_config_path
        .or_else(get_default_config_path)
        .context("Could not determine a configuration path")?;

    if !path.exists() {
        return Err(ConfigError::NotFound(path).into());
    }

    tracing::debug!(config_path = %path.display(), "Loading configuration from file");
    let config = read_config_file(&path)?;
    let config = merge_env_variables(config);

    tracing::debug!(
        components = config.components.len(),
        "Configuration loaded successfully"
    );
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RobotConfig> {
    warn_if_world_readable(path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: RobotConfig = serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;
    Ok(config)
}

#[cfg(unix)]
fn warn_if_world_readable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                "Config file {:?} has permissions {:o}; it may hold an API key, consider 0600",
                path,
                mode
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_world_readable(_path: &Path) {}

fn merge_env_variables(mut config: RobotConfig) -> RobotConfig {
    let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()) else {
        return config;
    };

    let chat_model = chatgpt::model();
    for component in config
        .components
        .iter_mut()
        .filter(|c| c.model == chat_model)
    {
        let missing = matches!(component.attributes.get_string("api_key"), Ok(None) | Ok(Some("")));
        if missing {
            tracing::debug!(component = %component.name, "Applying {} override", API_KEY_ENV);
            component.attributes.set_string("api_key", key.clone());
        }
    }

    config
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".viam-chatgpt").join("config.json"))
}

pub fn get_config_path() -> Option<PathBuf> {
    get_default_config_path()
}
