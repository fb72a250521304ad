// Configuration loader
// Loads settings from ~/.plconsole/config.toml (or $PLCONSOLE_CONFIG)

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::constants::{APP_DIR, CONFIG_ENV};
use super::settings::Config;

/// Config file location: $PLCONSOLE_CONFIG, else ~/.plconsole/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::home_dir().map(|home| home.join(APP_DIR).join("config.toml"))
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl ConfigSource {
    /// `File` if `path` names an existing file, otherwise `Defaults`
    pub fn for_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => ConfigSource::File(path.to_path_buf()),
            _ => ConfigSource::Defaults,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Load configuration from the default location.
///
/// No config file (or no home directory) means defaults. Also returns where
/// the configuration came from.
pub fn load_config() -> Result<(Config, ConfigSource)> {
    let source = ConfigSource::for_path(default_config_path().as_deref());
    let config = match &source {
        ConfigSource::File(path) => load_config_from(path)?,
        ConfigSource::Defaults => {
            debug!("No config file, using default configuration");
            Config::default()
        }
    };
    Ok((config, source))
}

/// Load configuration from `path`; a missing file yields defaults
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    debug!(path = %path.display(), theme = config.theme.name(), "Configuration loaded");
    Ok(config)
}
