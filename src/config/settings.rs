// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::{APP_DIR, DEFAULT_HISTORY_ENTRIES, DEFAULT_PROMPT};
use super::theme::Theme;

/// Command history persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Write the session's queries to disk at shutdown
    pub persist: bool,

    /// History file location (defaults to ~/.plconsole/history)
    pub path: Option<PathBuf>,

    /// Number of most recent entries kept in the file
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            persist: true,
            path: None,
            max_entries: DEFAULT_HISTORY_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display theme; --theme-* flags override it
    pub theme: Theme,

    /// Prompt shown by the built-in engine
    pub prompt: String,

    /// Log at debug level unless PLCONSOLE_LOG says otherwise
    pub debug_logging: bool,

    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            prompt: DEFAULT_PROMPT.to_string(),
            debug_logging: false,
            history: HistoryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history.persist && self.history.max_entries == 0 {
            anyhow::bail!(
                "history.max_entries must be at least 1 when history.persist is enabled"
            );
        }
        Ok(())
    }

    /// Resolved history file, or `None` when persistence is off or no home
    /// directory can be found
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history.persist {
            return None;
        }
        self.history
            .path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(APP_DIR).join("history")))
    }
}
