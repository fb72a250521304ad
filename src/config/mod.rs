// Configuration module
// Public interface for configuration loading

pub mod constants;
mod loader;
mod settings;
mod theme;

pub use constants::*;
pub use loader::{default_config_path, load_config, load_config_from, ConfigSource};
pub use settings::{Config, HistoryConfig};
pub use theme::Theme;
