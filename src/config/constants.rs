// Console-wide constants

/// Prompt printed by the built-in engine before each query
pub const DEFAULT_PROMPT: &str = "?- ";

/// Marker printed before each continuation line of a multi-line query
pub const CONTINUATION_PROMPT: &str = "|  ";

/// Question asked between solutions
pub const MORE_PROMPT: &str = "  more? (y/n) ";

/// Directory under the home directory holding config and history
pub const APP_DIR: &str = ".plconsole";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PLCONSOLE_CONFIG";

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "PLCONSOLE_LOG";

/// History entries kept on disk unless configured otherwise
pub const DEFAULT_HISTORY_ENTRIES: usize = 500;

/// Process exit status when the session ends through the fault boundary
pub const FAULT_EXIT_CODE: i32 = 1;
