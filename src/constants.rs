//! Global constants for logtally
//!
//! Centralized location for application-wide constants

/// Application name, used for the config directory and log filter target
pub const APP_NAME: &str = "logtally";

/// Name of the configuration file inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Lines longer than this many characters are rejected before parsing
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Timestamp layout inside the square brackets, e.g. `10/Oct/2000:13:55:36 -0700`
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Typed at the interactive prompt to leave the loop (case-insensitive)
pub const EXIT_SENTINEL: &str = "exit";

/// Placeholder combined logs write for an absent referer or user agent
pub const EMPTY_FIELD_PLACEHOLDER: &str = "-";

/// Substring that marks a classified family label as a bot
pub const BOT_MARKER: &str = "bot";

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "logtally=warn";
