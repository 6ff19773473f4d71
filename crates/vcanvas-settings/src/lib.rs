//! VCanvas Settings Crate
//!
//! Editor configuration: selection grips, undo capacity, viewport, redraw
//! debouncing and logging, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    Config, HistorySettings, LoggingSettings, RedrawSettings, SelectionSettings,
    ViewportSettings, APP_DIR_NAME, CONFIG_FILE_NAME,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
