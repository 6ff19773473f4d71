//! Editor configuration for VCanvas
//!
//! Supports JSON and TOML files, chosen by extension, stored in the
//! platform configuration directory.
//!
//! Configuration is organized into sections:
//! - Selection grips, snapping and the constrained margin
//! - History (undo capacity)
//! - Viewport (zoom, DPI, workspace size)
//! - Redraw debouncing
//! - Logging

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use vcanvas_designer::{Canvas, Margin, SelectionOptions, DEFAULT_MAX_UNDO_STEP_COUNT};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Directory name under the platform config directory
pub const APP_DIR_NAME: &str = "vcanvas";
/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Selection grip and manipulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub resize_grip_size: f64,
    pub rotation_grip_size: f64,
    pub rotation_grip_line_length: f64,
    /// Rotation snaps to multiples of 90° within this many degrees
    pub snap_angle_threshold: f64,
    pub allow_negative_resize: bool,
    pub constrained_margin_enabled: bool,
    pub margin: Margin,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        SelectionOptions::default().into()
    }
}

impl From<SelectionOptions> for SelectionSettings {
    fn from(options: SelectionOptions) -> Self {
        Self {
            resize_grip_size: options.resize_grip_size,
            rotation_grip_size: options.rotation_grip_size,
            rotation_grip_line_length: options.rotation_grip_line_length,
            snap_angle_threshold: options.snap_angle_threshold,
            allow_negative_resize: options.allow_negative_resize,
            constrained_margin_enabled: options.constrained_margin_enabled,
            margin: options.margin,
        }
    }
}

impl SelectionSettings {
    pub fn to_options(&self) -> SelectionOptions {
        SelectionOptions {
            resize_grip_size: self.resize_grip_size,
            rotation_grip_size: self.rotation_grip_size,
            rotation_grip_line_length: self.rotation_grip_line_length,
            snap_angle_threshold: self.snap_angle_threshold,
            allow_negative_resize: self.allow_negative_resize,
            constrained_margin_enabled: self.constrained_margin_enabled,
            margin: self.margin,
        }
    }
}

/// Undo/redo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub enabled: bool,
    pub max_undo_step_count: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_undo_step_count: DEFAULT_MAX_UNDO_STEP_COUNT,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub zoom: f64,
    pub dpi_x: f64,
    pub dpi_y: f64,
    pub device_pixel_ratio: f64,
    /// Workspace width in canvas units
    pub workspace_width: f64,
    /// Workspace height in canvas units
    pub workspace_height: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            dpi_x: 72.0,
            dpi_y: 72.0,
            device_pixel_ratio: 1.0,
            workspace_width: 800.0,
            workspace_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedrawSettings {
    /// Delay between a redraw request and the redraw, in milliseconds
    pub debounce_ms: u64,
}

impl Default for RedrawSettings {
    fn default() -> Self {
        Self { debounce_ms: 16 }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when RUST_LOG is unset (e.g. "info", "vcanvas_designer=debug")
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub selection: SelectionSettings,
    pub history: HistorySettings,
    pub viewport: ViewportSettings,
    pub redraw: RedrawSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, e.g. `~/.config/vcanvas/config.toml`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })?;
        path.push(APP_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        Ok(path)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, falling back to defaults when it is
    /// missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let s = &self.selection;
        positive("selection.resize_grip_size", s.resize_grip_size)?;
        positive("selection.rotation_grip_size", s.rotation_grip_size)?;
        if s.rotation_grip_line_length.is_nan() || s.rotation_grip_line_length < 0.0 {
            return Err(ConfigError::out_of_range(
                "selection.rotation_grip_line_length",
                s.rotation_grip_line_length,
            ));
        }
        if !(0.0..45.0).contains(&s.snap_angle_threshold) {
            return Err(ConfigError::out_of_range(
                "selection.snap_angle_threshold",
                s.snap_angle_threshold,
            ));
        }

        if self.history.max_undo_step_count == 0 {
            return Err(ConfigError::out_of_range("history.max_undo_step_count", 0));
        }

        let v = &self.viewport;
        positive("viewport.zoom", v.zoom)?;
        positive("viewport.dpi_x", v.dpi_x)?;
        positive("viewport.dpi_y", v.dpi_y)?;
        positive("viewport.device_pixel_ratio", v.device_pixel_ratio)?;
        positive("viewport.workspace_width", v.workspace_width)?;
        positive("viewport.workspace_height", v.workspace_height)?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::out_of_range("logging.level", "\"\""));
        }
        Ok(())
    }

    /// Pushes the settings into `canvas`.
    pub fn apply_to(&self, canvas: &mut Canvas) {
        canvas.selection_mut().set_options(self.selection.to_options());

        let history = canvas.history_mut();
        history.set_enabled(self.history.enabled);
        history.set_max_undo_step_count(self.history.max_undo_step_count);

        let v = &self.viewport;
        let viewport = canvas.viewport_mut();
        viewport.set_zoom(v.zoom);
        viewport.set_dpi(v.dpi_x, v.dpi_y);
        viewport.set_device_pixel_ratio(v.device_pixel_ratio);
        canvas.set_workspace_size(v.workspace_width, v.workspace_height);

        canvas
            .redraw_scheduler_mut()
            .set_debounce(Duration::from_millis(self.redraw.debounce_ms));
        canvas.request_redraw();
    }
}

fn positive(key: &str, value: f64) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(key, value))
    }
}
