//! # VCanvas
//!
//! Interactive editing core for 2D vector objects: rotated-rectangle
//! geometry, selection grips, layers and command-based undo/redo.
//!
//! ## Architecture
//!
//! VCanvas is organized as a workspace with multiple crates:
//!
//! 1. **vcanvas-core** - Error kinds, typed event bus, shared-pointer aliases
//! 2. **vcanvas-designer** - Geometry, object model, selection, history, rendering boundary
//! 3. **vcanvas-settings** - Editor configuration (JSON/TOML)
//! 4. **vcanvas** - This facade plus a headless binary that replays scripted sessions

pub mod session;

pub use vcanvas_core::{CanvasError, EventBus, EventFilter};
pub use vcanvas_designer as designer;
pub use vcanvas_settings as settings;

pub use vcanvas_designer::{
    Canvas, CanvasEvent, CanvasState, Command, DocumentFile, History, Key, Layer, Modifiers,
    PointF, RectangleF, RotatedRectangleF, SelectionHandler, TinySkiaSurface, Transform, VObject,
    VObjectKind, Viewport,
};
pub use vcanvas_settings::{Config, LoggingSettings};

pub use session::{Session, SessionReport, SessionStep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, falling back to `settings.level`
/// - Pretty console output, or JSON lines when `settings.json` is set
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", settings.level, e))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_installs_once() {
        let settings = LoggingSettings::default();
        init_logging(&settings).unwrap();
        assert!(init_logging(&settings).is_err());
    }
}
