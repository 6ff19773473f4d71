//! Rendering boundary.
//!
//! The editing core never touches pixels. It issues geometry and style to a
//! [`DrawingSurface`] and asks an asynchronous [`RenderService`] for
//! server-rendered content (text, images), applying completions through
//! [`ContentState`].

mod content;
mod raster;
mod service;

pub use content::{ContentState, ContentUpdate};
pub use raster::TinySkiaSurface;
pub use service::{RenderRequest, RenderResponse, RenderService, ServiceError};

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{Path, PointF, RotatedRectangleF};
use crate::model::{Color, Stroke};

/// Errors raised while drawing.
///
/// Redraw catches and logs `Surface` and `ContentNotReady`; `Unexpected`
/// propagates to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Drawing surface error: {0}")]
    Surface(String),

    #[error("Content for '{0}' is not ready")]
    ContentNotReady(String),

    #[error("Unexpected render error: {0}")]
    Unexpected(String),
}

impl RenderError {
    /// Errors that the redraw loop logs and skips.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RenderError::Unexpected(_))
    }
}

/// Target of all drawing calls.
///
/// Coordinates are canvas units; the surface applies the scale set with
/// [`DrawingSurface::set_scale`] (`zoom × dpi/72`).
pub trait DrawingSurface {
    fn set_scale(&mut self, mul: f64);

    fn fill_rectangle(
        &mut self,
        rect: &RotatedRectangleF,
        color: Color,
        opacity: f64,
    ) -> Result<(), RenderError>;

    fn stroke_rectangle(
        &mut self,
        rect: &RotatedRectangleF,
        stroke: &Stroke,
        opacity: f64,
    ) -> Result<(), RenderError>;

    fn fill_path(&mut self, path: &Path, color: Color, opacity: f64) -> Result<(), RenderError>;

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke, opacity: f64)
        -> Result<(), RenderError>;

    fn draw_line(
        &mut self,
        from: PointF,
        to: PointF,
        stroke: &Stroke,
        opacity: f64,
    ) -> Result<(), RenderError>;

    fn draw_dashed_line(
        &mut self,
        from: PointF,
        to: PointF,
        stroke: &Stroke,
        dash: &[f64],
        opacity: f64,
    ) -> Result<(), RenderError>;

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        rect: &RotatedRectangleF,
        opacity: f64,
    ) -> Result<(), RenderError>;

    /// Restricts subsequent drawing to the interior of `path`.
    fn clip_to_path(&mut self, path: &Path) -> Result<(), RenderError>;

    fn reset_clip(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(RenderError::Surface("x".into()).is_recoverable());
        assert!(RenderError::ContentNotReady("v1".into()).is_recoverable());
        assert!(!RenderError::Unexpected("boom".into()).is_recoverable());
    }
}
