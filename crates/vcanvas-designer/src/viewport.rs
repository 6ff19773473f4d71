//! Viewport scaling and coordinate conversion.
//!
//! Canvas coordinates are document units at 72 dpi. Control coordinates are
//! device pixels of the hosting surface. The two are related by
//! `control = canvas * mul + scroll`, with
//! `mul = zoom * max(dpi_x, dpi_y) / 72 / device_pixel_ratio`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{PointF, RectangleF};

pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 50.0;
const ZOOM_STEP: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    zoom: f64,
    dpi_x: f64,
    dpi_y: f64,
    device_pixel_ratio: f64,
    scroll_x: f64,
    scroll_y: f64,
    workspace_width: f64,
    workspace_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(workspace_width: f64, workspace_height: f64) -> Self {
        Self {
            zoom: 1.0,
            dpi_x: 72.0,
            dpi_y: 72.0,
            device_pixel_ratio: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            workspace_width,
            workspace_height,
        }
    }

    /// Canvas-to-control scale factor.
    pub fn mul(&self) -> f64 {
        self.zoom * self.dpi_x.max(self.dpi_y) / 72.0 / self.device_pixel_ratio
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Zooms while keeping the canvas point `anchor` at the same control
    /// position.
    pub fn zoom_at(&mut self, anchor: PointF, zoom: f64) {
        let fixed = self.canvas_to_control(anchor);
        self.set_zoom(zoom);
        let mul = self.mul();
        self.scroll_x = fixed.x - anchor.x * mul;
        self.scroll_y = fixed.y - anchor.y * mul;
    }

    pub fn dpi(&self) -> (f64, f64) {
        (self.dpi_x, self.dpi_y)
    }

    pub fn set_dpi(&mut self, dpi_x: f64, dpi_y: f64) {
        if dpi_x > 0.0 && dpi_y > 0.0 {
            self.dpi_x = dpi_x;
            self.dpi_y = dpi_y;
        }
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        if ratio > 0.0 {
            self.device_pixel_ratio = ratio;
        }
    }

    pub fn scroll(&self) -> PointF {
        PointF::new(self.scroll_x, self.scroll_y)
    }

    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll_x += dx;
        self.scroll_y += dy;
    }

    pub fn workspace(&self) -> RectangleF {
        RectangleF::new(0.0, 0.0, self.workspace_width, self.workspace_height)
    }

    pub fn set_workspace_size(&mut self, width: f64, height: f64) {
        self.workspace_width = width;
        self.workspace_height = height;
    }

    /// Size of the workspace in control pixels.
    pub fn control_size(&self) -> (f64, f64) {
        let mul = self.mul();
        (self.workspace_width * mul, self.workspace_height * mul)
    }

    pub fn canvas_to_control(&self, p: PointF) -> PointF {
        let mul = self.mul();
        PointF::new(p.x * mul + self.scroll_x, p.y * mul + self.scroll_y)
    }

    pub fn control_to_canvas(&self, p: PointF) -> PointF {
        let mul = self.mul();
        PointF::new((p.x - self.scroll_x) / mul, (p.y - self.scroll_y) / mul)
    }

    /// Converts a length in control pixels to canvas units.
    pub fn control_length_to_canvas(&self, length: f64) -> f64 {
        length / self.mul()
    }

    /// Zooms so that the whole workspace fits a control area of the given
    /// size, leaving `padding` pixels around it.
    pub fn fit_workspace(&mut self, control_width: f64, control_height: f64, padding: f64) {
        if self.workspace_width <= 0.0 || self.workspace_height <= 0.0 {
            return;
        }
        let base = self.dpi_x.max(self.dpi_y) / 72.0 / self.device_pixel_ratio;
        let zoom_x = (control_width - 2.0 * padding) / (self.workspace_width * base);
        let zoom_y = (control_height - 2.0 * padding) / (self.workspace_height * base);
        self.set_zoom(zoom_x.min(zoom_y));
        let (w, h) = self.control_size();
        self.scroll_x = (control_width - w) / 2.0;
        self.scroll_y = (control_height - h) / 2.0;
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | DPI: {:.0}x{:.0} | Ratio: {:.2}",
            self.zoom, self.dpi_x, self.dpi_y, self.device_pixel_ratio
        )
    }
}
