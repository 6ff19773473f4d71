use serde::{Deserialize, Serialize};

use super::{ObjectFrame, Stroke, VObjectBehavior};
use crate::geometry::PointF;
use crate::render::{DrawingSurface, RenderError};

/// Regular grid of lines filling the object rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridData {
    pub step_x: f64,
    pub step_y: f64,
    pub stroke: Stroke,
}

impl Default for GridData {
    fn default() -> Self {
        Self {
            step_x: 10.0,
            step_y: 10.0,
            stroke: Stroke::default(),
        }
    }
}

impl GridData {
    /// Grid lines in control-point space.
    fn lines(&self, frame: &ObjectFrame<'_>) -> Vec<(PointF, PointF)> {
        let base = frame.base;
        let mut lines = Vec::new();
        if self.step_x > 0.0 {
            let mut x = base.left;
            while x <= base.right() {
                lines.push((PointF::new(x, base.top), PointF::new(x, base.bottom())));
                x += self.step_x;
            }
        }
        if self.step_y > 0.0 {
            let mut y = base.top;
            while y <= base.bottom() {
                lines.push((PointF::new(base.left, y), PointF::new(base.right(), y)));
                y += self.step_y;
            }
        }
        lines
    }
}

impl VObjectBehavior for GridData {
    fn type_name(&self) -> &'static str {
        "Grid"
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        for (a, b) in self.lines(frame) {
            surface.draw_line(
                frame.matrix.transform_point(a),
                frame.matrix.transform_point(b),
                &self.stroke,
                frame.opacity,
            )?;
        }
        Ok(())
    }
}
