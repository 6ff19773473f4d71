use serde::{Deserialize, Serialize};

use super::{Color, ObjectFrame, Stroke, VObjectBehavior};
use crate::geometry::{Path, PointF, RectangleF};
use crate::render::{DrawingSurface, RenderError};

/// Outline of a shape in its untransformed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    /// Arbitrary outline given in control-point space.
    Custom { path: Path },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeData {
    pub shape: ShapeKind,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

impl Default for ShapeData {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            fill: Some(Color::WHITE),
            stroke: Some(Stroke::default()),
        }
    }
}

impl ShapeData {
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Outline in control-point space for the given base rectangle.
    pub fn local_outline(&self, base: &RectangleF) -> Path {
        match &self.shape {
            ShapeKind::Rectangle => Path::rectangle(base),
            ShapeKind::Ellipse => Path::ellipse(base),
            ShapeKind::Custom { path } => path.clone(),
        }
    }

    /// Outline in canvas space.
    pub fn outline(&self, frame: &ObjectFrame<'_>) -> Path {
        self.local_outline(&frame.base).transform(&frame.matrix)
    }
}

impl VObjectBehavior for ShapeData {
    fn type_name(&self) -> &'static str {
        match self.shape {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Custom { .. } => "Shape",
        }
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        let outline = self.outline(frame);
        if let Some(fill) = self.fill {
            surface.fill_path(&outline, fill, frame.opacity)?;
        }
        if let Some(stroke) = &self.stroke {
            surface.stroke_path(&outline, stroke, frame.opacity)?;
        }
        Ok(())
    }

    fn hit_test(&self, frame: &ObjectFrame<'_>, p: PointF, tolerance: f64) -> bool {
        match self.shape {
            ShapeKind::Rectangle => frame.rectangle.contains(p),
            _ => self.outline(frame).contains(p, tolerance),
        }
    }
}
