use serde::{Deserialize, Serialize};

use super::{ObjectFrame, ShapeData, VObjectBehavior};
use crate::geometry::PointF;
use crate::render::{DrawingSurface, RenderError};

/// A shape that hosts swappable nested content.
///
/// The nested object itself lives on the owning [`super::VObject`]; this
/// holds the frame style and edit-mode flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlaceholderData {
    pub frame: ShapeData,
    /// While editing, manipulation targets the nested content.
    pub editing: bool,
    /// Content is a stand-in that cannot be edited.
    pub stub_content: bool,
}

impl VObjectBehavior for PlaceholderData {
    fn type_name(&self) -> &'static str {
        "Placeholder"
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        self.frame.draw(frame, surface)
    }

    fn hit_test(&self, frame: &ObjectFrame<'_>, p: PointF, tolerance: f64) -> bool {
        self.frame.hit_test(frame, p, tolerance)
    }
}
