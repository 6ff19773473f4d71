//! Content v-objects whose pixels come from the render service.

use serde::{Deserialize, Serialize};

use super::{Color, ObjectFrame, Stroke, VObjectBehavior};
use crate::geometry::{PointF, RotatedRectangleF};
use crate::math::are_equal;
use crate::render::{DrawingSurface, RenderError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImageData {
    /// Opaque content identifier understood by the render service.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SvgData {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextData {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub color: Color,
    /// Bounded text flows inside its rectangle and around wrapping
    /// rectangles of other objects.
    pub bounded: bool,
    pub wrapping_rectangles: Vec<RotatedRectangleF>,
    /// Rectangle size the wrapping rectangles were computed for.
    pub wrapping_size: Option<(f64, f64)>,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Arial".to_string(),
            font_size: 12.0,
            color: Color::BLACK,
            bounded: false,
            wrapping_rectangles: Vec::new(),
            wrapping_size: None,
        }
    }
}

impl TextData {
    /// Stores a new set of wrapping rectangles for a text rectangle of the
    /// given size.
    ///
    /// Returns true when the list or the size differs from the stored one,
    /// meaning the text must be re-flowed by the render service.
    pub fn update_wrapping(&mut self, size: (f64, f64), rectangles: Vec<RotatedRectangleF>) -> bool {
        let size_unchanged = self
            .wrapping_size
            .is_some_and(|(w, h)| are_equal(w, size.0) && are_equal(h, size.1));
        let list_unchanged = self.wrapping_rectangles.len() == rectangles.len()
            && self
                .wrapping_rectangles
                .iter()
                .zip(&rectangles)
                .all(|(a, b)| a.is_equal(b));
        if size_unchanged && list_unchanged {
            return false;
        }
        self.wrapping_size = Some(size);
        self.wrapping_rectangles = rectangles;
        true
    }
}

/// Draws server-rendered pixels, or a wait indicator while loading.
fn draw_rendered(
    frame: &ObjectFrame<'_>,
    object_kind: &str,
    surface: &mut dyn DrawingSurface,
) -> Result<(), RenderError> {
    let content = frame.content;
    if let Some(image) = content.and_then(|c| c.image()) {
        return surface.draw_image(image, &frame.rectangle, frame.opacity);
    }
    if content.is_some_and(|c| c.is_loading()) {
        return draw_wait_indicator(frame, surface);
    }
    Err(RenderError::ContentNotReady(object_kind.to_string()))
}

fn draw_wait_indicator(
    frame: &ObjectFrame<'_>,
    surface: &mut dyn DrawingSurface,
) -> Result<(), RenderError> {
    let stroke = Stroke::new(Color::GRAY, 1.0);
    surface.stroke_rectangle(&frame.rectangle, &stroke, frame.opacity)?;
    let [tl, tr, br, bl] = frame.rectangle.corners();
    surface.draw_dashed_line(tl, br, &stroke, &[4.0, 4.0], frame.opacity)?;
    surface.draw_dashed_line(tr, bl, &stroke, &[4.0, 4.0], frame.opacity)
}

impl VObjectBehavior for ImageData {
    fn type_name(&self) -> &'static str {
        "Image"
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        draw_rendered(frame, self.type_name(), surface)
    }

    fn needs_render_service(&self) -> bool {
        true
    }
}

impl VObjectBehavior for SvgData {
    fn type_name(&self) -> &'static str {
        "Svg"
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        draw_rendered(frame, self.type_name(), surface)
    }

    fn needs_render_service(&self) -> bool {
        true
    }
}

impl VObjectBehavior for TextData {
    fn type_name(&self) -> &'static str {
        if self.bounded {
            "BoundedText"
        } else {
            "Text"
        }
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        draw_rendered(frame, self.type_name(), surface)
    }

    fn hit_test(&self, frame: &ObjectFrame<'_>, p: PointF, _tolerance: f64) -> bool {
        frame.rectangle.contains(p)
    }

    fn needs_render_service(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_wrapping_detects_changes_once() {
        let mut text = TextData {
            bounded: true,
            ..TextData::default()
        };
        let r = RotatedRectangleF::new(10.0, 10.0, 5.0, 5.0, 0.0);

        assert!(text.update_wrapping((100.0, 50.0), vec![r]));
        assert!(!text.update_wrapping((100.0, 50.0), vec![r]));

        let mut moved = r;
        moved.translate(1.0, 0.0);
        assert!(text.update_wrapping((100.0, 50.0), vec![moved]));
        assert!(text.update_wrapping((120.0, 50.0), vec![moved]));
        assert!(text.update_wrapping((120.0, 50.0), Vec::new()));
        assert!(!text.update_wrapping((120.0, 50.0), Vec::new()));
    }
}
