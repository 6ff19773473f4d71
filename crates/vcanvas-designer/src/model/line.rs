use serde::{Deserialize, Serialize};

use super::{ObjectFrame, Stroke, VObjectBehavior};
use crate::geometry::PointF;
use crate::render::{DrawingSurface, RenderError};

/// Straight line between the first two control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LineData {
    pub stroke: Stroke,
    /// Dash pattern in canvas units; `None` draws a solid line.
    pub dash: Option<Vec<f64>>,
}

impl LineData {
    pub fn dashed(dash: Vec<f64>) -> Self {
        Self {
            dash: Some(dash),
            ..Self::default()
        }
    }
}

impl VObjectBehavior for LineData {
    fn type_name(&self) -> &'static str {
        if self.dash.is_some() {
            "DashedLine"
        } else {
            "Line"
        }
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        let points = frame.world_points();
        let [from, to] = match points.as_slice() {
            [a, b, ..] => [*a, *b],
            _ => return Ok(()),
        };
        match &self.dash {
            Some(dash) => surface.draw_dashed_line(from, to, &self.stroke, dash, frame.opacity),
            None => surface.draw_line(from, to, &self.stroke, frame.opacity),
        }
    }

    fn hit_test(&self, frame: &ObjectFrame<'_>, p: PointF, tolerance: f64) -> bool {
        let points = frame.world_points();
        let reach = tolerance.max(self.stroke.width / 2.0);
        match points.as_slice() {
            [a, b, ..] => distance_to_segment(p, *a, *b) <= reach,
            _ => false,
        }
    }
}

/// Open or closed chain of line segments through every control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PolylineData {
    pub stroke: Stroke,
    pub closed: bool,
}

impl PolylineData {
    fn segments(&self, points: &[PointF]) -> Vec<(PointF, PointF)> {
        let mut segments: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && points.len() > 2 {
            segments.push((points[points.len() - 1], points[0]));
        }
        segments
    }
}

impl VObjectBehavior for PolylineData {
    fn type_name(&self) -> &'static str {
        "Polyline"
    }

    fn draw(
        &self,
        frame: &ObjectFrame<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> Result<(), RenderError> {
        for (from, to) in self.segments(&frame.world_points()) {
            surface.draw_line(from, to, &self.stroke, frame.opacity)?;
        }
        Ok(())
    }

    fn hit_test(&self, frame: &ObjectFrame<'_>, p: PointF, tolerance: f64) -> bool {
        let reach = tolerance.max(self.stroke.width / 2.0);
        self.segments(&frame.world_points())
            .into_iter()
            .any(|(a, b)| distance_to_segment(p, a, b) <= reach)
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub(crate) fn distance_to_segment(p: PointF, a: PointF, b: PointF) -> f64 {
    let ab = b - a;
    let l2 = ab.x * ab.x + ab.y * ab.y;
    if l2 == 0.0 {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / l2).clamp(0.0, 1.0);
    p.distance(&(a + ab * t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment() {
        let a = PointF::new(0.0, 0.0);
        let b = PointF::new(10.0, 0.0);
        assert!((distance_to_segment(PointF::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((distance_to_segment(PointF::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
        assert!((distance_to_segment(PointF::new(1.0, 1.0), a, a) - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_closed_polyline_adds_closing_segment() {
        let pts = [
            PointF::new(0.0, 0.0),
            PointF::new(1.0, 0.0),
            PointF::new(1.0, 1.0),
        ];
        let open = PolylineData::default();
        let closed = PolylineData {
            closed: true,
            ..PolylineData::default()
        };
        assert_eq!(open.segments(&pts).len(), 2);
        assert_eq!(closed.segments(&pts).len(), 3);
    }
}
