use serde::{Deserialize, Serialize};

use super::{PointF, RectangleF};
use crate::math::{angles_equal, are_equal};
use crate::transform::Transform;

/// Rectangle rotated about its center; the on-canvas geometry of every
/// rectangular v-object.
///
/// `width` and `height` may be negative while an interactive resize flips
/// the rectangle. Geometric queries use their absolute values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotatedRectangleF {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    pub angle: f64,
}

impl RotatedRectangleF {
    pub fn new(center_x: f64, center_y: f64, width: f64, height: f64, angle: f64) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
            angle,
        }
    }

    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::from_rectangle(&RectangleF::from_ltrb(left, top, right, bottom))
    }

    /// Zero-angle rotated rectangle covering `rect`.
    pub fn from_rectangle(rect: &RectangleF) -> Self {
        let c = rect.center();
        Self::new(c.x, c.y, rect.width, rect.height, 0.0)
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.center_x, self.center_y)
    }

    pub fn set_center(&mut self, center: PointF) {
        self.center_x = center.x;
        self.center_y = center.y;
    }

    /// Corner offsets from the center before rotation: top-left, top-right,
    /// bottom-right, bottom-left.
    fn corner_offsets(&self) -> [PointF; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [
            PointF::new(-hw, -hh),
            PointF::new(hw, -hh),
            PointF::new(hw, hh),
            PointF::new(-hw, hh),
        ]
    }

    /// World-space corners: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [PointF; 4] {
        let c = self.center();
        self.corner_offsets().map(|p| p.rotate(self.angle) + c)
    }

    /// Axis-aligned bounding box of the rotated rectangle.
    pub fn get_bounds(&self) -> RectangleF {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in self.corner_offsets() {
            let r = p.rotate(self.angle);
            min_x = min_x.min(r.x);
            min_y = min_y.min(r.y);
            max_x = max_x.max(r.x);
            max_y = max_y.max(r.y);
        }
        RectangleF::from_ltrb(
            min_x + self.center_x,
            min_y + self.center_y,
            max_x + self.center_x,
            max_y + self.center_y,
        )
    }

    /// Unrotated rectangle with the same center and absolute size.
    pub fn to_rectangle_f(&self) -> RectangleF {
        let w = self.width.abs();
        let h = self.height.abs();
        RectangleF::new(self.center_x - w / 2.0, self.center_y - h / 2.0, w, h)
    }

    /// Maps a world point into the rectangle's unrotated frame, relative to
    /// its center.
    pub fn to_local(&self, p: PointF) -> PointF {
        (p - self.center()).rotate(-self.angle)
    }

    /// Maps a point from the rectangle's local frame back to world space.
    pub fn to_world(&self, local: PointF) -> PointF {
        local.rotate(self.angle) + self.center()
    }

    pub fn contains(&self, p: PointF) -> bool {
        let local = self.to_local(p);
        local.x.abs() <= self.width.abs() / 2.0 && local.y.abs() <= self.height.abs() / 2.0
    }

    /// Oriented overlap test.
    ///
    /// Both rectangles are projected onto the axes of `self` and, when the
    /// angles differ, onto the axes of `other`; the rectangles intersect when
    /// both projections overlap. This is not a complete separating-axis test
    /// and can report overlap for some rotated pairs that only come close.
    pub fn intersects_with(&self, other: &RotatedRectangleF) -> bool {
        if !Self::projection_overlaps(self, other) {
            return false;
        }
        if angles_equal(self.angle, other.angle) {
            return true;
        }
        Self::projection_overlaps(other, self)
    }

    fn projection_overlaps(frame: &RotatedRectangleF, other: &RotatedRectangleF) -> bool {
        let center = frame.center();
        let project = |rect: &RotatedRectangleF| {
            RectangleF::from_points(
                rect.corners()
                    .into_iter()
                    .map(|p| p.rotate_at(-frame.angle, center)),
            )
            .unwrap_or_default()
        };
        project(frame).intersects_with(&project(other))
    }

    /// Applies `t` as a delta: scales the size, offsets the center and adds
    /// the angle.
    pub fn set_transform(&mut self, t: &Transform) {
        self.width *= t.scale_x();
        self.height *= t.scale_y();
        self.center_x += t.translate_x();
        self.center_y += t.translate_y();
        self.angle += t.angle();
    }

    /// The delta transform that maps `source` onto `self`.
    pub fn get_transform(&self, source: &RotatedRectangleF) -> Transform {
        let ratio = |target: f64, base: f64| if base == 0.0 { 0.0 } else { target / base };
        Transform::new(
            ratio(self.width, source.width),
            ratio(self.height, source.height),
            self.center_x - source.center_x,
            self.center_y - source.center_y,
            self.angle - source.angle,
        )
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.center_x += dx;
        self.center_y += dy;
    }

    pub fn is_equal(&self, other: &RotatedRectangleF) -> bool {
        are_equal(self.center_x, other.center_x)
            && are_equal(self.center_y, other.center_y)
            && are_equal(self.width, other.width)
            && are_equal(self.height, other.height)
            && angles_equal(self.angle, other.angle)
    }
}
