use serde::{Deserialize, Serialize};

use super::PointF;
use crate::math::are_equal;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectangleF {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RectangleF {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Smallest rectangle containing every point, or `None` for an empty set.
    pub fn from_points<I: IntoIterator<Item = PointF>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::from_ltrb(min_x, min_y, max_x, max_y))
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Flips negative extents so width and height are non-negative.
    pub fn normalized(&self) -> Self {
        Self::from_ltrb(
            self.left.min(self.right()),
            self.top.min(self.bottom()),
            self.left.max(self.right()),
            self.top.max(self.bottom()),
        )
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: PointF) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    pub fn contains_rect(&self, other: &RectangleF) -> bool {
        other.left >= self.left
            && other.right() <= self.right()
            && other.top >= self.top
            && other.bottom() <= self.bottom()
    }

    pub fn intersects_with(&self, other: &RectangleF) -> bool {
        other.left < self.right()
            && self.left < other.right()
            && other.top < self.bottom()
            && self.top < other.bottom()
    }

    /// Intersection of `a` and `b`; an empty rectangle when they do not overlap.
    pub fn intersect(a: &RectangleF, b: &RectangleF) -> RectangleF {
        let left = a.left.max(b.left);
        let top = a.top.max(b.top);
        let right = a.right().min(b.right());
        let bottom = a.bottom().min(b.bottom());
        if right >= left && bottom >= top {
            RectangleF::from_ltrb(left, top, right, bottom)
        } else {
            RectangleF::default()
        }
    }

    pub fn union(a: &RectangleF, b: &RectangleF) -> RectangleF {
        RectangleF::from_ltrb(
            a.left.min(b.left),
            a.top.min(b.top),
            a.right().max(b.right()),
            a.bottom().max(b.bottom()),
        )
    }

    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.left - dx,
            self.top - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    pub fn is_equal(&self, other: &RectangleF) -> bool {
        are_equal(self.left, other.left)
            && are_equal(self.top, other.top)
            && are_equal(self.width, other.width)
            && are_equal(self.height, other.height)
    }
}
