use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::math::{are_equal, are_equal_eps, to_radians};

/// 2D coordinate in canvas space.
///
/// Methods return new values, so a `PointF` behaves as a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const ORIGIN: PointF = PointF { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    /// Rotates about the origin by `angle_deg` degrees.
    pub fn rotate(self, angle_deg: f64) -> Self {
        let rad = to_radians(angle_deg);
        let (s, c) = rad.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Rotates about `center` by `angle_deg` degrees.
    pub fn rotate_at(self, angle_deg: f64, center: PointF) -> Self {
        (self - center).rotate(angle_deg) + center
    }

    pub fn distance(&self, other: &PointF) -> f64 {
        (*self - *other).length()
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Signed angle in degrees from `self` to `other`, both taken as vectors.
    pub fn angle_to(&self, other: &PointF) -> f64 {
        let cross = self.x * other.y - self.y * other.x;
        let dot = self.x * other.x + self.y * other.y;
        cross.atan2(dot).to_degrees()
    }

    pub fn is_equal(&self, other: &PointF) -> bool {
        are_equal(self.x, other.x) && are_equal(self.y, other.y)
    }

    pub fn is_equal_eps(&self, other: &PointF, eps: f64) -> bool {
        are_equal_eps(self.x, other.x, eps) && are_equal_eps(self.y, other.y, eps)
    }
}

impl Add for PointF {
    type Output = PointF;

    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = PointF;

    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PointF {
    type Output = PointF;

    fn mul(self, rhs: f64) -> PointF {
        PointF::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for PointF {
    type Output = PointF;

    fn neg(self) -> PointF {
        PointF::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for PointF {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
