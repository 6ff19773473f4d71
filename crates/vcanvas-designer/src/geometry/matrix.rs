use serde::{Deserialize, Serialize};

use super::PointF;
use crate::math::{are_equal, to_radians};

/// 2D affine transform.
///
/// Maps `(x, y)` to `(m00·x + m01·y + m02, m10·x + m11·y + m12)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m11: f64,
    pub m02: f64,
    pub m12: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn new(m00: f64, m10: f64, m01: f64, m11: f64, m02: f64, m12: f64) -> Self {
        Self {
            m00,
            m10,
            m01,
            m11,
            m02,
            m12,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle_deg` degrees about the origin.
    pub fn rotation(angle_deg: f64) -> Self {
        let (s, c) = to_radians(angle_deg).sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Returns `self × other`: `other` is applied first, then `self`.
    pub fn concatenate(&self, other: &Matrix) -> Matrix {
        Matrix::new(
            self.m00 * other.m00 + self.m01 * other.m10,
            self.m10 * other.m00 + self.m11 * other.m10,
            self.m00 * other.m01 + self.m01 * other.m11,
            self.m10 * other.m01 + self.m11 * other.m11,
            self.m00 * other.m02 + self.m01 * other.m12 + self.m02,
            self.m10 * other.m02 + self.m11 * other.m12 + self.m12,
        )
    }

    /// Returns a matrix applying `self` first, then `next`.
    pub fn then(&self, next: &Matrix) -> Matrix {
        next.concatenate(self)
    }

    pub fn determinant(&self) -> f64 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let m00 = self.m11 / det;
        let m10 = -self.m10 / det;
        let m01 = -self.m01 / det;
        let m11 = self.m00 / det;
        let m02 = -(m00 * self.m02 + m01 * self.m12);
        let m12 = -(m10 * self.m02 + m11 * self.m12);
        Some(Matrix::new(m00, m10, m01, m11, m02, m12))
    }

    pub fn transform_point(&self, p: PointF) -> PointF {
        PointF::new(
            self.m00 * p.x + self.m01 * p.y + self.m02,
            self.m10 * p.x + self.m11 * p.y + self.m12,
        )
    }

    pub fn is_identity(&self) -> bool {
        self.is_equal(&Matrix::identity())
    }

    pub fn is_equal(&self, other: &Matrix) -> bool {
        are_equal(self.m00, other.m00)
            && are_equal(self.m10, other.m10)
            && are_equal(self.m01, other.m01)
            && are_equal(self.m11, other.m11)
            && are_equal(self.m02, other.m02)
            && are_equal(self.m12, other.m12)
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.m00 as f32,
            self.m10 as f32,
            self.m01 as f32,
            self.m11 as f32,
            self.m02 as f32,
            self.m12 as f32,
        )
    }
}
