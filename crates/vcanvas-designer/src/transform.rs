//! Scale/rotate/translate decomposition attached to a v-object.
//!
//! A `Transform` records whether it was mutated since its owner last
//! looked (`take_changed`). Owners consume that flag to schedule redraws and
//! bounds bookkeeping instead of receiving a callback.

use serde::{Deserialize, Serialize};

use crate::geometry::{Matrix, PointF};
use crate::math::{angles_equal, are_equal};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    scale_x: f64,
    scale_y: f64,
    translate_x: f64,
    translate_y: f64,
    /// Rotation in degrees.
    angle: f64,
    #[serde(skip)]
    changed: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.scale_x == other.scale_x
            && self.scale_y == other.scale_y
            && self.translate_x == other.translate_x
            && self.translate_y == other.translate_y
            && self.angle == other.angle
    }
}

impl Transform {
    pub fn new(scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64, angle: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            translate_x,
            translate_y,
            angle,
            changed: false,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.0, 0.0)
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_scale_x(&mut self, value: f64) {
        if self.scale_x != value {
            self.scale_x = value;
            self.changed = true;
        }
    }

    pub fn set_scale_y(&mut self, value: f64) {
        if self.scale_y != value {
            self.scale_y = value;
            self.changed = true;
        }
    }

    pub fn set_translate_x(&mut self, value: f64) {
        if self.translate_x != value {
            self.translate_x = value;
            self.changed = true;
        }
    }

    pub fn set_translate_y(&mut self, value: f64) {
        if self.translate_y != value {
            self.translate_y = value;
            self.changed = true;
        }
    }

    pub fn set_angle(&mut self, value: f64) {
        if self.angle != value {
            self.angle = value;
            self.changed = true;
        }
    }

    /// Replaces every component at once, flagging a change if any differs.
    pub fn update(&mut self, scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64, angle: f64) {
        self.set_scale_x(scale_x);
        self.set_scale_y(scale_y);
        self.set_translate_x(translate_x);
        self.set_translate_y(translate_y);
        self.set_angle(angle);
    }

    /// Copies the values of `other` into `self`.
    pub fn copy_from(&mut self, other: &Transform) {
        self.update(
            other.scale_x,
            other.scale_y,
            other.translate_x,
            other.translate_y,
            other.angle,
        );
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.set_translate_x(self.translate_x + dx);
        self.set_translate_y(self.translate_y + dy);
    }

    /// Returns and clears the change flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn is_identity(&self) -> bool {
        self.is_equal(&Transform::identity())
    }

    pub fn is_equal(&self, other: &Transform) -> bool {
        are_equal(self.scale_x, other.scale_x)
            && are_equal(self.scale_y, other.scale_y)
            && are_equal(self.translate_x, other.translate_x)
            && are_equal(self.translate_y, other.translate_y)
            && angles_equal(self.angle, other.angle)
    }

    /// Matrix that scales and rotates about `center`, then translates.
    pub fn to_matrix(&self, center: PointF) -> Matrix {
        Matrix::translation(-center.x, -center.y)
            .then(&Matrix::scaling(self.scale_x, self.scale_y))
            .then(&Matrix::rotation(self.angle))
            .then(&Matrix::translation(
                center.x + self.translate_x,
                center.y + self.translate_y,
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_flag_changes() {
        let mut t = Transform::identity();
        assert!(!t.is_changed());

        t.set_angle(0.0);
        assert!(!t.take_changed());

        t.set_angle(15.0);
        assert!(t.take_changed());
        assert!(!t.is_changed());

        t.translate(1.0, 2.0);
        assert!(t.take_changed());
        assert_eq!((t.translate_x(), t.translate_y()), (1.0, 2.0));
    }

    #[test]
    fn test_to_matrix_keeps_center_fixed_without_translation() {
        let t = Transform::new(2.0, 3.0, 0.0, 0.0, 45.0);
        let c = PointF::new(10.0, 10.0);
        assert!(t.to_matrix(c).transform_point(c).is_equal(&c));
    }

    #[test]
    fn test_to_matrix_scales_then_rotates() {
        let t = Transform::new(2.0, 1.0, 5.0, 0.0, 90.0);
        let m = t.to_matrix(PointF::ORIGIN);
        let p = m.transform_point(PointF::new(1.0, 0.0));
        assert!(p.is_equal(&PointF::new(5.0, 2.0)));
    }

    #[test]
    fn test_is_equal_normalizes_angle() {
        let a = Transform::new(1.0, 1.0, 0.0, 0.0, 360.0);
        assert!(a.is_equal(&Transform::identity()));
        assert!(a.is_identity());
    }
}
