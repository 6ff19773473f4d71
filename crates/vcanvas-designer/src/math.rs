//! Shared floating point helpers.
//!
//! Every geometric equality in the crate goes through [`are_equal`]; exact
//! float comparison is never used for geometry.

/// Default tolerance for geometric comparisons.
pub const EPSILON: f64 = 1e-4;

/// Returns true when `a` and `b` differ by less than [`EPSILON`].
pub fn are_equal(a: f64, b: f64) -> bool {
    are_equal_eps(a, b, EPSILON)
}

/// Returns true when `a` and `b` differ by less than `eps`.
pub fn are_equal_eps(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// Converts degrees to radians as `π·angle/180`.
pub fn to_radians(angle_deg: f64) -> f64 {
    std::f64::consts::PI * angle_deg / 180.0
}

/// Converts radians to degrees.
pub fn to_degrees(angle_rad: f64) -> f64 {
    angle_rad * 180.0 / std::f64::consts::PI
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let a = angle_deg % 360.0;
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Compares two angles in degrees modulo a full turn.
pub fn angles_equal(a_deg: f64, b_deg: f64) -> bool {
    let diff = normalize_angle(a_deg - b_deg);
    diff < EPSILON || 360.0 - diff < EPSILON
}

/// Returns true when `angle_deg` is a multiple of 90 degrees.
pub fn is_right_angle_multiple(angle_deg: f64) -> bool {
    let rem = normalize_angle(angle_deg) % 90.0;
    are_equal(rem, 0.0) || are_equal(rem, 90.0)
}

/// Snaps `angle_deg` to the nearest multiple of 90 when it lies within
/// `threshold` degrees of it.
pub fn snap_to_right_angle(angle_deg: f64, threshold: f64) -> f64 {
    let nearest = (angle_deg / 90.0).round() * 90.0;
    if (angle_deg - nearest).abs() <= threshold {
        nearest
    } else {
        angle_deg
    }
}
