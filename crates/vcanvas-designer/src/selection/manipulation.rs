//! Geometry of interactive gestures.
//!
//! Every function maps a gesture's start rectangle and the pointer
//! displacement to the rectangle the selection should have now. They are
//! pure; the selection handler applies the result to live objects.

use crate::geometry::{PointF, RectangleF, RotatedRectangleF};
use crate::math::{are_equal, is_right_angle_multiple, normalize_angle, snap_to_right_angle};

use super::hit_test::{grip_direction, is_corner_grip};

/// Smallest extent a dimension is clamped to when flipping is disallowed.
pub const MIN_DIMENSION: f64 = 1.0;

/// Clamps a displacement so that `bounds` moved by it stays inside
/// `region`. Each edge is clamped independently.
pub fn clamp_delta(bounds: &RectangleF, delta: PointF, region: Option<&RectangleF>) -> PointF {
    let Some(region) = region else {
        return delta;
    };
    PointF::new(
        clamp_axis(delta.x, bounds.left, bounds.right(), region.left, region.right()),
        clamp_axis(delta.y, bounds.top, bounds.bottom(), region.top, region.bottom()),
    )
}

fn clamp_axis(d: f64, start: f64, end: f64, region_start: f64, region_end: f64) -> f64 {
    let min = region_start - start;
    let max = region_end - end;
    if min > max {
        // Wider than the region: pin the leading edge.
        return min;
    }
    d.clamp(min, max)
}

/// Translates `start` by the pointer delta with per-axis permission and the
/// region clamp applied.
pub fn drag_rectangle(
    start: &RotatedRectangleF,
    delta: PointF,
    allow_x: bool,
    allow_y: bool,
    region: Option<&RectangleF>,
) -> RotatedRectangleF {
    let masked = PointF::new(
        if allow_x { delta.x } else { 0.0 },
        if allow_y { delta.y } else { 0.0 },
    );
    let d = clamp_delta(&start.get_bounds(), masked, region);
    let mut rect = *start;
    rect.translate(d.x, d.y);
    rect
}

/// Resizes `start` by dragging grip `index` from `start_point` to `point`.
///
/// Corner grips scale both dimensions by the larger relative change; edge
/// grips change only the perpendicular dimension. The opposite corner or
/// edge stays anchored. With `allow_negative` unset each dimension is
/// clamped to [`MIN_DIMENSION`] and the center does not move along that
/// axis.
pub fn resize_rectangle(
    start: &RotatedRectangleF,
    index: u8,
    start_point: PointF,
    point: PointF,
    allow_negative: bool,
) -> RotatedRectangleF {
    let Some((ax, ay)) = grip_direction(index) else {
        return *start;
    };
    let local = (point - start_point).rotate(-start.angle);

    let (dw, dh) = if is_corner_grip(index) {
        let kx = if are_equal(start.width, 0.0) { 0.0 } else { ax * local.x / start.width };
        let ky = if are_equal(start.height, 0.0) { 0.0 } else { ay * local.y / start.height };
        let k = kx.max(ky);
        (start.width * k, start.height * k)
    } else {
        (ax * local.x, ay * local.y)
    };

    let mut width = start.width + dw;
    let mut height = start.height + dh;
    let mut shift = PointF::new(ax * dw / 2.0, ay * dh / 2.0);

    if !allow_negative {
        if width < MIN_DIMENSION && ax != 0.0 {
            width = MIN_DIMENSION;
            shift.x = 0.0;
        }
        if height < MIN_DIMENSION && ay != 0.0 {
            height = MIN_DIMENSION;
            shift.y = 0.0;
        }
    }

    let center = start.center() + shift.rotate(start.angle);
    RotatedRectangleF::new(center.x, center.y, width, height, start.angle)
}

/// Rotates `start` about its center by the angle swept from `start_point`
/// to `point`. With `snap` the result snaps to a multiple of 90 degrees
/// within `snap_threshold` degrees.
pub fn rotate_rectangle(
    start: &RotatedRectangleF,
    start_point: PointF,
    point: PointF,
    snap: bool,
    snap_threshold: f64,
) -> RotatedRectangleF {
    let center = start.center();
    let from = start_point - center;
    let to = point - center;
    if are_equal(from.length(), 0.0) || are_equal(to.length(), 0.0) {
        return *start;
    }
    let mut angle = start.angle + from.angle_to(&to);
    if snap {
        angle = snap_to_right_angle(angle, snap_threshold);
    }
    RotatedRectangleF {
        angle,
        ..*start
    }
}

/// Where a member rectangle `object_start` ends up when the group rectangle
/// moves from `group_start` to `group_now`.
///
/// The member keeps its position relative to the group frame. Members
/// rotated a quarter turn relative to the group take the scale factors
/// swapped.
pub fn map_member_rectangle(
    object_start: &RotatedRectangleF,
    group_start: &RotatedRectangleF,
    group_now: &RotatedRectangleF,
) -> RotatedRectangleF {
    let ratio = |now: f64, start: f64| if are_equal(start, 0.0) { 1.0 } else { now / start };
    let sx = ratio(group_now.width, group_start.width);
    let sy = ratio(group_now.height, group_start.height);

    let local = group_start.to_local(object_start.center());
    let center = group_now.to_world(local.scale(sx, sy));

    let relative = normalize_angle(object_start.angle - group_start.angle);
    let quarter_turn = is_right_angle_multiple(relative)
        && (are_equal(relative, 90.0) || are_equal(relative, 270.0));
    let (ox, oy) = if quarter_turn { (sy, sx) } else { (sx, sy) };

    RotatedRectangleF::new(
        center.x,
        center.y,
        object_start.width * ox,
        object_start.height * oy,
        object_start.angle + (group_now.angle - group_start.angle),
    )
}
