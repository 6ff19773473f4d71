//! Property laws of the geometry kernel.

use proptest::prelude::*;
use vcanvas_designer::{Path, PathSegment, PointF, RectangleF, RotatedRectangleF, EPSILON};

fn point() -> impl Strategy<Value = PointF> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| PointF::new(x, y))
}

fn segment() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        point().prop_map(PathSegment::MoveTo),
        point().prop_map(PathSegment::LineTo),
        (point(), point()).prop_map(|(control, to)| PathSegment::QuadraticTo { control, to }),
        (point(), point(), point()).prop_map(|(control1, control2, to)| PathSegment::CubicTo {
            control1,
            control2,
            to
        }),
        Just(PathSegment::Close),
    ]
}

fn rotated_rectangle() -> impl Strategy<Value = RotatedRectangleF> {
    (
        -500.0f64..500.0,
        -500.0f64..500.0,
        1.0f64..400.0,
        1.0f64..400.0,
        -360.0f64..360.0,
    )
        .prop_map(|(cx, cy, w, h, a)| RotatedRectangleF::new(cx, cy, w, h, a))
}

proptest! {
    #[test]
    fn path_string_round_trip(segments in prop::collection::vec(segment(), 0..12)) {
        let path = Path::from_segments(segments);
        let text = path.to_string();
        let parsed: Path = text.parse().expect("path string must parse");
        prop_assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn rotated_rectangle_equal_to_its_clone(rect in rotated_rectangle()) {
        let copy = rect;
        prop_assert!(rect.is_equal(&copy));
    }

    #[test]
    fn perturbation_below_epsilon_keeps_equality(
        rect in rotated_rectangle(),
        field in 0usize..4,
        delta in -0.5f64..0.5,
    ) {
        let offset = delta * EPSILON;
        let mut near = rect;
        match field {
            0 => near.center_x += offset,
            1 => near.center_y += offset,
            2 => near.width += offset,
            _ => near.height += offset,
        }
        prop_assert!(rect.is_equal(&near));

        let mut far = rect;
        let jump = 3.0 * EPSILON;
        match field {
            0 => far.center_x += jump,
            1 => far.center_y += jump,
            2 => far.width += jump,
            _ => far.height += jump,
        }
        prop_assert!(!rect.is_equal(&far));
    }

    #[test]
    fn transform_delta_maps_source_onto_target(a in rotated_rectangle(), b in rotated_rectangle()) {
        let delta = b.get_transform(&a);
        let mut moved = a;
        moved.set_transform(&delta);
        prop_assert!(moved.is_equal(&b), "{:?} != {:?}", moved, b);
    }

    #[test]
    fn bounds_contain_every_corner(rect in rotated_rectangle()) {
        let bounds = rect.get_bounds().inflate(EPSILON, EPSILON);
        for corner in rect.corners() {
            prop_assert!(bounds.contains(corner));
        }
    }
}

#[test]
fn intersection_of_overlapping_rotated_rectangles() {
    let a = RotatedRectangleF::new(0.0, 0.0, 10.0, 10.0, 0.0);
    let b = RotatedRectangleF::new(8.0, 0.0, 10.0, 10.0, 45.0);
    assert!(a.intersects_with(&b));
    assert!(b.intersects_with(&a));
}

#[test]
fn intersection_of_separate_rectangles() {
    let a = RotatedRectangleF::new(0.0, 0.0, 10.0, 10.0, 30.0);
    let b = RotatedRectangleF::new(40.0, 40.0, 10.0, 10.0, 30.0);
    assert!(!a.intersects_with(&b));
}

#[test]
fn axis_aligned_bounds_of_rotated_square() {
    let rect = RotatedRectangleF::new(0.0, 0.0, 10.0, 10.0, 45.0);
    let half_diagonal = 50.0f64.sqrt();
    let expected = RectangleF::from_ltrb(-half_diagonal, -half_diagonal, half_diagonal, half_diagonal);
    assert!(rect.get_bounds().is_equal(&expected));
}
