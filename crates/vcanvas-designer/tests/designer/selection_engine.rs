//! Selection grips and gestures driven through the canvas input API.

use vcanvas_designer::selection::hit_test_selection;
use vcanvas_designer::{
    are_equal, Canvas, Collection, Layer, Modifiers, Permission, PointF, RectangleF,
    RotatedRectangleF, SelectionHandler, SelectionOptions, VObject,
};

fn canvas_with(rects: &[RectangleF]) -> (Canvas, Vec<String>) {
    let mut canvas = Canvas::default();
    let ids = rects
        .iter()
        .map(|r| canvas.add_object(VObject::rectangle_shape(*r)).unwrap())
        .collect();
    (canvas, ids)
}

#[test]
fn top_right_corner_hits_grip_two_and_center_hits_body() {
    let rect = RotatedRectangleF::new(100.0, 100.0, 50.0, 50.0, 0.0);
    let permission = Permission::default();
    let options = SelectionOptions::default();

    let corner = hit_test_selection(&rect, PointF::new(125.0, 75.0), &permission, &options);
    assert!(corner.resize);
    assert_eq!(corner.resize_index, 2);

    let center = hit_test_selection(&rect, PointF::new(100.0, 100.0), &permission, &options);
    assert!(center.body);
    assert!(!center.resize);
    assert!(!center.rotate);
}

#[test]
fn dragging_the_right_edge_grip_widens_to_the_right() {
    let (mut canvas, ids) = canvas_with(&[RectangleF::new(75.0, 75.0, 50.0, 50.0)]);
    canvas.select_object(&ids[0], false);

    assert!(canvas.pointer_down(PointF::new(125.0, 100.0), Modifiers::NONE));
    canvas.pointer_move(PointF::new(135.0, 100.0), Modifiers::NONE);
    canvas.pointer_up(PointF::new(135.0, 100.0), Modifiers::NONE);

    let rect = canvas.object(&ids[0]).unwrap().rectangle();
    assert!(are_equal(rect.width, 60.0), "width {}", rect.width);
    assert!(are_equal(rect.height, 50.0));
    assert!(are_equal(rect.center_x, 105.0));
    assert!(are_equal(rect.center_y, 100.0));
}

#[test]
fn rotation_snaps_to_right_angles_unless_a_modifier_is_held() {
    let (mut canvas, ids) = canvas_with(&[RectangleF::new(75.0, 75.0, 50.0, 50.0)]);
    canvas.select_object(&ids[0], false);

    // 87 degrees clockwise around the center from the rotation grip.
    let radians = 87.0f64.to_radians();
    let target = PointF::new(100.0 + 45.0 * radians.sin(), 100.0 - 45.0 * radians.cos());

    assert!(canvas.pointer_down(PointF::new(100.0, 55.0), Modifiers::NONE));
    canvas.pointer_up(target, Modifiers::NONE);
    let angle = canvas.object(&ids[0]).unwrap().rectangle().angle;
    assert!(are_equal(angle.rem_euclid(360.0), 90.0), "angle {angle}");

    canvas.undo().unwrap();
    canvas.select_object(&ids[0], false);
    assert!(canvas.pointer_down(PointF::new(100.0, 55.0), Modifiers::NONE));
    canvas.pointer_up(target, Modifiers::ctrl());
    let angle = canvas.object(&ids[0]).unwrap().rectangle().angle;
    assert!((angle.rem_euclid(360.0) - 87.0).abs() < 1e-3, "angle {angle}");
}

#[test]
fn multi_selection_aggregates_axis_aligned_bounds() {
    let (mut canvas, ids) = canvas_with(&[
        RectangleF::new(0.0, 0.0, 10.0, 10.0),
        RectangleF::new(20.0, 20.0, 10.0, 10.0),
    ]);
    canvas.select_object(&ids[0], false);
    canvas.select_object(&ids[1], true);

    let expected = RotatedRectangleF::from_rectangle(&RectangleF::from_ltrb(0.0, 0.0, 30.0, 30.0));
    assert!(canvas.selection().rectangle().unwrap().is_equal(&expected));
}

#[test]
fn rubber_band_selects_by_center_containment() {
    let mut layers = Collection::new("canvas");
    let mut layer = Layer::new("main");
    let near = VObject::rectangle_shape(RectangleF::new(0.0, 0.0, 10.0, 10.0));
    let far = VObject::rectangle_shape(RectangleF::new(45.0, 45.0, 10.0, 10.0));
    let near_id = near.id().to_string();
    layer.objects_mut().push(near).unwrap();
    layer.objects_mut().push(far).unwrap();
    layers.push(layer).unwrap();

    let mut selection = SelectionHandler::default();
    selection.begin_rubber_band(PointF::new(0.0, 0.0), false);
    selection.update_pointer(&mut layers, PointF::new(10.0, 10.0), true);
    let end = selection.end_gesture(&mut layers);

    assert!(end.selection_changed);
    assert_eq!(selection.selected_ids(), &[near_id]);
}

#[test]
fn drag_is_clamped_to_the_layer_region() {
    let mut canvas = Canvas::default();
    let mut layer = Layer::new("framed");
    layer.set_region(Some(RectangleF::new(0.0, 0.0, 200.0, 200.0)));
    canvas.add_layer(layer).unwrap();
    let id = canvas
        .add_object(VObject::rectangle_shape(RectangleF::new(150.0, 150.0, 40.0, 40.0)))
        .unwrap();

    canvas.pointer_down(PointF::new(170.0, 170.0), Modifiers::NONE);
    canvas.pointer_up(PointF::new(270.0, 175.0), Modifiers::NONE);

    let rect = canvas.object(&id).unwrap().rectangle();
    assert!(are_equal(rect.center_x, 180.0), "center x {}", rect.center_x);
    assert!(are_equal(rect.center_y, 175.0));
}

#[test]
fn objects_on_locked_layers_cannot_be_picked() {
    let (mut canvas, ids) = canvas_with(&[RectangleF::new(75.0, 75.0, 50.0, 50.0)]);
    let layer_id = canvas.layers().item(0).unwrap().id().to_string();
    canvas.set_layer_locked(&layer_id, true).unwrap();

    canvas.pointer_down(PointF::new(100.0, 100.0), Modifiers::NONE);
    canvas.pointer_up(PointF::new(120.0, 100.0), Modifiers::NONE);

    assert!(canvas.selection().is_empty());
    let rect = canvas.object(&ids[0]).unwrap().rectangle();
    assert!(are_equal(rect.center_x, 100.0));
}
