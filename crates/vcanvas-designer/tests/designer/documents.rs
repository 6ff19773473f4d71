//! Document save/load through the file system.

use tempfile::tempdir;
use vcanvas_designer::{
    Canvas, DocumentFile, Layer, PointF, RectangleF, VObject, WrappingMode,
};

fn sample_canvas() -> (Canvas, Vec<String>) {
    let mut canvas = Canvas::new(640.0, 480.0);
    let mut background = Layer::new("Background");
    background.set_region(Some(RectangleF::new(0.0, 0.0, 640.0, 480.0)));
    canvas.add_layer(background).unwrap();
    let grid = canvas
        .add_object(VObject::grid(RectangleF::new(0.0, 0.0, 640.0, 480.0), 20.0, 20.0))
        .unwrap();
    canvas.add_layer(Layer::new("Content")).unwrap();
    let mut photo = VObject::image(RectangleF::new(40.0, 40.0, 200.0, 150.0), "photo-17");
    photo.set_wrapping_mode(WrappingMode::Square);
    let photo = canvas.add_object(photo).unwrap();
    let caption = canvas
        .add_object(VObject::text(RectangleF::new(20.0, 20.0, 300.0, 200.0), "Caption", true))
        .unwrap();
    let line = canvas
        .add_object(VObject::dashed_line(
            PointF::new(0.0, 300.0),
            PointF::new(300.0, 300.0),
            vec![6.0, 3.0],
        ))
        .unwrap();
    canvas.update_object(&photo, |obj| obj.update_transform().set_angle(30.0)).unwrap();
    (canvas, vec![grid, photo, caption, line])
}

#[test]
fn save_and_load_round_trip_preserves_ids_and_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poster.vcanvas.json");
    let (canvas, ids) = sample_canvas();

    DocumentFile::new("Poster", &canvas).save_to_file(&path).unwrap();
    let mut restored = DocumentFile::load_from_file(&path).unwrap().into_canvas();

    assert_eq!(restored.id(), canvas.id());
    assert_eq!(restored.layers().to_states(), canvas.layers().to_states());
    for id in &ids {
        assert_eq!(
            restored.object(id).unwrap().type_name(),
            canvas.object(id).unwrap().type_name()
        );
    }
    assert_eq!(restored.history().len(), canvas.history().len());
    assert!(restored.history().is_tracking());

    // The restored log still undoes the last edit.
    assert!(restored.undo().unwrap());
    let angle = restored.object(&ids[1]).unwrap().rectangle().angle;
    assert!(angle.abs() < 1e-9);
}

#[test]
fn loading_does_not_record_history() {
    let (canvas, _) = sample_canvas();
    let document = DocumentFile::new("Poster", &canvas);

    let mut target = Canvas::default();
    target.history_mut().clear();
    document.apply_to(&mut target);

    assert_eq!(target.history().len(), canvas.history().len());
    assert_eq!(target.history().current(), canvas.history().current());
}

#[test]
fn bounded_text_wraps_after_load() {
    let (canvas, ids) = sample_canvas();
    let json = DocumentFile::new("Poster", &canvas).to_json().unwrap();
    let restored = DocumentFile::from_json(&json).unwrap().into_canvas();

    let caption = restored.object(&ids[2]).unwrap();
    match caption.kind() {
        vcanvas_designer::VObjectKind::Text(data) => assert_eq!(data.wrapping_rectangles.len(), 1),
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn missing_file_reports_context() {
    let dir = tempdir().unwrap();
    let err = DocumentFile::load_from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read document file"));
}
