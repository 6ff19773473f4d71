//! Replays scripted sessions against saved documents.

use tempfile::TempDir;
use vcanvas::{Canvas, Config, DocumentFile, PointF, RectangleF, Session, VObject};

#[test]
fn test_session_on_loaded_document_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("poster.json");

    let mut canvas = Canvas::default();
    let id = canvas
        .add_object(VObject::rectangle_shape(RectangleF::new(
            75.0, 75.0, 50.0, 50.0,
        )))
        .unwrap();
    DocumentFile::new("Poster", &canvas).save_to_file(&path).unwrap();

    let mut document = DocumentFile::load_from_file(&path).unwrap();
    let mut canvas = Canvas::default();
    Config::default().apply_to(&mut canvas);
    document.apply_to(&mut canvas);

    let session = Session::from_json(
        r#"{ "steps": [
            { "action": "select_all" },
            { "action": "key", "key": "Down" },
            { "action": "key", "key": "Down" }
        ] }"#,
    )
    .unwrap();
    let report = session.run(&mut canvas).unwrap();
    assert_eq!(report.selected, vec![id.clone()]);
    assert!(report.can_undo);

    document.update_from(&canvas);
    document.save_to_file(&path).unwrap();

    let mut restored = DocumentFile::load_from_file(&path).unwrap().into_canvas();
    let center = restored.object(&id).unwrap().rectangle().center();
    assert!(center.is_equal(&PointF::new(100.0, 102.0)));

    restored.undo().unwrap();
    restored.undo().unwrap();
    let center = restored.object(&id).unwrap().rectangle().center();
    assert!(center.is_equal(&PointF::new(100.0, 100.0)));
}

#[test]
fn test_config_limits_history_of_session() {
    let mut config = Config::default();
    config.history.max_undo_step_count = 2;
    let mut canvas = Canvas::default();
    config.apply_to(&mut canvas);

    let session = Session::from_json(
        r#"{ "steps": [
            { "action": "add_object", "type": "Ellipse",
              "rect": { "left": 0.0, "top": 0.0, "width": 10.0, "height": 10.0 } },
            { "action": "add_object", "type": "Ellipse",
              "rect": { "left": 20.0, "top": 0.0, "width": 10.0, "height": 10.0 } },
            { "action": "add_object", "type": "Ellipse",
              "rect": { "left": 40.0, "top": 0.0, "width": 10.0, "height": 10.0 } }
        ] }"#,
    )
    .unwrap();
    let report = session.run(&mut canvas).unwrap();
    assert_eq!(report.objects, 3);
    assert_eq!(report.undo_steps, 2);
    assert!(canvas.history().overflow_max_undo_step_count());
}
