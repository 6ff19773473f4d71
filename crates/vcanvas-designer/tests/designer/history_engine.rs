//! Undo/redo engine behaviour against a live layer stack.

use proptest::prelude::*;
use vcanvas_core::{shared, EventFilter};
use vcanvas_designer::{
    Canvas, Collection, CollectionChange, Command, History, Layer, RectangleF, VObject,
};

#[derive(Debug, Clone)]
enum Op {
    Add(f64, f64),
    Remove(usize),
    Translate(usize, f64, f64),
    BringToFront(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0f64..700.0, 0.0f64..500.0).prop_map(|(x, y)| Op::Add(x, y)),
        (0usize..16).prop_map(Op::Remove),
        (0usize..16, -50.0f64..50.0, -50.0f64..50.0).prop_map(|(i, dx, dy)| Op::Translate(i, dx, dy)),
        (0usize..16).prop_map(Op::BringToFront),
    ]
}

fn pick(canvas: &Canvas, index: usize) -> Option<String> {
    let ids: Vec<String> = canvas.objects().map(|o| o.id().to_string()).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

fn apply(canvas: &mut Canvas, op: &Op) {
    match *op {
        Op::Add(x, y) => {
            canvas
                .add_object(VObject::rectangle_shape(RectangleF::new(x, y, 20.0, 10.0)))
                .unwrap();
        }
        Op::Remove(i) => {
            if let Some(id) = pick(canvas, i) {
                canvas.remove_object(&id).unwrap();
            }
        }
        Op::Translate(i, dx, dy) => {
            if let Some(id) = pick(canvas, i) {
                canvas
                    .update_object(&id, |obj| obj.update_transform().translate(dx, dy))
                    .unwrap();
            }
        }
        Op::BringToFront(i) => {
            if let Some(id) = pick(canvas, i) {
                canvas.select_object(&id, false);
                canvas.bring_to_front().unwrap();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undoing_everything_restores_the_initial_state(ops in prop::collection::vec(op(), 1..24)) {
        let mut canvas = Canvas::default();
        canvas.add_layer(Layer::new("base")).unwrap();
        canvas
            .add_object(VObject::ellipse(RectangleF::new(10.0, 10.0, 30.0, 30.0)))
            .unwrap();
        canvas.history_mut().set_max_undo_step_count(1000);
        canvas.history_mut().clear();
        let initial = canvas.layers().to_states();

        for op in &ops {
            apply(&mut canvas, op);
        }
        while canvas.undo().unwrap() {}

        prop_assert!(!canvas.history().can_undo());
        prop_assert_eq!(canvas.layers().to_states(), initial);
    }
}

fn layers_with_one_layer() -> (Collection<Layer>, String) {
    let mut layers = Collection::new("canvas");
    let layer = Layer::new("main");
    let id = layer.id().to_string();
    layers.push(layer).unwrap();
    (layers, id)
}

#[test]
fn capacity_eviction_drops_the_oldest_command() {
    let mut history = History::new(3);
    for n in 0..4 {
        history.add_command(Command::layer_moved(format!("layer-{n}"), 0, 1));
    }
    assert_eq!(history.len(), 3);
    assert!(history.overflow_max_undo_step_count());
    let first = serde_json::to_string(&history.commands()[0]).unwrap();
    assert!(first.contains("layer-1"));
    assert_eq!(history.current(), 2);
}

#[test]
fn group_undo_runs_children_in_reverse() {
    let (mut layers, layer_id) = layers_with_one_layer();
    let x = VObject::rectangle_shape(RectangleF::new(0.0, 0.0, 10.0, 10.0));
    let y = VObject::rectangle_shape(RectangleF::new(20.0, 0.0, 10.0, 10.0));
    let (x_id, y_id) = (x.id().to_string(), y.id().to_string());

    let mut children = Vec::new();
    layers.item_mut(0).unwrap().objects_mut().push(x).unwrap();
    children.push(Command::vobject_added(&layers, &x_id).unwrap());
    layers.item_mut(0).unwrap().objects_mut().push(y).unwrap();
    children.push(Command::vobject_added(&layers, &y_id).unwrap());
    layers.item_mut(0).unwrap().objects_mut().move_item(0, 1).unwrap();
    children.push(Command::vobject_moved(layer_id, x_id.clone(), 0, 1));

    let mut history = History::default();
    history.add_command(Command::group(children));

    let log = shared(Vec::new());
    let sink = log.clone();
    layers
        .item(0)
        .unwrap()
        .objects()
        .events()
        .subscribe(EventFilter::All, move |change: &CollectionChange| {
            sink.borrow_mut().push(change.clone())
        });

    history.undo(&mut layers).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            CollectionChange::Moved {
                from: 1,
                to: 0,
                id: x_id.clone()
            },
            CollectionChange::Removed {
                index: 1,
                id: y_id
            },
            CollectionChange::Removed { index: 0, id: x_id },
        ]
    );
    assert!(layers.item(0).unwrap().objects().is_empty());
}

#[test]
fn pause_and_resume_are_single_level() {
    let mut history = History::default();
    history.pause_tracking();
    history.pause_tracking();
    history.resume_tracking();
    assert!(!history.is_tracking());
    assert!(!history.add_command(Command::layer_moved("a", 0, 1)));
    assert!(history.is_empty());
}

#[test]
fn recording_after_undo_truncates_redo_tail() {
    let (mut layers, _) = layers_with_one_layer();
    let mut history = History::default();
    let first = Layer::new("first");
    let first_id = first.id().to_string();
    layers.push(first).unwrap();
    history.add_command(Command::layer_added(&layers, &first_id).unwrap());
    history.undo(&mut layers).unwrap();
    assert!(history.can_redo());

    history.add_command(Command::layer_moved("other", 0, 0));
    assert!(!history.can_redo());
    assert_eq!(history.len(), 1);
}

#[test]
fn canvas_reports_overflow() {
    let mut canvas = Canvas::default();
    canvas.history_mut().set_max_undo_step_count(2);
    let overflowed = shared(false);
    let flag = overflowed.clone();
    canvas.events().subscribe(EventFilter::All, move |event| {
        if *event == vcanvas_designer::CanvasEvent::HistoryOverflow {
            *flag.borrow_mut() = true;
        }
    });
    for i in 0..3 {
        canvas
            .add_object(VObject::rectangle_shape(RectangleF::new(i as f64, 0.0, 5.0, 5.0)))
            .unwrap();
    }
    assert!(*overflowed.borrow());
    assert_eq!(canvas.history().len(), 2);
}
