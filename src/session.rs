//! Scripted editing sessions.
//!
//! A session is a JSON list of input steps replayed against a canvas, in
//! the same order a host would feed pointer and keyboard events. It lets
//! the headless binary and tests drive the full interaction path.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use vcanvas_designer::{ArrowKey, Canvas, Key, Layer, Modifiers, PointF, RectangleF, ZOrder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionStep {
    AddObject {
        #[serde(rename = "type")]
        type_name: String,
        rect: RectangleF,
    },
    AddLayer {
        name: String,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        ctrl: bool,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// Press and release of a key: "Left", "Up", "Right", "Down",
    /// "Delete", "Escape" or a single character.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    SelectAll,
    ClearSelection,
    DeleteSelection,
    BringToFront,
    SendToBack,
    Undo,
    Redo,
    Zoom {
        zoom: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub steps: Vec<SessionStep>,
}

/// Summary of a canvas after a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub layers: usize,
    pub objects: usize,
    pub selected: Vec<String>,
    pub undo_steps: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl SessionReport {
    pub fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            layers: canvas.layers().len(),
            objects: canvas.objects().count(),
            selected: canvas.selection().selected_ids().to_vec(),
            undo_steps: canvas.history().len(),
            can_undo: canvas.history().can_undo(),
            can_redo: canvas.history().can_redo(),
        }
    }
}

fn parse_key(name: &str) -> Result<Key> {
    let key = match name {
        "Left" => Key::Arrow(ArrowKey::Left),
        "Up" => Key::Arrow(ArrowKey::Up),
        "Right" => Key::Arrow(ArrowKey::Right),
        "Down" => Key::Arrow(ArrowKey::Down),
        "Delete" => Key::Delete,
        "Escape" => Key::Escape,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Character(c),
                _ => bail!("Unknown key '{}'", other),
            }
        }
    };
    Ok(key)
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse session script")
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session script {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Replays every step against `canvas`. Steps that are ignored by the
    /// canvas (a click on nothing, undo with an empty history) are not
    /// errors; malformed steps are.
    pub fn run(&self, canvas: &mut Canvas) -> Result<SessionReport> {
        for (index, step) in self.steps.iter().enumerate() {
            debug!("Session step {}: {:?}", index, step);
            Self::apply_step(canvas, step).with_context(|| format!("Session step {}", index))?;
        }
        let report = SessionReport::from_canvas(canvas);
        info!(
            "Session finished: {} step(s), {} object(s), {} undo step(s)",
            self.steps.len(),
            report.objects,
            report.undo_steps
        );
        Ok(report)
    }

    fn apply_step(canvas: &mut Canvas, step: &SessionStep) -> Result<()> {
        match step {
            SessionStep::AddObject { type_name, rect } => {
                canvas.create_object(type_name, *rect)?;
            }
            SessionStep::AddLayer { name } => {
                canvas.add_layer(Layer::new(name.as_str()))?;
            }
            SessionStep::PointerDown { x, y, shift, ctrl } => {
                let modifiers = Modifiers {
                    shift: *shift,
                    ctrl: *ctrl,
                    alt: false,
                };
                canvas.pointer_down(PointF::new(*x, *y), modifiers);
            }
            SessionStep::PointerMove { x, y, shift } => {
                let modifiers = Modifiers {
                    shift: *shift,
                    ..Modifiers::NONE
                };
                canvas.pointer_move(PointF::new(*x, *y), modifiers);
            }
            SessionStep::PointerUp { x, y } => {
                canvas.pointer_up(PointF::new(*x, *y), Modifiers::NONE);
            }
            SessionStep::Key { key, ctrl, shift } => {
                let key = parse_key(key)?;
                let modifiers = Modifiers {
                    shift: *shift,
                    ctrl: *ctrl,
                    alt: false,
                };
                if !canvas.key_down(key, modifiers) {
                    warn!("Key {:?} was not handled", key);
                }
                canvas.key_up(key, modifiers);
            }
            SessionStep::SelectAll => {
                canvas.select_all();
            }
            SessionStep::ClearSelection => {
                canvas.clear_selection();
            }
            SessionStep::DeleteSelection => {
                canvas.delete_selection()?;
            }
            SessionStep::BringToFront => {
                canvas.reorder_selection(ZOrder::BringToFront)?;
            }
            SessionStep::SendToBack => {
                canvas.reorder_selection(ZOrder::SendToBack)?;
            }
            SessionStep::Undo => {
                canvas.undo()?;
            }
            SessionStep::Redo => {
                canvas.redo()?;
            }
            SessionStep::Zoom { zoom } => {
                canvas.viewport_mut().set_zoom(*zoom);
                canvas.request_redraw();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "steps": [
            { "action": "add_object", "type": "Rectangle",
              "rect": { "left": 75.0, "top": 75.0, "width": 50.0, "height": 50.0 } },
            { "action": "pointer_down", "x": 100.0, "y": 100.0 },
            { "action": "pointer_move", "x": 130.0, "y": 100.0 },
            { "action": "pointer_up", "x": 130.0, "y": 100.0 },
            { "action": "key", "key": "Right" },
            { "action": "key", "key": "z", "ctrl": true }
        ]
    }"#;

    #[test]
    fn test_script_replays_gestures() {
        let session = Session::from_json(SCRIPT).unwrap();
        assert_eq!(session.steps.len(), 6);

        let mut canvas = Canvas::default();
        let report = session.run(&mut canvas).unwrap();
        assert_eq!(report.objects, 1);
        assert_eq!(report.selected.len(), 1);
        assert!(report.can_redo);

        // The nudge was undone, the drag remains.
        let obj = canvas.objects().next().unwrap();
        assert!(obj.rectangle().center().is_equal(&PointF::new(130.0, 100.0)));
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let session = Session {
            steps: vec![SessionStep::Key {
                key: "PageUp".to_string(),
                ctrl: false,
                shift: false,
            }],
        };
        let err = session.run(&mut Canvas::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown key 'PageUp'"));
    }

    #[test]
    fn test_unknown_object_type_is_an_error() {
        let json = r#"{ "steps": [ { "action": "add_object", "type": "Hologram",
            "rect": { "left": 0.0, "top": 0.0, "width": 1.0, "height": 1.0 } } ] }"#;
        let session = Session::from_json(json).unwrap();
        assert!(session.run(&mut Canvas::default()).is_err());
    }
}
