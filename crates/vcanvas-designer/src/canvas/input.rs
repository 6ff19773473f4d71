//! Pointer and keyboard input. Positions arrive in control coordinates and
//! are converted through the viewport.

use tracing::{debug, error};

use super::{Canvas, CanvasEvent, Key, Modifiers};
use crate::geometry::PointF;
use crate::history::Command;

/// Pointer tolerance for picking thin objects, in control pixels.
const PICK_TOLERANCE: f64 = 3.0;

impl Canvas {
    /// Handles a pointer press. Returns true when the press started a
    /// gesture or changed the selection.
    pub fn pointer_down(&mut self, control: PointF, modifiers: Modifiers) -> bool {
        let p = self.viewport.control_to_canvas(control);
        if self.selection.is_interacting() {
            return false;
        }

        let hit = self.selection.hit_test(&self.layers, p);
        if (hit.resize || hit.rotate) && !modifiers.any() {
            return self.selection.begin_transform(&self.layers, p, &hit);
        }

        let tolerance = self.viewport.control_length_to_canvas(PICK_TOLERANCE);
        let picked = self
            .layers
            .hit_test_objects(p, tolerance)
            .map(|obj| obj.id().to_string());

        match picked {
            Some(id) if modifiers.shift || modifiers.ctrl => {
                let changed = self.selection.toggle(&self.layers, &id);
                if changed {
                    self.publish_selection();
                    self.request_redraw();
                }
                changed
            }
            Some(id) => {
                let changed = !self.selection.is_selected(&id)
                    && self.selection.select_only(&self.layers, &id);
                if changed {
                    self.publish_selection();
                    self.request_redraw();
                }
                let hit = self.selection.hit_test(&self.layers, p);
                self.selection.begin_transform(&self.layers, p, &hit) || changed
            }
            None if hit.body && !modifiers.any() => {
                self.selection.begin_transform(&self.layers, p, &hit)
            }
            None => {
                if !modifiers.shift && self.selection.clear() {
                    self.publish_selection();
                    self.request_redraw();
                }
                self.selection.begin_rubber_band(p, modifiers.shift);
                true
            }
        }
    }

    /// Feeds a pointer move into the active gesture. Snapping applies
    /// unless a modifier is held.
    pub fn pointer_move(&mut self, control: PointF, modifiers: Modifiers) -> bool {
        if !self.selection.is_interacting() {
            return false;
        }
        let p = self.viewport.control_to_canvas(control);
        let changed = self.selection.update_pointer(&mut self.layers, p, !modifiers.any());
        if changed {
            self.request_redraw();
        }
        changed
    }

    /// Finishes the active gesture, recording it as one undo step.
    pub fn pointer_up(&mut self, control: PointF, modifiers: Modifiers) -> bool {
        if !self.selection.is_interacting() {
            return false;
        }
        self.pointer_move(control, modifiers);
        let end = self.selection.end_gesture(&mut self.layers);
        if end.selection_changed {
            self.publish_selection();
        }
        self.finish_transform(end.command);
        self.request_redraw();
        true
    }

    fn finish_transform(&mut self, command: Option<Command>) {
        let Some(command) = command else {
            return;
        };
        let ids = command.object_ids();
        debug!("{} committed for {} object(s)", command.name(), ids.len());
        self.record(command);
        for id in ids {
            self.events.publish(CanvasEvent::VObjectChanged { id });
        }
        self.refresh_text_wrapping();
    }

    /// Handles a key press. Returns true when the key was consumed.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Arrow(arrow) => {
                let step = self.viewport.control_length_to_canvas(1.0);
                let moved = self.selection.nudge_key_down(&mut self.layers, arrow, step);
                if moved {
                    self.request_redraw();
                }
                moved
            }
            Key::Delete => match self.delete_selection() {
                Ok(count) => count > 0,
                Err(e) => {
                    error!("Failed to delete selection: {}", e);
                    false
                }
            },
            Key::Escape => {
                if self.selection.is_interacting() {
                    self.selection.cancel_gesture(&mut self.layers);
                    self.request_redraw();
                    true
                } else {
                    self.clear_selection()
                }
            }
            Key::Character(c) if modifiers.ctrl => match c.to_ascii_lowercase() {
                'z' if modifiers.shift => self.redo_logged(),
                'z' => self.undo_logged(),
                'y' => self.redo_logged(),
                'a' => self.select_all(),
                _ => false,
            },
            Key::Character(_) => false,
        }
    }

    /// Handles a key release; releasing the last arrow commits a nudge.
    pub fn key_up(&mut self, key: Key, _modifiers: Modifiers) -> bool {
        let Key::Arrow(arrow) = key else {
            return false;
        };
        let command = self.selection.nudge_key_up(&mut self.layers, arrow);
        let committed = command.is_some();
        self.finish_transform(command);
        committed
    }

    fn undo_logged(&mut self) -> bool {
        self.undo().unwrap_or_else(|e| {
            error!("Undo failed: {}", e);
            false
        })
    }

    fn redo_logged(&mut self) -> bool {
        self.redo().unwrap_or_else(|e| {
            error!("Redo failed: {}", e);
            false
        })
    }
}
