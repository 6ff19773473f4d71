//! Recorded structural edits: layers, objects, selection and z-order.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::{Canvas, CanvasEvent};
use crate::geometry::RectangleF;
use crate::history::Command;
use crate::layer::Layer;
use crate::model::{VObject, VObjectKind};
use vcanvas_core::{CanvasError, Result};

/// Z-order adjustments for the selected objects within their layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    BringToFront,
    BringForward,
    SendBackward,
    SendToBack,
}

impl ZOrder {
    fn moves_up(self) -> bool {
        matches!(self, ZOrder::BringToFront | ZOrder::BringForward)
    }
}

fn content_source(kind: &VObjectKind) -> Option<&str> {
    match kind {
        VObjectKind::Image(data) => Some(&data.source),
        VObjectKind::Svg(data) => Some(&data.source),
        _ => None,
    }
}

impl Canvas {
    pub fn active_layer_id(&self) -> Option<&str> {
        self.active_layer.as_deref()
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer
            .as_deref()
            .and_then(|id| self.layers.find(id))
    }

    pub fn set_active_layer(&mut self, id: &str) -> Result<()> {
        if self.layers.index_of(id).is_none() {
            return Err(CanvasError::not_found(id));
        }
        self.active_layer = Some(id.to_string());
        Ok(())
    }

    /// Appends a layer on top of the stack and makes it active.
    pub fn add_layer(&mut self, layer: Layer) -> Result<String> {
        let index = self.layers.len();
        self.insert_layer(index, layer)
    }

    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<String> {
        let id = layer.id().to_string();
        self.layers.insert(index, layer)?;
        if let Some(command) = Command::layer_added(&self.layers, &id) {
            self.record(command);
        }
        info!("Layer {} added at {}", id, index);
        self.active_layer = Some(id.clone());
        self.events.publish(CanvasEvent::LayerAdded { id: id.clone() });
        self.refresh_text_wrapping();
        self.request_redraw();
        Ok(id)
    }

    pub fn remove_layer(&mut self, id: &str) -> Result<Layer> {
        let command = Command::layer_removed(&self.layers, id)
            .ok_or_else(|| CanvasError::not_found(id))?;
        let layer = self.layers.remove(id)?;
        self.record(command);
        info!("Layer {} removed", id);
        if self.active_layer.as_deref() == Some(id) {
            self.active_layer = self.layers.iter().last().map(|l| l.id().to_string());
        }
        if self.selection.prune(&self.layers) {
            self.publish_selection();
        }
        self.events.publish(CanvasEvent::LayerRemoved { id: id.to_string() });
        self.refresh_text_wrapping();
        self.request_redraw();
        Ok(layer)
    }

    pub fn move_layer(&mut self, id: &str, to: usize) -> Result<()> {
        let from = self.layers.index_of(id).ok_or_else(|| CanvasError::not_found(id))?;
        if from == to {
            return Ok(());
        }
        self.layers.move_item(from, to)?;
        self.record(Command::layer_moved(id, from, to));
        self.request_redraw();
        Ok(())
    }

    /// Visibility and locking are view state and are not recorded.
    pub fn set_layer_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        let layer = self.layers.find_mut(id).ok_or_else(|| CanvasError::not_found(id))?;
        layer.set_visible(visible);
        if self.selection.prune(&self.layers) {
            self.publish_selection();
        }
        self.request_redraw();
        Ok(())
    }

    pub fn set_layer_locked(&mut self, id: &str, locked: bool) -> Result<()> {
        let layer = self.layers.find_mut(id).ok_or_else(|| CanvasError::not_found(id))?;
        layer.set_locked(locked);
        if self.selection.prune(&self.layers) {
            self.publish_selection();
        }
        Ok(())
    }

    fn ensure_active_layer(&mut self) -> Result<String> {
        if let Some(id) = self.active_layer.clone() {
            if self.layers.index_of(&id).is_some() {
                return Ok(id);
            }
        }
        if let Some(last) = self.layers.iter().last() {
            let id = last.id().to_string();
            self.active_layer = Some(id.clone());
            return Ok(id);
        }
        let name = format!("Layer {}", self.layers.len() + 1);
        self.add_layer(Layer::new(name))
    }

    /// Adds an object on top of the active layer, creating a layer when the
    /// canvas has none.
    pub fn add_object(&mut self, obj: VObject) -> Result<String> {
        let layer_id = self.ensure_active_layer()?;
        self.add_object_to_layer(&layer_id, obj, None)
    }

    /// Inserts an object into a layer; `index` defaults to the top.
    pub fn add_object_to_layer(
        &mut self,
        layer_id: &str,
        obj: VObject,
        index: Option<usize>,
    ) -> Result<String> {
        let layer = self
            .layers
            .find_mut(layer_id)
            .ok_or_else(|| CanvasError::not_found(layer_id))?;
        let id = obj.id().to_string();
        let index = index.unwrap_or(layer.objects().len());
        layer.objects_mut().insert(index, obj)?;
        if let Some(command) = Command::vobject_added(&self.layers, &id) {
            self.record(command);
        }
        debug!("Object {} added to layer {} at {}", id, layer_id, index);
        self.events.publish(CanvasEvent::VObjectAdded { id: id.clone() });
        self.refresh_text_wrapping();
        self.request_redraw();
        Ok(id)
    }

    /// Creates an object through the factory by its type name.
    pub fn create_object(&mut self, type_name: &str, rect: RectangleF) -> Result<String> {
        let obj = self
            .factory
            .create_object_by_type(type_name, rect)
            .ok_or_else(|| {
                CanvasError::InvalidCommand(format!("unknown object type '{type_name}'"))
            })?;
        self.add_object(obj)
    }

    pub fn remove_object(&mut self, id: &str) -> Result<VObject> {
        let location = self
            .layers
            .locate_object(id)
            .ok_or_else(|| CanvasError::not_found(id))?;
        let command = Command::vobject_removed(&self.layers, id)
            .ok_or_else(|| CanvasError::not_found(id))?;
        let obj = self
            .layers
            .item_mut(location.layer_index)?
            .objects_mut()
            .remove_at(location.index)?;
        self.record(command);
        debug!("Object {} removed", id);
        if self.selection.deselect(&self.layers, id) {
            self.publish_selection();
        }
        self.events.publish(CanvasEvent::VObjectRemoved { id: id.to_string() });
        self.refresh_text_wrapping();
        self.request_redraw();
        Ok(obj)
    }

    /// Edits an object in place and records the change as one undo step.
    ///
    /// Replacing the content source supersedes any render request still in
    /// flight for the object; other edits queue behind it.
    pub fn update_object<F>(&mut self, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut VObject),
    {
        let obj = self
            .layers
            .find_object_mut(id)
            .ok_or_else(|| CanvasError::not_found(id))?;
        let before = obj.to_state();
        edit(obj);
        let after = obj.to_state();
        if before == after {
            return Ok(());
        }
        if content_source(&before.kind) != content_source(&after.kind) {
            obj.content_state_mut().invalidate();
        }
        self.record(Command::vobject_changed(before, after));
        self.selection.update_rectangle(&self.layers);
        self.events.publish(CanvasEvent::VObjectChanged { id: id.to_string() });
        self.refresh_text_wrapping();
        self.request_redraw();
        Ok(())
    }

    /// Selects an object; with `additive` the current selection is kept.
    pub fn select_object(&mut self, id: &str, additive: bool) -> bool {
        let changed = if additive {
            self.selection.select(&self.layers, id)
        } else {
            self.selection.select_only(&self.layers, id)
        };
        if changed {
            self.publish_selection();
            self.request_redraw();
        }
        changed
    }

    pub fn select_all(&mut self) -> bool {
        let changed = self.selection.select_all(&self.layers);
        if changed {
            self.publish_selection();
            self.request_redraw();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.publish_selection();
            self.request_redraw();
        }
        changed
    }

    /// Deletes every selected object that allows deletion, as a single
    /// undo step. Returns the number of deleted objects.
    pub fn delete_selection(&mut self) -> Result<usize> {
        let ids: Vec<String> = self
            .selection
            .selected_ids()
            .iter()
            .filter(|id| {
                self.layers
                    .find_object(id)
                    .is_some_and(|obj| obj.effective_permission().allow_delete && !obj.is_locked())
            })
            .cloned()
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }
        self.history.start_group();
        let mut deleted = 0;
        let mut result = Ok(());
        for id in &ids {
            match self.remove_object(id) {
                Ok(_) => deleted += 1,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.history.end_group();
        result.map(|()| deleted)
    }

    /// Restacks the selected objects inside their own layers as one undo
    /// step. Returns the number of objects that actually moved.
    pub fn reorder_selection(&mut self, order: ZOrder) -> Result<usize> {
        let mut targets: Vec<(String, String, usize)> = self
            .selection
            .selected_ids()
            .iter()
            .filter_map(|id| {
                let location = self.layers.locate_object(id)?;
                let layer = self.layers.get(location.layer_index)?;
                Some((layer.id().to_string(), id.clone(), location.index))
            })
            .collect();
        if order.moves_up() {
            targets.sort_by(|a, b| b.2.cmp(&a.2));
        } else {
            targets.sort_by(|a, b| a.2.cmp(&b.2));
        }

        // Per-layer bound that keeps already restacked objects in place.
        let mut limits: HashMap<String, usize> = HashMap::new();
        let mut moved = 0;
        self.history.start_group();
        for (layer_id, id, _) in targets {
            let Some(layer) = self.layers.find_mut(&layer_id) else {
                warn!("Layer {} vanished while reordering", layer_id);
                continue;
            };
            let len = layer.objects().len();
            let Some(from) = layer.objects().index_of(&id) else {
                continue;
            };
            let limit = *limits
                .entry(layer_id.clone())
                .or_insert(if order.moves_up() { len - 1 } else { 0 });
            let to = match order {
                ZOrder::BringToFront => limit.max(from),
                ZOrder::BringForward => (from + 1).min(limit).max(from),
                ZOrder::SendToBack => limit.min(from),
                ZOrder::SendBackward => from.saturating_sub(1).max(limit).min(from),
            };
            let next_limit = if order.moves_up() {
                to.saturating_sub(1)
            } else {
                to + 1
            };
            limits.insert(layer_id.clone(), next_limit);
            if to == from {
                continue;
            }
            if let Err(e) = layer.objects_mut().move_item(from, to) {
                self.history.end_group();
                return Err(e);
            }
            self.record(Command::vobject_moved(layer_id, id, from, to));
            moved += 1;
        }
        self.history.end_group();
        if moved > 0 {
            self.request_redraw();
        }
        Ok(moved)
    }

    pub fn bring_to_front(&mut self) -> Result<usize> {
        self.reorder_selection(ZOrder::BringToFront)
    }

    pub fn bring_forward(&mut self) -> Result<usize> {
        self.reorder_selection(ZOrder::BringForward)
    }

    pub fn send_backward(&mut self) -> Result<usize> {
        self.reorder_selection(ZOrder::SendBackward)
    }

    pub fn send_to_back(&mut self) -> Result<usize> {
        self.reorder_selection(ZOrder::SendToBack)
    }
}
