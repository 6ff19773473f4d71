//! Undoable commands over the layer stack.
//!
//! Commands hold serialized snapshots and indices rather than references,
//! so they survive arbitrary interleaving with live edits and round-trip
//! with the document. `execute` and `un_execute` must be called in strict
//! alternation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collection::Collection;
use crate::layer::{Layer, LayerState};
use crate::model::{VObject, VObjectState};
use vcanvas_core::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type")]
pub enum Command {
    VObjectAdded {
        layer_id: String,
        index: usize,
        state: VObjectState,
    },
    VObjectRemoved {
        layer_id: String,
        index: usize,
        state: VObjectState,
    },
    VObjectChanged {
        before: VObjectState,
        after: VObjectState,
    },
    VObjectMoved {
        layer_id: String,
        id: String,
        from: usize,
        to: usize,
    },
    LayerAdded {
        index: usize,
        state: LayerState,
    },
    LayerRemoved {
        index: usize,
        state: LayerState,
    },
    LayerMoved {
        id: String,
        from: usize,
        to: usize,
    },
    Group {
        commands: Vec<Command>,
    },
}

impl Command {
    /// Records that object `id` now sits in the layer stack.
    ///
    /// Returns `None` when the object cannot be found; such a change is
    /// never recorded.
    pub fn vobject_added(layers: &Collection<Layer>, id: &str) -> Option<Command> {
        let (layer_id, index, state) = capture_object(layers, id)?;
        Some(Command::VObjectAdded {
            layer_id,
            index,
            state,
        })
    }

    /// Captures object `id` before it is removed from the layer stack.
    pub fn vobject_removed(layers: &Collection<Layer>, id: &str) -> Option<Command> {
        let (layer_id, index, state) = capture_object(layers, id)?;
        Some(Command::VObjectRemoved {
            layer_id,
            index,
            state,
        })
    }

    pub fn vobject_changed(before: VObjectState, after: VObjectState) -> Command {
        Command::VObjectChanged { before, after }
    }

    pub fn vobject_moved(layer_id: impl Into<String>, id: impl Into<String>, from: usize, to: usize) -> Command {
        Command::VObjectMoved {
            layer_id: layer_id.into(),
            id: id.into(),
            from,
            to,
        }
    }

    pub fn layer_added(layers: &Collection<Layer>, id: &str) -> Option<Command> {
        let index = layers.index_of(id)?;
        let state = layers.get(index)?.to_state();
        Some(Command::LayerAdded { index, state })
    }

    pub fn layer_removed(layers: &Collection<Layer>, id: &str) -> Option<Command> {
        let index = layers.index_of(id)?;
        let state = layers.get(index)?.to_state();
        Some(Command::LayerRemoved { index, state })
    }

    pub fn layer_moved(id: impl Into<String>, from: usize, to: usize) -> Command {
        Command::LayerMoved {
            id: id.into(),
            from,
            to,
        }
    }

    pub fn group(commands: Vec<Command>) -> Command {
        Command::Group { commands }
    }

    /// Short human-readable label.
    pub fn name(&self) -> &'static str {
        match self {
            Command::VObjectAdded { .. } => "Add Object",
            Command::VObjectRemoved { .. } => "Remove Object",
            Command::VObjectChanged { .. } => "Change Object",
            Command::VObjectMoved { .. } => "Reorder Object",
            Command::LayerAdded { .. } => "Add Layer",
            Command::LayerRemoved { .. } => "Remove Layer",
            Command::LayerMoved { .. } => "Reorder Layer",
            Command::Group { .. } => "Group",
        }
    }

    /// Ids of the objects this command touches, for dependent refreshes.
    pub fn object_ids(&self) -> Vec<String> {
        match self {
            Command::VObjectAdded { state, .. } | Command::VObjectRemoved { state, .. } => {
                vec![state.id.clone()]
            }
            Command::VObjectChanged { after, .. } => vec![after.id.clone()],
            Command::VObjectMoved { id, .. } => vec![id.clone()],
            Command::LayerAdded { state, .. } | Command::LayerRemoved { state, .. } => {
                state.objects.iter().map(|o| o.id.clone()).collect()
            }
            Command::LayerMoved { .. } => Vec::new(),
            Command::Group { commands } => commands.iter().flat_map(Command::object_ids).collect(),
        }
    }

    pub fn execute(&self, layers: &mut Collection<Layer>) -> Result<()> {
        match self {
            Command::VObjectAdded {
                layer_id,
                index,
                state,
            } => insert_object(layers, layer_id, *index, state),
            Command::VObjectRemoved { state, .. } => remove_object(layers, &state.id),
            Command::VObjectChanged { after, .. } => {
                apply_object_state(layers, after);
                Ok(())
            }
            Command::VObjectMoved {
                layer_id,
                id,
                from,
                to,
            } => move_object(layers, layer_id, id, *from, *to),
            Command::LayerAdded { index, state } => insert_layer(layers, *index, state),
            Command::LayerRemoved { state, .. } => remove_layer(layers, &state.id),
            Command::LayerMoved { id, from, to } => move_layer(layers, id, *from, *to),
            Command::Group { commands } => {
                for command in commands {
                    command.execute(layers)?;
                }
                Ok(())
            }
        }
    }

    pub fn un_execute(&self, layers: &mut Collection<Layer>) -> Result<()> {
        match self {
            Command::VObjectAdded { state, .. } => remove_object(layers, &state.id),
            Command::VObjectRemoved {
                layer_id,
                index,
                state,
            } => insert_object(layers, layer_id, *index, state),
            Command::VObjectChanged { before, .. } => {
                apply_object_state(layers, before);
                Ok(())
            }
            Command::VObjectMoved {
                layer_id,
                id,
                from,
                to,
            } => move_object(layers, layer_id, id, *to, *from),
            Command::LayerAdded { state, .. } => remove_layer(layers, &state.id),
            Command::LayerRemoved { index, state } => insert_layer(layers, *index, state),
            Command::LayerMoved { id, from, to } => move_layer(layers, id, *to, *from),
            Command::Group { commands } => {
                for command in commands.iter().rev() {
                    command.un_execute(layers)?;
                }
                Ok(())
            }
        }
    }
}

fn capture_object(layers: &Collection<Layer>, id: &str) -> Option<(String, usize, VObjectState)> {
    let location = layers.locate_object(id)?;
    let layer = layers.get(location.layer_index)?;
    let obj = layer.objects().get(location.index)?;
    Some((layer.id().to_string(), location.index, obj.to_state()))
}

fn insert_object(
    layers: &mut Collection<Layer>,
    layer_id: &str,
    index: usize,
    state: &VObjectState,
) -> Result<()> {
    let Some(layer) = layers.find_mut(layer_id) else {
        warn!("Skipping insert of {}: layer {} not found", state.id, layer_id);
        return Ok(());
    };
    let objects = layer.objects_mut();
    let index = index.min(objects.len());
    objects.insert(index, VObject::from_state(state.clone()))
}

fn remove_object(layers: &mut Collection<Layer>, id: &str) -> Result<()> {
    let Some(location) = layers.locate_object(id) else {
        warn!("Skipping removal of {}: object not found", id);
        return Ok(());
    };
    layers
        .item_mut(location.layer_index)?
        .objects_mut()
        .remove_at(location.index)
        .map(|_| ())
}

fn apply_object_state(layers: &mut Collection<Layer>, state: &VObjectState) {
    match layers.find_object_mut(&state.id) {
        Some(obj) => obj.apply_state(state),
        None => warn!("Skipping change of {}: object not found", state.id),
    }
}

fn move_object(
    layers: &mut Collection<Layer>,
    layer_id: &str,
    id: &str,
    from: usize,
    to: usize,
) -> Result<()> {
    let Some(layer) = layers.find_mut(layer_id) else {
        warn!("Skipping reorder of {}: layer {} not found", id, layer_id);
        return Ok(());
    };
    let objects = layer.objects_mut();
    let from = objects.index_of(id).unwrap_or(from);
    objects.move_item(from, to)
}

fn insert_layer(layers: &mut Collection<Layer>, index: usize, state: &LayerState) -> Result<()> {
    let layer = Layer::from_state(state.clone())?;
    let index = index.min(layers.len());
    layers.insert(index, layer)
}

fn remove_layer(layers: &mut Collection<Layer>, id: &str) -> Result<()> {
    if layers.index_of(id).is_none() {
        warn!("Skipping removal of layer {}: not found", id);
        return Ok(());
    }
    layers.remove(id).map(|_| ())
}

fn move_layer(layers: &mut Collection<Layer>, id: &str, from: usize, to: usize) -> Result<()> {
    let from = layers.index_of(id).unwrap_or(from);
    layers.move_item(from, to)
}
