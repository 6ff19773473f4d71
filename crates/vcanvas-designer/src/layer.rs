//! Layers: ordered, independently visible/lockable containers of v-objects.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collection::{Collection, Owned};
use crate::geometry::RectangleF;
use crate::ids::new_unique_id;
use crate::model::{VObject, VObjectState};
use vcanvas_core::Result;

impl Owned for VObject {
    fn unique_id(&self) -> &str {
        self.id()
    }

    fn owner_id(&self) -> Option<&str> {
        self.layer_id()
    }

    fn set_owner_id(&mut self, owner: Option<String>) {
        self.set_layer_id(owner);
    }
}

fn default_visible() -> bool {
    true
}

/// Serialized snapshot of a layer and its objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    #[serde(default = "new_unique_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RectangleF>,
    #[serde(default)]
    pub objects: Vec<VObjectState>,
}

#[derive(Debug)]
pub struct Layer {
    id: String,
    name: String,
    visible: bool,
    locked: bool,
    /// Clamp applied to manipulation of this layer's objects.
    region: Option<RectangleF>,
    canvas_id: Option<String>,
    objects: Collection<VObject>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(new_unique_id(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            objects: Collection::new(id.clone()),
            id,
            name: name.into(),
            visible: true,
            locked: false,
            region: None,
            canvas_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn region(&self) -> Option<RectangleF> {
        self.region
    }

    pub fn set_region(&mut self, region: Option<RectangleF>) {
        self.region = region;
    }

    pub fn canvas_id(&self) -> Option<&str> {
        self.canvas_id.as_deref()
    }

    pub fn objects(&self) -> &Collection<VObject> {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut Collection<VObject> {
        &mut self.objects
    }

    /// Objects on a visible, unlocked layer that may be interacted with.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }

    pub fn to_state(&self) -> LayerState {
        LayerState {
            id: self.id.clone(),
            name: self.name.clone(),
            visible: self.visible,
            locked: self.locked,
            region: self.region,
            objects: self.objects.iter().map(VObject::to_state).collect(),
        }
    }

    /// Rebuilds a detached layer and its objects from a snapshot.
    pub fn from_state(state: LayerState) -> Result<Self> {
        let mut layer = Layer::with_id(state.id, state.name);
        layer.visible = state.visible;
        layer.locked = state.locked;
        layer.region = state.region;
        for object in state.objects {
            layer.objects.push(VObject::from_state(object))?;
        }
        Ok(layer)
    }
}

impl Owned for Layer {
    fn unique_id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        self.canvas_id.as_deref()
    }

    fn set_owner_id(&mut self, owner: Option<String>) {
        self.canvas_id = owner;
    }
}

/// Position of an object inside a layer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLocation {
    pub layer_index: usize,
    pub index: usize,
}

impl Collection<Layer> {
    pub fn locate_object(&self, id: &str) -> Option<ObjectLocation> {
        self.iter().enumerate().find_map(|(layer_index, layer)| {
            layer
                .objects()
                .index_of(id)
                .map(|index| ObjectLocation { layer_index, index })
        })
    }

    pub fn find_object(&self, id: &str) -> Option<&VObject> {
        self.iter().find_map(|layer| layer.objects().find(id))
    }

    pub fn find_object_mut(&mut self, id: &str) -> Option<&mut VObject> {
        self.iter_mut().find_map(|layer| layer.objects_mut().find_mut(id))
    }

    /// The layer owning object `id`.
    pub fn layer_of(&self, id: &str) -> Option<&Layer> {
        self.iter().find(|layer| layer.objects().index_of(id).is_some())
    }

    /// Every object, bottom layer first, in draw order.
    pub fn all_objects(&self) -> impl Iterator<Item = &VObject> {
        self.iter().flat_map(|layer| layer.objects().iter())
    }

    pub fn object_count(&self) -> usize {
        self.iter().map(|layer| layer.objects().len()).sum()
    }

    /// Topmost visible object on an interactive layer that contains `p`.
    pub fn hit_test_objects(&self, p: crate::geometry::PointF, tolerance: f64) -> Option<&VObject> {
        self.iter()
            .rev()
            .filter(|layer| layer.is_interactive())
            .find_map(|layer| {
                layer
                    .objects()
                    .iter()
                    .rev()
                    .find(|obj| !obj.is_locked() && obj.hit_test(p, tolerance))
            })
    }

    pub fn to_states(&self) -> Vec<LayerState> {
        self.iter().map(Layer::to_state).collect()
    }

    /// Replaces every layer with the given snapshots.
    ///
    /// Snapshots that fail to rebuild are skipped.
    pub fn replace_with_states(&mut self, states: Vec<LayerState>) {
        self.clear();
        for state in states {
            let id = state.id.clone();
            let result = Layer::from_state(state).and_then(|layer| self.push(layer));
            if let Err(e) = result {
                warn!("Skipping layer {}: {}", id, e);
            }
        }
    }
}
