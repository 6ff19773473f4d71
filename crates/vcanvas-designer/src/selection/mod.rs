//! Selection and interactive manipulation.
//!
//! The handler keeps the ordered set of selected object ids, the aggregate
//! selection rectangle, and the clamp region. It drives drag, resize,
//! rotate, nudge and rubber-band gestures against the layer stack. Gestures
//! mutate live objects for immediate feedback. When a gesture ends, a
//! history command is produced from the snapshot taken at its start, so
//! undo always restores the true pre-gesture state.

mod keyboard;
mod manipulation;

pub use hit_test::{
    grip_direction, grip_positions, hit_test_selection, is_corner_grip, rotation_grip_position,
    HitTestResult,
};
pub use keyboard::{ArrowKey, NudgeAction, NudgeTracker};
pub use manipulation::{
    clamp_delta, drag_rectangle, map_member_rectangle, resize_rectangle, rotate_rectangle,
    MIN_DIMENSION,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::Collection;
use crate::geometry::{PointF, RectangleF, RotatedRectangleF};
use crate::history::Command;
use crate::layer::Layer;
use crate::math::{is_right_angle_multiple, EPSILON};
use crate::model::VObjectState;
use crate::permission::Permission;

/// Inset of the constrained-margin region from the workspace edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOptions {
    pub resize_grip_size: f64,
    pub rotation_grip_size: f64,
    pub rotation_grip_line_length: f64,
    /// Rotation snaps to right angles within this many degrees.
    pub snap_angle_threshold: f64,
    pub allow_negative_resize: bool,
    pub constrained_margin_enabled: bool,
    pub margin: Margin,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            resize_grip_size: 8.0,
            rotation_grip_size: 8.0,
            rotation_grip_line_length: 20.0,
            snap_angle_threshold: 5.0,
            allow_negative_resize: false,
            constrained_margin_enabled: false,
            margin: Margin::default(),
        }
    }
}

/// The grip engaged by a transform gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Drag,
    Resize(u8),
    Rotate,
    Nudge,
}

/// Result of finishing a gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureEnd {
    /// Undo command for the gesture, when it changed anything.
    pub command: Option<Command>,
    pub selection_changed: bool,
}

#[derive(Debug, Clone)]
struct Snapshot {
    id: String,
    rectangle: RotatedRectangleF,
    state: VObjectState,
}

#[derive(Debug, Clone)]
struct TransformGesture {
    operation: Operation,
    start_point: PointF,
    start_rectangle: RotatedRectangleF,
    rectangle: RotatedRectangleF,
    permission: Permission,
    region: Option<RectangleF>,
    snapshots: Vec<Snapshot>,
    nudge_offset: PointF,
}

#[derive(Debug, Clone, Default)]
enum Interaction {
    #[default]
    Idle,
    Transform(TransformGesture),
    RubberBand {
        start: PointF,
        current: PointF,
        additive: bool,
    },
}

#[derive(Debug, Default)]
pub struct SelectionHandler {
    options: SelectionOptions,
    workspace: RectangleF,
    selected: Vec<String>,
    current: Option<String>,
    rectangle: Option<RotatedRectangleF>,
    region: Option<RectangleF>,
    interaction: Interaction,
    nudge: NudgeTracker,
}

impl SelectionHandler {
    pub fn new(options: SelectionOptions, workspace: RectangleF) -> Self {
        Self {
            options,
            workspace,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SelectionOptions) {
        self.options = options;
    }

    pub fn workspace(&self) -> RectangleF {
        self.workspace
    }

    pub fn set_workspace(&mut self, workspace: RectangleF) {
        self.workspace = workspace;
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    /// The focused object within the selection.
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Aggregate selection rectangle, `None` when nothing is selected.
    pub fn rectangle(&self) -> Option<RotatedRectangleF> {
        self.rectangle
    }

    /// Active clamp region, `None` when unconstrained.
    pub fn region(&self) -> Option<RectangleF> {
        self.region
    }

    pub fn operation(&self) -> Option<Operation> {
        match &self.interaction {
            Interaction::Transform(g) => Some(g.operation),
            _ => None,
        }
    }

    pub fn is_interacting(&self) -> bool {
        !matches!(self.interaction, Interaction::Idle)
    }

    /// Normalized rubber-band rectangle while one is being dragged.
    pub fn rubber_band(&self) -> Option<RectangleF> {
        match &self.interaction {
            Interaction::RubberBand { start, current, .. } => {
                RectangleF::from_points([*start, *current])
            }
            _ => None,
        }
    }

    fn is_selectable(layers: &Collection<Layer>, id: &str) -> bool {
        let Some(layer) = layers.layer_of(id) else {
            return false;
        };
        layer.is_interactive()
            && layer
                .objects()
                .find(id)
                .map(|obj| obj.is_visible() && !obj.is_locked())
                .unwrap_or(false)
    }

    /// Adds `id` to the selection and focuses it.
    pub fn select(&mut self, layers: &Collection<Layer>, id: &str) -> bool {
        if !Self::is_selectable(layers, id) {
            return false;
        }
        if !self.is_selected(id) {
            self.selected.push(id.to_string());
        }
        self.current = Some(id.to_string());
        self.update_rectangle(layers);
        true
    }

    /// Replaces the selection with `id`.
    pub fn select_only(&mut self, layers: &Collection<Layer>, id: &str) -> bool {
        if !Self::is_selectable(layers, id) {
            return false;
        }
        self.selected.clear();
        self.select(layers, id)
    }

    pub fn toggle(&mut self, layers: &Collection<Layer>, id: &str) -> bool {
        if self.is_selected(id) {
            self.deselect(layers, id)
        } else {
            self.select(layers, id)
        }
    }

    pub fn deselect(&mut self, layers: &Collection<Layer>, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != id);
        if self.selected.len() == before {
            return false;
        }
        if self.current.as_deref() == Some(id) {
            self.current = self.selected.last().cloned();
        }
        self.update_rectangle(layers);
        true
    }

    pub fn set_selection<I, S>(&mut self, layers: &Collection<Layer>, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.selected.clone();
        self.selected.clear();
        for id in ids {
            let id = id.as_ref();
            if Self::is_selectable(layers, id) && !self.is_selected(id) {
                self.selected.push(id.to_string());
            }
        }
        self.current = self.selected.last().cloned();
        self.update_rectangle(layers);
        before != self.selected
    }

    pub fn select_all(&mut self, layers: &Collection<Layer>) -> bool {
        let ids: Vec<String> = layers
            .iter()
            .filter(|layer| layer.is_interactive())
            .flat_map(|layer| layer.objects().iter())
            .filter(|obj| obj.is_visible() && !obj.is_locked())
            .map(|obj| obj.id().to_string())
            .collect();
        self.set_selection(layers, ids)
    }

    pub fn clear(&mut self) -> bool {
        let had = !self.selected.is_empty();
        self.selected.clear();
        self.current = None;
        self.rectangle = None;
        self.region = None;
        self.interaction = Interaction::Idle;
        self.nudge.reset();
        had
    }

    /// Drops ids that no longer resolve to a selectable object.
    pub fn prune(&mut self, layers: &Collection<Layer>) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| Self::is_selectable(layers, id));
        let changed = self.selected.len() != before;
        if let Some(current) = &self.current {
            if !self.selected.contains(current) {
                self.current = self.selected.last().cloned();
            }
        }
        self.update_rectangle(layers);
        changed
    }

    /// Recomputes the aggregate rectangle and the clamp region.
    ///
    /// A single object contributes its own rotated rectangle; several
    /// objects produce the axis-aligned union of their bounds.
    pub fn update_rectangle(&mut self, layers: &Collection<Layer>) {
        let rects: Vec<RotatedRectangleF> = self
            .selected
            .iter()
            .filter_map(|id| layers.find_object(id))
            .map(|obj| obj.rectangle())
            .collect();
        self.rectangle = match rects.as_slice() {
            [] => None,
            [single] => Some(*single),
            [first, rest @ ..] => {
                let bounds = rest
                    .iter()
                    .fold(first.get_bounds(), |acc, r| RectangleF::union(&acc, &r.get_bounds()));
                Some(RotatedRectangleF::from_rectangle(&bounds))
            }
        };
        self.region = self.compute_region(layers);
    }

    /// Intersection of the margin region (when enabled) and the regions of
    /// every layer holding a selected object.
    pub fn compute_region(&self, layers: &Collection<Layer>) -> Option<RectangleF> {
        let mut region = if self.options.constrained_margin_enabled {
            let m = self.options.margin;
            let ws = self.workspace;
            Some(RectangleF::from_ltrb(
                ws.left + m.left,
                ws.top + m.top,
                ws.right() - m.right,
                ws.bottom() - m.bottom,
            ))
        } else {
            None
        };

        let mut seen: Vec<&str> = Vec::new();
        for id in &self.selected {
            let Some(layer) = layers.layer_of(id) else {
                continue;
            };
            if seen.contains(&layer.id()) {
                continue;
            }
            seen.push(layer.id());
            if let Some(layer_region) = layer.region() {
                region = Some(match region {
                    Some(r) => RectangleF::intersect(&r, &layer_region),
                    None => layer_region,
                });
            }
        }
        region
    }

    /// Permission for manipulating the whole selection.
    ///
    /// Flags are AND-ed across objects. Arbitrary resize is also disabled
    /// when any object is not at a right angle to the selection rectangle.
    pub fn effective_permission(&self, layers: &Collection<Layer>) -> Permission {
        let Some(rect) = self.rectangle else {
            return Permission::none();
        };
        let objects: Vec<_> = self
            .selected
            .iter()
            .filter_map(|id| layers.find_object(id))
            .collect();
        if objects.is_empty() {
            return Permission::none();
        }
        let mut permission = objects
            .iter()
            .fold(Permission::default(), |acc, obj| acc.intersect(&obj.effective_permission()));
        if objects
            .iter()
            .any(|obj| !is_right_angle_multiple(obj.rectangle().angle - rect.angle))
        {
            permission.allow_arbitrary_resize = false;
        }
        permission
    }

    pub fn hit_test(&self, layers: &Collection<Layer>, p: PointF) -> HitTestResult {
        match self.rectangle {
            Some(rect) => hit_test_selection(&rect, p, &self.effective_permission(layers), &self.options),
            None => HitTestResult::default(),
        }
    }

    /// Starts the gesture that `hit` engages: rotation first, then resize,
    /// then body drag.
    pub fn begin_transform(
        &mut self,
        layers: &Collection<Layer>,
        p: PointF,
        hit: &HitTestResult,
    ) -> bool {
        let operation = if hit.rotate {
            Operation::Rotate
        } else if hit.resize {
            Operation::Resize(hit.resize_index)
        } else if hit.body && hit.can_drag() {
            Operation::Drag
        } else {
            return false;
        };
        self.start_gesture(layers, operation, p)
    }

    fn start_gesture(&mut self, layers: &Collection<Layer>, operation: Operation, p: PointF) -> bool {
        if self.is_interacting() {
            return false;
        }
        let Some(rect) = self.rectangle else {
            return false;
        };
        let snapshots: Vec<Snapshot> = self
            .selected
            .iter()
            .filter_map(|id| layers.find_object(id))
            .map(|obj| Snapshot {
                id: obj.id().to_string(),
                rectangle: obj.rectangle(),
                state: obj.to_state(),
            })
            .collect();
        if snapshots.is_empty() {
            return false;
        }
        debug!("Begin {:?} on {} object(s)", operation, snapshots.len());
        self.interaction = Interaction::Transform(TransformGesture {
            operation,
            start_point: p,
            start_rectangle: rect,
            rectangle: rect,
            permission: self.effective_permission(layers),
            region: self.region,
            snapshots,
            nudge_offset: PointF::ORIGIN,
        });
        true
    }

    pub fn begin_rubber_band(&mut self, p: PointF, additive: bool) {
        self.interaction = Interaction::RubberBand {
            start: p,
            current: p,
            additive,
        };
    }

    /// Feeds a pointer position into the active gesture. Returns whether
    /// anything visible changed.
    pub fn update_pointer(&mut self, layers: &mut Collection<Layer>, p: PointF, snap: bool) -> bool {
        let options = &self.options;
        match &mut self.interaction {
            Interaction::Idle => false,
            Interaction::RubberBand { current, .. } => {
                *current = p;
                true
            }
            Interaction::Transform(gesture) => {
                let start = gesture.start_rectangle;
                let next = match gesture.operation {
                    Operation::Drag => drag_rectangle(
                        &start,
                        p - gesture.start_point,
                        gesture.permission.allow_move_horizontal,
                        gesture.permission.allow_move_vertical,
                        gesture.region.as_ref(),
                    ),
                    Operation::Resize(index) => resize_rectangle(
                        &start,
                        index,
                        gesture.start_point,
                        p,
                        options.allow_negative_resize,
                    ),
                    Operation::Rotate => rotate_rectangle(
                        &start,
                        gesture.start_point,
                        p,
                        snap,
                        options.snap_angle_threshold,
                    ),
                    Operation::Nudge => return false,
                };
                if matches!(gesture.operation, Operation::Resize(_) | Operation::Rotate) {
                    if let Some(region) = gesture.region {
                        if !region.inflate(EPSILON, EPSILON).contains_rect(&next.get_bounds()) {
                            return false;
                        }
                    }
                }
                let changed = Self::apply_gesture(layers, gesture, next);
                if changed {
                    self.rectangle = Some(next);
                }
                changed
            }
        }
    }

    fn apply_gesture(
        layers: &mut Collection<Layer>,
        gesture: &mut TransformGesture,
        next: RotatedRectangleF,
    ) -> bool {
        if next.is_equal(&gesture.rectangle) {
            return false;
        }
        gesture.rectangle = next;
        let single = gesture.snapshots.len() == 1;
        for snapshot in &gesture.snapshots {
            let Some(obj) = layers.find_object_mut(&snapshot.id) else {
                continue;
            };
            let target = if single {
                next
            } else {
                map_member_rectangle(&snapshot.rectangle, &gesture.start_rectangle, &next)
            };
            obj.set_rectangle(&target);
        }
        true
    }

    /// Finishes the active gesture.
    pub fn end_gesture(&mut self, layers: &mut Collection<Layer>) -> GestureEnd {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => GestureEnd::default(),
            Interaction::RubberBand {
                start,
                current,
                additive,
            } => {
                let selection_changed = self.finish_rubber_band(layers, start, current, additive);
                GestureEnd {
                    command: None,
                    selection_changed,
                }
            }
            Interaction::Transform(gesture) => {
                let command = Self::commit(layers, &gesture);
                self.update_rectangle(layers);
                GestureEnd {
                    command,
                    selection_changed: false,
                }
            }
        }
    }

    /// Abandons the active gesture and restores the objects.
    pub fn cancel_gesture(&mut self, layers: &mut Collection<Layer>) {
        if let Interaction::Transform(gesture) = std::mem::take(&mut self.interaction) {
            Self::restore(layers, &gesture);
        }
        self.nudge.reset();
        self.update_rectangle(layers);
    }

    fn restore(layers: &mut Collection<Layer>, gesture: &TransformGesture) {
        for snapshot in &gesture.snapshots {
            if let Some(obj) = layers.find_object_mut(&snapshot.id) {
                if obj.to_state() != snapshot.state {
                    obj.apply_state(&snapshot.state);
                }
            }
        }
    }

    fn commit(layers: &mut Collection<Layer>, gesture: &TransformGesture) -> Option<Command> {
        if gesture.rectangle.is_equal(&gesture.start_rectangle) {
            Self::restore(layers, gesture);
            return None;
        }
        let mut commands: Vec<Command> = gesture
            .snapshots
            .iter()
            .filter_map(|snapshot| {
                let after = layers.find_object(&snapshot.id)?.to_state();
                (after != snapshot.state)
                    .then(|| Command::vobject_changed(snapshot.state.clone(), after))
            })
            .collect();
        debug!("Commit {:?}: {} object(s) changed", gesture.operation, commands.len());
        match commands.len() {
            0 => None,
            1 => commands.pop(),
            _ => Some(Command::group(commands)),
        }
    }

    fn finish_rubber_band(
        &mut self,
        layers: &Collection<Layer>,
        start: PointF,
        current: PointF,
        additive: bool,
    ) -> bool {
        let Some(band) = RectangleF::from_points([start, current]) else {
            return false;
        };
        let hits: Vec<String> = layers
            .iter()
            .filter(|layer| layer.is_interactive())
            .flat_map(|layer| layer.objects().iter())
            .filter(|obj| obj.is_visible() && !obj.is_locked())
            .filter(|obj| band.contains(obj.rectangle().center()))
            .map(|obj| obj.id().to_string())
            .collect();
        let mut ids = if additive { self.selected.clone() } else { Vec::new() };
        ids.extend(hits);
        self.set_selection(layers, ids)
    }

    /// Handles an arrow keydown. The first press snapshots the selection;
    /// every press moves it by `step` canvas units.
    pub fn nudge_key_down(&mut self, layers: &mut Collection<Layer>, key: ArrowKey, step: f64) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        let nudging = matches!(&self.interaction, Interaction::Transform(g) if g.operation == Operation::Nudge);
        if self.is_interacting() && !nudging {
            return false;
        }
        if self.nudge.key_down(key) == NudgeAction::Begin
            && !self.start_gesture(layers, Operation::Nudge, PointF::ORIGIN)
        {
            self.nudge.reset();
            return false;
        }
        let Interaction::Transform(gesture) = &mut self.interaction else {
            return false;
        };
        gesture.nudge_offset = gesture.nudge_offset + key.direction() * step;
        let next = drag_rectangle(
            &gesture.start_rectangle,
            gesture.nudge_offset,
            gesture.permission.allow_move_horizontal,
            gesture.permission.allow_move_vertical,
            gesture.region.as_ref(),
        );
        let changed = Self::apply_gesture(layers, gesture, next);
        if changed {
            self.rectangle = Some(next);
        }
        changed
    }

    /// Handles an arrow keyup; releasing the last held arrow commits.
    pub fn nudge_key_up(&mut self, layers: &mut Collection<Layer>, key: ArrowKey) -> Option<Command> {
        if self.nudge.key_up(key) != NudgeAction::Commit {
            return None;
        }
        let nudging = matches!(&self.interaction, Interaction::Transform(g) if g.operation == Operation::Nudge);
        if !nudging {
            return None;
        }
        self.end_gesture(layers).command
    }
}
