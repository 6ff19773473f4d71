//! V-object model.
//!
//! Every v-object shares one component set (transform, control points,
//! permission, flags) and a closed [`VObjectKind`] for the variant specific
//! data. Variants implement [`VObjectBehavior`] for drawing and hit-testing
//! and `VObjectKind` dispatches to them.

mod content;
mod factory;
mod grid;
mod line;
mod placeholder;
mod shape;
mod style;

pub use content::{ImageData, SvgData, TextData};
pub use factory::{ObjectConstructor, ObjectFactory};
pub use grid::GridData;
pub use line::{LineData, PolylineData};
pub use placeholder::PlaceholderData;
pub use shape::{ShapeData, ShapeKind};
pub use style::{Color, Stroke};

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::geometry::{Matrix, PointF, RectangleF, RotatedRectangleF};
use crate::ids::new_unique_id;
use crate::math::are_equal;
use crate::permission::Permission;
use crate::render::{ContentState, DrawingSurface, RenderError};
use crate::transform::Transform;

/// Control points of a v-object: the untransformed geometry anchors.
pub type ControlPoints = SmallVec<[PointF; 4]>;

/// Geometry handed to a variant when it draws or hit-tests.
#[derive(Debug, Clone)]
pub struct ObjectFrame<'a> {
    /// Axis-aligned bounds of the control points.
    pub base: RectangleF,
    /// Canvas-space rectangle (base with the transform applied).
    pub rectangle: RotatedRectangleF,
    /// Maps control-point space to canvas space.
    pub matrix: Matrix,
    pub control_points: &'a [PointF],
    pub opacity: f64,
    pub content: Option<&'a ContentState>,
}

impl ObjectFrame<'_> {
    pub fn world_points(&self) -> Vec<PointF> {
        self.control_points
            .iter()
            .map(|p| self.matrix.transform_point(*p))
            .collect()
    }
}

/// Drawing and hit-testing capability of a v-object variant.
pub trait VObjectBehavior {
    /// Stable type tag, also accepted by [`ObjectFactory`].
    fn type_name(&self) -> &'static str;

    fn draw(&self, frame: &ObjectFrame<'_>, surface: &mut dyn DrawingSurface)
        -> Result<(), RenderError>;

    fn hit_test(&self, frame: &ObjectFrame<'_>, p: PointF, _tolerance: f64) -> bool {
        frame.rectangle.contains(p)
    }

    /// Whether pixels for this variant come from the render service.
    fn needs_render_service(&self) -> bool {
        false
    }
}

/// Variant data. Serialized with a `__type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type")]
pub enum VObjectKind {
    Shape(ShapeData),
    Line(LineData),
    Polyline(PolylineData),
    Grid(GridData),
    Image(ImageData),
    Text(TextData),
    Svg(SvgData),
    Placeholder(PlaceholderData),
}

impl VObjectKind {
    pub fn behavior(&self) -> &dyn VObjectBehavior {
        match self {
            VObjectKind::Shape(d) => d,
            VObjectKind::Line(d) => d,
            VObjectKind::Polyline(d) => d,
            VObjectKind::Grid(d) => d,
            VObjectKind::Image(d) => d,
            VObjectKind::Text(d) => d,
            VObjectKind::Svg(d) => d,
            VObjectKind::Placeholder(d) => d,
        }
    }

    pub fn is_content(&self) -> bool {
        matches!(
            self,
            VObjectKind::Image(_) | VObjectKind::Text(_) | VObjectKind::Svg(_)
        )
    }
}

/// How other objects' bounded text flows around this object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WrappingMode {
    #[default]
    None,
    Square,
    Tight,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Serialized snapshot of a v-object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VObjectState {
    #[serde(default = "new_unique_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: VObjectKind,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub control_points: ControlPoints,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub wrapping_mode: WrappingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Box<VObjectState>>,
}

/// A vector object placed on a layer.
#[derive(Debug)]
pub struct VObject {
    id: String,
    name: String,
    kind: VObjectKind,
    transform: Transform,
    control_points: ControlPoints,
    permission: Permission,
    visible: bool,
    locked: bool,
    opacity: f64,
    wrapping_mode: WrappingMode,
    /// Nested content of a placeholder.
    content: Option<Box<VObject>>,
    layer_id: Option<String>,
    content_state: ContentState,
    changed: bool,
}

impl VObject {
    /// Creates a detached object whose control points are the corners of
    /// `rect`.
    pub fn new(kind: VObjectKind, rect: RectangleF) -> Self {
        let points = smallvec![
            PointF::new(rect.left, rect.top),
            PointF::new(rect.right(), rect.bottom())
        ];
        Self::with_control_points(kind, points)
    }

    pub fn with_control_points(kind: VObjectKind, control_points: ControlPoints) -> Self {
        let mut obj = Self {
            id: new_unique_id(),
            name: String::new(),
            kind,
            transform: Transform::identity(),
            control_points,
            permission: Permission::default(),
            visible: true,
            locked: false,
            opacity: 1.0,
            wrapping_mode: WrappingMode::None,
            content: None,
            layer_id: None,
            content_state: ContentState::default(),
            changed: false,
        };
        if obj.needs_render_service() {
            obj.content_state.mark_dirty();
        }
        obj
    }

    pub fn rectangle_shape(rect: RectangleF) -> Self {
        Self::new(VObjectKind::Shape(ShapeData::new(ShapeKind::Rectangle)), rect)
    }

    pub fn ellipse(rect: RectangleF) -> Self {
        Self::new(VObjectKind::Shape(ShapeData::new(ShapeKind::Ellipse)), rect)
    }

    pub fn line(from: PointF, to: PointF) -> Self {
        Self::with_control_points(VObjectKind::Line(LineData::default()), smallvec![from, to])
    }

    pub fn dashed_line(from: PointF, to: PointF, dash: Vec<f64>) -> Self {
        Self::with_control_points(VObjectKind::Line(LineData::dashed(dash)), smallvec![from, to])
    }

    pub fn polyline(points: &[PointF], closed: bool) -> Self {
        let data = PolylineData {
            closed,
            ..PolylineData::default()
        };
        Self::with_control_points(VObjectKind::Polyline(data), points.iter().copied().collect())
    }

    pub fn grid(rect: RectangleF, step_x: f64, step_y: f64) -> Self {
        let data = GridData {
            step_x,
            step_y,
            ..GridData::default()
        };
        Self::new(VObjectKind::Grid(data), rect)
    }

    pub fn image(rect: RectangleF, source: impl Into<String>) -> Self {
        let data = ImageData {
            source: source.into(),
        };
        Self::new(VObjectKind::Image(data), rect)
    }

    pub fn svg(rect: RectangleF, source: impl Into<String>) -> Self {
        let data = SvgData {
            source: source.into(),
        };
        Self::new(VObjectKind::Svg(data), rect)
    }

    pub fn text(rect: RectangleF, text: impl Into<String>, bounded: bool) -> Self {
        let data = TextData {
            text: text.into(),
            bounded,
            ..TextData::default()
        };
        Self::new(VObjectKind::Text(data), rect)
    }

    pub fn placeholder(rect: RectangleF) -> Self {
        Self::new(VObjectKind::Placeholder(PlaceholderData::default()), rect)
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

    pub fn kind(&self) -> &VObjectKind {
        &self.kind
    }

    /// Mutable access to the variant data; marks the object changed and
    /// schedules a content refresh for render-service variants.
    pub fn kind_mut(&mut self) -> &mut VObjectKind {
        self.changed = true;
        if self.needs_render_service() {
            self.content_state.mark_dirty();
        }
        &mut self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.behavior().type_name()
    }

    pub fn needs_render_service(&self) -> bool {
        self.kind.behavior().needs_render_service()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Scoped mutable access to the transform.
    ///
    /// The object is marked changed when the guard is dropped if any
    /// component was modified.
    pub fn update_transform(&mut self) -> TransformGuard<'_> {
        TransformGuard { object: self }
    }

    pub fn control_points(&self) -> &[PointF] {
        &self.control_points
    }

    pub fn set_control_points(&mut self, points: ControlPoints) {
        self.control_points = points;
        self.changed = true;
    }

    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    /// Permission governing manipulation. An editing placeholder defers to
    /// its content.
    pub fn effective_permission(&self) -> Permission {
        match self.editing_content() {
            Some(content) => content.permission,
            None => self.permission,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.changed = true;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        if !are_equal(self.opacity, opacity) {
            self.opacity = opacity;
            self.changed = true;
        }
    }

    pub fn wrapping_mode(&self) -> WrappingMode {
        self.wrapping_mode
    }

    pub fn set_wrapping_mode(&mut self, mode: WrappingMode) {
        self.wrapping_mode = mode;
        self.changed = true;
    }

    /// Id of the owning layer, if the object is placed.
    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    pub(crate) fn set_layer_id(&mut self, layer_id: Option<String>) {
        self.layer_id = layer_id;
    }

    pub fn content(&self) -> Option<&VObject> {
        self.content.as_deref()
    }

    pub fn content_mut(&mut self) -> Option<&mut VObject> {
        self.content.as_deref_mut()
    }

    /// Replaces the nested content of a placeholder.
    pub fn set_content(&mut self, content: Option<VObject>) {
        self.content = content.map(Box::new);
        if let VObjectKind::Placeholder(data) = &mut self.kind {
            if self.content.is_none() {
                data.editing = false;
            }
        }
        self.changed = true;
    }

    pub fn is_editing(&self) -> bool {
        matches!(&self.kind, VObjectKind::Placeholder(data) if data.editing)
    }

    fn editing_content(&self) -> Option<&VObject> {
        if self.is_editing() {
            self.content.as_deref()
        } else {
            None
        }
    }

    /// Switches a placeholder into edit mode.
    ///
    /// Requires edit permission and real (non-stub) content; returns whether
    /// edit mode is active afterwards.
    pub fn enter_edit_mode(&mut self) -> bool {
        let allowed = self.permission.allow_edit_content && self.content.is_some();
        match &mut self.kind {
            VObjectKind::Placeholder(data) if allowed && !data.stub_content => {
                data.editing = true;
                true
            }
            _ => false,
        }
    }

    pub fn exit_edit_mode(&mut self) {
        if let VObjectKind::Placeholder(data) = &mut self.kind {
            data.editing = false;
        }
    }

    /// Bounds of the control points before the transform is applied.
    pub fn base_rectangle(&self) -> RectangleF {
        RectangleF::from_points(self.control_points.iter().copied()).unwrap_or_default()
    }

    fn own_rectangle(&self) -> RotatedRectangleF {
        let mut rect = RotatedRectangleF::from_rectangle(&self.base_rectangle());
        rect.set_transform(&self.transform);
        rect
    }

    /// Canvas-space rectangle. An editing placeholder reports its content's.
    pub fn rectangle(&self) -> RotatedRectangleF {
        match self.editing_content() {
            Some(content) => content.rectangle(),
            None => self.own_rectangle(),
        }
    }

    /// Moves the object so that its rectangle becomes `rect`.
    pub fn set_rectangle(&mut self, rect: &RotatedRectangleF) {
        if self.is_editing() {
            if let Some(content) = self.content.as_deref_mut() {
                content.set_rectangle(rect);
                self.changed = true;
                return;
            }
        }
        let old = self.own_rectangle();
        let base = RotatedRectangleF::from_rectangle(&self.base_rectangle());
        let t = rect.get_transform(&base);
        self.update_transform().copy_from(&t);
        let resized = !are_equal(old.width, rect.width) || !are_equal(old.height, rect.height);
        if resized && self.needs_render_service() {
            self.content_state.mark_dirty();
        }
    }

    /// Maps control-point space to canvas space.
    pub fn matrix(&self) -> Matrix {
        self.transform.to_matrix(self.base_rectangle().center())
    }

    pub fn frame(&self) -> ObjectFrame<'_> {
        ObjectFrame {
            base: self.base_rectangle(),
            rectangle: self.own_rectangle(),
            matrix: self.matrix(),
            control_points: &self.control_points,
            opacity: self.opacity,
            content: Some(&self.content_state),
        }
    }

    pub fn hit_test(&self, p: PointF, tolerance: f64) -> bool {
        if !self.visible {
            return false;
        }
        if let Some(content) = self.editing_content() {
            if content.hit_test(p, tolerance) {
                return true;
            }
        }
        self.kind.behavior().hit_test(&self.frame(), p, tolerance)
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface) -> Result<(), RenderError> {
        if !self.visible || self.permission.no_show {
            return Ok(());
        }
        let frame = self.frame();
        self.kind.behavior().draw(&frame, surface)?;
        if let (VObjectKind::Placeholder(data), Some(content)) = (&self.kind, self.content()) {
            surface.clip_to_path(&data.frame.outline(&frame))?;
            let result = content.draw(surface);
            surface.reset_clip();
            result?;
        }
        Ok(())
    }

    /// Whether this is bounded text that flows around other objects.
    pub fn is_bounded_text(&self) -> bool {
        matches!(&self.kind, VObjectKind::Text(data) if data.bounded)
    }

    /// Stores the wrapping rectangles of bounded text. Content is marked
    /// dirty only when the list or the text size actually changed.
    pub fn update_text_wrapping(&mut self, rectangles: Vec<RotatedRectangleF>) -> bool {
        let rect = self.own_rectangle();
        let VObjectKind::Text(data) = &mut self.kind else {
            return false;
        };
        if !data.bounded || !data.update_wrapping((rect.width, rect.height), rectangles) {
            return false;
        }
        self.changed = true;
        self.content_state.mark_dirty();
        true
    }

    pub fn content_state(&self) -> &ContentState {
        &self.content_state
    }

    pub fn content_state_mut(&mut self) -> &mut ContentState {
        &mut self.content_state
    }

    /// Returns and clears the changed flag.
    pub fn take_changed(&mut self) -> bool {
        let transform_changed = self.transform.take_changed();
        std::mem::take(&mut self.changed) || transform_changed
    }

    pub fn to_state(&self) -> VObjectState {
        VObjectState {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            transform: self.transform.clone(),
            control_points: self.control_points.clone(),
            permission: self.permission,
            visible: self.visible,
            locked: self.locked,
            opacity: self.opacity,
            wrapping_mode: self.wrapping_mode,
            content: self.content.as_ref().map(|c| Box::new(c.to_state())),
        }
    }

    /// Builds a detached object from a snapshot, keeping its id.
    pub fn from_state(state: VObjectState) -> Self {
        let mut obj = Self::with_control_points(state.kind, state.control_points);
        obj.id = state.id;
        obj.name = state.name;
        obj.transform = state.transform;
        obj.permission = state.permission;
        obj.visible = state.visible;
        obj.locked = state.locked;
        obj.opacity = state.opacity;
        obj.wrapping_mode = state.wrapping_mode;
        obj.content = state.content.map(|c| Box::new(VObject::from_state(*c)));
        obj
    }

    /// Overwrites the persistent fields with `state`, keeping the owner and
    /// the rendered content.
    pub fn apply_state(&mut self, state: &VObjectState) {
        let old_size = {
            let r = self.own_rectangle();
            (r.width, r.height)
        };
        let kind_changed = self.kind != state.kind;

        self.name = state.name.clone();
        self.kind = state.kind.clone();
        self.transform.copy_from(&state.transform);
        self.control_points = state.control_points.clone();
        self.permission = state.permission;
        self.visible = state.visible;
        self.locked = state.locked;
        self.opacity = state.opacity;
        self.wrapping_mode = state.wrapping_mode;
        match (&mut self.content, &state.content) {
            (Some(current), Some(next)) if current.id == next.id => current.apply_state(next),
            (slot, next) => *slot = next.as_ref().map(|c| Box::new(VObject::from_state((**c).clone()))),
        }
        self.changed = true;

        let new_rect = self.own_rectangle();
        let resized = !are_equal(old_size.0, new_rect.width) || !are_equal(old_size.1, new_rect.height);
        if self.needs_render_service() && (kind_changed || resized) {
            self.content_state.mark_dirty();
        }
    }

    /// Detached copy with fresh ids.
    pub fn duplicate(&self) -> VObject {
        let mut state = self.to_state();
        refresh_ids(&mut state);
        VObject::from_state(state)
    }
}

fn refresh_ids(state: &mut VObjectState) {
    state.id = new_unique_id();
    if let Some(content) = state.content.as_deref_mut() {
        refresh_ids(content);
    }
}

/// Scoped transform access returned by [`VObject::update_transform`].
pub struct TransformGuard<'a> {
    object: &'a mut VObject,
}

impl Deref for TransformGuard<'_> {
    type Target = Transform;

    fn deref(&self) -> &Transform {
        &self.object.transform
    }
}

impl DerefMut for TransformGuard<'_> {
    fn deref_mut(&mut self) -> &mut Transform {
        &mut self.object.transform
    }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        if self.object.transform.take_changed() {
            self.object.changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> VObject {
        VObject::rectangle_shape(RectangleF::new(75.0, 75.0, 50.0, 50.0))
    }

    #[test]
    fn test_rectangle_from_control_points() {
        let obj = square();
        assert!(obj
            .rectangle()
            .is_equal(&RotatedRectangleF::new(100.0, 100.0, 50.0, 50.0, 0.0)));
    }

    #[test]
    fn test_set_rectangle_round_trip() {
        let mut obj = square();
        let target = RotatedRectangleF::new(10.0, 20.0, 30.0, 80.0, 33.0);
        obj.set_rectangle(&target);
        assert!(obj.rectangle().is_equal(&target));
        assert!(obj.take_changed());
        assert!(!obj.take_changed());
    }

    #[test]
    fn test_transform_guard_marks_changed_only_on_mutation() {
        let mut obj = square();
        {
            let guard = obj.update_transform();
            assert_eq!(guard.angle(), 0.0);
        }
        assert!(!obj.take_changed());
        obj.update_transform().set_angle(45.0);
        assert!(obj.take_changed());
    }

    #[test]
    fn test_hit_test_rotated_rectangle() {
        let mut obj = square();
        obj.set_rectangle(&RotatedRectangleF::new(100.0, 100.0, 100.0, 10.0, 90.0));
        assert!(obj.hit_test(PointF::new(100.0, 140.0), 0.5));
        assert!(!obj.hit_test(PointF::new(140.0, 100.0), 0.5));
    }

    #[test]
    fn test_line_hit_test_uses_segment_distance() {
        let line = VObject::line(PointF::new(0.0, 0.0), PointF::new(100.0, 100.0));
        assert!(line.hit_test(PointF::new(50.0, 51.0), 2.0));
        assert!(!line.hit_test(PointF::new(50.0, 60.0), 2.0));
        assert_eq!(line.type_name(), "Line");
    }

    #[test]
    fn test_ellipse_hit_test_excludes_corners() {
        let e = VObject::ellipse(RectangleF::new(0.0, 0.0, 100.0, 100.0));
        assert!(e.hit_test(PointF::new(50.0, 50.0), 0.5));
        assert!(!e.hit_test(PointF::new(3.0, 3.0), 0.5));
    }

    #[test]
    fn test_state_round_trip_keeps_id() {
        let mut obj = VObject::text(RectangleF::new(0.0, 0.0, 10.0, 10.0), "hello", true);
        obj.set_rectangle(&RotatedRectangleF::new(5.0, 5.0, 20.0, 10.0, 15.0));
        let json = serde_json::to_string(&obj.to_state()).unwrap();
        assert!(json.contains("\"__type\":\"Text\""));

        let back: VObjectState = serde_json::from_str(&json).unwrap();
        let restored = VObject::from_state(back);
        assert_eq!(restored.id(), obj.id());
        assert!(restored.rectangle().is_equal(&obj.rectangle()));
        assert_eq!(restored.to_state(), obj.to_state());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let state: VObjectState = serde_json::from_str(r#"{"__type":"Grid","id":"g1"}"#).unwrap();
        assert_eq!(state.id, "g1");
        assert!(state.visible);
        assert_eq!(state.opacity, 1.0);
        assert_eq!(state.kind, VObjectKind::Grid(GridData::default()));
    }

    #[test]
    fn test_placeholder_edit_mode_delegates() {
        let mut ph = VObject::placeholder(RectangleF::new(0.0, 0.0, 100.0, 100.0));
        assert!(!ph.enter_edit_mode());

        let mut image = VObject::image(RectangleF::new(10.0, 10.0, 20.0, 20.0), "img-1");
        image.set_permission(Permission {
            allow_rotate: false,
            ..Permission::default()
        });
        ph.set_content(Some(image));
        assert!(ph.effective_permission().allow_rotate);

        assert!(ph.enter_edit_mode());
        assert!(!ph.effective_permission().allow_rotate);

        let target = RotatedRectangleF::new(50.0, 50.0, 40.0, 40.0, 0.0);
        ph.set_rectangle(&target);
        assert!(ph.content().unwrap().rectangle().is_equal(&target));
        assert!(ph
            .base_rectangle()
            .is_equal(&RectangleF::new(0.0, 0.0, 100.0, 100.0)));

        ph.exit_edit_mode();
        assert!(ph
            .rectangle()
            .is_equal(&RotatedRectangleF::new(50.0, 50.0, 100.0, 100.0, 0.0)));
    }

    #[test]
    fn test_stub_content_blocks_edit_mode() {
        let mut ph = VObject::placeholder(RectangleF::new(0.0, 0.0, 10.0, 10.0));
        ph.set_content(Some(VObject::image(RectangleF::new(0.0, 0.0, 5.0, 5.0), "stub")));
        if let VObjectKind::Placeholder(data) = ph.kind_mut() {
            data.stub_content = true;
        }
        assert!(!ph.enter_edit_mode());
    }

    #[test]
    fn test_duplicate_gets_new_ids() {
        let mut ph = VObject::placeholder(RectangleF::new(0.0, 0.0, 10.0, 10.0));
        ph.set_content(Some(VObject::image(RectangleF::new(0.0, 0.0, 5.0, 5.0), "a")));
        let copy = ph.duplicate();
        assert_ne!(copy.id(), ph.id());
        assert_ne!(copy.content().unwrap().id(), ph.content().unwrap().id());
        assert!(copy.layer_id().is_none());
    }

    #[test]
    fn test_content_objects_start_dirty() {
        let img = VObject::image(RectangleF::new(0.0, 0.0, 5.0, 5.0), "a");
        assert!(img.content_state().needs_request());
        assert!(!square().content_state().needs_request());
    }
}
