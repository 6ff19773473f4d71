//! The editing surface.
//!
//! A [`Canvas`] owns the layer stack, the undo history, the selection
//! handler and the viewport. Every mutation made through it is recorded as
//! a history command and announced on its event bus. Rendering goes
//! through a [`DrawingSurface`]; server-rendered content goes through a
//! [`RenderService`].

mod input;
mod operations;
mod redraw;
mod types;

pub use operations::ZOrder;
pub use redraw::{BusyGuard, RedrawScheduler, DEFAULT_DEBOUNCE};
pub use types::{CanvasEvent, CanvasEventCategory, CanvasState, Key, Modifiers};

use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::collection::Collection;
use crate::geometry::{PointF, RectangleF, RotatedRectangleF};
use crate::history::{Command, History, HistoryEvent};
use crate::ids::new_unique_id;
use crate::layer::Layer;
use crate::model::{Color, ObjectFactory, Stroke, VObject, WrappingMode};
use crate::render::{
    ContentUpdate, DrawingSurface, RenderError, RenderRequest, RenderResponse, RenderService,
    ServiceError,
};
use crate::selection::{grip_positions, rotation_grip_position, SelectionHandler, SelectionOptions};
use crate::viewport::Viewport;
use vcanvas_core::{EventBus, EventFilter, Result};

const SELECTION_COLOR: Color = Color::rgb(0, 120, 215);

/// Upper bound on request rounds in [`Canvas::update_content`]; each round
/// only exists because an edit landed while the previous one was in flight.
const MAX_CONTENT_ROUNDS: usize = 8;

pub struct Canvas {
    id: String,
    layers: Collection<Layer>,
    active_layer: Option<String>,
    history: History,
    selection: SelectionHandler,
    viewport: Viewport,
    factory: ObjectFactory,
    redraw: RedrawScheduler,
    events: Rc<EventBus<CanvasEvent>>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("id", &self.id)
            .field("layers", &self.layers.len())
            .field("objects", &self.layers.object_count())
            .field("history", &self.history)
            .field("selected", &self.selection.selected_ids())
            .finish()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Canvas {
    pub fn new(workspace_width: f64, workspace_height: f64) -> Self {
        Self::with_id(new_unique_id(), workspace_width, workspace_height)
    }

    pub fn with_id(id: impl Into<String>, workspace_width: f64, workspace_height: f64) -> Self {
        let id = id.into();
        let viewport = Viewport::new(workspace_width, workspace_height);
        let canvas = Self {
            layers: Collection::new(id.clone()),
            id,
            active_layer: None,
            history: History::default(),
            selection: SelectionHandler::new(SelectionOptions::default(), viewport.workspace()),
            viewport,
            factory: ObjectFactory::new(),
            redraw: RedrawScheduler::default(),
            events: Rc::new(EventBus::new()),
        };
        canvas.forward_history_events();
        canvas
    }

    fn forward_history_events(&self) {
        let events = Rc::clone(&self.events);
        self.history
            .events()
            .subscribe(EventFilter::All, move |event: &HistoryEvent| match event {
                HistoryEvent::Changed { can_undo, can_redo } => {
                    events.publish(CanvasEvent::HistoryChanged {
                        can_undo: *can_undo,
                        can_redo: *can_redo,
                    });
                }
                HistoryEvent::Overflow => {
                    events.publish(CanvasEvent::HistoryOverflow);
                }
            });
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn events(&self) -> &EventBus<CanvasEvent> {
        &self.events
    }

    pub fn layers(&self) -> &Collection<Layer> {
        &self.layers
    }

    /// Direct access to the layer stack. Changes made here bypass history.
    pub fn layers_mut(&mut self) -> &mut Collection<Layer> {
        &mut self.layers
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn selection(&self) -> &SelectionHandler {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionHandler {
        &mut self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut ObjectFactory {
        &mut self.factory
    }

    pub fn redraw_scheduler(&self) -> &RedrawScheduler {
        &self.redraw
    }

    pub fn redraw_scheduler_mut(&mut self) -> &mut RedrawScheduler {
        &mut self.redraw
    }

    pub fn set_workspace_size(&mut self, width: f64, height: f64) {
        self.viewport.set_workspace_size(width, height);
        self.selection.set_workspace(self.viewport.workspace());
        self.selection.update_rectangle(&self.layers);
    }

    pub fn object(&self, id: &str) -> Option<&VObject> {
        self.layers.find_object(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &VObject> {
        self.layers.all_objects()
    }

    /// Marks the canvas busy until the guard is dropped. Redraws requested
    /// meanwhile collapse into one trailing redraw.
    pub fn busy(&self) -> BusyGuard {
        self.redraw.busy_guard(Some(Rc::clone(&self.events)))
    }

    pub fn is_busy(&self) -> bool {
        self.redraw.is_busy()
    }

    pub fn request_redraw(&mut self) {
        let was_pending = self.redraw.is_pending();
        self.redraw.request(Instant::now());
        if !was_pending {
            self.events.publish(CanvasEvent::RedrawRequested);
        }
    }

    /// Returns true when the host should call [`Canvas::redraw`] now.
    pub fn poll_redraw(&mut self, now: Instant) -> bool {
        self.redraw.poll(now)
    }

    fn record(&mut self, command: Command) {
        self.history.add_command(command);
    }

    fn publish_selection(&self) {
        self.events.publish(CanvasEvent::SelectionChanged {
            ids: self.selection.selected_ids().to_vec(),
        });
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.selection.cancel_gesture(&mut self.layers);
        let ids = match self.history.undo(&mut self.layers)? {
            Some(command) => command.object_ids(),
            None => return Ok(false),
        };
        self.after_history_step(&ids);
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.selection.cancel_gesture(&mut self.layers);
        let ids = match self.history.redo(&mut self.layers)? {
            Some(command) => command.object_ids(),
            None => return Ok(false),
        };
        self.after_history_step(&ids);
        Ok(true)
    }

    fn after_history_step(&mut self, ids: &[String]) {
        if self.selection.prune(&self.layers) {
            self.publish_selection();
        }
        for id in ids {
            if self.layers.find_object(id).is_some() {
                self.events.publish(CanvasEvent::VObjectChanged { id: id.clone() });
            }
        }
        self.refresh_text_wrapping();
        self.request_redraw();
    }

    /// Recomputes the wrapping rectangles of every bounded text object.
    ///
    /// Returns the ids of the texts whose wrapping changed; only those need
    /// re-flowing by the render service.
    pub fn refresh_text_wrapping(&mut self) -> Vec<String> {
        let obstacles: Vec<(String, RotatedRectangleF)> = self
            .layers
            .all_objects()
            .filter(|obj| obj.is_visible() && obj.wrapping_mode() != WrappingMode::None)
            .map(|obj| (obj.id().to_string(), obj.rectangle()))
            .collect();
        let texts: Vec<(String, RotatedRectangleF)> = self
            .layers
            .all_objects()
            .filter(|obj| obj.is_bounded_text())
            .map(|obj| (obj.id().to_string(), obj.rectangle()))
            .collect();

        let mut updated = Vec::new();
        for (text_id, text_rect) in texts {
            let rects: Vec<RotatedRectangleF> = obstacles
                .iter()
                .filter(|(id, rect)| *id != text_id && rect.intersects_with(&text_rect))
                .map(|(_, rect)| *rect)
                .collect();
            if let Some(obj) = self.layers.find_object_mut(&text_id) {
                if obj.update_text_wrapping(rects) {
                    debug!("Wrapping of {} changed", text_id);
                    updated.push(text_id);
                }
            }
        }
        updated
    }

    /// Issues render requests for every content object whose content is
    /// dirty and that has no request in flight.
    pub fn pending_render_requests(&mut self) -> Vec<RenderRequest> {
        let mut requests = Vec::new();
        for layer in self.layers.iter_mut() {
            for obj in layer.objects_mut().iter_mut() {
                collect_request(obj, &mut requests);
                if let Some(content) = obj.content_mut() {
                    collect_request(content, &mut requests);
                }
            }
        }
        requests
    }

    /// Applies a render-service completion.
    ///
    /// Stale completions are dropped. Failures leave the last good content
    /// in place and are published as [`CanvasEvent::RenderFailed`].
    pub fn apply_render_response(
        &mut self,
        object_id: &str,
        content_key: &str,
        result: std::result::Result<RenderResponse, ServiceError>,
    ) -> ContentUpdate {
        let Some(obj) = find_content_object(&mut self.layers, object_id) else {
            warn!("Render completion for unknown object {}", object_id);
            return ContentUpdate::Stale;
        };
        let update = obj.content_state_mut().complete(content_key, result);
        match &update {
            ContentUpdate::Applied => self.request_redraw(),
            ContentUpdate::Failed(message) => {
                warn!("Render of {} failed: {}", object_id, message);
                self.events.publish(CanvasEvent::RenderFailed {
                    object_id: object_id.to_string(),
                    message: message.clone(),
                });
            }
            ContentUpdate::Stale => {}
        }
        update
    }

    /// Round-trips dirty content through `service` until nothing is left to
    /// request. Returns the number of applied completions.
    pub async fn update_content(&mut self, service: &dyn RenderService) -> usize {
        let _busy = self.busy();
        let mut applied = 0;
        for _ in 0..MAX_CONTENT_ROUNDS {
            let requests = self.pending_render_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                let object_id = request.object_id.clone();
                let key = request.content_key.clone();
                let result = service.render(request).await;
                if self.apply_render_response(&object_id, &key, result) == ContentUpdate::Applied {
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Draws every visible layer and the selection overlay.
    ///
    /// Recoverable draw failures of single objects are logged and skipped;
    /// [`RenderError::Unexpected`] aborts the redraw.
    pub fn redraw(&self, surface: &mut dyn DrawingSurface) -> std::result::Result<(), RenderError> {
        surface.set_scale(self.viewport.mul());
        for layer in self.layers.iter().filter(|layer| layer.is_visible()) {
            for obj in layer.objects() {
                match obj.draw(surface) {
                    Ok(()) => {}
                    Err(e) if e.is_recoverable() => {
                        error!("Failed to draw {} ({}): {}", obj.id(), obj.type_name(), e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        self.draw_selection(surface)
    }

    fn draw_selection(&self, surface: &mut dyn DrawingSurface) -> std::result::Result<(), RenderError> {
        let pixel = self.viewport.control_length_to_canvas(1.0);
        let stroke = Stroke::new(SELECTION_COLOR, pixel);

        if let Some(band) = self.selection.rubber_band() {
            let rect = RotatedRectangleF::from_rectangle(&band);
            let [tl, tr, br, bl] = rect.corners();
            let dash = [4.0 * pixel, 4.0 * pixel];
            for (a, b) in [(tl, tr), (tr, br), (br, bl), (bl, tl)] {
                surface.draw_dashed_line(a, b, &stroke, &dash, 1.0)?;
            }
        }

        let Some(rect) = self.selection.rectangle() else {
            return Ok(());
        };
        surface.stroke_rectangle(&rect, &stroke, 1.0)?;

        let options = self.selection.options();
        let grip = options.resize_grip_size;
        for (_, center) in grip_positions(&rect) {
            let handle = RotatedRectangleF::new(center.x, center.y, grip, grip, rect.angle);
            surface.fill_rectangle(&handle, Color::WHITE, 1.0)?;
            surface.stroke_rectangle(&handle, &stroke, 1.0)?;
        }

        let anchor = rotation_grip_position(&rect, options.rotation_grip_line_length);
        let top = rect.to_world(PointF::new(0.0, -rect.height.abs() / 2.0));
        surface.draw_line(top, anchor, &stroke, 1.0)?;
        let size = options.rotation_grip_size;
        let knob = RotatedRectangleF::new(anchor.x, anchor.y, size, size, rect.angle);
        surface.fill_rectangle(&knob, SELECTION_COLOR, 1.0)
    }

    pub fn to_state(&self) -> CanvasState {
        CanvasState {
            id: self.id.clone(),
            layers: self.layers.to_states(),
            history: self.history.to_state(),
            viewport: self.viewport.clone(),
            active_layer: self.active_layer.clone(),
        }
    }

    /// Rebuilds the canvas from a snapshot. History tracking is paused
    /// while the layer stack is rebuilt.
    pub fn apply_state(&mut self, state: CanvasState) {
        self.history.pause_tracking();
        self.selection.clear();
        self.layers.replace_with_states(state.layers);
        self.history.apply_state(state.history);
        self.viewport = state.viewport;
        self.selection.set_workspace(self.viewport.workspace());
        self.active_layer = state
            .active_layer
            .filter(|id| self.layers.index_of(id).is_some())
            .or_else(|| self.layers.iter().last().map(|l| l.id().to_string()));
        self.refresh_text_wrapping();
        self.history.resume_tracking();
        info!(
            "Canvas state applied: {} layer(s), {} object(s)",
            self.layers.len(),
            self.layers.object_count()
        );
        self.publish_selection();
        self.request_redraw();
    }

    pub fn from_state(state: CanvasState) -> Self {
        let workspace = state.viewport.workspace();
        let mut canvas = Self::with_id(state.id.clone(), workspace.width, workspace.height);
        canvas.apply_state(state);
        canvas
    }

    /// Rectangle in which the constrained margin applies.
    pub fn workspace(&self) -> RectangleF {
        self.viewport.workspace()
    }
}

fn collect_request(obj: &mut VObject, requests: &mut Vec<RenderRequest>) {
    if !obj.needs_render_service() || !obj.content_state().needs_request() {
        return;
    }
    let object_id = obj.id().to_string();
    if let Some(content_key) = obj.content_state_mut().begin_request(&object_id) {
        requests.push(RenderRequest {
            object_id,
            content_key,
            state: obj.to_state(),
        });
    }
}

fn find_content_object<'a>(layers: &'a mut Collection<Layer>, id: &str) -> Option<&'a mut VObject> {
    for layer in layers.iter_mut() {
        for obj in layer.objects_mut().iter_mut() {
            if obj.id() == id {
                return Some(obj);
            }
            if let Some(content) = obj.content_mut() {
                if content.id() == id {
                    return Some(content);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RectangleF;
    use crate::geometry::Path;
    use crate::render::TinySkiaSurface;
    use image::RgbaImage;
    use vcanvas_core::shared;

    /// Surface whose path calls all fail with `error`.
    struct FailingSurface {
        error: RenderError,
        path_calls: usize,
    }

    impl FailingSurface {
        fn new(error: RenderError) -> Self {
            Self {
                error,
                path_calls: 0,
            }
        }

        fn fail(&mut self) -> std::result::Result<(), RenderError> {
            self.path_calls += 1;
            Err(self.error.clone())
        }
    }

    impl DrawingSurface for FailingSurface {
        fn set_scale(&mut self, _mul: f64) {}

        fn fill_rectangle(
            &mut self,
            _rect: &RotatedRectangleF,
            _color: Color,
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            Ok(())
        }

        fn stroke_rectangle(
            &mut self,
            _rect: &RotatedRectangleF,
            _stroke: &Stroke,
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            Ok(())
        }

        fn fill_path(
            &mut self,
            _path: &Path,
            _color: Color,
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            self.fail()
        }

        fn stroke_path(
            &mut self,
            _path: &Path,
            _stroke: &Stroke,
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            self.fail()
        }

        fn draw_line(
            &mut self,
            _from: PointF,
            _to: PointF,
            _stroke: &Stroke,
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            Ok(())
        }

        fn draw_dashed_line(
            &mut self,
            _from: PointF,
            _to: PointF,
            _stroke: &Stroke,
            _dash: &[f64],
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            Ok(())
        }

        fn draw_image(
            &mut self,
            _image: &RgbaImage,
            _rect: &RotatedRectangleF,
            _opacity: f64,
        ) -> std::result::Result<(), RenderError> {
            Ok(())
        }

        fn clip_to_path(&mut self, _path: &Path) -> std::result::Result<(), RenderError> {
            Ok(())
        }

        fn reset_clip(&mut self) {}
    }

    fn two_rectangles() -> Canvas {
        let mut canvas = Canvas::default();
        for x in [0.0, 20.0] {
            canvas
                .add_object(VObject::rectangle_shape(RectangleF::new(x, 0.0, 10.0, 10.0)))
                .unwrap();
        }
        canvas
    }

    fn canvas_with_rect() -> (Canvas, String) {
        let mut canvas = Canvas::default();
        let id = canvas
            .add_object(VObject::rectangle_shape(RectangleF::new(75.0, 75.0, 50.0, 50.0)))
            .unwrap();
        (canvas, id)
    }

    #[test]
    fn test_add_object_creates_default_layer_and_records() {
        let (canvas, id) = canvas_with_rect();
        assert_eq!(canvas.layers().len(), 1);
        assert!(canvas.object(&id).is_some());
        assert!(canvas.history().can_undo());
    }

    #[test]
    fn test_undo_redo_add() {
        let (mut canvas, id) = canvas_with_rect();
        canvas.select_object(&id, false);
        assert!(canvas.undo().unwrap());
        assert!(canvas.object(&id).is_none());
        assert!(canvas.selection().is_empty());
        assert!(canvas.redo().unwrap());
        assert!(canvas.object(&id).is_some());
    }

    #[test]
    fn test_history_events_forwarded() {
        let (mut canvas, _) = canvas_with_rect();
        let log = shared(Vec::new());
        let sink = log.clone();
        canvas.events().subscribe(
            EventFilter::Categories(vec![CanvasEventCategory::History]),
            move |e: &CanvasEvent| sink.borrow_mut().push(e.clone()),
        );
        canvas.undo().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![CanvasEvent::HistoryChanged {
                can_undo: true,
                can_redo: true
            }]
        );
    }

    #[test]
    fn test_text_wrapping_refreshes_once_per_change() {
        let mut canvas = Canvas::default();
        let text = canvas
            .add_object(VObject::text(RectangleF::new(0.0, 0.0, 100.0, 100.0), "flow", true))
            .unwrap();
        let mut blocker = VObject::rectangle_shape(RectangleF::new(50.0, 50.0, 20.0, 20.0));
        blocker.set_wrapping_mode(WrappingMode::Square);
        canvas.add_object(blocker).unwrap();

        let wrapping = |canvas: &Canvas| match canvas.object(&text).unwrap().kind() {
            crate::model::VObjectKind::Text(data) => data.wrapping_rectangles.len(),
            _ => 0,
        };
        assert_eq!(wrapping(&canvas), 1);
        assert!(canvas.refresh_text_wrapping().is_empty());
    }

    #[test]
    fn test_redraw_skips_unready_content() {
        let mut canvas = Canvas::default();
        canvas
            .add_object(VObject::image(RectangleF::new(0.0, 0.0, 10.0, 10.0), "a.png"))
            .unwrap();
        let id = canvas
            .add_object(VObject::rectangle_shape(RectangleF::new(20.0, 20.0, 10.0, 10.0)))
            .unwrap();
        canvas.select_object(&id, false);
        let mut surface = TinySkiaSurface::new(64, 64).unwrap();
        canvas.redraw(&mut surface).unwrap();
        assert!(surface.draw_calls() > 1);
    }

    #[test]
    fn test_redraw_continues_past_surface_errors() {
        let canvas = two_rectangles();
        let mut surface = FailingSurface::new(RenderError::Surface("lost".into()));
        canvas.redraw(&mut surface).unwrap();
        assert_eq!(surface.path_calls, 2);
    }

    #[test]
    fn test_redraw_propagates_unexpected_error() {
        let canvas = two_rectangles();
        let mut surface = FailingSurface::new(RenderError::Unexpected("boom".into()));
        assert_eq!(
            canvas.redraw(&mut surface),
            Err(RenderError::Unexpected("boom".into()))
        );
        assert_eq!(surface.path_calls, 1);
    }

    #[test]
    fn test_render_roundtrip_applies_and_reports_failures() {
        let mut canvas = Canvas::default();
        let id = canvas
            .add_object(VObject::text(RectangleF::new(0.0, 0.0, 40.0, 10.0), "hi", false))
            .unwrap();
        let log = shared(Vec::new());
        let sink = log.clone();
        canvas.events().subscribe(
            EventFilter::Categories(vec![CanvasEventCategory::Render]),
            move |e: &CanvasEvent| sink.borrow_mut().push(e.clone()),
        );

        let requests = canvas.pending_render_requests();
        assert_eq!(requests.len(), 1);
        assert!(canvas.pending_render_requests().is_empty());

        let failed = canvas.apply_render_response(
            &id,
            &requests[0].content_key,
            Err(ServiceError::Transport("offline".into())),
        );
        assert!(matches!(failed, ContentUpdate::Failed(_)));
        assert_eq!(log.borrow().len(), 1);
        assert!(matches!(
            &log.borrow()[0],
            CanvasEvent::RenderFailed { object_id, .. } if *object_id == id
        ));
    }

    #[test]
    fn test_busy_guard_publishes_transitions() {
        let canvas = Canvas::default();
        let log = shared(Vec::new());
        let sink = log.clone();
        canvas.events().subscribe(
            EventFilter::Categories(vec![CanvasEventCategory::Status]),
            move |e: &CanvasEvent| sink.borrow_mut().push(e.clone()),
        );
        {
            let _a = canvas.busy();
            let _b = canvas.busy();
            assert!(canvas.is_busy());
        }
        assert_eq!(
            *log.borrow(),
            vec![
                CanvasEvent::BusyChanged { busy: true },
                CanvasEvent::BusyChanged { busy: false }
            ]
        );
    }

    #[test]
    fn test_state_round_trip() {
        let (canvas, id) = canvas_with_rect();
        let json = serde_json::to_string(&canvas.to_state()).unwrap();
        let restored = Canvas::from_state(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.id(), canvas.id());
        assert!(restored.object(&id).is_some());
        assert_eq!(restored.history().len(), 2);
        assert!(restored.history().is_tracking());
    }
}
