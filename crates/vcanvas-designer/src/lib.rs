//! # VCanvas Designer
//!
//! Interactive editing core for 2D vector objects. It covers the geometry
//! of rotated rectangles, the selection grips that move, resize and rotate
//! objects, and the command-based undo/redo engine that stays consistent
//! with live object mutation.
//!
//! ## Architecture
//!
//! ```text
//! Canvas (input, events, redraw scheduling)
//!   ├── Layers (Collection<Layer>)
//!   │     └── VObjects (Collection<VObject>)
//!   │           ├── Transform + control points
//!   │           └── ContentState (render-service content)
//!   ├── SelectionHandler (hit-testing, drag/resize/rotate/nudge)
//!   ├── History (commands, grouping, capacity)
//!   └── Viewport (zoom, DPI, coordinate conversion)
//! ```
//!
//! Pixels are produced by a [`DrawingSurface`]; server-rendered text and
//! images come from an asynchronous [`RenderService`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vcanvas_designer::{Canvas, Modifiers, PointF, RectangleF, VObject};
//!
//! let mut canvas = Canvas::new(800.0, 600.0);
//! let id = canvas.add_object(VObject::rectangle_shape(RectangleF::new(75.0, 75.0, 50.0, 50.0)))?;
//!
//! canvas.pointer_down(PointF::new(100.0, 100.0), Modifiers::NONE);
//! canvas.pointer_move(PointF::new(120.0, 100.0), Modifiers::NONE);
//! canvas.pointer_up(PointF::new(120.0, 100.0), Modifiers::NONE);
//!
//! canvas.undo()?;
//! ```

pub mod canvas;
pub mod collection;
pub mod geometry;
pub mod history;
pub mod ids;
pub mod layer;
pub mod math;
pub mod model;
pub mod permission;
pub mod render;
pub mod selection;
pub mod serialization;
pub mod transform;
pub mod viewport;

pub use canvas::{
    BusyGuard, Canvas, CanvasEvent, CanvasEventCategory, CanvasState, Key, Modifiers,
    RedrawScheduler, ZOrder,
};
pub use collection::{Collection, CollectionChange, Owned};
pub use geometry::{Matrix, Path, PathParseError, PathSegment, PointF, RectangleF, RotatedRectangleF};
pub use history::{Command, History, HistoryEvent, HistoryState, DEFAULT_MAX_UNDO_STEP_COUNT};
pub use ids::new_unique_id;
pub use layer::{Layer, LayerState, ObjectLocation};
pub use math::{are_equal, EPSILON};
pub use model::{
    Color, ObjectFactory, Stroke, VObject, VObjectKind, VObjectState, WrappingMode,
};
pub use permission::Permission;
pub use render::{
    ContentState, ContentUpdate, DrawingSurface, RenderError, RenderRequest, RenderResponse,
    RenderService, ServiceError, TinySkiaSurface,
};
pub use selection::{
    ArrowKey, GestureEnd, HitTestResult, Margin, Operation, SelectionHandler, SelectionOptions,
};
pub use serialization::{DocumentFile, DocumentMetadata};
pub use transform::Transform;
pub use viewport::Viewport;
