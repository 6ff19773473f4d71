use serde::{Deserialize, Serialize};

use crate::history::HistoryState;
use crate::ids::new_unique_id;
use crate::layer::LayerState;
use crate::selection::ArrowKey;
use crate::viewport::Viewport;
use vcanvas_core::CategorizedEvent;

/// Keyboard modifier state accompanying pointer and key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Arrow(ArrowKey),
    Delete,
    Escape,
    Character(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEventCategory {
    Selection,
    History,
    Structure,
    Render,
    Status,
}

/// Notifications published by a [`super::Canvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    SelectionChanged { ids: Vec<String> },
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// The oldest undo step was dropped to respect the capacity.
    HistoryOverflow,
    VObjectAdded { id: String },
    VObjectRemoved { id: String },
    VObjectChanged { id: String },
    LayerAdded { id: String },
    LayerRemoved { id: String },
    RenderFailed { object_id: String, message: String },
    BusyChanged { busy: bool },
    RedrawRequested,
}

impl CategorizedEvent for CanvasEvent {
    type Category = CanvasEventCategory;

    fn category(&self) -> CanvasEventCategory {
        match self {
            CanvasEvent::SelectionChanged { .. } => CanvasEventCategory::Selection,
            CanvasEvent::HistoryChanged { .. } | CanvasEvent::HistoryOverflow => {
                CanvasEventCategory::History
            }
            CanvasEvent::VObjectAdded { .. }
            | CanvasEvent::VObjectRemoved { .. }
            | CanvasEvent::VObjectChanged { .. }
            | CanvasEvent::LayerAdded { .. }
            | CanvasEvent::LayerRemoved { .. } => CanvasEventCategory::Structure,
            CanvasEvent::RenderFailed { .. } => CanvasEventCategory::Render,
            CanvasEvent::BusyChanged { .. } | CanvasEvent::RedrawRequested => {
                CanvasEventCategory::Status
            }
        }
    }
}

/// Serialized snapshot of a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    #[serde(default = "new_unique_id")]
    pub id: String,
    #[serde(default)]
    pub layers: Vec<LayerState>,
    #[serde(default)]
    pub history: HistoryState,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_layer: Option<String>,
}
