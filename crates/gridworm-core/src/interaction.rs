//! The exclusive pointer-gesture mode and its transient data.
//!
//! Exactly one mode is active at a time. Each variant carries only the data
//! its gesture needs, so a resize can never observe marquee state and
//! vice versa.

use crate::history::DocumentState;
use crate::item::ItemId;
use crate::manipulation::{DragState, ResizeState, RotationState};
use crate::selection::SelectionRect;
use crate::tools::ShapeKind;
use kurbo::{Point, Rect};

/// Document state at gesture start.
///
/// It is pushed to history on the first change the gesture makes and
/// restored if the gesture is cancelled after changing something.
#[derive(Debug, Clone, Default)]
pub struct GestureOrigin {
    pub state: DocumentState,
    pub recorded: bool,
}

impl GestureOrigin {
    pub fn new(state: DocumentState) -> Self {
        Self {
            state,
            recorded: false,
        }
    }
}

/// Current gesture mode.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Middle-button pan; `last` is the previous screen point.
    Panning { last: Point },
    DraggingItems {
        drag: DragState,
        origin: GestureOrigin,
    },
    MarqueeSelecting {
        rect: SelectionRect,
        /// Selection held before the gesture when it is additive.
        base: Vec<ItemId>,
    },
    Resizing {
        resize: ResizeState,
        origin: GestureOrigin,
    },
    Rotating {
        rotation: RotationState,
        origin: GestureOrigin,
    },
    /// Points of the stroke being drawn, in canvas space.
    FreehandDrawing { points: Vec<Point> },
    /// A pen handle is being dragged out.
    BezierEditing,
    ShapeDrawing {
        kind: ShapeKind,
        start: Point,
        current: Point,
    },
    /// Pixel eraser held down.
    Erasing { origin: GestureOrigin },
    /// An artboard, or its whole grid, is being moved.
    DraggingArtboards {
        drag: DragState,
        origin: GestureOrigin,
    },
    ResizingArtboard {
        resize: ResizeState,
        origin: GestureOrigin,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Short mode name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Panning { .. } => "panning",
            InteractionState::DraggingItems { .. } => "dragging_items",
            InteractionState::MarqueeSelecting { .. } => "marquee_selecting",
            InteractionState::Resizing { .. } => "resizing",
            InteractionState::Rotating { .. } => "rotating",
            InteractionState::FreehandDrawing { .. } => "freehand_drawing",
            InteractionState::BezierEditing => "bezier_editing",
            InteractionState::ShapeDrawing { .. } => "shape_drawing",
            InteractionState::Erasing { .. } => "erasing",
            InteractionState::DraggingArtboards { .. } => "dragging_artboards",
            InteractionState::ResizingArtboard { .. } => "resizing_artboard",
        }
    }

    /// Live marquee rectangle, if selecting.
    pub fn marquee(&self) -> Option<Rect> {
        match self {
            InteractionState::MarqueeSelecting { rect, .. } => Some(rect.to_rect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = InteractionState::default();
        assert!(state.is_idle());
        assert_eq!(state.name(), "idle");
        assert!(state.marquee().is_none());
    }

    #[test]
    fn test_marquee_rect() {
        let mut rect = SelectionRect::new(Point::new(10.0, 10.0));
        rect.current = Point::new(0.0, 30.0);
        let state = InteractionState::MarqueeSelecting { rect, base: Vec::new() };
        assert_eq!(state.name(), "marquee_selecting");
        assert_eq!(state.marquee(), Some(Rect::new(0.0, 10.0, 10.0, 30.0)));
    }
}
