//! Tool system for the canvas.

use crate::annotation::{
    Annotation, AnnotationStyle, EllipseShape, PenSession, PolygonDraft, RectangleShape,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    /// Freehand pencil.
    Pencil,
    /// Bezier pen.
    VectorPen,
    Rectangle,
    Ellipse,
    Polygon,
    /// Hands off to the external text-page dialog.
    Text,
    Eraser,
}

impl ToolKind {
    /// Tool bound to a letter shortcut.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'v' => Some(ToolKind::Select),
            'b' => Some(ToolKind::Pencil),
            'p' => Some(ToolKind::VectorPen),
            'r' => Some(ToolKind::Rectangle),
            'o' => Some(ToolKind::Ellipse),
            'g' => Some(ToolKind::Polygon),
            'e' => Some(ToolKind::Eraser),
            't' => Some(ToolKind::Text),
            _ => None,
        }
    }

    /// Drag-from-corner shape tools.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            _ => None,
        }
    }
}

/// Primitive produced by a drag-from-corner gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    /// Build the primitive spanned by `start` and `end`. Degenerate drags
    /// (zero width or height) produce nothing.
    pub fn create(self, start: Point, end: Point, style: AnnotationStyle) -> Option<Annotation> {
        if start.x == end.x || start.y == end.y {
            return None;
        }
        Some(match self {
            ShapeKind::Rectangle => {
                Annotation::Rectangle(RectangleShape::from_corners(start, end, style))
            }
            ShapeKind::Ellipse => Annotation::Ellipse(EllipseShape::from_corners(start, end, style)),
        })
    }
}

/// Eraser sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraserMode {
    /// Remove primitives under the cursor while dragging.
    #[default]
    Pixel,
    /// A click asks to clear every annotation.
    ClearAll,
}

/// Manages the current tool, its style, and drafts that span several
/// gestures (pen anchors and polygon vertices).
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub eraser_mode: EraserMode,
    /// Current style to apply to new annotations.
    pub current_style: AnnotationStyle,
    /// Anchors placed by the pen tool.
    pub pen: PenSession,
    /// Vertices placed by the polygon tool.
    pub polygon: PolygonDraft,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Switching away discards uncommitted drafts.
    /// Returns whether the tool changed.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if tool == self.current_tool {
            return false;
        }
        self.cancel_drafts();
        self.current_tool = tool;
        true
    }

    /// Discard pen anchors and polygon vertices.
    pub fn cancel_drafts(&mut self) {
        self.pen.cancel();
        self.polygon.cancel();
    }

    /// Whether a multi-gesture draft is in progress.
    pub fn has_draft(&self) -> bool {
        !self.pen.is_empty() || !self.polygon.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        assert!(tm.set_tool(ToolKind::Rectangle));
        assert_eq!(tm.current_tool, ToolKind::Rectangle);
        assert!(!tm.set_tool(ToolKind::Rectangle));
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(ToolKind::from_shortcut('v'), Some(ToolKind::Select));
        assert_eq!(ToolKind::from_shortcut('P'), Some(ToolKind::VectorPen));
        assert_eq!(ToolKind::from_shortcut('b'), Some(ToolKind::Pencil));
        assert_eq!(ToolKind::from_shortcut('x'), None);
    }

    #[test]
    fn test_switching_tool_discards_drafts() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Polygon);
        tm.polygon.click(
            Point::new(0.0, 0.0),
            1.0,
            &Default::default(),
            AnnotationStyle::default(),
        );
        assert!(tm.has_draft());
        tm.set_tool(ToolKind::Select);
        assert!(!tm.has_draft());
    }

    #[test]
    fn test_shape_create() {
        let style = AnnotationStyle::default();
        let rect = ShapeKind::Rectangle.create(Point::new(0.0, 0.0), Point::new(50.0, 40.0), style);
        assert!(matches!(rect, Some(Annotation::Rectangle(_))));
        let flat = ShapeKind::Ellipse.create(Point::new(0.0, 0.0), Point::new(50.0, 0.0), style);
        assert!(flat.is_none());
    }
}
