//! Resize and rotation handles, and the per-gesture manipulation state for
//! dragging, resizing and rotating placed items.

use crate::geometry::{angle_from, normalize_degrees, rotate_around};
use crate::item::{ItemId, PlacedItem};
use crate::snap::snap_angle;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;
/// Distance of the rotation handle above the top edge, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 30.0;

/// One of the eight resize handles around an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "b")]
    Bottom,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
        ResizeHandle::Top,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
        ResizeHandle::Right,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft
                | ResizeHandle::TopRight
                | ResizeHandle::BottomLeft
                | ResizeHandle::BottomRight
        )
    }

    fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::BottomLeft | ResizeHandle::Left)
    }

    fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::TopRight | ResizeHandle::BottomRight | ResizeHandle::Right)
    }

    fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::TopRight | ResizeHandle::Top)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::BottomLeft | ResizeHandle::BottomRight | ResizeHandle::Bottom)
    }

    /// Handle position on unrotated bounds.
    pub fn position(self, bounds: Rect) -> Point {
        let c = bounds.center();
        match self {
            ResizeHandle::TopLeft => Point::new(bounds.x0, bounds.y0),
            ResizeHandle::TopRight => Point::new(bounds.x1, bounds.y0),
            ResizeHandle::BottomLeft => Point::new(bounds.x0, bounds.y1),
            ResizeHandle::BottomRight => Point::new(bounds.x1, bounds.y1),
            ResizeHandle::Top => Point::new(c.x, bounds.y0),
            ResizeHandle::Bottom => Point::new(c.x, bounds.y1),
            ResizeHandle::Left => Point::new(bounds.x0, c.y),
            ResizeHandle::Right => Point::new(bounds.x1, c.y),
        }
    }
}

/// What a press on a selected item's chrome grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Resize(ResizeHandle),
    Rotate,
}

/// Find the handle of `item` under `point` (canvas space).
///
/// Tolerances are in screen pixels and scaled by `zoom`. The point is first
/// mapped into the item's unrotated frame.
pub fn handle_at(item: &PlacedItem, point: Point, zoom: f64) -> Option<HandleHit> {
    let bounds = item.bounds();
    let local = rotate_around(point, bounds.center(), -item.rotation);

    let rotate = Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET / zoom);
    if local.distance(rotate) <= HANDLE_HIT_TOLERANCE / zoom {
        return Some(HandleHit::Rotate);
    }
    resize_handle_at(bounds, local, zoom).map(HandleHit::Resize)
}

/// Resize handle of axis-aligned `bounds` under `point`, if any.
pub fn resize_handle_at(bounds: Rect, point: Point, zoom: f64) -> Option<ResizeHandle> {
    let tolerance = HANDLE_HIT_TOLERANCE / zoom;
    ResizeHandle::ALL
        .into_iter()
        .find(|h| point.distance(h.position(bounds)) <= tolerance)
}

/// New position and size for a resize from `start` by `delta` canvas units.
///
/// Width and height are floored at `min_size`; when a dimension is floored
/// the edge opposite the dragged one stays where it was. With
/// `keep_aspect` on a corner handle the start aspect ratio is kept.
///
/// `delta` is applied along the canvas axes, not the item's own frame. For a
/// rotated item a rightward drag on the right handle still widens it by the
/// horizontal distance moved, whatever the rotation.
pub fn apply_resize(
    handle: ResizeHandle,
    start_position: Point,
    start_size: Size,
    delta: Vec2,
    min_size: f64,
    keep_aspect: bool,
) -> (Point, Size) {
    let (mut x, mut y) = (start_position.x, start_position.y);
    let (mut w, mut h) = (start_size.width, start_size.height);

    if handle.moves_left() {
        x += delta.x;
        w -= delta.x;
    } else if handle.moves_right() {
        w += delta.x;
    }
    if handle.moves_top() {
        y += delta.y;
        h -= delta.y;
    } else if handle.moves_bottom() {
        h += delta.y;
    }

    if keep_aspect && handle.is_corner() && start_size.height > 0.0 {
        let aspect = start_size.width / start_size.height;
        h = w / aspect;
        if handle.moves_top() {
            y = start_position.y + start_size.height - h;
        }
    }

    if w < min_size {
        w = min_size;
        if handle.moves_left() {
            x = start_position.x + start_size.width - min_size;
        }
    }
    if h < min_size {
        h = min_size;
        if handle.moves_top() {
            y = start_position.y + start_size.height - min_size;
        }
    }

    (Point::new(x, y), Size::new(w, h))
}

/// Resize gesture captured at pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    /// Item or artboard being resized.
    pub target: Uuid,
    pub handle: ResizeHandle,
    /// Pointer at gesture start, in screen pixels.
    pub start_pointer: Point,
    pub start_position: Point,
    pub start_size: Size,
}

impl ResizeState {
    pub fn new(item: &PlacedItem, handle: ResizeHandle, start_pointer: Point) -> Self {
        Self::from_bounds(item.id, item.bounds(), handle, start_pointer)
    }

    pub fn from_bounds(target: Uuid, bounds: Rect, handle: ResizeHandle, start_pointer: Point) -> Self {
        Self {
            target,
            handle,
            start_pointer,
            start_position: bounds.origin(),
            start_size: bounds.size(),
        }
    }

    /// Geometry for the pointer at `pointer` (screen pixels).
    pub fn geometry_at(&self, pointer: Point, zoom: f64, min_size: f64, keep_aspect: bool) -> (Point, Size) {
        let delta = (pointer - self.start_pointer) / zoom;
        apply_resize(
            self.handle,
            self.start_position,
            self.start_size,
            delta,
            min_size,
            keep_aspect,
        )
    }
}

/// Rotation gesture captured at pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    pub item_id: ItemId,
    /// Item center at gesture start.
    pub pivot: Point,
    /// Pointer angle around the pivot at gesture start, in degrees.
    pub start_angle: f64,
    pub start_rotation: f64,
}

impl RotationState {
    pub fn new(item: &PlacedItem, pointer: Point) -> Self {
        let pivot = item.center();
        Self {
            item_id: item.id,
            pivot,
            start_angle: angle_from(pivot, pointer),
            start_rotation: item.rotation,
        }
    }

    /// Rotation for the pointer at `pointer` (canvas space), normalized to
    /// `[0, 360)` and optionally snapped to `snap_increment` degrees.
    pub fn rotation_at(&self, pointer: Point, snap_increment: Option<f64>) -> f64 {
        let rotation = self.start_rotation + (angle_from(self.pivot, pointer) - self.start_angle);
        match snap_increment {
            Some(increment) => snap_angle(rotation, increment),
            None => normalize_degrees(rotation),
        }
    }
}

/// Drag gesture over one or more items moved rigidly together.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Item under the pointer; its position drives snapping.
    pub anchor: ItemId,
    /// Pointer at gesture start, in canvas space.
    pub start_pointer: Point,
    /// Every dragged item with its position at gesture start.
    pub origins: Vec<(ItemId, Point)>,
}

impl DragState {
    pub fn new(anchor: ItemId, start_pointer: Point, origins: Vec<(ItemId, Point)>) -> Self {
        Self {
            anchor,
            start_pointer,
            origins,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.origins.iter().map(|(id, _)| *id)
    }

    pub fn anchor_origin(&self) -> Option<Point> {
        self.origins
            .iter()
            .find(|(id, _)| *id == self.anchor)
            .map(|(_, p)| *p)
    }

    /// Unsnapped anchor position for the pointer at `pointer`.
    pub fn candidate(&self, pointer: Point) -> Option<Point> {
        self.anchor_origin().map(|origin| origin + (pointer - self.start_pointer))
    }

    /// Positions of every dragged item once the anchor lands on `anchor_position`.
    pub fn positions_for(&self, anchor_position: Point) -> Vec<(ItemId, Point)> {
        let Some(origin) = self.anchor_origin() else {
            return Vec::new();
        };
        let delta = anchor_position - origin;
        self.origins.iter().map(|&(id, p)| (id, p + delta)).collect()
    }
}
