//! Placed items: media references positioned on the canvas.

use crate::geometry::{normalize_degrees, rotate_around};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for placed items.
pub type ItemId = Uuid;

/// Identifier of a record in the external media catalog.
pub type MediaRef = String;

/// A media reference positioned on the free-form canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: ItemId,
    pub media_ref: MediaRef,
    /// Top-left corner in canvas space.
    pub position: Point,
    pub size: Size,
    /// Degrees, normalized to `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Paint and hit-test order; ties resolve by insertion order.
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub locked: bool,
    /// Batch marker (e.g. generated text pages). Layout only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_tag: Option<String>,
}

impl PlacedItem {
    /// Create an unlocked, unrotated item with a fresh id.
    pub fn new(media_ref: impl Into<MediaRef>, position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_ref: media_ref.into(),
            position,
            size,
            rotation: 0.0,
            z_index: 0,
            locked: false,
            group_tag: None,
        }
    }

    /// Builder-style group tag.
    pub fn with_group_tag(mut self, tag: impl Into<String>) -> Self {
        self.group_tag = Some(tag.into());
        self
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Geometric center, used as the rotation pivot.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Hit test in canvas space, honoring rotation.
    pub fn contains(&self, point: Point) -> bool {
        let local = if self.rotation == 0.0 {
            point
        } else {
            rotate_around(point, self.center(), -self.rotation)
        };
        let b = self.bounds();
        local.x >= b.x0 && local.x <= b.x1 && local.y >= b.y0 && local.y <= b.y1
    }
}

/// Shallow patch for [`PlacedItem`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<MediaRef>,
}

impl ItemPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn geometry(position: Point, size: Size) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn unlock() -> Self {
        Self {
            locked: Some(false),
            ..Self::default()
        }
    }

    /// Whether this patch is exactly `{locked: false}`.
    pub fn is_unlock_only(&self) -> bool {
        *self == Self::unlock()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `item`, flooring size at `min_size` and normalizing
    /// rotation. Returns whether anything changed.
    pub(crate) fn apply(&self, item: &mut PlacedItem, min_size: f64) -> bool {
        let before = item.clone();
        if let Some(position) = self.position {
            item.position = position;
        }
        if let Some(size) = self.size {
            item.size = Size::new(size.width.max(min_size), size.height.max(min_size));
        }
        if let Some(rotation) = self.rotation {
            item.rotation = normalize_degrees(rotation);
        }
        if let Some(z) = self.z_index {
            item.z_index = z;
        }
        if let Some(locked) = self.locked {
            item.locked = locked;
        }
        if let Some(media_ref) = &self.media_ref {
            item.media_ref = media_ref.clone();
        }
        *item != before
    }
}
