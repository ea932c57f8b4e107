//! Artboards: named page frames laid out beneath placed items.
//!
//! Artboards are their own layer. They take no part in item selection, item
//! hit testing or item snapping, but they move with the same grid and edge
//! snapping as items and resize with the same handles. Artboards created
//! together as a grid share a group id and are dragged as one block.

use crate::annotation::SerializableColor;
use crate::error::{CanvasError, CanvasResult};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Unique identifier for artboards.
pub type ArtboardId = Uuid;

/// Size of a single artboard created without explicit dimensions.
pub const DEFAULT_ARTBOARD_SIZE: Size = Size::new(400.0, 600.0);
/// Floor for artboard width and height while resizing.
pub const MIN_ARTBOARD_SIZE: f64 = 100.0;
/// Accepted width and height for a new artboard.
pub const ARTBOARD_SIZE_RANGE: RangeInclusive<f64> = 50.0..=5000.0;
/// Top-left corner of a new artboard grid.
pub const GRID_ORIGIN: Point = Point::new(100.0, 100.0);

/// Row and column of an artboard inside its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

fn white() -> SerializableColor {
    SerializableColor::new(255, 255, 255, 255)
}

/// A named frame on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artboard {
    pub id: ArtboardId,
    pub name: String,
    /// Top-left corner in canvas space.
    pub position: Point,
    pub size: Size,
    #[serde(default = "white")]
    pub background: SerializableColor,
    #[serde(default)]
    pub locked: bool,
    /// Shared by every artboard of one grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<GridCell>,
}

impl Artboard {
    pub fn new(name: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            size,
            background: white(),
            locked: false,
            group: None,
            cell: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Hit test in canvas space. Edges count as inside.
    pub fn contains(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    /// Whether `rect` overlaps or touches the artboard.
    pub fn touches(&self, rect: Rect) -> bool {
        let b = self.bounds();
        rect.x0 <= b.x1 && rect.x1 >= b.x0 && rect.y0 <= b.y1 && rect.y1 >= b.y0
    }
}

fn check_size(size: Size) -> CanvasResult<()> {
    if ARTBOARD_SIZE_RANGE.contains(&size.width) && ARTBOARD_SIZE_RANGE.contains(&size.height) {
        Ok(())
    } else {
        Err(CanvasError::InvalidArtboard(format!(
            "{}x{} is outside {}..={}",
            size.width,
            size.height,
            ARTBOARD_SIZE_RANGE.start(),
            ARTBOARD_SIZE_RANGE.end()
        )))
    }
}

/// Every artboard on the canvas, back to front.
///
/// Locked artboards reject moves and resizes.
#[derive(Debug, Clone)]
pub struct ArtboardLayer {
    artboards: Vec<Artboard>,
    /// Number used to name the next single artboard. Not part of history.
    next_number: usize,
}

impl Default for ArtboardLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtboardLayer {
    pub fn new() -> Self {
        Self {
            artboards: Vec::new(),
            next_number: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.artboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artboards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artboard> {
        self.artboards.iter()
    }

    pub fn get(&self, id: ArtboardId) -> Option<&Artboard> {
        self.artboards.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: ArtboardId) -> Option<&mut Artboard> {
        self.artboards.iter_mut().find(|a| a.id == id)
    }

    fn fresh_id(&self) -> ArtboardId {
        loop {
            let id = Uuid::new_v4();
            if self.get(id).is_none() {
                return id;
            }
        }
    }

    /// Add an artboard named "Artboard N" on top of the others.
    pub fn add(&mut self, position: Point, size: Size) -> CanvasResult<ArtboardId> {
        check_size(size)?;
        let mut artboard = Artboard::new(format!("Artboard {}", self.next_number), position, size);
        artboard.id = self.fresh_id();
        self.next_number += 1;

        let id = artboard.id;
        self.artboards.push(artboard);
        Ok(id)
    }

    /// Add `rows` x `cols` edge-to-edge artboards of `cell` size starting at
    /// `origin`, row by row. They share one group id.
    pub fn add_grid(
        &mut self,
        rows: u32,
        cols: u32,
        cell: Size,
        origin: Point,
    ) -> CanvasResult<Vec<ArtboardId>> {
        if rows == 0 || cols == 0 {
            return Err(CanvasError::InvalidArtboard(format!(
                "grid needs at least one row and column, got {rows}x{cols}"
            )));
        }
        check_size(cell)?;

        let group = Uuid::new_v4();
        let mut ids = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let offset = Vec2::new(f64::from(col) * cell.width, f64::from(row) * cell.height);
                let mut artboard =
                    Artboard::new(format!("Artboard {}-{}", row + 1, col + 1), origin + offset, cell);
                artboard.id = self.fresh_id();
                artboard.group = Some(group);
                artboard.cell = Some(GridCell { row, col });
                ids.push(artboard.id);
                self.artboards.push(artboard);
            }
        }
        log::info!("Created {}x{} artboard grid", rows, cols);
        Ok(ids)
    }

    /// Topmost artboard containing `point`.
    pub fn topmost_at(&self, point: Point) -> Option<ArtboardId> {
        self.artboards
            .iter()
            .rev()
            .find(|a| a.contains(point))
            .map(|a| a.id)
    }

    /// Artboards dragged together with `id`: its whole grid, or just itself.
    /// Locked artboards stay behind.
    pub fn drag_group(&self, id: ArtboardId) -> Vec<ArtboardId> {
        let Some(group) = self.get(id).map(|a| a.group) else {
            return Vec::new();
        };
        self.artboards
            .iter()
            .filter(|a| !a.locked)
            .filter(|a| match group {
                Some(group) => a.group == Some(group),
                None => a.id == id,
            })
            .map(|a| a.id)
            .collect()
    }

    /// Bounds of every unlocked artboard not in `exclude`.
    pub fn neighbor_bounds(&self, exclude: &HashSet<ArtboardId>) -> Vec<Rect> {
        self.artboards
            .iter()
            .filter(|a| !a.locked && !exclude.contains(&a.id))
            .map(Artboard::bounds)
            .collect()
    }

    /// Move an unlocked artboard. Returns whether it moved.
    pub fn set_position(&mut self, id: ArtboardId, position: Point) -> bool {
        match self.get_mut(id) {
            Some(artboard) if !artboard.locked && artboard.position != position => {
                artboard.position = position;
                true
            }
            _ => false,
        }
    }

    /// Move and resize an unlocked artboard. Size is floored at
    /// [`MIN_ARTBOARD_SIZE`].
    pub fn set_geometry(&mut self, id: ArtboardId, position: Point, size: Size) -> bool {
        let size = Size::new(size.width.max(MIN_ARTBOARD_SIZE), size.height.max(MIN_ARTBOARD_SIZE));
        match self.get_mut(id) {
            Some(artboard)
                if !artboard.locked && (artboard.position != position || artboard.size != size) =>
            {
                artboard.position = position;
                artboard.size = size;
                true
            }
            _ => false,
        }
    }

    pub fn rename(&mut self, id: ArtboardId, name: &str) -> bool {
        match self.get_mut(id) {
            Some(artboard) if artboard.name != name => {
                artboard.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_background(&mut self, id: ArtboardId, background: SerializableColor) -> bool {
        match self.get_mut(id) {
            Some(artboard) if artboard.background != background => {
                artboard.background = background;
                true
            }
            _ => false,
        }
    }

    /// Flip the lock flag. Returns the new state.
    pub fn toggle_lock(&mut self, id: ArtboardId) -> Option<bool> {
        let artboard = self.get_mut(id)?;
        artboard.locked = !artboard.locked;
        Some(artboard.locked)
    }

    /// Remove an unlocked artboard.
    pub fn remove(&mut self, id: ArtboardId) -> bool {
        let before = self.artboards.len();
        self.artboards.retain(|a| a.id != id || a.locked);
        self.artboards.len() != before
    }

    /// Artboards back to front, for history and export.
    pub fn snapshot(&self) -> Vec<Artboard> {
        self.artboards.clone()
    }

    /// Replace every artboard. The naming counter is kept.
    pub fn restore(&mut self, artboards: Vec<Artboard>) {
        self.artboards.clear();
        for artboard in artboards {
            if self.get(artboard.id).is_some() {
                log::warn!("Duplicate artboard id {} in restored state", artboard.id);
                continue;
            }
            self.artboards.push(artboard);
        }
    }
}
