//! Selection tracking and marquee selection.

use crate::geometry::rects_intersect;
use crate::input::Modifiers;
use crate::item::{ItemId, PlacedItem};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// How a click combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Select only the clicked item.
    Replace,
    /// Ctrl/Cmd: flip membership of the clicked item.
    Toggle,
    /// Shift: add the clicked item, keeping the rest.
    Extend,
}

impl SelectMode {
    /// Pick the mode from the modifiers held at gesture time.
    /// Ctrl/Cmd wins over Shift.
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        if modifiers.command() {
            SelectMode::Toggle
        } else if modifiers.shift {
            SelectMode::Extend
        } else {
            SelectMode::Replace
        }
    }

    pub fn is_additive(self) -> bool {
        self != SelectMode::Replace
    }
}

/// Ordered set of selected item ids. The last entry is the most recently
/// selected item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: Vec<ItemId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// The most recently selected id.
    pub fn last(&self) -> Option<ItemId> {
        self.ids.last().copied()
    }

    pub fn select_single(&mut self, id: ItemId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Add `id` if absent, keeping the existing selection.
    pub fn extend(&mut self, id: ItemId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    /// Flip membership of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Apply a click on `id` with the given mode.
    pub fn click(&mut self, id: ItemId, mode: SelectMode) {
        match mode {
            SelectMode::Replace => self.select_single(id),
            SelectMode::Toggle => {
                self.toggle(id);
            }
            SelectMode::Extend => self.extend(id),
        }
    }

    pub fn remove(&mut self, id: ItemId) {
        self.ids.retain(|&s| s != id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection, dropping duplicates.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.ids.clear();
        for id in ids {
            self.extend(id);
        }
    }

    /// Drop ids for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) {
        self.ids.retain(|&id| keep(id));
    }
}

/// Rubber-band rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    /// Starting point in canvas coordinates.
    pub start: Point,
    /// Current point in canvas coordinates.
    pub current: Point,
}

impl SelectionRect {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    /// Get the selection rectangle as a normalized Rect.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.current.x),
            self.start.y.min(self.current.y),
            self.start.x.max(self.current.x),
            self.start.y.max(self.current.y),
        )
    }
}

/// Every unlocked item whose bounds overlap `rect` with nonzero area.
pub fn compute_marquee_selection<'a>(
    rect: Rect,
    items: impl IntoIterator<Item = &'a PlacedItem>,
) -> Vec<ItemId> {
    items
        .into_iter()
        .filter(|item| !item.locked && rects_intersect(rect, item.bounds()))
        .map(|item| item.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use uuid::Uuid;

    #[test]
    fn test_toggle_and_last() {
        let mut selection = SelectionSet::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(selection.toggle(a));
        selection.extend(b);
        assert_eq!(selection.last(), Some(b));
        assert!(!selection.toggle(a));
        assert_eq!(selection.ids(), &[b]);
    }

    #[test]
    fn test_click_modes() {
        let mut selection = SelectionSet::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        selection.click(a, SelectMode::Replace);
        selection.click(b, SelectMode::Extend);
        assert_eq!(selection.len(), 2);
        selection.click(b, SelectMode::Extend);
        assert_eq!(selection.len(), 2);
        selection.click(a, SelectMode::Toggle);
        assert_eq!(selection.ids(), &[b]);
        selection.click(a, SelectMode::Replace);
        assert_eq!(selection.ids(), &[a]);
    }

    #[test]
    fn test_mode_from_modifiers() {
        assert_eq!(SelectMode::from_modifiers(Modifiers::default()), SelectMode::Replace);
        let shift = Modifiers { shift: true, ..Modifiers::default() };
        assert_eq!(SelectMode::from_modifiers(shift), SelectMode::Extend);
        let meta = Modifiers { meta: true, shift: true, ..Modifiers::default() };
        assert_eq!(SelectMode::from_modifiers(meta), SelectMode::Toggle);
    }

    #[test]
    fn test_selection_rect_normalizes() {
        let mut rect = SelectionRect::new(Point::new(100.0, 100.0));
        rect.current = Point::new(20.0, 150.0);
        assert_eq!(rect.to_rect(), Rect::new(20.0, 100.0, 100.0, 150.0));
    }

    #[test]
    fn test_marquee_excludes_locked_and_touching() {
        let inside = PlacedItem::new("a", Point::new(10.0, 10.0), Size::new(50.0, 50.0));
        let touching = PlacedItem::new("b", Point::new(100.0, 0.0), Size::new(50.0, 50.0));
        let mut locked = PlacedItem::new("c", Point::new(20.0, 20.0), Size::new(50.0, 50.0));
        locked.locked = true;
        let items = [inside.clone(), touching, locked];

        let hits = compute_marquee_selection(Rect::new(0.0, 0.0, 100.0, 100.0), &items);
        assert_eq!(hits, vec![inside.id]);
    }

    #[test]
    fn test_replace_dedupes() {
        let mut selection = SelectionSet::new();
        let a = Uuid::new_v4();
        selection.replace([a, a]);
        assert_eq!(selection.len(), 1);
    }
}
