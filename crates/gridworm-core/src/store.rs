//! The authoritative store of placed items.

use crate::item::{ItemId, ItemPatch, PlacedItem};
use kurbo::{Point, Rect, Vec2};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Default floor for item width and height.
pub const MIN_ITEM_SIZE: f64 = 50.0;

/// Map of item id to placed item, with insertion order for z-index ties.
///
/// Locked items reject every mutation except explicit unlocking, and ids are
/// never reissued once they have been handed out.
#[derive(Debug, Clone)]
pub struct ItemStore {
    items: HashMap<ItemId, PlacedItem>,
    /// Insertion order (back to front among equal z-index).
    order: Vec<ItemId>,
    /// Every id this store has ever held.
    issued: HashSet<ItemId>,
    min_size: f64,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Create an empty store with the default size floor.
    pub fn new() -> Self {
        Self::with_min_size(MIN_ITEM_SIZE)
    }

    /// Create an empty store with a custom size floor.
    pub fn with_min_size(min_size: f64) -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            issued: HashSet::new(),
            min_size,
        }
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.get(&id)
    }

    /// Whether `id` exists and is locked.
    pub fn is_locked(&self, id: ItemId) -> bool {
        self.items.get(&id).is_some_and(|item| item.locked)
    }

    /// Items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.order.clone()
    }

    /// Items in paint order: ascending z-index, insertion order on ties.
    pub fn items_ordered(&self) -> Vec<&PlacedItem> {
        // `iter` yields insertion order and the sort is stable
        let mut items: Vec<&PlacedItem> = self.iter().collect();
        items.sort_by_key(|item| item.z_index);
        items
    }

    /// Topmost item containing `point`.
    pub fn topmost_at(&self, point: Point) -> Option<ItemId> {
        self.items_ordered()
            .into_iter()
            .rev()
            .find(|item| item.contains(point))
            .map(|item| item.id)
    }

    /// Bounds of every item except those in `exclude` and locked ones.
    pub fn neighbor_bounds(&self, exclude: &HashSet<ItemId>) -> Vec<Rect> {
        self.iter()
            .filter(|item| !item.locked && !exclude.contains(&item.id))
            .map(PlacedItem::bounds)
            .collect()
    }

    fn max_z(&self) -> i64 {
        self.items.values().map(|i| i.z_index).max().unwrap_or(0)
    }

    fn min_z(&self) -> i64 {
        self.items.values().map(|i| i.z_index).min().unwrap_or(0)
    }

    fn fresh_id(&mut self) -> ItemId {
        loop {
            let id = Uuid::new_v4();
            if self.issued.insert(id) {
                return id;
            }
        }
    }

    /// Add an item on top of all others.
    ///
    /// A nil id, or an id this store has already issued, is replaced with a
    /// fresh one. Size is floored and rotation normalized.
    pub fn create(&mut self, mut item: PlacedItem) -> ItemId {
        item.id = if item.id.is_nil() || self.issued.contains(&item.id) {
            self.fresh_id()
        } else {
            self.issued.insert(item.id);
            item.id
        };
        item.z_index = self.max_z() + 1;
        let normalize = ItemPatch {
            size: Some(item.size),
            rotation: Some(item.rotation),
            ..ItemPatch::default()
        };
        normalize.apply(&mut item, self.min_size);

        let id = item.id;
        self.order.push(id);
        self.items.insert(id, item);
        id
    }

    /// Shallow-merge `patch` into the item.
    ///
    /// Locked items only accept `{locked: false}`. Returns whether the item
    /// changed.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        let min_size = self.min_size;
        match self.items.get_mut(&id) {
            Some(item) if item.locked && !patch.is_unlock_only() => {
                log::debug!("Ignoring update to locked item {}", id);
                false
            }
            Some(item) => patch.apply(item, min_size),
            None => false,
        }
    }

    /// Set the lock flag directly, bypassing the lock check.
    pub fn set_locked(&mut self, id: ItemId, locked: bool) -> bool {
        match self.items.get_mut(&id) {
            Some(item) if item.locked != locked => {
                item.locked = locked;
                true
            }
            _ => false,
        }
    }

    /// Flip the lock flag. Returns the new state.
    pub fn toggle_lock(&mut self, id: ItemId) -> Option<bool> {
        let item = self.items.get_mut(&id)?;
        item.locked = !item.locked;
        Some(item.locked)
    }

    /// Translate unlocked items by `delta`. Returns the ids that moved.
    pub fn translate(&mut self, ids: &[ItemId], delta: Vec2) -> Vec<ItemId> {
        let mut moved = Vec::new();
        for &id in ids {
            if let Some(item) = self.items.get_mut(&id).filter(|i| !i.locked) {
                item.position += delta;
                moved.push(id);
            }
        }
        moved
    }

    /// Remove unlocked items. Locked and unknown ids are skipped.
    pub fn delete(&mut self, ids: &[ItemId]) -> Vec<ItemId> {
        let removed: Vec<ItemId> = ids
            .iter()
            .copied()
            .filter(|id| self.items.get(id).is_some_and(|item| !item.locked))
            .collect();
        for id in &removed {
            self.items.remove(id);
        }
        self.order.retain(|id| self.items.contains_key(id));
        removed
    }

    fn existing_unique(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut seen = HashSet::new();
        ids.iter()
            .copied()
            .filter(|id| self.items.contains_key(id) && seen.insert(*id))
            .collect()
    }

    /// Raise `ids` above every other item, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ItemId]) {
        let ids = self.existing_unique(ids);
        let max_z = self.max_z();
        for (index, id) in ids.iter().enumerate() {
            if let Some(item) = self.items.get_mut(id) {
                item.z_index = max_z + index as i64 + 1;
            }
        }
    }

    /// Lower `ids` below every other item, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ItemId]) {
        let ids = self.existing_unique(ids);
        let min_z = self.min_z();
        let count = ids.len() as i64;
        for (index, id) in ids.iter().enumerate() {
            if let Some(item) = self.items.get_mut(id) {
                item.z_index = min_z - count + index as i64;
            }
        }
    }

    /// Clone items with a fixed offset and fresh ids. Duplicates are never
    /// locked.
    pub fn duplicate(&mut self, ids: &[ItemId], offset: Vec2) -> Vec<ItemId> {
        let sources: Vec<PlacedItem> = self
            .existing_unique(ids)
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect();
        sources
            .into_iter()
            .map(|mut copy| {
                copy.id = Uuid::nil();
                copy.position += offset;
                copy.locked = false;
                self.create(copy)
            })
            .collect()
    }

    /// Remove every item regardless of lock state.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Items in insertion order, for history and export.
    pub fn snapshot(&self) -> Vec<PlacedItem> {
        self.iter().cloned().collect()
    }

    /// Replace the contents with `items`, keeping their ids and z-indices.
    ///
    /// Restored ids are recorded as issued so `create` never hands them out.
    pub fn restore(&mut self, items: Vec<PlacedItem>) {
        self.clear();
        for item in items {
            self.issued.insert(item.id);
            if self.items.contains_key(&item.id) {
                log::warn!("Duplicate item id {} in restored state", item.id);
                continue;
            }
            self.order.push(item.id);
            self.items.insert(item.id, item);
        }
    }
}
