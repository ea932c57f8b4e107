//! Bridge to an external auto-layout algorithm.
//!
//! The algorithm only sees media references, never placement ids, so results
//! are merged back by matching `id` against each item's `media_ref`.

use crate::collaborators::BoxFuture;
use crate::error::{CanvasError, CanvasResult};
use crate::item::{ItemId, ItemPatch, MediaRef, PlacedItem};
use crate::store::ItemStore;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// An item as the arrangement algorithm sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangeItem {
    /// The item's media reference.
    pub id: MediaRef,
    pub x: f64,
    pub y: f64,
    /// Zero keeps the current width.
    #[serde(default)]
    pub width: f64,
    /// Zero keeps the current height.
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl From<&PlacedItem> for ArrangeItem {
    fn from(item: &PlacedItem) -> Self {
        Self {
            id: item.media_ref.clone(),
            x: item.position.x,
            y: item.position.y,
            width: item.size.width,
            height: item.size.height,
            rotation: item.rotation,
        }
    }
}

/// An external arrangement algorithm, sync or async.
pub trait Arranger {
    fn arrange<'a>(&'a self, items: Vec<ArrangeItem>) -> BoxFuture<'a, CanvasResult<Vec<ArrangeItem>>>;
}

/// Plain functions arrange synchronously.
impl<F> Arranger for F
where
    F: Fn(Vec<ArrangeItem>) -> Vec<ArrangeItem>,
{
    fn arrange<'a>(&'a self, items: Vec<ArrangeItem>) -> BoxFuture<'a, CanvasResult<Vec<ArrangeItem>>> {
        Box::pin(std::future::ready(Ok(self(items))))
    }
}

/// Project the store for the arrangement algorithm, in insertion order.
pub fn project(store: &ItemStore) -> Vec<ArrangeItem> {
    store.iter().map(ArrangeItem::from).collect()
}

/// Reject output that cannot describe the items that were sent.
fn validate(store: &ItemStore, arranged: &[ArrangeItem]) -> CanvasResult<()> {
    if arranged.len() > store.len() {
        return Err(CanvasError::Arrangement(format!(
            "{} result(s) for {} item(s)",
            arranged.len(),
            store.len()
        )));
    }
    for result in arranged {
        let values = [result.x, result.y, result.width, result.height, result.rotation];
        if values.iter().any(|v| !v.is_finite()) || result.width < 0.0 || result.height < 0.0 {
            return Err(CanvasError::Arrangement(format!(
                "invalid geometry for {}",
                result.id
            )));
        }
    }
    Ok(())
}

/// Merge arranged results back into the store. Returns the ids that changed.
///
/// Each result claims the next unclaimed item with that media reference, in
/// insertion order. Results with no match are skipped; items with no result
/// are left untouched, as are locked items. Output with more results than
/// items, or with non-finite or negative geometry, is rejected before
/// anything is applied.
pub fn merge_arranged(store: &mut ItemStore, arranged: &[ArrangeItem]) -> CanvasResult<Vec<ItemId>> {
    validate(store, arranged)?;

    let mut by_media: HashMap<MediaRef, VecDeque<ItemId>> = HashMap::new();
    for item in store.iter() {
        by_media.entry(item.media_ref.clone()).or_default().push_back(item.id);
    }

    let mut changed = Vec::new();
    for result in arranged {
        let Some(id) = by_media.get_mut(&result.id).and_then(VecDeque::pop_front) else {
            log::warn!("Arranged item references unknown media {}", result.id);
            continue;
        };
        let Some(current) = store.get(id) else {
            continue;
        };
        let width = if result.width > 0.0 { result.width } else { current.size.width };
        let height = if result.height > 0.0 { result.height } else { current.size.height };
        let patch = ItemPatch {
            position: Some(Point::new(result.x, result.y)),
            size: Some(Size::new(width, height)),
            rotation: Some(result.rotation),
            ..ItemPatch::default()
        };
        if store.update(id, &patch) {
            changed.push(id);
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(media: &str, x: f64, y: f64) -> ArrangeItem {
        ArrangeItem {
            id: media.into(),
            x,
            y,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
        }
    }

    fn store_with(refs: &[&str]) -> (ItemStore, Vec<ItemId>) {
        let mut store = ItemStore::new();
        let ids = refs
            .iter()
            .map(|r| store.create(PlacedItem::new(*r, Point::ZERO, Size::new(100.0, 100.0))))
            .collect();
        (store, ids)
    }

    #[test]
    fn test_merge_by_media_ref() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        let arranged = vec![
            ArrangeItem {
                id: "c".into(),
                x: 300.0,
                y: 10.0,
                width: 0.0,
                height: 0.0,
                rotation: 0.0,
            },
            ArrangeItem {
                id: "a".into(),
                x: 0.0,
                y: 10.0,
                width: 120.0,
                height: 80.0,
                rotation: 0.0,
            },
        ];
        let changed = merge_arranged(&mut store, &arranged).unwrap();
        assert_eq!(changed, vec![ids[2], ids[0]]);
        assert_eq!(store.get(ids[2]).unwrap().position, Point::new(300.0, 10.0));
        assert_eq!(store.get(ids[2]).unwrap().size, Size::new(100.0, 100.0));
        assert_eq!(store.get(ids[0]).unwrap().size, Size::new(120.0, 80.0));
        // No result for b
        assert_eq!(store.get(ids[1]).unwrap().position, Point::ZERO);
    }

    #[test]
    fn test_unknown_media_skipped() {
        let (mut store, _) = store_with(&["a"]);
        let arranged = vec![ArrangeItem {
            id: "zzz".into(),
            x: 5.0,
            y: 5.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
        }];
        assert!(merge_arranged(&mut store, &arranged).unwrap().is_empty());
    }

    #[test]
    fn test_extra_results_rejected() {
        let (mut store, ids) = store_with(&["a"]);
        let arranged = vec![at("a", 50.0, 50.0), at("a", 90.0, 90.0)];
        assert!(matches!(
            merge_arranged(&mut store, &arranged),
            Err(CanvasError::Arrangement(_))
        ));
        assert_eq!(store.get(ids[0]).unwrap().position, Point::ZERO);
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let (mut store, ids) = store_with(&["a", "b"]);
        let arranged = vec![at("a", 40.0, 0.0), at("b", f64::NAN, 0.0)];
        assert!(matches!(
            merge_arranged(&mut store, &arranged),
            Err(CanvasError::Arrangement(_))
        ));
        // Nothing is applied when any result is bad
        assert_eq!(store.get(ids[0]).unwrap().position, Point::ZERO);

        let mut negative = at("a", 0.0, 0.0);
        negative.width = -10.0;
        assert!(merge_arranged(&mut store, &[negative]).is_err());
    }

    #[test]
    fn test_function_arranger() {
        let (store, _) = store_with(&["a", "b"]);
        let row = |items: Vec<ArrangeItem>| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, mut item)| {
                    item.x = i as f64 * 150.0;
                    item
                })
                .collect::<Vec<_>>()
        };
        let result = pollster::block_on(row.arrange(project(&store))).unwrap();
        assert_eq!(result[1].x, 150.0);
        assert_eq!(result[1].id, "b");
    }
}
