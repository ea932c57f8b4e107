//! Batch alignment and distribution over selected items.

use crate::item::{ItemId, PlacedItem};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Alignment and distribution operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignOp {
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "center-h")]
    CenterHorizontal,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "top")]
    Top,
    #[serde(rename = "center-v")]
    CenterVertical,
    #[serde(rename = "bottom")]
    Bottom,
    #[serde(rename = "distribute-h")]
    DistributeHorizontal,
    #[serde(rename = "distribute-v")]
    DistributeVertical,
}

impl AlignOp {
    pub fn is_distribute(self) -> bool {
        matches!(self, AlignOp::DistributeHorizontal | AlignOp::DistributeVertical)
    }

    /// Fewest items the operation acts on.
    pub fn min_items(self) -> usize {
        if self.is_distribute() { 3 } else { 2 }
    }
}

/// Projection of an item onto one axis: (start, extent).
fn axis(item: &PlacedItem, horizontal: bool) -> (f64, f64) {
    if horizontal {
        (item.position.x, item.size.width)
    } else {
        (item.position.y, item.size.height)
    }
}

fn with_axis(position: Point, value: f64, horizontal: bool) -> Point {
    if horizontal {
        Point::new(value, position.y)
    } else {
        Point::new(position.x, value)
    }
}

/// Compute new positions for `items` under `op`.
///
/// Locked items are excluded before anything is computed and never appear in
/// the result. Returns an empty vector when fewer than
/// [`AlignOp::min_items`] unlocked items remain. Only positions that change
/// are returned.
pub fn compute_alignment(op: AlignOp, items: &[&PlacedItem]) -> Vec<(ItemId, Point)> {
    let items: Vec<&PlacedItem> = items.iter().copied().filter(|i| !i.locked).collect();
    if items.len() < op.min_items() {
        return Vec::new();
    }

    let horizontal = matches!(
        op,
        AlignOp::Left | AlignOp::CenterHorizontal | AlignOp::Right | AlignOp::DistributeHorizontal
    );
    let count = items.len() as f64;

    let targets: Vec<(ItemId, Point, f64)> = match op {
        AlignOp::Left | AlignOp::Top => {
            let min = items
                .iter()
                .map(|i| axis(i, horizontal).0)
                .fold(f64::INFINITY, f64::min);
            items.iter().map(|i| (i.id, i.position, min)).collect()
        }
        AlignOp::Right | AlignOp::Bottom => {
            let max = items
                .iter()
                .map(|i| {
                    let (start, extent) = axis(i, horizontal);
                    start + extent
                })
                .fold(f64::NEG_INFINITY, f64::max);
            items
                .iter()
                .map(|i| (i.id, i.position, max - axis(i, horizontal).1))
                .collect()
        }
        AlignOp::CenterHorizontal | AlignOp::CenterVertical => {
            let mean = items
                .iter()
                .map(|i| {
                    let (start, extent) = axis(i, horizontal);
                    start + extent / 2.0
                })
                .sum::<f64>()
                / count;
            items
                .iter()
                .map(|i| (i.id, i.position, mean - axis(i, horizontal).1 / 2.0))
                .collect()
        }
        AlignOp::DistributeHorizontal | AlignOp::DistributeVertical => {
            let mut sorted = items.clone();
            sorted.sort_by(|a, b| axis(a, horizontal).0.total_cmp(&axis(b, horizontal).0));

            let (first_start, _) = axis(sorted[0], horizontal);
            let (last_start, last_extent) = axis(sorted[sorted.len() - 1], horizontal);
            let total_extent: f64 = sorted.iter().map(|i| axis(i, horizontal).1).sum();
            let spacing = (last_start + last_extent - first_start - total_extent) / (count - 1.0);

            let mut cursor = first_start;
            sorted
                .iter()
                .map(|i| {
                    let at = cursor;
                    cursor += axis(i, horizontal).1 + spacing;
                    (i.id, i.position, at)
                })
                .collect()
        }
    };

    targets
        .into_iter()
        .map(|(id, position, value)| (id, position, with_axis(position, value, horizontal)))
        .filter(|(_, before, after)| before != after)
        .map(|(id, _, after)| (id, after))
        .collect()
}
