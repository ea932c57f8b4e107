//! Snap functionality for aligning items to the grid and to each other.

use crate::geometry::normalize_degrees;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Maximum per-axis distance for neighbor snapping.
pub const SNAP_DISTANCE: f64 = 10.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Which snap passes run while dragging items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Snap to grid lines only.
    Grid,
    /// Snap to neighboring item edges and centers only.
    Neighbors,
    /// Grid first, then neighbors.
    #[default]
    GridAndNeighbors,
}

impl SnapMode {
    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::GridAndNeighbors)
    }

    /// Check if neighbor snapping is enabled.
    pub fn snaps_to_neighbors(self) -> bool {
        matches!(self, SnapMode::Neighbors | SnapMode::GridAndNeighbors)
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round half up, so `-7.5` becomes `-7` and `7.5` becomes `8`.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn snap_value(value: f64, increment: f64) -> f64 {
    round_half_up(value / increment) * increment
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Snap an angle to the nearest increment, normalized to `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    normalize_degrees(snap_value(angle_degrees, increment))
}

/// The five placements of a moving span of length `len` against a neighbor
/// span `[start, end]`: flush near edges, flush far edges, centered, touching
/// before and touching after.
fn axis_candidates(start: f64, end: f64, len: f64) -> [f64; 5] {
    let other_len = end - start;
    [
        start,
        end - len,
        start + other_len / 2.0 - len / 2.0,
        start - len,
        end,
    ]
}

/// Closest candidate to `value` strictly within `threshold`. Earlier
/// candidates win ties.
fn nearest_on_axis(value: f64, candidates: impl Iterator<Item = f64>, threshold: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for candidate in candidates {
        let diff = (candidate - value).abs();
        let limit = best.map_or(threshold, |(d, _)| d);
        if diff < limit {
            best = Some((diff, candidate));
        }
    }
    best.map(|(_, c)| c)
}

/// Snap the top-left `candidate` of an item of `size` to the edges and
/// centers of `neighbors`.
///
/// Each axis is resolved independently; an axis with no candidate closer
/// than `snap_distance` keeps its candidate value. The caller decides which
/// items count as neighbors (the moving item, selected items and locked items
/// are excluded by [`Canvas`](crate::Canvas)).
pub fn snap_to_neighbors(
    size: Size,
    candidate: Point,
    neighbors: &[Rect],
    snap_distance: f64,
) -> SnapResult {
    let x = nearest_on_axis(
        candidate.x,
        neighbors
            .iter()
            .flat_map(|r| axis_candidates(r.x0, r.x1, size.width)),
        snap_distance,
    );
    let y = nearest_on_axis(
        candidate.y,
        neighbors
            .iter()
            .flat_map(|r| axis_candidates(r.y0, r.y1, size.height)),
        snap_distance,
    );

    SnapResult {
        point: Point::new(x.unwrap_or(candidate.x), y.unwrap_or(candidate.y)),
        snapped_x: x.is_some(),
        snapped_y: y.is_some(),
    }
}

/// Run the passes enabled by `mode`: grid first, then neighbors.
pub fn snap_position(
    mode: SnapMode,
    size: Size,
    candidate: Point,
    neighbors: &[Rect],
    grid_size: f64,
    snap_distance: f64,
) -> Point {
    let mut point = candidate;
    if mode.snaps_to_grid() {
        point = snap_to_grid(point, grid_size);
    }
    if mode.snaps_to_neighbors() {
        point = snap_to_neighbors(size, point, neighbors, snap_distance).point;
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let p = snap_to_grid(Point::new(23.0, 47.0), GRID_SIZE);
        assert!((p.x - 20.0).abs() < f64::EPSILON);
        assert!((p.y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid_half_rounds_up() {
        let p = snap_to_grid(Point::new(150.0, -150.0), GRID_SIZE);
        assert!((p.x - 160.0).abs() < f64::EPSILON);
        assert!((p.y + 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid_idempotent() {
        for &(x, y) in &[(0.0, 0.0), (13.7, -29.99), (150.0, 10.0), (-7.5, 1234.5)] {
            let once = snap_to_grid(Point::new(x, y), GRID_SIZE);
            let twice = snap_to_grid(once, GRID_SIZE);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(7.0, 15.0) - 0.0).abs() < f64::EPSILON);
        assert!((snap_angle(8.0, 15.0) - 15.0).abs() < f64::EPSILON);
        assert!((snap_angle(-8.0, 15.0) - 345.0).abs() < f64::EPSILON);
        assert!((snap_angle(358.0, 15.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_neighbor_snap_left_edges() {
        let neighbors = [Rect::new(100.0, 300.0, 200.0, 400.0)];
        let result = snap_to_neighbors(Size::new(50.0, 50.0), Point::new(104.0, 0.0), &neighbors, SNAP_DISTANCE);
        assert!(result.snapped_x);
        assert!(!result.snapped_y);
        assert!((result.point.x - 100.0).abs() < f64::EPSILON);
        assert!(result.point.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_neighbor_snap_touching_after() {
        let neighbors = [Rect::new(0.0, 0.0, 100.0, 100.0)];
        // Left edge near the neighbor's right edge
        let result = snap_to_neighbors(Size::new(50.0, 50.0), Point::new(107.0, 500.0), &neighbors, SNAP_DISTANCE);
        assert!((result.point.x - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_neighbor_snap_center() {
        let neighbors = [Rect::new(0.0, 0.0, 100.0, 100.0)];
        // Centered x for width 40 is 30
        let result = snap_to_neighbors(Size::new(40.0, 40.0), Point::new(33.0, 500.0), &neighbors, SNAP_DISTANCE);
        assert!((result.point.x - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_neighbor_snap_prefers_smallest_delta() {
        let neighbors = [
            Rect::new(100.0, 0.0, 150.0, 50.0),
            Rect::new(96.0, 200.0, 146.0, 250.0),
        ];
        let result = snap_to_neighbors(Size::new(50.0, 50.0), Point::new(97.0, 500.0), &neighbors, SNAP_DISTANCE);
        assert!((result.point.x - 96.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_neighbor_snap_threshold_is_strict() {
        let neighbors = [Rect::new(100.0, 100.0, 200.0, 200.0)];
        let result = snap_to_neighbors(Size::new(50.0, 50.0), Point::new(310.0, 310.0), &neighbors, SNAP_DISTANCE);
        assert!(!result.is_snapped());
        // Exactly snap_distance away is not close enough
        let result = snap_to_neighbors(Size::new(50.0, 50.0), Point::new(90.0, 500.0), &neighbors, SNAP_DISTANCE);
        assert!(!result.snapped_x);
    }

    #[test]
    fn test_axes_are_independent() {
        let neighbors = [Rect::new(0.0, 0.0, 100.0, 100.0), Rect::new(500.0, 203.0, 600.0, 303.0)];
        let result = snap_to_neighbors(Size::new(50.0, 50.0), Point::new(3.0, 205.0), &neighbors, SNAP_DISTANCE);
        assert!((result.point.x - 0.0).abs() < f64::EPSILON);
        assert!((result.point.y - 203.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_position_modes() {
        let neighbors = [Rect::new(103.0, 0.0, 203.0, 100.0)];
        let size = Size::new(50.0, 50.0);
        let candidate = Point::new(98.0, 500.0);
        let none = snap_position(SnapMode::None, size, candidate, &neighbors, GRID_SIZE, SNAP_DISTANCE);
        assert_eq!(none, candidate);
        let grid = snap_position(SnapMode::Grid, size, candidate, &neighbors, GRID_SIZE, SNAP_DISTANCE);
        assert_eq!(grid, Point::new(100.0, 500.0));
        let both = snap_position(SnapMode::GridAndNeighbors, size, candidate, &neighbors, GRID_SIZE, SNAP_DISTANCE);
        assert_eq!(both, Point::new(103.0, 500.0));
    }
}
