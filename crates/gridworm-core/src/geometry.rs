//! Geometry helpers shared by items, selection and annotations.

use kurbo::{Point, Rect, Vec2};

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Strict overlap test: rectangles that only share an edge do not intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Rotate `point` around `center` by `degrees` (clockwise in screen space).
pub fn rotate_around(point: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Angle in degrees of `point` as seen from `pivot`.
pub fn angle_from(pivot: Point, point: Point) -> f64 {
    (point.y - pivot.y).atan2(point.x - pivot.x).to_degrees()
}

/// Minimum distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
///
/// A single-point polyline degrades to point distance.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Zoom-adjusted proximity radius used to close pen paths and polygons.
///
/// The radius is constant in screen space (`screen_radius / zoom` in canvas
/// units) but never smaller than `min_radius` canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseThreshold {
    pub screen_radius: f64,
    pub min_radius: f64,
}

impl Default for CloseThreshold {
    fn default() -> Self {
        Self {
            screen_radius: 30.0,
            min_radius: 20.0,
        }
    }
}

impl CloseThreshold {
    /// Radius in canvas units at the given zoom level.
    pub fn at_zoom(&self, zoom: f64) -> f64 {
        self.min_radius.max(self.screen_radius / zoom)
    }

    /// Whether `point` would close a figure whose vertices are `points`.
    ///
    /// Closing requires at least three existing vertices.
    pub fn is_near_first_point(&self, points: &[Point], point: Point, zoom: f64) -> bool {
        match points.first() {
            Some(first) if points.len() >= 3 => first.distance(point) <= self.at_zoom(zoom),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-9);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-9);
        assert!(normalize_degrees(360.0).abs() < f64::EPSILON);
        let tiny = normalize_degrees(-1e-20);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!rects_intersect(a, b));
        let c = Rect::new(9.0, 9.0, 20.0, 20.0);
        assert!(rects_intersect(a, c));
    }

    #[test]
    fn test_rotate_around() {
        let p = rotate_around(Point::new(10.0, 0.0), Point::ZERO, 90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
    }

    #[test]
    fn test_polyline_distance() {
        let line = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!((point_to_polyline_dist(Point::new(5.0, 3.0), &line) - 3.0).abs() < 1e-9);
        assert!((point_to_polyline_dist(Point::new(3.0, 4.0), &line[..1]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_threshold_scales_with_zoom() {
        let threshold = CloseThreshold::default();
        assert!((threshold.at_zoom(1.0) - 30.0).abs() < f64::EPSILON);
        assert!((threshold.at_zoom(0.5) - 60.0).abs() < f64::EPSILON);
        // Floor applies when zoomed in
        assert!((threshold.at_zoom(3.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_close_requires_three_points() {
        let threshold = CloseThreshold::default();
        let two = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(!threshold.is_near_first_point(&two, Point::new(1.0, 1.0), 1.0));
        let three = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)];
        assert!(threshold.is_near_first_point(&three, Point::new(10.0, 5.0), 1.0));
        assert!(!threshold.is_near_first_point(&three, Point::new(50.0, 50.0), 1.0));
    }
}
