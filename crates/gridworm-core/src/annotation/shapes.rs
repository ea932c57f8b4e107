//! Rectangle, ellipse and polygon primitives.

use super::{AnnotationId, AnnotationShape, AnnotationStyle};
use crate::geometry::{point_in_polygon, point_to_polyline_dist, CloseThreshold};
use kurbo::{BezPath, Ellipse, Point, Rect, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleShape {
    pub(crate) id: AnnotationId,
    pub rect: Rect,
    pub style: AnnotationStyle,
}

impl RectangleShape {
    pub fn new(rect: Rect, style: AnnotationStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            rect: rect.abs(),
            style,
        }
    }

    /// Rectangle spanned by a drag from `start` to `end`.
    pub fn from_corners(start: Point, end: Point, style: AnnotationStyle) -> Self {
        Self::new(Rect::from_points(start, end), style)
    }
}

impl AnnotationShape for RectangleShape {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    /// Inside the rectangle or within `radius` of its edges.
    fn hit_test(&self, point: Point, radius: f64) -> bool {
        self.rect.inflate(radius, radius).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.rect.to_path(0.1)
    }

    fn style(&self) -> &AnnotationStyle {
        &self.style
    }
}

/// An axis-aligned ellipse annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseShape {
    pub(crate) id: AnnotationId,
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub style: AnnotationStyle,
}

impl EllipseShape {
    pub fn new(center: Point, radius_x: f64, radius_y: f64, style: AnnotationStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x: radius_x.abs(),
            radius_y: radius_y.abs(),
            style,
        }
    }

    /// Ellipse inscribed in the rectangle dragged from `start` to `end`.
    pub fn from_corners(start: Point, end: Point, style: AnnotationStyle) -> Self {
        let rect = Rect::from_points(start, end);
        Self::new(rect.center(), rect.width() / 2.0, rect.height() / 2.0, style)
    }
}

impl AnnotationShape for EllipseShape {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.center.x + self.radius_x,
            self.center.y + self.radius_y,
        )
    }

    /// Normalized-distance test against radii grown by `radius`.
    fn hit_test(&self, point: Point, radius: f64) -> bool {
        let dx = (point.x - self.center.x) / (self.radius_x + radius);
        let dy = (point.y - self.center.y) / (self.radius_y + radius);
        dx * dx + dy * dy <= 1.0
    }

    fn to_path(&self) -> BezPath {
        Ellipse::new(self.center, (self.radius_x, self.radius_y), 0.0).to_path(0.1)
    }

    fn style(&self) -> &AnnotationStyle {
        &self.style
    }
}

/// A polygon annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    pub(crate) id: AnnotationId,
    vertices: Vec<Point>,
    pub closed: bool,
    pub style: AnnotationStyle,
}

impl PolygonShape {
    pub fn new(vertices: Vec<Point>, closed: bool, style: AnnotationStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices,
            closed,
            style,
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }
}

impl AnnotationShape for PolygonShape {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let Some(&first) = self.vertices.first() else {
            return Rect::ZERO;
        };
        self.vertices
            .iter()
            .fold(Rect::from_points(first, first), |acc, &p| acc.union_pt(p))
    }

    /// Any vertex within `radius`, or the point lies inside a closed polygon.
    fn hit_test(&self, point: Point, radius: f64) -> bool {
        if self.vertices.iter().any(|v| v.distance(point) <= radius) {
            return true;
        }
        if self.closed {
            point_in_polygon(point, &self.vertices)
        } else {
            point_to_polyline_dist(point, &self.vertices) <= radius
        }
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut vertices = self.vertices.iter();
        if let Some(&first) = vertices.next() {
            path.move_to(first);
            for &v in vertices {
                path.line_to(v);
            }
            if self.closed {
                path.close_path();
            }
        }
        path
    }

    fn style(&self) -> &AnnotationStyle {
        &self.style
    }
}

/// Vertices of a polygon still being placed, one click at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonDraft {
    vertices: Vec<Point>,
}

impl PolygonDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Handle a click. A click near the first vertex (with at least three
    /// placed) closes the polygon and returns it; the closing click is not
    /// added as a vertex.
    pub fn click(
        &mut self,
        point: Point,
        zoom: f64,
        threshold: &CloseThreshold,
        style: AnnotationStyle,
    ) -> Option<PolygonShape> {
        if threshold.is_near_first_point(&self.vertices, point, zoom) {
            return Some(PolygonShape::new(std::mem::take(&mut self.vertices), true, style));
        }
        self.vertices.push(point);
        None
    }

    /// Close the polygon from the keyboard. Needs at least three vertices;
    /// fewer are discarded.
    pub fn finish(&mut self, style: AnnotationStyle) -> Option<PolygonShape> {
        let vertices = std::mem::take(&mut self.vertices);
        (vertices.len() >= 3).then(|| PolygonShape::new(vertices, true, style))
    }

    /// Remove the most recent vertex.
    pub fn pop(&mut self) -> Option<Point> {
        self.vertices.pop()
    }

    pub fn cancel(&mut self) {
        self.vertices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_from_corners_normalizes() {
        let rect = RectangleShape::from_corners(
            Point::new(100.0, 50.0),
            Point::new(20.0, 80.0),
            AnnotationStyle::default(),
        );
        assert_eq!(rect.bounds(), Rect::new(20.0, 50.0, 100.0, 80.0));
    }

    #[test]
    fn test_rectangle_hit_edge_region() {
        let rect = RectangleShape::new(Rect::new(0.0, 0.0, 100.0, 100.0), AnnotationStyle::default());
        assert!(rect.hit_test(Point::new(50.0, 50.0), 10.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0));
        assert!(!rect.hit_test(Point::new(115.0, 50.0), 10.0));
    }

    #[test]
    fn test_ellipse_hit_normalized_distance() {
        let ellipse = EllipseShape::from_corners(
            Point::new(0.0, 0.0),
            Point::new(200.0, 100.0),
            AnnotationStyle::default(),
        );
        assert_eq!(ellipse.center, Point::new(100.0, 50.0));
        assert!(ellipse.hit_test(Point::new(205.0, 50.0), 10.0));
        assert!(!ellipse.hit_test(Point::new(200.0, 100.0), 10.0));
    }

    #[test]
    fn test_polygon_hit_vertex_and_inside() {
        let polygon = PolygonShape::new(
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)],
            true,
            AnnotationStyle::default(),
        );
        assert!(polygon.hit_test(Point::new(105.0, 105.0), 10.0));
        assert!(polygon.hit_test(Point::new(80.0, 20.0), 10.0));
        assert!(!polygon.hit_test(Point::new(20.0, 80.0), 10.0));
    }

    #[test]
    fn test_polygon_close_scenario() {
        let mut draft = PolygonDraft::new();
        let threshold = CloseThreshold::default();
        let style = AnnotationStyle::default();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            assert!(draft.click(Point::new(x, y), 1.0, &threshold, style).is_none());
        }
        let polygon = draft.click(Point::new(10.0, 5.0), 1.0, &threshold, style).unwrap();
        assert!(polygon.closed);
        assert_eq!(
            polygon.vertices(),
            &[Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)]
        );
        assert!(draft.is_empty());
    }

    #[test]
    fn test_polygon_near_first_with_two_vertices_adds() {
        let mut draft = PolygonDraft::new();
        let threshold = CloseThreshold::default();
        let style = AnnotationStyle::default();
        draft.click(Point::new(0.0, 0.0), 1.0, &threshold, style);
        draft.click(Point::new(100.0, 0.0), 1.0, &threshold, style);
        assert!(draft.click(Point::new(5.0, 5.0), 1.0, &threshold, style).is_none());
        assert_eq!(draft.vertices().len(), 3);
    }

    #[test]
    fn test_polygon_finish_requires_three() {
        let mut draft = PolygonDraft::new();
        let threshold = CloseThreshold::default();
        let style = AnnotationStyle::default();
        draft.click(Point::new(0.0, 0.0), 1.0, &threshold, style);
        draft.click(Point::new(100.0, 0.0), 1.0, &threshold, style);
        assert!(draft.finish(style).is_none());
        assert!(draft.is_empty());
    }
}
