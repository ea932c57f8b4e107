//! Freehand pencil strokes.

use super::{AnnotationId, AnnotationShape, AnnotationStyle};
use crate::geometry::point_to_polyline_dist;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finalized freehand stroke: a move-to followed by line-tos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: AnnotationId,
    points: Vec<Point>,
    pub style: AnnotationStyle,
}

impl Stroke {
    /// Finalize a stroke from the points captured during the gesture.
    pub fn new(points: Vec<Point>, style: AnnotationStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG path data (`M x y L x y ...`).
    pub fn to_svg_path_data(&self) -> String {
        self.to_path().to_svg()
    }
}

impl AnnotationShape for Stroke {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let Some(&first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(first, first), |acc, &p| acc.union_pt(p))
    }

    fn hit_test(&self, point: Point, radius: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= radius + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(&first) = points.next() {
            path.move_to(first);
            for &p in points {
                path.line_to(p);
            }
        }
        path
    }

    fn style(&self) -> &AnnotationStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Stroke {
        Stroke::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0), Point::new(30.0, 5.0)],
            AnnotationStyle::default(),
        )
    }

    #[test]
    fn test_bounds() {
        assert_eq!(zigzag().bounds(), Rect::new(0.0, 0.0, 30.0, 20.0));
        let empty = Stroke::new(Vec::new(), AnnotationStyle::default());
        assert_eq!(empty.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_to_path_commands() {
        let path = zigzag().to_path();
        assert_eq!(path.elements().len(), 3);
        assert!(zigzag().to_svg_path_data().starts_with('M'));
    }

    #[test]
    fn test_hit_test_between_samples() {
        let stroke = zigzag();
        // On the segment between the first two samples, away from both
        assert!(stroke.hit_test(Point::new(5.0, 10.0), 1.0));
        assert!(!stroke.hit_test(Point::new(30.0, 30.0), 10.0));
    }
}
