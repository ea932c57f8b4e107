//! Annotation and vector primitives drawn over the canvas.
//!
//! Annotations live in the same canvas space as placed items and share the
//! viewport transform. Once added to an [`AnnotationLayer`] their geometry is
//! never edited in place; the eraser removes whole primitives.

mod bezier;
mod shapes;
mod stroke;

pub use bezier::{Anchor, AnchorKind, BezierPath, HandleSide, PenClick, PenSession};
pub use shapes::{EllipseShape, PolygonDraft, PolygonShape, RectangleShape};
pub use stroke::Stroke;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke and fill shared by every primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    /// `None` means no fill.
    #[serde(default)]
    pub fill: Option<SerializableColor>,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            stroke: SerializableColor::black(),
            stroke_width: 2.0,
            fill: None,
        }
    }
}

impl AnnotationStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke_color(&self) -> Color {
        self.stroke.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.map(Into::into)
    }
}

/// Common behavior of annotation primitives.
pub trait AnnotationShape {
    fn id(&self) -> AnnotationId;

    /// Bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Whether an eraser of `radius` centered on `point` touches this shape.
    fn hit_test(&self, point: Point, radius: f64) -> bool;

    /// Path representation for rendering.
    fn to_path(&self) -> BezPath;

    fn style(&self) -> &AnnotationStyle;
}

/// Tagged union over every annotation primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    Stroke(Stroke),
    BezierPath(BezierPath),
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
    Polygon(PolygonShape),
}

impl Annotation {
    fn as_shape(&self) -> &dyn AnnotationShape {
        match self {
            Annotation::Stroke(s) => s,
            Annotation::BezierPath(s) => s,
            Annotation::Rectangle(s) => s,
            Annotation::Ellipse(s) => s,
            Annotation::Polygon(s) => s,
        }
    }

    /// Whether this is a pen-tool vector path rather than a drawn annotation.
    pub fn is_vector_path(&self) -> bool {
        matches!(self, Annotation::BezierPath(_))
    }
}

impl AnnotationShape for Annotation {
    fn id(&self) -> AnnotationId {
        self.as_shape().id()
    }

    fn bounds(&self) -> Rect {
        self.as_shape().bounds()
    }

    fn hit_test(&self, point: Point, radius: f64) -> bool {
        self.as_shape().hit_test(point, radius)
    }

    fn to_path(&self) -> BezPath {
        self.as_shape().to_path()
    }

    fn style(&self) -> &AnnotationStyle {
        self.as_shape().style()
    }
}

/// Ordered collection of finalized annotations (back to front).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLayer {
    annotations: Vec<Annotation>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Append a finalized annotation. Returns its id.
    pub fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        self.annotations.push(annotation);
        id
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// Annotations in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Drawn annotations (everything except pen paths).
    pub fn drawn(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| !a.is_vector_path())
    }

    /// Pen-tool vector paths.
    pub fn vector_paths(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| a.is_vector_path())
    }

    /// Ids of every annotation an eraser at `point` would remove.
    pub fn hits_at(&self, point: Point, radius: f64) -> Vec<AnnotationId> {
        self.annotations
            .iter()
            .filter(|a| a.hit_test(point, radius))
            .map(AnnotationShape::id)
            .collect()
    }

    /// Remove every annotation touched by an eraser at `point`.
    pub fn erase_at(&mut self, point: Point, radius: f64) -> Vec<AnnotationId> {
        let hits = self.hits_at(point, radius);
        if !hits.is_empty() {
            self.annotations.retain(|a| !hits.contains(&a.id()));
        }
        hits
    }

    /// Remove everything. Returns how many annotations were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.annotations.len();
        self.annotations.clear();
        count
    }

    /// Replace the contents wholesale.
    pub fn restore(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(points: &[(f64, f64)]) -> Annotation {
        let points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Annotation::Stroke(Stroke::new(points, AnnotationStyle::default()))
    }

    #[test]
    fn test_add_and_get() {
        let mut layer = AnnotationLayer::new();
        let id = layer.add(stroke(&[(0.0, 0.0), (10.0, 10.0)]));
        assert_eq!(layer.len(), 1);
        assert!(layer.get(id).is_some());
    }

    #[test]
    fn test_erase_removes_whole_primitive() {
        let mut layer = AnnotationLayer::new();
        let near = layer.add(stroke(&[(0.0, 0.0), (100.0, 0.0)]));
        let far = layer.add(stroke(&[(0.0, 500.0), (100.0, 500.0)]));

        let erased = layer.erase_at(Point::new(50.0, 8.0), 10.0);
        assert_eq!(erased, vec![near]);
        assert_eq!(layer.len(), 1);
        assert!(layer.get(far).is_some());
    }

    #[test]
    fn test_erase_miss() {
        let mut layer = AnnotationLayer::new();
        layer.add(stroke(&[(0.0, 0.0), (100.0, 0.0)]));
        assert!(layer.erase_at(Point::new(50.0, 30.0), 10.0).is_empty());
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut layer = AnnotationLayer::new();
        layer.add(stroke(&[(0.0, 0.0), (1.0, 1.0)]));
        layer.add(Annotation::Rectangle(RectangleShape::new(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            AnnotationStyle::default(),
        )));
        assert_eq!(layer.clear(), 2);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_vector_paths_split() {
        let mut layer = AnnotationLayer::new();
        layer.add(stroke(&[(0.0, 0.0), (1.0, 1.0)]));
        let anchors = vec![Anchor::new(Point::ZERO), Anchor::new(Point::new(50.0, 0.0))];
        layer.add(Annotation::BezierPath(BezierPath::new(anchors, false, AnnotationStyle::default())));
        assert_eq!(layer.drawn().count(), 1);
        assert_eq!(layer.vector_paths().count(), 1);
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(stroke(&[(0.0, 0.0), (1.0, 1.0)])).unwrap();
        assert_eq!(json["type"], "stroke");
    }

    #[test]
    fn test_color_conversion() {
        let color = SerializableColor::new(10, 20, 30, 255);
        let back: SerializableColor = Color::from(color).into();
        assert_eq!(back, color);
    }
}
