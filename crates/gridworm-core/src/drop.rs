//! External drag-and-drop payloads.

use crate::error::{CanvasError, CanvasResult};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A dropped OS file, as described by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    /// MIME type reported by the platform, possibly empty.
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
}

/// What was dropped on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DropPayload {
    /// Index of a media record in the host's catalog.
    MediaIndex(usize),
    Files(Vec<FileDescriptor>),
}

impl DropPayload {
    /// Parse a plain-text payload, which must be a non-negative integer.
    pub fn parse_text(text: &str) -> CanvasResult<Self> {
        text.trim()
            .parse::<usize>()
            .map(DropPayload::MediaIndex)
            .map_err(|_| CanvasError::MalformedDrop(format!("expected media index, got {text:?}")))
    }

    /// Number of items the drop will place.
    pub fn len(&self) -> usize {
        match self {
            DropPayload::MediaIndex(_) => 1,
            DropPayload::Files(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A drop released over the canvas, reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRequest {
    pub payload: DropPayload,
    /// Drop point in canvas space.
    pub point: Point,
    /// Where each dropped entry goes, cascading for multi-file drops.
    pub positions: Vec<Point>,
}

impl DropRequest {
    pub fn new(payload: DropPayload, point: Point, cascade: f64) -> Self {
        let positions = cascade_positions(point, payload.len(), cascade);
        Self {
            payload,
            point,
            positions,
        }
    }
}

/// `count` positions starting at `point`, each offset by `cascade` on both axes.
pub fn cascade_positions(point: Point, count: usize, cascade: f64) -> Vec<Point> {
    (0..count)
        .map(|i| point + Vec2::new(cascade, cascade) * i as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        assert_eq!(DropPayload::parse_text("12").unwrap(), DropPayload::MediaIndex(12));
        assert_eq!(DropPayload::parse_text(" 3\n").unwrap(), DropPayload::MediaIndex(3));
        assert!(matches!(
            DropPayload::parse_text("cat.png"),
            Err(CanvasError::MalformedDrop(_))
        ));
        assert!(DropPayload::parse_text("-1").is_err());
    }

    #[test]
    fn test_file_cascade() {
        let files = (0..3)
            .map(|i| FileDescriptor {
                name: format!("f{i}.png"),
                mime_type: "image/png".into(),
                size: 0,
            })
            .collect();
        let request = DropRequest::new(DropPayload::Files(files), Point::new(100.0, 50.0), 20.0);
        assert_eq!(
            request.positions,
            vec![Point::new(100.0, 50.0), Point::new(120.0, 70.0), Point::new(140.0, 90.0)]
        );
    }

    #[test]
    fn test_media_index_single_position() {
        let request = DropRequest::new(DropPayload::MediaIndex(0), Point::new(1.0, 2.0), 20.0);
        assert_eq!(request.positions, vec![Point::new(1.0, 2.0)]);
    }
}
