//! Serializable export of placements and annotations.

use crate::annotation::Annotation;
use crate::artboard::Artboard;
use crate::error::{CanvasError, CanvasResult};
use crate::history::DocumentState;
use crate::item::PlacedItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub created: DateTime<Utc>,
    pub item_count: usize,
    pub annotation_count: usize,
    pub vector_path_count: usize,
    #[serde(default)]
    pub artboard_count: usize,
}

/// Exported canvas state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSnapshot {
    pub items: Vec<PlacedItem>,
    /// Drawn annotations (strokes and shapes).
    pub annotations: Vec<Annotation>,
    /// Pen-tool bezier paths.
    pub vector_paths: Vec<Annotation>,
    #[serde(default)]
    pub artboards: Vec<Artboard>,
    pub metadata: SnapshotMetadata,
}

impl CanvasSnapshot {
    /// Capture `items`, `artboards` and `annotations`, splitting out vector
    /// paths.
    pub fn capture<'a>(
        items: Vec<PlacedItem>,
        artboards: Vec<Artboard>,
        annotations: impl IntoIterator<Item = &'a Annotation>,
    ) -> Self {
        let (vector_paths, annotations): (Vec<Annotation>, Vec<Annotation>) = annotations
            .into_iter()
            .cloned()
            .partition(Annotation::is_vector_path);
        let metadata = SnapshotMetadata {
            created: Utc::now(),
            item_count: items.len(),
            annotation_count: annotations.len(),
            vector_path_count: vector_paths.len(),
            artboard_count: artboards.len(),
        };
        Self {
            items,
            annotations,
            vector_paths,
            artboards,
            metadata,
        }
    }

    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Snapshot)
    }

    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Snapshot)
    }

    /// Document state for loading. Vector paths follow drawn annotations.
    pub fn into_document(self) -> DocumentState {
        let mut annotations = self.annotations;
        annotations.extend(self.vector_paths);
        DocumentState {
            items: self.items,
            annotations,
            artboards: self.artboards,
        }
    }
}
