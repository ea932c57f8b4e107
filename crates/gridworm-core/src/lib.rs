//! Gridworm Core Library
//!
//! Platform-agnostic placement, selection, manipulation and annotation logic
//! for the Gridworm free-form media canvas.

pub mod align;
pub mod annotation;
pub mod arrange;
pub mod artboard;
pub mod canvas;
pub mod collaborators;
pub mod config;
pub mod drop;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod item;
pub mod manipulation;
pub mod selection;
pub mod snap;
pub mod snapshot;
pub mod store;
pub mod tools;
pub mod viewport;

pub use align::{AlignOp, compute_alignment};
pub use annotation::{
    Annotation, AnnotationId, AnnotationLayer, AnnotationShape, AnnotationStyle, SerializableColor,
};
pub use arrange::{ArrangeItem, Arranger};
pub use artboard::{
    Artboard, ArtboardId, ArtboardLayer, DEFAULT_ARTBOARD_SIZE, GRID_ORIGIN, GridCell,
    MIN_ARTBOARD_SIZE,
};
pub use canvas::{Canvas, CanvasEvent, CanvasServices, PendingAction, RenderItem};
pub use collaborators::{
    AutoConfirm, ConfirmationProvider, LogNotifier, MediaCatalog, MediaInfo, NaturalSizeProbe,
    NoticeLevel, Notifier, StaticSizeProbe,
};
pub use config::CanvasConfig;
pub use drop::{DropPayload, DropRequest, FileDescriptor};
pub use error::{CanvasError, CanvasResult};
pub use input::{Key, KeyInput, Modifiers, MouseButton, PointerInput, WheelInput};
pub use interaction::InteractionState;
pub use item::{ItemId, ItemPatch, MediaRef, PlacedItem};
pub use manipulation::{HandleHit, ResizeHandle};
pub use selection::{SelectMode, SelectionSet};
pub use snap::{GRID_SIZE, SnapMode, snap_angle, snap_position, snap_to_grid};
pub use snapshot::{CanvasSnapshot, SnapshotMetadata};
pub use store::ItemStore;
pub use tools::{EraserMode, ShapeKind, ToolKind, ToolManager};
pub use viewport::Viewport;
