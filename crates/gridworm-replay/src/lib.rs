//! Scripted input sessions for the Gridworm canvas.
//!
//! A script seeds placed items, then feeds pointer, key and wheel input (plus
//! a few toolbar commands) to a [`Canvas`]. The runner plays the host: it
//! answers confirmations with a fixed response, probes natural sizes from a
//! table, and places dropped media where the canvas asks.

use gridworm_core::{
    AlignOp, ArrangeItem, ArtboardId, AutoConfirm, Canvas, CanvasConfig, CanvasError, CanvasEvent,
    CanvasServices, CanvasSnapshot, DEFAULT_ARTBOARD_SIZE, DropPayload, EraserMode,
    FileDescriptor, ItemId, KeyInput, LogNotifier, MediaRef, PlacedItem, PointerInput, SelectMode,
    SnapMode, StaticSizeProbe, ToolKind, WheelInput,
};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Size given to media placed from a drop.
pub const DROPPED_ITEM_SIZE: Size = Size::new(200.0, 200.0);

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("Step {step} refers to item #{item}, but only {count} exist")]
    UnknownItem { step: usize, item: usize, count: usize },
    #[error("Usage: {0}")]
    Usage(String),
}

pub type ReplayResult<T> = Result<T, ReplayError>;

/// An item placed before the first step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSeed {
    pub media_ref: MediaRef,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub group_tag: Option<String>,
}

impl ItemSeed {
    fn to_item(&self) -> PlacedItem {
        let mut item = PlacedItem::new(
            self.media_ref.clone(),
            Point::new(self.x, self.y),
            Size::new(self.width, self.height),
        );
        item.rotation = self.rotation;
        match &self.group_tag {
            Some(tag) => item.with_group_tag(tag.clone()),
            None => item,
        }
    }
}

/// One scripted input or command. Items are addressed by insertion index.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    PointerLeave,
    Key(KeyInput),
    Wheel(WheelInput),
    SetTool { tool: ToolKind },
    SetEraserMode { mode: EraserMode },
    SetSnapMode { mode: SnapMode },
    Select {
        item: usize,
        #[serde(default)]
        additive: bool,
    },
    SelectAll,
    ClearSelection,
    Align { op: AlignOp },
    /// Lay every item out in a row with the given gap.
    ArrangeRow { gap: f64 },
    Duplicate,
    BringToFront,
    SendToBack,
    ToggleLock { item: usize },
    ZoomIn,
    ZoomOut,
    ResetView,
    /// Add one artboard; size defaults to a 400x600 page.
    AddArtboard {
        x: f64,
        y: f64,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    AddArtboardGrid {
        rows: u32,
        cols: u32,
        width: f64,
        height: f64,
    },
    DropText { text: String, x: f64, y: f64 },
    DropFiles { files: Vec<FileDescriptor>, x: f64, y: f64 },
    Undo,
    Redo,
    /// Run queued deletes, clears and natural-size fits now.
    ProcessPending,
}

/// A replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default)]
    pub items: Vec<ItemSeed>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Answer given to every confirmation request.
    #[serde(default = "default_confirm")]
    pub confirm: bool,
    /// Natural dimensions reported for double-click fits.
    #[serde(default)]
    pub natural_sizes: HashMap<MediaRef, Size>,
}

fn default_confirm() -> bool {
    true
}

impl Script {
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> ReplayResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Load a canvas configuration file.
pub fn load_config(path: &Path) -> ReplayResult<CanvasConfig> {
    Ok(CanvasConfig::from_json(&std::fs::read_to_string(path)?)?)
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub snapshot: CanvasSnapshot,
    pub selection: Vec<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_artboard: Option<ArtboardId>,
    /// Canvas events in the order they fired.
    pub events: Vec<String>,
}

/// Play `script` against a fresh canvas.
pub fn run(script: Script, config: CanvasConfig) -> ReplayResult<ReplayReport> {
    let mut canvas = Canvas::with_config(config);
    for seed in &script.items {
        let id = canvas.add_item(seed.to_item());
        if seed.locked {
            canvas.toggle_lock(id);
        }
    }
    log::info!(
        "Replaying {} step(s) over {} item(s)",
        script.steps.len(),
        script.items.len()
    );

    let confirm = AutoConfirm(script.confirm);
    let probe = StaticSizeProbe::new(script.natural_sizes);
    let notifier = LogNotifier;
    let services = CanvasServices {
        confirm: &confirm,
        probe: &probe,
        notifier: &notifier,
    };

    let mut events = Vec::new();
    for (index, step) in script.steps.into_iter().enumerate() {
        log::debug!("Step {}: {:?}", index, step);
        apply_step(&mut canvas, &services, index, step)?;
        for event in canvas.take_events() {
            if let CanvasEvent::DropRequested(request) = &event {
                let placements = drop_placements(&request.payload, &request.positions);
                canvas.add_items_at(&placements, DROPPED_ITEM_SIZE);
            }
            events.push(format!("{event:?}"));
        }
    }
    pollster::block_on(canvas.process_pending(&services));

    Ok(ReplayReport {
        snapshot: canvas.export_snapshot(),
        selection: canvas.selection().to_vec(),
        selected_artboard: canvas.selected_artboard(),
        events,
    })
}

fn item_at(canvas: &Canvas, step: usize, item: usize) -> ReplayResult<ItemId> {
    let ids = canvas.store().ids();
    ids.get(item).copied().ok_or(ReplayError::UnknownItem {
        step,
        item,
        count: ids.len(),
    })
}

fn apply_step(
    canvas: &mut Canvas,
    services: &CanvasServices<'_>,
    index: usize,
    step: Step,
) -> ReplayResult<()> {
    match step {
        Step::PointerDown(input) => canvas.pointer_down(input),
        Step::PointerMove(input) => canvas.pointer_move(input),
        Step::PointerUp(input) => canvas.pointer_up(input),
        Step::PointerLeave => canvas.pointer_leave(),
        Step::Key(input) => {
            canvas.key_down(input);
        }
        Step::Wheel(input) => {
            canvas.wheel(input);
        }
        Step::SetTool { tool } => {
            canvas.set_tool(tool);
        }
        Step::SetEraserMode { mode } => canvas.set_eraser_mode(mode),
        Step::SetSnapMode { mode } => canvas.set_snap_mode(mode),
        Step::Select { item, additive } => {
            let id = item_at(canvas, index, item)?;
            let mode = if additive {
                SelectMode::Extend
            } else {
                SelectMode::Replace
            };
            canvas.select(id, mode);
        }
        Step::SelectAll => {
            canvas.select_all();
        }
        Step::ClearSelection => {
            canvas.clear_selection();
        }
        Step::Align { op } => {
            canvas.align_selection(op);
        }
        Step::ArrangeRow { gap } => {
            let row = move |items: Vec<ArrangeItem>| arrange_row(items, gap);
            pollster::block_on(canvas.arrange(&row))?;
        }
        Step::Duplicate => {
            canvas.duplicate_selection();
        }
        Step::BringToFront => {
            canvas.bring_selection_to_front();
        }
        Step::SendToBack => {
            canvas.send_selection_to_back();
        }
        Step::ToggleLock { item } => {
            let id = item_at(canvas, index, item)?;
            canvas.toggle_lock(id);
        }
        Step::ZoomIn => {
            canvas.zoom_in();
        }
        Step::ZoomOut => {
            canvas.zoom_out();
        }
        Step::ResetView => canvas.reset_view(),
        Step::AddArtboard {
            x,
            y,
            width,
            height,
        } => {
            let size = Size::new(
                width.unwrap_or(DEFAULT_ARTBOARD_SIZE.width),
                height.unwrap_or(DEFAULT_ARTBOARD_SIZE.height),
            );
            canvas.add_artboard(Point::new(x, y), size)?;
        }
        Step::AddArtboardGrid {
            rows,
            cols,
            width,
            height,
        } => {
            canvas.add_artboard_grid(rows, cols, Size::new(width, height))?;
        }
        Step::DropText { text, x, y } => {
            canvas.drop_text(&text, Point::new(x, y));
        }
        Step::DropFiles { files, x, y } => {
            canvas.drop_files(files, Point::new(x, y));
        }
        Step::Undo => {
            canvas.undo();
        }
        Step::Redo => {
            canvas.redo();
        }
        Step::ProcessPending => {
            pollster::block_on(canvas.process_pending(services));
        }
    }
    Ok(())
}

/// Media references the host assigns to dropped entries.
fn drop_placements(payload: &DropPayload, positions: &[Point]) -> Vec<(MediaRef, Point)> {
    let refs: Vec<MediaRef> = match payload {
        DropPayload::MediaIndex(index) => vec![format!("media-{index}")],
        DropPayload::Files(files) => files.iter().map(|f| f.name.clone()).collect(),
    };
    refs.into_iter().zip(positions.iter().copied()).collect()
}

/// Left-to-right row along the top of the first item, keeping sizes.
fn arrange_row(mut items: Vec<ArrangeItem>, gap: f64) -> Vec<ArrangeItem> {
    let Some(first) = items.first() else {
        return items;
    };
    let (mut x, y) = (first.x, first.y);
    for item in &mut items {
        item.x = x;
        item.y = y;
        item.rotation = 0.0;
        x += item.width + gap;
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const DRAG_SCRIPT: &str = r#"{
        "items": [{ "mediaRef": "m1", "x": 100, "y": 100, "width": 200, "height": 150 }],
        "steps": [
            { "type": "pointer_down", "position": { "x": 150, "y": 150 } },
            { "type": "pointer_move", "position": { "x": 250, "y": 200 } },
            { "type": "pointer_up", "position": { "x": 250, "y": 200 } }
        ]
    }"#;

    #[test]
    fn test_drag_script() {
        let report = run(Script::from_json(DRAG_SCRIPT).unwrap(), CanvasConfig::default()).unwrap();
        let item = &report.snapshot.items[0];
        assert_eq!(item.position, Point::new(200.0, 160.0));
        assert_eq!(report.selection, vec![item.id]);
        assert!(report.events[0].starts_with("SelectionChanged"));
    }

    #[test]
    fn test_script_and_config_from_files() {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        script.write_all(DRAG_SCRIPT.as_bytes()).unwrap();
        let mut config = tempfile::NamedTempFile::new().unwrap();
        config.write_all(br#"{ "snap_mode": "none" }"#).unwrap();

        let config = load_config(config.path()).unwrap();
        assert_eq!(config.snap_mode, SnapMode::None);
        let report = run(Script::from_path(script.path()).unwrap(), config).unwrap();
        assert_eq!(report.snapshot.items[0].position, Point::new(200.0, 150.0));
    }

    #[test]
    fn test_declined_delete_keeps_items() {
        let json = r#"{
            "items": [{ "mediaRef": "m1", "x": 0, "y": 0, "width": 100, "height": 100 }],
            "confirm": false,
            "steps": [
                { "type": "select", "item": 0 },
                { "type": "key", "key": "delete" },
                { "type": "process_pending" }
            ]
        }"#;
        let report = run(Script::from_json(json).unwrap(), CanvasConfig::default()).unwrap();
        assert_eq!(report.snapshot.items.len(), 1);
    }

    #[test]
    fn test_dropped_files_are_placed() {
        let json = r#"{
            "steps": [{
                "type": "drop_files",
                "x": 40, "y": 40,
                "files": [{ "name": "a.png", "type": "image/png" }, { "name": "b.png" }]
            }]
        }"#;
        let report = run(Script::from_json(json).unwrap(), CanvasConfig::default()).unwrap();
        let refs: Vec<&str> = report.snapshot.items.iter().map(|i| i.media_ref.as_str()).collect();
        assert_eq!(refs, vec!["a.png", "b.png"]);
        assert_eq!(report.snapshot.items[1].position, Point::new(60.0, 60.0));
    }

    #[test]
    fn test_arrange_row() {
        let json = r#"{
            "items": [
                { "mediaRef": "a", "x": 10, "y": 10, "width": 100, "height": 100 },
                { "mediaRef": "b", "x": 500, "y": 300, "width": 80, "height": 80, "rotation": 30 }
            ],
            "steps": [{ "type": "arrange_row", "gap": 20 }]
        }"#;
        let report = run(Script::from_json(json).unwrap(), CanvasConfig::default()).unwrap();
        let b = &report.snapshot.items[1];
        assert_eq!(b.position, Point::new(130.0, 10.0));
        assert_eq!(b.rotation, 0.0);
    }

    #[test]
    fn test_artboard_drag_and_tagged_seed() {
        let json = r#"{
            "items": [{ "mediaRef": "page-1", "x": 0, "y": 0, "width": 50, "height": 50, "groupTag": "pages" }],
            "steps": [
                { "type": "add_artboard", "x": 100, "y": 100 },
                { "type": "pointer_down", "position": { "x": 300, "y": 300 } },
                { "type": "pointer_move", "position": { "x": 333, "y": 311 } },
                { "type": "pointer_up", "position": { "x": 333, "y": 311 } }
            ]
        }"#;
        let report = run(Script::from_json(json).unwrap(), CanvasConfig::default()).unwrap();
        let board = &report.snapshot.artboards[0];
        assert_eq!(board.position, Point::new(140.0, 120.0));
        assert_eq!(board.size, DEFAULT_ARTBOARD_SIZE);
        assert_eq!(report.selected_artboard, Some(board.id));
        assert_eq!(report.snapshot.items[0].group_tag.as_deref(), Some("pages"));
    }

    #[test]
    fn test_invalid_artboard_grid() {
        let json = r#"{ "steps": [{ "type": "add_artboard_grid", "rows": 2, "cols": 2, "width": 10, "height": 600 }] }"#;
        let err = run(Script::from_json(json).unwrap(), CanvasConfig::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Canvas(CanvasError::InvalidArtboard(_))));
    }

    #[test]
    fn test_unknown_item_index() {
        let json = r#"{ "steps": [{ "type": "select", "item": 3 }] }"#;
        let err = run(Script::from_json(json).unwrap(), CanvasConfig::default()).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownItem { item: 3, count: 0, .. }));
    }

    #[test]
    fn test_malformed_script() {
        assert!(matches!(
            Script::from_json(r#"{ "steps": [{ "type": "teleport" }] }"#),
            Err(ReplayError::Script(_))
        ));
    }
}
