//! Canvas controller: the single owner of placed items, selection,
//! annotations, viewport and the active gesture.
//!
//! Input handlers are synchronous. Anything that needs an async collaborator
//! (confirmation, dimension probing) is queued as a [`PendingAction`] and run
//! by [`Canvas::process_pending`].

use crate::align::{AlignOp, compute_alignment};
use crate::annotation::{
    Annotation, AnnotationId, AnnotationLayer, AnnotationStyle, PenClick, SerializableColor, Stroke,
};
use crate::arrange::{Arranger, merge_arranged, project};
use crate::artboard::{Artboard, ArtboardId, ArtboardLayer, GRID_ORIGIN, MIN_ARTBOARD_SIZE};
use crate::collaborators::{
    ConfirmationProvider, MediaCatalog, MediaInfo, NaturalSizeProbe, NoticeLevel, Notifier,
};
use crate::config::CanvasConfig;
use crate::drop::{DropPayload, DropRequest, FileDescriptor};
use crate::error::CanvasResult;
use crate::geometry::CloseThreshold;
use crate::history::{DocumentState, History};
use crate::input::{ClickTracker, Key, KeyInput, Modifiers, MouseButton, PointerInput, WheelInput};
use crate::interaction::{GestureOrigin, InteractionState};
use crate::item::{ItemId, ItemPatch, MediaRef, PlacedItem};
use crate::manipulation::{
    DragState, HandleHit, ResizeHandle, ResizeState, RotationState, handle_at, resize_handle_at,
};
use crate::selection::{SelectMode, SelectionRect, SelectionSet, compute_marquee_selection};
use crate::snap::{SnapMode, snap_position};
use crate::snapshot::CanvasSnapshot;
use crate::store::ItemStore;
use crate::tools::{EraserMode, ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use std::collections::HashSet;

/// Events fired outward to the host, drained with [`Canvas::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    SelectionChanged(Vec<ItemId>),
    /// Topmost item under an idle pointer changed.
    ItemHovered(Option<ItemId>),
    DropRequested(DropRequest),
    /// The text tool was clicked; the host opens its text-page dialog.
    TextPageRequested { at: Point },
    AnnotationAdded(AnnotationId),
    /// The selected artboard changed. Item and artboard selection are
    /// exclusive.
    ArtboardSelected(Option<ArtboardId>),
}

/// Work queued by input handlers that needs an async collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    DeleteSelection,
    ClearAnnotations,
    FitToNaturalSize(ItemId),
}

/// Collaborators used by [`Canvas::process_pending`].
#[derive(Clone, Copy)]
pub struct CanvasServices<'a> {
    pub confirm: &'a dyn ConfirmationProvider,
    pub probe: &'a dyn NaturalSizeProbe,
    pub notifier: &'a dyn Notifier,
}

/// A placed item together with its resolved media record.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem<'a> {
    pub item: &'a PlacedItem,
    pub media: MediaInfo,
}

/// The canvas state.
pub struct Canvas {
    config: CanvasConfig,
    store: ItemStore,
    selection: SelectionSet,
    annotations: AnnotationLayer,
    artboards: ArtboardLayer,
    selected_artboard: Option<ArtboardId>,
    /// Zoom and pan shared by items, annotations and the grid.
    pub viewport: Viewport,
    tools: ToolManager,
    snap_mode: SnapMode,
    state: InteractionState,
    history: History,
    clicks: ClickTracker,
    close_threshold: CloseThreshold,
    hovered: Option<ItemId>,
    events: Vec<CanvasEvent>,
    pending: Vec<PendingAction>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create an empty canvas with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            store: ItemStore::with_min_size(config.min_item_size),
            selection: SelectionSet::new(),
            annotations: AnnotationLayer::new(),
            artboards: ArtboardLayer::new(),
            selected_artboard: None,
            viewport: Viewport::with_zoom_range(config.min_zoom, config.max_zoom),
            tools: ToolManager::new(),
            snap_mode: config.snap_mode,
            state: InteractionState::Idle,
            history: History::new(config.max_history),
            clicks: ClickTracker::new(config.double_click_ms, config.double_click_distance),
            close_threshold: CloseThreshold {
                screen_radius: config.close_radius_screen,
                min_radius: config.close_radius_min,
            },
            hovered: None,
            events: Vec::new(),
            pending: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        self.store.get(id)
    }

    /// Selected ids, most recent last.
    pub fn selection(&self) -> &[ItemId] {
        self.selection.ids()
    }

    pub fn annotations(&self) -> &AnnotationLayer {
        &self.annotations
    }

    pub fn artboards(&self) -> &ArtboardLayer {
        &self.artboards
    }

    pub fn artboard(&self, id: ArtboardId) -> Option<&Artboard> {
        self.artboards.get(id)
    }

    pub fn selected_artboard(&self) -> Option<ArtboardId> {
        self.selected_artboard
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.state
    }

    pub fn snap_mode(&self) -> SnapMode {
        self.snap_mode
    }

    pub fn set_snap_mode(&mut self, mode: SnapMode) {
        self.snap_mode = mode;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain events fired since the last call.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_actions(&self) -> &[PendingAction] {
        &self.pending
    }

    /// Switch tools. Any active gesture ends and uncommitted drafts are
    /// discarded.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if tool == self.tools.current_tool {
            return false;
        }
        self.end_gesture();
        log::debug!("Tool {:?} -> {:?}", self.tools.current_tool, tool);
        self.tools.set_tool(tool)
    }

    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        self.tools.eraser_mode = mode;
    }

    pub fn set_style(&mut self, style: AnnotationStyle) {
        self.tools.current_style = style;
    }

    // --- Document state and history ---

    fn document_state(&self) -> DocumentState {
        DocumentState {
            items: self.store.snapshot(),
            annotations: self.annotations.iter().cloned().collect(),
            artboards: self.artboards.snapshot(),
        }
    }

    fn restore_document(&mut self, state: DocumentState) {
        self.store.restore(state.items);
        self.annotations.restore(state.annotations);
        self.artboards.restore(state.artboards);
        self.prune_selection();
        if self
            .selected_artboard
            .is_some_and(|id| self.artboards.get(id).is_none())
        {
            self.set_selected_artboard(None);
        }
    }

    /// Push `before` to history when something changed.
    fn commit(&mut self, before: DocumentState, changed: bool) -> bool {
        if changed {
            self.history.push(before);
        }
        changed
    }

    /// Push the gesture's start state on its first change.
    fn record(&mut self, origin: &mut GestureOrigin) {
        if !origin.recorded {
            self.history.push(origin.state.clone());
            origin.recorded = true;
        }
    }

    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        let current = self.document_state();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore_document(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        let current = self.document_state();
        match self.history.redo(current) {
            Some(next) => {
                self.restore_document(next);
                true
            }
            None => false,
        }
    }

    // --- Selection ---

    /// Run `f` on the selection and fire `SelectionChanged` if it changed.
    /// Selecting any item deselects the artboard.
    fn update_selection(&mut self, f: impl FnOnce(&mut SelectionSet)) -> bool {
        let before = self.selection.clone();
        f(&mut self.selection);
        let changed = self.selection != before;
        if changed {
            self.events
                .push(CanvasEvent::SelectionChanged(self.selection.ids().to_vec()));
            if !self.selection.is_empty() {
                self.set_selected_artboard(None);
            }
        }
        changed
    }

    fn set_selected_artboard(&mut self, id: Option<ArtboardId>) -> bool {
        if self.selected_artboard == id {
            return false;
        }
        self.selected_artboard = id;
        self.events.push(CanvasEvent::ArtboardSelected(id));
        true
    }

    /// Drop selected ids that no longer exist in the store.
    fn prune_selection(&mut self) {
        let existing: HashSet<ItemId> = self.store.ids().into_iter().collect();
        self.update_selection(|s| s.retain(|id| existing.contains(&id)));
    }

    pub fn select(&mut self, id: ItemId, mode: SelectMode) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.update_selection(|s| s.click(id, mode))
    }

    /// Select every unlocked item.
    pub fn select_all(&mut self) -> bool {
        let ids: Vec<ItemId> = self
            .store
            .iter()
            .filter(|item| !item.locked)
            .map(|item| item.id)
            .collect();
        self.update_selection(|s| s.replace(ids))
    }

    /// Clear the item selection and the selected artboard.
    pub fn clear_selection(&mut self) -> bool {
        let items = self.update_selection(SelectionSet::clear);
        let artboard = self.set_selected_artboard(None);
        items || artboard
    }

    fn selected_unlocked(&self) -> Vec<ItemId> {
        self.selection
            .ids()
            .iter()
            .copied()
            .filter(|id| self.store.get(*id).is_some_and(|item| !item.locked))
            .collect()
    }

    // --- Item operations ---

    /// Add an item on top of all others.
    pub fn add_item(&mut self, item: PlacedItem) -> ItemId {
        let before = self.document_state();
        let id = self.store.create(item);
        self.history.push(before);
        id
    }

    /// Place one new item of `size` per `(media_ref, position)`.
    pub fn add_items_at(&mut self, placements: &[(MediaRef, Point)], size: Size) -> Vec<ItemId> {
        if placements.is_empty() {
            return Vec::new();
        }
        let before = self.document_state();
        let ids: Vec<ItemId> = placements
            .iter()
            .map(|(media_ref, position)| {
                self.store
                    .create(PlacedItem::new(media_ref.clone(), *position, size))
            })
            .collect();
        self.history.push(before);
        ids
    }

    /// Shallow-merge `patch`. Locked items only accept unlocking.
    pub fn update_item(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        let before = self.document_state();
        let changed = self.store.update(id, patch);
        self.commit(before, changed)
    }

    /// Flip the lock flag. Selection membership is unchanged.
    pub fn toggle_lock(&mut self, id: ItemId) -> Option<bool> {
        let before = self.document_state();
        let locked = self.store.toggle_lock(id)?;
        self.history.push(before);
        Some(locked)
    }

    /// Duplicate the selection with the configured offset and select the copies.
    pub fn duplicate_selection(&mut self) -> Vec<ItemId> {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            return Vec::new();
        }
        let before = self.document_state();
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let copies = self.store.duplicate(&ids, offset);
        self.commit(before, !copies.is_empty());
        let selected = copies.clone();
        self.update_selection(|s| s.replace(selected));
        copies
    }

    pub fn bring_selection_to_front(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            return false;
        }
        let before = self.document_state();
        self.store.bring_to_front(&ids);
        self.commit(before, true)
    }

    pub fn send_selection_to_back(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            return false;
        }
        let before = self.document_state();
        self.store.send_to_back(&ids);
        self.commit(before, true)
    }

    /// Move unlocked selected items by `delta`. Returns how many moved.
    pub fn nudge_selection(&mut self, delta: Vec2) -> usize {
        let ids = self.selection.ids().to_vec();
        let before = self.document_state();
        let moved = self.store.translate(&ids, delta);
        self.commit(before, !moved.is_empty());
        moved.len()
    }

    /// Align or distribute the selection. Returns how many items moved.
    pub fn align_selection(&mut self, op: AlignOp) -> usize {
        let items: Vec<&PlacedItem> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.store.get(*id))
            .collect();
        let moves = compute_alignment(op, &items);
        if moves.is_empty() {
            return 0;
        }

        let before = self.document_state();
        let moved = moves
            .into_iter()
            .filter(|(id, position)| self.store.update(*id, &ItemPatch::position(*position)))
            .count();
        self.commit(before, moved > 0);
        log::info!("Applied {:?} to {} item(s)", op, moved);
        moved
    }

    /// Run an external arrangement over every item and merge the result.
    pub async fn arrange(&mut self, arranger: &dyn Arranger) -> CanvasResult<usize> {
        let arranged = arranger.arrange(project(&self.store)).await?;
        let before = self.document_state();
        let changed = merge_arranged(&mut self.store, &arranged)?;
        self.commit(before, !changed.is_empty());
        log::info!("Arranged {} item(s)", changed.len());
        Ok(changed.len())
    }

    /// Remove every item, locked or not.
    pub fn clear_items(&mut self) -> usize {
        let count = self.store.len();
        if count == 0 {
            return 0;
        }
        let before = self.document_state();
        self.store.clear();
        self.prune_selection();
        self.history.push(before);
        log::info!("Cleared {} item(s)", count);
        count
    }

    /// Delete unlocked selected items after confirmation.
    pub async fn delete_selection(&mut self, confirm: &dyn ConfirmationProvider) -> usize {
        let ids = self.selected_unlocked();
        if ids.is_empty() {
            return 0;
        }
        let message = format!("Delete {} selected item(s)?", ids.len());
        if !confirm.request_confirmation(&message).await {
            log::debug!("Delete declined");
            return 0;
        }

        let before = self.document_state();
        let removed = self.store.delete(&ids);
        self.prune_selection();
        self.commit(before, !removed.is_empty());
        log::info!("Deleted {} item(s)", removed.len());
        removed.len()
    }

    /// Remove every annotation and vector path after confirmation.
    pub async fn clear_annotations(&mut self, confirm: &dyn ConfirmationProvider) -> usize {
        if self.annotations.is_empty() {
            return 0;
        }
        if !confirm
            .request_confirmation("Clear all annotations and vector paths?")
            .await
        {
            return 0;
        }
        let before = self.document_state();
        let count = self.annotations.clear();
        self.history.push(before);
        log::info!("Cleared {} annotation(s)", count);
        count
    }

    /// Resize an item to its media's natural dimensions. Position is kept.
    pub async fn fit_to_natural_size(&mut self, id: ItemId, probe: &dyn NaturalSizeProbe) -> bool {
        let Some(media_ref) = self
            .store
            .get(id)
            .filter(|item| !item.locked)
            .map(|item| item.media_ref.clone())
        else {
            return false;
        };
        let Some(size) = probe.probe_natural_size(&media_ref).await else {
            log::debug!("No natural size for {}", media_ref);
            return false;
        };

        let before = self.document_state();
        let patch = ItemPatch {
            size: Some(size),
            ..ItemPatch::default()
        };
        let changed = self.store.update(id, &patch);
        self.commit(before, changed)
    }

    /// Run queued actions against the host's collaborators.
    pub async fn process_pending(&mut self, services: &CanvasServices<'_>) -> usize {
        let actions = std::mem::take(&mut self.pending);
        let count = actions.len();
        for action in actions {
            match action {
                PendingAction::DeleteSelection => {
                    let removed = self.delete_selection(services.confirm).await;
                    if removed > 0 {
                        services
                            .notifier
                            .notify(NoticeLevel::Success, &format!("Deleted {removed} item(s)"));
                    }
                }
                PendingAction::ClearAnnotations => {
                    let cleared = self.clear_annotations(services.confirm).await;
                    if cleared > 0 {
                        services
                            .notifier
                            .notify(NoticeLevel::Info, &format!("Cleared {cleared} annotation(s)"));
                    }
                }
                PendingAction::FitToNaturalSize(id) => {
                    self.fit_to_natural_size(id, services.probe).await;
                }
            }
        }
        count
    }

    // --- Artboards ---

    /// Add an artboard and select it.
    pub fn add_artboard(&mut self, position: Point, size: Size) -> CanvasResult<ArtboardId> {
        let before = self.document_state();
        let id = self.artboards.add(position, size)?;
        self.history.push(before);
        self.select_artboard(id);
        log::info!("Added artboard {}", id);
        Ok(id)
    }

    /// Add a `rows` x `cols` grid of `cell`-sized artboards at the grid
    /// origin and select its first cell.
    pub fn add_artboard_grid(&mut self, rows: u32, cols: u32, cell: Size) -> CanvasResult<Vec<ArtboardId>> {
        let before = self.document_state();
        let ids = self.artboards.add_grid(rows, cols, cell, GRID_ORIGIN)?;
        self.history.push(before);
        if let Some(first) = ids.first() {
            self.select_artboard(*first);
        }
        Ok(ids)
    }

    /// Select an artboard, clearing the item selection.
    pub fn select_artboard(&mut self, id: ArtboardId) -> bool {
        if self.artboards.get(id).is_none() {
            return false;
        }
        let items = self.update_selection(SelectionSet::clear);
        self.set_selected_artboard(Some(id)) || items
    }

    pub fn rename_artboard(&mut self, id: ArtboardId, name: &str) -> bool {
        let before = self.document_state();
        let changed = self.artboards.rename(id, name);
        self.commit(before, changed)
    }

    pub fn set_artboard_background(&mut self, id: ArtboardId, background: SerializableColor) -> bool {
        let before = self.document_state();
        let changed = self.artboards.set_background(id, background);
        self.commit(before, changed)
    }

    /// Flip an artboard's lock flag. Returns the new state.
    pub fn toggle_artboard_lock(&mut self, id: ArtboardId) -> Option<bool> {
        let before = self.document_state();
        let locked = self.artboards.toggle_lock(id)?;
        self.history.push(before);
        Some(locked)
    }

    /// Remove an unlocked artboard. Items on it stay where they are.
    pub fn delete_artboard(&mut self, id: ArtboardId) -> bool {
        let before = self.document_state();
        let removed = self.artboards.remove(id);
        if removed && self.selected_artboard == Some(id) {
            self.set_selected_artboard(None);
        }
        self.commit(before, removed)
    }

    /// Items touching the artboard, in paint order. This is the set a host
    /// renders when exporting the artboard.
    pub fn items_on_artboard(&self, id: ArtboardId) -> Vec<ItemId> {
        let Some(artboard) = self.artboards.get(id) else {
            return Vec::new();
        };
        self.store
            .items_ordered()
            .into_iter()
            .filter(|item| artboard.touches(item.bounds()))
            .map(|item| item.id)
            .collect()
    }

    // --- Export ---

    pub fn export_snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot::capture(
            self.store.snapshot(),
            self.artboards.snapshot(),
            self.annotations.iter(),
        )
    }

    /// Replace items and annotations with a snapshot. Selection and history
    /// are cleared.
    pub fn load_snapshot(&mut self, snapshot: CanvasSnapshot) {
        self.state = InteractionState::Idle;
        self.tools.cancel_drafts();
        let document = snapshot.into_document();
        log::info!(
            "Loading snapshot with {} item(s), {} annotation(s) and {} artboard(s)",
            document.items.len(),
            document.annotations.len(),
            document.artboards.len()
        );
        self.restore_document(document);
        self.clear_selection();
        self.history.clear();
    }

    /// Items in paint order whose media resolves in `catalog`.
    pub fn render_list<'a>(&'a self, catalog: &dyn MediaCatalog) -> Vec<RenderItem<'a>> {
        self.store
            .items_ordered()
            .into_iter()
            .filter_map(|item| match catalog.resolve(&item.media_ref) {
                Some(media) => Some(RenderItem { item, media }),
                None => {
                    log::debug!("Skipping item {} with unresolved media {}", item.id, item.media_ref);
                    None
                }
            })
            .collect()
    }

    // --- Viewport ---

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_by_step(self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_by_step(-self.config.zoom_step)
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Ctrl/Cmd+wheel zooms at the cursor. Any other wheel is left to the
    /// host; panning only happens through a middle-button drag.
    pub fn wheel(&mut self, input: WheelInput) -> bool {
        if !input.modifiers.command() || input.delta.y == 0.0 {
            return false;
        }
        self.viewport.wheel_zoom(input.position, input.delta.y)
    }

    // --- Drops ---

    /// A plain-text drop carrying a media index. Malformed text is ignored.
    pub fn drop_text(&mut self, text: &str, screen_point: Point) -> bool {
        match DropPayload::parse_text(text) {
            Ok(payload) => {
                self.request_drop(payload, screen_point);
                true
            }
            Err(err) => {
                log::warn!("Ignoring drop: {}", err);
                false
            }
        }
    }

    /// OS files dropped on the canvas.
    pub fn drop_files(&mut self, files: Vec<FileDescriptor>, screen_point: Point) -> bool {
        if files.is_empty() {
            log::warn!("Ignoring drop with no files");
            return false;
        }
        self.request_drop(DropPayload::Files(files), screen_point);
        true
    }

    fn request_drop(&mut self, payload: DropPayload, screen_point: Point) {
        let point = self.viewport.to_canvas_space(screen_point);
        let request = DropRequest::new(payload, point, self.config.drop_cascade_offset);
        self.events.push(CanvasEvent::DropRequested(request));
    }

    // --- Pointer input ---

    fn enter(&mut self, state: InteractionState) {
        log::debug!("Interaction {} -> {}", self.state.name(), state.name());
        self.state = state;
    }

    pub fn pointer_down(&mut self, input: PointerInput) {
        if !self.state.is_idle() {
            self.end_gesture();
        }
        if input.button == MouseButton::Middle {
            self.enter(InteractionState::Panning {
                last: input.position,
            });
            return;
        }
        if input.button != MouseButton::Left {
            return;
        }

        let point = self.viewport.to_canvas_space(input.position);
        let zoom = self.viewport.zoom;
        let style = self.tools.current_style;
        match self.tools.current_tool {
            ToolKind::Select => self.select_press(input, point),
            ToolKind::Pencil => self.enter(InteractionState::FreehandDrawing {
                points: vec![point],
            }),
            tool @ (ToolKind::Rectangle | ToolKind::Ellipse) => {
                if let Some(kind) = tool.shape_kind() {
                    self.enter(InteractionState::ShapeDrawing {
                        kind,
                        start: point,
                        current: point,
                    });
                }
            }
            ToolKind::Polygon => {
                if let Some(polygon) =
                    self.tools
                        .polygon
                        .click(point, zoom, &self.close_threshold, style)
                {
                    self.commit_annotation(Annotation::Polygon(polygon));
                }
            }
            ToolKind::VectorPen => {
                let click = self.tools.pen.press(
                    point,
                    zoom,
                    &self.close_threshold,
                    self.config.anchor_pick_radius,
                    input.modifiers.alt,
                    style,
                );
                match click {
                    PenClick::Closed(path) => {
                        self.commit_annotation(Annotation::BezierPath(path));
                    }
                    PenClick::Added(_) | PenClick::HandleGrabbed(..) => {
                        self.enter(InteractionState::BezierEditing)
                    }
                    PenClick::Selected(_) | PenClick::KindToggled(_) => {}
                }
            }
            ToolKind::Text => self.events.push(CanvasEvent::TextPageRequested { at: point }),
            ToolKind::Eraser => match self.tools.eraser_mode {
                EraserMode::Pixel => {
                    let mut origin = GestureOrigin::new(self.document_state());
                    self.erase_at(point, &mut origin);
                    self.enter(InteractionState::Erasing { origin });
                }
                EraserMode::ClearAll => self.pending.push(PendingAction::ClearAnnotations),
            },
        }
    }

    /// Handle of the single selected unlocked item under `point`.
    fn selected_handle_at(&self, point: Point) -> Option<(ItemId, HandleHit)> {
        let [id] = self.selection.ids() else {
            return None;
        };
        let item = self.store.get(*id).filter(|item| !item.locked)?;
        handle_at(item, point, self.viewport.zoom).map(|hit| (*id, hit))
    }

    fn select_press(&mut self, input: PointerInput, point: Point) {
        let double_click = self.clicks.register(&input);

        if let Some((id, hit)) = self.selected_handle_at(point) {
            let origin = GestureOrigin::new(self.document_state());
            let state = self.store.get(id).map(|item| match hit {
                HandleHit::Resize(handle) => InteractionState::Resizing {
                    resize: ResizeState::new(item, handle, input.position),
                    origin,
                },
                HandleHit::Rotate => InteractionState::Rotating {
                    rotation: RotationState::new(item, point),
                    origin,
                },
            });
            if let Some(state) = state {
                self.enter(state);
            }
            return;
        }

        let mode = SelectMode::from_modifiers(input.modifiers);
        let Some(id) = self.store.topmost_at(point) else {
            if self.artboard_press(input, point) {
                return;
            }
            let base = if mode.is_additive() {
                self.selection.ids().to_vec()
            } else {
                self.clear_selection();
                Vec::new()
            };
            self.enter(InteractionState::MarqueeSelecting {
                rect: SelectionRect::new(point),
                base,
            });
            return;
        };

        if double_click {
            self.pending.push(PendingAction::FitToNaturalSize(id));
            return;
        }

        let dragged: Vec<ItemId> = if self.selection.contains(id) {
            if mode == SelectMode::Toggle {
                self.update_selection(|s| {
                    s.toggle(id);
                });
                return;
            }
            self.selection.ids().to_vec()
        } else {
            self.update_selection(|s| s.click(id, mode));
            vec![id]
        };

        if self.store.is_locked(id) {
            log::debug!("Item {} is locked, not dragging", id);
            return;
        }
        let origins = dragged
            .iter()
            .filter_map(|d| self.store.get(*d))
            .filter(|item| !item.locked)
            .map(|item| (item.id, item.position))
            .collect();
        let drag = DragState::new(id, point, origins);
        let origin = GestureOrigin::new(self.document_state());
        self.enter(InteractionState::DraggingItems { drag, origin });
    }

    /// Resize handle of the selected unlocked artboard under `point`.
    fn selected_artboard_handle_at(&self, point: Point) -> Option<(ArtboardId, ResizeHandle)> {
        let artboard = self
            .selected_artboard
            .and_then(|id| self.artboards.get(id))
            .filter(|artboard| !artboard.locked)?;
        resize_handle_at(artboard.bounds(), point, self.viewport.zoom).map(|handle| (artboard.id, handle))
    }

    /// A press that missed every item: grab the selected artboard's handle
    /// or the artboard under the pointer. Returns whether an artboard took
    /// the press.
    fn artboard_press(&mut self, input: PointerInput, point: Point) -> bool {
        if let Some((id, handle)) = self.selected_artboard_handle_at(point) {
            if let Some(bounds) = self.artboards.get(id).map(Artboard::bounds) {
                let resize = ResizeState::from_bounds(id, bounds, handle, input.position);
                let origin = GestureOrigin::new(self.document_state());
                self.enter(InteractionState::ResizingArtboard { resize, origin });
            }
            return true;
        }

        let Some(id) = self.artboards.topmost_at(point) else {
            return false;
        };
        self.select_artboard(id);
        let origins: Vec<(ArtboardId, Point)> = self
            .artboards
            .drag_group(id)
            .into_iter()
            .filter_map(|member| self.artboards.get(member))
            .map(|artboard| (artboard.id, artboard.position))
            .collect();
        if !origins.iter().any(|(member, _)| *member == id) {
            log::debug!("Artboard {} is locked, not dragging", id);
            return true;
        }
        let drag = DragState::new(id, point, origins);
        let origin = GestureOrigin::new(self.document_state());
        self.enter(InteractionState::DraggingArtboards { drag, origin });
        true
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let point = self.viewport.to_canvas_space(input.position);
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            InteractionState::Idle => {
                self.track_hover(point);
                InteractionState::Idle
            }
            InteractionState::Panning { last } => {
                self.viewport.pan_by_screen_delta(input.position - last);
                InteractionState::Panning {
                    last: input.position,
                }
            }
            InteractionState::DraggingItems { drag, mut origin } => {
                self.drag_to(&drag, point, &mut origin);
                InteractionState::DraggingItems { drag, origin }
            }
            InteractionState::Resizing { resize, mut origin } => {
                let (position, size) = resize.geometry_at(
                    input.position,
                    self.viewport.zoom,
                    self.store.min_size(),
                    input.modifiers.shift,
                );
                if self
                    .store
                    .update(resize.target, &ItemPatch::geometry(position, size))
                {
                    self.record(&mut origin);
                }
                InteractionState::Resizing { resize, origin }
            }
            InteractionState::Rotating {
                rotation,
                mut origin,
            } => {
                let snap = input
                    .modifiers
                    .shift
                    .then_some(self.config.rotation_snap_degrees);
                let degrees = rotation.rotation_at(point, snap);
                if self
                    .store
                    .update(rotation.item_id, &ItemPatch::rotation(degrees))
                {
                    self.record(&mut origin);
                }
                InteractionState::Rotating { rotation, origin }
            }
            InteractionState::MarqueeSelecting { mut rect, base } => {
                rect.current = point;
                InteractionState::MarqueeSelecting { rect, base }
            }
            InteractionState::FreehandDrawing { mut points } => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
                InteractionState::FreehandDrawing { points }
            }
            InteractionState::BezierEditing => {
                self.tools.pen.drag_to(point);
                InteractionState::BezierEditing
            }
            InteractionState::ShapeDrawing { kind, start, .. } => InteractionState::ShapeDrawing {
                kind,
                start,
                current: point,
            },
            InteractionState::Erasing { mut origin } => {
                self.erase_at(point, &mut origin);
                InteractionState::Erasing { origin }
            }
            InteractionState::DraggingArtboards { drag, mut origin } => {
                self.drag_artboards_to(&drag, point, &mut origin);
                InteractionState::DraggingArtboards { drag, origin }
            }
            InteractionState::ResizingArtboard { resize, mut origin } => {
                let (position, size) = resize.geometry_at(
                    input.position,
                    self.viewport.zoom,
                    MIN_ARTBOARD_SIZE,
                    input.modifiers.shift,
                );
                if self.artboards.set_geometry(resize.target, position, size) {
                    self.record(&mut origin);
                }
                InteractionState::ResizingArtboard { resize, origin }
            }
        };
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        if !self.state.is_idle() {
            self.pointer_move(input);
        }
        self.end_gesture();
    }

    /// The pointer left the canvas: end the gesture and clear hover.
    pub fn pointer_leave(&mut self) {
        self.end_gesture();
        if self.hovered.take().is_some() {
            self.events.push(CanvasEvent::ItemHovered(None));
        }
    }

    fn track_hover(&mut self, point: Point) {
        if self.tools.current_tool == ToolKind::VectorPen {
            self.tools
                .pen
                .hover(point, self.viewport.zoom, &self.close_threshold);
        }
        let hovered = self.store.topmost_at(point);
        if hovered != self.hovered {
            self.hovered = hovered;
            self.events.push(CanvasEvent::ItemHovered(hovered));
        }
    }

    /// Move the dragged items rigidly, snapping the anchor item.
    fn drag_to(&mut self, drag: &DragState, point: Point, origin: &mut GestureOrigin) {
        let Some(candidate) = drag.candidate(point) else {
            return;
        };
        let Some(size) = self.store.get(drag.anchor).map(|item| item.size) else {
            return;
        };
        let exclude: HashSet<ItemId> = drag
            .ids()
            .chain(self.selection.ids().iter().copied())
            .collect();
        // A click without motion leaves items where they are
        let snapped = if point == drag.start_pointer {
            candidate
        } else {
            let neighbors = self.store.neighbor_bounds(&exclude);
            snap_position(
                self.snap_mode,
                size,
                candidate,
                &neighbors,
                self.config.grid_size,
                self.config.snap_distance,
            )
        };

        let mut changed = false;
        for (id, position) in drag.positions_for(snapped) {
            changed |= self.store.update(id, &ItemPatch::position(position));
        }
        if changed {
            self.record(origin);
        }
    }

    /// Move the dragged artboards rigidly. The anchor snaps to the grid and
    /// to the other artboards' edges.
    fn drag_artboards_to(&mut self, drag: &DragState, point: Point, origin: &mut GestureOrigin) {
        let Some(candidate) = drag.candidate(point) else {
            return;
        };
        let Some(size) = self.artboards.get(drag.anchor).map(|artboard| artboard.size) else {
            return;
        };
        let snapped = if point == drag.start_pointer {
            candidate
        } else {
            let exclude: HashSet<ArtboardId> = drag.ids().collect();
            let neighbors = self.artboards.neighbor_bounds(&exclude);
            snap_position(
                self.snap_mode,
                size,
                candidate,
                &neighbors,
                self.config.grid_size,
                self.config.snap_distance,
            )
        };

        let mut changed = false;
        for (id, position) in drag.positions_for(snapped) {
            changed |= self.artboards.set_position(id, position);
        }
        if changed {
            self.record(origin);
        }
    }

    fn erase_at(&mut self, point: Point, origin: &mut GestureOrigin) {
        let erased = self.annotations.erase_at(point, self.config.eraser_radius);
        if !erased.is_empty() {
            log::debug!("Erased {} annotation(s)", erased.len());
            self.record(origin);
        }
    }

    fn commit_annotation(&mut self, annotation: Annotation) -> AnnotationId {
        let before = self.document_state();
        self.history.push(before);
        let id = self.annotations.add(annotation);
        self.events.push(CanvasEvent::AnnotationAdded(id));
        id
    }

    /// Finish the active gesture, committing whatever it produced.
    fn end_gesture(&mut self) {
        let state = std::mem::take(&mut self.state);
        if !state.is_idle() {
            log::debug!("Interaction {} -> idle", state.name());
        }
        let style = self.tools.current_style;
        match state {
            InteractionState::MarqueeSelecting { rect, base } => {
                let hits = compute_marquee_selection(rect.to_rect(), self.store.iter());
                self.update_selection(|s| {
                    s.replace(base);
                    for id in hits {
                        s.extend(id);
                    }
                });
            }
            InteractionState::FreehandDrawing { points } => {
                if points.len() >= 2 {
                    self.commit_annotation(Annotation::Stroke(Stroke::new(points, style)));
                }
            }
            InteractionState::ShapeDrawing {
                kind,
                start,
                current,
            } => {
                if let Some(shape) = kind.create(start, current, style) {
                    self.commit_annotation(shape);
                }
            }
            InteractionState::BezierEditing => self.tools.pen.release(),
            InteractionState::Idle
            | InteractionState::Panning { .. }
            | InteractionState::DraggingItems { .. }
            | InteractionState::Resizing { .. }
            | InteractionState::Rotating { .. }
            | InteractionState::Erasing { .. }
            | InteractionState::DraggingArtboards { .. }
            | InteractionState::ResizingArtboard { .. } => {}
        }
    }

    /// Abandon the active gesture, reverting anything it changed.
    fn cancel_gesture(&mut self) -> bool {
        let state = std::mem::take(&mut self.state);
        if state.is_idle() {
            return false;
        }
        log::debug!("Interaction {} cancelled", state.name());
        match state {
            InteractionState::DraggingItems { origin, .. }
            | InteractionState::Resizing { origin, .. }
            | InteractionState::Rotating { origin, .. }
            | InteractionState::Erasing { origin }
            | InteractionState::DraggingArtboards { origin, .. }
            | InteractionState::ResizingArtboard { origin, .. } => {
                if origin.recorded {
                    self.history.discard_last();
                    self.restore_document(origin.state);
                }
            }
            InteractionState::BezierEditing => self.tools.pen.release(),
            _ => {}
        }
        true
    }

    // --- Keyboard input ---

    /// Handle a key press while the canvas has focus. Returns whether the
    /// key was consumed.
    pub fn key_down(&mut self, input: KeyInput) -> bool {
        if self.draft_key(input.key) {
            return true;
        }
        match input.key {
            Key::Escape => self.cancel_gesture() || self.clear_selection(),
            Key::Delete | Key::Backspace => {
                if self.selection.is_empty() || !self.state.is_idle() {
                    return false;
                }
                self.pending.push(PendingAction::DeleteSelection);
                true
            }
            Key::Enter => false,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                let Some(direction) = input.key.arrow_direction() else {
                    return false;
                };
                if !self.state.is_idle() {
                    return false;
                }
                let step = if input.modifiers.shift {
                    self.config.nudge_large
                } else {
                    self.config.nudge_small
                };
                self.nudge_selection(direction * step) > 0
            }
            Key::Char(c) => self.char_key(c.to_ascii_lowercase(), input.modifiers),
        }
    }

    /// Enter, Escape and Backspace act on an open pen or polygon draft
    /// before anything else.
    fn draft_key(&mut self, key: Key) -> bool {
        let style = self.tools.current_style;
        match self.tools.current_tool {
            ToolKind::VectorPen if !self.tools.pen.is_empty() => {
                match key {
                    Key::Enter => {
                        if let Some(path) = self.tools.pen.commit(style) {
                            self.commit_annotation(Annotation::BezierPath(path));
                        }
                    }
                    Key::Escape => self.tools.pen.cancel(),
                    Key::Backspace => {
                        self.tools.pen.remove_last();
                    }
                    _ => return false,
                }
                if matches!(self.state, InteractionState::BezierEditing) {
                    self.state = InteractionState::Idle;
                }
                true
            }
            ToolKind::Polygon if !self.tools.polygon.is_empty() => {
                match key {
                    Key::Enter => {
                        if let Some(polygon) = self.tools.polygon.finish(style) {
                            self.commit_annotation(Annotation::Polygon(polygon));
                        }
                    }
                    Key::Escape => self.tools.polygon.cancel(),
                    Key::Backspace => {
                        self.tools.polygon.pop();
                    }
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    fn char_key(&mut self, c: char, modifiers: Modifiers) -> bool {
        if modifiers.command() {
            return match c {
                'a' | 'd' if !self.state.is_idle() => false,
                'a' => {
                    self.select_all();
                    true
                }
                'd' => {
                    self.duplicate_selection();
                    true
                }
                'z' if modifiers.shift => {
                    self.redo();
                    true
                }
                'z' => {
                    self.undo();
                    true
                }
                'y' => {
                    self.redo();
                    true
                }
                _ => false,
            };
        }
        if modifiers.alt || modifiers.shift {
            return false;
        }
        match ToolKind::from_shortcut(c) {
            Some(tool) => {
                self.set_tool(tool);
                true
            }
            None => false,
        }
    }
}
