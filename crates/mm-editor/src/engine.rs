//! The editor engine: graph store, viewport and gesture controller behind a
//! single mutation entry point, with change notifications.
//!
//! Every mutation goes through [`CanvasEngine::apply`] (or
//! [`CanvasEngine::handle_input`], which turns input into actions first).
//! Listeners are told which aspects changed once the whole batch has been
//! applied, so they never observe a half-applied edit.

use crate::config::EditorConfig;
use crate::gestures::{CanvasContext, GestureController, GestureState};
use crate::input::InputEvent;
use crate::viewport::{Viewport, ViewportTransform};
use mm_core::id::NodeId;
use mm_core::model::{NodeStyle, Point, Vector};
use mm_core::{DecodeError, GraphStore, decode_document, encode_document};
use mm_render::{DrawList, paint_scene};

/// Padding (screen px) around content for "fit to content".
pub const FIT_PADDING: f64 = 40.0;

/// A single edit, produced by gestures and shortcuts or issued directly by
/// the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    // ── Graph ──
    AddNode { text: String, position: Point },
    DeleteNode(NodeId),
    ConnectNodes { from: NodeId, to: NodeId },
    MoveNodes { ids: Vec<NodeId>, offset: Vector },
    /// Move the selection by a logical offset.
    MoveSelection(Vector),
    SetNodeText { id: NodeId, text: String },
    SetNodeStyle { ids: Vec<NodeId>, style: NodeStyle },
    /// Copies become the new selection.
    DuplicateSelected,
    DeleteSelected,
    ConnectSelected,

    // ── Selection ──
    SelectNode { id: NodeId, exclusive: bool },
    ToggleSelection(NodeId),
    ClearSelection,
    SelectAll,

    // ── Viewport ──
    SetZoom(f64),
    ZoomIn,
    ZoomOut,
    ResetView,
    FitContent,
    BeginPan,
    /// Total screen travel since `BeginPan`.
    UpdatePan(Vector),
    EndPan,
    Resize(Viewport),

    // ── Editing ──
    BeginEdit(NodeId),
    EndEdit,

    // ── Document ──
    SetTitle(String),
}

/// Which part of the editor state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasChange {
    Nodes,
    Connections,
    Selection,
    Viewport,
    Editing,
    /// Title changed or the whole document was replaced.
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CanvasChange)>;

/// Aspects touched by one batch, in first-touched order.
#[derive(Debug, Default)]
struct ChangeSet(Vec<CanvasChange>);

impl ChangeSet {
    fn mark(&mut self, change: CanvasChange) {
        if !self.0.contains(&change) {
            self.0.push(change);
        }
    }

    fn mark_if(&mut self, cond: bool, change: CanvasChange) {
        if cond {
            self.mark(change);
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct CanvasEngine {
    store: GraphStore,
    viewport: ViewportTransform,
    gestures: GestureController,
    size: Viewport,
    title: String,
    config: EditorConfig,

    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for CanvasEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEngine")
            .field("title", &self.title)
            .field("nodes", &self.store.nodes().len())
            .field("connections", &self.store.connections().len())
            .field("state", &self.gestures.state())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CanvasEngine {
    /// Empty canvas.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(GraphStore::new(), config)
    }

    pub fn with_store(store: GraphStore, config: EditorConfig) -> Self {
        let config = config.validated();
        Self {
            store,
            viewport: ViewportTransform::new(&config),
            gestures: GestureController::new(&config),
            size: Viewport::default(),
            title: String::new(),
            config,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn viewport_size(&self) -> Viewport {
        self.size
    }

    pub fn viewport_center(&self) -> Point {
        self.size.center()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    /// Node whose text is being edited, if any.
    pub fn editing(&self) -> Option<NodeId> {
        self.gestures.state().editing()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn to_screen(&self, logical: Point) -> Point {
        self.viewport.to_screen(logical, self.size.center())
    }

    pub fn to_logical(&self, screen: Point) -> Point {
        self.viewport.to_logical(screen, self.size.center())
    }

    /// Topmost node under a screen point.
    pub fn hit_test(&self, screen: Point) -> Option<NodeId> {
        mm_render::hit_test_id(self.to_logical(screen), self.store.nodes())
    }

    /// Screen-space drawing instructions for the current state.
    pub fn draw_list(&self) -> DrawList {
        let mut list = DrawList::new();
        let visible = kurbo::Rect::new(0.0, 0.0, self.size.width, self.size.height);
        paint_scene(
            &mut list,
            &self.store,
            &self.viewport,
            self.size.center(),
            Some(visible),
        );
        log::trace!("draw list: {} command(s)", list.len());
        list
    }

    // ─── Observers ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&CanvasChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, changes: &ChangeSet) {
        for change in &changes.0 {
            for (_, listener) in &mut self.listeners {
                listener(change);
            }
        }
    }

    // ─── Mutation entry points ───────────────────────────────────────────

    /// Feed one input event through the gesture controller.
    /// Returns whether any observable state changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let ctx = CanvasContext {
            store: &self.store,
            viewport: &self.viewport,
            viewport_center: self.size.center(),
        };
        let actions = self.gestures.handle(event, &ctx);
        if actions.is_empty() {
            return false;
        }
        self.run(actions).0
    }

    /// Apply one action. Returns whether any observable state changed.
    pub fn apply(&mut self, action: CanvasAction) -> bool {
        self.run(vec![action]).0
    }

    /// Apply a batch, then notify once per changed aspect.
    /// Returns the change flag and the ids of nodes the batch created.
    fn run(&mut self, actions: Vec<CanvasAction>) -> (bool, Vec<NodeId>) {
        let editing_before = self.editing();
        let mut changes = ChangeSet::default();
        let mut created = Vec::new();

        for action in actions {
            created.extend(self.apply_action(action, &mut changes));
        }
        (self.finish(editing_before, changes), created)
    }

    /// Close out a batch: drop editing of a deleted node, then notify.
    fn finish(&mut self, editing_before: Option<NodeId>, mut changes: ChangeSet) -> bool {
        if let Some(id) = self.editing()
            && !self.store.contains_node(id)
        {
            self.gestures.cancel_edit();
        }
        changes.mark_if(self.editing() != editing_before, CanvasChange::Editing);

        let changed = !changes.is_empty();
        self.notify(&changes);
        changed
    }

    fn apply_action(&mut self, action: CanvasAction, changes: &mut ChangeSet) -> Vec<NodeId> {
        use CanvasAction as A;
        use CanvasChange as C;

        match action {
            // ── Graph ──
            A::AddNode { text, position } => {
                return vec![self.insert_node(text, position, changes)];
            }
            A::DeleteNode(id) => {
                let edges = self.store.connections().len();
                let was_selected = self.store.is_selected(id);
                if self.store.delete_node(id).is_some() {
                    changes.mark(C::Nodes);
                    changes.mark_if(self.store.connections().len() != edges, C::Connections);
                    changes.mark_if(was_selected, C::Selection);
                }
            }
            A::ConnectNodes { from, to } => {
                changes.mark_if(self.store.connect_nodes(from, to).is_some(), C::Connections);
            }
            A::MoveNodes { ids, offset } => {
                changes.mark_if(self.store.move_nodes(&ids, offset) > 0, C::Nodes);
            }
            A::MoveSelection(offset) => {
                changes.mark_if(self.store.move_selection(offset) > 0, C::Nodes);
            }
            A::SetNodeText { id, text } => {
                changes.mark_if(self.store.set_node_text(id, text), C::Nodes);
            }
            A::SetNodeStyle { ids, style } => {
                changes.mark_if(self.store.set_node_style(&ids, style) > 0, C::Nodes);
            }
            A::DuplicateSelected => {
                let sources: Vec<NodeId> = self.store.selected_nodes().map(|n| n.id).collect();
                let copies = self.store.duplicate_nodes(&sources);
                if !copies.is_empty() {
                    self.store.set_selection(&copies);
                    changes.mark(C::Nodes);
                    changes.mark(C::Selection);
                }
                return copies;
            }
            A::DeleteSelected => {
                let edges = self.store.connections().len();
                if !self.store.delete_selected().is_empty() {
                    changes.mark(C::Nodes);
                    changes.mark(C::Selection);
                    changes.mark_if(self.store.connections().len() != edges, C::Connections);
                }
            }
            A::ConnectSelected => {
                changes.mark_if(!self.store.connect_selected().is_empty(), C::Connections);
            }

            // ── Selection ──
            A::SelectNode { id, exclusive } => {
                self.update_selection(changes, |s| s.select_node(id, exclusive))
            }
            A::ToggleSelection(id) => self.update_selection(changes, |s| s.toggle_selection(id)),
            A::ClearSelection => self.update_selection(changes, GraphStore::clear_selection),
            A::SelectAll => self.update_selection(changes, GraphStore::select_all),

            // ── Viewport ──
            A::SetZoom(zoom) => self.update_viewport(changes, |vt| vt.set_zoom(zoom)),
            A::ZoomIn => self.update_viewport(changes, ViewportTransform::zoom_in),
            A::ZoomOut => self.update_viewport(changes, ViewportTransform::zoom_out),
            A::ResetView => self.update_viewport(changes, ViewportTransform::reset),
            A::FitContent => {
                if let Some(bounds) = self.store.content_bounds() {
                    let size = self.size;
                    self.update_viewport(changes, |vt| vt.fit_rect(bounds, size, FIT_PADDING));
                }
            }
            A::BeginPan => self.update_viewport(changes, ViewportTransform::begin_pan),
            A::UpdatePan(delta) => self.update_viewport(changes, |vt| vt.update_pan(delta)),
            A::EndPan => self.update_viewport(changes, ViewportTransform::end_pan),
            A::Resize(size) => {
                if size != self.size {
                    self.size = size;
                    changes.mark(C::Viewport);
                }
            }

            // ── Editing ──
            A::BeginEdit(id) => {
                if self.store.contains_node(id) {
                    self.gestures.start_editing(id);
                }
            }
            A::EndEdit => {
                self.gestures.cancel_edit();
            }

            // ── Document ──
            A::SetTitle(title) => {
                if title != self.title {
                    self.title = title;
                    changes.mark(C::Document);
                }
            }
        }
        Vec::new()
    }

    fn insert_node(&mut self, text: String, position: Point, changes: &mut ChangeSet) -> NodeId {
        let id = self.store.add_node(text, position).id;
        changes.mark(CanvasChange::Nodes);
        id
    }

    fn update_selection(&mut self, changes: &mut ChangeSet, f: impl FnOnce(&mut GraphStore)) {
        let before = self.store.selection().clone();
        f(&mut self.store);
        changes.mark_if(*self.store.selection() != before, CanvasChange::Selection);
    }

    fn update_viewport(
        &mut self,
        changes: &mut ChangeSet,
        f: impl FnOnce(&mut ViewportTransform),
    ) {
        let before = self.viewport.clone();
        f(&mut self.viewport);
        changes.mark_if(self.viewport != before, CanvasChange::Viewport);
    }

    // ─── Graph operations ────────────────────────────────────────────────

    /// Add a node; returns its id. Same effect as applying
    /// [`CanvasAction::AddNode`].
    pub fn add_node(&mut self, text: impl Into<String>, position: Point) -> NodeId {
        let editing_before = self.editing();
        let mut changes = ChangeSet::default();
        let id = self.insert_node(text.into(), position, &mut changes);
        self.finish(editing_before, changes);
        id
    }

    pub fn delete_node(&mut self, id: NodeId) -> bool {
        self.apply(CanvasAction::DeleteNode(id))
    }

    pub fn connect_nodes(&mut self, from: NodeId, to: NodeId) -> bool {
        self.apply(CanvasAction::ConnectNodes { from, to })
    }

    pub fn move_nodes(&mut self, ids: &[NodeId], offset: Vector) -> bool {
        self.apply(CanvasAction::MoveNodes {
            ids: ids.to_vec(),
            offset,
        })
    }

    pub fn select_node(&mut self, id: NodeId, exclusive: bool) -> bool {
        self.apply(CanvasAction::SelectNode { id, exclusive })
    }

    pub fn toggle_selection(&mut self, id: NodeId) -> bool {
        self.apply(CanvasAction::ToggleSelection(id))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.apply(CanvasAction::ClearSelection)
    }

    pub fn select_all(&mut self) -> bool {
        self.apply(CanvasAction::SelectAll)
    }

    /// Duplicate the selection; the copies become the new selection.
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        self.run(vec![CanvasAction::DuplicateSelected]).1
    }

    pub fn delete_selected(&mut self) -> bool {
        self.apply(CanvasAction::DeleteSelected)
    }

    pub fn connect_selected(&mut self) -> bool {
        self.apply(CanvasAction::ConnectSelected)
    }

    pub fn set_node_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        self.apply(CanvasAction::SetNodeText {
            id,
            text: text.into(),
        })
    }

    // ─── Viewport operations ─────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.apply(CanvasAction::SetZoom(zoom))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.apply(CanvasAction::ZoomIn)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.apply(CanvasAction::ZoomOut)
    }

    pub fn reset_view(&mut self) -> bool {
        self.apply(CanvasAction::ResetView)
    }

    /// Zoom and pan so every node is visible.
    pub fn fit_content(&mut self) -> bool {
        self.apply(CanvasAction::FitContent)
    }

    pub fn begin_pan(&mut self) -> bool {
        self.apply(CanvasAction::BeginPan)
    }

    pub fn update_pan(&mut self, screen_delta: Vector) -> bool {
        self.apply(CanvasAction::UpdatePan(screen_delta))
    }

    pub fn end_pan(&mut self) -> bool {
        self.apply(CanvasAction::EndPan)
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.apply(CanvasAction::Resize(Viewport::new(width, height)))
    }

    // ─── Document ────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        self.apply(CanvasAction::SetTitle(title.into()))
    }

    pub fn save_json(&self) -> Result<String, serde_json::Error> {
        encode_document(&self.store.to_document(self.title.clone()))
    }

    /// Replace the document. On error nothing changes and no listener fires.
    pub fn load_json(&mut self, json: &str) -> Result<(), DecodeError> {
        let doc = match decode_document(json) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("document rejected: {err}");
                return Err(err);
            }
        };
        let title = doc.title.clone();
        self.store.load_document(doc)?;

        let was_editing = self.editing().is_some();
        self.title = title;
        self.gestures.reset();
        self.viewport.end_pan();
        log::debug!(
            "loaded \"{}\": {} node(s), {} connection(s)",
            self.title,
            self.store.nodes().len(),
            self.store.connections().len()
        );

        let mut changes = ChangeSet::default();
        changes.mark(CanvasChange::Document);
        changes.mark(CanvasChange::Nodes);
        changes.mark(CanvasChange::Connections);
        changes.mark(CanvasChange::Selection);
        changes.mark_if(was_editing, CanvasChange::Editing);
        self.notify(&changes);
        Ok(())
    }
}
