//! Gesture state machine for the canvas.
//!
//! Turns `InputEvent`s into `CanvasAction`s. The controller only reads the
//! store and the viewport (through `CanvasContext`); the engine applies
//! whatever it returns, in order.
//!
//! ```text
//!            press on node + move > threshold
//!   Idle ───────────────────────────────────────▶ DraggingNode(id)
//!    │  ▲                                            │
//!    │  └──────────────── pointer up ◀───────────────┘
//!    │  press on empty + move > threshold
//!    ├──────────────────────────────────────────▶ PanningCanvas ── up ──▶ Idle
//!    │  double-tap on node
//!    └──────────────────────────────────────────▶ Editing(id) ── commit/cancel ──▶ Idle
//! ```
//!
//! Pinch zoom runs alongside all of the above.

use crate::config::EditorConfig;
use crate::engine::CanvasAction;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::ViewportTransform;
use mm_core::GraphStore;
use mm_core::id::NodeId;
use mm_core::model::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    PanningCanvas,
    DraggingNode(NodeId),
    Editing(NodeId),
}

impl GestureState {
    pub fn editing(&self) -> Option<NodeId> {
        match self {
            GestureState::Editing(id) => Some(*id),
            _ => None,
        }
    }
}

/// Read-only view of the state the controller decides on.
#[derive(Clone, Copy)]
pub struct CanvasContext<'a> {
    pub store: &'a GraphStore,
    pub viewport: &'a ViewportTransform,
    /// Screen position of the viewport center.
    pub viewport_center: Point,
}

impl CanvasContext<'_> {
    pub fn to_logical(&self, screen: Point) -> Point {
        self.viewport.to_logical(screen, self.viewport_center)
    }

    /// Topmost node under a screen point.
    pub fn hit(&self, screen: Point) -> Option<NodeId> {
        mm_render::hit_test_id(self.to_logical(screen), self.store.nodes())
    }
}

/// A pointer that went down and has not come up yet.
#[derive(Debug, Clone, Copy)]
struct Press {
    start: Point,
    last: Point,
    hit: Option<NodeId>,
    modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy)]
struct LastTap {
    node: NodeId,
    at: Point,
    time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    press: Option<Press>,
    last_tap: Option<LastTap>,
    /// Zoom when the current pinch began.
    pinch_base: Option<f64>,

    drag_threshold: f64,
    double_tap_interval_ms: u64,
    double_tap_slop: f64,
    new_node_text: String,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl GestureController {
    pub fn new(config: &EditorConfig) -> Self {
        let config = config.validated();
        Self {
            state: GestureState::Idle,
            press: None,
            last_tap: None,
            pinch_base: None,
            drag_threshold: config.drag_threshold,
            double_tap_interval_ms: config.double_tap_interval_ms,
            double_tap_slop: config.double_tap_slop,
            new_node_text: config.new_node_text,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_base.is_some()
    }

    /// Leave `Editing` without writing. Returns the node that was being edited.
    pub fn cancel_edit(&mut self) -> Option<NodeId> {
        let id = self.state.editing()?;
        self.state = GestureState::Idle;
        log::debug!("editing {id} cancelled");
        Some(id)
    }

    /// Enter `Editing(id)` from outside the pointer flow (menus, host UI).
    pub fn start_editing(&mut self, id: NodeId) {
        if self.state != GestureState::Editing(id) {
            self.state = GestureState::Editing(id);
            self.press = None;
            log::debug!("gesture: edit {id}");
        }
    }

    /// Drop every in-flight gesture, e.g. after the document was replaced.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.press = None;
        self.last_tap = None;
        self.pinch_base = None;
    }

    /// Handle one input event, returning the actions to apply in order.
    pub fn handle(&mut self, event: &InputEvent, ctx: &CanvasContext) -> Vec<CanvasAction> {
        if let Some(at) = event.position()
            && !at.is_finite()
        {
            log::debug!("non-finite pointer position dropped");
            return vec![];
        }
        match event {
            InputEvent::PointerDown {
                x, y, modifiers, ..
            } => self.pointer_down(Point::new(*x, *y), *modifiers, ctx),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y), ctx),
            InputEvent::PointerUp { x, y, time_ms } => self.pointer_up(Point::new(*x, *y), *time_ms),
            InputEvent::Tap { x, y, modifiers } => {
                let mut actions = self.leave_editing();
                if self.state == GestureState::Idle {
                    let hit = ctx.hit(Point::new(*x, *y));
                    actions.extend(Self::select_actions(hit, *modifiers));
                }
                actions
            }
            InputEvent::DoubleTap { x, y } => {
                let mut actions = self.leave_editing();
                if self.state == GestureState::Idle
                    && let Some(id) = ctx.hit(Point::new(*x, *y))
                {
                    actions.extend(self.begin_edit(id));
                }
                actions
            }
            InputEvent::Pinch { scale } => {
                if !(scale.is_finite() && *scale > 0.0) {
                    return vec![];
                }
                let base = *self.pinch_base.get_or_insert(ctx.viewport.zoom());
                vec![CanvasAction::SetZoom(base * scale)]
            }
            InputEvent::PinchEnd => {
                self.pinch_base = None;
                vec![]
            }
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers, ctx),
            InputEvent::CommitText { text } => match self.state {
                GestureState::Editing(id) => {
                    self.state = GestureState::Idle;
                    log::debug!("editing {id} committed");
                    vec![
                        CanvasAction::SetNodeText {
                            id,
                            text: text.clone(),
                        },
                        CanvasAction::EndEdit,
                    ]
                }
                _ => vec![],
            },
            InputEvent::CancelEdit => self.leave_editing(),
        }
    }

    // ─── Pointer sequence ────────────────────────────────────────────────

    fn pointer_down(
        &mut self,
        at: Point,
        modifiers: Modifiers,
        ctx: &CanvasContext,
    ) -> Vec<CanvasAction> {
        let mut actions = self.leave_editing();
        // a down without a matching up: close out whatever was running
        if self.state == GestureState::PanningCanvas {
            actions.push(CanvasAction::EndPan);
        }
        self.state = GestureState::Idle;
        self.press = Some(Press {
            start: at,
            last: at,
            hit: ctx.hit(at),
            modifiers,
        });
        actions
    }

    fn pointer_move(&mut self, at: Point, ctx: &CanvasContext) -> Vec<CanvasAction> {
        let Some(press) = self.press.as_mut() else {
            return vec![];
        };
        let zoom = ctx.viewport.zoom();

        match self.state {
            GestureState::Idle => {
                let travelled = (at - press.start).length() / zoom;
                if travelled <= self.drag_threshold {
                    return vec![];
                }
                // a drag or pan breaks any tap sequence
                self.last_tap = None;
                let mut actions = Vec::new();
                match press.hit {
                    Some(id) => {
                        if !ctx.store.is_selected(id) {
                            actions.push(CanvasAction::SelectNode {
                                id,
                                exclusive: true,
                            });
                        }
                        // first frame covers everything since the press
                        actions.push(CanvasAction::MoveSelection((at - press.start) / zoom));
                        self.state = GestureState::DraggingNode(id);
                        log::debug!("gesture: drag {id}");
                    }
                    None => {
                        actions.push(CanvasAction::BeginPan);
                        actions.push(CanvasAction::UpdatePan(at - press.start));
                        self.state = GestureState::PanningCanvas;
                        log::debug!("gesture: pan");
                    }
                }
                press.last = at;
                actions
            }
            GestureState::PanningCanvas => {
                press.last = at;
                vec![CanvasAction::UpdatePan(at - press.start)]
            }
            GestureState::DraggingNode(_) => {
                let delta = (at - press.last) / zoom;
                press.last = at;
                vec![CanvasAction::MoveSelection(delta)]
            }
            GestureState::Editing(_) => vec![],
        }
    }

    fn pointer_up(&mut self, at: Point, time_ms: u64) -> Vec<CanvasAction> {
        let Some(press) = self.press.take() else {
            return vec![];
        };
        match self.state {
            GestureState::PanningCanvas => {
                self.state = GestureState::Idle;
                self.last_tap = None;
                vec![CanvasAction::EndPan]
            }
            GestureState::DraggingNode(_) => {
                self.state = GestureState::Idle;
                self.last_tap = None;
                vec![]
            }
            GestureState::Idle => self.tap(press, at, time_ms),
            GestureState::Editing(_) => vec![],
        }
    }

    /// A press that never crossed the threshold.
    fn tap(&mut self, press: Press, at: Point, time_ms: u64) -> Vec<CanvasAction> {
        let Some(id) = press.hit else {
            self.last_tap = None;
            return vec![CanvasAction::ClearSelection];
        };

        if let Some(prev) = self.last_tap.take()
            && prev.node == id
            && time_ms.saturating_sub(prev.time_ms) <= self.double_tap_interval_ms
            && (at - prev.at).length() <= self.double_tap_slop
        {
            return self.begin_edit(id);
        }

        self.last_tap = Some(LastTap {
            node: id,
            at,
            time_ms,
        });
        Self::select_actions(Some(id), press.modifiers)
    }

    fn select_actions(hit: Option<NodeId>, modifiers: Modifiers) -> Vec<CanvasAction> {
        match hit {
            Some(id) => vec![CanvasAction::SelectNode {
                id,
                exclusive: !modifiers.multi_select(),
            }],
            None => vec![CanvasAction::ClearSelection],
        }
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    fn begin_edit(&mut self, id: NodeId) -> Vec<CanvasAction> {
        self.start_editing(id);
        vec![
            CanvasAction::SelectNode {
                id,
                exclusive: true,
            },
            CanvasAction::BeginEdit(id),
        ]
    }

    fn leave_editing(&mut self) -> Vec<CanvasAction> {
        match self.cancel_edit() {
            Some(_) => vec![CanvasAction::EndEdit],
            None => vec![],
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    fn key(&mut self, key: &str, modifiers: Modifiers, ctx: &CanvasContext) -> Vec<CanvasAction> {
        if self.state.editing().is_some() {
            // the text field owns the keyboard
            return match key {
                "Escape" => self.leave_editing(),
                _ => vec![],
            };
        }
        let Some(shortcut) = ShortcutMap::resolve(key, modifiers) else {
            return vec![];
        };
        log::trace!("shortcut {shortcut:?}");

        match shortcut {
            ShortcutAction::AddNode => vec![CanvasAction::AddNode {
                text: self.new_node_text.clone(),
                position: ctx.viewport.logical_center(ctx.viewport_center),
            }],
            ShortcutAction::DeleteSelected => vec![CanvasAction::DeleteSelected],
            ShortcutAction::EditSelected => {
                let mut selected = ctx.store.selected_nodes();
                match (selected.next(), selected.next(), self.state) {
                    (Some(node), None, GestureState::Idle) => {
                        let id = node.id;
                        self.begin_edit(id)
                    }
                    _ => vec![],
                }
            }
            ShortcutAction::SelectAll => vec![CanvasAction::SelectAll],
            ShortcutAction::Duplicate => vec![CanvasAction::DuplicateSelected],
            ShortcutAction::ConnectSelected => vec![CanvasAction::ConnectSelected],
            ShortcutAction::ZoomIn => vec![CanvasAction::ZoomIn],
            ShortcutAction::ZoomOut => vec![CanvasAction::ZoomOut],
            ShortcutAction::ResetView => vec![CanvasAction::ResetView],
            ShortcutAction::Deselect => vec![CanvasAction::ClearSelection],
        }
    }
}
