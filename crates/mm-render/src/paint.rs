//! Graph store → screen-space draw list.
//!
//! Produces backend-neutral drawing instructions for one frame:
//! connection curves first (underneath), then node boxes in z-order.
//! The backend replays the list with whatever vector library it uses.

use crate::palette::{self, Color};
use kurbo::{CubicBez, Point as KPoint, Rect as KRect, Shape};
use mm_core::GraphStore;
use mm_core::id::{ConnectionId, NodeId};
use mm_core::model::{Connection, Node, Point};

/// How far along the from→to span the curve control points sit.
const CURVE_TENSION: f64 = 0.3;

/// Extra logical width of the soft glow under each connection.
const GLOW_EXTRA_WIDTH: f64 = 2.0;

/// Logical → screen mapping consumed by the painters.
pub trait CanvasTransform {
    fn zoom(&self) -> f64;

    fn to_screen(&self, logical: Point, viewport_center: Point) -> Point;
}

/// A single drawing instruction in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Stroked cubic Bézier.
    Curve {
        connection: ConnectionId,
        path: CubicBez,
        width: f64,
        color: Color,
        dash: Option<Vec<f64>>,
    },
    /// Rounded, bordered node box with a centered label.
    NodeBox {
        node: NodeId,
        rect: KRect,
        corner_radius: f64,
        border_width: f64,
        fill: Color,
        border: Color,
        text_color: Color,
        text: String,
        selected: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn curves(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Curve { .. }))
    }

    pub fn node_boxes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::NodeBox { .. }))
    }
}

fn kp(p: Point) -> KPoint {
    KPoint::new(p.x, p.y)
}

/// Edge-touching counts, so zero-height curve bounds are not culled.
fn overlaps(a: KRect, b: KRect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Paint the whole canvas. Call once per frame with a fresh list.
///
/// `visible`, when given, is the screen rectangle of the viewport; anything
/// entirely outside it is culled.
pub fn paint_scene(
    out: &mut DrawList,
    store: &GraphStore,
    transform: &impl CanvasTransform,
    viewport_center: Point,
    visible: Option<KRect>,
) {
    paint_connections(out, store, transform, viewport_center, visible);
    paint_nodes(out, store, transform, viewport_center, visible);
}

/// One glow stroke and one line stroke per connection, as a curve between
/// the transformed node centers.
pub fn paint_connections(
    out: &mut DrawList,
    store: &GraphStore,
    transform: &impl CanvasTransform,
    viewport_center: Point,
    visible: Option<KRect>,
) {
    let zoom = transform.zoom();
    for conn in store.connections() {
        let (Some(from), Some(to)) = (store.node(conn.from), store.node(conn.to)) else {
            log::trace!("SKIP connection {} with missing endpoint", conn.id);
            continue;
        };

        let path = if conn.is_self_loop() {
            self_loop_curve(from, transform, viewport_center)
        } else {
            connection_curve(
                transform.to_screen(from.position, viewport_center),
                transform.to_screen(to.position, viewport_center),
            )
        };

        let bounds = path.bounding_box();
        if visible.is_some_and(|view| !overlaps(bounds, view)) {
            continue;
        }

        push_connection(out, conn, path, zoom);
    }
}

fn push_connection(out: &mut DrawList, conn: &Connection, path: CubicBez, zoom: f64) {
    let color = palette::connection_color(conn.style.kind);
    let dash = conn
        .style
        .dash_pattern
        .as_ref()
        .map(|pattern| pattern.iter().map(|d| d * zoom).collect());

    out.push(DrawCommand::Curve {
        connection: conn.id,
        path,
        width: (conn.style.line_width + GLOW_EXTRA_WIDTH) * zoom,
        color: color.with_alpha(0.3),
        dash: None,
    });
    out.push(DrawCommand::Curve {
        connection: conn.id,
        path,
        width: conn.style.line_width * zoom,
        color: color.with_alpha(0.8),
        dash,
    });
}

/// Horizontal-tangent S-curve: controls sit at the endpoints' heights,
/// `CURVE_TENSION` of the way across the horizontal span.
pub fn connection_curve(from: Point, to: Point) -> CubicBez {
    let span = to.x - from.x;
    let ctrl1 = Point::new(from.x + span * CURVE_TENSION, from.y);
    let ctrl2 = Point::new(to.x - span * CURVE_TENSION, to.y);
    CubicBez::new(kp(from), kp(ctrl1), kp(ctrl2), kp(to))
}

/// A loop rising from the node's top edge and landing back on it.
fn self_loop_curve(
    node: &Node,
    transform: &impl CanvasTransform,
    viewport_center: Point,
) -> CubicBez {
    let zoom = transform.zoom();
    let center = transform.to_screen(node.position, viewport_center);
    let half = node.size.half() * zoom;
    let top = center.y - half.y;
    let quarter = half.x / 2.0;

    CubicBez::new(
        KPoint::new(center.x - quarter, top),
        KPoint::new(center.x - half.x, top - 2.0 * half.y),
        KPoint::new(center.x + half.x, top - 2.0 * half.y),
        KPoint::new(center.x + quarter, top),
    )
}

/// One box per node, bottom to top.
pub fn paint_nodes(
    out: &mut DrawList,
    store: &GraphStore,
    transform: &impl CanvasTransform,
    viewport_center: Point,
    visible: Option<KRect>,
) {
    let zoom = transform.zoom();
    for node in store.nodes() {
        let min = transform.to_screen(node.top_left(), viewport_center);
        let size = node.size.scaled(zoom);
        let rect = KRect::new(min.x, min.y, min.x + size.width, min.y + size.height);

        if visible.is_some_and(|view| !overlaps(rect, view)) {
            continue;
        }

        let selected = store.is_selected(node.id);
        let colors = palette::node_colors(node.style.kind, selected);
        let border_width = if selected {
            node.style.border_width.max(3.0)
        } else {
            node.style.border_width
        };

        out.push(DrawCommand::NodeBox {
            node: node.id,
            rect,
            corner_radius: node.style.corner_radius * zoom,
            border_width: border_width * zoom,
            fill: colors.fill,
            border: colors.border,
            text_color: colors.text,
            text: node.text.clone(),
            selected,
        });
    }
}
