//! Core data model for mind map documents.
//!
//! A document is a flat list of labeled nodes (z-order = list order) and a
//! list of directed connections between them. Everything here lives in
//! *logical* canvas coordinates, unscaled and unpanned.
//!
//! A node's `position` is its **center**. Rendering derives the top-left
//! corner from it, hit testing uses the centered box, and connections
//! anchor on it.

use crate::id::{ConnectionId, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A point in logical canvas space. Serialized as `[x, y]`.
pub type Point = glam::DVec2;

/// A displacement in logical canvas space. Serialized as `[dx, dy]`.
pub type Vector = glam::DVec2;

/// Size assigned to freshly created nodes.
pub const DEFAULT_NODE_SIZE: Size = Size::new(120.0, 60.0);

/// Offset applied to copies made by `duplicate_nodes`.
pub const DUPLICATE_OFFSET: Vector = Vector::new(50.0, 50.0);

// ─── Geometry ────────────────────────────────────────────────────────────

/// A 2D extent. Serialized as `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both components are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn half(&self) -> Vector {
        Vector::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

impl From<[f64; 2]> for Size {
    fn from([width, height]: [f64; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Size> for [f64; 2] {
    fn from(size: Size) -> Self {
        [size.width, size.height]
    }
}

/// Axis-aligned rectangle given by its min (top-left) and max (bottom-right) corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Point, size: Size) -> Self {
        let half = size.half();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) / 2.0
    }

    /// Edges are inclusive on all four sides.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

// ─── Styles ──────────────────────────────────────────────────────────────

/// Visual preset of a node. Serialized as its `styleType` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStyleKind {
    #[default]
    Default,
    Selected,
    CodeBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(rename = "styleType")]
    pub kind: NodeStyleKind,
    pub border_width: f64,
    pub corner_radius: f64,
}

impl NodeStyle {
    pub const DEFAULT: NodeStyle = NodeStyle {
        kind: NodeStyleKind::Default,
        border_width: 2.0,
        corner_radius: 12.0,
    };

    pub const fn selected() -> Self {
        Self {
            kind: NodeStyleKind::Selected,
            border_width: 3.0,
            corner_radius: 12.0,
        }
    }

    /// Developer-focused preset for code snippets.
    pub const fn code_block() -> Self {
        Self {
            kind: NodeStyleKind::CodeBlock,
            border_width: 2.0,
            corner_radius: 8.0,
        }
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStyleKind {
    #[default]
    Default,
    Highlighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStyle {
    #[serde(rename = "styleType")]
    pub kind: ConnectionStyleKind,
    pub line_width: f64,
    /// Dash lengths in logical units; `None` draws a solid line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_pattern: Option<SmallVec<[f64; 4]>>,
}

impl ConnectionStyle {
    pub fn highlighted() -> Self {
        Self {
            kind: ConnectionStyleKind::Highlighted,
            line_width: 3.0,
            dash_pattern: None,
        }
    }
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            kind: ConnectionStyleKind::Default,
            line_width: 2.0,
            dash_pattern: None,
        }
    }
}

// ─── Nodes & connections ─────────────────────────────────────────────────

/// A labeled rectangular element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub text: String,
    /// Center of the node in logical coordinates.
    pub position: Point,
    pub size: Size,
    pub style: NodeStyle,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a node with a fresh id, default size and style, stamped now.
    pub fn new(text: impl Into<String>, position: Point) -> Self {
        Self {
            id: NodeId::generate(),
            text: text.into(),
            position,
            size: DEFAULT_NODE_SIZE,
            style: NodeStyle::DEFAULT,
            created_at: Utc::now(),
        }
    }

    /// Logical bounding box, centered on `position`.
    pub fn frame(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }

    /// Top-left corner, for renderers that lay out from the origin.
    pub fn top_left(&self) -> Point {
        self.position - self.size.half()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.frame().contains(p)
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    #[serde(rename = "fromNodeID")]
    pub from: NodeId,
    #[serde(rename = "toNodeID")]
    pub to: NodeId,
    pub style: ConnectionStyle,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            id: ConnectionId::generate(),
            from,
            to,
            style: ConnectionStyle::default(),
            created_at: Utc::now(),
        }
    }

    /// Whether `node` is the source or the target.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
