//! Style tag → color mapping.

use mm_core::model::{ConnectionStyleKind, NodeStyleKind};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

pub const BLUE: Color = Color::rgba(0.0, 0.478, 1.0, 1.0);
pub const GRAY: Color = Color::rgba(0.557, 0.557, 0.576, 1.0);
pub const GRAY6: Color = Color::rgba(0.949, 0.949, 0.969, 1.0);
pub const ORANGE: Color = Color::rgba(1.0, 0.584, 0.0, 1.0);
pub const TEXT: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

/// Resolved colors for one node box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeColors {
    pub fill: Color,
    pub border: Color,
    pub text: Color,
}

pub fn node_colors(kind: NodeStyleKind, selected: bool) -> NodeColors {
    let (fill, border) = match kind {
        NodeStyleKind::Selected => (BLUE.with_alpha(0.1), BLUE),
        NodeStyleKind::CodeBlock => (GRAY6, ORANGE),
        NodeStyleKind::Default => (GRAY6, BLUE),
    };
    if selected {
        NodeColors {
            fill: fill.with_alpha(fill.a * 0.9),
            border: BLUE,
            text: TEXT,
        }
    } else {
        NodeColors {
            fill: fill.with_alpha(fill.a * 0.7),
            border: border.with_alpha(0.5),
            text: TEXT,
        }
    }
}

pub fn connection_color(kind: ConnectionStyleKind) -> Color {
    match kind {
        ConnectionStyleKind::Highlighted => BLUE,
        ConnectionStyleKind::Default => GRAY,
    }
}
