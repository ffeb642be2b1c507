//! Render-side helpers for the mind map canvas: hit testing, colors, and
//! the screen-space draw list a drawing backend replays each frame.

pub mod hit;
pub mod paint;
pub mod palette;

pub use hit::{hit_test, hit_test_id};
pub use paint::{CanvasTransform, DrawCommand, DrawList, connection_curve, paint_scene};
pub use palette::Color;
