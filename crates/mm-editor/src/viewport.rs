//! Pan/zoom transform between screen and logical canvas space.
//!
//! ```text
//! screen  = logical * zoom + pan_offset + viewport_center
//! logical = (screen - viewport_center - pan_offset) / zoom
//! ```
//!
//! Zoom is clamped to `[zoom_min, zoom_max]` on every write, and the lower
//! bound is always strictly positive, so the inverse never divides by zero.

use crate::config::EditorConfig;
use mm_core::model::{Point, Rect, Size, Vector};
use mm_render::CanvasTransform;
use serde::{Deserialize, Serialize};

/// Canvas size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Screen point that maps to logical origin when unpanned.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    zoom: f64,
    pan_offset: Vector,
    is_dragging: bool,
    drag_start_offset: Vector,

    zoom_min: f64,
    zoom_max: f64,
    zoom_step: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ViewportTransform {
    /// Identity transform (zoom 1, no pan) with bounds from `config`.
    pub fn new(config: &EditorConfig) -> Self {
        let config = config.validated();
        Self {
            zoom: 1.0_f64.clamp(config.zoom_min, config.zoom_max),
            pan_offset: Vector::ZERO,
            is_dragging: false,
            drag_start_offset: Vector::ZERO,
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            zoom_step: config.zoom_step,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> Vector {
        self.pan_offset
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn drag_start_offset(&self) -> Vector {
        self.drag_start_offset
    }

    /// `(zoom_min, zoom_max)`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.zoom_min, self.zoom_max)
    }

    // ─── Zoom ────────────────────────────────────────────────────────────

    /// Store `requested` clamped to the zoom bounds. NaN is ignored.
    pub fn set_zoom(&mut self, requested: f64) {
        if requested.is_nan() {
            log::debug!("set_zoom(NaN) ignored");
            return;
        }
        self.zoom = requested.clamp(self.zoom_min, self.zoom_max);
        log::trace!("zoom {requested} -> {}", self.zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_step);
    }

    /// Back to zoom 1, no pan, not dragging.
    pub fn reset(&mut self) {
        self.set_zoom(1.0);
        self.pan_offset = Vector::ZERO;
        self.drag_start_offset = Vector::ZERO;
        self.is_dragging = false;
    }

    /// Zoom so `rect` (logical) fits inside `viewport` with `padding` screen
    /// pixels on every side, and pan so its center sits at the viewport
    /// center. Degenerate rects keep the current zoom.
    pub fn fit_rect(&mut self, rect: Rect, viewport: Viewport, padding: f64) {
        let avail_w = (viewport.width - 2.0 * padding).max(1.0);
        let avail_h = (viewport.height - 2.0 * padding).max(1.0);
        if rect.width() > 0.0 && rect.height() > 0.0 {
            self.set_zoom((avail_w / rect.width()).min(avail_h / rect.height()));
        }
        // logical center → screen center: center * zoom + pan = 0
        self.pan_offset = -rect.center() * self.zoom;
        self.is_dragging = false;
    }

    // ─── Coordinate mapping ──────────────────────────────────────────────

    pub fn to_screen(&self, logical: Point, viewport_center: Point) -> Point {
        logical * self.zoom + self.pan_offset + viewport_center
    }

    pub fn to_logical(&self, screen: Point, viewport_center: Point) -> Point {
        (screen - viewport_center - self.pan_offset) / self.zoom
    }

    /// Logical point currently under the viewport center.
    pub fn logical_center(&self, viewport_center: Point) -> Point {
        self.to_logical(viewport_center, viewport_center)
    }

    /// Logical length → screen length.
    pub fn scale_length(&self, len: f64) -> f64 {
        len * self.zoom
    }

    // ─── Panning ─────────────────────────────────────────────────────────

    pub fn begin_pan(&mut self) {
        self.drag_start_offset = self.pan_offset;
        self.is_dragging = true;
    }

    /// `screen_delta` is the total pointer travel since the pan began.
    /// The offset is always recomputed from the drag-start reference.
    pub fn update_pan(&mut self, screen_delta: Vector) {
        if !screen_delta.is_finite() {
            log::debug!("update_pan with non-finite delta ignored");
            return;
        }
        self.pan_offset = self.drag_start_offset + screen_delta / self.zoom;
        log::trace!("pan -> ({}, {})", self.pan_offset.x, self.pan_offset.y);
    }

    pub fn end_pan(&mut self) {
        self.is_dragging = false;
    }
}

impl CanvasTransform for ViewportTransform {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn to_screen(&self, logical: Point, viewport_center: Point) -> Point {
        ViewportTransform::to_screen(self, logical, viewport_center)
    }
}
