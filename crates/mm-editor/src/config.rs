//! Editor tuning knobs.
//!
//! `EditorConfig` can be loaded from JSON by the host; every field is
//! optional and falls back to the constants below.

use serde::{Deserialize, Serialize};

// ── Zoom ──

pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 3.0;
/// Increment for the zoom in/out buttons and shortcuts.
pub const ZOOM_STEP: f64 = 0.2;

// ── Gestures ──

/// Logical px a press must travel before it becomes a pan or drag.
pub const DRAG_THRESHOLD: f64 = 5.0;
pub const DOUBLE_TAP_INTERVAL_MS: u64 = 300;
/// Max screen px between the two taps of a double-tap.
pub const DOUBLE_TAP_SLOP: f64 = 10.0;

pub const NEW_NODE_TEXT: &str = "New Node";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    pub drag_threshold: f64,
    pub double_tap_interval_ms: u64,
    pub double_tap_slop: f64,
    pub new_node_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            zoom_step: ZOOM_STEP,
            drag_threshold: DRAG_THRESHOLD,
            double_tap_interval_ms: DOUBLE_TAP_INTERVAL_MS,
            double_tap_slop: DOUBLE_TAP_SLOP,
            new_node_text: NEW_NODE_TEXT.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|c| c.validated())
    }

    /// Copy with nonsensical values replaced, so the zoom clamp can never
    /// admit zero and thresholds are never negative.
    pub fn validated(&self) -> Self {
        let mut c = self.clone();
        if !(c.zoom_min.is_finite() && c.zoom_min > 0.0) {
            log::warn!("zoomMin {} invalid, using {ZOOM_MIN}", c.zoom_min);
            c.zoom_min = ZOOM_MIN;
        }
        if c.zoom_max.is_nan() || c.zoom_max < c.zoom_min {
            log::warn!("zoomMax {} below zoomMin, clamping", c.zoom_max);
            c.zoom_max = c.zoom_min;
        }
        if !(c.zoom_step.is_finite() && c.zoom_step > 0.0) {
            c.zoom_step = ZOOM_STEP;
        }
        if !(c.drag_threshold.is_finite() && c.drag_threshold >= 0.0) {
            c.drag_threshold = DRAG_THRESHOLD;
        }
        if !(c.double_tap_slop.is_finite() && c.double_tap_slop >= 0.0) {
            c.double_tap_slop = DOUBLE_TAP_SLOP;
        }
        c
    }
}
