//! Input abstraction layer.
//!
//! Platform pointer, touch, trackpad and keyboard callbacks are normalized
//! into `InputEvent`s in screen coordinates before they reach the gesture
//! controller.

use mm_core::model::Point;

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub const CMD: Modifiers = Modifiers {
        meta: true,
        ..Self::NONE
    };

    /// Tapping with any of these adds to the selection instead of replacing it.
    pub fn multi_select(&self) -> bool {
        self.shift || self.meta || self.ctrl
    }

    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event. Coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown {
        x: f64,
        y: f64,
        /// Monotonic timestamp, used for double-tap detection.
        time_ms: u64,
        modifiers: Modifiers,
    },

    PointerMove { x: f64, y: f64 },

    PointerUp { x: f64, y: f64, time_ms: u64 },

    /// A tap recognized by the platform.
    Tap { x: f64, y: f64, modifiers: Modifiers },

    /// A double-tap recognized by the platform.
    DoubleTap { x: f64, y: f64 },

    /// Pinch / trackpad magnify. `scale` is cumulative since the gesture began.
    Pinch { scale: f64 },

    PinchEnd,

    /// `key` is the `KeyboardEvent.key`-style name (`"a"`, `"Delete"`, `" "`).
    Key { key: String, modifiers: Modifiers },

    /// Submit the text field of the node being edited.
    CommitText { text: String },

    CancelEdit,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, time_ms: u64) -> Self {
        Self::PointerDown {
            x,
            y,
            time_ms,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn pointer_up(x: f64, y: f64, time_ms: u64) -> Self {
        Self::PointerUp { x, y, time_ms }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }

    /// Screen position, if this is a positional event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y, .. }
            | Self::Tap { x, y, .. }
            | Self::DoubleTap { x, y } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}
