//! Interactive layer of the mind map canvas: viewport transform, gesture
//! state machine, keyboard shortcuts, and the observable `CanvasEngine`
//! that ties them to the graph store.

pub mod config;
pub mod engine;
pub mod gestures;
pub mod input;
pub mod shortcuts;
pub mod viewport;

pub use config::EditorConfig;
pub use engine::{CanvasAction, CanvasChange, CanvasEngine, ListenerId};
pub use gestures::{CanvasContext, GestureController, GestureState};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use viewport::{Viewport, ViewportTransform};
