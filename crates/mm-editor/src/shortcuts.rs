//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. `cmd` means
//! ⌘ on macOS and Ctrl elsewhere; either one is accepted.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    /// New node at the viewport center.
    AddNode,
    DeleteSelected,
    /// Start editing the text of the single selected node.
    EditSelected,
    SelectAll,
    Duplicate,
    /// Chain-connect the selection in z-order.
    ConnectSelected,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,

    // ── UI ──
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"a"`, `"Delete"`, `" "`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.cmd() {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "l" | "L" => Some(ShortcutAction::ConnectSelected),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetView),
                _ => None,
            };
        }

        // ── Single keys ──
        match key {
            " " | "Space" => Some(ShortcutAction::AddNode),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelected),
            "Escape" => Some(ShortcutAction::Deselect),
            "Enter" => Some(ShortcutAction::EditSelected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_single_keys() {
        assert_eq!(
            ShortcutMap::resolve(" ", Modifiers::NONE),
            Some(ShortcutAction::AddNode)
        );
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE),
            Some(ShortcutAction::Deselect)
        );
        assert_eq!(
            ShortcutMap::resolve("Enter", Modifiers::NONE),
            Some(ShortcutAction::EditSelected)
        );
    }

    #[test]
    fn resolve_cmd_combos() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            ShortcutMap::resolve("a", Modifiers::CMD),
            Some(ShortcutAction::SelectAll)
        );
        assert_eq!(
            ShortcutMap::resolve("a", ctrl),
            Some(ShortcutAction::SelectAll)
        );
        assert_eq!(
            ShortcutMap::resolve("d", Modifiers::CMD),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(
            ShortcutMap::resolve("l", Modifiers::CMD),
            Some(ShortcutAction::ConnectSelected)
        );
    }

    #[test]
    fn resolve_zoom() {
        assert_eq!(
            ShortcutMap::resolve("=", Modifiers::CMD),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("+", Modifiers::CMD),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", Modifiers::CMD),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", Modifiers::CMD),
            Some(ShortcutAction::ResetView)
        );
    }

    #[test]
    fn resolve_modifier_precedence() {
        // letters alone are unbound, and cmd shadows the single-key table
        assert_eq!(ShortcutMap::resolve("a", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("Delete", Modifiers::CMD), None);
        assert_eq!(ShortcutMap::resolve("q", Modifiers::NONE), None);
    }
}
