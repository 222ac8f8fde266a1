//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Lives in Rust
//! so the webview and tests share one table.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Drop whatever is being dragged, resized, or carried where it is.
    ForceRelease,
    ToggleDelete,
    ToolSelect,
    ToolCircle,
    ToolSquare,
    ToolTriangle,
    /// Explicit save of both collections, with confirmation.
    SaveScene,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a `KeyboardEvent.key` value plus modifiers.
    ///
    /// On macOS `meta` is ⌘; elsewhere `ctrl` plays that role.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        if key == "Escape" {
            return Some(ShortcutAction::ForceRelease);
        }

        let cmd = ctrl || meta;
        if cmd {
            return match key {
                "s" | "S" => Some(ShortcutAction::SaveScene),
                _ => None,
            };
        }
        if shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::ToggleDelete),
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "c" | "C" => Some(ShortcutAction::ToolCircle),
            "s" | "S" => Some(ShortcutAction::ToolSquare),
            "t" | "T" => Some(ShortcutAction::ToolTriangle),
            _ => None,
        }
    }
}
