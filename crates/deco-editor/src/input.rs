//! Input abstraction layer.
//!
//! Normalizes the webview's mouse, keyboard, and drag-and-drop events
//! into a single `InputEvent` enum consumed by the controller.

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Pointer left the canvas. Ends a gesture like `PointerUp`.
    PointerLeave,
    Click { x: f64, y: f64 },
    Key { key: String, modifiers: Modifiers },
    /// Something is being dragged over the canvas.
    DragOver { x: f64, y: f64 },
    /// An explorer entry was dropped; `payload` is the raw transfer text.
    Drop { x: f64, y: f64, payload: String },
}

impl InputEvent {
    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::Click { x, y }
            | Self::DragOver { x, y }
            | Self::Drop { x, y, .. } => Some((*x, *y)),
            Self::PointerUp | Self::PointerLeave | Self::Key { .. } => None,
        }
    }
}
