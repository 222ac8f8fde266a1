//! Palette state: what a click on empty canvas does.
//!
//! Picking a palette item disarms delete mode and arming delete mode drops
//! the palette item, so at most one of the two is active.

use deco_core::catalog;
use deco_core::model::ShapeKind;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pick up and move existing entities.
    #[default]
    Select,
    /// Stamp a glyph where the pointer goes down.
    Glyph(String),
    /// Stamp a shape where the pointer goes down.
    Shape(ShapeKind),
}

impl Tool {
    pub fn places(&self) -> bool {
        !matches!(self, Tool::Select)
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    tool: Tool,
    color: String,
    delete_armed: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tool: Tool::Select,
            color: catalog::PALETTE_COLORS[0].to_string(),
            delete_armed: false,
        }
    }
}

impl Palette {
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_string();
    }

    pub fn select(&mut self, tool: Tool) {
        if tool.places() {
            self.delete_armed = false;
        }
        self.tool = tool;
    }

    pub fn is_delete_armed(&self) -> bool {
        self.delete_armed
    }

    /// Flip delete mode. Returns the new state.
    pub fn toggle_delete(&mut self) -> bool {
        self.delete_armed = !self.delete_armed;
        if self.delete_armed {
            self.tool = Tool::Select;
        }
        self.delete_armed
    }
}
