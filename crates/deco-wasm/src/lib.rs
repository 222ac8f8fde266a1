//! WASM bridge for Deco — exposes the canvas interaction engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded in the doodle
//! canvas webview. Drawing stays in JS: after any call that returns `true`
//! the webview re-reads `scene_json` and repaints.

mod measure;
mod outbox;

use deco_core::catalog;
use deco_core::config::DecoConfig;
use deco_core::model::{CharacterEntity, ShapeEntity, ShapeKind};
use deco_editor::input::{InputEvent, Modifiers};
use deco_editor::tools::Tool;
use deco_editor::{CursorHint, InteractionController, InteractionMode, InteractionState};
use deco_render::EstimatedMeasure;
use measure::CanvasMeasure;
use outbox::WebviewSink;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// All interaction from the webview JS goes through this struct. Save and
/// explorer messages come back out through the outbox.
#[wasm_bindgen]
pub struct DecoCanvas {
    controller: InteractionController<WebviewSink>,
}

#[wasm_bindgen]
impl DecoCanvas {
    /// Create a canvas controller with default settings at the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        let config = DecoConfig {
            canvas_width: width,
            canvas_height: height,
            ..DecoConfig::default()
        };
        Self::with_config(&config)
    }

    /// Create a canvas controller from a `deco.json`-shaped settings object.
    pub fn from_config(json: &str) -> Result<DecoCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config: DecoConfig =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_config(&config))
    }

    /// Route outbound messages to `poster(json)` instead of queueing them.
    pub fn set_poster(&mut self, poster: js_sys::Function) {
        self.controller.sink_mut().set_poster(Some(poster));
    }

    /// Measure glyph hit boxes with the real canvas font metrics.
    pub fn attach_context(&mut self, ctx: CanvasRenderingContext2d) {
        self.controller.set_measure(Box::new(CanvasMeasure::new(ctx)));
    }

    /// Queued outbound messages as a JSON array. Empties the queue.
    pub fn take_messages(&mut self) -> String {
        self.controller.sink_mut().take_json()
    }

    // ─── Scene I/O ───────────────────────────────────────────────────────

    /// Hydrate from the host's `sceneLoaded` reply. Returns false (and
    /// keeps the current scene) if either list fails to parse.
    pub fn load_scene(&mut self, characters_json: &str, shapes_json: &str) -> bool {
        let characters: Vec<CharacterEntity> = match serde_json::from_str(characters_json) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("rejecting characters: {e}");
                return false;
            }
        };
        let shapes: Vec<ShapeEntity> = match serde_json::from_str(shapes_json) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("rejecting shapes: {e}");
                return false;
            }
        };
        self.controller.load(characters, shapes);
        true
    }

    /// Adopt the explorer's list of paths it shows as used (a JSON array
    /// of strings). Paths with no character come back as `markAvailable`.
    pub fn restore_used_files(&mut self, paths_json: &str) -> bool {
        match serde_json::from_str::<Vec<String>>(paths_json) {
            Ok(paths) => {
                self.controller.restore_registry(paths);
                true
            }
            Err(e) => {
                log::warn!("rejecting used-file list: {e}");
                false
            }
        }
    }

    /// Scene snapshot for the renderer.
    pub fn scene_json(&self) -> String {
        let scene = self.controller.scene();
        let palette = self.controller.palette();
        let snapshot = serde_json::json!({
            "characters": scene.characters(),
            "shapes": scene.shapes(),
            "state": state_name(self.controller.state()),
            "cursor": cursor_css(self.controller.cursor()),
            "tool": tool_name(palette.tool()),
            "color": palette.color(),
            "deleteArmed": palette.is_delete_armed(),
            "carry": self.controller.mode() == InteractionMode::Carry,
        });
        snapshot.to_string()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.controller.resize_canvas(width, height);
    }

    // ─── Pointer / keyboard / drop ───────────────────────────────────────

    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.controller.handle(&InputEvent::PointerDown { x, y })
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.controller.handle(&InputEvent::PointerMove { x, y })
    }

    pub fn handle_pointer_up(&mut self) -> bool {
        self.controller.handle(&InputEvent::PointerUp)
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.controller.handle(&InputEvent::PointerLeave)
    }

    pub fn handle_click(&mut self, x: f64, y: f64) -> bool {
        self.controller.handle(&InputEvent::Click { x, y })
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.controller.handle(&InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    /// `payload` is the `application/json` text of the explorer drag.
    pub fn handle_drop(&mut self, x: f64, y: f64, payload: &str) -> bool {
        self.controller.handle(&InputEvent::Drop {
            x,
            y,
            payload: payload.to_string(),
        })
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// `select`, `circle`, `square`, `triangle`, or `glyph:<char>`.
    /// Returns false for an unknown name.
    pub fn set_tool(&mut self, name: &str) -> bool {
        match tool_from_name(name) {
            Some(tool) => {
                self.controller.select_tool(tool);
                true
            }
            None => false,
        }
    }

    pub fn set_color(&mut self, color: &str) {
        self.controller.set_color(color);
    }

    pub fn set_carry_mode(&mut self, carry: bool) {
        let mode = if carry {
            InteractionMode::Carry
        } else {
            InteractionMode::Drag
        };
        self.controller.set_mode(mode);
    }

    /// Returns whether delete mode is now armed.
    pub fn toggle_delete(&mut self) -> bool {
        self.controller.toggle_delete_mode()
    }

    // ─── Save / reset ────────────────────────────────────────────────────

    pub fn save(&mut self) {
        self.controller.save_all();
    }

    pub fn reset_characters(&mut self) -> bool {
        self.controller.reset_characters();
        true
    }

    pub fn reset_shapes(&mut self) -> bool {
        self.controller.reset_shapes();
        true
    }
}

impl DecoCanvas {
    fn with_config(config: &DecoConfig) -> Self {
        let mut controller = InteractionController::new(
            config,
            WebviewSink::default(),
            Box::new(EstimatedMeasure::default()),
        );
        controller.load(catalog::default_characters(), catalog::default_shapes());
        Self { controller }
    }
}

// ─── Name mapping ────────────────────────────────────────────────────────

fn tool_from_name(name: &str) -> Option<Tool> {
    if let Some(glyph) = name.strip_prefix("glyph:") {
        return (!glyph.is_empty()).then(|| Tool::Glyph(glyph.to_string()));
    }
    match name {
        "select" => Some(Tool::Select),
        "circle" => Some(Tool::Shape(ShapeKind::Circle)),
        "square" => Some(Tool::Shape(ShapeKind::Square)),
        "triangle" => Some(Tool::Shape(ShapeKind::Triangle)),
        _ => None,
    }
}

fn tool_name(tool: &Tool) -> String {
    match tool {
        Tool::Select => "select".to_string(),
        Tool::Glyph(glyph) => format!("glyph:{glyph}"),
        Tool::Shape(ShapeKind::Circle) => "circle".to_string(),
        Tool::Shape(ShapeKind::Square) => "square".to_string(),
        Tool::Shape(ShapeKind::Triangle) => "triangle".to_string(),
    }
}

fn cursor_css(hint: CursorHint) -> &'static str {
    match hint {
        CursorHint::Default => "default",
        CursorHint::Move => "move",
        CursorHint::Resize => "nwse-resize",
        CursorHint::Place => "crosshair",
        CursorHint::Delete => "not-allowed",
    }
}

fn state_name(state: InteractionState) -> &'static str {
    match state {
        InteractionState::Idle => "idle",
        InteractionState::Dragging { .. } => "dragging",
        InteractionState::Resizing { .. } => "resizing",
        InteractionState::Carrying { .. } => "carrying",
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Deco WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone palette data (no canvas needed) ──────────────────────────

/// Palette contents for building the toolbar:
/// `{"glyphs":[...],"shapes":[...],"colors":[...]}`.
#[wasm_bindgen]
pub fn palette_json() -> String {
    serde_json::json!({
        "glyphs": catalog::GLYPHS,
        "shapes": catalog::SHAPE_KINDS,
        "colors": catalog::PALETTE_COLORS,
    })
    .to_string()
}
