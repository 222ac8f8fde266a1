//! Pointer interaction state machine for the doodle canvas.
//!
//! Translates raw pointer, keyboard, and drop events into scene mutations.
//! Persistence happens when a gesture ends (release, pointer leaving the
//! canvas, Escape, or a carry drop), never on pointer-move.
//!
//! ## States
//!
//! | State      | Entered by                              | Left by                        |
//! |------------|-----------------------------------------|--------------------------------|
//! | `Idle`     | start, end of any gesture               | —                              |
//! | `Dragging` | pointer-down on an entity               | pointer-up / leave / Escape    |
//! | `Resizing` | pointer-down on a shape's resize handle | pointer-up / leave / Escape    |
//! | `Carrying` | click on an entity in carry mode        | second click / Escape          |
//!
//! Delete mode is a palette toggle, not a state: while armed, clicks delete
//! the topmost entity and pointer-down starts nothing.

use crate::autosave::{Notice, SceneAutosaveBridge, SceneDefaults, SceneSink};
use crate::input::{InputEvent, Modifiers};
use crate::registry::UsedFileRegistry;
use crate::scene::CanvasSceneModel;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{Palette, Tool};
use deco_core::catalog;
use deco_core::config::DecoConfig;
use deco_core::model::{
    CharacterEntity, Collection, DropDescriptor, EntityRef, FileMeta, ShapeEntity, ShapeKind,
};
use deco_render::{GlyphMeasure, HitTester, Point, Vec2};

/// Ink for characters created from dropped files.
const FILE_GLYPH_COLOR: &str = "#333333";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging { target: EntityRef, offset: Vec2 },
    Resizing { shape: u32 },
    Carrying { target: EntityRef },
}

impl InteractionState {
    /// Collection a gesture in this state is mutating.
    fn collection(&self) -> Option<Collection> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging { target, .. } | InteractionState::Carrying { target } => {
                Some(target.collection())
            }
            InteractionState::Resizing { .. } => Some(Collection::Shapes),
        }
    }
}

/// Which events drive moving entities around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Press, drag, release.
    #[default]
    Drag,
    /// Click to pick up, click again to drop.
    Carry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Move,
    Resize,
    Place,
    Delete,
}

pub struct InteractionController<S> {
    scene: CanvasSceneModel,
    registry: UsedFileRegistry,
    palette: Palette,
    bridge: SceneAutosaveBridge<S>,
    state: InteractionState,
    mode: InteractionMode,
    cursor: CursorHint,
    tester: HitTester,
    measure: Box<dyn GlyphMeasure>,
    canvas_width: f64,
    canvas_height: f64,
    min_shape_size: f64,
}

impl<S: SceneSink> InteractionController<S> {
    pub fn new(config: &DecoConfig, sink: S, measure: Box<dyn GlyphMeasure>) -> Self {
        Self {
            scene: CanvasSceneModel::new(config.default_glyph_size, config.default_shape_size),
            registry: UsedFileRegistry::new(),
            palette: Palette::default(),
            bridge: SceneAutosaveBridge::new(sink, SceneDefaults::default()),
            state: InteractionState::Idle,
            mode: InteractionMode::Drag,
            cursor: CursorHint::Default,
            tester: HitTester {
                glyph_padding: config.glyph_padding,
                handle_radius: config.resize_handle_radius,
            },
            measure,
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            min_shape_size: config.min_shape_size,
        }
    }

    /// Replace the template used by reset.
    pub fn with_defaults(mut self, defaults: SceneDefaults) -> Self {
        self.bridge.set_defaults(defaults);
        self
    }

    /// Hydrate the scene. The used-file registry is rebuilt from it.
    pub fn load(&mut self, characters: Vec<CharacterEntity>, shapes: Vec<ShapeEntity>) {
        self.scene.load(characters, shapes);
        self.registry = UsedFileRegistry::from_characters(self.scene.characters());
        self.state = InteractionState::Idle;
        self.cursor = CursorHint::Default;
    }

    /// Adopt the explorer's idea of which paths are on the canvas, then
    /// repair it against the scene. Orphans are announced as available.
    pub fn restore_registry<I: IntoIterator<Item = String>>(&mut self, used: I) {
        let mut registry = UsedFileRegistry::new();
        for path in used {
            registry.insert(&path);
        }
        for path in registry.reconcile(self.scene.characters()) {
            self.bridge.notify(Notice::MarkAvailable(path));
        }
        for c in self.scene.characters() {
            if let Some(path) = c.file_path() {
                registry.insert(path);
            }
        }
        self.registry = registry;
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &CanvasSceneModel {
        &self.scene
    }

    pub fn registry(&self) -> &UsedFileRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut UsedFileRegistry {
        &mut self.registry
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switching modes releases any gesture in flight.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.mode {
            self.force_release();
            self.mode = mode;
        }
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn sink(&self) -> &S {
        self.bridge.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.bridge.sink_mut()
    }

    pub fn set_measure(&mut self, measure: Box<dyn GlyphMeasure>) {
        self.measure = measure;
    }

    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.palette.select(tool);
        self.cursor = self.idle_cursor(None);
    }

    pub fn set_color(&mut self, color: &str) {
        self.palette.set_color(color);
    }

    pub fn toggle_delete_mode(&mut self) -> bool {
        self.force_release();
        let armed = self.palette.toggle_delete();
        self.cursor = self.idle_cursor(None);
        armed
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    /// Route an input event. Returns `true` if the view needs a redraw.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Click { x, y } => self.click(Point::new(*x, *y)),
            InputEvent::Key { key, modifiers } => self.key_down(key, *modifiers),
            // Accepting the drag is the webview's job; nothing changes yet.
            InputEvent::DragOver { .. } => false,
            InputEvent::Drop { x, y, payload } => self.drop_entry(payload, Point::new(*x, *y)),
        }
    }

    pub fn pointer_down(&mut self, p: Point) -> bool {
        if self.palette.is_delete_armed() || self.mode == InteractionMode::Carry {
            return false;
        }
        if self.state != InteractionState::Idle {
            // A release went missing (e.g. pointer-up outside the webview).
            self.commit_gesture();
        }

        if let Some(id) = self.scene.hit_test_resize_handle(p, &self.tester) {
            self.scene.bring_to_front(EntityRef::Shape(id));
            self.state = InteractionState::Resizing { shape: id };
            self.cursor = CursorHint::Resize;
            return true;
        }

        if self.palette.tool().places() {
            return self.place(p);
        }

        if let Some(target) = self.scene.hit_test(p, &self.tester, self.measure.as_ref())
            && let Some(origin) = self.scene.position(target)
        {
            self.scene.bring_to_front(target);
            self.state = InteractionState::Dragging {
                target,
                offset: p - origin,
            };
            self.cursor = CursorHint::Move;
            return true;
        }
        false
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        match self.state {
            InteractionState::Dragging { target, offset } => {
                let origin = self.clamp_origin(target, p - offset);
                self.scene.set_position(target, origin);
                true
            }
            InteractionState::Resizing { shape } => {
                let min = self.min_shape_size;
                if let Some(s) = self.scene.shape_mut(shape) {
                    s.width = (p.x - s.x).max(min);
                    s.height = (p.y - s.y).max(min);
                }
                true
            }
            InteractionState::Carrying { target } => {
                let origin = self.clamp_origin(target, p);
                self.scene.set_position(target, origin);
                true
            }
            InteractionState::Idle => {
                let hint = self.idle_cursor(Some(p));
                let changed = hint != self.cursor;
                self.cursor = hint;
                changed
            }
        }
    }

    pub fn pointer_up(&mut self) -> bool {
        match self.state {
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. } => {
                self.commit_gesture();
                true
            }
            InteractionState::Carrying { .. } | InteractionState::Idle => false,
        }
    }

    /// Leaving the canvas ends a drag or resize exactly like a release.
    pub fn pointer_leave(&mut self) -> bool {
        self.pointer_up()
    }

    pub fn click(&mut self, p: Point) -> bool {
        if self.palette.is_delete_armed() {
            return self.delete_at(p);
        }

        match self.state {
            InteractionState::Carrying { target } => {
                let origin = self.clamp_origin(target, p);
                self.scene.set_position(target, origin);
                self.commit_gesture();
                true
            }
            InteractionState::Idle if self.mode == InteractionMode::Carry => {
                if self.palette.tool().places() {
                    return self.place(p);
                }
                match self.scene.hit_test(p, &self.tester, self.measure.as_ref()) {
                    Some(target) => {
                        self.scene.bring_to_front(target);
                        self.state = InteractionState::Carrying { target };
                        self.cursor = CursorHint::Move;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let Some(action) = ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        ) else {
            return false;
        };

        match action {
            ShortcutAction::ForceRelease => self.force_release(),
            ShortcutAction::ToggleDelete => {
                self.toggle_delete_mode();
                true
            }
            ShortcutAction::ToolSelect => {
                self.select_tool(Tool::Select);
                true
            }
            ShortcutAction::ToolCircle => {
                self.select_tool(Tool::Shape(ShapeKind::Circle));
                true
            }
            ShortcutAction::ToolSquare => {
                self.select_tool(Tool::Shape(ShapeKind::Square));
                true
            }
            ShortcutAction::ToolTriangle => {
                self.select_tool(Tool::Shape(ShapeKind::Triangle));
                true
            }
            ShortcutAction::SaveScene => {
                self.save_all();
                false
            }
        }
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Drop whatever is in flight at its last position and persist it.
    /// There is no revert: the last known position is what gets saved.
    pub fn force_release(&mut self) -> bool {
        if self.state == InteractionState::Idle {
            return false;
        }
        self.commit_gesture();
        true
    }

    fn commit_gesture(&mut self) {
        if let Some(collection) = self.state.collection() {
            self.bridge.mark_dirty(collection);
        }
        self.bridge
            .flush(self.scene.characters(), self.scene.shapes());
        self.state = InteractionState::Idle;
        self.cursor = self.idle_cursor(None);
    }

    /// Stamp the selected palette item at `p` and autosave its collection.
    fn place(&mut self, p: Point) -> bool {
        let color = self.palette.color().to_string();
        match self.palette.tool().clone() {
            Tool::Glyph(glyph) => {
                let center = self.clamp_center(p, self.scene.glyph_size());
                self.scene
                    .add_character(&glyph, center.x, center.y, &color, None);
                self.bridge.save_characters(self.scene.characters(), false);
                true
            }
            Tool::Shape(kind) => {
                let size = self.scene.shape_size();
                let corner = self.clamp_corner(
                    Point::new(p.x - size / 2.0, p.y - size / 2.0),
                    size,
                    size,
                );
                self.scene.add_shape(kind, corner.x, corner.y, &color);
                self.bridge.save_shapes(self.scene.shapes(), false);
                true
            }
            Tool::Select => false,
        }
    }

    /// Remove the single topmost entity under `p`.
    fn delete_at(&mut self, p: Point) -> bool {
        if let Some(id) = self.tester.hit_shape(self.scene.shapes(), p) {
            self.scene.remove_shape(id);
            self.bridge.save_shapes(self.scene.shapes(), false);
            return true;
        }

        let Some(id) = self
            .tester
            .hit_character(self.scene.characters(), p, self.measure.as_ref())
        else {
            return false;
        };
        let Some(removed) = self.scene.remove_character(id) else {
            return false;
        };
        if let Some(meta) = removed.metadata
            && self.scene.character_for_path(&meta.path).is_none()
        {
            self.registry.release(&meta.path);
            self.bridge.notify(Notice::MarkAvailable(meta.path));
        }
        self.bridge.save_characters(self.scene.characters(), false);
        true
    }

    /// Place a file/folder dragged in from the explorer, or flash the
    /// character that already stands for it.
    pub fn drop_entry(&mut self, payload: &str, p: Point) -> bool {
        let descriptor = match DropDescriptor::parse(payload) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("ignoring drop: {e}");
                return false;
            }
        };

        if let Some(existing) = self.scene.character_for_path(&descriptor.path) {
            self.registry.insert(&descriptor.path);
            self.bridge.notify(Notice::Flash(existing));
            return false;
        }
        if self.registry.release(&descriptor.path) {
            log::info!(
                "{} was marked used with nothing on the canvas; placing it again",
                descriptor.path
            );
        }

        let glyph = catalog::glyph_for(descriptor.kind);
        let center = self.clamp_center(p, self.scene.glyph_size());
        let path = descriptor.path.clone();
        self.scene.add_character(
            glyph,
            center.x,
            center.y,
            FILE_GLYPH_COLOR,
            Some(FileMeta {
                name: descriptor.name,
                path: descriptor.path,
                kind: descriptor.kind,
            }),
        );
        self.registry.insert(&path);
        self.bridge.notify(Notice::MarkUsed(path));
        self.bridge.save_characters(self.scene.characters(), false);
        true
    }

    // ─── Explicit save / reset ───────────────────────────────────────────

    /// User-requested save of both collections.
    pub fn save_all(&mut self) {
        self.bridge.save_characters(self.scene.characters(), true);
        self.bridge.save_shapes(self.scene.shapes(), true);
    }

    /// Restore the default characters. Every file that was on the canvas
    /// becomes available in the explorer again.
    pub fn reset_characters(&mut self) -> &[CharacterEntity] {
        self.force_release();
        let fresh = self.bridge.reset_characters();
        let released: Vec<String> = self.registry.paths().map(str::to_string).collect();
        self.scene.replace_characters(fresh);
        self.registry = UsedFileRegistry::from_characters(self.scene.characters());
        for path in released {
            if !self.registry.contains(&path) {
                self.bridge.notify(Notice::MarkAvailable(path));
            }
        }
        self.scene.characters()
    }

    pub fn reset_shapes(&mut self) -> &[ShapeEntity] {
        self.force_release();
        let fresh = self.bridge.reset_shapes();
        self.scene.replace_shapes(fresh);
        self.scene.shapes()
    }

    // ─── Geometry helpers ────────────────────────────────────────────────

    /// Keep a character's center at least half its size from every edge.
    fn clamp_center(&self, p: Point, size: f64) -> Point {
        let half = size / 2.0;
        Point::new(
            p.x.min(self.canvas_width - half).max(half),
            p.y.min(self.canvas_height - half).max(half),
        )
    }

    /// Keep a shape's box inside the canvas.
    fn clamp_corner(&self, p: Point, width: f64, height: f64) -> Point {
        Point::new(
            p.x.min(self.canvas_width - width).max(0.0),
            p.y.min(self.canvas_height - height).max(0.0),
        )
    }

    fn clamp_origin(&self, target: EntityRef, origin: Point) -> Point {
        match target {
            EntityRef::Character(id) => match self.scene.character(id) {
                Some(c) => self.clamp_center(origin, c.size),
                None => origin,
            },
            EntityRef::Shape(id) => match self.scene.shape(id) {
                Some(s) => self.clamp_corner(origin, s.width, s.height),
                None => origin,
            },
        }
    }

    /// Cursor for an idle pointer, optionally hovering at `p`.
    fn idle_cursor(&self, p: Option<Point>) -> CursorHint {
        if self.palette.is_delete_armed() {
            return CursorHint::Delete;
        }
        if self.palette.tool().places() {
            return CursorHint::Place;
        }
        let Some(p) = p else {
            return CursorHint::Default;
        };
        if self.scene.hit_test_resize_handle(p, &self.tester).is_some() {
            CursorHint::Resize
        } else if self
            .scene
            .hit_test(p, &self.tester, self.measure.as_ref())
            .is_some()
        {
            CursorHint::Move
        } else {
            CursorHint::Default
        }
    }
}
