//! Scene persistence bridge.
//!
//! The controller never touches storage directly. It marks collections
//! dirty during a gesture and flushes them once when the gesture ends, or
//! saves immediately on an explicit request. Explicit saves and resets
//! carry `notify = true` so the host can confirm to the user; gesture
//! autosaves are silent.

use deco_core::catalog;
use deco_core::model::{CharacterEntity, Collection, ShapeEntity};

/// Side effects aimed at the explorer tree or the canvas view.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Grey out the explorer entry: it now lives on the canvas.
    MarkUsed(String),
    /// The entry can be dragged onto the canvas again.
    MarkAvailable(String),
    /// Briefly highlight an existing character.
    Flash(u32),
}

/// Outbound channel to whatever actually stores the scene.
pub trait SceneSink {
    fn save_characters(&mut self, characters: &[CharacterEntity], notify: bool);
    fn save_shapes(&mut self, shapes: &[ShapeEntity], notify: bool);
    fn notify(&mut self, notice: Notice);
}

/// Template scene used by reset. Handed out by value only.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDefaults {
    characters: Vec<CharacterEntity>,
    shapes: Vec<ShapeEntity>,
}

impl Default for SceneDefaults {
    fn default() -> Self {
        Self::new(catalog::default_characters(), catalog::default_shapes())
    }
}

impl SceneDefaults {
    pub fn new(characters: Vec<CharacterEntity>, shapes: Vec<ShapeEntity>) -> Self {
        Self { characters, shapes }
    }
}

pub struct SceneAutosaveBridge<S> {
    sink: S,
    defaults: SceneDefaults,
    characters_dirty: bool,
    shapes_dirty: bool,
}

impl<S: SceneSink> SceneAutosaveBridge<S> {
    pub fn new(sink: S, defaults: SceneDefaults) -> Self {
        Self {
            sink,
            defaults,
            characters_dirty: false,
            shapes_dirty: false,
        }
    }

    pub fn set_defaults(&mut self, defaults: SceneDefaults) {
        self.defaults = defaults;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn save_characters(&mut self, characters: &[CharacterEntity], notify: bool) {
        self.characters_dirty = false;
        self.sink.save_characters(characters, notify);
    }

    pub fn save_shapes(&mut self, shapes: &[ShapeEntity], notify: bool) {
        self.shapes_dirty = false;
        self.sink.save_shapes(shapes, notify);
    }

    /// Record that a collection changed and needs saving at the next flush.
    pub fn mark_dirty(&mut self, collection: Collection) {
        match collection {
            Collection::Characters => self.characters_dirty = true,
            Collection::Shapes => self.shapes_dirty = true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.characters_dirty || self.shapes_dirty
    }

    /// Save each dirty collection exactly once (silently).
    pub fn flush(&mut self, characters: &[CharacterEntity], shapes: &[ShapeEntity]) {
        if self.characters_dirty {
            self.save_characters(characters, false);
        }
        if self.shapes_dirty {
            self.save_shapes(shapes, false);
        }
    }

    /// Persist and return a fresh copy of the default characters.
    pub fn reset_characters(&mut self) -> Vec<CharacterEntity> {
        let fresh = self.defaults.characters.clone();
        self.save_characters(&fresh, true);
        fresh
    }

    pub fn reset_shapes(&mut self) -> Vec<ShapeEntity> {
        let fresh = self.defaults.shapes.clone();
        self.save_shapes(&fresh, true);
        fresh
    }

    pub fn notify(&mut self, notice: Notice) {
        self.sink.notify(notice);
    }
}

/// Sink that records everything it receives. Used by tests and by
/// headless embedders that poll instead of pushing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub character_saves: Vec<(Vec<CharacterEntity>, bool)>,
    pub shape_saves: Vec<(Vec<ShapeEntity>, bool)>,
    pub notices: Vec<Notice>,
}

impl RecordingSink {
    pub fn save_count(&self) -> usize {
        self.character_saves.len() + self.shape_saves.len()
    }
}

impl SceneSink for RecordingSink {
    fn save_characters(&mut self, characters: &[CharacterEntity], notify: bool) {
        self.character_saves.push((characters.to_vec(), notify));
    }

    fn save_shapes(&mut self, shapes: &[ShapeEntity], notify: bool) {
        self.shape_saves.push((shapes.to_vec(), notify));
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
