//! Global key-value storage backing the canvas scene.
//!
//! A single JSON object on disk; each `set` rewrites the whole file.

use crate::catalog;
use crate::error::Result;
use crate::model::{CharacterEntity, ShapeEntity};
use crate::store::write_json_atomic;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const CHARACTERS_KEY: &str = "characters";
pub const SHAPES_KEY: &str = "shapes";

#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
}

impl KeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Map<String, Value> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("could not read {}: {e}", self.path.display());
                }
                return Map::new();
            }
        };
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                log::warn!("{} is not a JSON object; ignoring it", self.path.display());
                Map::new()
            }
        }
    }

    /// Value under `key`, or `None` if absent or of the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.read_all().remove(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("stored `{key}` is malformed: {e}");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut all = self.read_all();
        all.insert(key.to_string(), serde_json::to_value(value)?);
        write_json_atomic(&self.path, &Value::Object(all))
    }
}

/// Scene persistence: the two entity collections in the key-value store.
#[derive(Debug, Clone)]
pub struct SceneStore {
    kv: KeyValueStore,
}

impl SceneStore {
    pub fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Stored characters, or the defaults on first run.
    pub fn characters(&self) -> Vec<CharacterEntity> {
        self.kv
            .get(CHARACTERS_KEY)
            .unwrap_or_else(catalog::default_characters)
    }

    pub fn shapes(&self) -> Vec<ShapeEntity> {
        self.kv.get(SHAPES_KEY).unwrap_or_else(catalog::default_shapes)
    }

    pub fn save_characters(&self, characters: &[CharacterEntity]) -> Result<()> {
        self.kv.set(CHARACTERS_KEY, &characters)
    }

    pub fn save_shapes(&self, shapes: &[ShapeEntity]) -> Result<()> {
        self.kv.set(SHAPES_KEY, &shapes)
    }

    /// Persist a fresh copy of the default characters and return it.
    pub fn reset_characters(&self) -> Result<Vec<CharacterEntity>> {
        let defaults = catalog::default_characters();
        self.save_characters(&defaults)?;
        Ok(defaults)
    }

    pub fn reset_shapes(&self) -> Result<Vec<ShapeEntity>> {
        let defaults = catalog::default_shapes();
        self.save_shapes(&defaults)?;
        Ok(defaults)
    }
}
