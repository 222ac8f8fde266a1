//! Data model: decoration records for files/folders and the entities that
//! live on the doodle canvas.
//!
//! Field names are camelCase on the wire. The record key is serialized as
//! `hash` so documents written by earlier versions still load.

use crate::id::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DOCUMENT_VERSION: &str = "1.0.0";

// ─── Decorations ─────────────────────────────────────────────────────────

/// Opaque reference to a cached image. Never the user's original file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(name: impl Into<String>) -> Self {
        AssetRef(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Folder presentation preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Icons,
    Columns,
    Gallery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationRecord {
    #[serde(rename = "hash")]
    pub identity: Identity,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "path")]
    pub source_path: String,
    #[serde(rename = "uri")]
    pub source_uri: String,
    #[serde(default)]
    pub stickers: Vec<AssetRef>,
    #[serde(default)]
    pub cover_image: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    pub last_updated: DateTime<Utc>,
}

impl DecorationRecord {
    /// Fresh record with no stickers and no cover.
    pub fn new(identity: Identity, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            display_name: String::new(),
            source_path: String::new(),
            source_uri: String::new(),
            stickers: Vec::new(),
            cover_image: None,
            view_mode: None,
            last_updated: now,
        }
    }

    /// Stored view mode, or `List`. Descendants never inherit.
    pub fn effective_view_mode(&self) -> ViewMode {
        self.view_mode.unwrap_or_default()
    }

    /// Merge `patch` over this record. Unset patch fields keep their value.
    pub fn apply(&mut self, patch: DecorationPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.display_name = name;
        }
        if let Some(path) = patch.path {
            self.source_path = path;
        }
        if let Some(uri) = patch.uri {
            self.source_uri = uri;
        }
        if let Some(stickers) = patch.stickers {
            self.stickers = stickers;
        }
        if patch.clear_cover {
            self.cover_image = None;
        }
        if let Some(cover) = patch.cover_image {
            self.cover_image = Some(cover);
        }
        if let Some(mode) = patch.view_mode {
            self.view_mode = Some(mode);
        }
        self.last_updated = now;
    }
}

/// Partial update for a `DecorationRecord`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecorationPatch {
    pub name: Option<String>,
    pub path: Option<String>,
    pub uri: Option<String>,
    pub stickers: Option<Vec<AssetRef>>,
    pub cover_image: Option<AssetRef>,
    /// Drop the current cover. A `cover_image` in the same patch still wins.
    pub clear_cover: bool,
    pub view_mode: Option<ViewMode>,
}

impl DecorationPatch {
    /// Patch carrying only the informational location fields.
    pub fn located(name: &str, path: &str, uri: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            path: Some(path.to_string()),
            uri: Some(uri.to_string()),
            ..Self::default()
        }
    }
}

/// The durable container behind `MetadataStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<DecorationRecord>,
}

impl MetadataDocument {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            last_updated: now,
            files: Vec::new(),
        }
    }

    pub fn find(&self, identity: &Identity) -> Option<&DecorationRecord> {
        self.files.iter().find(|r| &r.identity == identity)
    }

    pub fn find_mut(&mut self, identity: &Identity) -> Option<&mut DecorationRecord> {
        self.files.iter_mut().find(|r| &r.identity == identity)
    }
}

// ─── Scene entities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// Attached to a character that stands for a dropped file or folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// A free-floating glyph. `(x, y)` is its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEntity {
    pub id: u32,
    #[serde(rename = "char")]
    pub glyph: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMeta>,
}

impl CharacterEntity {
    pub fn file_path(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.path.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
}

/// A geometric shape. `(x, y)` is its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeEntity {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

/// Which of the two scene collections something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Characters,
    Shapes,
}

/// Handle to a live entity: collection + per-collection id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Character(u32),
    Shape(u32),
}

impl EntityRef {
    pub fn collection(&self) -> Collection {
        match self {
            EntityRef::Character(_) => Collection::Characters,
            EntityRef::Shape(_) => Collection::Shapes,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            EntityRef::Character(id) | EntityRef::Shape(id) => *id,
        }
    }
}

/// Payload of a file/folder dragged in from the explorer tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropDescriptor {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl DropDescriptor {
    /// Parse the JSON text carried by a drop event.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let descriptor: DropDescriptor = serde_json::from_str(text)
            .map_err(|e| crate::DecoError::InvalidDropDescriptor(e.to_string()))?;
        if descriptor.path.is_empty() {
            return Err(crate::DecoError::InvalidDropDescriptor(
                "empty path".to_string(),
            ));
        }
        Ok(descriptor)
    }
}
