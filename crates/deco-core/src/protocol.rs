//! Messages exchanged between the webview, the extension, and `deco-host`.
//!
//! Both directions are tagged by a `command` field so they stay readable
//! from the TypeScript side.

use crate::id::Identity;
use crate::model::{CharacterEntity, DecorationPatch, DecorationRecord, EntryKind, ShapeEntity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inbound requests handled by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    LoadScene,
    SaveCoordinates {
        data: Vec<CharacterEntity>,
        #[serde(default)]
        auto_save: bool,
    },
    SaveShapes {
        data: Vec<ShapeEntity>,
        #[serde(default)]
        auto_save: bool,
    },
    ResetPositions,
    ResetShapes,
    GetFileDetails {
        uri: String,
        path: String,
        name: String,
    },
    SaveFileDetails {
        identity: Identity,
        patch: DecorationPatch,
    },
    /// `source` is the image the extension's file picker returned.
    SelectCoverImage {
        uri: String,
        path: String,
        name: String,
        source: PathBuf,
    },
    SelectStickers {
        uri: String,
        path: String,
        name: String,
        sources: Vec<PathBuf>,
    },
    RemoveSticker {
        uri: String,
        index: usize,
    },
    ListChildren {
        path: PathBuf,
    },
    PruneAssets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One entry of a folder listing, with its saved decorations if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildEntry {
    pub name: String,
    pub path: PathBuf,
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub identity: Identity,
    pub record: Option<DecorationRecord>,
}

/// Outbound replies from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Reply {
    SceneLoaded {
        characters: Vec<CharacterEntity>,
        shapes: Vec<ShapeEntity>,
    },
    PositionsReset {
        data: Vec<CharacterEntity>,
    },
    ShapesReset {
        data: Vec<ShapeEntity>,
    },
    FileDetails {
        identity: Identity,
        record: Option<DecorationRecord>,
    },
    ChildrenListed {
        path: PathBuf,
        entries: Vec<ChildEntry>,
    },
    Pruned {
        removed: usize,
    },
    Notification {
        level: NoticeLevel,
        message: String,
    },
}

impl Reply {
    pub fn info(message: impl Into<String>) -> Self {
        Reply::Notification {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Reply::Notification {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
