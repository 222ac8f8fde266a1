//! File-backed decoration store.
//!
//! Every mutation is a full read → merge → write of the whole document.
//! Calls do not lock against each other; two writers racing on different
//! identities can lose one update (last write wins). The host serializes
//! its writes through a single task to avoid that.

use crate::error::{DecoError, Result};
use crate::id::Identity;
use crate::model::{AssetRef, DecorationPatch, DecorationRecord, MetadataDocument};
use chrono::Utc;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. Missing or corrupt files yield an empty document.
    pub fn load(&self) -> MetadataDocument {
        match self.read() {
            Ok(Some(doc)) => doc,
            Ok(None) => MetadataDocument::empty(Utc::now()),
            Err(e) => {
                log::warn!("{e}; starting from an empty document");
                MetadataDocument::empty(Utc::now())
            }
        }
    }

    fn read(&self) -> Result<Option<MetadataDocument>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DecoError::StorageRead {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };
        let mut doc: MetadataDocument =
            serde_json::from_str(&text).map_err(|e| DecoError::StorageRead {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let mut seen = HashSet::new();
        let before = doc.files.len();
        doc.files.retain(|r| seen.insert(r.identity.clone()));
        if doc.files.len() != before {
            log::warn!(
                "{}: dropped {} duplicate record(s)",
                self.path.display(),
                before - doc.files.len()
            );
        }
        Ok(Some(doc))
    }

    /// Write the whole document via temp file + rename.
    fn write(&self, doc: &MetadataDocument) -> Result<()> {
        write_json_atomic(&self.path, doc)
    }

    pub fn find(&self, identity: &Identity) -> Option<DecorationRecord> {
        self.load().find(identity).cloned()
    }

    pub fn records(&self) -> Vec<DecorationRecord> {
        self.load().files
    }

    /// Merge `patch` into the record for `identity`, creating it if needed.
    ///
    /// # Errors
    /// `DecoError::StorageWrite` if the document can't be persisted.
    pub fn upsert(&self, identity: &Identity, patch: DecorationPatch) -> Result<DecorationRecord> {
        let mut doc = self.load();
        let now = Utc::now();

        let record = match doc.find_mut(identity) {
            Some(existing) => {
                existing.apply(patch, now);
                existing.clone()
            }
            None => {
                let mut record = DecorationRecord::new(identity.clone(), now);
                record.apply(patch, now);
                doc.files.push(record.clone());
                record
            }
        };
        doc.last_updated = now;

        self.write(&doc)?;
        log::debug!("upserted decoration record {identity}");
        Ok(record)
    }

    /// Remove the sticker at `index`. Returns the updated record and the
    /// dropped reference, or `None` if either doesn't exist.
    pub fn remove_sticker(
        &self,
        identity: &Identity,
        index: usize,
    ) -> Result<Option<(DecorationRecord, AssetRef)>> {
        let Some(record) = self.find(identity) else {
            return Ok(None);
        };
        if index >= record.stickers.len() {
            return Ok(None);
        }
        let mut stickers = record.stickers;
        let removed = stickers.remove(index);
        let updated = self.upsert(
            identity,
            DecorationPatch {
                stickers: Some(stickers),
                ..Default::default()
            },
        )?;
        Ok(Some((updated, removed)))
    }

    /// Every asset referenced by any record.
    ///
    /// Unlike `load`, a corrupt document is an error here rather than an
    /// empty set, so a prune never runs against a document it couldn't read.
    pub fn referenced_assets(&self) -> Result<HashSet<AssetRef>> {
        let files = self.read()?.map(|doc| doc.files).unwrap_or_default();
        Ok(files
            .into_iter()
            .flat_map(|r| r.stickers.into_iter().chain(r.cover_image))
            .collect())
    }
}

/// Serialize `value` to `path` without exposing a half-written file.
pub(crate) fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source: std::io::Error| DecoError::StorageWrite {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(&dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
