//! Copy-in cache for user-selected images.
//!
//! Records point at cached copies so moving or deleting the original image
//! never breaks a decoration. Names are derived from role + identity (+
//! index for stickers), so storing again under the same key replaces the
//! previous asset.

use crate::error::{DecoError, Result};
use crate::id::Identity;
use crate::model::AssetRef;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    Cover,
    Sticker,
}

#[derive(Debug, Clone)]
pub struct AssetCache {
    dir: PathBuf,
}

impl AssetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the cache and return a reference to the copy.
    ///
    /// `index` is only meaningful for stickers.
    ///
    /// # Errors
    /// `DecoError::AssetStore` if the cache directory can't be created, the
    /// source can't be read, or the copy fails.
    pub fn store(
        &self,
        identity: &Identity,
        role: AssetRole,
        index: Option<usize>,
        source: &Path,
    ) -> Result<AssetRef> {
        let copy_failed = |e: std::io::Error| DecoError::AssetStore {
            source_path: source.to_path_buf(),
            source: e,
        };
        std::fs::create_dir_all(&self.dir).map_err(copy_failed)?;

        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "bin".to_string());
        let name = match role {
            AssetRole::Cover => format!("cover_{identity}.{ext}"),
            AssetRole::Sticker => format!("sticker_{identity}_{}.{ext}", index.unwrap_or(0)),
        };

        let target = self.dir.join(&name);
        let bytes = std::fs::copy(source, &target).map_err(copy_failed)?;
        log::debug!("cached {} ({bytes} bytes) as {name}", source.display());
        Ok(AssetRef::new(name))
    }

    /// Path of the cached copy behind `asset`.
    pub fn resolve(&self, asset: &AssetRef) -> Result<PathBuf> {
        let name = asset.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DecoError::InvalidAssetRef(name.to_string()));
        }
        Ok(self.dir.join(name))
    }

    /// Open the cached bytes for reading.
    pub fn open(&self, asset: &AssetRef) -> Result<File> {
        let path = self.resolve(asset)?;
        File::open(&path).map_err(|e| DecoError::StorageRead {
            path,
            reason: e.to_string(),
        })
    }

    /// Delete one cached copy. Already gone is fine.
    pub fn remove(&self, asset: &AssetRef) -> Result<()> {
        let path = self.resolve(asset)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(DecoError::StorageWrite { path, source }),
        }
    }

    /// Delete cached files that no record references. Returns how many went.
    ///
    /// Only names this cache hands out (`cover_<id>.<ext>`,
    /// `sticker_<id>_<n>.<ext>`) are candidates; anything else sharing the
    /// directory is left alone.
    pub fn prune(&self, referenced: &HashSet<AssetRef>) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(DecoError::StorageRead {
                    path: self.dir.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_cache_name(name) || referenced.contains(&AssetRef::new(name)) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("could not prune {}: {e}", path.display()),
            }
        }
        Ok(removed)
    }
}

/// Whether `name` has the shape of a name `AssetCache::store` produces.
fn is_cache_name(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let is_identity = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
    if ext.is_empty() {
        return false;
    }
    if let Some(id) = stem.strip_prefix("cover_") {
        return is_identity(id);
    }
    match stem.strip_prefix("sticker_").and_then(|rest| rest.rsplit_once('_')) {
        Some((id, n)) => is_identity(id) && !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
