//! Single owner of every durable write.
//!
//! The metadata document and the scene file are each rewritten whole on
//! every change, so two overlapping writers can silently drop each other's
//! update. `StoreWriter` funnels all writes into one blocking worker that
//! applies them in submission order. Reads don't go through here: writes
//! land by atomic rename, so a reader always sees a complete file.

use crate::error::{HostError, HostResult};
use deco_core::model::{AssetRef, CharacterEntity, DecorationPatch, DecorationRecord, ShapeEntity};
use deco_core::{
    AssetCache, AssetRole, DecoConfig, Identity, KeyValueStore, MetadataStore, SceneStore,
};
use std::path::{Component, Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type Reply<T> = oneshot::Sender<deco_core::Result<T>>;

#[derive(Debug)]
enum WriteCommand {
    Upsert {
        identity: Identity,
        patch: DecorationPatch,
        reply: Reply<DecorationRecord>,
    },
    SetCover {
        identity: Identity,
        location: DecorationPatch,
        source: PathBuf,
        reply: Reply<DecorationRecord>,
    },
    AddStickers {
        identity: Identity,
        location: DecorationPatch,
        sources: Vec<PathBuf>,
        reply: Reply<DecorationRecord>,
    },
    RemoveSticker {
        identity: Identity,
        index: usize,
        reply: Reply<Option<(DecorationRecord, AssetRef)>>,
    },
    SaveCharacters {
        data: Vec<CharacterEntity>,
        reply: Reply<()>,
    },
    SaveShapes {
        data: Vec<ShapeEntity>,
        reply: Reply<()>,
    },
    ResetCharacters {
        reply: Reply<Vec<CharacterEntity>>,
    },
    ResetShapes {
        reply: Reply<Vec<ShapeEntity>>,
    },
    Prune {
        reply: Reply<usize>,
    },
}

/// Everything the worker writes to.
#[derive(Debug, Clone)]
pub struct Storage {
    pub metadata: MetadataStore,
    pub scene: SceneStore,
    pub assets: AssetCache,
}

impl Storage {
    /// Lay the stores out under `root` as `config` names them.
    ///
    /// # Errors
    /// `HostError::CacheOverlap` if the cache directory is, or contains, the
    /// metadata document or the scene file. Pruning would delete them.
    pub fn open(root: &Path, config: &DecoConfig) -> HostResult<Self> {
        let cache = root.join(&config.cache_dir);
        let metadata = root.join(&config.metadata_file);
        let scene = root.join(&config.scene_file);
        for file in [&metadata, &scene] {
            if lexical(file).starts_with(lexical(&cache)) {
                return Err(HostError::CacheOverlap {
                    cache,
                    file: file.clone(),
                });
            }
        }
        Ok(Self {
            metadata: MetadataStore::new(metadata),
            scene: SceneStore::new(KeyValueStore::new(scene)),
            assets: AssetCache::new(cache),
        })
    }

    /// Copy first, then record. A failed copy leaves the document untouched.
    fn set_cover(
        &self,
        identity: &Identity,
        location: DecorationPatch,
        source: &std::path::Path,
    ) -> deco_core::Result<DecorationRecord> {
        let cover = self.assets.store(identity, AssetRole::Cover, None, source)?;
        let patch = DecorationPatch {
            cover_image: Some(cover),
            ..location
        };
        self.metadata.upsert(identity, patch)
    }

    /// Append stickers after the existing ones. All copies must succeed
    /// before the record changes; on failure the copies made so far are
    /// removed again.
    fn add_stickers(
        &self,
        identity: &Identity,
        location: DecorationPatch,
        sources: &[PathBuf],
    ) -> deco_core::Result<DecorationRecord> {
        let mut stickers = self
            .metadata
            .find(identity)
            .map(|r| r.stickers)
            .unwrap_or_default();
        let first = next_sticker_index(identity, &stickers);
        let mut copied = Vec::with_capacity(sources.len());
        for (offset, source) in sources.iter().enumerate() {
            match self
                .assets
                .store(identity, AssetRole::Sticker, Some(first + offset), source)
            {
                Ok(asset) => copied.push(asset),
                Err(e) => {
                    self.discard(&copied);
                    return Err(e);
                }
            }
        }
        stickers.extend(copied.iter().cloned());
        let patch = DecorationPatch {
            stickers: Some(stickers),
            ..location
        };
        self.metadata.upsert(identity, patch).inspect_err(|_| {
            self.discard(&copied);
        })
    }

    fn discard(&self, assets: &[AssetRef]) {
        for asset in assets {
            if let Err(e) = self.assets.remove(asset) {
                log::warn!("could not discard {asset}: {e}");
            }
        }
    }

    fn prune(&self) -> deco_core::Result<usize> {
        let referenced = self.metadata.referenced_assets()?;
        let removed = self.assets.prune(&referenced)?;
        log::info!("pruned {removed} unreferenced cached image(s)");
        Ok(removed)
    }

    fn apply(&self, command: WriteCommand) {
        // A dropped receiver only means the caller stopped waiting.
        match command {
            WriteCommand::Upsert {
                identity,
                patch,
                reply,
            } => {
                let _ = reply.send(self.metadata.upsert(&identity, patch));
            }
            WriteCommand::SetCover {
                identity,
                location,
                source,
                reply,
            } => {
                let _ = reply.send(self.set_cover(&identity, location, &source));
            }
            WriteCommand::AddStickers {
                identity,
                location,
                sources,
                reply,
            } => {
                let _ = reply.send(self.add_stickers(&identity, location, &sources));
            }
            WriteCommand::RemoveSticker {
                identity,
                index,
                reply,
            } => {
                let _ = reply.send(self.metadata.remove_sticker(&identity, index));
            }
            WriteCommand::SaveCharacters { data, reply } => {
                let _ = reply.send(self.scene.save_characters(&data));
            }
            WriteCommand::SaveShapes { data, reply } => {
                let _ = reply.send(self.scene.save_shapes(&data));
            }
            WriteCommand::ResetCharacters { reply } => {
                let _ = reply.send(self.scene.reset_characters());
            }
            WriteCommand::ResetShapes { reply } => {
                let _ = reply.send(self.scene.reset_shapes());
            }
            WriteCommand::Prune { reply } => {
                let _ = reply.send(self.prune());
            }
        }
    }
}

/// First sticker slot past every `sticker_<identity>_<n>` already held,
/// so new copies never overwrite a referenced file.
fn next_sticker_index(identity: &Identity, stickers: &[AssetRef]) -> usize {
    let prefix = format!("sticker_{identity}_");
    stickers
        .iter()
        .filter_map(|s| {
            let rest = s.as_str().strip_prefix(&prefix)?;
            rest.split('.').next()?.parse::<usize>().ok()
        })
        .max()
        .map_or(0, |n| n + 1)
}

/// `path` with `.` and `..` folded away, without touching the filesystem.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Handle for submitting writes. Cheap to clone.
#[derive(Clone)]
pub struct StoreWriter {
    sender: mpsc::UnboundedSender<WriteCommand>,
}

impl StoreWriter {
    /// Start the worker. It exits once every handle has been dropped.
    pub fn spawn(storage: Storage) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteCommand>();
        let worker = tokio::task::spawn_blocking(move || {
            while let Some(command) = rx.blocking_recv() {
                storage.apply(command);
            }
            log::debug!("store writer stopped");
        });
        (Self { sender: tx }, worker)
    }

    async fn submit<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> WriteCommand,
    ) -> HostResult<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .map_err(|_| HostError::WriterClosed)?;
        let result = rx.await.map_err(|_| HostError::WriterClosed)?;
        Ok(result?)
    }

    pub async fn upsert(
        &self,
        identity: Identity,
        patch: DecorationPatch,
    ) -> HostResult<DecorationRecord> {
        self.submit(|reply| WriteCommand::Upsert {
            identity,
            patch,
            reply,
        })
        .await
    }

    pub async fn set_cover(
        &self,
        identity: Identity,
        location: DecorationPatch,
        source: PathBuf,
    ) -> HostResult<DecorationRecord> {
        self.submit(|reply| WriteCommand::SetCover {
            identity,
            location,
            source,
            reply,
        })
        .await
    }

    pub async fn add_stickers(
        &self,
        identity: Identity,
        location: DecorationPatch,
        sources: Vec<PathBuf>,
    ) -> HostResult<DecorationRecord> {
        self.submit(|reply| WriteCommand::AddStickers {
            identity,
            location,
            sources,
            reply,
        })
        .await
    }

    pub async fn remove_sticker(
        &self,
        identity: Identity,
        index: usize,
    ) -> HostResult<DecorationRecord> {
        let removed = self
            .submit(|reply| WriteCommand::RemoveSticker {
                identity,
                index,
                reply,
            })
            .await?;
        match removed {
            Some((record, _)) => Ok(record),
            None => Err(HostError::NoSuchSticker { index }),
        }
    }

    pub async fn save_characters(&self, data: Vec<CharacterEntity>) -> HostResult<()> {
        self.submit(|reply| WriteCommand::SaveCharacters { data, reply })
            .await
    }

    pub async fn save_shapes(&self, data: Vec<ShapeEntity>) -> HostResult<()> {
        self.submit(|reply| WriteCommand::SaveShapes { data, reply })
            .await
    }

    pub async fn reset_characters(&self) -> HostResult<Vec<CharacterEntity>> {
        self.submit(|reply| WriteCommand::ResetCharacters { reply })
            .await
    }

    pub async fn reset_shapes(&self) -> HostResult<Vec<ShapeEntity>> {
        self.submit(|reply| WriteCommand::ResetShapes { reply }).await
    }

    pub async fn prune(&self) -> HostResult<usize> {
        self.submit(|reply| WriteCommand::Prune { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn storage(dir: &Path) -> Storage {
        Storage::open(dir, &DecoConfig::default()).unwrap()
    }

    fn config_with_cache(cache_dir: &str) -> DecoConfig {
        DecoConfig {
            cache_dir: cache_dir.to_string(),
            ..DecoConfig::default()
        }
    }

    #[test]
    fn cache_may_not_hold_the_documents() {
        let dir = tempfile::tempdir().unwrap();
        for cache_dir in [".", "./", "cache/..", ""] {
            let err = Storage::open(dir.path(), &config_with_cache(cache_dir)).unwrap_err();
            assert!(matches!(err, HostError::CacheOverlap { .. }), "{cache_dir:?}");
        }
        let nested = DecoConfig {
            metadata_file: "cache/file-metadata.json".into(),
            ..DecoConfig::default()
        };
        assert!(Storage::open(dir.path(), &nested).is_err());
        assert!(Storage::open(dir.path(), &config_with_cache("images")).is_ok());
    }

    #[tokio::test]
    async fn prune_spares_documents_sharing_the_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        // Laid out by hand; `Storage::open` refuses this.
        let store = Storage {
            assets: AssetCache::new(dir.path()),
            ..storage(dir.path())
        };
        let (writer, _worker) = StoreWriter::spawn(store.clone());
        writer
            .upsert(
                Identity::from_raw("0a0b0c0d"),
                DecorationPatch::located("a.txt", "/a.txt", "file:///a.txt"),
            )
            .await
            .unwrap();

        assert_eq!(writer.prune().await.unwrap(), 0);
        assert!(dir.path().join("file-metadata.json").is_file());
        assert_eq!(store.metadata.records().len(), 1);
    }

    #[test]
    fn sticker_index_skips_held_slots() {
        let id = Identity::from_raw("abcd1234");
        assert_eq!(next_sticker_index(&id, &[]), 0);
        let held = vec![
            AssetRef::new("sticker_abcd1234_2.png"),
            AssetRef::new("sticker_abcd1234_0.gif"),
            AssetRef::new("sticker_ffff0000_9.png"),
        ];
        assert_eq!(next_sticker_index(&id, &held), 3);
    }

    #[tokio::test]
    async fn concurrent_upserts_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());
        let (writer, worker) = StoreWriter::spawn(store.clone());

        let mut tasks = Vec::new();
        for i in 0..20 {
            let writer = writer.clone();
            tasks.push(tokio::spawn(async move {
                let id = Identity::from_raw(format!("{i:08x}"));
                writer
                    .upsert(id, DecorationPatch::located(&format!("f{i}"), "/p", "file:///p"))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        drop(writer);
        worker.await.unwrap();

        assert_eq!(store.metadata.records().len(), 20);
    }

    #[tokio::test]
    async fn stickers_append_after_existing() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("Pic.PNG");
        std::fs::write(&image, b"png").unwrap();
        let (writer, _worker) = StoreWriter::spawn(storage(dir.path()));
        let id = Identity::from_raw("12345678");
        let location = DecorationPatch::located("a.txt", "/a.txt", "file:///a.txt");

        writer
            .add_stickers(id.clone(), location.clone(), vec![image.clone()])
            .await
            .unwrap();
        let record = writer
            .add_stickers(id.clone(), location, vec![image])
            .await
            .unwrap();
        assert_eq!(
            record.stickers,
            vec![
                AssetRef::new("sticker_12345678_0.png"),
                AssetRef::new("sticker_12345678_1.png")
            ]
        );
    }

    #[tokio::test]
    async fn missing_sticker_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, _worker) = StoreWriter::spawn(storage(dir.path()));
        let err = writer
            .remove_sticker(Identity::from_raw("12345678"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::NoSuchSticker { index: 0 }));
    }

    #[tokio::test]
    async fn failed_sticker_batch_removes_its_copies() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("one.png");
        std::fs::write(&image, b"png").unwrap();
        let store = storage(dir.path());
        let (writer, _worker) = StoreWriter::spawn(store.clone());
        let id = Identity::from_raw("12345678");

        let err = writer
            .add_stickers(
                id.clone(),
                DecorationPatch::located("a.txt", "/a.txt", "file:///a.txt"),
                vec![image, dir.path().join("missing.png")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::Store(deco_core::DecoError::AssetStore { .. })));
        assert!(store.metadata.find(&id).is_none());
        let left = std::fs::read_dir(store.assets.dir()).unwrap().count();
        assert_eq!(left, 0);
    }
}
