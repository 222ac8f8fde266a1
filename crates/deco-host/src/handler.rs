//! Request dispatch. One `match` arm per `Request` variant.

use crate::error::{HostError, HostResult};
use crate::listing;
use crate::writer::{Storage, StoreWriter};
use deco_core::model::DecorationPatch;
use deco_core::protocol::{Reply, Request};
use deco_core::{DecoConfig, Identity, IdentityHasher};
use std::path::Path;
use tokio::task::JoinHandle;

pub struct Handler {
    hasher: IdentityHasher,
    storage: Storage,
    writer: StoreWriter,
}

impl Handler {
    /// Open the stores under `root` and start the write worker.
    pub fn open(root: &Path, config: &DecoConfig) -> HostResult<(Self, JoinHandle<()>)> {
        let storage = Storage::open(root, config)?;
        let (writer, worker) = StoreWriter::spawn(storage.clone());
        let handler = Self {
            hasher: config.hasher(),
            storage,
            writer,
        };
        Ok((handler, worker))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn identify(&self, uri: &str) -> Identity {
        self.hasher.identify(uri)
    }

    /// Handle one request. Failures become notification replies.
    pub async fn handle(&self, request: Request) -> Vec<Reply> {
        match request {
            Request::LoadScene => vec![Reply::SceneLoaded {
                characters: self.storage.scene.characters(),
                shapes: self.storage.scene.shapes(),
            }],

            Request::SaveCoordinates { data, auto_save } => {
                match self.writer.save_characters(data).await {
                    Ok(()) if auto_save => vec![],
                    Ok(()) => vec![Reply::info("Positions saved")],
                    Err(e) => failure("Could not save positions", e),
                }
            }

            Request::SaveShapes { data, auto_save } => match self.writer.save_shapes(data).await {
                Ok(()) if auto_save => vec![],
                Ok(()) => vec![Reply::info("Shapes saved")],
                Err(e) => failure("Could not save shapes", e),
            },

            Request::ResetPositions => match self.writer.reset_characters().await {
                Ok(data) => vec![
                    Reply::PositionsReset { data },
                    Reply::info("Positions reset"),
                ],
                Err(e) => failure("Could not reset positions", e),
            },

            Request::ResetShapes => match self.writer.reset_shapes().await {
                Ok(data) => vec![Reply::ShapesReset { data }, Reply::info("Shapes reset")],
                Err(e) => failure("Could not reset shapes", e),
            },

            Request::GetFileDetails { uri, .. } => {
                let identity = self.identify(&uri);
                let record = self.storage.metadata.find(&identity);
                vec![Reply::FileDetails { identity, record }]
            }

            Request::SaveFileDetails { identity, patch } => {
                match self.writer.upsert(identity.clone(), patch).await {
                    Ok(record) => vec![Reply::FileDetails {
                        identity,
                        record: Some(record),
                    }],
                    Err(e) => failure("Could not save file details", e),
                }
            }

            Request::SelectCoverImage {
                uri,
                path,
                name,
                source,
            } => {
                let identity = self.identify(&uri);
                let location = DecorationPatch::located(&name, &path, &uri);
                match self.writer.set_cover(identity.clone(), location, source).await {
                    Ok(record) => vec![
                        Reply::FileDetails {
                            identity,
                            record: Some(record),
                        },
                        Reply::info(format!("Cover image set for {name}")),
                    ],
                    Err(e) => failure("Could not set cover image", e),
                }
            }

            Request::SelectStickers {
                uri,
                path,
                name,
                sources,
            } => {
                // Picker was cancelled.
                if sources.is_empty() {
                    return vec![];
                }
                let identity = self.identify(&uri);
                let location = DecorationPatch::located(&name, &path, &uri);
                let count = sources.len();
                match self
                    .writer
                    .add_stickers(identity.clone(), location, sources)
                    .await
                {
                    Ok(record) => vec![
                        Reply::FileDetails {
                            identity,
                            record: Some(record),
                        },
                        Reply::info(format!("Added {count} sticker(s) to {name}")),
                    ],
                    Err(e) => failure("Could not add stickers", e),
                }
            }

            Request::RemoveSticker { uri, index } => {
                let identity = self.identify(&uri);
                match self.writer.remove_sticker(identity.clone(), index).await {
                    Ok(record) => vec![Reply::FileDetails {
                        identity,
                        record: Some(record),
                    }],
                    Err(e) => failure("Could not remove sticker", e),
                }
            }

            Request::ListChildren { path } => {
                let records = self.storage.metadata.records();
                match listing::list_children(&path, &self.hasher, &records) {
                    Ok(entries) => vec![Reply::ChildrenListed { path, entries }],
                    Err(e) => failure("Could not open folder", e),
                }
            }

            Request::PruneAssets => match self.writer.prune().await {
                Ok(removed) => vec![Reply::Pruned { removed }],
                // Surfaced even when the document is unreadable.
                Err(e) => {
                    log::error!("prune failed: {e}");
                    vec![Reply::error(format!("Nothing was pruned: {e}"))]
                }
            },
        }
    }
}

fn failure(context: &str, e: HostError) -> Vec<Reply> {
    log::error!("{context}: {e}");
    if e.is_user_visible() {
        vec![Reply::error(format!("{context}: {e}"))]
    } else {
        vec![]
    }
}
