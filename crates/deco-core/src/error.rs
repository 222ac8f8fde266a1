//! Error taxonomy shared by the store, cache, and host.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DecoError>;

#[derive(Debug, thiserror::Error)]
pub enum DecoError {
    /// Backing resource missing or corrupt. Recovered locally by the store.
    #[error("could not read {}: {reason}", path.display())]
    StorageRead { path: PathBuf, reason: String },

    #[error("could not write {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not copy image {}: {source}", source_path.display())]
    AssetStore {
        source_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid asset reference `{0}`")]
    InvalidAssetRef(String),

    #[error("invalid drop descriptor: {0}")]
    InvalidDropDescriptor(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl DecoError {
    /// Whether the host should surface this as a notification.
    ///
    /// Read failures are absorbed and malformed drops are only logged.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            DecoError::StorageRead { .. } | DecoError::InvalidDropDescriptor(_)
        )
    }
}
