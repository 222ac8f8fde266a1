use deco_core::DecoError;
use std::path::PathBuf;
use thiserror::Error;

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Store(#[from] DecoError),

    #[error("the store writer has shut down")]
    WriterClosed,

    #[error("could not list {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache directory {} would hold {}", cache.display(), file.display())]
    CacheOverlap { cache: PathBuf, file: PathBuf },

    #[error("{} has no file URI", path.display())]
    FileUri { path: PathBuf },

    #[error("there is no sticker at position {index}")]
    NoSuchSticker { index: usize },
}

impl HostError {
    pub fn is_user_visible(&self) -> bool {
        match self {
            HostError::Store(e) => e.is_user_visible(),
            _ => true,
        }
    }
}
