pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod id;
pub mod kv;
pub mod model;
pub mod protocol;
pub mod store;

pub use assets::{AssetCache, AssetRole};
pub use config::DecoConfig;
pub use error::{DecoError, Result};
pub use id::{Identity, IdentityHasher};
pub use kv::{KeyValueStore, SceneStore};
pub use model::*;
pub use store::MetadataStore;
