//! Runtime configuration.
//!
//! Every field has a default so a partial (or missing) `deco.json` works.

use crate::error::{DecoError, Result};
use crate::id::{IdentityHasher, MIN_IDENTITY_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecoConfig {
    /// Hex characters kept from the identity digest.
    pub identity_len: usize,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Floor for shape width/height while resizing.
    pub min_shape_size: f64,
    /// Distance from a shape's bottom-right corner that counts as its handle.
    pub resize_handle_radius: f64,
    /// Horizontal slack around a glyph's measured width when hit testing.
    pub glyph_padding: f64,
    pub default_glyph_size: f64,
    pub default_shape_size: f64,
    pub metadata_file: String,
    pub cache_dir: String,
    pub scene_file: String,
}

impl Default for DecoConfig {
    fn default() -> Self {
        Self {
            identity_len: MIN_IDENTITY_LEN,
            canvas_width: 800.0,
            canvas_height: 600.0,
            min_shape_size: 20.0,
            resize_handle_radius: 10.0,
            glyph_padding: 5.0,
            default_glyph_size: 40.0,
            default_shape_size: 60.0,
            metadata_file: "file-metadata.json".to_string(),
            cache_dir: "cache".to_string(),
            scene_file: "scene-state.json".to_string(),
        }
    }
}

impl DecoConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns `DecoError::Config` if the file exists but can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(DecoError::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        serde_json::from_str(&text).map_err(|e| DecoError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn hasher(&self) -> IdentityHasher {
        IdentityHasher::new(self.identity_len)
    }
}
