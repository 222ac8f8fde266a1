use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Shortest truncation we hand out: 8 hex chars = 32 bits.
pub const MIN_IDENTITY_LEN: usize = 8;
/// A full SHA-256 digest in hex.
pub const MAX_IDENTITY_LEN: usize = 64;

/// Stable short key for a file or folder, derived from its URI string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an already-computed key (e.g. one read back from the document).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Identity(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives identities as a truncated hex SHA-256 of the URI.
///
/// Pure and infallible: every string, including the empty one, hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityHasher {
    len: usize,
}

impl Default for IdentityHasher {
    fn default() -> Self {
        Self::new(MIN_IDENTITY_LEN)
    }
}

impl IdentityHasher {
    /// `len` is the number of hex characters kept, clamped to `8..=64`.
    pub fn new(len: usize) -> Self {
        Self {
            len: len.clamp(MIN_IDENTITY_LEN, MAX_IDENTITY_LEN),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn identify(&self, uri: &str) -> Identity {
        let digest = Sha256::digest(uri.as_bytes());
        let mut hex = String::with_capacity(MAX_IDENTITY_LEN);
        for byte in digest.iter() {
            hex.push_str(&format!("{byte:02x}"));
        }
        hex.truncate(self.len);
        Identity(hex)
    }
}
