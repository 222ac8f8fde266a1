//! Paths already placed on the canvas as file/folder characters.

use deco_core::model::CharacterEntity;
use std::collections::BTreeSet;

/// Every path here should belong to at least one live character.
/// `reconcile` repairs the set when that stops being true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedFileRegistry {
    paths: BTreeSet<String>,
}

impl UsedFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_characters(characters: &[CharacterEntity]) -> Self {
        Self {
            paths: characters
                .iter()
                .filter_map(|c| c.file_path().map(str::to_string))
                .collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Returns `false` if the path was already present.
    pub fn insert(&mut self, path: &str) -> bool {
        self.paths.insert(path.to_string())
    }

    /// Returns `true` if the path was present.
    pub fn release(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Drop paths no character references. Returns the dropped paths.
    pub fn reconcile(&mut self, characters: &[CharacterEntity]) -> Vec<String> {
        let live: BTreeSet<&str> = characters.iter().filter_map(|c| c.file_path()).collect();
        let orphans: Vec<String> = self
            .paths
            .iter()
            .filter(|p| !live.contains(p.as_str()))
            .cloned()
            .collect();
        for path in &orphans {
            log::info!("releasing orphaned canvas path {path}");
            self.paths.remove(path);
        }
        orphans
    }
}
