//! One level of a folder with each entry's saved decorations, for the
//! depth viewer and the details panel.

use crate::error::{HostError, HostResult};
use deco_core::model::{DecorationRecord, EntryKind};
use deco_core::protocol::ChildEntry;
use deco_core::IdentityHasher;
use std::cmp::Ordering;
use std::path::Path;
use url::Url;

/// Canonical `file://` URI for `path`, percent-encoded the way editors
/// send it, so identities computed here match the ones from the client.
pub fn file_uri(path: &Path) -> HostResult<String> {
    let absolute = std::path::absolute(path).map_err(|source| HostError::Listing {
        path: path.to_path_buf(),
        source,
    })?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| HostError::FileUri { path: absolute })
}

/// Folders first, then case-insensitive by name.
pub fn list_children(
    dir: &Path,
    hasher: &IdentityHasher,
    records: &[DecorationRecord],
) -> HostResult<Vec<ChildEntry>> {
    let listing = |source| HostError::Listing {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(listing)? {
        let entry = entry.map_err(listing)?;
        let path = entry.path();
        let kind = if path.is_dir() {
            EntryKind::Folder
        } else {
            EntryKind::File
        };
        let uri = file_uri(&path)?;
        let identity = hasher.identify(&uri);
        let record = records.iter().find(|r| r.identity == identity).cloned();
        entries.push(ChildEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            uri,
            kind,
            identity,
            record,
        });
    }

    entries.sort_by(compare_entries);
    Ok(entries)
}

fn compare_entries(a: &ChildEntry, b: &ChildEntry) -> Ordering {
    let rank = |kind: EntryKind| match kind {
        EntryKind::Folder => 0,
        EntryKind::File => 1,
    };
    rank(a.kind)
        .cmp(&rank(b.kind))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deco_core::Identity;
    use pretty_assertions::assert_eq;

    fn record_for(identity: &Identity, name: &str) -> DecorationRecord {
        serde_json::from_value(serde_json::json!({
            "hash": identity.as_str(),
            "name": name,
            "path": "",
            "uri": "",
            "stickers": [],
            "coverImage": null,
            "lastUpdated": "2026-01-01T00:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn folders_first_then_alphabetical() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "A.txt", "c.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        for name in ["zeta", "Alpha"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }

        let entries = list_children(dir.path(), &IdentityHasher::default(), &[]).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "zeta", "A.txt", "b.txt", "c.txt"]);
        assert_eq!(entries[0].kind, EntryKind::Folder);
        assert!(entries.iter().all(|e| e.record.is_none()));
    }

    #[test]
    fn entries_carry_saved_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        std::fs::write(&file, "").unwrap();
        let hasher = IdentityHasher::default();
        let identity = hasher.identify(&file_uri(&file).unwrap());

        let entries = list_children(dir.path(), &hasher, &[record_for(&identity, "notes.md")]).unwrap();
        assert_eq!(entries[0].identity, identity);
        assert_eq!(entries[0].record.as_ref().unwrap().display_name, "notes.md");
    }

    #[test]
    fn file_uri_is_percent_encoded() {
        assert_eq!(file_uri(Path::new("/w/a.txt")).unwrap(), "file:///w/a.txt");
        assert_eq!(
            file_uri(Path::new("/w/my notes#1.md")).unwrap(),
            "file:///w/my%20notes%231.md"
        );
    }

    #[test]
    fn spaced_names_match_the_client_identity() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my notes.md"), "").unwrap();
        let hasher = IdentityHasher::default();

        let entries = list_children(dir.path(), &hasher, &[]).unwrap();
        assert!(entries[0].uri.ends_with("/my%20notes.md"));
        assert_eq!(entries[0].identity, hasher.identify(&entries[0].uri));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_children(&dir.path().join("nope"), &IdentityHasher::default(), &[]).unwrap_err();
        assert!(matches!(err, HostError::Listing { .. }));
    }
}
