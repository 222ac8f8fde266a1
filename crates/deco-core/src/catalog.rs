//! Static palettes and the default scene used on first run and on reset.
//!
//! Callers always get fresh `Vec`s, so mutating a returned scene can never
//! leak back into the template.

use crate::model::{CharacterEntity, EntryKind, ShapeEntity, ShapeKind};

pub const FOLDER_GLYPH: &str = "📁";
pub const FILE_GLYPH: &str = "📄";

/// Glyphs offered by the palette.
pub const GLYPHS: &[&str] = &[
    "★", "☆", "♥", "♦", "♣", "♠", "☀", "☁", "☂", "☃", "✿", "❀", "☺", "✈", "♪", "⚑",
];

pub const SHAPE_KINDS: &[ShapeKind] = &[ShapeKind::Circle, ShapeKind::Square, ShapeKind::Triangle];

pub const PALETTE_COLORS: &[&str] = &[
    "#e74c3c", "#e67e22", "#f1c40f", "#2ecc71", "#3498db", "#9b59b6", "#34495e",
];

pub fn glyph_for(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Folder => FOLDER_GLYPH,
        EntryKind::File => FILE_GLYPH,
    }
}

pub fn default_characters() -> Vec<CharacterEntity> {
    [
        ("★", 120.0, 100.0, "#f1c40f"),
        ("♥", 220.0, 140.0, "#e74c3c"),
        ("☀", 340.0, 90.0, "#e67e22"),
        ("✿", 460.0, 160.0, "#9b59b6"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (glyph, x, y, color))| CharacterEntity {
        id: i as u32 + 1,
        glyph: glyph.to_string(),
        x,
        y,
        size: 40.0,
        color: color.to_string(),
        metadata: None,
    })
    .collect()
}

pub fn default_shapes() -> Vec<ShapeEntity> {
    [
        (ShapeKind::Circle, 100.0, 300.0, "#3498db"),
        (ShapeKind::Square, 260.0, 300.0, "#2ecc71"),
        (ShapeKind::Triangle, 420.0, 300.0, "#e67e22"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (kind, x, y, color))| ShapeEntity {
        id: i as u32 + 1,
        kind,
        x,
        y,
        width: 80.0,
        height: 80.0,
        color: color.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_independent_copies() {
        let mut first = default_characters();
        first[0].x = 9999.0;
        first.clear();
        let second = default_characters();
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].x, 120.0);
    }

    #[test]
    fn default_ids_start_at_one() {
        let ids: Vec<u32> = default_shapes().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
