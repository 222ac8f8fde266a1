//! In-memory canvas scene.
//!
//! Two ordered collections; order is z-order (last = drawn on top, hit
//! first). Ids are unique per collection and never reused in a session:
//! the counters start at `max(id) + 1` on load and only grow. Once an id
//! reaches `u32::MAX` the counter falls back to the lowest free id.

use deco_core::model::{CharacterEntity, EntityRef, FileMeta, ShapeEntity, ShapeKind};
use deco_render::Point;
use deco_render::hit::HitTester;
use deco_render::measure::GlyphMeasure;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct CanvasSceneModel {
    characters: Vec<CharacterEntity>,
    shapes: Vec<ShapeEntity>,
    next_character_id: u32,
    next_shape_id: u32,
    glyph_size: f64,
    shape_size: f64,
}

impl Default for CanvasSceneModel {
    fn default() -> Self {
        Self::new(40.0, 60.0)
    }
}

fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    let ids: Vec<u32> = ids.collect();
    match ids.iter().max() {
        None => 1,
        Some(max) => max.checked_add(1).unwrap_or_else(|| lowest_free(&ids)),
    }
}

fn lowest_free(ids: &[u32]) -> u32 {
    let used: HashSet<u32> = ids.iter().copied().collect();
    (1..u32::MAX).find(|id| !used.contains(id)).unwrap_or(u32::MAX)
}

impl CanvasSceneModel {
    /// Empty scene. New glyphs get `glyph_size`, new shapes `shape_size` square.
    pub fn new(glyph_size: f64, shape_size: f64) -> Self {
        Self {
            characters: Vec::new(),
            shapes: Vec::new(),
            next_character_id: 1,
            next_shape_id: 1,
            glyph_size,
            shape_size,
        }
    }

    pub fn load(&mut self, characters: Vec<CharacterEntity>, shapes: Vec<ShapeEntity>) {
        self.next_character_id = next_id(characters.iter().map(|c| c.id));
        self.next_shape_id = next_id(shapes.iter().map(|s| s.id));
        self.characters = characters;
        self.shapes = shapes;
    }

    /// Swap in a new character collection, keeping the shapes.
    pub fn replace_characters(&mut self, characters: Vec<CharacterEntity>) {
        self.next_character_id = next_id(characters.iter().map(|c| c.id));
        self.characters = characters;
    }

    pub fn replace_shapes(&mut self, shapes: Vec<ShapeEntity>) {
        self.next_shape_id = next_id(shapes.iter().map(|s| s.id));
        self.shapes = shapes;
    }

    pub fn characters(&self) -> &[CharacterEntity] {
        &self.characters
    }

    pub fn shapes(&self) -> &[ShapeEntity] {
        &self.shapes
    }

    pub fn glyph_size(&self) -> f64 {
        self.glyph_size
    }

    pub fn shape_size(&self) -> f64 {
        self.shape_size
    }

    pub fn character(&self, id: u32) -> Option<&CharacterEntity> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: u32) -> Option<&mut CharacterEntity> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn shape(&self, id: u32) -> Option<&ShapeEntity> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: u32) -> Option<&mut ShapeEntity> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// First character standing for `path`, if any.
    pub fn character_for_path(&self, path: &str) -> Option<u32> {
        self.characters
            .iter()
            .find(|c| c.file_path() == Some(path))
            .map(|c| c.id)
    }

    pub fn add_character(
        &mut self,
        glyph: &str,
        x: f64,
        y: f64,
        color: &str,
        metadata: Option<FileMeta>,
    ) -> &CharacterEntity {
        let id = self.next_character_id;
        self.characters.push(CharacterEntity {
            id,
            glyph: glyph.to_string(),
            x,
            y,
            size: self.glyph_size,
            color: color.to_string(),
            metadata,
        });
        self.next_character_id = id.checked_add(1).unwrap_or_else(|| {
            lowest_free(&self.characters.iter().map(|c| c.id).collect::<Vec<_>>())
        });
        &self.characters[self.characters.len() - 1]
    }

    /// `(x, y)` is the new shape's top-left corner.
    pub fn add_shape(&mut self, kind: ShapeKind, x: f64, y: f64, color: &str) -> &ShapeEntity {
        let id = self.next_shape_id;
        self.shapes.push(ShapeEntity {
            id,
            kind,
            x,
            y,
            width: self.shape_size,
            height: self.shape_size,
            color: color.to_string(),
        });
        self.next_shape_id = id.checked_add(1).unwrap_or_else(|| {
            lowest_free(&self.shapes.iter().map(|s| s.id).collect::<Vec<_>>())
        });
        &self.shapes[self.shapes.len() - 1]
    }

    /// Removing a file character does not touch the used-file registry;
    /// the caller releases the path.
    pub fn remove_character(&mut self, id: u32) -> Option<CharacterEntity> {
        let pos = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(pos))
    }

    pub fn remove_shape(&mut self, id: u32) -> Option<ShapeEntity> {
        let pos = self.shapes.iter().position(|s| s.id == id)?;
        Some(self.shapes.remove(pos))
    }

    /// Move an entity to the end of its collection. `false` if it's gone.
    pub fn bring_to_front(&mut self, target: EntityRef) -> bool {
        match target {
            EntityRef::Character(id) => {
                let Some(pos) = self.characters.iter().position(|c| c.id == id) else {
                    return false;
                };
                let c = self.characters.remove(pos);
                self.characters.push(c);
            }
            EntityRef::Shape(id) => {
                let Some(pos) = self.shapes.iter().position(|s| s.id == id) else {
                    return false;
                };
                let s = self.shapes.remove(pos);
                self.shapes.push(s);
            }
        }
        true
    }

    /// Origin of an entity: center for characters, top-left for shapes.
    pub fn position(&self, target: EntityRef) -> Option<Point> {
        match target {
            EntityRef::Character(id) => self.character(id).map(|c| Point::new(c.x, c.y)),
            EntityRef::Shape(id) => self.shape(id).map(|s| Point::new(s.x, s.y)),
        }
    }

    pub fn set_position(&mut self, target: EntityRef, p: Point) {
        match target {
            EntityRef::Character(id) => {
                if let Some(c) = self.character_mut(id) {
                    c.x = p.x;
                    c.y = p.y;
                }
            }
            EntityRef::Shape(id) => {
                if let Some(s) = self.shape_mut(id) {
                    s.x = p.x;
                    s.y = p.y;
                }
            }
        }
    }

    /// Topmost entity under `p`. Shapes are checked before characters.
    pub fn hit_test(
        &self,
        p: Point,
        tester: &HitTester,
        measure: &dyn GlyphMeasure,
    ) -> Option<EntityRef> {
        tester
            .hit_shape(&self.shapes, p)
            .map(EntityRef::Shape)
            .or_else(|| {
                tester
                    .hit_character(&self.characters, p, measure)
                    .map(EntityRef::Character)
            })
    }

    pub fn hit_test_resize_handle(&self, p: Point, tester: &HitTester) -> Option<u32> {
        tester.hit_resize_handle(&self.shapes, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deco_render::EstimatedMeasure;
    use pretty_assertions::assert_eq;

    fn glyph(id: u32) -> CharacterEntity {
        CharacterEntity {
            id,
            glyph: "★".into(),
            x: 100.0,
            y: 100.0,
            size: 40.0,
            color: "#000".into(),
            metadata: None,
        }
    }

    #[test]
    fn next_id_follows_max_loaded() {
        let mut scene = CanvasSceneModel::default();
        scene.load(vec![glyph(1), glyph(3)], vec![]);
        assert_eq!(scene.add_character("♥", 0.0, 0.0, "#f00", None).id, 4);
        assert_eq!(scene.add_shape(ShapeKind::Circle, 0.0, 0.0, "#f00").id, 1);
    }

    #[test]
    fn empty_scene_starts_at_one() {
        let mut scene = CanvasSceneModel::default();
        scene.load(vec![], vec![]);
        assert_eq!(scene.add_character("♥", 0.0, 0.0, "#f00", None).id, 1);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut scene = CanvasSceneModel::default();
        scene.load(vec![glyph(1)], vec![]);
        let id = scene.add_character("♥", 0.0, 0.0, "#f00", None).id;
        scene.remove_character(id);
        assert_eq!(scene.add_character("♥", 0.0, 0.0, "#f00", None).id, id + 1);
    }

    #[test]
    fn bring_to_front_moves_to_end() {
        let mut scene = CanvasSceneModel::default();
        scene.load(vec![glyph(1), glyph(2), glyph(3)], vec![]);
        assert!(scene.bring_to_front(EntityRef::Character(1)));
        let order: Vec<u32> = scene.characters().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(!scene.bring_to_front(EntityRef::Character(99)));
    }

    #[test]
    fn hit_test_prefers_front_entity() {
        let mut scene = CanvasSceneModel::default();
        scene.load(vec![glyph(1), glyph(2)], vec![]);
        let tester = HitTester::default();
        let m = EstimatedMeasure::default();
        let p = Point::new(100.0, 100.0);
        assert_eq!(scene.hit_test(p, &tester, &m), Some(EntityRef::Character(2)));
        scene.bring_to_front(EntityRef::Character(1));
        assert_eq!(scene.hit_test(p, &tester, &m), Some(EntityRef::Character(1)));
    }

    #[test]
    fn ids_wrap_to_the_lowest_free_slot() {
        let mut scene = CanvasSceneModel::default();
        scene.load(vec![glyph(1), glyph(u32::MAX)], vec![]);
        assert_eq!(scene.add_character("♥", 0.0, 0.0, "#f00", None).id, 2);

        let mut shape = scene.add_shape(ShapeKind::Circle, 0.0, 0.0, "#f00").clone();
        shape.id = u32::MAX - 1;
        scene.load(vec![], vec![shape]);
        assert_eq!(scene.add_shape(ShapeKind::Square, 0.0, 0.0, "#f00").id, u32::MAX);
        assert_eq!(scene.add_shape(ShapeKind::Square, 0.0, 0.0, "#f00").id, 1);
    }
}
