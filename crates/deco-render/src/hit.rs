//! Hit testing: point → entity lookup.
//!
//! Collections are walked in reverse (last drawn = topmost). Shapes are
//! checked before characters, and a shape's resize handle before either.

use crate::measure::GlyphMeasure;
use deco_core::model::{CharacterEntity, ShapeEntity, ShapeKind};
use kurbo::{Point, Rect};

/// Geometry parameters for hit testing.
#[derive(Debug, Clone, Copy)]
pub struct HitTester {
    /// Extra width on each side of a measured glyph.
    pub glyph_padding: f64,
    /// Radius around a shape's bottom-right corner.
    pub handle_radius: f64,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            glyph_padding: 5.0,
            handle_radius: 10.0,
        }
    }
}

fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

pub fn shape_bounds(shape: &ShapeEntity) -> Rect {
    Rect::new(shape.x, shape.y, shape.x + shape.width, shape.y + shape.height)
}

/// The fixed resize handle at a shape's bottom-right corner.
pub fn resize_handle(shape: &ShapeEntity) -> Point {
    Point::new(shape.x + shape.width, shape.y + shape.height)
}

pub fn shape_contains(shape: &ShapeEntity, p: Point) -> bool {
    let bounds = shape_bounds(shape);
    match shape.kind {
        ShapeKind::Circle => {
            let radius = shape.width.min(shape.height) / 2.0;
            p.distance(bounds.center()) <= radius
        }
        ShapeKind::Square => contains_inclusive(bounds, p),
        ShapeKind::Triangle => {
            let apex = Point::new(bounds.center().x, bounds.y0);
            let left = Point::new(bounds.x0, bounds.y1);
            let right = Point::new(bounds.x1, bounds.y1);
            in_triangle(p, apex, left, right)
        }
    }
}

/// Barycentric containment, edges included.
fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < f64::EPSILON {
        // Degenerate (zero-area) triangle.
        return false;
    }
    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

impl HitTester {
    /// Box around a glyph: measured width plus padding, declared size tall,
    /// centered on the character's position.
    pub fn character_bounds(&self, c: &CharacterEntity, measure: &dyn GlyphMeasure) -> Rect {
        let half_w = measure.glyph_width(&c.glyph, c.size) / 2.0 + self.glyph_padding;
        let half_h = c.size / 2.0;
        Rect::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h)
    }

    pub fn character_contains(
        &self,
        c: &CharacterEntity,
        p: Point,
        measure: &dyn GlyphMeasure,
    ) -> bool {
        contains_inclusive(self.character_bounds(c, measure), p)
    }

    /// Topmost shape under `p`.
    pub fn hit_shape(&self, shapes: &[ShapeEntity], p: Point) -> Option<u32> {
        shapes
            .iter()
            .rev()
            .find(|s| shape_contains(s, p))
            .map(|s| s.id)
    }

    /// Topmost character under `p`.
    pub fn hit_character(
        &self,
        characters: &[CharacterEntity],
        p: Point,
        measure: &dyn GlyphMeasure,
    ) -> Option<u32> {
        characters
            .iter()
            .rev()
            .find(|c| self.character_contains(c, p, measure))
            .map(|c| c.id)
    }

    /// Topmost shape whose resize handle is within reach of `p`.
    pub fn hit_resize_handle(&self, shapes: &[ShapeEntity], p: Point) -> Option<u32> {
        shapes
            .iter()
            .rev()
            .find(|s| p.distance(resize_handle(s)) <= self.handle_radius)
            .map(|s| s.id)
    }
}
