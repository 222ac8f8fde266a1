pub mod hit;
pub mod measure;

pub use hit::HitTester;
pub use measure::{EstimatedMeasure, GlyphMeasure};

// Re-export the geometry types so downstream crates don't need kurbo directly.
pub use kurbo::{Point, Rect, Vec2};
