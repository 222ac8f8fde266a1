//! Glyph measurement seam.
//!
//! The webview measures with its 2D context; everything else (tests, the
//! host) uses a fixed-ratio estimate.

pub trait GlyphMeasure {
    /// Rendered width of `glyph` at font size `size`.
    fn glyph_width(&self, glyph: &str, size: f64) -> f64;
}

/// Treats every char as `ratio * size` wide.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasure {
    pub ratio: f64,
}

impl Default for EstimatedMeasure {
    fn default() -> Self {
        Self { ratio: 0.6 }
    }
}

impl GlyphMeasure for EstimatedMeasure {
    fn glyph_width(&self, glyph: &str, size: f64) -> f64 {
        let chars = glyph.chars().count().max(1) as f64;
        chars * size * self.ratio
    }
}

impl<M: GlyphMeasure + ?Sized> GlyphMeasure for Box<M> {
    fn glyph_width(&self, glyph: &str, size: f64) -> f64 {
        (**self).glyph_width(glyph, size)
    }
}
