//! Glyph widths from the webview's 2D context.

use deco_render::{EstimatedMeasure, GlyphMeasure};
use web_sys::CanvasRenderingContext2d;

pub struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
    fallback: EstimatedMeasure,
}

impl CanvasMeasure {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            fallback: EstimatedMeasure::default(),
        }
    }
}

impl GlyphMeasure for CanvasMeasure {
    fn glyph_width(&self, glyph: &str, size: f64) -> f64 {
        self.ctx.set_font(&font_for(size));
        match self.ctx.measure_text(glyph) {
            Ok(metrics) if metrics.width() > 0.0 => metrics.width(),
            _ => self.fallback.glyph_width(glyph, size),
        }
    }
}

/// CSS font shorthand the renderer draws glyphs with.
pub fn font_for(size: f64) -> String {
    format!("{size}px sans-serif")
}
