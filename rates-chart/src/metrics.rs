//! Text measurement used while laying out labels.

/// Measures rendered text width in pixels.
pub trait TextMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Width estimate for when no font is loaded: every glyph is 0.6 em wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

/// Average advance of a bold sans-serif glyph, in ems.
pub const APPROX_ADVANCE: f32 = 0.6;

impl TextMetrics for ApproxMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * APPROX_ADVANCE
    }
}
