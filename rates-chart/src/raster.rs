//! PNG backend for [`DrawCommand`]s.
//!
//! Shapes are filled and stroked with `tiny-skia`; text is converted from
//! `ab_glyph` outlines into paths and filled the same way. Without a font,
//! text commands are skipped and widths are estimated.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, GlyphId, OutlineCurve, PxScale, ScaleFont};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use tracing::{debug, warn};

use crate::error::ChartError;
use crate::layout::Point;
use crate::metrics::{ApproxMetrics, TextMetrics};
use crate::palette::Rgba;
use crate::scene::DrawCommand;

/// Bold sans-serif fonts tried when none is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Turns drawing commands into PNG bytes.
pub struct Rasterizer {
    font: Option<FontVec>,
}

impl Rasterizer {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// A rasterizer that draws shapes only.
    pub fn without_text() -> Self {
        Self::new(None)
    }

    /// Loads a TrueType/OpenType font from disk.
    pub fn from_font_file(path: &Path) -> Result<Self, ChartError> {
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| ChartError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(Some(font)))
    }

    /// Uses `configured` when given, otherwise the first readable
    /// [`FONT_CANDIDATES`] entry, otherwise no text.
    pub fn discover(configured: Option<&Path>) -> Result<Self, ChartError> {
        if let Some(path) = configured {
            return Self::from_font_file(path);
        }

        for candidate in FONT_CANDIDATES.iter().map(PathBuf::from) {
            if !candidate.is_file() {
                continue;
            }
            match Self::from_font_file(&candidate) {
                Ok(rasterizer) => {
                    debug!("Using chart font {}", candidate.display());
                    return Ok(rasterizer);
                }
                Err(e) => warn!("Skipping chart font candidate: {}", e),
            }
        }

        warn!("No chart font found, labels will not be drawn");
        Ok(Self::without_text())
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draws `commands` onto a transparent canvas and encodes it as PNG.
    pub fn rasterize(
        &self,
        width: u32,
        height: u32,
        commands: &[DrawCommand],
    ) -> Result<Vec<u8>, ChartError> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ChartError::Render(format!("invalid canvas size {width}x{height}")))?;

        for command in commands {
            match command {
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    if let Some(rect) = pixel_rect(*x, *y, *width, *height) {
                        let mut paint = paint(*color);
                        paint.anti_alias = false;
                        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                    }
                }
                DrawCommand::Polyline {
                    points,
                    width,
                    color,
                } => {
                    if let Some(path) = polygon(points, false) {
                        let stroke = Stroke {
                            width: *width,
                            line_join: LineJoin::Round,
                            line_cap: LineCap::Round,
                            ..Stroke::default()
                        };
                        pixmap.stroke_path(
                            &path,
                            &paint(*color),
                            &stroke,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                DrawCommand::Area { points, color } => {
                    if let Some(path) = polygon(points, true) {
                        pixmap.fill_path(
                            &path,
                            &paint(*color),
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    size,
                    color,
                } => {
                    let Some(font) = &self.font else {
                        continue;
                    };
                    if let Some(path) = text_path(font, text, *x, *y, *size) {
                        pixmap.fill_path(
                            &path,
                            &paint(*color),
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
            }
        }

        pixmap
            .encode_png()
            .map_err(|e| ChartError::Render(format!("PNG encoding failed: {e}")))
    }
}

impl TextMetrics for Rasterizer {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let Some(font) = &self.font else {
            return ApproxMetrics.text_width(text, size);
        };

        let scaled = font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

fn paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Snaps a rectangle to whole pixels, at least one pixel on each side.
///
/// tiny-skia's anti-aliased hairline scan asserts on sub-pixel rectangles,
/// which the chart's 1px rules at fractional x would otherwise be.
fn pixel_rect(x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    Rect::from_xywh(x.round(), y.round(), width.round().max(1.0), height.round().max(1.0))
}

fn polygon(points: &[Point], close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// Glyph outlines of `text` with its baseline starting at `(x, y)`.
fn text_path(font: &FontVec, text: &str, x: f32, y: f32, size: f32) -> Option<tiny_skia::Path> {
    let scaled = font.as_scaled(PxScale::from(size));
    let (sx, sy) = (scaled.h_scale_factor(), scaled.v_scale_factor());

    let mut pb = PathBuilder::new();
    let mut caret = x;
    let mut previous: Option<GlyphId> = None;

    for c in text.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }

        if let Some(outline) = font.outline(id) {
            // font units are y-up; the canvas is y-down
            let map = |p: ab_glyph::Point| (caret + p.x * sx, y - p.y * sy);
            let mut pen: Option<ab_glyph::Point> = None;

            for curve in &outline.curves {
                let (start, end) = match curve {
                    OutlineCurve::Line(p0, p1) => (*p0, *p1),
                    OutlineCurve::Quad(p0, _, p2) => (*p0, *p2),
                    OutlineCurve::Cubic(p0, _, _, p3) => (*p0, *p3),
                };
                if pen != Some(start) {
                    let (mx, my) = map(start);
                    pb.move_to(mx, my);
                }
                match curve {
                    OutlineCurve::Line(_, p1) => {
                        let (px, py) = map(*p1);
                        pb.line_to(px, py);
                    }
                    OutlineCurve::Quad(_, c1, p2) => {
                        let (cx, cy) = map(*c1);
                        let (px, py) = map(*p2);
                        pb.quad_to(cx, cy, px, py);
                    }
                    OutlineCurve::Cubic(_, c1, c2, p3) => {
                        let (c1x, c1y) = map(*c1);
                        let (c2x, c2y) = map(*c2);
                        let (px, py) = map(*p3);
                        pb.cubic_to(c1x, c1y, c2x, c2y, px, py);
                    }
                }
                pen = Some(end);
            }
        }

        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_rasterize_produces_png() {
        let commands = vec![
            DrawCommand::FillRect {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 2.0,
                color: Rgba::WHITE,
            },
            DrawCommand::Polyline {
                points: vec![Point::new(0.0, 0.0), Point::new(50.0, 40.0)],
                width: 2.0,
                color: Rgba::new(78, 121, 167, 255),
            },
            DrawCommand::Text {
                text: "skipped".into(),
                x: 0.0,
                y: 10.0,
                size: 12.0,
                color: Rgba::WHITE,
            },
        ];

        let png = Rasterizer::without_text()
            .rasterize(64, 48, &commands)
            .unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_fractional_hairline_rects_render() {
        let rects = [(120.83, 1.0, 4.0), (241.67, 1.0, 270.0), (60.4, 0.6, 0.4)];
        let commands: Vec<DrawCommand> = rects
            .into_iter()
            .map(|(x, width, height)| DrawCommand::FillRect {
                x,
                y: 10.5,
                width,
                height,
                color: Rgba::WHITE,
            })
            .collect();

        let png = Rasterizer::without_text()
            .rasterize(500, 300, &commands)
            .unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_pixel_rect_snaps_to_whole_pixels() {
        let rect = pixel_rect(120.83, 10.4, 0.6, 2.0).unwrap();
        assert_eq!((rect.x(), rect.y()), (121.0, 10.0));
        assert_eq!((rect.width(), rect.height()), (1.0, 2.0));
        assert!(pixel_rect(1.0, 1.0, 0.0, 5.0).is_none());
        assert!(pixel_rect(1.0, 1.0, f32::NAN, 5.0).is_none());
    }

    #[test]
    fn test_text_is_drawn_with_system_font() {
        let rasterizer = match Rasterizer::discover(None) {
            Ok(r) if r.has_font() => r,
            _ => return, // no usable font installed
        };
        let commands = vec![DrawCommand::Text {
            text: "SEK 9.20".into(),
            x: 4.0,
            y: 30.0,
            size: 20.0,
            color: Rgba::WHITE,
        }];

        assert!(text_path(rasterizer.font.as_ref().unwrap(), "SEK", 4.0, 30.0, 20.0).is_some());
        assert!(rasterizer.text_width("SEK 9.20", 20.0) > 0.0);

        let with_text = rasterizer.rasterize(120, 40, &commands).unwrap();
        let without = Rasterizer::without_text()
            .rasterize(120, 40, &commands)
            .unwrap();
        assert_ne!(with_text, without);
    }

    #[test]
    fn test_degenerate_shapes_are_ignored() {
        let commands = vec![
            DrawCommand::FillRect {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
                color: Rgba::WHITE,
            },
            DrawCommand::Area {
                points: vec![],
                color: Rgba::WHITE,
            },
        ];

        assert!(
            Rasterizer::without_text()
                .rasterize(8, 8, &commands)
                .is_ok()
        );
    }

    #[test]
    fn test_zero_canvas_is_render_error() {
        let result = Rasterizer::without_text().rasterize(0, 10, &[]);
        assert!(matches!(result, Err(ChartError::Render(_))));
    }

    #[test]
    fn test_missing_font_file_is_error() {
        let result = Rasterizer::from_font_file(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(ChartError::Io(_))));
    }

    #[test]
    fn test_metrics_without_font_are_estimated() {
        let rasterizer = Rasterizer::without_text();
        assert!(!rasterizer.has_font());
        assert_eq!(
            rasterizer.text_width("Legend", 14.0),
            ApproxMetrics.text_width("Legend", 14.0)
        );
    }
}
