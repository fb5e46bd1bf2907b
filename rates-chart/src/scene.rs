//! Drawing commands derived from the layout.
//!
//! A [`Scene`] is the complete list of primitives for one chart. It is built
//! from the series alone, so what ends up on the canvas can be inspected
//! without rasterizing anything.

use std::collections::HashSet;

use crate::error::ChartError;
use crate::layout::{Bounds, Layout, Point};
use crate::metrics::TextMetrics;
use crate::palette::{FILL_ALPHA, PALETTE, Rgba};
use crate::series::SeriesEntry;

pub const LABEL_FONT_SIZE: f32 = 15.0;
pub const TICK_FONT_SIZE: f32 = 12.0;
pub const LEGEND_HEADER_FONT_SIZE: f32 = 14.0;
pub const LINE_WIDTH: f32 = 2.0;

/// Precision of the min/max callouts.
const EXTREME_PRECISION: usize = 4;
/// Precision of the legend's current-value callout.
const CURRENT_PRECISION: usize = 2;
/// Vertical distance between stacked min/max labels.
const LABEL_ROW: f32 = 15.0;
/// Vertical distance between legend rows.
const LEGEND_ROW: f32 = 32.0;

const MIN_GUIDE: Rgba = Rgba::new(255, 180, 180, 102);
const MAX_GUIDE: Rgba = Rgba::new(180, 255, 180, 102);

/// Chart geometry and labelling options.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Checkpoint labels, oldest first.
    pub tick_labels: Vec<String>,
    /// Values are shown as the price of this many units.
    pub unit_scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 500,
            height: 300,
            tick_labels: ["3m", "1m", "1w", "24h"].map(String::from).to_vec(),
            unit_scale: 100.0,
        }
    }
}

impl RenderOptions {
    pub fn segments(&self) -> usize {
        self.tick_labels.len().saturating_sub(1).max(1)
    }
}

/// A single drawing primitive in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    Polyline {
        points: Vec<Point>,
        width: f32,
        color: Rgba,
    },
    /// Closed, filled polygon.
    Area { points: Vec<Point>, color: Rgba },
    /// Text drawn with its baseline at `y`.
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Rgba,
    },
}

/// Layout plus the ordered drawing commands for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub layout: Layout,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    /// Lays out `entries` and derives every drawing command.
    ///
    /// Fails before producing any command when the series list is empty,
    /// exceeds the palette, reuses a color, or has the wrong number of
    /// checkpoints.
    pub fn build(
        entries: &[SeriesEntry],
        options: &RenderOptions,
        metrics: &dyn TextMetrics,
    ) -> Result<Self, ChartError> {
        validate(entries)?;

        let segments = options.segments();
        let locals = entries
            .iter()
            .map(|entry| {
                Bounds::of(entry.history()).ok_or_else(|| ChartError::ShapeMismatch {
                    code: entry.code().to_string(),
                    expected: segments + 2,
                    got: 0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let global = locals
            .iter()
            .copied()
            .reduce(Bounds::union)
            .ok_or(ChartError::NoEntries)?;

        let scale = options.unit_scale;
        let label_width = entries
            .iter()
            .zip(&locals)
            .flat_map(|(entry, bounds)| {
                [bounds.min, bounds.max].map(|v| {
                    let text = entry.icon().format(v * scale, Some(EXTREME_PRECISION));
                    metrics.text_width(&text, LABEL_FONT_SIZE)
                })
            })
            .fold(0.0_f32, f32::max);

        let layout = Layout::new(options.width, options.height, label_width, segments);
        let single = entries.len() == 1;

        let mut builder = SceneBuilder {
            layout,
            commands: Vec::new(),
        };
        builder.frame(global, &options.tick_labels, entries[0].history().bands());

        for (entry, local) in entries.iter().zip(&locals) {
            // shared scale when comparing, own scale when alone
            let bounds = if single { *local } else { global };
            let points = layout.points(entry.code().as_str(), entry.history(), bounds)?;
            builder.series(entry, points, single);
        }

        builder.labels(entries, &locals, scale, metrics);

        Ok(Scene {
            layout,
            commands: builder.commands,
        })
    }

    /// Every text drawn, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every series line, in drawing order.
    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn areas(&self) -> impl Iterator<Item = &[Point]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Area { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }
}

fn validate(entries: &[SeriesEntry]) -> Result<(), ChartError> {
    if entries.is_empty() {
        return Err(ChartError::NoEntries);
    }
    if entries.len() > PALETTE.len() {
        return Err(ChartError::TooManySeries {
            count: entries.len(),
            max: PALETTE.len(),
        });
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.color_index()) {
            return Err(ChartError::DuplicateColor(entry.color_index()));
        }
    }
    Ok(())
}

struct SceneBuilder {
    layout: Layout,
    commands: Vec<DrawCommand>,
}

impl SceneBuilder {
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            size,
            color,
        });
    }

    /// Guide lines, ticks, band marks and the frame.
    fn frame(&mut self, global: Bounds, tick_labels: &[String], bands: Vec<&[f64]>) {
        let l = self.layout;
        let span = l.plot_right() - l.left_margin;

        self.rect(l.left_margin, l.y(global.min, global), span, 1.0, MIN_GUIDE);
        self.rect(l.left_margin, l.y(global.max, global), span, 1.0, MAX_GUIDE);

        for (i, label) in tick_labels.iter().enumerate() {
            let x = l.checkpoint_x(i);
            self.rect(x, 11.0, 1.0, l.height - 30.0, Rgba::WHITE);
            self.text(label.as_str(), x - 6.0, l.height - 8.0, TICK_FONT_SIZE, Rgba::WHITE);

            if i < l.segments {
                if let Some(band) = bands.get(i) {
                    for j in 0..band.len() {
                        self.rect(l.band_x(i, j, band.len()), 11.0, 1.0, 4.0, Rgba::WHITE);
                    }
                }
            }
        }

        self.rect(l.left_margin, l.axis_y(), span, 2.0, Rgba::WHITE);
        self.rect(l.left_margin, 9.0, span, 2.0, Rgba::WHITE);
        self.rect(l.left_margin - 1.0, 10.0, 1.0, l.height - 29.0, Rgba::WHITE);
        self.rect(l.plot_right() + 1.0, 10.0, 1.0, l.height - 29.0, Rgba::WHITE);
    }

    fn series(&mut self, entry: &SeriesEntry, points: Vec<Point>, fill: bool) {
        let color = entry.color();
        if fill {
            let l = self.layout;
            let mut area = points.clone();
            area.push(Point::new(l.plot_right(), l.axis_y()));
            area.push(Point::new(l.left_margin, l.axis_y()));
            self.commands.push(DrawCommand::Area {
                points: area,
                color: color.alpha(FILL_ALPHA),
            });
        }
        self.commands.push(DrawCommand::Polyline {
            points,
            width: LINE_WIDTH,
            color: color.opaque(),
        });
    }

    /// Min/max callouts in the left margin and the legend on the right.
    fn labels(
        &mut self,
        entries: &[SeriesEntry],
        locals: &[Bounds],
        scale: f64,
        metrics: &dyn TextMetrics,
    ) {
        let l = self.layout;
        let count = entries.len() as f32;
        let legend_x = l.plot_right() + 10.0;

        for (i, (entry, bounds)) in entries.iter().zip(locals).enumerate() {
            let row = i as f32;
            let color = entry.color().opaque();
            let icon = entry.icon();

            self.text(
                icon.format(bounds.max * scale, Some(EXTREME_PRECISION)),
                2.0,
                l.top_margin + (row + 0.5) * LABEL_ROW + 2.0,
                LABEL_FONT_SIZE,
                color,
            );
            self.text(
                icon.format(bounds.min * scale, Some(EXTREME_PRECISION)),
                2.0,
                l.height - l.bottom_margin + (row + 0.5 - count) * LABEL_ROW + 12.0,
                LABEL_FONT_SIZE,
                color,
            );

            self.text(
                entry.code().as_str(),
                legend_x,
                l.top_margin + row * LEGEND_ROW + 14.0,
                LABEL_FONT_SIZE,
                color,
            );
            if let Some(now) = entry.history().latest() {
                self.text(
                    icon.format(now * scale, Some(CURRENT_PRECISION)),
                    legend_x + 2.0,
                    l.top_margin + (row + 0.5) * LEGEND_ROW + 14.0,
                    LABEL_FONT_SIZE,
                    color,
                );
            }
        }

        let max_y = l.top_margin - 8.0;
        self.text("Max", 2.0, max_y, LABEL_FONT_SIZE, Rgba::WHITE);
        let w = metrics.text_width("Max", LABEL_FONT_SIZE);
        self.rect(2.0, max_y + 1.0, w, 2.0, Rgba::WHITE);

        let min_y = l.height - l.bottom_margin - count * LABEL_ROW + 2.0;
        self.text("Min", 2.0, min_y, LABEL_FONT_SIZE, Rgba::WHITE);
        let w = metrics.text_width("Min", LABEL_FONT_SIZE);
        self.rect(2.0, min_y + 1.0, w, 2.0, Rgba::WHITE);

        let legend_y = l.top_margin - 5.0;
        self.text("Legend", legend_x, legend_y, LEGEND_HEADER_FONT_SIZE, Rgba::WHITE);
        let w = metrics.text_width("Legend", LEGEND_HEADER_FONT_SIZE);
        self.rect(legend_x, legend_y + 1.0, w, 2.0, Rgba::WHITE);
    }
}
