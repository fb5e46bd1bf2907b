//! Numeric chart layout: value bounds, margins and value-to-pixel mapping.
//!
//! Everything here is pure arithmetic so it can be checked without a
//! rasterization backend.

use rates_types::History;

use crate::error::ChartError;

/// Fraction of the canvas height kept free above the plot band.
pub const TOP_MARGIN_RATIO: f32 = 0.1;
/// Fraction of the canvas height kept free below the plot band.
pub const BOTTOM_MARGIN_RATIO: f32 = 0.25;
/// Minimum left margin as a fraction of the canvas width.
pub const LEFT_MARGIN_RATIO: f32 = 0.15;
/// Right margin (legend column) as a fraction of the canvas width.
pub const RIGHT_MARGIN_RATIO: f32 = 0.125;
/// Padding added to the widest min/max label when sizing the left margin.
pub const LABEL_PADDING: f32 = 10.0;
/// Distance of the x axis from the bottom edge.
pub const AXIS_OFFSET: f32 = 24.0;

/// A `(min, max)` value range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bounds over every value of a history, branch samples included.
    pub fn of(history: &History) -> Option<Self> {
        history.bounds().map(|(min, max)| Self::new(min, max))
    }

    pub fn union(self, other: Bounds) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Position of `value` inside the range, `0.0` at `min` and `1.0` at `max`.
    ///
    /// A flat range maps every value to the middle of the band.
    pub fn ratio(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return 0.5;
        }
        (value - self.min) / span
    }
}

/// A plotted point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Canvas geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub left_margin: f32,
    pub right_margin: f32,
    /// Number of equal horizontal segments between checkpoints.
    pub segments: usize,
}

impl Layout {
    /// Builds the layout; `label_width` is the widest min/max label in pixels.
    pub fn new(width: u32, height: u32, label_width: f32, segments: usize) -> Self {
        let width = width as f32;
        let height = height as f32;

        Self {
            width,
            height,
            top_margin: height * TOP_MARGIN_RATIO,
            bottom_margin: height * BOTTOM_MARGIN_RATIO,
            left_margin: (width * LEFT_MARGIN_RATIO).max(label_width + LABEL_PADDING).ceil(),
            right_margin: width * RIGHT_MARGIN_RATIO,
            segments: segments.max(1),
        }
    }

    pub fn plot_width(&self) -> f32 {
        self.width - self.left_margin - self.right_margin
    }

    pub fn segment_width(&self) -> f32 {
        self.plot_width() / self.segments as f32
    }

    /// Right edge of the plotted area.
    pub fn plot_right(&self) -> f32 {
        self.left_margin + self.segments as f32 * self.segment_width()
    }

    /// Y of the x axis, where area fills close.
    pub fn axis_y(&self) -> f32 {
        self.height - AXIS_OFFSET
    }

    /// X of the `index`-th checkpoint, oldest at 0.
    pub fn checkpoint_x(&self, index: usize) -> f32 {
        self.left_margin + index as f32 * self.segment_width()
    }

    /// X of sample `index` out of `len` interior samples of `segment`.
    pub fn band_x(&self, segment: usize, index: usize, len: usize) -> f32 {
        let step = self.segment_width() / (len + 1) as f32;
        self.checkpoint_x(segment) + (index + 1) as f32 * step
    }

    /// Maps a value to a canvas y coordinate.
    pub fn y(&self, value: f64, bounds: Bounds) -> f32 {
        let band = (self.height - self.top_margin - self.bottom_margin) as f64;
        let lifted = bounds.ratio(value) * band + self.bottom_margin as f64;
        (self.height as f64 - lifted) as f32
    }

    /// Plotted points of a history, left to right.
    ///
    /// The newest sample (index 0) is not plotted. The remaining checkpoints
    /// are reversed into chronological order and band `i` is spread evenly
    /// inside segment `i`.
    pub fn points(
        &self,
        code: &str,
        history: &History,
        bounds: Bounds,
    ) -> Result<Vec<Point>, ChartError> {
        let mut checkpoints = history.checkpoints();
        let expected = self.segments + 1;
        if checkpoints.len() != expected + 1 {
            return Err(ChartError::ShapeMismatch {
                code: code.to_string(),
                expected: expected + 1,
                got: checkpoints.len(),
            });
        }
        checkpoints.remove(0);
        checkpoints.reverse();

        let bands = history.bands();
        let mut points = Vec::with_capacity(history.values().count());
        for (i, value) in checkpoints.iter().enumerate() {
            points.push(Point::new(self.checkpoint_x(i), self.y(*value, bounds)));

            if i == self.segments {
                break;
            }
            if let Some(band) = bands.get(i) {
                for (j, value) in band.iter().enumerate() {
                    points.push(Point::new(
                        self.band_x(i, j, band.len()),
                        self.y(*value, bounds),
                    ));
                }
            }
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rates_types::HistoryNode;

    fn leaves(values: &[f64]) -> History {
        History::new(values.iter().map(|v| HistoryNode::Leaf(*v)).collect())
    }

    #[test]
    fn test_margins() {
        let layout = Layout::new(500, 300, 20.0, 3);
        assert_eq!(layout.left_margin, 75.0);
        assert_eq!(layout.right_margin, 62.5);
        assert_eq!(layout.top_margin, 30.0);
        assert_eq!(layout.bottom_margin, 75.0);

        let wide = Layout::new(500, 300, 100.4, 3);
        assert_eq!(wide.left_margin, 111.0);
    }

    #[test]
    fn test_y_mapping_spans_band() {
        let layout = Layout::new(500, 300, 0.0, 3);
        let bounds = Bounds::new(1.0, 2.0);
        assert!((layout.y(2.0, bounds) - 30.0).abs() < 1e-4);
        assert!((layout.y(1.0, bounds) - 225.0).abs() < 1e-4);
        assert!((layout.y(1.5, bounds) - 127.5).abs() < 1e-4);
    }

    #[test]
    fn test_flat_bounds_plot_mid_height() {
        let layout = Layout::new(500, 300, 0.0, 3);
        let history = leaves(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        let bounds = Bounds::of(&history).unwrap();

        let points = layout.points("EUR", &history, bounds).unwrap();

        assert_eq!(points.len(), 4);
        for p in points {
            assert!(p.y.is_finite());
            assert!((p.y - 127.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_checkpoints_are_reversed_and_evenly_spaced() {
        let layout = Layout::new(500, 300, 0.0, 3);
        let history = leaves(&[1.10, 1.12, 1.08, 1.00, 0.95]);
        let bounds = Bounds::of(&history).unwrap();

        let points = layout.points("USD", &history, bounds).unwrap();

        assert_eq!(points.len(), 4);
        let step = layout.segment_width();
        for (i, p) in points.iter().enumerate() {
            assert!((p.x - (75.0 + i as f32 * step)).abs() < 1e-4);
        }
        // oldest (0.95) is the lowest value, newest plotted (1.12) the highest
        assert!((points[0].y - layout.y(0.95, bounds)).abs() < 1e-4);
        assert!((points[3].y - layout.y(1.12, bounds)).abs() < 1e-4);
        assert!(points[3].y < points[0].y);
    }

    #[test]
    fn test_band_samples_fill_segments() {
        let layout = Layout::new(500, 300, 0.0, 3);
        let history = History::new(vec![
            HistoryNode::Leaf(1.0),
            HistoryNode::Leaf(1.0),
            HistoryNode::Leaf(1.0),
            HistoryNode::Leaf(1.0),
            HistoryNode::Leaf(1.0),
            HistoryNode::Branch(vec![2.0, 2.0, 2.0, 2.0, 2.0]),
            HistoryNode::Branch(vec![3.0, 3.0, 3.0, 3.0, 3.0]),
            HistoryNode::Branch(vec![4.0, 4.0, 4.0, 4.0, 4.0]),
        ]);
        let bounds = Bounds::of(&history).unwrap();

        let points = layout.points("SEK", &history, bounds).unwrap();

        assert_eq!(points.len(), 4 + 15);
        let xs: Vec<f32> = points.iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        // second sample of the first band sits at 2/6 of the first segment
        let expected = layout.checkpoint_x(0) + 2.0 * layout.segment_width() / 6.0;
        assert!((points[2].x - expected).abs() < 1e-4);
        assert!((points[6].x - layout.checkpoint_x(1)).abs() < 1e-4);
    }

    #[test]
    fn test_wrong_checkpoint_count_is_rejected() {
        let layout = Layout::new(500, 300, 0.0, 3);
        let history = leaves(&[1.0, 1.1]);
        let result = layout.points("EUR", &history, Bounds::new(1.0, 1.1));
        assert!(matches!(
            result,
            Err(ChartError::ShapeMismatch {
                expected: 5,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_bounds_union() {
        let a = Bounds::new(1.0, 2.0);
        let b = Bounds::new(0.5, 1.5);
        assert_eq!(a.union(b), Bounds::new(0.5, 2.0));
    }
}
