//! Chart error types.

/// Failures while laying out or rasterizing a chart.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("No series to render")]
    NoEntries,

    #[error("Color index {index} exceeds palette of {max} colors")]
    PaletteExceeded { index: usize, max: usize },

    #[error("Too many series: {count} (palette has {max} colors)")]
    TooManySeries { count: usize, max: usize },

    #[error("Color index {0} is used by more than one series")]
    DuplicateColor(usize),

    #[error("Series {code} has {got} checkpoints, expected {expected}")]
    ShapeMismatch {
        code: String,
        expected: usize,
        got: usize,
    },

    #[error("Font error: {0}")]
    Font(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
