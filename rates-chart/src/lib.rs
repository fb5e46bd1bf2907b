//! # Rates Chart
//!
//! Renders one or more currency histories as a line chart PNG.
//!
//! ## Architecture
//!
//! - `series` - Series entries handed in by the caller
//! - `layout` - Bounds, margins and value-to-pixel mapping (pure)
//! - `scene` - Drawing commands derived from the layout (pure)
//! - `raster` - `tiny-skia` backend turning commands into PNG bytes
//!
//! [`ChartRenderer`] ties them together and writes the image to disk.

pub mod error;
pub mod layout;
pub mod metrics;
pub mod palette;
pub mod raster;
pub mod scene;
pub mod series;

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

pub use error::ChartError;
pub use layout::{Bounds, Layout, Point};
pub use metrics::{ApproxMetrics, TextMetrics};
pub use palette::{PALETTE, PaletteColor, Rgba};
pub use raster::Rasterizer;
pub use scene::{DrawCommand, RenderOptions, Scene};
pub use series::SeriesEntry;

/// Renders series into PNG files inside an output directory.
pub struct ChartRenderer {
    output_dir: PathBuf,
    options: RenderOptions,
    rasterizer: Rasterizer,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, rasterizer: Rasterizer) -> Self {
        Self {
            output_dir: output_dir.into(),
            options: RenderOptions::default(),
            rasterizer,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lays out `entries` without drawing anything.
    pub fn scene(&self, entries: &[SeriesEntry]) -> Result<Scene, ChartError> {
        Scene::build(entries, &self.options, &self.rasterizer)
    }

    /// Renders `entries` to PNG bytes.
    pub fn render_png(&self, entries: &[SeriesEntry]) -> Result<Vec<u8>, ChartError> {
        let scene = self.scene(entries)?;
        debug!("Rasterizing {} drawing commands", scene.commands.len());
        self.rasterizer
            .rasterize(self.options.width, self.options.height, &scene.commands)
    }

    /// Renders `entries` to `{output_dir}/{name}.png` and returns that path.
    ///
    /// The image is written to a temporary sibling first and renamed into
    /// place, so the returned path never holds a partial file.
    #[instrument(skip(self, entries), fields(series = entries.len()))]
    pub async fn render(&self, entries: &[SeriesEntry], name: &str) -> Result<PathBuf, ChartError> {
        let png = self.render_png(entries)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(format!("{name}.png"));
        let staging = self.output_dir.join(format!("{name}.png.tmp"));

        if let Err(e) = tokio::fs::write(&staging, &png).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        info!("Wrote chart {} ({} bytes)", path.display(), png.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rates_types::{CurrencyCode, History, HistoryNode};

    fn entry(code: &str, values: &[f64], index: usize) -> SeriesEntry {
        let history = History::new(values.iter().map(|v| HistoryNode::Leaf(*v)).collect());
        SeriesEntry::new(CurrencyCode::new(code), history, index).unwrap()
    }

    #[tokio::test]
    async fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("graph"), Rasterizer::without_text());

        let path = renderer
            .render(&[entry("EUR", &[1.10, 1.12, 1.08, 1.00, 0.95], 0)], "eur-usd")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("graph").join("eur-usd.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert!(!dir.path().join("graph").join("eur-usd.png.tmp").exists());
    }

    #[tokio::test]
    async fn test_render_overwrites_previous_image() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), Rasterizer::without_text());
        let entries = [entry("SEK", &[0.09, 0.091, 0.092, 0.093, 0.094], 0)];

        let first = renderer.render(&entries, "sek-eur").await.unwrap();
        let second = renderer.render(&entries, "sek-eur").await.unwrap();

        assert_eq!(first, second);
        assert!(second.exists());
    }

    #[tokio::test]
    async fn test_render_without_entries_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("graph"), Rasterizer::without_text());

        let result = renderer.render(&[], "empty").await;

        assert!(matches!(result, Err(ChartError::NoEntries)));
        assert!(!dir.path().join("graph").exists());
    }

    #[test]
    fn test_flat_history_renders() {
        let renderer = ChartRenderer::new("unused", Rasterizer::without_text());
        let png = renderer
            .render_png(&[entry("EUR", &[1.0, 1.0, 1.0, 1.0, 1.0], 0)])
            .unwrap();
        assert!(!png.is_empty());
    }
}
