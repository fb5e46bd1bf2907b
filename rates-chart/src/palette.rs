//! Fixed series palette.
//!
//! The first six colors of the Tableau 10 palette, assigned to series in order.

/// An RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from a `0.0..=1.0` alpha.
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self::new(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// A palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Alpha of the area fill under a single series.
pub const FILL_ALPHA: f32 = 0.4;

impl PaletteColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn opaque(&self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, 255)
    }

    pub fn alpha(&self, alpha: f32) -> Rgba {
        Rgba::with_alpha(self.r, self.g, self.b, alpha)
    }
}

pub const PALETTE: [PaletteColor; 6] = [
    PaletteColor::rgb(78, 121, 167),
    PaletteColor::rgb(242, 142, 43),
    PaletteColor::rgb(225, 87, 89),
    PaletteColor::rgb(118, 183, 178),
    PaletteColor::rgb(89, 161, 79),
    PaletteColor::rgb(237, 201, 72),
];

/// Palette color for `index`, or `None` past the end of the palette.
pub fn color(index: usize) -> Option<PaletteColor> {
    PALETTE.get(index).copied()
}
