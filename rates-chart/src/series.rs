//! Series handed to the renderer.

use currency_symbols::{CurrencyIcon, icon_for};
use rates_types::{CurrencyCode, History};

use crate::error::ChartError;
use crate::palette::{self, PALETTE, PaletteColor};

/// One currency's history, formatter and palette slot for a single render.
#[derive(Debug, Clone)]
pub struct SeriesEntry {
    code: CurrencyCode,
    icon: CurrencyIcon,
    history: History,
    color_index: usize,
    color: PaletteColor,
}

impl SeriesEntry {
    /// Creates an entry, rejecting palette slots that do not exist.
    pub fn new(
        code: CurrencyCode,
        history: History,
        color_index: usize,
    ) -> Result<Self, ChartError> {
        let color = palette::color(color_index).ok_or(ChartError::PaletteExceeded {
            index: color_index,
            max: PALETTE.len(),
        })?;
        let icon = icon_for(code.as_str());

        Ok(Self {
            code,
            icon,
            history,
            color_index,
            color,
        })
    }

    /// Replaces the formatter derived from the code.
    pub fn with_icon(mut self, icon: CurrencyIcon) -> Self {
        self.icon = icon;
        self
    }

    pub fn code(&self) -> &CurrencyCode {
        &self.code
    }

    pub fn icon(&self) -> &CurrencyIcon {
        &self.icon
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn color(&self) -> PaletteColor {
        self.color
    }
}
