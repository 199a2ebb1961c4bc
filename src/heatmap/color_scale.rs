//! Value → color mapping for heatmap cells

use crate::data::Matrix;
use crate::palettes::{relative_luminance, PaletteDefinition};

/// Luminance above which annotations switch from white to dark text
const DARK_TEXT_LUMINANCE: f64 = 0.408;

/// Dark annotation color for light cells
pub const DARK_TEXT: [u8; 3] = [38, 38, 38];

/// Light annotation color for dark cells
pub const LIGHT_TEXT: [u8; 3] = [255, 255, 255];

/// How the palette ends are placed on the value axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRange {
    /// Centered: the neutral midpoint sits on `center`, both ends equally far
    #[default]
    Symmetric,
    /// Palette ends at the data minimum and maximum
    Data,
}

impl ColorRange {
    /// Parse from string value
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "data" => Self::Data,
            _ => Self::Symmetric,
        }
    }
}

/// Linear mapping from `[low, high]` onto a palette
#[derive(Debug, Clone)]
pub struct ColorScale {
    palette: PaletteDefinition,
    low: f64,
    high: f64,
}

impl ColorScale {
    pub fn new(palette: PaletteDefinition, low: f64, high: f64) -> Self {
        Self { palette, low, high }
    }

    /// Fit the scale to a matrix's non-missing values
    ///
    /// An all-missing or single-valued matrix still gets a non-degenerate
    /// range of one unit around the center or the value.
    pub fn fit(palette: PaletteDefinition, matrix: &Matrix, range: ColorRange, center: f64) -> Self {
        let (low, high) = match (range, matrix.value_range()) {
            (_, None) => (center - 1.0, center + 1.0),
            (ColorRange::Symmetric, Some((lo, hi))) => {
                let half = (lo - center).abs().max((hi - center).abs());
                let half = if half > 0.0 { half } else { 1.0 };
                (center - half, center + half)
            }
            (ColorRange::Data, Some((lo, hi))) if lo < hi => (lo, hi),
            (ColorRange::Data, Some((lo, _))) => (lo - 0.5, lo + 0.5),
        };
        Self::new(palette, low, high)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Position of `value` on the palette, in [0, 1]
    pub fn position(&self, value: f64) -> f64 {
        ((value - self.low) / (self.high - self.low)).clamp(0.0, 1.0)
    }

    /// Cell color, or None for a missing value
    pub fn color(&self, value: f64) -> Option<[u8; 3]> {
        if value.is_nan() {
            return None;
        }
        Some(self.palette.interpolate(self.position(value)))
    }

    /// Color at palette position t ∈ [0, 1] (for the colorbar)
    pub fn color_at(&self, t: f64) -> [u8; 3] {
        self.palette.interpolate(t)
    }
}

/// Annotation color readable on `background`
pub fn text_color_for(background: [u8; 3]) -> [u8; 3] {
    if relative_luminance(background) > DARK_TEXT_LUMINANCE {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}
