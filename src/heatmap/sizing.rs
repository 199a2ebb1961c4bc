//! Adaptive figure sizing
//!
//! Figures grow linearly with the matrix so that cell annotations stay
//! legible, and are capped so the image stays viewable:
//!
//! ```text
//! width  = min(base_width  + n_cols * scale, max_width)
//! height = min(base_height + n_rows * scale, max_height)
//! ```
//!
//! With the defaults a 5×5 matrix gives 9.5 × 7.5 inches; width hits the
//! 20 inch cap at 40 elements.

use crate::data::Matrix;

/// Which matrix dimension drives which figure dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizingAxes {
    /// `(n_cols, n_rows) = matrix.shape()`: width follows the first shape
    /// component (rows), height the second (columns)
    #[default]
    Shape,
    /// Width follows the column count, height the row count
    Semantic,
}

impl SizingAxes {
    /// Parse from string value
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "semantic" => Self::Semantic,
            _ => Self::Shape,
        }
    }
}

/// Sizing policy; figure dimensions are in inches
#[derive(Debug, Clone, PartialEq)]
pub struct SizingConfig {
    pub base_width: f64,
    pub base_height: f64,
    /// Inches added per matrix element along each axis
    pub scale: f64,
    pub max_width: f64,
    pub max_height: f64,
    pub dpi: u32,
    pub axes: SizingAxes,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            base_width: 8.0,
            base_height: 6.0,
            scale: 0.3,
            max_width: 20.0,
            max_height: 16.0,
            dpi: 100,
            axes: SizingAxes::Shape,
        }
    }
}

/// Figure size in inches at a given resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
}

impl FigureSize {
    /// Pixel dimensions `(width, height)`, at least 1×1
    pub fn pixels(&self) -> (u32, u32) {
        let to_px = |inches: f64| ((inches * self.dpi as f64).round() as u32).max(1);
        (to_px(self.width), to_px(self.height))
    }
}

impl SizingConfig {
    /// Size for a matrix
    pub fn figure_size(&self, matrix: &Matrix) -> FigureSize {
        let (n_cols, n_rows) = match self.axes {
            SizingAxes::Shape => matrix.shape(),
            SizingAxes::Semantic => (matrix.n_cols(), matrix.n_rows()),
        };
        self.figure_size_for(n_cols, n_rows)
    }

    /// Size for `n_cols` elements across and `n_rows` elements down
    pub fn figure_size_for(&self, n_cols: usize, n_rows: usize) -> FigureSize {
        let width = self.base_width + n_cols as f64 * self.scale;
        let height = self.base_height + n_rows as f64 * self.scale;

        FigureSize {
            width: width.min(self.max_width),
            height: height.min(self.max_height),
            dpi: self.dpi,
        }
    }
}
