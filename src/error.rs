use thiserror::Error;

/// Errors that can occur while loading data, correlating, or rendering a heatmap
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// Matrix has no rows or no columns
    #[error("Matrix is empty: nothing to draw")]
    EmptyMatrix,

    /// Values or labels do not match the declared shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Cell holds an infinite value that cannot be color-mapped
    #[error("Cell ({row}, {col}) is not finite: {value}")]
    NonFiniteCell { row: usize, col: usize, value: f64 },

    /// Column cannot be interpreted as numbers
    #[error("Column '{name}' is not numeric (type: {dtype})")]
    NonNumericColumn { name: String, dtype: String },

    /// Requested column does not exist in the dataset
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Polars failed to read or transform the table
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or writing the image failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Drawing backend error
    #[error("Drawing error: {0}")]
    Drawing(String),

    /// Font could not be loaded or registered
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid configuration (bad property file, bad override, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Viewer could not be launched
    #[error("Display error: {0}")]
    Display(String),
}

impl From<polars::prelude::PolarsError> for HeatmapError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        HeatmapError::Dataset(e.to_string())
    }
}

/// Type alias for Results using HeatmapError
pub type Result<T> = std::result::Result<T, HeatmapError>;
