//! Correlation heatmap library
//!
//! Loads tabular data, computes correlation matrices and renders them as
//! annotated heatmaps.
//!
//! Module organization:
//! - `data`: CSV loading, the `Matrix` type, correlation coefficients
//! - `heatmap`: sizing, drawing, saving and displaying heatmaps
//! - `config` / `properties`: settings with defaults from heatmap_properties.json
//! - `palettes`: embedded color palettes
//! - `pipeline`: the end-to-end run used by the binary

pub mod config;
pub mod data;
pub mod error;
pub mod heatmap;
pub mod palettes;
pub mod pipeline;
pub mod properties;

pub use config::HeatmapConfig;
pub use data::{calculate_correlation, get_dataset, CorrelationMethod, DatasetSource, Matrix};
pub use error::{HeatmapError, Result};
pub use heatmap::{
    draw_heatmap, render_or_log, DrawingSurface, FigureSize, HeatmapRenderer, RenderOutcome,
    RenderRequest,
};
