//! Heatmap rendering
//!
//! Structure:
//! - `sizing.rs`: figure size from matrix dimensions
//! - `color_scale.rs`: value → palette color, annotation contrast
//! - `layout.rs`: pixel positions of grid, labels and colorbar
//! - `surface.rs`: caller-owned pixel buffer
//! - `fonts.rs`: font discovery for text
//! - `viewer.rs`: displaying the result
//! - `renderer.rs`: HeatmapRenderer and the log-and-continue wrappers

pub mod color_scale;
pub mod fonts;
pub mod layout;
pub mod renderer;
pub mod sizing;
pub mod surface;
pub mod viewer;

pub use color_scale::{ColorRange, ColorScale};
pub use renderer::{
    draw_heatmap, failure_message, render_or_log, HeatmapRenderer, RenderOutcome, RenderRequest,
};
pub use sizing::{FigureSize, SizingAxes, SizingConfig};
pub use surface::DrawingSurface;
pub use viewer::{HeadlessViewer, SystemViewer, Viewer};
