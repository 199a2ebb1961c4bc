//! Dataset → correlation → heatmap pipeline
//!
//! The pipeline:
//! 1. Loads the dataset (optionally naming/selecting columns)
//! 2. Computes the correlation matrix of its numeric columns
//! 3. Renders the heatmap, saving and displaying it

use crate::config::HeatmapConfig;
use crate::data::{calculate_correlation, get_dataset, DatasetSource};
use crate::error::Result;
use crate::heatmap::{fonts, HeatmapRenderer, RenderOutcome, RenderRequest, Viewer};
use std::path::PathBuf;

/// Default output file of the end-to-end run
pub const DEFAULT_OUTPUT: &str = "corr_mat.png";

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source: DatasetSource,
    /// None or empty = don't save
    pub output: Option<PathBuf>,
    pub config: HeatmapConfig,
}

impl PipelineOptions {
    pub fn new(source: DatasetSource) -> Self {
        Self {
            source,
            output: Some(PathBuf::from(DEFAULT_OUTPUT)),
            config: HeatmapConfig::default(),
        }
    }
}

/// Prepare the correlation request without rendering it
pub fn build_request(options: &PipelineOptions) -> Result<RenderRequest> {
    log::info!("[1/3] Loading dataset '{}'...", options.source.path);
    let frame = get_dataset(&options.source)?;
    log::info!("  {} rows × {} columns", frame.height(), frame.width());

    log::info!(
        "[2/3] Computing {} correlation...",
        options.config.correlation_method
    );
    let matrix = calculate_correlation(&frame, options.config.correlation_method)?;
    log::info!("  {}×{} matrix", matrix.n_rows(), matrix.n_cols());

    Ok(RenderRequest {
        matrix,
        output: options.output.clone(),
    })
}

/// Run the whole pipeline
pub fn run(options: &PipelineOptions, viewer: &dyn Viewer) -> Result<RenderOutcome> {
    let request = build_request(options)?;
    let renderer = HeatmapRenderer::new(options.config.clone())?;

    log::info!("[3/3] Rendering heatmap...");
    let outcome = renderer.render(&request, viewer)?;
    let (width, height) = outcome.surface.dimensions();
    log::info!("  Rendered {}×{} pixels", width, height);
    match fonts::registered_font() {
        Some(font) => log::debug!("  Text font: {}", font.display()),
        None => log::debug!("  No text font, labels omitted"),
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CorrelationMethod;
    use crate::heatmap::HeadlessViewer;
    use std::io::Write;

    fn iris_like() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "sepal_length,sepal_width,petal_length,species").unwrap();
        for (sl, sw, pl, sp) in [
            (5.1, 3.5, 1.4, "setosa"),
            (4.9, 3.0, 1.4, "setosa"),
            (7.0, 3.2, 4.7, "versicolor"),
            (6.4, 3.2, 4.5, "versicolor"),
            (6.3, 3.3, 6.0, "virginica"),
            (5.8, 2.7, 5.1, "virginica"),
        ] {
            writeln!(file, "{},{},{},{}", sl, sw, pl, sp).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_output_name() {
        let options = PipelineOptions::new(DatasetSource::new("data.csv"));
        assert_eq!(options.output, Some(PathBuf::from("corr_mat.png")));
    }

    #[test]
    fn test_build_request_skips_text_columns() {
        let file = iris_like();
        let mut options =
            PipelineOptions::new(DatasetSource::new(file.path().to_string_lossy()));
        options.config.correlation_method = CorrelationMethod::Spearman;

        let request = build_request(&options).unwrap();
        assert_eq!(request.matrix.shape(), (3, 3));
        assert_eq!(
            request.matrix.col_labels(),
            &["sepal_length", "sepal_width", "petal_length"]
        );
    }

    #[test]
    fn test_run_writes_output() {
        let file = iris_like();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("corr.png");

        let mut options =
            PipelineOptions::new(DatasetSource::new(file.path().to_string_lossy()));
        options.output = Some(output.clone());

        let outcome = run(&options, &HeadlessViewer).unwrap();
        assert_eq!(outcome.saved_to.as_deref(), Some(output.as_path()));
        assert!(output.is_file());
    }
}
