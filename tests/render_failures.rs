//! Log-and-continue wrappers: failures are logged, never returned or panicked

use corr_heatmap::heatmap::{fonts, HeadlessViewer};
use corr_heatmap::{
    draw_heatmap, render_or_log, DrawingSurface, HeatmapConfig, HeatmapRenderer, Matrix,
    RenderRequest,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use polars::prelude::*;
use std::sync::Mutex;

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

fn capture_logs() {
    // Every test in this binary shares the logger; only the first install wins
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Debug);
}

fn logged(at: Level, needle: &str) -> Vec<String> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, msg)| *level == at && msg.contains(needle))
        .map(|(_, msg)| msg.clone())
        .collect()
}

fn errors_containing(needle: &str) -> Vec<String> {
    logged(Level::Error, needle)
}

#[test]
fn test_non_numeric_frame_is_logged_not_raised() {
    capture_logs();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let frame = df!(
        "score" => [0.5f64, 1.0],
        "comment" => ["high", "low"]
    )
    .unwrap();

    draw_heatmap(&frame, path.to_str(), &HeadlessViewer);

    let errors = errors_containing("'comment' is not numeric");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Failed to render heatmap: "));
    assert!(!path.exists());
}

#[test]
fn test_numeric_frame_renders_through_compat_entry() {
    capture_logs();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");

    let frame = df!(
        "a" => [1.0f64, -0.2],
        "b" => [-0.2f64, 1.0]
    )
    .unwrap();

    draw_heatmap(&frame, path.to_str(), &HeadlessViewer);
    assert!(image::open(&path).is_ok());
}

#[test]
fn test_render_or_log_swallows_failures() {
    capture_logs();
    let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
    let matrix = Matrix::from_rows(vec![vec![0.0, f64::NEG_INFINITY]]).unwrap();

    render_or_log(&renderer, &RenderRequest::new(matrix), &HeadlessViewer);

    let errors = errors_containing("Cell (0, 1) is not finite");
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_unwritable_path_is_logged() {
    capture_logs();
    let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
    let matrix = Matrix::from_rows(vec![vec![1.0, 0.3], vec![0.3, 1.0]]).unwrap();
    let request = RenderRequest::new(matrix).output("/definitely/missing/dir/unwritable.png");

    render_or_log(&renderer, &request, &HeadlessViewer);

    assert_eq!(errors_containing("/definitely/missing/dir").len(), 1);
}

#[test]
fn test_skipped_annotations_are_a_warning() {
    capture_logs();
    if !fonts::ensure_font(None) {
        return; // without a font no annotation is attempted
    }
    let renderer = HeatmapRenderer::new(HeatmapConfig::default()).unwrap();
    let rows: Vec<Vec<f64>> = (0..40)
        .map(|i| (0..40).map(|j| if i == j { 1.0 } else { 0.25 }).collect())
        .collect();
    let matrix = Matrix::from_rows(rows).unwrap();

    let mut surface = DrawingSurface::new(240, 200);
    renderer.draw(&matrix, &mut surface).unwrap();

    assert!(!logged(Level::Warn, "Cells too small for annotations").is_empty());
}
