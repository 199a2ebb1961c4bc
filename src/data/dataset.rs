//! CSV dataset loading
//!
//! Reads a delimited file, or the body of an `http(s)://` URL, into a polars
//! DataFrame and optionally names or selects columns:
//! - with a header row, `columns` selects (and orders) columns by name
//! - without a header row, `columns` names the file's columns positionally

use crate::error::{HeatmapError, Result};
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;

/// Where and how to read a dataset
#[derive(Debug, Clone)]
pub struct DatasetSource {
    pub path: String,
    pub columns: Vec<String>,
    pub has_header: bool,
}

impl DatasetSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            columns: Vec::new(),
            has_header: true,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}

/// Load a dataset described by `source`
pub fn get_dataset(source: &DatasetSource) -> Result<DataFrame> {
    let mut frame = if is_remote(&source.path) {
        read_remote(source)?
    } else {
        read_file(source)?
    };

    log::debug!(
        "Read '{}': {} rows × {} columns",
        source.path,
        frame.height(),
        frame.width()
    );

    if source.columns.is_empty() {
        return Ok(frame);
    }

    if source.has_header {
        select_columns(&frame, &source.columns)
    } else {
        name_columns(&mut frame, &source.columns)?;
        Ok(frame)
    }
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

fn csv_options(source: &DatasetSource) -> CsvReadOptions {
    CsvReadOptions::default().with_has_header(source.has_header)
}

fn read_file(source: &DatasetSource) -> Result<DataFrame> {
    let path = Path::new(&source.path);
    if !path.is_file() {
        return Err(HeatmapError::Dataset(format!(
            "'{}' is not a readable file",
            source.path
        )));
    }

    Ok(csv_options(source)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?)
}

fn read_remote(source: &DatasetSource) -> Result<DataFrame> {
    log::info!("Fetching '{}'", source.path);
    let body = fetch(&source.path)?;
    log::debug!("Fetched {} bytes", body.len());

    Ok(csv_options(source)
        .into_reader_with_file_handle(Cursor::new(body))
        .finish()?)
}

/// Download the body of `url`
fn fetch(url: &str) -> Result<Vec<u8>> {
    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => {
            return Err(HeatmapError::Dataset(format!(
                "'{}' returned HTTP {}",
                url, code
            )))
        }
        Err(e) => {
            return Err(HeatmapError::Dataset(format!(
                "could not fetch '{}': {}",
                url, e
            )))
        }
    };

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| HeatmapError::Dataset(format!("could not read '{}': {}", url, e)))?;
    Ok(body)
}

/// Select `columns` in the given order
pub fn select_columns(frame: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let available: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    if let Some(missing) = columns.iter().find(|c| !available.contains(c)) {
        return Err(HeatmapError::ColumnNotFound(missing.clone()));
    }

    Ok(frame.select(columns.iter().map(|c| c.as_str()))?)
}

/// Rename the frame's columns positionally
fn name_columns(frame: &mut DataFrame, names: &[String]) -> Result<()> {
    if frame.width() != names.len() {
        return Err(HeatmapError::ShapeMismatch(format!(
            "{} column names for a file with {} columns",
            names.len(),
            frame.width()
        )));
    }

    let current: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for (old, new) in current.iter().zip(names) {
        frame.rename(old, new.as_str().into())?;
    }
    Ok(())
}
