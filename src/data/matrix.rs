//! Labelled 2D numeric table

use crate::error::{HeatmapError, Result};
use polars::prelude::*;

/// Row-major numeric matrix with display labels
///
/// `NaN` marks a missing cell (e.g. the correlation of a constant column).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<f64>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
}

impl Matrix {
    /// Build from row-major values with index labels `0..n`
    pub fn new(n_rows: usize, n_cols: usize, values: Vec<f64>) -> Result<Self> {
        let row_labels = (0..n_rows).map(|i| i.to_string()).collect();
        let col_labels = (0..n_cols).map(|i| i.to_string()).collect();
        Self::with_labels(n_rows, n_cols, values, row_labels, col_labels)
    }

    /// Build from row-major values and explicit labels
    pub fn with_labels(
        n_rows: usize,
        n_cols: usize,
        values: Vec<f64>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
    ) -> Result<Self> {
        if values.len() != n_rows * n_cols {
            return Err(HeatmapError::ShapeMismatch(format!(
                "{} values for a {}×{} matrix",
                values.len(),
                n_rows,
                n_cols
            )));
        }
        if row_labels.len() != n_rows || col_labels.len() != n_cols {
            return Err(HeatmapError::ShapeMismatch(format!(
                "{} row labels and {} column labels for a {}×{} matrix",
                row_labels.len(),
                col_labels.len(),
                n_rows,
                n_cols
            )));
        }
        Ok(Self {
            n_rows,
            n_cols,
            values,
            row_labels,
            col_labels,
        })
    }

    /// Build from a list of equally long rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(HeatmapError::ShapeMismatch(format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                n_cols
            )));
        }
        Self::new(n_rows, n_cols, rows.into_iter().flatten().collect())
    }

    /// Convert a polars frame: one matrix column per frame column, nulls become `NaN`
    ///
    /// Every column must be numeric. Row labels are the row indices.
    pub fn from_frame(frame: &DataFrame) -> Result<Self> {
        let n_rows = frame.height();
        let n_cols = frame.width();
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(n_cols);
        let mut col_labels = Vec::with_capacity(n_cols);

        for column in frame.get_columns() {
            columns.push(numeric_column_values(column)?);
            col_labels.push(column.name().to_string());
        }

        let mut values = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            values.extend(columns.iter().map(|col| col[row]));
        }

        let row_labels = (0..n_rows).map(|i| i.to_string()).collect();
        Self::with_labels(n_rows, n_cols, values, row_labels, col_labels)
    }

    /// Replace the row labels
    pub fn set_row_labels(&mut self, labels: Vec<String>) -> Result<()> {
        if labels.len() != self.n_rows {
            return Err(HeatmapError::ShapeMismatch(format!(
                "{} row labels for {} rows",
                labels.len(),
                self.n_rows
            )));
        }
        self.row_labels = labels;
        Ok(())
    }

    /// `(n_rows, n_cols)`, in the order a data frame reports its shape
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.n_cols == 0
    }

    /// Cell value, or None when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n_rows && col < self.n_cols {
            self.values.get(row * self.n_cols + col).copied()
        } else {
            None
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Minimum and maximum over non-missing cells
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Reject matrices that cannot be drawn: empty, or holding an infinite cell
    pub fn validate_for_rendering(&self) -> Result<()> {
        if self.is_empty() {
            return Err(HeatmapError::EmptyMatrix);
        }
        if let Some(idx) = self.values.iter().position(|v| v.is_infinite()) {
            return Err(HeatmapError::NonFiniteCell {
                row: idx / self.n_cols,
                col: idx % self.n_cols,
                value: self.values[idx],
            });
        }
        Ok(())
    }
}

/// True for integer and floating point polars types
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Extract a numeric column as f64, nulls become `NaN`
pub fn numeric_column_values(column: &Column) -> Result<Vec<f64>> {
    if !is_numeric_dtype(column.dtype()) {
        return Err(HeatmapError::NonNumericColumn {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let casted = column.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}
