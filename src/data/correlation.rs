//! Pairwise correlation matrices
//!
//! Missing values (nulls and NaN) are dropped pair by pair, so every
//! coefficient uses all rows where both columns have a value.

use super::matrix::{is_numeric_dtype, numeric_column_values, Matrix};
use crate::error::{HeatmapError, Result};
use polars::prelude::*;
use std::fmt;

/// Correlation coefficient used to build the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    /// Parse from string value; unknown values map to Pearson
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "spearman" => Self::Spearman,
            "kendall" => Self::Kendall,
            _ => Self::Pearson,
        }
    }

    /// Coefficient for two equally long, complete series
    fn coefficient(self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => pearson(&average_ranks(x), &average_ranks(y)),
            Self::Kendall => kendall_tau_b(x, y),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        };
        f.write_str(name)
    }
}

/// Correlation matrix over every numeric column of `frame`
///
/// Non-numeric columns are skipped with a warning. The result is square,
/// symmetric and labelled with the column names on both axes.
pub fn calculate_correlation(frame: &DataFrame, method: CorrelationMethod) -> Result<Matrix> {
    let mut names = Vec::new();
    let mut columns = Vec::new();

    for column in frame.get_columns() {
        if !is_numeric_dtype(column.dtype()) {
            log::warn!(
                "Skipping non-numeric column '{}' ({}) for correlation",
                column.name(),
                column.dtype()
            );
            continue;
        }
        names.push(column.name().to_string());
        columns.push(numeric_column_values(column)?);
    }

    if columns.is_empty() {
        return Err(HeatmapError::EmptyMatrix);
    }

    log::debug!(
        "Correlating {} columns × {} rows ({})",
        columns.len(),
        frame.height(),
        method
    );

    let matrix = correlate_columns(&columns, method);
    Matrix::with_labels(names.len(), names.len(), matrix, names.clone(), names)
}

/// Row-major `n × n` correlation values for `n` columns
pub fn correlate_columns(columns: &[Vec<f64>], method: CorrelationMethod) -> Vec<f64> {
    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];

    for i in 0..n {
        for j in i..n {
            let (x, y) = complete_pairs(&columns[i], &columns[j]);
            let r = method.coefficient(&x, &y);
            // Self-correlation is exactly 1 whenever it is defined
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    values
}

/// Keep only positions where both series have a value
fn complete_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip()
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// 1-based ranks, ties share the mean of the ranks they span
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Kendall's tau-b: (concordant - discordant) / sqrt((n0 - ties_x)(n0 - ties_y))
fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 && dy == 0.0 {
                ties_x += 1;
                ties_y += 1;
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let n0 = (n * (n - 1) / 2) as i64;
    let denom = (((n0 - ties_x) * (n0 - ties_y)) as f64).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (concordant - discordant) as f64 / denom
}
