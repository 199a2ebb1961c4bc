//! Dataset loading, correlation, and the matrix type they produce

pub mod correlation;
pub mod dataset;
pub mod matrix;

pub use correlation::{calculate_correlation, CorrelationMethod};
pub use dataset::{get_dataset, DatasetSource};
pub use matrix::Matrix;
