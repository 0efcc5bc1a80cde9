//! Error types for the VTM library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VtmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Tsv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid filter value {value:?}: expected a non-negative number, '-' or '?'")]
    InvalidFilterValue { value: String },

    #[error("Threshold validation error: {field} must be a finite positive number, got {value}")]
    ThresholdValidation { field: String, value: f64 },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Source {source_name} ended after {actual} positions on contig {contig}, expected {expected}")]
    ShortSource {
        source_name: String,
        contig: String,
        expected: usize,
        actual: usize,
    },

    #[error("Empty group: {0}")]
    EmptyGroup(String),
}

pub type Result<T> = std::result::Result<T, VtmError>;

impl VtmError {
    pub fn short_source(
        source_name: impl Into<String>,
        contig: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        VtmError::ShortSource {
            source_name: source_name.into(),
            contig: contig.into(),
            expected,
            actual,
        }
    }

    /// Input-shape errors abort the whole contig computation.
    pub fn is_input_shape(&self) -> bool {
        matches!(
            self,
            VtmError::ShortSource { .. }
                | VtmError::EmptyGroup(_)
                | VtmError::DimensionMismatch { .. }
        )
    }
}
