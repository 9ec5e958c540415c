//! Error types for loading and filtering rental tables

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors raised by the loader and the range parameters.
///
/// Aggregation and summarization never fail on well-formed records; an empty
/// filter window is reported as a [`crate::dashboard::PipelineWarning`] instead.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Malformed or inverted date bounds
    #[error("Invalid date range: {message}")]
    InvalidRange { message: String },

    /// A date cell that does not parse as `YYYY-MM-DD`
    #[error("Invalid date '{value}' in column '{column}' at row {row}")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    /// A null cell in a required column
    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    /// A value that does not fit the record field (e.g. a negative count)
    #[error("Value {value} in column '{column}' at row {row} is out of range")]
    OutOfRange {
        column: String,
        row: usize,
        value: i64,
    },

    /// CSV reading or column extraction failed
    #[error("Failed to load table: {0}")]
    Load(#[from] polars::prelude::PolarsError),
}

impl DashboardError {
    pub fn invalid_range<S: Into<String>>(message: S) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DashboardError::invalid_range("start is after end");
        assert_eq!(err.to_string(), "Invalid date range: start is after end");

        let err = DashboardError::InvalidDate {
            column: "dteday".to_string(),
            row: 3,
            value: "2011-13-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date '2011-13-01' in column 'dteday' at row 3"
        );
    }
}
