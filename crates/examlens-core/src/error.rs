//! Error types for metric computation and dataset loading.
//!
//! Degenerate inputs surface as explicit variants here instead of leaking
//! NaN or infinity out of the arithmetic.

use thiserror::Error;

use crate::parser::ValidationIssue;

/// Errors that can occur when deriving metrics from a dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// The sequence the metric reads from is empty.
    #[error("no data available")]
    NoDataAvailable,

    /// Too few points to fit a trend line.
    #[error("insufficient history: need at least {required} entries, found {found}")]
    InsufficientHistory { found: usize, required: usize },

    /// The test has no attempted questions, so accuracy is undefined.
    #[error("test '{test_id}' has no attempted questions")]
    NoAttempts { test_id: String },

    /// The test records zero minutes taken, so pacing is undefined.
    #[error("test '{test_id}' has no recorded time taken")]
    NoTimeRecorded { test_id: String },

    /// The metrics configuration is unusable.
    #[error("invalid metrics config: {0}")]
    InvalidConfig(String),
}

impl MetricsError {
    /// Returns `true` if more data would make this computation succeed.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            MetricsError::NoDataAvailable | MetricsError::InsufficientHistory { .. }
        )
    }
}

/// Errors that can occur when loading a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file extension is not one we can parse.
    #[error("unsupported dataset format: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// The dataset parsed but breaks one or more integrity rules.
    #[error("dataset {source_name} is invalid: {}", summarize(.issues))]
    Invalid {
        source_name: String,
        issues: Vec<ValidationIssue>,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
