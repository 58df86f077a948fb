//! Error types for output generation.

use std::path::PathBuf;

use thiserror::Error;

use survey_transform::TransformError;

/// Errors that can occur when writing output files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// File system failure.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Polars failed to serialize a frame.
    #[error("failed to write {path}: {source}")]
    Polars {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Delimited writer failure.
    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The format cannot carry a column as it is.
    #[error("column {column} cannot be exported: {reason}")]
    Unrepresentable { column: String, reason: String },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Result type alias for output operations.
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unrepresentable(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unrepresentable {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the dataset itself was rejected, as opposed to an I/O failure.
    pub fn is_unrepresentable(&self) -> bool {
        matches!(self, Self::Unrepresentable { .. })
    }
}
