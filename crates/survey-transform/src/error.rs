//! Error types for dataset assembly.

use thiserror::Error;

/// Errors that can occur while building the typed dataset.
///
/// Indexing, naming and flattening never fail; only frame construction
/// can, and only for reasons inside Polars.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Polars rejected a column or frame.
    #[error("failed to build column {column}: {source}")]
    Column {
        column: String,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("failed to build dataset frame: {0}")]
    Frame(#[from] polars::error::PolarsError),

    /// Row width does not match the column layout.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, TransformError>;
