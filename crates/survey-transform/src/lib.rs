//! Survey response flattening crate.
//!
//! Turns a survey schema and its raw responses into one typed row per
//! response, ready for statistical export.
//!
//! # Overview
//!
//! - **Indexing**: [`index_schema`] builds the question registry and the
//!   three lookup indices answers resolve through.
//! - **Naming**: [`sanitize_names`] assigns unique, export-safe variable names.
//! - **Flattening**: [`flatten_responses`] seeds defaults and applies answers.
//! - **Assembly**: [`assemble_dataset`] builds a Polars frame with labels,
//!   value labels and measurement levels.
//! - **Export**: [`export_with_fallback`] retries a rejected export with
//!   string columns recoded to integer codes.
//!
//! # Example
//!
//! ```ignore
//! use survey_transform::{build_dataset, export_with_fallback};
//!
//! let build = build_dataset(&schema, &responses, &ProcessingOptions::default())?;
//! let outcome = export_with_fallback(&build.dataset, &exporter)?;
//! ```

mod assemble;
mod error;
mod export;
mod flatten;
mod index;
mod naming;
mod pipeline;
mod recode;

pub use error::{Result, TransformError};

// Indexing
pub use index::{LookupIndex, QuestionRegistry, SYNTHESIZED_TEXT_PREFIX, index_schema};

// Naming
pub use naming::{
    CREATED_AT_COLUMN, MAX_NAME_LEN, NameOrigin, RESPONSE_ID_COLUMN, SUFFIX_BASE_LEN,
    VariableNames, is_uuid_shaped, is_valid_name, sanitize_names,
};

// Flattening
pub use flatten::{
    ColumnLayout, ColumnRole, ColumnSpec, FlatRow, FlattenOutput, FlattenStats, flatten_response,
    flatten_responses, lookup_index,
};

// Assembly
pub use assemble::{
    CREATED_AT_LABEL, ColumnMetadata, ColumnStorage, DatasetMetadata, RESPONSE_ID_LABEL,
    SurveyDataset, assemble_dataset, parse_timestamp,
};

// Recoding and export
pub use export::{DatasetExporter, ExportOutcome, ExportReport, export_with_fallback};
pub use recode::{RecodedDataset, TextCodebook, recode_text_columns};

// Pipeline
pub use pipeline::{SurveyBuild, build_dataset};
