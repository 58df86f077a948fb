use std::path::PathBuf;

use survey_model::{OutputFormat, ProcessingOptions};
use survey_transform::FlattenStats;

/// Inputs of one `process` run.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub schema_path: PathBuf,
    pub responses_path: PathBuf,
    pub output_dir: PathBuf,
    /// Overrides the id found in the schema.
    pub survey_id: Option<String>,
    pub options: ProcessingOptions,
    pub dry_run: bool,
}

/// How one output format fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    Written,
    /// Written after text columns were recoded.
    Recoded { columns: Vec<String> },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct OutputSummary {
    pub format: OutputFormat,
    pub files: Vec<PathBuf>,
    pub status: OutputStatus,
}

#[derive(Debug)]
pub struct ProcessResult {
    pub survey_id: String,
    pub output_dir: PathBuf,
    pub responses: usize,
    pub questions: usize,
    pub rows: usize,
    pub columns: usize,
    pub stats: FlattenStats,
    pub outputs: Vec<OutputSummary>,
    pub errors: Vec<String>,
    pub has_errors: bool,
}
