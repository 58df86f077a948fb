//! Output generation for survey datasets.
//!
//! - [`write_csv`]: plain tabular export, always accepted.
//! - [`write_metadata_json`]: questions, variable names, labels and levels.
//! - [`SpssSyntaxExporter`]: SPSS data and syntax files, used through
//!   [`survey_transform::export_with_fallback`].

pub mod common;
mod csv_writer;
mod error;
mod metadata;
mod spss;

pub use common::{OutputPaths, ensure_parent_dir, normalize_survey_id};
pub use csv_writer::write_csv;
pub use error::{ExportError, Result};
pub use metadata::{QuestionEntry, SurveyMetadataDocument, write_metadata_json};
pub use spss::SpssSyntaxExporter;
