//! Two-tier export.
//!
//! Writers implement [`DatasetExporter`]. [`export_with_fallback`] first
//! hands the dataset over as assembled; when the writer rejects it, string
//! columns are recoded to integer codes and the writer gets one more try.

use std::path::PathBuf;

use tracing::{error, info, info_span, warn};

use crate::assemble::SurveyDataset;
use crate::recode::{RecodedDataset, recode_text_columns};

/// A writer for one statistical file format.
pub trait DatasetExporter {
    type Error: std::error::Error + From<crate::error::TransformError>;

    /// Short format name used in logs.
    fn format_name(&self) -> &'static str;

    /// Write `dataset` and report the files produced.
    ///
    /// # Errors
    ///
    /// Returns an error when the dataset cannot be represented in the
    /// format or a file cannot be written.
    fn export(&self, dataset: &SurveyDataset) -> Result<ExportReport, Self::Error>;
}

/// Files written by one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
}

impl ExportReport {
    pub fn new(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

/// Result of a successful two-tier export.
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    /// The dataset was accepted as assembled.
    Primary(ExportReport),
    /// The dataset was accepted after recoding its string columns.
    Fallback {
        report: ExportReport,
        recoded: RecodedDataset,
        primary_error: String,
    },
}

impl ExportOutcome {
    pub fn report(&self) -> &ExportReport {
        match self {
            Self::Primary(report) | Self::Fallback { report, .. } => report,
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Codebook of the recoded columns, if the fallback ran.
    pub fn recoded(&self) -> Option<&RecodedDataset> {
        match self {
            Self::Primary(_) => None,
            Self::Fallback { recoded, .. } => Some(recoded),
        }
    }
}

/// Export `dataset`, falling back to recoded string columns on rejection.
///
/// The dataset itself is never modified.
///
/// # Errors
///
/// Returns the fallback attempt's error unchanged when both attempts fail,
/// or a recoding error converted into the exporter's error type.
pub fn export_with_fallback<E>(
    dataset: &SurveyDataset,
    exporter: &E,
) -> Result<ExportOutcome, E::Error>
where
    E: DatasetExporter,
{
    let span = info_span!("export", format = exporter.format_name());
    let _guard = span.enter();

    let primary_error = match exporter.export(dataset) {
        Ok(report) => {
            info!(files = report.files.len(), "export complete");
            return Ok(ExportOutcome::Primary(report));
        }
        Err(err) => err,
    };
    warn!(error = %primary_error, "export rejected dataset, recoding text columns");

    let recoded = recode_text_columns(dataset)?;
    match exporter.export(&recoded.dataset) {
        Ok(report) => {
            info!(
                files = report.files.len(),
                recoded_columns = recoded.codebook.columns().count(),
                "export complete with recoded text"
            );
            Ok(ExportOutcome::Fallback {
                report,
                recoded,
                primary_error: primary_error.to_string(),
            })
        }
        Err(err) => {
            error!(error = %err, "export failed after recoding");
            Err(err)
        }
    }
}
