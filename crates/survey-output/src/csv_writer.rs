//! Plain CSV output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use polars::prelude::{CsvWriter, SerWriter};
use tracing::info;

use survey_transform::SurveyDataset;

use crate::common::ensure_parent_dir;
use crate::error::{ExportError, Result};

/// Write the dataset as comma-separated values with a header row.
///
/// Missing numeric values appear as `-999`, missing text as an empty field.
pub fn write_csv(path: &Path, dataset: &SurveyDataset) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|source| ExportError::io(path, source))?;
    let mut writer = BufWriter::new(file);
    let mut data = dataset.data.clone();
    CsvWriter::new(&mut writer)
        .include_header(true)
        .finish(&mut data)
        .map_err(|source| ExportError::Polars {
            path: path.to_path_buf(),
            source,
        })?;
    writer
        .flush()
        .map_err(|source| ExportError::io(path, source))?;
    info!(path = %path.display(), rows = data.height(), "wrote CSV");
    Ok(())
}
