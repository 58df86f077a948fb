//! Numeric recoding of free-text columns.
//!
//! Some export formats cannot carry arbitrary strings. For those, every
//! string column is replaced by dense integer codes with value labels, and
//! the code assignment is kept in a [`TextCodebook`] so it can be audited
//! and reversed.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use survey_model::{MISSING_CODE, ValueLabels};

use crate::assemble::{ColumnStorage, SurveyDataset, integer_column};
use crate::error::{Result, TransformError};

/// Code assignment per recoded column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextCodebook {
    columns: BTreeMap<String, ValueLabels>,
}

impl TextCodebook {
    /// Original text behind a code. [`MISSING_CODE`] decodes to the empty string.
    pub fn decode(&self, column: &str, code: i64) -> Option<&str> {
        let codes = self.columns.get(column)?;
        if code == MISSING_CODE {
            return Some("");
        }
        codes.get(&code).map(String::as_str)
    }

    /// Codes assigned for one column.
    pub fn column(&self, column: &str) -> Option<&ValueLabels> {
        self.columns.get(column)
    }

    /// Recoded column names in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Dataset whose string columns were replaced by integer codes.
#[derive(Debug, Clone)]
pub struct RecodedDataset {
    pub dataset: SurveyDataset,
    pub codebook: TextCodebook,
}

/// Recode every string column of `dataset` into integer codes.
///
/// Codes start at 1 and follow first appearance in row order. Empty strings
/// map to [`MISSING_CODE`]. The code labels are merged into the column's
/// value labels and the column keeps its nominal measurement level. The
/// input dataset is left untouched.
///
/// # Errors
///
/// Returns an error if a string column cannot be read or replaced.
pub fn recode_text_columns(dataset: &SurveyDataset) -> Result<RecodedDataset> {
    let mut recoded = dataset.clone();
    let mut codebook = TextCodebook::default();
    let targets: Vec<String> = dataset
        .metadata
        .string_columns()
        .map(str::to_string)
        .collect();

    for name in targets {
        let column_error = |source| TransformError::Column {
            column: name.clone(),
            source,
        };
        let values = dataset.data.column(&name).map_err(column_error)?;
        let values = values.str().map_err(column_error)?;

        let mut codes = BTreeMap::<String, i64>::new();
        let mut labels = ValueLabels::new();
        let mut coded: Vec<Option<i64>> = Vec::with_capacity(values.len());
        for value in values {
            let text = value.unwrap_or_default();
            if text.is_empty() {
                coded.push(None);
                continue;
            }
            let next = i64::try_from(codes.len()).unwrap_or(i64::MAX - 1) + 1;
            let code = *codes.entry(text.to_string()).or_insert_with(|| {
                labels.insert(next, text.to_string());
                next
            });
            coded.push(Some(code));
        }
        debug!(column = %name, distinct = labels.len(), "recoded text column");

        recoded
            .data
            .with_column(integer_column(&name, coded.into_iter()))
            .map_err(column_error)?;
        if let Some(metadata) = recoded.metadata.column_mut(&name) {
            metadata.storage = ColumnStorage::Integer;
            metadata
                .value_labels
                .extend(labels.iter().map(|(code, text)| (*code, text.clone())));
        }
        codebook.columns.insert(name, labels);
    }

    info!(columns = codebook.columns.len(), "text columns recoded");
    Ok(RecodedDataset {
        dataset: recoded,
        codebook,
    })
}
