//! Dataset assembly.
//!
//! Merges flattened rows into a typed Polars [`DataFrame`] and collects the
//! column metadata statistical formats need: display labels, value labels
//! and measurement levels.
//!
//! Text question columns become string columns. Every other column becomes
//! an integer column, with [`MISSING_CODE`] standing in for values that are
//! missing or do not coerce.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use survey_common::{format_numeric, parse_i64, truncate_to_i64};
use survey_model::{CellValue, MISSING_CODE, MeasurementType, QuestionType, ValueLabels};

use crate::error::{Result, TransformError};
use crate::flatten::{ColumnLayout, ColumnRole, FlatRow};
use crate::index::QuestionRegistry;

/// Label of the response id column.
pub const RESPONSE_ID_LABEL: &str = "Response ID";

/// Label of the creation timestamp column.
pub const CREATED_AT_LABEL: &str = "Created At";

/// Physical storage of an exported column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnStorage {
    Integer,
    String,
}

/// Export metadata of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Question key, absent for the metadata columns.
    pub question_key: Option<String>,
    pub label: String,
    pub storage: ColumnStorage,
    pub measurement: MeasurementType,
    #[serde(default, skip_serializing_if = "ValueLabels::is_empty")]
    pub value_labels: ValueLabels,
}

/// Column metadata in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub columns: Vec<ColumnMetadata>,
}

impl DatasetMetadata {
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut ColumnMetadata> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Display label per column.
    pub fn column_labels(&self) -> BTreeMap<String, String> {
        self.columns
            .iter()
            .map(|column| (column.name.clone(), column.label.clone()))
            .collect()
    }

    /// Value labels per column, for columns that have any.
    pub fn value_labels(&self) -> BTreeMap<String, ValueLabels> {
        self.columns
            .iter()
            .filter(|column| !column.value_labels.is_empty())
            .map(|column| (column.name.clone(), column.value_labels.clone()))
            .collect()
    }

    /// Measurement level per column.
    pub fn measurement_types(&self) -> BTreeMap<String, MeasurementType> {
        self.columns
            .iter()
            .map(|column| (column.name.clone(), column.measurement))
            .collect()
    }

    /// Names of string-typed columns, in column order.
    pub fn string_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.storage == ColumnStorage::String)
            .map(|column| column.name.as_str())
    }
}

/// Typed dataset plus the metadata export collaborators consume.
#[derive(Debug, Clone)]
pub struct SurveyDataset {
    pub data: DataFrame,
    pub metadata: DatasetMetadata,
}

impl SurveyDataset {
    /// Number of rows.
    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.data.width()
    }
}

/// Build the typed dataset from flattened rows.
///
/// # Errors
///
/// Returns an error if a row does not match the layout width or Polars
/// rejects a column.
pub fn assemble_dataset(
    rows: &[FlatRow],
    layout: &ColumnLayout,
    registry: &QuestionRegistry,
) -> Result<SurveyDataset> {
    let span = info_span!("assemble", rows = rows.len(), columns = layout.width());
    let _guard = span.enter();

    for (idx, row) in rows.iter().enumerate() {
        if row.len() != layout.width() {
            return Err(TransformError::RowWidth {
                row: idx,
                expected: layout.width(),
                actual: row.len(),
            });
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(layout.width());
    let mut metadata = DatasetMetadata::default();
    for (position, spec) in layout.columns().iter().enumerate() {
        let cells = rows.iter().map(|row| &row.cells()[position]);
        let (column, column_metadata) = match &spec.role {
            ColumnRole::ResponseId => (
                integer_column(&spec.name, cells.map(coerce_integer)),
                ColumnMetadata {
                    name: spec.name.clone(),
                    question_key: None,
                    label: RESPONSE_ID_LABEL.to_string(),
                    storage: ColumnStorage::Integer,
                    measurement: MeasurementType::Nominal,
                    value_labels: ValueLabels::new(),
                },
            ),
            ColumnRole::CreatedAt => (
                integer_column(&spec.name, cells.map(coerce_timestamp)),
                ColumnMetadata {
                    name: spec.name.clone(),
                    question_key: None,
                    label: CREATED_AT_LABEL.to_string(),
                    storage: ColumnStorage::Integer,
                    measurement: MeasurementType::Nominal,
                    value_labels: ValueLabels::new(),
                },
            ),
            ColumnRole::Question { key, question_type } => {
                let question = registry.question(key);
                let (column, storage) = if question_type.is_text() {
                    (
                        string_column(&spec.name, cells.map(coerce_string)),
                        ColumnStorage::String,
                    )
                } else {
                    (
                        integer_column(&spec.name, cells.map(coerce_integer)),
                        ColumnStorage::Integer,
                    )
                };
                let measurement = match question_type {
                    QuestionType::Number => MeasurementType::Scale,
                    QuestionType::Text | QuestionType::Matrix | QuestionType::Radiogroup => {
                        MeasurementType::Nominal
                    }
                };
                (
                    column,
                    ColumnMetadata {
                        name: spec.name.clone(),
                        question_key: Some(key.clone()),
                        label: question.map(|q| q.text.clone()).unwrap_or_default(),
                        storage,
                        measurement,
                        value_labels: registry.value_labels(key).cloned().unwrap_or_default(),
                    },
                )
            }
        };
        columns.push(column);
        metadata.columns.push(column_metadata);
    }

    let data = DataFrame::new(columns)?;
    info!(
        rows = data.height(),
        columns = data.width(),
        string_columns = metadata.string_columns().count(),
        "dataset assembled"
    );
    Ok(SurveyDataset { data, metadata })
}

pub(crate) fn integer_column(name: &str, values: impl Iterator<Item = Option<i64>>) -> Column {
    let values: Vec<i64> = values.map(|value| value.unwrap_or(MISSING_CODE)).collect();
    Series::new(name.into(), values).into_column()
}

fn string_column(name: &str, values: impl Iterator<Item = String>) -> Column {
    let values: Vec<String> = values.collect();
    Series::new(name.into(), values).into_column()
}

fn coerce_integer(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Number(value) => truncate_to_i64(*value),
        CellValue::Text(text) => parse_i64(text),
        CellValue::Missing => None,
    }
}

fn coerce_string(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(text) => text.clone(),
        // A number answer may target a text element through element_to_key.
        CellValue::Number(value) => format_numeric(*value),
        CellValue::Missing => String::new(),
    }
}

fn coerce_timestamp(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Text(text) => parse_timestamp(text),
        CellValue::Number(value) => truncate_to_i64(*value),
        CellValue::Missing => None,
    }
}

/// Unix epoch seconds of an ISO 8601 timestamp.
///
/// Timestamps without an offset are read as UTC. A bare date counts as
/// midnight.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamps() {
        assert_eq!(parse_timestamp("1970-01-01T00:01:00Z"), Some(60));
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00"), Some(0));
    }

    #[test]
    fn parses_naive_timestamps_as_utc() {
        assert_eq!(parse_timestamp("1970-01-02T00:00:00"), Some(86_400));
        assert_eq!(parse_timestamp("1970-01-01 00:00:10.250"), Some(10));
        assert_eq!(parse_timestamp("1970-01-03"), Some(172_800));
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn integer_coercion_truncates_and_parses() {
        assert_eq!(coerce_integer(&CellValue::Number(3.9)), Some(3));
        assert_eq!(coerce_integer(&CellValue::from(" 12 ")), Some(12));
        assert_eq!(coerce_integer(&CellValue::from("n/a")), None);
        assert_eq!(coerce_integer(&CellValue::Number(f64::NAN)), None);
        assert_eq!(coerce_integer(&CellValue::Missing), None);
    }

    #[test]
    fn string_coercion_renders_numbers() {
        assert_eq!(coerce_string(&CellValue::Number(4.0)), "4");
        assert_eq!(coerce_string(&CellValue::Missing), "");
        assert_eq!(coerce_string(&CellValue::from("ok")), "ok");
    }
}
