//! SPSS output: a tab-delimited data file plus a syntax file that reads it
//! and applies labels, missing values and measurement levels.
//!
//! SPSS short strings hold at most 255 bytes and the delimited reader
//! cannot carry embedded tabs or line breaks, so datasets with such text
//! are rejected before anything is written. [`export_with_fallback`]
//! reacts to that rejection by recoding text columns.
//!
//! [`export_with_fallback`]: survey_transform::export_with_fallback

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, info};

use survey_common::any_to_string;
use survey_model::{DEFAULT_MAX_STRING_WIDTH, MISSING_CODE, MeasurementType};
use survey_transform::{
    ColumnMetadata, ColumnStorage, DatasetExporter, ExportReport, MAX_NAME_LEN, SurveyDataset,
    TransformError,
};

use crate::common::ensure_parent_dir;
use crate::error::{ExportError, Result};

/// Characters the delimited reader cannot carry inside a value.
const FORBIDDEN_CHARS: [char; 3] = ['\t', '\r', '\n'];

/// Keywords SPSS refuses as variable names.
const RESERVED_NAMES: [&str; 13] = [
    "ALL", "AND", "BY", "EQ", "GE", "GT", "LE", "LT", "NE", "NOT", "OR", "TO", "WITH",
];

/// Writes `<stem>.dat` and `<stem>.sps` into a directory.
#[derive(Debug, Clone)]
pub struct SpssSyntaxExporter {
    output_dir: PathBuf,
    stem: String,
    max_string_width: usize,
}

impl SpssSyntaxExporter {
    pub fn new(output_dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            stem: stem.into(),
            max_string_width: DEFAULT_MAX_STRING_WIDTH,
        }
    }

    /// Widest string value, in bytes, the exporter accepts.
    pub fn with_max_string_width(mut self, width: usize) -> Self {
        self.max_string_width = width;
        self
    }

    pub fn syntax_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.sps", self.stem))
    }

    pub fn data_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.dat", self.stem))
    }

    /// Check that every column can be written as is.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Unrepresentable`] for the first offending column.
    pub fn validate(&self, dataset: &SurveyDataset) -> Result<()> {
        for column in &dataset.metadata.columns {
            if let Some(reason) = name_problem(&column.name) {
                return Err(ExportError::unrepresentable(&column.name, reason));
            }
            if column.storage != ColumnStorage::String {
                continue;
            }
            let values = string_values(&dataset.data, &column.name)?;
            for (row, value) in values.iter().enumerate() {
                let Some(value) = value else {
                    continue;
                };
                if value.len() > self.max_string_width {
                    return Err(ExportError::unrepresentable(
                        &column.name,
                        format!(
                            "row {row} is {} bytes wide, limit is {}",
                            value.len(),
                            self.max_string_width
                        ),
                    ));
                }
                if value.contains(FORBIDDEN_CHARS) {
                    return Err(ExportError::unrepresentable(
                        &column.name,
                        format!("row {row} contains a tab or line break"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn write_data(&self, path: &Path, dataset: &SurveyDataset) -> Result<()> {
        let csv_error = |source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(csv_error)?;
        let names: Vec<&str> = dataset
            .metadata
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .collect();
        writer.write_record(&names).map_err(csv_error)?;

        let columns = names
            .iter()
            .map(|name| {
                dataset
                    .data
                    .column(name)
                    .map_err(|source| column_error(name, source))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut record: Vec<String> = Vec::with_capacity(columns.len());
        for row in 0..dataset.height() {
            record.clear();
            for column in &columns {
                let value = column.get(row).unwrap_or(AnyValue::Null);
                record.push(any_to_string(value));
            }
            writer.write_record(&record).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|source| ExportError::io(path, source))?;
        Ok(())
    }
}

impl DatasetExporter for SpssSyntaxExporter {
    type Error = ExportError;

    fn format_name(&self) -> &'static str {
        "spss"
    }

    fn export(&self, dataset: &SurveyDataset) -> Result<ExportReport> {
        self.validate(dataset)?;

        let data_path = self.data_path();
        let syntax_path = self.syntax_path();
        ensure_parent_dir(&data_path)?;

        self.write_data(&data_path, dataset)?;
        let formats = variable_formats(dataset)?;
        let syntax = render_syntax(dataset, &formats, &data_path);
        fs::write(&syntax_path, syntax).map_err(|source| ExportError::io(&syntax_path, source))?;

        info!(
            syntax = %syntax_path.display(),
            data = %data_path.display(),
            rows = dataset.height(),
            "wrote SPSS files"
        );
        Ok(ExportReport::new([syntax_path, data_path]))
    }
}

fn column_error(name: &str, source: polars::error::PolarsError) -> ExportError {
    TransformError::Column {
        column: name.to_string(),
        source,
    }
    .into()
}

fn string_values(data: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = data.column(name).map_err(|source| column_error(name, source))?;
    let values = column.str().map_err(|source| column_error(name, source))?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Read format of one variable in `GET DATA`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VariableFormat {
    /// `F<width>.0`
    Numeric(usize),
    /// `A<width>`
    String(usize),
}

impl VariableFormat {
    fn render(&self) -> String {
        match self {
            VariableFormat::Numeric(width) => format!("F{width}.0"),
            VariableFormat::String(width) => format!("A{width}"),
        }
    }
}

fn variable_formats(dataset: &SurveyDataset) -> Result<Vec<VariableFormat>> {
    dataset
        .metadata
        .columns
        .iter()
        .map(|column| {
            let column_data = dataset
                .data
                .column(&column.name)
                .map_err(|source| column_error(&column.name, source))?;
            let widest = (0..dataset.height())
                .map(|row| {
                    let value = column_data.get(row).unwrap_or(AnyValue::Null);
                    any_to_string(value).len()
                })
                .max()
                .unwrap_or(0);
            Ok(match column.storage {
                ColumnStorage::String => VariableFormat::String(widest.max(1)),
                ColumnStorage::Integer => {
                    VariableFormat::Numeric(widest.max(MISSING_CODE.to_string().len()))
                }
            })
        })
        .collect()
}

fn name_problem(name: &str) -> Option<String> {
    if name.len() > MAX_NAME_LEN {
        return Some(format!("name is {} bytes, limit is {MAX_NAME_LEN}", name.len()));
    }
    if !name.chars().next().is_some_and(char::is_alphabetic) {
        return Some("name must start with a letter".to_string());
    }
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
        .then(|| format!("{name} is a reserved word"))
}

/// Quote a literal for SPSS syntax. Line breaks cannot appear inside a literal.
fn quote(text: &str) -> String {
    let flattened: String = text
        .chars()
        .map(|ch| if FORBIDDEN_CHARS.contains(&ch) { ' ' } else { ch })
        .collect();
    format!("'{}'", flattened.replace('\'', "''"))
}

fn render_syntax(dataset: &SurveyDataset, formats: &[VariableFormat], data_path: &Path) -> String {
    let columns = &dataset.metadata.columns;
    let mut lines: Vec<String> = vec![
        "* Encoding: UTF-8.".to_string(),
        "GET DATA".to_string(),
        "  /TYPE=TXT".to_string(),
        format!("  /FILE={}", quote(&data_path.display().to_string())),
        "  /ENCODING='UTF8'".to_string(),
        "  /ARRANGEMENT=DELIMITED".to_string(),
        "  /DELCASE=LINE".to_string(),
        "  /FIRSTCASE=2".to_string(),
        "  /DELIMITERS=\"\\t\"".to_string(),
        "  /QUALIFIER='\"'".to_string(),
        "  /VARIABLES=".to_string(),
    ];
    for (column, format) in columns.iter().zip(formats) {
        lines.push(format!("    {} {}", column.name, format.render()));
    }
    terminate(&mut lines);

    lines.push(String::new());
    lines.push("VARIABLE LABELS".to_string());
    for (idx, column) in columns.iter().enumerate() {
        let separator = if idx == 0 { "  " } else { "  /" };
        lines.push(format!("{separator}{} {}", column.name, quote(&column.label)));
    }
    terminate(&mut lines);

    let labelled: Vec<&ColumnMetadata> = columns
        .iter()
        .filter(|column| {
            column.storage == ColumnStorage::Integer && !column.value_labels.is_empty()
        })
        .collect();
    if !labelled.is_empty() {
        lines.push(String::new());
        lines.push("VALUE LABELS".to_string());
        for (idx, column) in labelled.iter().enumerate() {
            let separator = if idx == 0 { "  " } else { "  /" };
            lines.push(format!("{separator}{}", column.name));
            for (code, label) in &column.value_labels {
                lines.push(format!("    {code} {}", quote(label)));
            }
        }
        terminate(&mut lines);
    }

    let numeric: Vec<&str> = columns
        .iter()
        .filter(|column| column.storage == ColumnStorage::Integer)
        .map(|column| column.name.as_str())
        .collect();
    if !numeric.is_empty() {
        lines.push(String::new());
        lines.push("MISSING VALUES".to_string());
        for name in &numeric {
            lines.push(format!("  {name}"));
        }
        lines.push(format!("  ({MISSING_CODE})."));
    }

    lines.push(String::new());
    lines.push("VARIABLE LEVEL".to_string());
    let mut first = true;
    for level in [MeasurementType::Nominal, MeasurementType::Scale] {
        let names: Vec<&str> = columns
            .iter()
            .filter(|column| column.measurement == level)
            .map(|column| column.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        let separator = if first { "  " } else { "  /" };
        first = false;
        lines.push(format!(
            "{separator}{} ({})",
            names.join(" "),
            level.as_spss_level().to_ascii_uppercase()
        ));
    }
    terminate(&mut lines);

    lines.push(String::new());
    lines.push("EXECUTE.".to_string());
    debug!(lines = lines.len(), "rendered SPSS syntax");
    let mut syntax = lines.join("\n");
    syntax.push('\n');
    syntax
}

fn terminate(lines: &mut [String]) {
    if let Some(last) = lines.last_mut() {
        last.push('.');
    }
}
