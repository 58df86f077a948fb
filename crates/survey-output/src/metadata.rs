//! Metadata JSON output.
//!
//! Describes what a dataset contains: the registered questions, the name
//! each key was exported under, value labels and measurement levels. When
//! text columns were recoded, the codebook is included so the codes can be
//! traced back to the original answers.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use survey_model::{MeasurementType, QuestionType, SourceId, ValueLabels};
use survey_transform::{SurveyBuild, TextCodebook};

use crate::common::ensure_parent_dir;
use crate::error::{ExportError, Result};

/// One question as listed in the metadata document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionEntry {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub id: Option<SourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Serializable description of an exported survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyMetadataDocument {
    pub survey_id: String,
    pub total_responses: usize,
    pub total_questions: usize,
    /// Question key to definition.
    pub questions: BTreeMap<String, QuestionEntry>,
    /// Question key to exported variable name.
    pub variable_names: BTreeMap<String, String>,
    /// Variable name to measurement level.
    pub measurement_types: BTreeMap<String, MeasurementType>,
    /// Variable name to value labels.
    pub value_labels: BTreeMap<String, ValueLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_codebook: Option<TextCodebook>,
}

impl SurveyMetadataDocument {
    /// Describe a build. Value labels come from the assembled dataset, so
    /// recoded text labels only appear through `text_codebook`.
    pub fn from_build(survey_id: impl Into<String>, build: &SurveyBuild) -> Self {
        let questions = build
            .registry
            .questions()
            .iter()
            .map(|question| {
                (
                    question.key.clone(),
                    QuestionEntry {
                        question_type: question.question_type,
                        text: question.text.clone(),
                        id: question.source_id.clone(),
                        min: question.min,
                        max: question.max,
                    },
                )
            })
            .collect();
        let variable_names = build
            .names
            .iter()
            .map(|(key, name)| (key.to_string(), name.to_string()))
            .collect();

        Self {
            survey_id: survey_id.into(),
            total_responses: build.dataset.height(),
            total_questions: build.registry.len(),
            questions,
            variable_names,
            measurement_types: build.dataset.metadata.measurement_types(),
            value_labels: build.dataset.metadata.value_labels(),
            text_codebook: None,
        }
    }

    pub fn with_text_codebook(mut self, codebook: TextCodebook) -> Self {
        self.text_codebook = Some(codebook);
        self
    }
}

/// Write the metadata document as pretty-printed JSON.
pub fn write_metadata_json(path: &Path, document: &SurveyMetadataDocument) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|source| ExportError::io(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|source| ExportError::io(path, source))?;
    info!(
        path = %path.display(),
        questions = document.total_questions,
        codebook = document.text_codebook.is_some(),
        "wrote metadata"
    );
    Ok(())
}
