//! The `process` pipeline: load, build, write.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, info_span, trace};

use survey_model::{OutputFormat, SurveySchema, load_responses_path};
use survey_output::{
    OutputPaths, SpssSyntaxExporter, SurveyMetadataDocument, write_csv, write_metadata_json,
};
use survey_transform::{ExportOutcome, TextCodebook, build_dataset, export_with_fallback};

use crate::logging::redact_value;
use crate::types::{OutputStatus, OutputSummary, ProcessRequest, ProcessResult};

/// Survey id from the explicit value, the schema id or the schema file stem.
pub fn derive_survey_id(
    explicit: Option<&str>,
    schema: &SurveySchema,
    schema_path: &Path,
) -> String {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    if let Some(id) = &schema.id {
        return id.to_string();
    }
    schema_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "survey".to_string())
}

/// Run the whole pipeline for one survey.
///
/// Load and build failures abort the run. Output failures are collected in
/// the result so the remaining formats are still written.
pub fn process_survey(request: &ProcessRequest) -> Result<ProcessResult> {
    let schema = SurveySchema::from_path(&request.schema_path).context("load schema")?;
    let responses = load_responses_path(&request.responses_path).context("load responses")?;
    let survey_id =
        derive_survey_id(request.survey_id.as_deref(), &schema, &request.schema_path);
    let span = info_span!("survey", survey_id = %survey_id);
    let _guard = span.enter();

    let build = build_dataset(&schema, &responses, &request.options).context("build dataset")?;
    let mut result = ProcessResult {
        survey_id: survey_id.clone(),
        output_dir: request.output_dir.clone(),
        responses: responses.len(),
        questions: build.registry.len(),
        rows: build.dataset.height(),
        columns: build.dataset.width(),
        stats: build.stats,
        outputs: Vec::new(),
        errors: Vec::new(),
        has_errors: false,
    };
    if request.dry_run {
        info!("dry run, no files written");
        return Ok(result);
    }

    fs::create_dir_all(&request.output_dir)
        .with_context(|| format!("create {}", request.output_dir.display()))?;
    let paths = OutputPaths::new(&request.output_dir, &survey_id);
    let options = &request.options;

    if options.wants(OutputFormat::Csv) {
        let status = match write_csv(&paths.csv, &build.dataset) {
            Ok(()) => OutputStatus::Written,
            Err(err) => {
                error!(error = %err, "CSV export failed");
                OutputStatus::Failed(err.to_string())
            }
        };
        record(&mut result, OutputFormat::Csv, vec![paths.csv.clone()], status);
    }

    let mut codebook: Option<TextCodebook> = None;
    if options.wants(OutputFormat::Spss) {
        let exporter = SpssSyntaxExporter::new(&paths.spss_dir, &paths.spss_stem)
            .with_max_string_width(options.max_string_width);
        let (files, status) = match export_with_fallback(&build.dataset, &exporter) {
            Ok(ExportOutcome::Primary(report)) => (report.files, OutputStatus::Written),
            Ok(ExportOutcome::Fallback { report, recoded, .. }) => {
                let columns: Vec<String> =
                    recoded.codebook.columns().map(str::to_string).collect();
                for column in &columns {
                    if let Some(codes) = recoded.codebook.column(column) {
                        for (code, text) in codes {
                            trace!(column = %column, code, text = redact_value(text), "coded");
                        }
                    }
                }
                codebook = Some(recoded.codebook);
                (report.files, OutputStatus::Recoded { columns })
            }
            Err(err) => (
                vec![exporter.syntax_path(), exporter.data_path()],
                OutputStatus::Failed(err.to_string()),
            ),
        };
        record(&mut result, OutputFormat::Spss, files, status);
    }

    if options.wants(OutputFormat::Metadata) {
        let mut document = SurveyMetadataDocument::from_build(survey_id.clone(), &build);
        if let Some(codebook) = codebook {
            document = document.with_text_codebook(codebook);
        }
        let status = match write_metadata_json(&paths.metadata, &document) {
            Ok(()) => OutputStatus::Written,
            Err(err) => {
                error!(error = %err, "metadata export failed");
                OutputStatus::Failed(err.to_string())
            }
        };
        record(
            &mut result,
            OutputFormat::Metadata,
            vec![paths.metadata.clone()],
            status,
        );
    }

    info!(
        outputs = result.outputs.len(),
        errors = result.errors.len(),
        "survey processed"
    );
    Ok(result)
}

fn record(
    result: &mut ProcessResult,
    format: OutputFormat,
    files: Vec<PathBuf>,
    status: OutputStatus,
) {
    if let OutputStatus::Failed(message) = &status {
        result.errors.push(format!("{}: {message}", format.as_str()));
        result.has_errors = true;
    }
    result.outputs.push(OutputSummary {
        format,
        files,
        status,
    });
}
