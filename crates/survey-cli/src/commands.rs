use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;

use survey_cli::config::{OptionOverrides, load_options};
use survey_cli::pipeline::process_survey;
use survey_cli::types::{ProcessRequest, ProcessResult};
use survey_model::{OutputFormat, ProcessingOptions, SurveySchema};
use survey_transform::{index_schema, sanitize_names};

use crate::cli::{InspectArgs, OutputFormatArg, ProcessArgs};
use crate::summary::apply_table_style;

pub fn run_process(args: &ProcessArgs) -> Result<ProcessResult> {
    let base = match &args.config {
        Some(path) => load_options(path)?,
        None => ProcessingOptions::default(),
    };
    let overrides = OptionOverrides {
        max_string_width: args.max_string_width,
        formats: args.format.map(format_outputs),
        sequential: args.sequential,
    };
    let request = ProcessRequest {
        schema_path: args.schema.clone(),
        responses_path: args.responses.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| schema_dir(&args.schema)),
        survey_id: args.survey_id.clone(),
        options: overrides.apply(base),
        dry_run: args.dry_run,
    };
    process_survey(&request)
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let schema = SurveySchema::from_path(&args.schema).context("load schema")?;
    let registry = index_schema(&schema);
    let names = sanitize_names(registry.keys());

    let mut table = Table::new();
    table.set_header(vec!["Name", "Key", "Type", "Measure", "Labels", "Label"]);
    apply_table_style(&mut table);
    for question in registry.questions() {
        let name = names.get(&question.key).unwrap_or("-");
        let labels = registry
            .value_labels(&question.key)
            .map_or(0, |labels| labels.len());
        table.add_row(vec![
            name.to_string(),
            question.key.clone(),
            question.question_type.to_string(),
            question.measurement_type().to_string(),
            labels.to_string(),
            question.text.clone(),
        ]);
    }
    println!("{table}");
    println!("{} questions", registry.len());
    Ok(())
}

fn format_outputs(format: OutputFormatArg) -> Vec<OutputFormat> {
    match format {
        OutputFormatArg::Csv => vec![OutputFormat::Csv],
        OutputFormatArg::Spss => vec![OutputFormat::Spss],
        OutputFormatArg::Metadata => vec![OutputFormat::Metadata],
        OutputFormatArg::All => OutputFormat::all(),
    }
}

fn schema_dir(schema: &Path) -> PathBuf {
    schema
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
