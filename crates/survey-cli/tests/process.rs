//! Integration tests for the process pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use survey_cli::pipeline::process_survey;
use survey_cli::types::{OutputStatus, ProcessRequest};
use survey_model::{OutputFormat, ProcessingOptions};
use tempfile::TempDir;

fn write_inputs(dir: &Path, text_key: &str, comment: &str) -> (PathBuf, PathBuf) {
    let schema = format!(
        r#"{{
  "id": 314,
  "pages": [{{"elements": [
    {{
      "@type": "Radiogroup",
      "id": 1,
      "itemKey": "SATISFIED",
      "title": {{"default": "Satisfied?"}},
      "choices": [
        {{"id": 11, "value": 1, "text": {{"default": "Yes"}}}},
        {{"id": 12, "value": 2, "text": {{"default": "No"}}}}
      ]
    }},
    {{"@type": "Text", "id": 2, "itemKey": "{text_key}", "title": "Why?"}}
  ]}}]
}}"#
    );
    let responses = serde_json::json!([
        {
            "id": 1,
            "createdAt": "2024-05-01T08:30:00Z",
            "answers": [
                {"@type": "choice", "choice_id": 11, "value": 1},
                {"@type": "text", "element_id": 2, "value": comment}
            ]
        },
        {
            "id": 2,
            "answers": [
                {"@type": "choice", "choice_id": 12, "value": 2},
                {"@type": "rating", "element_id": 9, "value": 5}
            ]
        }
    ]);
    let schema_path = dir.join("schema.json");
    let responses_path = dir.join("responses.json");
    fs::write(&schema_path, schema).unwrap();
    fs::write(&responses_path, responses.to_string()).unwrap();
    (schema_path, responses_path)
}

fn request(dir: &Path, schema: &Path, responses: &Path) -> ProcessRequest {
    ProcessRequest {
        schema_path: schema.to_path_buf(),
        responses_path: responses.to_path_buf(),
        output_dir: dir.join("out"),
        survey_id: None,
        options: ProcessingOptions::default(),
        dry_run: false,
    }
}

#[test]
fn writes_all_outputs() {
    let dir = TempDir::new().unwrap();
    let (schema, responses) = write_inputs(dir.path(), "REASON", "fast delivery");

    let result = process_survey(&request(dir.path(), &schema, &responses)).unwrap();

    assert!(!result.has_errors);
    assert_eq!(result.survey_id, "314");
    assert_eq!(result.responses, 2);
    assert_eq!(result.questions, 2);
    assert_eq!((result.rows, result.columns), (2, 4));
    assert_eq!(result.stats.unsupported, 1);
    let out = dir.path().join("out");
    for name in [
        "survey_314_responses.csv",
        "survey_314.sps",
        "survey_314.dat",
        "survey_314_metadata.json",
    ] {
        assert!(out.join(name).exists(), "missing {name}");
    }
    assert!(
        result
            .outputs
            .iter()
            .all(|output| output.status == OutputStatus::Written)
    );
}

#[test]
fn long_text_is_recoded_for_spss_only() {
    let dir = TempDir::new().unwrap();
    let long = "a".repeat(400);
    let (schema, responses) = write_inputs(dir.path(), "REASON", &long);

    let result = process_survey(&request(dir.path(), &schema, &responses)).unwrap();

    assert!(!result.has_errors);
    let spss = result
        .outputs
        .iter()
        .find(|output| output.format == OutputFormat::Spss)
        .unwrap();
    assert_eq!(
        spss.status,
        OutputStatus::Recoded {
            columns: vec!["REASON".to_string()]
        }
    );

    let out = dir.path().join("out");
    let csv = fs::read_to_string(out.join("survey_314_responses.csv")).unwrap();
    assert!(csv.contains(&long));
    let metadata: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("survey_314_metadata.json")).unwrap())
            .unwrap();
    assert_eq!(metadata["text_codebook"]["REASON"]["1"], long.as_str());
}

#[test]
fn spss_failure_keeps_other_outputs() {
    let dir = TempDir::new().unwrap();
    // A valid variable name that SPSS cannot declare, recoded or not.
    let (schema, responses) = write_inputs(dir.path(), "123", "ok");

    let result = process_survey(&request(dir.path(), &schema, &responses)).unwrap();

    assert!(result.has_errors);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("spss:"));
    let out = dir.path().join("out");
    assert!(out.join("survey_314_responses.csv").exists());
    assert!(out.join("survey_314_metadata.json").exists());
    assert!(!out.join("survey_314.sps").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (schema, responses) = write_inputs(dir.path(), "REASON", "fine");
    let mut request = request(dir.path(), &schema, &responses);
    request.dry_run = true;
    request.survey_id = Some("wave2".to_string());

    let result = process_survey(&request).unwrap();

    assert_eq!(result.survey_id, "wave2");
    assert!(result.outputs.is_empty());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn format_selection_limits_outputs() {
    let dir = TempDir::new().unwrap();
    let (schema, responses) = write_inputs(dir.path(), "REASON", "fine");
    let mut request = request(dir.path(), &schema, &responses);
    request.options = ProcessingOptions::default().with_formats(vec![OutputFormat::Csv]);

    let result = process_survey(&request).unwrap();

    assert_eq!(result.outputs.len(), 1);
    assert!(!dir.path().join("out/survey_314.sps").exists());
}

#[test]
fn malformed_responses_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let (schema, responses) = write_inputs(dir.path(), "REASON", "fine");
    fs::write(&responses, "{not json").unwrap();

    let err = process_survey(&request(dir.path(), &schema, &responses)).unwrap_err();

    assert!(format!("{err:#}").contains("load responses"));
}
