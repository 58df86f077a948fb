//! End-to-end behaviour of indexing, naming, flattening and assembly.

use polars::prelude::AnyValue;
use survey_model::{
    MISSING_CODE, MeasurementType, ProcessingOptions, RawAnswer, RawResponse, SurveySchema,
    load_responses_str,
};
use survey_transform::{
    CREATED_AT_COLUMN, RESPONSE_ID_COLUMN, SurveyDataset, build_dataset, index_schema,
    sanitize_names,
};

fn schema(json: &str) -> SurveySchema {
    SurveySchema::from_json_str(json).expect("parse schema")
}

fn int_at(dataset: &SurveyDataset, column: &str, row: usize) -> i64 {
    match dataset
        .data
        .column(column)
        .expect("column")
        .get(row)
        .expect("row")
    {
        AnyValue::Int64(value) => value,
        other => panic!("expected Int64 in {column}, got {other:?}"),
    }
}

fn str_at(dataset: &SurveyDataset, column: &str, row: usize) -> String {
    let column = dataset.data.column(column).expect("column");
    let values = column.str().expect("string column");
    values.get(row).expect("row").to_string()
}

const RADIO_AND_NUMBER: &str = r#"{
  "pages": [{
    "elements": [
      {
        "@type": "Radiogroup",
        "id": 1,
        "itemKey": "Q1",
        "title": {"default": "Do you agree?"},
        "choices": [
          {"id": 101, "value": 1, "text": {"default": "Yes"}},
          {"id": 102, "value": 2, "text": {"default": "No"}}
        ]
      },
      {"@type": "Number", "id": 2, "itemKey": "Q2", "title": {"default": "Hours"}}
    ]
  }]
}"#;

#[test]
fn radiogroup_answer_and_missing_number() {
    let schema = schema(RADIO_AND_NUMBER);
    let responses = vec![RawResponse::new(1).with_answer(RawAnswer::choice(102, 2.0))];

    let build = build_dataset(&schema, &responses, &ProcessingOptions::default()).unwrap();
    let dataset = &build.dataset;

    assert_eq!(dataset.height(), 1);
    assert_eq!(int_at(dataset, "Q1", 0), 2);
    assert_eq!(int_at(dataset, "Q2", 0), MISSING_CODE);

    let value_labels = dataset.metadata.value_labels();
    let q1 = value_labels.get("Q1").expect("Q1 labels");
    assert_eq!(q1.get(&1).map(String::as_str), Some("Yes"));
    assert_eq!(q1.get(&2).map(String::as_str), Some("No"));
    assert!(!value_labels.contains_key("Q2"));

    let measurement = dataset.metadata.measurement_types();
    assert_eq!(measurement.get("Q1"), Some(&MeasurementType::Nominal));
    assert_eq!(measurement.get("Q2"), Some(&MeasurementType::Scale));
}

#[test]
fn uuid_keys_get_placeholders_in_document_order() {
    let first = "0b9e8f7a-1c2d-4e3f-9a8b-7c6d5e4f3a2b";
    let second = "f1e2d3c4-b5a6-4978-8a9b-0c1d2e3f4a5b";
    let json = format!(
        r#"{{"pages": [{{"elements": [
            {{"@type": "Number", "id": 1, "itemKey": "{first}"}},
            {{"@type": "Number", "id": 2, "itemKey": "plain_key"}},
            {{"@type": "Text", "id": 3, "itemKey": "has space"}},
            {{"@type": "Number", "id": 4, "itemKey": "{second}"}}
        ]}}]}}"#
    );
    let registry = index_schema(&schema(&json));
    let names = sanitize_names(registry.keys());

    assert_eq!(names.get(first), Some("Q001"));
    assert_eq!(names.get("plain_key"), Some("plain_key"));
    assert_eq!(names.get("has space"), Some("has_space"));
    assert_eq!(names.get(second), Some("Q002"));
}

#[test]
fn keys_sharing_a_truncated_base_get_numbered_suffixes() {
    let prefix = "a".repeat(64);
    let first = format!("{prefix}-first");
    let second = format!("{prefix}-second");
    // `prefix` itself is valid and takes the unsuffixed name.
    let names = sanitize_names([prefix.as_str(), first.as_str(), second.as_str()]);

    let base = "a".repeat(60);
    assert_eq!(names.get(&prefix), Some(prefix.as_str()));
    assert_eq!(names.get(&first), Some(format!("{base}_1").as_str()));
    assert_eq!(names.get(&second), Some(format!("{base}_2").as_str()));
}

#[test]
fn unkeyed_text_element_gets_synthesized_key() {
    let schema = schema(
        r#"{"pages": [{"elements": [
            {"@type": "Text", "id": 42, "title": {"default": "Anything else?"}}
        ]}]}"#,
    );
    let responses = vec![RawResponse::new(1)];
    let build = build_dataset(&schema, &responses, &ProcessingOptions::default()).unwrap();

    let question = build.registry.question("text_42").expect("synthesized key");
    assert!(question.synthesized_key);
    assert_eq!(
        build.registry.measurement_type("text_42"),
        Some(MeasurementType::Nominal)
    );
    assert_eq!(str_at(&build.dataset, "text_42", 0), "");
    assert_eq!(
        build.dataset.metadata.measurement_types().get("text_42"),
        Some(&MeasurementType::Nominal)
    );
}

const WORKLOAD: &str = r#"{
  "id": 77,
  "pages": [
    {"elements": [
      {
        "@type": "Matrix",
        "id": 1,
        "title": {"default": "Workload"},
        "columns": [
          {"value": 1, "text": {"default": "Never"}},
          {"value": 2, "text": {"default": "Often"}}
        ],
        "rows": [
          {"id": 11, "itemKey": "WL_1", "text": {"default": "Too much work"}},
          {"id": 12, "itemKey": "WL_2", "text": {"default": "Too little time"}}
        ]
      }
    ]},
    {"elements": [
      {"@type": "Number", "id": 3, "itemKey": "AGE", "title": "Age", "min": 16, "max": 99},
      {"@type": "Text", "id": 4, "itemKey": "comment-free", "title": "Comments"}
    ]}
  ]
}"#;

#[test]
fn full_build_produces_typed_columns_and_labels() {
    let schema = schema(WORKLOAD);
    let responses = vec![
        RawResponse::new(500)
            .with_created_at("2024-03-01T12:00:00Z")
            .with_answer(RawAnswer::matrix(11, 1.0))
            .with_answer(RawAnswer::matrix(12, 2.0))
            .with_answer(RawAnswer::number(3, 34.0))
            .with_answer(RawAnswer::text(4, "  fine  ")),
        RawResponse::new(501)
            .with_answer(RawAnswer::matrix(11, 2.0))
            .with_answer(RawAnswer::matrix(11, 1.0))
            .with_answer(RawAnswer::number(999, 5.0)),
    ];

    let build = build_dataset(&schema, &responses, &ProcessingOptions::default()).unwrap();
    let dataset = &build.dataset;

    let columns: Vec<&str> = dataset
        .data
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(
        columns,
        vec![RESPONSE_ID_COLUMN, CREATED_AT_COLUMN, "WL_1", "WL_2", "AGE", "comment_free"]
    );

    assert_eq!(int_at(dataset, RESPONSE_ID_COLUMN, 0), 500);
    assert_eq!(int_at(dataset, CREATED_AT_COLUMN, 0), 1_709_294_400);
    assert_eq!(int_at(dataset, CREATED_AT_COLUMN, 1), MISSING_CODE);
    assert_eq!(int_at(dataset, "WL_1", 0), 1);
    assert_eq!(int_at(dataset, "WL_1", 1), 1);
    assert_eq!(int_at(dataset, "WL_2", 1), MISSING_CODE);
    assert_eq!(int_at(dataset, "AGE", 0), 34);
    assert_eq!(str_at(dataset, "comment_free", 0), "fine");
    assert_eq!(str_at(dataset, "comment_free", 1), "");

    let labels = dataset.metadata.column_labels();
    assert_eq!(labels.get("WL_2").map(String::as_str), Some("Too little time"));
    assert_eq!(labels.get(RESPONSE_ID_COLUMN).map(String::as_str), Some("Response ID"));
    assert_eq!(labels.get(CREATED_AT_COLUMN).map(String::as_str), Some("Created At"));

    assert_eq!(build.stats.unresolved, 1);
    assert_eq!(build.stats.applied, 6);
}

#[test]
fn sequential_and_parallel_builds_match() {
    let schema = schema(WORKLOAD);
    let responses: Vec<RawResponse> = (0..64)
        .map(|idx| {
            RawResponse::new(idx)
                .with_answer(RawAnswer::matrix(11, f64::from(idx % 2 + 1)))
                .with_answer(RawAnswer::text(4, format!("answer {idx}")))
        })
        .collect();

    let parallel = build_dataset(&schema, &responses, &ProcessingOptions::default()).unwrap();
    let sequential = build_dataset(
        &schema,
        &responses,
        &ProcessingOptions::default().with_parallel(false),
    )
    .unwrap();

    assert!(parallel.dataset.data.equals(&sequential.dataset.data));
    assert_eq!(parallel.stats, sequential.stats);
}

#[test]
fn large_response_ids_survive_assembly() {
    let schema = schema(RADIO_AND_NUMBER);
    let responses = load_responses_str(
        r#"[{"id": 12345678901234567}, {"id": "9007199254740993"}, {"id": "abc"}]"#,
    )
    .unwrap();

    let build = build_dataset(&schema, &responses, &ProcessingOptions::default()).unwrap();

    assert_eq!(int_at(&build.dataset, RESPONSE_ID_COLUMN, 0), 12_345_678_901_234_567);
    assert_eq!(int_at(&build.dataset, RESPONSE_ID_COLUMN, 1), 9_007_199_254_740_993);
    assert_eq!(int_at(&build.dataset, RESPONSE_ID_COLUMN, 2), MISSING_CODE);
}
