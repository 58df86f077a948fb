//! Integration tests for survey document parsing.

use survey_model::{
    AnswerKind, AnswerValue, Element, LocalizedText, ProcessingOptions, SourceId, SurveySchema,
    load_responses_str,
};

const SCHEMA: &str = r#"{
  "id": 10551,
  "pages": [
    {
      "elements": [
        {
          "@type": "Matrix",
          "id": 1,
          "title": {"default": "Workload"},
          "columns": [
            {"value": 1, "text": {"default": "Never"}},
            {"value": "2", "text": {"default": "Sometimes"}},
            {"text": {"default": "No value"}}
          ],
          "rows": [
            {"id": 11, "itemKey": "WL_1", "text": {"default": "Too much work"}},
            {"id": 12, "itemKey": "", "text": {"default": "Unkeyed row"}}
          ]
        },
        {
          "@type": "Radiogroup",
          "id": 2,
          "itemKey": "GENDER",
          "title": "Gender",
          "choices": [
            {"id": 21, "value": 1, "text": {"default": "Female"}},
            {"id": 22, "value": null, "text": {"default": "Prefer not to say"}}
          ]
        }
      ]
    },
    {
      "elements": [
        {"@type": "Number", "id": 3, "itemKey": "AGE", "title": {"default": "Age"}, "min": 16, "max": "99"},
        {"@type": "Text", "id": 4, "title": {"default": "Comments"}},
        {"@type": "Html", "id": 5, "html": "<p>Thanks</p>"}
      ]
    }
  ]
}"#;

#[test]
fn schema_parses_all_element_kinds() {
    let schema = SurveySchema::from_json_str(SCHEMA).expect("parse schema");
    assert_eq!(schema.id, Some(SourceId::from(10551)));
    let kinds: Vec<&str> = schema.elements().map(Element::kind).collect();
    assert_eq!(
        kinds,
        vec!["Matrix", "Radiogroup", "Number", "Text", "Unknown"]
    );
}

#[test]
fn matrix_columns_accept_numeric_strings() {
    let schema = SurveySchema::from_json_str(SCHEMA).expect("parse schema");
    let Some(Element::Matrix(matrix)) = schema.elements().next() else {
        panic!("expected matrix element");
    };
    let values: Vec<Option<i64>> = matrix.columns.iter().map(|c| c.value).collect();
    assert_eq!(values, vec![Some(1), Some(2), None]);
    assert_eq!(matrix.rows[0].item_key.as_deref(), Some("WL_1"));
    // Blank keys count as absent.
    assert_eq!(matrix.rows[1].item_key, None);
}

#[test]
fn number_bounds_parse_from_mixed_types() {
    let schema = SurveySchema::from_json_str(SCHEMA).expect("parse schema");
    let number = schema
        .elements()
        .find_map(|element| match element {
            Element::Number(number) => Some(number),
            _ => None,
        })
        .expect("number element");
    assert_eq!(number.min, Some(16.0));
    assert_eq!(number.max, Some(99.0));
}

#[test]
fn localized_text_variants() {
    assert_eq!(LocalizedText::from("plain").as_str(), "plain");
    let localized: LocalizedText = serde_json::from_str(r#"{"default": "Hallo", "en": "Hello"}"#)
        .expect("parse localized text");
    assert_eq!(localized.as_str(), "Hallo");
    let missing: LocalizedText = serde_json::from_str("null").expect("parse null text");
    assert_eq!(missing.as_str(), "");
}

#[test]
fn invalid_schema_json_is_an_error() {
    let error = SurveySchema::from_json_str("{\"pages\": [").unwrap_err();
    assert!(error.to_string().contains("schema"));
}

#[test]
fn responses_parse_with_mixed_payloads() {
    let responses = load_responses_str(
        r#"[
          {
            "id": 501,
            "createdAt": "2024-03-01T10:15:00Z",
            "answers": [
              {"@type": "matrix", "row_id": 11, "value": 2},
              {"@type": "choice", "choice_id": "21", "value": 1},
              {"@type": "number", "element_id": 3, "value": 34.5},
              {"@type": "text", "element_id": 4, "value": "  fine  "},
              {"@type": "slider", "element_id": 6, "value": 3}
            ]
          },
          {"id": "502", "answers": []}
        ]"#,
    )
    .expect("parse responses");

    assert_eq!(responses.len(), 2);
    let first = &responses[0];
    assert_eq!(first.created_at.as_deref(), Some("2024-03-01T10:15:00Z"));
    let kinds: Vec<Option<AnswerKind>> = first.answers.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Some(AnswerKind::Matrix),
            Some(AnswerKind::Choice),
            Some(AnswerKind::Number),
            Some(AnswerKind::Text),
            None,
        ]
    );
    assert_eq!(first.answers[2].value, Some(AnswerValue::Number(34.5)));
    assert_eq!(
        first.answers[3].value,
        Some(AnswerValue::Text("  fine  ".to_string()))
    );
    assert_eq!(responses[1].id.as_str(), "502");
}

#[test]
fn processing_options_fill_defaults() {
    let options: ProcessingOptions =
        serde_json::from_str(r#"{"max_string_width": 80}"#).expect("parse options");
    assert_eq!(options.max_string_width, 80);
    assert!(options.parallel);
    assert_eq!(options.formats.len(), 3);
}

#[test]
fn malformed_elements_do_not_reject_the_schema() {
    let schema = SurveySchema::from_json_str(
        r#"{"pages": [{"elements": [
            {"@type": "Matrix", "id": 1, "rows": null, "columns": [{"value": 1, "text": "Low"}]},
            {"@type": "Radiogroup", "id": 2, "itemKey": "R", "choices": null},
            {"id": 3, "title": "no type"},
            {"@type": 7, "id": 4},
            {"@type": "Number", "id": {"nested": true}, "itemKey": "BROKEN"},
            {"@type": "Number", "id": 5, "itemKey": "AGE"}
        ]}]}"#,
    )
    .expect("parse schema");

    let kinds: Vec<&str> = schema.elements().map(Element::kind).collect();
    assert_eq!(
        kinds,
        vec!["Matrix", "Radiogroup", "Unknown", "Unknown", "Unknown", "Number"]
    );
    let Some(Element::Matrix(matrix)) = schema.elements().next() else {
        panic!("expected matrix element");
    };
    assert!(matrix.rows.is_empty());
    assert_eq!(matrix.columns.len(), 1);
}

#[test]
fn malformed_list_entries_are_dropped_individually() {
    let schema = SurveySchema::from_json_str(
        r#"{"pages": [
            {"elements": [{"@type": "Radiogroup", "id": 2, "itemKey": "R",
                "choices": [{"id": 21, "value": 1, "text": "Yes"}, "oops", {"id": 22, "value": 2}]}]},
            null,
            {"elements": "not a list"}
        ]}"#,
    )
    .expect("parse schema");

    assert_eq!(schema.pages.len(), 2);
    let Some(Element::Radiogroup(radio)) = schema.elements().next() else {
        panic!("expected radiogroup element");
    };
    assert_eq!(radio.choices.len(), 2);
    assert_eq!(schema.elements().count(), 1);
}
