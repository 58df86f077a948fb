//! Raw per-respondent answer records.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::AnswerKind;
use crate::ids::SourceId;

/// Value payload of an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    pub id: SourceId,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
}

impl RawResponse {
    pub fn new(id: impl Into<SourceId>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            answers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    #[must_use]
    pub fn with_answer(mut self, answer: RawAnswer) -> Self {
        self.answers.push(answer);
        self
    }
}

/// One answer inside a response.
///
/// Which reference id is meaningful depends on `kind`: matrix answers carry
/// `row_id`, choice answers `choice_id`, number and text answers `element_id`.
/// A discriminator this crate does not know deserializes to `kind: None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnswer {
    #[serde(rename = "@type", default, deserialize_with = "answer_kind")]
    pub kind: Option<AnswerKind>,
    #[serde(default)]
    pub row_id: Option<SourceId>,
    #[serde(default)]
    pub choice_id: Option<SourceId>,
    #[serde(default)]
    pub element_id: Option<SourceId>,
    #[serde(default, deserialize_with = "answer_value")]
    pub value: Option<AnswerValue>,
}

impl RawAnswer {
    pub fn matrix(row_id: impl Into<SourceId>, value: f64) -> Self {
        Self {
            kind: Some(AnswerKind::Matrix),
            row_id: Some(row_id.into()),
            value: Some(AnswerValue::Number(value)),
            ..Self::default()
        }
    }

    pub fn choice(choice_id: impl Into<SourceId>, value: f64) -> Self {
        Self {
            kind: Some(AnswerKind::Choice),
            choice_id: Some(choice_id.into()),
            value: Some(AnswerValue::Number(value)),
            ..Self::default()
        }
    }

    pub fn number(element_id: impl Into<SourceId>, value: f64) -> Self {
        Self {
            kind: Some(AnswerKind::Number),
            element_id: Some(element_id.into()),
            value: Some(AnswerValue::Number(value)),
            ..Self::default()
        }
    }

    pub fn text(element_id: impl Into<SourceId>, value: impl Into<String>) -> Self {
        Self {
            kind: Some(AnswerKind::Text),
            element_id: Some(element_id.into()),
            value: Some(AnswerValue::Text(value.into())),
            ..Self::default()
        }
    }
}

fn answer_kind<'de, D>(deserializer: D) -> Result<Option<AnswerKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| raw.parse().ok()))
}

fn answer_value<'de, D>(deserializer: D) -> Result<Option<AnswerValue>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseValue {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    let raw: Option<LooseValue> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        LooseValue::Number(value) => Some(AnswerValue::Number(value)),
        LooseValue::Text(text) => Some(AnswerValue::Text(text)),
        LooseValue::Other(_) => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_answer_kind_is_none() {
        let answer: RawAnswer =
            serde_json::from_str(r#"{"@type": "ranking", "element_id": 4, "value": [1, 2]}"#)
                .unwrap();
        assert_eq!(answer.kind, None);
        assert_eq!(answer.value, None);
        assert_eq!(answer.element_id, Some(SourceId::from(4)));
    }

    #[test]
    fn null_value_is_absent() {
        let answer: RawAnswer =
            serde_json::from_str(r#"{"@type": "matrix", "row_id": "12", "value": null}"#).unwrap();
        assert_eq!(answer.kind, Some(AnswerKind::Matrix));
        assert_eq!(answer.value, None);
    }

    #[test]
    fn response_defaults_missing_fields() {
        let response: RawResponse = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(response.id.as_str(), "9");
        assert!(response.created_at.is_none());
        assert!(response.answers.is_empty());
    }
}
