//! Type-safe enumerations for survey metadata.
//!
//! The upstream documents carry these concepts as discriminator strings
//! (`"@type"`); they are closed enums here so a new kind shows up as a
//! compile-time gap instead of a silently ignored case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a registered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// One question per matrix row, answered with a column value.
    Matrix,
    /// Single choice among coded options.
    Radiogroup,
    /// Free numeric entry, optionally bounded.
    Number,
    /// Free text entry.
    Text,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Matrix => "Matrix",
            QuestionType::Radiogroup => "Radiogroup",
            QuestionType::Number => "Number",
            QuestionType::Text => "Text",
        }
    }

    /// Returns true for free-text questions, which export as string columns.
    pub fn is_text(&self) -> bool {
        matches!(self, QuestionType::Text)
    }

    /// Measurement level used in statistical export metadata.
    ///
    /// Only numeric entry is continuous. Free text is never a scale variable.
    pub fn measurement_type(&self) -> MeasurementType {
        match self {
            QuestionType::Number => MeasurementType::Scale,
            QuestionType::Matrix | QuestionType::Radiogroup | QuestionType::Text => {
                MeasurementType::Nominal
            }
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement level of an exported variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementType {
    /// Categorical.
    #[default]
    Nominal,
    /// Continuous.
    Scale,
}

impl MeasurementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::Nominal => "Nominal",
            MeasurementType::Scale => "Scale",
        }
    }

    /// Keyword used by SPSS `VARIABLE LEVEL`.
    pub fn as_spss_level(&self) -> &'static str {
        match self {
            MeasurementType::Nominal => "nominal",
            MeasurementType::Scale => "scale",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator of a raw answer record.
///
/// Each kind resolves through exactly one lookup index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    /// References a matrix row id.
    Matrix,
    /// References a radiogroup choice id.
    Choice,
    /// References a number element id.
    Number,
    /// References a text element id.
    Text,
}

impl AnswerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerKind::Matrix => "matrix",
            AnswerKind::Choice => "choice",
            AnswerKind::Number => "number",
            AnswerKind::Text => "text",
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matrix" => Ok(AnswerKind::Matrix),
            "choice" => Ok(AnswerKind::Choice),
            "number" => Ok(AnswerKind::Number),
            "text" => Ok(AnswerKind::Text),
            _ => Err(format!("Unknown answer kind: {s}")),
        }
    }
}
