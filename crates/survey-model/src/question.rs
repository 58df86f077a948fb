use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{MeasurementType, QuestionType};
use crate::ids::SourceId;

/// Integer category code to label text.
pub type ValueLabels = BTreeMap<i64, String>;

/// A logical question registered from the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    /// Stable external identifier, unique within a schema.
    pub key: String,
    pub question_type: QuestionType,
    /// Display text used as the column label.
    pub text: String,
    /// Upstream id of the element or matrix row.
    #[serde(default)]
    pub source_id: Option<SourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Set for text questions whose key was derived from the element id.
    #[serde(default)]
    pub synthesized_key: bool,
}

impl QuestionDefinition {
    pub fn measurement_type(&self) -> MeasurementType {
        self.question_type.measurement_type()
    }

    /// Returns true if `value` lies outside the declared bounds.
    pub fn is_out_of_bounds(&self, value: f64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }
}
