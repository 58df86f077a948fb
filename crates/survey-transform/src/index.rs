//! Schema indexing.
//!
//! Walks the schema once in document order and produces the
//! [`QuestionRegistry`]: every logical question, the three lookup indices
//! that connect answer references to question keys, and the value-label
//! and measurement-type tables. The registry is immutable once built.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, info_span, warn};

use survey_model::{
    Element, MatrixElement, MeasurementType, NumberElement, QuestionDefinition, QuestionType,
    RadiogroupElement, SourceId, SurveySchema, TextElement, ValueLabels,
};

/// Prefix for keys synthesized from a text element's id.
pub const SYNTHESIZED_TEXT_PREFIX: &str = "text_";

/// One of the three answer-reference indices.
///
/// The views may point at the same keys but are consulted for different
/// answer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupIndex {
    /// Matrix row ids and radiogroup element ids.
    IdToKey,
    /// Radiogroup choice ids.
    ChoiceToKey,
    /// Number and text element ids.
    ElementToKey,
}

/// Registered questions plus lookup indices and label tables.
#[derive(Debug, Clone, Default)]
pub struct QuestionRegistry {
    questions: Vec<QuestionDefinition>,
    positions: HashMap<String, usize>,
    id_to_key: HashMap<SourceId, String>,
    choice_to_key: HashMap<SourceId, String>,
    element_to_key: HashMap<SourceId, String>,
    value_labels: BTreeMap<String, ValueLabels>,
    measurement_types: BTreeMap<String, MeasurementType>,
}

impl QuestionRegistry {
    /// Questions in document order.
    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    /// Question keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|question| question.key.as_str())
    }

    pub fn question(&self, key: &str) -> Option<&QuestionDefinition> {
        self.positions.get(key).map(|&idx| &self.questions[idx])
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Resolve a reference id through one index.
    pub fn resolve(&self, index: LookupIndex, id: &SourceId) -> Option<&str> {
        let map = match index {
            LookupIndex::IdToKey => &self.id_to_key,
            LookupIndex::ChoiceToKey => &self.choice_to_key,
            LookupIndex::ElementToKey => &self.element_to_key,
        };
        map.get(id).map(String::as_str)
    }

    /// Number of entries in one index.
    pub fn index_len(&self, index: LookupIndex) -> usize {
        match index {
            LookupIndex::IdToKey => self.id_to_key.len(),
            LookupIndex::ChoiceToKey => self.choice_to_key.len(),
            LookupIndex::ElementToKey => self.element_to_key.len(),
        }
    }

    pub fn value_labels(&self, key: &str) -> Option<&ValueLabels> {
        self.value_labels.get(key)
    }

    /// Value-label sets keyed by question key.
    pub fn all_value_labels(&self) -> &BTreeMap<String, ValueLabels> {
        &self.value_labels
    }

    pub fn measurement_type(&self, key: &str) -> Option<MeasurementType> {
        self.measurement_types.get(key).copied()
    }

    /// Measurement types keyed by question key.
    pub fn measurement_types(&self) -> &BTreeMap<String, MeasurementType> {
        &self.measurement_types
    }

    fn register(&mut self, question: QuestionDefinition) {
        self.measurement_types
            .insert(question.key.clone(), question.measurement_type());
        match self.positions.get(&question.key) {
            Some(&idx) => {
                warn!(
                    key = %question.key,
                    previous_type = %self.questions[idx].question_type,
                    question_type = %question.question_type,
                    "duplicate question key, later definition replaces earlier"
                );
                self.questions[idx] = question;
            }
            None => {
                self.positions
                    .insert(question.key.clone(), self.questions.len());
                self.questions.push(question);
            }
        }
    }

    fn index(&mut self, index: LookupIndex, id: Option<&SourceId>, key: &str) {
        let Some(id) = id else {
            return;
        };
        let map = match index {
            LookupIndex::IdToKey => &mut self.id_to_key,
            LookupIndex::ChoiceToKey => &mut self.choice_to_key,
            LookupIndex::ElementToKey => &mut self.element_to_key,
        };
        map.insert(id.clone(), key.to_string());
    }

    fn attach_labels(&mut self, key: &str, labels: ValueLabels) {
        if !labels.is_empty() {
            self.value_labels.insert(key.to_string(), labels);
        }
    }
}

/// Build the question registry from a schema.
///
/// Unknown element kinds are skipped. Missing optional sub-fields only skip
/// the feature that needs them.
pub fn index_schema(schema: &SurveySchema) -> QuestionRegistry {
    let span = info_span!("index", pages = schema.pages.len());
    let _guard = span.enter();

    let mut registry = QuestionRegistry::default();
    let mut skipped = 0usize;
    for element in schema.elements() {
        match element {
            Element::Matrix(matrix) => index_matrix(&mut registry, matrix),
            Element::Radiogroup(radio) => index_radiogroup(&mut registry, radio),
            Element::Number(number) => index_number(&mut registry, number),
            Element::Text(text) => index_text(&mut registry, text),
            Element::Unknown => {
                skipped += 1;
                debug!("skipping unsupported element kind");
            }
        }
    }

    info!(
        questions = registry.len(),
        value_label_sets = registry.value_labels.len(),
        id_to_key = registry.id_to_key.len(),
        choice_to_key = registry.choice_to_key.len(),
        element_to_key = registry.element_to_key.len(),
        skipped_elements = skipped,
        "schema indexed"
    );
    registry
}

fn index_matrix(registry: &mut QuestionRegistry, matrix: &MatrixElement) {
    let column_labels: ValueLabels = matrix
        .columns
        .iter()
        .filter_map(|column| {
            column
                .value
                .map(|value| (value, column.text.as_str().to_string()))
        })
        .collect();

    let mut registered = 0usize;
    for row in &matrix.rows {
        let Some(key) = row.item_key.as_deref() else {
            continue;
        };
        registry.register(QuestionDefinition {
            key: key.to_string(),
            question_type: QuestionType::Matrix,
            text: row.text.as_str().to_string(),
            source_id: row.id.clone(),
            min: None,
            max: None,
            synthesized_key: false,
        });
        registry.index(LookupIndex::IdToKey, row.id.as_ref(), key);
        registry.attach_labels(key, column_labels.clone());
        registered += 1;
    }
    debug!(
        element_id = ?matrix.id,
        rows = matrix.rows.len(),
        registered,
        columns = column_labels.len(),
        "indexed matrix"
    );
}

fn index_radiogroup(registry: &mut QuestionRegistry, radio: &RadiogroupElement) {
    let Some(key) = radio.item_key.as_deref() else {
        debug!(element_id = ?radio.id, "skipping radiogroup without key");
        return;
    };
    registry.register(QuestionDefinition {
        key: key.to_string(),
        question_type: QuestionType::Radiogroup,
        text: radio.title.as_str().to_string(),
        source_id: radio.id.clone(),
        min: None,
        max: None,
        synthesized_key: false,
    });
    registry.index(LookupIndex::IdToKey, radio.id.as_ref(), key);

    let mut labels = ValueLabels::new();
    for choice in &radio.choices {
        // Choices without a code cannot be labeled or referenced.
        let Some(value) = choice.value else {
            continue;
        };
        labels.insert(value, choice.text.as_str().to_string());
        registry.index(LookupIndex::ChoiceToKey, choice.id.as_ref(), key);
    }
    debug!(key, choices = labels.len(), "indexed radiogroup");
    registry.attach_labels(key, labels);
}

fn index_number(registry: &mut QuestionRegistry, number: &NumberElement) {
    let Some(key) = number.item_key.as_deref() else {
        debug!(element_id = ?number.id, "skipping number element without key");
        return;
    };
    registry.register(QuestionDefinition {
        key: key.to_string(),
        question_type: QuestionType::Number,
        text: number.title.as_str().to_string(),
        source_id: number.id.clone(),
        min: number.min,
        max: number.max,
        synthesized_key: false,
    });
    registry.index(LookupIndex::IdToKey, number.id.as_ref(), key);
    registry.index(LookupIndex::ElementToKey, number.id.as_ref(), key);
    debug!(key, min = ?number.min, max = ?number.max, "indexed number");
}

fn index_text(registry: &mut QuestionRegistry, text: &TextElement) {
    let (key, synthesized_key) = match (&text.item_key, &text.id) {
        (Some(key), _) => (key.clone(), false),
        (None, Some(id)) => (format!("{SYNTHESIZED_TEXT_PREFIX}{id}"), true),
        (None, None) => {
            debug!("skipping text element without key or id");
            return;
        }
    };
    registry.register(QuestionDefinition {
        key: key.clone(),
        question_type: QuestionType::Text,
        text: text.title.as_str().to_string(),
        source_id: text.id.clone(),
        min: None,
        max: None,
        synthesized_key,
    });
    registry.index(LookupIndex::ElementToKey, text.id.as_ref(), &key);
    debug!(key = %key, synthesized_key, "indexed text");
}
