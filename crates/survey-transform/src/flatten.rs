//! Response flattening.
//!
//! Turns one raw response into one [`FlatRow`] with exactly one cell per
//! column of the shared [`ColumnLayout`]. Rows are independent of each
//! other, so a batch can be flattened in parallel.

use std::collections::HashMap;
use std::ops::AddAssign;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, info_span, trace};

use survey_common::{format_numeric, parse_f64};
use survey_model::{AnswerKind, AnswerValue, CellValue, QuestionType, RawAnswer, RawResponse, SourceId};

use crate::index::{LookupIndex, QuestionRegistry};
use crate::naming::{CREATED_AT_COLUMN, RESPONSE_ID_COLUMN, VariableNames};

/// What a column holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    ResponseId,
    CreatedAt,
    Question {
        key: String,
        question_type: QuestionType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Export name of the column.
    pub name: String,
    pub role: ColumnRole,
}

impl ColumnSpec {
    /// Question key, for question columns.
    pub fn key(&self) -> Option<&str> {
        match &self.role {
            ColumnRole::Question { key, .. } => Some(key),
            ColumnRole::ResponseId | ColumnRole::CreatedAt => None,
        }
    }

    pub fn question_type(&self) -> Option<QuestionType> {
        match &self.role {
            ColumnRole::Question { question_type, .. } => Some(*question_type),
            ColumnRole::ResponseId | ColumnRole::CreatedAt => None,
        }
    }

    /// Returns true for free-text question columns.
    pub fn is_text(&self) -> bool {
        self.question_type().is_some_and(|kind| kind.is_text())
    }

    /// Value a cell holds before any answer is applied.
    fn seed(&self) -> CellValue {
        if self.is_text() {
            CellValue::Text(String::new())
        } else {
            CellValue::Missing
        }
    }
}

/// Column set shared by every row of a dataset.
///
/// The two metadata columns come first, then one column per registered
/// question in registry order.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    columns: Vec<ColumnSpec>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl ColumnLayout {
    pub fn new(registry: &QuestionRegistry, names: &VariableNames) -> Self {
        let mut layout = Self::default();
        layout.push(RESPONSE_ID_COLUMN.to_string(), ColumnRole::ResponseId);
        layout.push(CREATED_AT_COLUMN.to_string(), ColumnRole::CreatedAt);
        for question in registry.questions() {
            let name = names
                .get(&question.key)
                .map_or_else(|| question.key.clone(), str::to_string);
            layout.by_key.insert(question.key.clone(), layout.columns.len());
            layout.push(
                name,
                ColumnRole::Question {
                    key: question.key.clone(),
                    question_type: question.question_type,
                },
            );
        }
        layout
    }

    fn push(&mut self, name: String, role: ColumnRole) {
        self.by_name.insert(name.clone(), self.columns.len());
        self.columns.push(ColumnSpec { name, role });
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of the column for a question key.
    pub fn position_of_key(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Position of a column by export name.
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.position_of_name(name).map(|idx| &self.columns[idx])
    }
}

/// One flattened response, aligned with a [`ColumnLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    cells: Vec<CellValue>,
}

impl FlatRow {
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell for a column name.
    pub fn get<'a>(&'a self, layout: &ColumnLayout, name: &str) -> Option<&'a CellValue> {
        layout
            .position_of_name(name)
            .and_then(|idx| self.cells.get(idx))
    }
}

/// Counts of what happened to the answers of one or more responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Answers written into a column.
    pub applied: usize,
    /// Answers whose reference did not resolve to a question.
    pub unresolved: usize,
    /// Answers that resolved but carried no value.
    pub missing_value: usize,
    /// Answers with an unknown discriminator.
    pub unsupported: usize,
    /// Applied number answers outside the question's bounds.
    pub out_of_bounds: usize,
}

impl FlattenStats {
    /// Answers that left the seeded default in place.
    pub fn dropped(&self) -> usize {
        self.unresolved + self.missing_value + self.unsupported
    }
}

impl AddAssign for FlattenStats {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.unresolved += other.unresolved;
        self.missing_value += other.missing_value;
        self.unsupported += other.unsupported;
        self.out_of_bounds += other.out_of_bounds;
    }
}

/// Flattened rows of a batch plus their combined statistics.
#[derive(Debug, Clone, Default)]
pub struct FlattenOutput {
    pub rows: Vec<FlatRow>,
    pub stats: FlattenStats,
}

/// The index an answer kind resolves through.
pub fn lookup_index(kind: AnswerKind) -> LookupIndex {
    match kind {
        AnswerKind::Matrix => LookupIndex::IdToKey,
        AnswerKind::Choice => LookupIndex::ChoiceToKey,
        AnswerKind::Number | AnswerKind::Text => LookupIndex::ElementToKey,
    }
}

fn reference(answer: &RawAnswer, kind: AnswerKind) -> Option<&SourceId> {
    match kind {
        AnswerKind::Matrix => answer.row_id.as_ref(),
        AnswerKind::Choice => answer.choice_id.as_ref(),
        AnswerKind::Number | AnswerKind::Text => answer.element_id.as_ref(),
    }
}

fn resolved_value(answer: &RawAnswer, kind: AnswerKind) -> Option<CellValue> {
    match kind {
        AnswerKind::Text => {
            let text = match &answer.value {
                Some(AnswerValue::Text(text)) => text.trim().to_string(),
                Some(AnswerValue::Number(value)) => format_numeric(*value),
                None => String::new(),
            };
            Some(CellValue::Text(text))
        }
        AnswerKind::Matrix | AnswerKind::Choice | AnswerKind::Number => {
            answer.value.as_ref().map(|value| match value {
                AnswerValue::Number(value) => CellValue::Number(*value),
                AnswerValue::Text(text) => CellValue::Text(text.clone()),
            })
        }
    }
}

/// Integer ids stay text so assembly parses them exactly; only decimal ids go through `f64`.
fn response_id_cell(id: &SourceId) -> CellValue {
    let raw = id.as_str();
    if raw.parse::<i64>().is_ok() {
        return CellValue::Text(raw.to_string());
    }
    match parse_f64(raw) {
        Some(value) => CellValue::Number(value),
        None => CellValue::Text(raw.to_string()),
    }
}

/// Flatten one response into a row.
///
/// Answers are applied in list order, so when several resolve to the same
/// column the last one wins. Unresolvable answers leave the seeded default.
pub fn flatten_response(
    response: &RawResponse,
    registry: &QuestionRegistry,
    layout: &ColumnLayout,
) -> FlatRow {
    flatten_with_stats(response, registry, layout).0
}

fn flatten_with_stats(
    response: &RawResponse,
    registry: &QuestionRegistry,
    layout: &ColumnLayout,
) -> (FlatRow, FlattenStats) {
    let mut cells: Vec<CellValue> = layout.columns().iter().map(ColumnSpec::seed).collect();
    for (idx, column) in layout.columns().iter().enumerate() {
        match column.role {
            ColumnRole::ResponseId => cells[idx] = response_id_cell(&response.id),
            ColumnRole::CreatedAt => {
                if let Some(created_at) = &response.created_at {
                    cells[idx] = CellValue::Text(created_at.clone());
                }
            }
            ColumnRole::Question { .. } => {}
        }
    }

    let mut stats = FlattenStats::default();
    for answer in &response.answers {
        let Some(kind) = answer.kind else {
            stats.unsupported += 1;
            trace!(response_id = %response.id, "ignoring answer with unknown kind");
            continue;
        };
        let key = reference(answer, kind)
            .and_then(|id| registry.resolve(lookup_index(kind), id));
        let Some(position) = key.and_then(|key| layout.position_of_key(key)) else {
            stats.unresolved += 1;
            trace!(
                response_id = %response.id,
                kind = %kind,
                reference = ?reference(answer, kind),
                "answer reference did not resolve"
            );
            continue;
        };
        let Some(value) = resolved_value(answer, kind) else {
            stats.missing_value += 1;
            continue;
        };
        if let (Some(key), CellValue::Number(number)) = (key, &value)
            && registry
                .question(key)
                .is_some_and(|question| question.is_out_of_bounds(*number))
        {
            stats.out_of_bounds += 1;
            debug!(response_id = %response.id, key, "number answer outside declared bounds");
        }
        cells[position] = value;
        stats.applied += 1;
    }
    (FlatRow { cells }, stats)
}

/// Flatten a batch of responses, preserving input order.
pub fn flatten_responses(
    responses: &[RawResponse],
    registry: &QuestionRegistry,
    layout: &ColumnLayout,
    parallel: bool,
) -> FlattenOutput {
    let span = info_span!("flatten", responses = responses.len(), parallel);
    let _guard = span.enter();

    let results: Vec<(FlatRow, FlattenStats)> = if parallel {
        responses
            .par_iter()
            .map(|response| flatten_with_stats(response, registry, layout))
            .collect()
    } else {
        responses
            .iter()
            .map(|response| flatten_with_stats(response, registry, layout))
            .collect()
    };

    let mut output = FlattenOutput {
        rows: Vec::with_capacity(results.len()),
        stats: FlattenStats::default(),
    };
    for (row, stats) in results {
        output.rows.push(row);
        output.stats += stats;
    }
    info!(
        rows = output.rows.len(),
        applied = output.stats.applied,
        dropped = output.stats.dropped(),
        out_of_bounds = output.stats.out_of_bounds,
        "responses flattened"
    );
    output
}
