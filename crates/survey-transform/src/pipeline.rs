//! End-to-end build from parsed documents to a typed dataset.

use tracing::info_span;

use survey_model::{ProcessingOptions, RawResponse, SurveySchema};

use crate::assemble::{SurveyDataset, assemble_dataset};
use crate::error::Result;
use crate::flatten::{ColumnLayout, FlattenStats, flatten_responses};
use crate::index::{QuestionRegistry, index_schema};
use crate::naming::{VariableNames, sanitize_names};

/// Everything produced while building a dataset.
#[derive(Debug, Clone)]
pub struct SurveyBuild {
    pub registry: QuestionRegistry,
    pub names: VariableNames,
    pub layout: ColumnLayout,
    pub stats: FlattenStats,
    pub dataset: SurveyDataset,
}

/// Index the schema, assign names, flatten every response and assemble.
///
/// The registry and the name map are complete before the first response
/// is flattened.
///
/// # Errors
///
/// Returns an error if the dataset frame cannot be built.
pub fn build_dataset(
    schema: &SurveySchema,
    responses: &[RawResponse],
    options: &ProcessingOptions,
) -> Result<SurveyBuild> {
    let span = info_span!("build", responses = responses.len());
    let _guard = span.enter();

    let registry = index_schema(schema);
    let names = sanitize_names(registry.keys());
    let layout = ColumnLayout::new(&registry, &names);
    let flattened = flatten_responses(responses, &registry, &layout, options.parallel);
    let dataset = assemble_dataset(&flattened.rows, &layout, &registry)?;

    Ok(SurveyBuild {
        registry,
        names,
        layout,
        stats: flattened.stats,
        dataset,
    })
}
