//! Training, evaluation and prediction entry points.
//!
//! Failures are wrapped in [`TocsinError::Stage`] naming the step that broke,
//! so a caller can report which part of a run failed.

use std::time::Instant;

use log::info;

use crate::error::{Result, TocsinError};
use crate::ml::config::TrainingConfig;
use crate::ml::matrix::LabelMatrix;
use crate::ml::metrics::ClassificationReport;
use crate::ml::model::TrainedModel;
use crate::ml::search::GridSearch;

fn in_stage(stage: &str, error: TocsinError) -> TocsinError {
    match error {
        TocsinError::Stage { .. } => error,
        other => TocsinError::stage(stage, other),
    }
}

/// Search the configured grid on `messages` and return the refit best model.
pub fn train(
    messages: &[String],
    labels: &LabelMatrix,
    config: &TrainingConfig,
) -> Result<TrainedModel> {
    if messages.len() != labels.n_rows() {
        return Err(TocsinError::schema_mismatch(format!(
            "{} messages but {} label rows",
            messages.len(),
            labels.n_rows()
        )));
    }

    let start = Instant::now();
    info!(
        "Training on {} messages across {} categories",
        messages.len(),
        labels.n_categories()
    );

    let search = GridSearch::new(config.search.clone(), config.booster.clone())
        .map_err(|e| in_stage("hyperparameter search", e))?;
    let outcome = search
        .fit(messages, labels)
        .map_err(|e| in_stage("hyperparameter search", e))?;

    let model = TrainedModel::from_search(outcome, messages.len());
    info!(
        "Trained model {} in {:.1}s: {} (cv micro-F1 {:.4})",
        model.metadata().model_id,
        start.elapsed().as_secs_f64(),
        model.metadata().best_params,
        model.metadata().best_score
    );
    Ok(model)
}

/// Score `model` on held-out `messages` against their true `labels`.
///
/// `category_names` must equal the model's category order.
pub fn evaluate(
    model: &TrainedModel,
    messages: &[String],
    labels: &LabelMatrix,
    category_names: &[String],
) -> Result<ClassificationReport> {
    if category_names != model.categories() {
        return Err(in_stage(
            "evaluation",
            TocsinError::schema_mismatch(format!(
                "model predicts [{}], evaluation names [{}]",
                model.categories().join(", "),
                category_names.join(", ")
            )),
        ));
    }
    if labels.categories() != category_names {
        return Err(in_stage(
            "evaluation",
            TocsinError::schema_mismatch("label columns do not match the category names"),
        ));
    }

    let predicted = model
        .predict(messages)
        .map_err(|e| in_stage("evaluation", e))?;
    ClassificationReport::compute(labels, &predicted).map_err(|e| in_stage("evaluation", e))
}

/// Predict the category matrix of `messages`.
pub fn predict(model: &TrainedModel, messages: &[String]) -> Result<LabelMatrix> {
    model
        .predict(messages)
        .map_err(|e| in_stage("prediction", e))
}
