//! Command implementations for the Tocsin CLI.

use std::time::Instant;

use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::data::{self, Dataset};
use crate::error::{Result, TocsinError};
use crate::ml::config::TrainingConfig;
use crate::ml::model::TrainedModel;
use crate::ml::trainer;

/// Execute a CLI command.
pub fn execute_command(args: TocsinArgs) -> Result<()> {
    match &args.command {
        Command::Process(process_args) => process_data(process_args.clone(), &args),
        Command::Train(train_args) => train_model(train_args.clone(), &args),
        Command::Evaluate(evaluate_args) => evaluate_model(evaluate_args.clone(), &args),
        Command::Predict(predict_args) => predict_messages(predict_args.clone(), &args),
    }
}

/// Load, merge, clean and save the raw data.
fn process_data(args: ProcessArgs, cli_args: &TocsinArgs) -> Result<()> {
    let start = Instant::now();

    info!(
        "Loading messages from {} and categories from {}",
        args.messages.display(),
        args.categories.display()
    );
    let messages = data::load_messages(&args.messages)?;
    let categories = data::load_categories(&args.categories)?;
    let messages_read = messages.len();
    let category_rows_read = categories.len();

    let merged = data::merge(messages, categories);
    let merged_records = merged.len();

    let dataset = data::clean(merged)?;
    dataset.save(&args.output)?;

    output_result(
        "Cleaned data saved",
        &ProcessResult {
            output: args.output.to_string_lossy().to_string(),
            messages_read,
            category_rows_read,
            merged_records,
            rows_kept: dataset.len(),
            categories: dataset.categories().len(),
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Build the training configuration from the config file and flags.
fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::load(path)?,
        None => TrainingConfig::default(),
    };

    if let Some(test_size) = args.test_size {
        config.test_size = test_size;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(jobs) = args.jobs {
        config.search.n_jobs = Some(jobs);
    }
    if let Some(folds) = args.folds {
        config.search.cv_folds = folds;
    }

    config.validate()?;
    Ok(config)
}

/// Split, train, evaluate on the held-out rows and save the model.
fn train_model(args: TrainArgs, cli_args: &TocsinArgs) -> Result<()> {
    let start = Instant::now();
    let config = training_config(&args)?;

    let dataset = Dataset::load(&args.dataset)?;
    let (train, test) = dataset.train_test_split(config.test_size, config.seed)?;
    info!(
        "Split {} rows into {} train and {} test",
        dataset.len(),
        train.len(),
        test.len()
    );

    let model = trainer::train(&train.texts(), train.labels(), &config)?;
    let report = trainer::evaluate(&model, &test.texts(), test.labels(), test.categories())?;
    model.save(&args.model)?;

    let metadata = model.metadata().clone();
    output_result(
        "Model trained",
        &TrainResult {
            model_path: args.model.to_string_lossy().to_string(),
            model_id: metadata.model_id,
            training_examples: train.len(),
            test_examples: test.len(),
            vocabulary_size: metadata.vocabulary_size,
            best_params: metadata.best_params,
            best_score: metadata.best_score,
            cv_results: metadata.cv_results,
            report,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Score a saved model on a dataset.
fn evaluate_model(args: EvaluateArgs, cli_args: &TocsinArgs) -> Result<()> {
    let model = TrainedModel::load(&args.model)?;
    let dataset = Dataset::load(&args.dataset)?;

    let report = trainer::evaluate(
        &model,
        &dataset.texts(),
        dataset.labels(),
        dataset.categories(),
    )?;

    output_result(
        "Evaluation complete",
        &EvaluationResult {
            model_id: model.metadata().model_id.clone(),
            examples: dataset.len(),
            report,
        },
        cli_args,
    )
}

/// Print the categories predicted for each message.
fn predict_messages(args: PredictArgs, cli_args: &TocsinArgs) -> Result<()> {
    let mut messages = args.texts.clone();
    if let Some(input) = &args.input {
        messages.extend(data::load_jsonl_messages(input)?);
    }
    if messages.is_empty() {
        return Err(TocsinError::invalid_argument(
            "no messages given; pass TEXT arguments or --input",
        ));
    }

    let model = TrainedModel::load(&args.model)?;
    if model.categories().len() != data::CATEGORY_NAMES.len() {
        warn!(
            "Model predicts {} categories, expected {}",
            model.categories().len(),
            data::CATEGORY_NAMES.len()
        );
    }

    let labels = trainer::predict(&model, &messages)?;
    let predictions = messages
        .into_iter()
        .enumerate()
        .map(|(row, message)| Prediction {
            categories: labels
                .active_categories(row)
                .into_iter()
                .map(str::to_string)
                .collect(),
            message,
        })
        .collect();

    output_result(
        "Predictions",
        &PredictionResults { predictions },
        cli_args,
    )
}
