//! Output formatting for CLI commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TocsinArgs};
use crate::error::Result;
use crate::ml::config::GridPoint;
use crate::ml::metrics::ClassificationReport;
use crate::ml::search::CvResult;

/// Result structure for data processing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResult {
    pub output: String,
    pub messages_read: usize,
    pub category_rows_read: usize,
    pub merged_records: usize,
    pub rows_kept: usize,
    pub categories: usize,
    pub duration_ms: u64,
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Messages read: {}", self.messages_read)?;
        writeln!(f, "Category rows read: {}", self.category_rows_read)?;
        writeln!(f, "Merged records: {}", self.merged_records)?;
        writeln!(f, "Rows after cleaning: {}", self.rows_kept)?;
        writeln!(f, "Categories: {}", self.categories)?;
        writeln!(f, "Saved to: {}", self.output)?;
        write!(f, "Time: {}ms", self.duration_ms)
    }
}

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResult {
    pub model_path: String,
    pub model_id: String,
    pub training_examples: usize,
    pub test_examples: usize,
    pub vocabulary_size: usize,
    pub best_params: GridPoint,
    pub best_score: f64,
    pub cv_results: Vec<CvResult>,
    pub report: ClassificationReport,
    pub duration_ms: u64,
}

impl fmt::Display for TrainResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {} ({})", self.model_path, self.model_id)?;
        writeln!(
            f,
            "Examples: {} train, {} test",
            self.training_examples, self.test_examples
        )?;
        writeln!(f, "Vocabulary: {} terms", self.vocabulary_size)?;
        writeln!(f)?;
        writeln!(f, "Grid search:")?;
        for result in &self.cv_results {
            writeln!(f, "  {result}")?;
        }
        writeln!(
            f,
            "Best: {} (cv micro-F1 {:.4})",
            self.best_params, self.best_score
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.report)?;
        writeln!(f)?;
        write!(f, "Time: {}ms", self.duration_ms)
    }
}

/// Result structure for evaluation.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub model_id: String,
    pub examples: usize,
    pub report: ClassificationReport,
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.model_id)?;
        writeln!(f, "Examples: {}", self.examples)?;
        writeln!(f)?;
        write!(f, "{}", self.report)
    }
}

/// One classified message.
#[derive(Debug, Serialize, Deserialize)]
pub struct Prediction {
    pub message: String,
    pub categories: Vec<String>,
}

/// Result structure for prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResults {
    pub predictions: Vec<Prediction>,
}

impl fmt::Display for PredictionResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, prediction) in self.predictions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Message: {}", prediction.message)?;
            if prediction.categories.is_empty() {
                write!(f, "Categories: (none)")?;
            } else {
                write!(f, "Categories: {}", prediction.categories.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &TocsinArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: fmt::Display>(message: &str, result: &T, args: &TocsinArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }
    println!("{result}");
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TocsinArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
