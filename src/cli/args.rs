//! Command line argument parsing for the Tocsin CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Tocsin - multi-label classification of disaster-response messages
#[derive(Parser, Debug, Clone)]
#[command(name = "tocsin")]
#[command(about = "Train and apply a multi-label classifier for disaster-response messages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TocsinArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TocsinArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load, merge and clean the raw message and category files
    Process(ProcessArgs),

    /// Train a model on a cleaned dataset
    Train(TrainArgs),

    /// Evaluate a saved model on a cleaned dataset
    Evaluate(EvaluateArgs),

    /// Predict the categories of messages
    Predict(PredictArgs),
}

/// Arguments for processing the raw data
#[derive(Parser, Debug, Clone)]
pub struct ProcessArgs {
    /// Messages CSV (id,message,original,genre)
    #[arg(value_name = "MESSAGES")]
    pub messages: PathBuf,

    /// Categories CSV (id,categories)
    #[arg(value_name = "CATEGORIES")]
    pub categories: PathBuf,

    /// Where to write the cleaned dataset
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Cleaned dataset written by `process`
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Where to write the model artifact
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed of the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of search worker threads
    #[arg(short, long, env = "TOCSIN_JOBS")]
    pub jobs: Option<usize>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Cleaned dataset to score against
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Model artifact written by `train`
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Model artifact written by `train`
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Messages to classify
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,

    /// JSON-lines file of messages to classify
    #[arg(short, long, value_name = "INPUT_FILE")]
    pub input: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train() {
        let args = TocsinArgs::parse_from([
            "tocsin",
            "-v",
            "train",
            "data.csv",
            "model.bin",
            "--jobs",
            "2",
            "--folds",
            "5",
        ]);
        assert_eq!(args.verbosity(), 2);
        match args.command {
            Command::Train(train) => {
                assert_eq!(train.dataset, PathBuf::from("data.csv"));
                assert_eq!(train.jobs, Some(2));
                assert_eq!(train.folds, Some(5));
                assert_eq!(train.seed, None);
            }
            other => panic!("Expected train command, got {other:?}"),
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = TocsinArgs::parse_from(["tocsin", "-q", "-vv", "predict", "model.bin", "help"]);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_json_format() {
        let args = TocsinArgs::parse_from([
            "tocsin", "-f", "json", "predict", "model.bin", "we", "need", "water",
        ]);
        assert_eq!(args.output_format, OutputFormat::Json);
        match args.command {
            Command::Predict(predict) => assert_eq!(predict.texts.len(), 3),
            other => panic!("Expected predict command, got {other:?}"),
        }
    }
}
