//! # Tocsin
//!
//! Multi-label classification of disaster-response messages.
//!
//! ## Features
//!
//! - Message analysis: URL placeholders, word tokenization, lemmatization
//!   and part-of-speech tagging
//! - Bag-of-words and tf-idf features plus a starting-verb flag
//! - One AdaBoost ensemble per category
//! - Parallel cross-validated grid search
//! - Dataset cleaning, evaluation reports and a portable model artifact
//!
//! ```no_run
//! use tocsin::data::Dataset;
//! use tocsin::ml::TrainingConfig;
//!
//! # fn main() -> tocsin::error::Result<()> {
//! let dataset = Dataset::load("messages.csv")?;
//! let config = TrainingConfig::default();
//! let (train, test) = dataset.train_test_split(config.test_size, config.seed)?;
//!
//! let model = tocsin::train(&train.texts(), train.labels(), &config)?;
//! let report = tocsin::evaluate(&model, &test.texts(), test.labels(), test.categories())?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod data;
pub mod error;
pub mod ml;

pub use ml::{evaluate, predict, train};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
