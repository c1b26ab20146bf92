//! Error types for the Tocsin library.
//!
//! All fallible operations in the crate return [`Result`], whose error side is
//! the [`TocsinError`] enum. Variants map onto the stage that failed so the
//! training entry point can report where a run broke.
//!
//! # Examples
//!
//! ```
//! use tocsin::error::{Result, TocsinError};
//!
//! fn fit_nothing() -> Result<()> {
//!     Err(TocsinError::empty_vocabulary("no tokens in 0 documents"))
//! }
//!
//! match fit_nothing() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Tocsin operations.
#[derive(Error, Debug)]
pub enum TocsinError {
    /// I/O errors (model artifacts, datasets, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV reading or writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Analysis-related errors (tokenization, tagging, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A record carried something other than text where a message was expected
    #[error("Input type error: {0}")]
    InputType(String),

    /// Label columns do not match the categories captured at fit time
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The feature pipeline saw no usable tokens while fitting
    #[error("Empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Every grid point of the hyperparameter search failed
    #[error("Search exhausted: {0}")]
    SearchExhaustion(String),

    /// Estimator fitting errors
    #[error("Training error: {0}")]
    Training(String),

    /// Dataset loading and cleaning errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Model artifact encoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An error raised inside a named training stage
    #[error("{stage} failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<TocsinError>,
    },

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TocsinError.
pub type Result<T> = std::result::Result<T, TocsinError>;

impl TocsinError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TocsinError::Analysis(msg.into())
    }

    /// Create a new input type error.
    pub fn input_type<S: Into<String>>(msg: S) -> Self {
        TocsinError::InputType(msg.into())
    }

    /// Create a new schema mismatch error.
    pub fn schema_mismatch<S: Into<String>>(msg: S) -> Self {
        TocsinError::SchemaMismatch(msg.into())
    }

    /// Create a new empty vocabulary error.
    pub fn empty_vocabulary<S: Into<String>>(msg: S) -> Self {
        TocsinError::EmptyVocabulary(msg.into())
    }

    /// Create a new search exhaustion error.
    pub fn search_exhaustion<S: Into<String>>(msg: S) -> Self {
        TocsinError::SearchExhaustion(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        TocsinError::Training(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        TocsinError::Dataset(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TocsinError::Serialization(msg.into())
    }

    /// Wrap an error with the name of the stage it was raised in.
    pub fn stage<S: Into<String>>(stage: S, source: TocsinError) -> Self {
        TocsinError::Stage {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error beneath any stage wrappers.
    pub fn root_cause(&self) -> &TocsinError {
        match self {
            TocsinError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TocsinError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TocsinError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        TocsinError::Other(format!("Internal error: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TocsinError::analysis("Test analysis error");
        assert_eq!(error.to_string(), "Analysis error: Test analysis error");

        let error = TocsinError::schema_mismatch("expected 35 columns, got 2");
        assert_eq!(error.to_string(), "Schema mismatch: expected 35 columns, got 2");

        let error = TocsinError::search_exhaustion("4 grid points failed");
        assert_eq!(error.to_string(), "Search exhausted: 4 grid points failed");
    }

    #[test]
    fn test_stage_wraps_source() {
        let error = TocsinError::stage("feature extraction", TocsinError::empty_vocabulary("none"));
        assert_eq!(
            error.to_string(),
            "feature extraction failed: Empty vocabulary: none"
        );

        let nested = TocsinError::stage("evaluation", error);
        assert!(matches!(nested.root_cause(), TocsinError::EmptyVocabulary(_)));

        match nested {
            TocsinError::Stage { source, .. } => {
                assert!(matches!(*source, TocsinError::Stage { .. }));
            }
            _ => panic!("Expected stage variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = TocsinError::from(io_error);

        match error {
            TocsinError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
