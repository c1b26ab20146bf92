//! Multi-label message classification.
//!
//! Messages flow through a [`FeaturePipeline`] (token counts or tf-idf plus a
//! starting-verb flag) into a [`MultiOutputClassifier`] holding one AdaBoost
//! ensemble per category. [`train`] picks the pipeline and ensemble settings
//! with a cross-validated [`GridSearch`]; [`evaluate`] and [`predict`] use the
//! resulting [`TrainedModel`].

pub mod adaboost;
pub mod config;
pub mod features;
pub mod matrix;
pub mod metrics;
pub mod model;
pub mod multi_output;
pub mod search;
pub mod starting_verb;
pub mod trainer;
pub mod transform;
pub mod tree;
pub mod vectorizer;

pub use adaboost::AdaBoostClassifier;
pub use config::{BoosterConfig, GridPoint, ParamGrid, SearchConfig, TrainingConfig};
pub use features::FeaturePipeline;
pub use matrix::{FeatureMatrix, LabelMatrix, SparseVector};
pub use metrics::{AverageScores, CategoryScores, ClassificationReport, f1_micro};
pub use model::{ModelMetadata, TrainedModel};
pub use multi_output::MultiOutputClassifier;
pub use search::{CvResult, GridSearch, KFold, SearchOutcome};
pub use starting_verb::StartingVerbExtractor;
pub use trainer::{evaluate, predict, train};
pub use transform::{FeatureStage, Transformer};
pub use tree::DecisionTree;
pub use vectorizer::{CountVectorizer, TextVectorizer, TfidfTransformer};
