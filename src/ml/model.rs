//! The trained model artifact.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TocsinError};
use crate::ml::config::GridPoint;
use crate::ml::features::FeaturePipeline;
use crate::ml::matrix::LabelMatrix;
use crate::ml::multi_output::MultiOutputClassifier;
use crate::ml::search::{CvResult, SearchOutcome};
use crate::ml::transform::Transformer;

/// Provenance of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub trained_at: DateTime<Utc>,
    pub training_examples: usize,
    pub vocabulary_size: usize,
    pub best_params: GridPoint,
    pub best_score: f64,
    pub cv_results: Vec<CvResult>,
}

/// Fitted feature pipeline plus the per-category classifier.
///
/// Immutable once built; prediction only reads it, so a model can be shared
/// between threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pipeline: FeaturePipeline,
    classifier: MultiOutputClassifier,
    metadata: ModelMetadata,
}

impl TrainedModel {
    /// Build a model from a finished search.
    pub fn from_search(outcome: SearchOutcome, training_examples: usize) -> Self {
        let metadata = ModelMetadata {
            model_id: Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
            training_examples,
            vocabulary_size: outcome.pipeline.vocabulary_size(),
            best_params: outcome.best_params,
            best_score: outcome.best_score,
            cv_results: outcome.cv_results,
        };
        TrainedModel {
            pipeline: outcome.pipeline,
            classifier: outcome.classifier,
            metadata,
        }
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn classifier(&self) -> &MultiOutputClassifier {
        &self.classifier
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Category names in prediction column order.
    pub fn categories(&self) -> &[String] {
        self.classifier.categories()
    }

    /// Predict the label matrix of `messages`.
    pub fn predict(&self, messages: &[String]) -> Result<LabelMatrix> {
        let features = self.pipeline.transform(messages)?;
        self.classifier.predict(&features)
    }

    /// Encode the model as an opaque byte blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TocsinError::serialization(e.to_string()))
    }

    /// Decode a model written by [`TrainedModel::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| TocsinError::serialization(e.to_string()))
    }

    /// Write the model artifact to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        info!(
            "Saved model {} ({} bytes) to {}",
            self.metadata.model_id,
            bytes.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Read a model artifact from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::config::{BoosterConfig, SearchConfig};
    use crate::ml::search::GridSearch;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    fn model() -> TrainedModel {
        let messages = docs(&[
            "we need water",
            "we need food",
            "send water now",
            "send food now",
            "water please",
            "food please",
        ]);
        let labels = LabelMatrix::new(
            vec!["water".to_string(), "food".to_string()],
            vec![
                vec![1, 0],
                vec![0, 1],
                vec![1, 0],
                vec![0, 1],
                vec![1, 0],
                vec![0, 1],
            ],
        )
        .unwrap();

        let search =
            GridSearch::new(SearchConfig::default().with_n_jobs(1), BoosterConfig::default())
                .unwrap();
        TrainedModel::from_search(search.fit(&messages, &labels).unwrap(), messages.len())
    }

    #[test]
    fn test_metadata() {
        let model = model();
        let metadata = model.metadata();
        assert_eq!(metadata.training_examples, 6);
        assert_eq!(metadata.vocabulary_size, model.pipeline().vocabulary_size());
        assert_eq!(metadata.cv_results.len(), 4);
        assert!(Uuid::parse_str(&metadata.model_id).is_ok());
        assert_eq!(model.categories(), &["water".to_string(), "food".to_string()]);
    }

    #[test]
    fn test_bytes_round_trip() {
        let model = model();
        let restored = TrainedModel::from_bytes(&model.to_bytes().unwrap()).unwrap();

        let probe = docs(&["need water", "food", "nothing relevant", ""]);
        assert_eq!(
            restored.predict(&probe).unwrap(),
            model.predict(&probe).unwrap()
        );
        assert_eq!(restored.metadata(), model.metadata());
    }

    #[test]
    fn test_save_and_load() {
        let model = model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        model.save(&path).unwrap();
        let loaded = TrainedModel::load(&path).unwrap();
        assert_eq!(loaded.metadata().model_id, model.metadata().model_id);
    }

    #[test]
    fn test_corrupt_bytes() {
        let result = TrainedModel::from_bytes(&[1, 2, 3]);
        assert!(matches!(result, Err(TocsinError::Serialization(_))));
    }
}
