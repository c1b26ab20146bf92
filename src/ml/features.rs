//! Feature pipeline fusing the text and starting-verb stages.
//!
//! Each stage is fitted on the training messages independently; at transform
//! time their outputs are concatenated column-wise in stage order, so the
//! text columns come first and the starting-verb flag is the last column.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};
use crate::ml::matrix::{FeatureMatrix, SparseVector};
use crate::ml::starting_verb::StartingVerbExtractor;
use crate::ml::transform::{FeatureStage, Transformer};
use crate::ml::vectorizer::TextVectorizer;

/// An ordered union of feature stages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeaturePipeline {
    stages: Vec<FeatureStage>,
    fitted: bool,
}

impl FeaturePipeline {
    /// The message pipeline: `[text columns..., starting-verb column]`.
    pub fn new(use_idf: bool) -> Self {
        Self::from_stages(vec![
            FeatureStage::Text(TextVectorizer::new(use_idf)),
            FeatureStage::StartingVerb(StartingVerbExtractor::new()),
        ])
    }

    /// Build a pipeline from arbitrary stages.
    pub fn from_stages(stages: Vec<FeatureStage>) -> Self {
        FeaturePipeline {
            stages,
            fitted: false,
        }
    }

    pub fn stages(&self) -> &[FeatureStage] {
        &self.stages
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Whether the text stage applies idf weighting.
    pub fn use_idf(&self) -> Option<bool> {
        self.stages.iter().find_map(|stage| match stage {
            FeatureStage::Text(text) => Some(text.use_idf()),
            _ => None,
        })
    }

    /// Size of the learned vocabulary, zero before fitting.
    pub fn vocabulary_size(&self) -> usize {
        self.stages
            .iter()
            .map(|stage| match stage {
                FeatureStage::Text(text) => text.vocabulary_size(),
                _ => 0,
            })
            .sum()
    }

    fn concat(parts: Vec<FeatureMatrix>, n_rows: usize) -> Result<FeatureMatrix> {
        let mut parts = parts.into_iter();
        let Some(first) = parts.next() else {
            return FeatureMatrix::from_rows(0, vec![SparseVector::new(); n_rows]);
        };
        parts.try_fold(first, |acc, part| acc.hstack(&part))
    }
}

impl Transformer for FeaturePipeline {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.fit_transform(documents).map(|_| ())
    }

    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix> {
        if !self.fitted {
            return Err(TocsinError::other("feature pipeline used before fit"));
        }
        let parts = self
            .stages
            .iter()
            .map(|stage| stage.transform(documents))
            .collect::<Result<Vec<_>>>()?;
        Self::concat(parts, documents.len())
    }

    fn fit_transform(&mut self, documents: &[String]) -> Result<FeatureMatrix> {
        let parts = self
            .stages
            .iter_mut()
            .map(|stage| stage.fit_transform(documents))
            .collect::<Result<Vec<_>>>()?;
        self.fitted = true;

        let matrix = Self::concat(parts, documents.len())?;
        debug!(
            "Fitted feature pipeline on {} documents: {} columns",
            documents.len(),
            matrix.n_features()
        );
        Ok(matrix)
    }

    fn n_features(&self) -> usize {
        self.stages.iter().map(|stage| stage.n_features()).sum()
    }

    fn name(&self) -> &'static str {
        "feature_union"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_width_is_vocabulary_plus_one() {
        let mut pipeline = FeaturePipeline::new(true);
        let train = docs(&["we need water", "send food to the camp"]);
        let fitted = pipeline.fit_transform(&train).unwrap();

        let width = pipeline.vocabulary_size() + 1;
        assert_eq!(pipeline.n_features(), width);
        assert_eq!(fitted.n_features(), width);

        for batch in [
            docs(&["completely unseen words"]),
            docs(&["", "water", "Go now. Help!"]),
        ] {
            let matrix = pipeline.transform(&batch).unwrap();
            assert_eq!(matrix.n_features(), width);
            assert_eq!(matrix.n_rows(), batch.len());
        }
    }

    #[test]
    fn test_verb_flag_is_last_column() {
        let mut pipeline = FeaturePipeline::new(false);
        pipeline
            .fit(&docs(&["send water", "the water is dirty"]))
            .unwrap();

        let matrix = pipeline
            .transform(&docs(&["Send water", "the water is dirty"]))
            .unwrap();
        let last = pipeline.n_features() - 1;
        assert_eq!(matrix.dense_row(0).unwrap()[last], 1.0);
        assert_eq!(matrix.dense_row(1).unwrap()[last], 0.0);
    }

    #[test]
    fn test_vocabulary_frozen_after_fit() {
        let mut pipeline = FeaturePipeline::new(true);
        pipeline.fit(&docs(&["water"])).unwrap();
        let before = pipeline.n_features();

        pipeline.transform(&docs(&["food shelter medicine"])).unwrap();
        assert_eq!(pipeline.n_features(), before);
    }

    #[test]
    fn test_transform_before_fit() {
        let pipeline = FeaturePipeline::new(true);
        assert!(pipeline.transform(&docs(&["water"])).is_err());
    }

    #[test]
    fn test_empty_vocabulary_propagates() {
        let mut pipeline = FeaturePipeline::new(true);
        let result = pipeline.fit(&docs(&["!!!", ""]));
        assert!(matches!(result, Err(TocsinError::EmptyVocabulary(_))));
        assert!(!pipeline.is_fitted());
    }
}
