//! The transform-stage interface shared by all feature producers.
//!
//! Every stage learns whatever state it needs in [`Transformer::fit`] and
//! maps a batch of messages onto a [`FeatureMatrix`] with a fixed column
//! count in [`Transformer::transform`]. Stateless stages implement `fit` as
//! a no-op. [`FeatureStage`] closes the set of stages so a fitted pipeline
//! can be serialized as part of a model artifact.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::matrix::FeatureMatrix;
use crate::ml::starting_verb::StartingVerbExtractor;
use crate::ml::vectorizer::TextVectorizer;

/// A fit/transform feature stage.
pub trait Transformer: Send + Sync {
    /// Learn stage state from training messages.
    fn fit(&mut self, documents: &[String]) -> Result<()>;

    /// Map messages onto feature rows, one row per message.
    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix>;

    /// Fit on `documents`, then transform them.
    fn fit_transform(&mut self, documents: &[String]) -> Result<FeatureMatrix> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Number of columns `transform` produces. Zero before a stateful fit.
    fn n_features(&self) -> usize;

    /// Get the name of this stage.
    fn name(&self) -> &'static str;
}

/// The feature stages a pipeline can be assembled from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FeatureStage {
    /// Bag-of-words counts with optional tf-idf weighting
    Text(TextVectorizer),
    /// Single boolean column: does the message open with a verb
    StartingVerb(StartingVerbExtractor),
}

impl FeatureStage {
    fn inner(&self) -> &dyn Transformer {
        match self {
            FeatureStage::Text(stage) => stage,
            FeatureStage::StartingVerb(stage) => stage,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Transformer {
        match self {
            FeatureStage::Text(stage) => stage,
            FeatureStage::StartingVerb(stage) => stage,
        }
    }
}

impl Transformer for FeatureStage {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.inner_mut().fit(documents)
    }

    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix> {
        self.inner().transform(documents)
    }

    fn fit_transform(&mut self, documents: &[String]) -> Result<FeatureMatrix> {
        self.inner_mut().fit_transform(documents)
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}
