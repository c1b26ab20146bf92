//! One independent boosted classifier per category.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};
use crate::ml::adaboost::AdaBoostClassifier;
use crate::ml::config::BoosterConfig;
use crate::ml::matrix::{FeatureMatrix, LabelMatrix};

/// Multi-label classifier: every category gets its own [`AdaBoostClassifier`]
/// trained on the same features and its own label column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    n_estimators: usize,
    booster: BoosterConfig,
    /// Categories in column order; pinned before fit or learned from it.
    categories: Vec<String>,
    estimators: Vec<AdaBoostClassifier>,
    n_features: usize,
}

impl MultiOutputClassifier {
    /// Create an unfitted classifier that learns its categories from the
    /// first label matrix it is fitted on.
    pub fn new(n_estimators: usize, booster: BoosterConfig) -> Self {
        MultiOutputClassifier {
            n_estimators,
            booster,
            categories: Vec::new(),
            estimators: Vec::new(),
            n_features: 0,
        }
    }

    /// Pin the expected category order; fitting on other columns then fails.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn estimators(&self) -> &[AdaBoostClassifier] {
        &self.estimators
    }

    pub fn is_fitted(&self) -> bool {
        !self.estimators.is_empty()
    }

    /// Train every per-category estimator, in category order.
    pub fn fit(&mut self, features: &FeatureMatrix, labels: &LabelMatrix) -> Result<()> {
        if features.n_rows() != labels.n_rows() {
            return Err(TocsinError::schema_mismatch(format!(
                "{} feature rows but {} label rows",
                features.n_rows(),
                labels.n_rows()
            )));
        }
        if labels.n_categories() == 0 {
            return Err(TocsinError::schema_mismatch("label matrix has no categories"));
        }
        if !self.categories.is_empty() && self.categories.as_slice() != labels.categories() {
            return Err(TocsinError::schema_mismatch(format!(
                "expected categories [{}], got [{}]",
                self.categories.join(", "),
                labels.categories().join(", ")
            )));
        }

        let columns = features.sorted_columns();
        let mut estimators = Vec::with_capacity(labels.n_categories());
        for (index, category) in labels.categories().iter().enumerate() {
            let mut estimator = AdaBoostClassifier::new(self.n_estimators, &self.booster);
            estimator
                .fit(features, &columns, &labels.column(index))
                .map_err(|e| match e {
                    TocsinError::Training(msg) => {
                        TocsinError::training(format!("category '{category}': {msg}"))
                    }
                    other => other,
                })?;
            debug!(
                "Fitted '{category}' with {} learners",
                estimator.estimators().len()
            );
            estimators.push(estimator);
        }

        self.categories = labels.categories().to_vec();
        self.estimators = estimators;
        self.n_features = features.n_features();
        Ok(())
    }

    /// Predict every category for every row, in fitted category order.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<LabelMatrix> {
        if !self.is_fitted() {
            return Err(TocsinError::other("classifier used before fit"));
        }
        if features.n_features() != self.n_features {
            return Err(TocsinError::schema_mismatch(format!(
                "classifier fitted on {} features, got {}",
                self.n_features,
                features.n_features()
            )));
        }

        let columns = self
            .estimators
            .iter()
            .map(|estimator| estimator.predict(features))
            .collect::<Result<Vec<_>>>()?;

        LabelMatrix::from_columns(self.categories.clone(), &columns)
    }
}
