//! Discrete AdaBoost (SAMME) for one binary label.
//!
//! Each round fits a shallow [`DecisionTree`] on the current sample weights,
//! weighs it by `learning_rate * ln((1 - err) / err)` and boosts the weight of
//! the rows it got wrong. Boosting stops early on a perfect learner, or on a
//! learner no better than chance (which is discarded). If the very first
//! learner is no better than chance the fit fails.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};
use crate::ml::config::BoosterConfig;
use crate::ml::matrix::{FeatureMatrix, SortedColumns};
use crate::ml::tree::DecisionTree;

/// Boosted ensemble of decision trees for a 0/1 target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostClassifier {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    estimators: Vec<DecisionTree>,
    estimator_weights: Vec<f64>,
    estimator_errors: Vec<f64>,
    /// Set when the training target held a single class.
    constant: Option<u8>,
}

impl AdaBoostClassifier {
    /// Create an unfitted ensemble of up to `n_estimators` rounds.
    pub fn new(n_estimators: usize, booster: &BoosterConfig) -> Self {
        AdaBoostClassifier {
            n_estimators,
            learning_rate: booster.learning_rate,
            max_depth: booster.max_depth,
            estimators: Vec::new(),
            estimator_weights: Vec::new(),
            estimator_errors: Vec::new(),
            constant: None,
        }
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Trees kept after boosting; may be fewer than `n_estimators`.
    pub fn estimators(&self) -> &[DecisionTree] {
        &self.estimators
    }

    pub fn estimator_weights(&self) -> &[f64] {
        &self.estimator_weights
    }

    pub fn estimator_errors(&self) -> &[f64] {
        &self.estimator_errors
    }

    pub fn is_fitted(&self) -> bool {
        self.constant.is_some() || !self.estimators.is_empty()
    }

    /// Fit on a sorted column view of the features and one label column.
    pub fn fit(
        &mut self,
        features: &FeatureMatrix,
        columns: &SortedColumns,
        labels: &[u8],
    ) -> Result<()> {
        let n_rows = features.n_rows();
        if n_rows == 0 {
            return Err(TocsinError::training("cannot boost on zero rows"));
        }
        if labels.len() != n_rows || columns.n_rows() != n_rows {
            return Err(TocsinError::training(format!(
                "{n_rows} feature rows but {} labels",
                labels.len()
            )));
        }
        if self.n_estimators == 0 {
            return Err(TocsinError::invalid_argument("n_estimators must be positive"));
        }
        if self.learning_rate <= 0.0 {
            return Err(TocsinError::invalid_argument("learning_rate must be positive"));
        }

        self.estimators.clear();
        self.estimator_weights.clear();
        self.estimator_errors.clear();
        self.constant = None;

        let first = labels[0];
        if labels.iter().all(|&label| label == first) {
            self.constant = Some(first);
            return Ok(());
        }

        let mut weights = vec![1.0 / n_rows as f64; n_rows];

        for round in 0..self.n_estimators {
            let tree = DecisionTree::fit(columns, labels, &weights, self.max_depth)?;
            let predictions = tree.predict(features);

            let total: f64 = weights.iter().sum();
            let misclassified: f64 = predictions
                .iter()
                .zip(labels)
                .zip(&weights)
                .filter(|((p, y), _)| p != y)
                .map(|(_, w)| w)
                .sum();
            let error = misclassified / total;
            trace!("Boosting round {round}: weighted error {error:.6}");

            if error <= 0.0 {
                self.estimators.push(tree);
                self.estimator_weights.push(1.0);
                self.estimator_errors.push(0.0);
                break;
            }

            if error >= 0.5 {
                if self.estimators.is_empty() {
                    return Err(TocsinError::training(
                        "base learner is no better than chance; ensemble cannot be fit",
                    ));
                }
                break;
            }

            let alpha = self.learning_rate * ((1.0 - error) / error).ln();
            self.estimators.push(tree);
            self.estimator_weights.push(alpha);
            self.estimator_errors.push(error);

            if round + 1 == self.n_estimators {
                break;
            }

            for ((weight, p), y) in weights.iter_mut().zip(&predictions).zip(labels) {
                if p != y {
                    *weight *= alpha.exp();
                }
            }
            let sum: f64 = weights.iter().sum();
            if !sum.is_finite() || sum <= 0.0 {
                break;
            }
            for weight in &mut weights {
                *weight /= sum;
            }
        }

        Ok(())
    }

    /// Signed ensemble margin per row in `[-1, 1]`; positive means class 1.
    pub fn decision_function(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if let Some(constant) = self.constant {
            let margin = if constant == 1 { 1.0 } else { -1.0 };
            return Ok(vec![margin; features.n_rows()]);
        }
        if self.estimators.is_empty() {
            return Err(TocsinError::other("classifier used before fit"));
        }

        let total_weight: f64 = self.estimator_weights.iter().sum();
        let mut scores = vec![0.0; features.n_rows()];
        for (tree, alpha) in self.estimators.iter().zip(&self.estimator_weights) {
            for (score, row) in scores.iter_mut().zip(features.rows()) {
                if tree.predict_row(row) == 1 {
                    *score += alpha;
                } else {
                    *score -= alpha;
                }
            }
        }
        for score in &mut scores {
            *score /= total_weight;
        }
        Ok(scores)
    }

    /// Predicted 0/1 label per row.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u8>> {
        Ok(self
            .decision_function(features)?
            .into_iter()
            .map(|score| u8::from(score > 0.0))
            .collect())
    }
}
