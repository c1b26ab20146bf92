//! Cross-validated grid search over the feature and ensemble settings.
//!
//! Every (grid point, fold) pair is an independent task: it fits a fresh
//! [`FeaturePipeline`] and [`MultiOutputClassifier`] on the training part of
//! the fold and scores micro-F1 on the held-out part. Tasks run on a rayon
//! pool; collecting their results is the only synchronisation point. A task
//! that fails is logged and marks its grid point as failed without stopping
//! the others. The best point is refit on every row.

use std::fmt;

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};
use crate::ml::config::{BoosterConfig, GridPoint, SearchConfig};
use crate::ml::features::FeaturePipeline;
use crate::ml::matrix::LabelMatrix;
use crate::ml::metrics::f1_micro;
use crate::ml::multi_output::MultiOutputClassifier;
use crate::ml::transform::Transformer;

/// Contiguous, unshuffled K-fold splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

/// Row indices of one fold: `(train, validation)`.
pub type Fold = (Vec<usize>, Vec<usize>);

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        KFold { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Split `n_rows` rows into folds. The first `n_rows % n_splits` folds
    /// hold one extra validation row.
    pub fn split(&self, n_rows: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(TocsinError::invalid_argument(format!(
                "at least 2 folds are required, got {}",
                self.n_splits
            )));
        }
        if n_rows < self.n_splits {
            return Err(TocsinError::invalid_argument(format!(
                "cannot split {n_rows} rows into {} folds",
                self.n_splits
            )));
        }

        let base = n_rows / self.n_splits;
        let extra = n_rows % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            let end = start + size;
            let validation: Vec<usize> = (start..end).collect();
            let train: Vec<usize> = (0..start).chain(end..n_rows).collect();
            folds.push((train, validation));
            start = end;
        }
        Ok(folds)
    }
}

/// Cross-validation result of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvResult {
    pub params: GridPoint,
    /// Scores of the folds that succeeded, in fold order.
    pub fold_scores: Vec<f64>,
    /// Mean fold score, `None` when any fold failed.
    pub mean_score: Option<f64>,
    /// 1 for the best mean score; failed points rank after all others.
    pub rank: usize,
}

impl CvResult {
    pub fn failed(&self) -> bool {
        self.mean_score.is_none()
    }
}

impl fmt::Display for CvResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mean_score {
            Some(score) => write!(f, "#{} {} -> {score:.4}", self.rank, self.params),
            None => write!(f, "#{} {} -> failed", self.rank, self.params),
        }
    }
}

/// What a search produces: the winning point and its refit components.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_params: GridPoint,
    pub best_score: f64,
    /// One entry per grid point, in grid order.
    pub cv_results: Vec<CvResult>,
    pub pipeline: FeaturePipeline,
    pub classifier: MultiOutputClassifier,
}

/// Exhaustive cross-validated search over a [`ParamGrid`](crate::ml::config::ParamGrid).
pub struct GridSearch {
    config: SearchConfig,
    booster: BoosterConfig,
    thread_pool: ThreadPool,
}

impl GridSearch {
    /// Create a search with its own worker pool.
    pub fn new(config: SearchConfig, booster: BoosterConfig) -> Result<Self> {
        config.validate()?;
        booster.validate()?;

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_count())
            .thread_name(|i| format!("grid-search-{i}"))
            .build()
            .map_err(|e| TocsinError::internal(format!("Failed to create thread pool: {e}")))?;

        Ok(GridSearch {
            config,
            booster,
            thread_pool,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search on `messages` and their `labels`.
    pub fn fit(&self, messages: &[String], labels: &LabelMatrix) -> Result<SearchOutcome> {
        if messages.len() != labels.n_rows() {
            return Err(TocsinError::schema_mismatch(format!(
                "{} messages but {} label rows",
                messages.len(),
                labels.n_rows()
            )));
        }

        let points = self.config.grid.points();
        let folds = KFold::new(self.config.cv_folds).split(messages.len())?;
        let tasks: Vec<(usize, usize)> = (0..points.len())
            .flat_map(|p| (0..folds.len()).map(move |f| (p, f)))
            .collect();

        info!(
            "Grid search: {} points x {} folds on {} workers",
            points.len(),
            folds.len(),
            self.thread_pool.current_num_threads()
        );

        let scores: Vec<Result<f64>> = self.thread_pool.install(|| {
            tasks
                .par_iter()
                .map(|&(p, f)| {
                    let (train, validation) = &folds[f];
                    self.score_fold(points[p], messages, labels, train, validation)
                })
                .collect()
        });

        let mut per_point: Vec<Vec<Result<f64>>> = points.iter().map(|_| Vec::new()).collect();
        let mut first_failure = None;
        for (&(p, f), score) in tasks.iter().zip(scores) {
            match &score {
                Ok(value) => debug!("{} fold {f}: micro-F1 {value:.4}", points[p]),
                Err(e) => {
                    warn!("{} fold {f} failed: {e}", points[p]);
                    first_failure.get_or_insert_with(|| format!("{} fold {f}: {e}", points[p]));
                }
            }
            per_point[p].push(score);
        }

        let cv_results = rank_results(&points, per_point);
        let best = cv_results
            .iter()
            .filter_map(|r| r.mean_score.map(|score| (r.params, score)))
            .fold(None, |best: Option<(GridPoint, f64)>, (params, score)| match best {
                Some((_, top)) if score <= top => best,
                _ => Some((params, score)),
            });

        let Some((best_params, best_score)) = best else {
            return Err(TocsinError::search_exhaustion(format!(
                "all {} grid points failed; first failure at {}",
                points.len(),
                first_failure.unwrap_or_else(|| "no fold".to_string())
            )));
        };
        info!("Best parameters: {best_params} (mean micro-F1 {best_score:.4})");

        let (pipeline, classifier) = self
            .fit_point(best_params, messages, labels)
            .map_err(|e| TocsinError::stage("refit", e))?;

        Ok(SearchOutcome {
            best_params,
            best_score,
            cv_results,
            pipeline,
            classifier,
        })
    }

    fn fit_point(
        &self,
        point: GridPoint,
        messages: &[String],
        labels: &LabelMatrix,
    ) -> Result<(FeaturePipeline, MultiOutputClassifier)> {
        let mut pipeline = FeaturePipeline::new(point.use_idf);
        let features = pipeline.fit_transform(messages)?;

        let mut classifier = MultiOutputClassifier::new(point.n_estimators, self.booster.clone())
            .with_categories(labels.categories().to_vec());
        classifier.fit(&features, labels)?;
        Ok((pipeline, classifier))
    }

    fn score_fold(
        &self,
        point: GridPoint,
        messages: &[String],
        labels: &LabelMatrix,
        train: &[usize],
        validation: &[usize],
    ) -> Result<f64> {
        let pick = |indices: &[usize]| -> Vec<String> {
            indices.iter().map(|&i| messages[i].clone()).collect()
        };

        let (pipeline, classifier) =
            self.fit_point(point, &pick(train), &labels.select_rows(train))?;

        let features = pipeline.transform(&pick(validation))?;
        let predicted = classifier.predict(&features)?;
        f1_micro(&labels.select_rows(validation), &predicted)
    }
}

fn rank_results(points: &[GridPoint], per_point: Vec<Vec<Result<f64>>>) -> Vec<CvResult> {
    let mut results: Vec<CvResult> = points
        .iter()
        .zip(per_point)
        .map(|(&params, scores)| {
            let any_failed = scores.iter().any(|s| s.is_err());
            let fold_scores: Vec<f64> = scores.into_iter().filter_map(|s| s.ok()).collect();
            let mean_score = if any_failed || fold_scores.is_empty() {
                None
            } else {
                Some(fold_scores.iter().sum::<f64>() / fold_scores.len() as f64)
            };
            CvResult {
                params,
                fold_scores,
                mean_score,
                rank: 0,
            }
        })
        .collect();

    let means: Vec<f64> = results.iter().filter_map(|r| r.mean_score).collect();
    for result in &mut results {
        result.rank = match result.mean_score {
            Some(score) => 1 + means.iter().filter(|&&other| other > score).count(),
            None => means.len() + 1,
        };
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::config::ParamGrid;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    fn water_food() -> (Vec<String>, LabelMatrix) {
        let messages = docs(&[
            "we need water",
            "we need food",
            "please send water",
            "please send food",
            "water water",
            "food now",
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
        (messages, labels)
    }

    fn search() -> GridSearch {
        GridSearch::new(SearchConfig::default().with_n_jobs(2), BoosterConfig::default()).unwrap()
    }

    #[test]
    fn test_kfold_sizes() {
        let folds = KFold::new(3).split(10).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|(_, v)| v.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        assert_eq!(folds[0].1, vec![0, 1, 2, 3]);
        assert_eq!(folds[1].0, vec![0, 1, 2, 3, 7, 8, 9]);
        for (train, validation) in &folds {
            assert_eq!(train.len() + validation.len(), 10);
        }
    }

    #[test]
    fn test_kfold_too_few_rows() {
        assert!(KFold::new(3).split(2).is_err());
        assert!(KFold::new(1).split(10).is_err());
    }

    #[test]
    fn test_best_point_is_in_grid() {
        let (messages, labels) = water_food();
        let outcome = search().fit(&messages, &labels).unwrap();

        assert!(ParamGrid::default().contains(&outcome.best_params));
        assert_eq!(outcome.cv_results.len(), 4);
        assert!(outcome.cv_results.iter().any(|r| r.rank == 1));
        assert!((0.0..=1.0).contains(&outcome.best_score));
        for result in &outcome.cv_results {
            assert_eq!(result.fold_scores.len(), 3);
        }

        assert_eq!(outcome.classifier.categories(), labels.categories());
        assert_eq!(outcome.pipeline.use_idf(), Some(outcome.best_params.use_idf));
    }

    #[test]
    fn test_ties_keep_earliest_point() {
        let (messages, labels) = water_food();
        let outcome = search().fit(&messages, &labels).unwrap();

        let best_index = outcome
            .cv_results
            .iter()
            .position(|r| r.params == outcome.best_params)
            .unwrap();
        for earlier in &outcome.cv_results[..best_index] {
            assert!(earlier.mean_score.unwrap() < outcome.best_score);
        }
    }

    #[test]
    fn test_every_point_failing_exhausts_search() {
        // identical messages with alternating labels cannot be separated
        let messages = docs(&["help"; 6]);
        let labels = LabelMatrix::new(
            vec!["water".to_string()],
            vec![vec![1], vec![0], vec![1], vec![0], vec![1], vec![0]],
        )
        .unwrap();

        let result = search().fit(&messages, &labels);
        assert!(matches!(result, Err(TocsinError::SearchExhaustion(_))));
    }

    #[test]
    fn test_exhaustion_names_root_cause() {
        // no message yields a token, so every fold fails to build a vocabulary
        let messages = docs(&["?!", "...", "--", "!!", ",,", ";;"]);
        let labels = LabelMatrix::new(
            vec!["water".to_string()],
            vec![vec![1], vec![0], vec![1], vec![0], vec![1], vec![0]],
        )
        .unwrap();

        let error = search().fit(&messages, &labels).unwrap_err();
        assert!(matches!(error, TocsinError::SearchExhaustion(_)));
        let message = error.to_string();
        assert!(message.contains("fold 0"), "{message}");
        assert!(message.contains("Empty vocabulary"), "{message}");
    }

    #[test]
    fn test_length_mismatch() {
        let (messages, labels) = water_food();
        let result = search().fit(&messages[..3], &labels);
        assert!(matches!(result, Err(TocsinError::SchemaMismatch(_))));
    }

    #[test]
    fn test_rank_results() {
        let point = |n| GridPoint {
            use_idf: true,
            n_estimators: n,
        };
        let results = rank_results(
            &[point(1), point(2), point(3)],
            vec![
                vec![Ok(0.25), Ok(0.75)],
                vec![Ok(0.9), Err(TocsinError::training("boom"))],
                vec![Ok(0.8), Ok(0.8)],
            ],
        );

        assert_eq!(results[0].mean_score, Some(0.5));
        assert!(results[1].failed());
        assert_eq!(results[1].fold_scores, vec![0.9]);
        assert_eq!(results[2].rank, 1);
        assert_eq!(results[0].rank, 2);
        assert_eq!(results[1].rank, 3);
    }
}
