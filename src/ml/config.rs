//! Configuration for training runs.
//!
//! All structs deserialize from JSON with every field optional, so a config
//! file only needs to name what it changes:
//!
//! ```json
//! { "search": { "cv_folds": 5, "n_jobs": 2 }, "seed": 7 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};

/// Default number of search workers.
pub const DEFAULT_N_JOBS: usize = 8;

/// Configuration for a full training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Hyperparameter search settings.
    pub search: SearchConfig,

    /// Weak learner settings shared by every grid point.
    pub booster: BoosterConfig,

    /// Fraction of the dataset held out for evaluation.
    pub test_size: f64,

    /// Seed for the train/test shuffle.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            booster: BoosterConfig::default(),
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: TrainingConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.test_size.is_nan() || self.test_size <= 0.0 || self.test_size >= 1.0 {
            return Err(TocsinError::invalid_argument(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        self.search.validate()?;
        self.booster.validate()
    }

    /// Set the search configuration.
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Set the weak learner configuration.
    pub fn with_booster(mut self, booster: BoosterConfig) -> Self {
        self.booster = booster;
        self
    }

    /// Set the held-out fraction.
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Configuration for the cross-validated grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidate hyperparameters.
    pub grid: ParamGrid,

    /// Number of cross-validation folds.
    pub cv_folds: usize,

    /// Number of worker threads.
    /// If None, uses [`DEFAULT_N_JOBS`] bounded by the number of CPU cores.
    pub n_jobs: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            grid: ParamGrid::default(),
            cv_folds: 3,
            n_jobs: None,
        }
    }
}

impl SearchConfig {
    /// Worker threads to start.
    pub fn worker_count(&self) -> usize {
        match self.n_jobs {
            Some(n) => n.max(1),
            None => DEFAULT_N_JOBS.min(num_cpus::get()).max(1),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cv_folds < 2 {
            return Err(TocsinError::invalid_argument(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        self.grid.validate()
    }

    /// Set the grid.
    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Set the fold count.
    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    /// Set the worker count.
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }
}

/// The hyperparameter grid: every `use_idf` value crossed with every
/// `n_estimators` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub use_idf: Vec<bool>,
    pub n_estimators: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            use_idf: vec![true, false],
            n_estimators: vec![10, 20],
        }
    }
}

impl ParamGrid {
    /// Grid points, `n_estimators` outer and `use_idf` inner.
    pub fn points(&self) -> Vec<GridPoint> {
        self.n_estimators
            .iter()
            .flat_map(|&n_estimators| {
                self.use_idf.iter().map(move |&use_idf| GridPoint {
                    use_idf,
                    n_estimators,
                })
            })
            .collect()
    }

    /// Whether `point` is one of this grid's points.
    pub fn contains(&self, point: &GridPoint) -> bool {
        self.use_idf.contains(&point.use_idf) && self.n_estimators.contains(&point.n_estimators)
    }

    pub fn len(&self) -> usize {
        self.use_idf.len() * self.n_estimators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TocsinError::invalid_argument("parameter grid is empty"));
        }
        if self.n_estimators.contains(&0) {
            return Err(TocsinError::invalid_argument("n_estimators must be positive"));
        }
        Ok(())
    }
}

/// One combination of hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Re-weight counts by inverse document frequency.
    pub use_idf: bool,
    /// Boosting rounds per category.
    pub n_estimators: usize,
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "use_idf={}, n_estimators={}",
            self.use_idf, self.n_estimators
        )
    }
}

/// Settings of the per-category boosted ensembles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    /// Shrinkage applied to each learner's weight.
    pub learning_rate: f64,
    /// Depth of each weak learner tree.
    pub max_depth: usize,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1.0,
            max_depth: 1,
        }
    }
}

impl BoosterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(TocsinError::invalid_argument(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(TocsinError::invalid_argument("max_depth must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_grid_order() {
        let points = ParamGrid::default().points();
        let expected = [(true, 10), (false, 10), (true, 20), (false, 20)];

        assert_eq!(points.len(), 4);
        for (point, (use_idf, n_estimators)) in points.iter().zip(expected) {
            assert_eq!(point.use_idf, use_idf);
            assert_eq!(point.n_estimators, n_estimators);
        }
    }

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.search.cv_folds, 3);
        assert_eq!(config.booster.learning_rate, 1.0);
        assert_eq!(config.booster.max_depth, 1);
        assert!(config.validate().is_ok());
        assert!(config.search.worker_count() >= 1);
        assert!(config.search.worker_count() <= DEFAULT_N_JOBS);
    }

    #[test]
    fn test_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"search": {{"cv_folds": 5, "n_jobs": 2}}, "seed": 7}}"#).unwrap();

        let config = TrainingConfig::load(file.path()).unwrap();
        assert_eq!(config.search.cv_folds, 5);
        assert_eq!(config.search.worker_count(), 2);
        assert_eq!(config.search.grid, ParamGrid::default());
        assert_eq!(config.seed, 7);
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_validation() {
        assert!(TrainingConfig::default().with_test_size(1.5).validate().is_err());
        assert!(
            SearchConfig::default()
                .with_cv_folds(1)
                .validate()
                .is_err()
        );

        let grid = ParamGrid {
            use_idf: vec![],
            n_estimators: vec![10],
        };
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_contains() {
        let grid = ParamGrid::default();
        assert!(grid.contains(&GridPoint {
            use_idf: false,
            n_estimators: 20
        }));
        assert!(!grid.contains(&GridPoint {
            use_idf: true,
            n_estimators: 50
        }));
    }
}
