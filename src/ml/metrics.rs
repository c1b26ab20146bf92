//! Multi-label evaluation metrics.
//!
//! [`ClassificationReport`] holds per-category precision, recall, F1 and
//! support, the micro/macro/weighted/samples averages, the share of label
//! cells predicted correctly, and the share of rows predicted exactly.
//! Every ratio with a zero denominator is reported as 0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};
use crate::ml::matrix::LabelMatrix;

/// Confusion counts for one binary label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Counts {
    fn add(&mut self, truth: u8, predicted: u8) {
        match (truth, predicted) {
            (1, 1) => self.tp += 1,
            (0, 1) => self.fp += 1,
            (1, 0) => self.fn_ += 1,
            _ => {}
        }
    }

    fn merge(&mut self, other: &Counts) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
    }

    fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }

    fn support(&self) -> usize {
        self.tp + self.fn_
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Scores for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of rows truly carrying the category.
    pub support: usize,
}

/// An averaged score line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-category and averaged scores of predictions against true labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub categories: Vec<CategoryScores>,
    pub micro_avg: AverageScores,
    pub macro_avg: AverageScores,
    pub weighted_avg: AverageScores,
    pub samples_avg: AverageScores,
    /// Share of label cells predicted correctly.
    pub accuracy: f64,
    /// Share of rows whose whole label vector is predicted correctly.
    pub subset_accuracy: f64,
}

fn check_shapes(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<()> {
    if truth.n_rows() != predicted.n_rows() || truth.n_categories() != predicted.n_categories() {
        return Err(TocsinError::schema_mismatch(format!(
            "true labels are {}x{}, predictions are {}x{}",
            truth.n_rows(),
            truth.n_categories(),
            predicted.n_rows(),
            predicted.n_categories()
        )));
    }
    if truth.categories() != predicted.categories() {
        return Err(TocsinError::schema_mismatch(
            "true and predicted labels name different categories",
        ));
    }
    Ok(())
}

fn category_counts(truth: &LabelMatrix, predicted: &LabelMatrix) -> Vec<Counts> {
    let mut counts = vec![Counts::default(); truth.n_categories()];
    for (t_row, p_row) in truth.rows().iter().zip(predicted.rows()) {
        for ((c, &t), &p) in counts.iter_mut().zip(t_row).zip(p_row) {
            c.add(t, p);
        }
    }
    counts
}

/// Micro-averaged F1 over all label cells.
pub fn f1_micro(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
    check_shapes(truth, predicted)?;
    let mut total = Counts::default();
    for c in category_counts(truth, predicted) {
        total.merge(&c);
    }
    Ok(total.f1())
}

impl ClassificationReport {
    /// Score `predicted` against `truth`. Both must have the same shape and
    /// category order.
    pub fn compute(truth: &LabelMatrix, predicted: &LabelMatrix) -> Result<Self> {
        check_shapes(truth, predicted)?;

        let counts = category_counts(truth, predicted);
        let categories: Vec<CategoryScores> = truth
            .categories()
            .iter()
            .zip(&counts)
            .map(|(name, c)| CategoryScores {
                name: name.clone(),
                precision: c.precision(),
                recall: c.recall(),
                f1: c.f1(),
                support: c.support(),
            })
            .collect();

        let mut total = Counts::default();
        for c in &counts {
            total.merge(c);
        }
        let total_support = total.support();

        let micro_avg = AverageScores {
            precision: total.precision(),
            recall: total.recall(),
            f1: total.f1(),
            support: total_support,
        };

        let n_categories = categories.len().max(1) as f64;
        let macro_avg = AverageScores {
            precision: categories.iter().map(|c| c.precision).sum::<f64>() / n_categories,
            recall: categories.iter().map(|c| c.recall).sum::<f64>() / n_categories,
            f1: categories.iter().map(|c| c.f1).sum::<f64>() / n_categories,
            support: total_support,
        };

        let weighted = |score: fn(&CategoryScores) -> f64| {
            if total_support == 0 {
                0.0
            } else {
                categories
                    .iter()
                    .map(|c| score(c) * c.support as f64)
                    .sum::<f64>()
                    / total_support as f64
            }
        };
        let weighted_avg = AverageScores {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total_support,
        };

        let mut samples = (0.0, 0.0, 0.0);
        let mut exact_rows = 0;
        let mut correct_cells = 0;
        for (t_row, p_row) in truth.rows().iter().zip(predicted.rows()) {
            let mut row_counts = Counts::default();
            for (&t, &p) in t_row.iter().zip(p_row) {
                row_counts.add(t, p);
                if t == p {
                    correct_cells += 1;
                }
            }
            if t_row == p_row {
                exact_rows += 1;
            }
            samples.0 += row_counts.precision();
            samples.1 += row_counts.recall();
            samples.2 += row_counts.f1();
        }

        let n_rows = truth.n_rows();
        let n_rows_f = n_rows.max(1) as f64;
        let samples_avg = AverageScores {
            precision: samples.0 / n_rows_f,
            recall: samples.1 / n_rows_f,
            f1: samples.2 / n_rows_f,
            support: total_support,
        };

        Ok(ClassificationReport {
            categories,
            micro_avg,
            macro_avg,
            weighted_avg,
            samples_avg,
            accuracy: ratio(correct_cells, n_rows * truth.n_categories()),
            subset_accuracy: ratio(exact_rows, n_rows),
        })
    }

    /// Scores of one category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryScores> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .categories
            .iter()
            .map(|c| c.name.len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.categories {
            writeln!(
                f,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                c.name, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        for (label, avg) in [
            ("micro avg", &self.micro_avg),
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
            ("samples avg", &self.samples_avg),
        ] {
            writeln!(
                f,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                label, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>width$}  {:>9.4}", "accuracy", self.accuracy)?;
        write!(f, "{:>width$}  {:>9.4}", "exact match", self.subset_accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<u8>>) -> LabelMatrix {
        LabelMatrix::new(vec!["a".to_string(), "b".to_string()], rows).unwrap()
    }

    #[test]
    fn test_per_category_scores() {
        let truth = matrix(vec![vec![1, 0], vec![1, 1], vec![0, 1], vec![0, 0]]);
        let predicted = matrix(vec![vec![1, 0], vec![0, 1], vec![1, 1], vec![0, 0]]);
        let report = ClassificationReport::compute(&truth, &predicted).unwrap();

        let a = report.category("a").unwrap();
        assert_eq!(a.precision, 0.5);
        assert_eq!(a.recall, 0.5);
        assert_eq!(a.f1, 0.5);
        assert_eq!(a.support, 2);

        let b = report.category("b").unwrap();
        assert_eq!(b.precision, 1.0);
        assert_eq!(b.recall, 1.0);
        assert_eq!(b.support, 2);

        // tp 3, fp 1, fn 1
        assert_eq!(report.micro_avg.precision, 0.75);
        assert_eq!(report.micro_avg.f1, 0.75);
        assert_eq!(report.macro_avg.f1, 0.75);

        // 6 of 8 cells right, 2 of 4 rows exact
        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.subset_accuracy, 0.5);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let truth = matrix(vec![vec![0, 0], vec![0, 0]]);
        let predicted = matrix(vec![vec![0, 0], vec![0, 0]]);
        let report = ClassificationReport::compute(&truth, &predicted).unwrap();

        assert_eq!(report.micro_avg.f1, 0.0);
        assert_eq!(report.weighted_avg.f1, 0.0);
        assert_eq!(report.samples_avg.precision, 0.0);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(f1_micro(&truth, &predicted).unwrap(), 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let truth = matrix(vec![vec![0, 1]]);
        let predicted = matrix(vec![vec![0, 1], vec![1, 1]]);
        assert!(matches!(
            ClassificationReport::compute(&truth, &predicted),
            Err(TocsinError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_display_lists_every_category() {
        let truth = matrix(vec![vec![1, 0]]);
        let report = ClassificationReport::compute(&truth, &truth).unwrap();
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("a ")));
        assert!(text.contains("micro avg"));
        assert!(text.contains("accuracy"));
    }
}
