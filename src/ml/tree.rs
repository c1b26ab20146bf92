//! Weighted CART decision tree for binary labels.
//!
//! Splits minimize the weighted Gini impurity of the two children. Candidate
//! thresholds sit halfway between consecutive distinct feature values, and a
//! row goes left when its value is `<= threshold`. Among equally good splits
//! the lowest feature index wins.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};
use crate::ml::matrix::{FeatureMatrix, SortedColumns, SparseVector};

/// Binary classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<Box<TreeNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    /// Feature index for split (-1 for leaf).
    feature_idx: i32,
    /// Threshold value for split.
    threshold: f64,
    /// Weighted share of positive rows reaching this node.
    value: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(value: f64) -> Box<TreeNode> {
        Box::new(TreeNode {
            feature_idx: -1,
            threshold: 0.0,
            value,
            left: None,
            right: None,
        })
    }
}

/// Positive and negative weight mass.
#[derive(Clone, Copy, Debug, Default)]
struct ClassWeights {
    pos: f64,
    neg: f64,
}

impl ClassWeights {
    fn add(&mut self, label: u8, weight: f64) {
        if label == 1 {
            self.pos += weight;
        } else {
            self.neg += weight;
        }
    }

    fn total(&self) -> f64 {
        self.pos + self.neg
    }

    fn minus(&self, other: &ClassWeights) -> ClassWeights {
        ClassWeights {
            pos: self.pos - other.pos,
            neg: self.neg - other.neg,
        }
    }

    /// Gini impurity scaled by node weight: `w * (1 - p^2 - n^2)`.
    fn weighted_gini(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        total - (self.pos * self.pos + self.neg * self.neg) / total
    }

    fn positive_share(&self) -> f64 {
        let total = self.total();
        if total > 0.0 { self.pos / total } else { 0.0 }
    }
}

/// One run of rows sharing a feature value inside a node.
struct ValueGroup {
    value: f64,
    count: usize,
    weights: ClassWeights,
}

struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Everything a node build needs that does not change between nodes.
struct TrainingSet<'a> {
    columns: &'a SortedColumns,
    labels: &'a [u8],
    weights: &'a [f64],
    max_depth: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new empty decision tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Fit a tree of at most `max_depth` splits along any path.
    pub fn fit(
        columns: &SortedColumns,
        labels: &[u8],
        weights: &[f64],
        max_depth: usize,
    ) -> Result<Self> {
        let n_rows = columns.n_rows();
        if labels.len() != n_rows || weights.len() != n_rows {
            return Err(TocsinError::training(format!(
                "tree got {n_rows} rows, {} labels and {} weights",
                labels.len(),
                weights.len()
            )));
        }
        if n_rows == 0 {
            return Err(TocsinError::training("cannot fit a tree on zero rows"));
        }

        let data = TrainingSet {
            columns,
            labels,
            weights,
            max_depth,
        };
        let rows: Vec<usize> = (0..n_rows).collect();
        let mut member = vec![true; n_rows];
        let root = Self::build_tree(&data, &rows, &mut member, 0);

        Ok(Self { root: Some(root) })
    }

    /// Predicted class for one row.
    pub fn predict_row(&self, row: &SparseVector) -> u8 {
        u8::from(self.predict_proba_row(row) > 0.5)
    }

    /// Weighted positive share of the leaf `row` lands in.
    pub fn predict_proba_row(&self, row: &SparseVector) -> f64 {
        match self.root {
            Some(ref root) => Self::predict_node(root, row),
            None => 0.0,
        }
    }

    /// Predicted classes for every row of a matrix.
    pub fn predict(&self, features: &FeatureMatrix) -> Vec<u8> {
        features
            .rows()
            .iter()
            .map(|row| self.predict_row(row))
            .collect()
    }

    /// Number of internal split nodes.
    pub fn n_splits(&self) -> usize {
        fn count(node: &Option<Box<TreeNode>>) -> usize {
            match node {
                Some(n) if n.feature_idx >= 0 => 1 + count(&n.left) + count(&n.right),
                _ => 0,
            }
        }
        count(&self.root)
    }

    /// Feature used at the root split, if the root splits.
    pub fn root_feature(&self) -> Option<usize> {
        self.root
            .as_ref()
            .filter(|root| root.feature_idx >= 0)
            .map(|root| root.feature_idx as usize)
    }

    /// Recursively build the tree over the rows flagged in `member`.
    ///
    /// `member` is restored to its incoming state before returning.
    fn build_tree(
        data: &TrainingSet<'_>,
        rows: &[usize],
        member: &mut [bool],
        depth: usize,
    ) -> Box<TreeNode> {
        let mut node_weights = ClassWeights::default();
        for &row in rows {
            node_weights.add(data.labels[row], data.weights[row]);
        }
        let value = node_weights.positive_share();

        let pure = node_weights.pos <= 0.0 || node_weights.neg <= 0.0;
        if pure || depth >= data.max_depth || rows.len() < 2 {
            return TreeNode::leaf(value);
        }

        let Some(split) = Self::find_best_split(data, rows, member, &node_weights) else {
            return TreeNode::leaf(value);
        };

        let goes_left = Self::split_sides(data, &split, rows, member);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.iter().partition(|&&row| goes_left[row]);

        for &row in &right_rows {
            member[row] = false;
        }
        let left = Self::build_tree(data, &left_rows, member, depth + 1);
        for &row in &right_rows {
            member[row] = true;
        }

        for &row in &left_rows {
            member[row] = false;
        }
        let right = Self::build_tree(data, &right_rows, member, depth + 1);
        for &row in &left_rows {
            member[row] = true;
        }

        Box::new(TreeNode {
            feature_idx: split.feature as i32,
            threshold: split.threshold,
            value,
            left: Some(left),
            right: Some(right),
        })
    }

    /// Which side of `split` each row of the node falls on, indexed by row.
    fn split_sides(
        data: &TrainingSet<'_>,
        split: &Split,
        rows: &[usize],
        member: &[bool],
    ) -> Vec<bool> {
        let zero_goes_left = 0.0 <= split.threshold;
        let mut goes_left = vec![false; data.columns.n_rows()];
        for &row in rows {
            goes_left[row] = zero_goes_left;
        }
        for &(row, value) in data.columns.column(split.feature) {
            if member[row] {
                goes_left[row] = value <= split.threshold;
            }
        }
        goes_left
    }

    /// Find the split with the lowest weighted child impurity.
    fn find_best_split(
        data: &TrainingSet<'_>,
        rows: &[usize],
        member: &[bool],
        node_weights: &ClassWeights,
    ) -> Option<Split> {
        let mut best: Option<Split> = None;

        for feature in 0..data.columns.n_features() {
            let groups = Self::value_groups(data, feature, rows.len(), member, node_weights);
            if groups.len() < 2 {
                continue;
            }

            let mut left = ClassWeights::default();
            for pair in groups.windows(2) {
                left.pos += pair[0].weights.pos;
                left.neg += pair[0].weights.neg;
                let right = node_weights.minus(&left);

                let score = left.weighted_gini() + right.weighted_gini();
                let better = match best {
                    Some(ref b) => score < b.score - 1e-12,
                    None => true,
                };
                if better {
                    best = Some(Split {
                        feature,
                        threshold: (pair[0].value + pair[1].value) / 2.0,
                        score,
                    });
                }
            }
        }

        best
    }

    /// Distinct values of `feature` among the node's rows, in ascending
    /// order, with the implicit zeros folded into their own group.
    fn value_groups(
        data: &TrainingSet<'_>,
        feature: usize,
        node_size: usize,
        member: &[bool],
        node_weights: &ClassWeights,
    ) -> Vec<ValueGroup> {
        let mut groups: Vec<ValueGroup> = Vec::new();
        let mut nonzero_count = 0;
        let mut nonzero_weights = ClassWeights::default();
        let mut zero_index = None;

        for &(row, value) in data.columns.column(feature) {
            if !member[row] {
                continue;
            }
            if value > 0.0 && zero_index.is_none() {
                zero_index = Some(groups.len());
            }

            nonzero_count += 1;
            nonzero_weights.add(data.labels[row], data.weights[row]);

            match groups.last_mut() {
                Some(group) if group.value == value => {
                    group.count += 1;
                    group.weights.add(data.labels[row], data.weights[row]);
                }
                _ => {
                    let mut weights = ClassWeights::default();
                    weights.add(data.labels[row], data.weights[row]);
                    groups.push(ValueGroup {
                        value,
                        count: 1,
                        weights,
                    });
                }
            }
        }

        let zero_count = node_size - nonzero_count;
        if zero_count > 0 {
            let zeros = ValueGroup {
                value: 0.0,
                count: zero_count,
                weights: node_weights.minus(&nonzero_weights),
            };
            groups.insert(zero_index.unwrap_or(groups.len()), zeros);
        }

        debug_assert!(groups.iter().all(|g| g.count > 0));
        groups
    }

    fn predict_node(node: &TreeNode, row: &SparseVector) -> f64 {
        if node.feature_idx == -1 {
            return node.value;
        }

        let feature_value = row.get(node.feature_idx as usize);
        let child = if feature_value <= node.threshold {
            &node.left
        } else {
            &node.right
        };
        match child {
            Some(child) => Self::predict_node(child, row),
            None => node.value,
        }
    }
}
