//! Sparse feature matrices and binary label matrices.
//!
//! Bag-of-words rows are mostly zeros, so a [`FeatureMatrix`] stores each row
//! as a [`SparseVector`] of `(index, value)` pairs. The tree learner scans
//! columns instead of rows and asks for a [`SortedColumns`] view once per
//! fit.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TocsinError};

/// A sparse vector with strictly increasing indices and no stored zeros.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Create an empty sparse vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from unordered pairs. Duplicate indices are summed.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(index, _)| index);

        let mut vector = SparseVector::new();
        for (index, value) in pairs {
            match vector.indices.last() {
                Some(&last) if last == index => {
                    if let Some(v) = vector.values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    vector.indices.push(index);
                    vector.values.push(value);
                }
            }
        }
        vector.prune();
        vector
    }

    /// Append an entry past the current last index.
    pub fn push(&mut self, index: usize, value: f64) -> Result<()> {
        if let Some(&last) = self.indices.last() {
            if index <= last {
                return Err(TocsinError::internal(format!(
                    "sparse index {index} pushed after {last}"
                )));
            }
        }
        if value != 0.0 {
            self.indices.push(index);
            self.values.push(value);
        }
        Ok(())
    }

    /// Value at `index`, zero when absent.
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over the stored entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Largest stored index, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Multiply each stored value by the weight of its index.
    pub fn scale_by(&mut self, weights: &[f64]) {
        for (index, value) in self.indices.iter().zip(self.values.iter_mut()) {
            *value *= weights.get(*index).copied().unwrap_or(0.0);
        }
        self.prune();
    }

    /// Divide every value by the vector's norm. Zero vectors are left alone.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
    }

    fn shifted(&self, offset: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.iter().map(move |(index, value)| (index + offset, value))
    }

    fn prune(&mut self) {
        if self.values.iter().all(|v| *v != 0.0) {
            return;
        }
        let (indices, values): (Vec<usize>, Vec<f64>) = self
            .iter()
            .filter(|(_, value)| *value != 0.0)
            .unzip();
        self.indices = indices;
        self.values = values;
    }
}

/// A row-major sparse matrix with a fixed number of columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_features: usize,
    rows: Vec<SparseVector>,
}

impl FeatureMatrix {
    /// Create an empty matrix with `n_features` columns.
    pub fn new(n_features: usize) -> Self {
        FeatureMatrix {
            n_features,
            rows: Vec::new(),
        }
    }

    /// Build a matrix from rows, checking every index against the width.
    pub fn from_rows(n_features: usize, rows: Vec<SparseVector>) -> Result<Self> {
        let mut matrix = FeatureMatrix::new(n_features);
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    /// Build a matrix from dense rows.
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self> {
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        let mut matrix = FeatureMatrix::new(n_features);
        for row in rows {
            if row.len() != n_features {
                return Err(TocsinError::invalid_argument(format!(
                    "dense row has {} values, expected {n_features}",
                    row.len()
                )));
            }
            matrix.push_row(SparseVector::from_pairs(
                row.iter().copied().enumerate().collect(),
            ))?;
        }
        Ok(matrix)
    }

    /// Append a row.
    pub fn push_row(&mut self, row: SparseVector) -> Result<()> {
        if let Some(max) = row.max_index() {
            if max >= self.n_features {
                return Err(TocsinError::internal(format!(
                    "feature index {max} out of range for {} columns",
                    self.n_features
                )));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Dense copy of one row, mostly useful in tests and reports.
    pub fn dense_row(&self, index: usize) -> Option<Vec<f64>> {
        self.rows.get(index).map(|row| {
            let mut dense = vec![0.0; self.n_features];
            for (i, value) in row.iter() {
                dense[i] = value;
            }
            dense
        })
    }

    /// Concatenate `other`'s columns to the right of this matrix.
    pub fn hstack(&self, other: &FeatureMatrix) -> Result<FeatureMatrix> {
        if self.n_rows() != other.n_rows() {
            return Err(TocsinError::internal(format!(
                "cannot stack {} rows next to {} rows",
                self.n_rows(),
                other.n_rows()
            )));
        }

        let offset = self.n_features;
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(left, right)| {
                let mut row = left.clone();
                row.indices.reserve(right.nnz());
                row.values.reserve(right.nnz());
                for (index, value) in right.shifted(offset) {
                    row.indices.push(index);
                    row.values.push(value);
                }
                row
            })
            .collect();

        Ok(FeatureMatrix {
            n_features: self.n_features + other.n_features,
            rows,
        })
    }

    /// Copy the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            n_features: self.n_features,
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Column-major view with each column's entries sorted by value.
    pub fn sorted_columns(&self) -> SortedColumns {
        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.n_features];
        for (row_index, row) in self.rows.iter().enumerate() {
            for (feature, value) in row.iter() {
                columns[feature].push((row_index, value));
            }
        }
        for column in &mut columns {
            column.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        }

        SortedColumns {
            n_rows: self.n_rows(),
            columns,
        }
    }
}

/// Non-zero entries of each column as `(row, value)`, sorted by value.
///
/// Rows absent from a column hold an implicit zero.
#[derive(Clone, Debug)]
pub struct SortedColumns {
    n_rows: usize,
    columns: Vec<Vec<(usize, f64)>>,
}

impl SortedColumns {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, feature: usize) -> &[(usize, f64)] {
        self.columns.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A dense 0/1 matrix with one named column per category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMatrix {
    categories: Vec<String>,
    rows: Vec<Vec<u8>>,
}

impl LabelMatrix {
    /// Build a label matrix, checking row widths and that every cell is 0 or 1.
    pub fn new(categories: Vec<String>, rows: Vec<Vec<u8>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != categories.len() {
                return Err(TocsinError::schema_mismatch(format!(
                    "label row {i} has {} values for {} categories",
                    row.len(),
                    categories.len()
                )));
            }
            if let Some(bad) = row.iter().find(|&&v| v > 1) {
                return Err(TocsinError::dataset(format!(
                    "label row {i} holds {bad}; labels must be 0 or 1"
                )));
            }
        }
        Ok(LabelMatrix { categories, rows })
    }

    /// An empty matrix over the given categories.
    pub fn empty(categories: Vec<String>) -> Self {
        LabelMatrix {
            categories,
            rows: Vec::new(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[u8]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Copy of one category's column.
    pub fn column(&self, column: usize) -> Vec<u8> {
        self.rows
            .iter()
            .map(|row| row.get(column).copied().unwrap_or(0))
            .collect()
    }

    /// Build a matrix from per-category columns of equal length.
    pub fn from_columns(categories: Vec<String>, columns: &[Vec<u8>]) -> Result<Self> {
        if columns.len() != categories.len() {
            return Err(TocsinError::schema_mismatch(format!(
                "{} label columns for {} categories",
                columns.len(),
                categories.len()
            )));
        }
        let n_rows = columns.first().map(Vec::len).unwrap_or(0);
        if columns.iter().any(|c| c.len() != n_rows) {
            return Err(TocsinError::internal("label columns differ in length"));
        }

        let rows = (0..n_rows)
            .map(|r| columns.iter().map(|c| c[r]).collect())
            .collect();
        Self::new(categories, rows)
    }

    /// Copy the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> LabelMatrix {
        LabelMatrix {
            categories: self.categories.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Names of the categories set in one row.
    pub fn active_categories(&self, row: usize) -> Vec<&str> {
        self.rows
            .get(row)
            .map(|r| {
                r.iter()
                    .zip(&self.categories)
                    .filter(|(v, _)| **v == 1)
                    .map(|(_, name)| name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sparse_vector_from_pairs() {
        let v = SparseVector::from_pairs(vec![(3, 1.0), (0, 2.0), (3, 1.0), (5, 0.0)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(0), 2.0);
        assert_eq!(v.get(3), 2.0);
        assert_eq!(v.get(5), 0.0);
        assert_eq!(v.get(1), 0.0);
    }

    #[test]
    fn test_sparse_vector_push_order() {
        let mut v = SparseVector::new();
        v.push(1, 1.0).unwrap();
        v.push(4, 2.0).unwrap();
        assert!(v.push(2, 1.0).is_err());
    }

    #[test]
    fn test_normalize() {
        let mut v = SparseVector::from_pairs(vec![(0, 3.0), (1, 4.0)]);
        v.normalize();
        assert!((v.get(0) - 0.6).abs() < 1e-12);
        assert!((v.get(1) - 0.8).abs() < 1e-12);

        let mut zero = SparseVector::new();
        zero.normalize();
        assert!(zero.is_empty());
    }

    #[test]
    fn test_hstack() {
        let left = FeatureMatrix::from_dense(&[vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let right = FeatureMatrix::from_dense(&[vec![1.0], vec![0.0]]).unwrap();
        let stacked = left.hstack(&right).unwrap();

        assert_eq!(stacked.n_features(), 3);
        assert_eq!(stacked.dense_row(0).unwrap(), vec![1.0, 0.0, 1.0]);
        assert_eq!(stacked.dense_row(1).unwrap(), vec![0.0, 2.0, 0.0]);

        let short = FeatureMatrix::from_dense(&[vec![1.0]]).unwrap();
        assert!(left.hstack(&short).is_err());
    }

    #[test]
    fn test_out_of_range_row() {
        let mut matrix = FeatureMatrix::new(2);
        assert!(matrix.push_row(SparseVector::from_pairs(vec![(2, 1.0)])).is_err());
    }

    #[test]
    fn test_sorted_columns() {
        let matrix =
            FeatureMatrix::from_dense(&[vec![3.0, 0.0], vec![1.0, 0.0], vec![2.0, 5.0]]).unwrap();
        let columns = matrix.sorted_columns();

        assert_eq!(columns.n_rows(), 3);
        assert_eq!(columns.column(0), &[(1, 1.0), (2, 2.0), (0, 3.0)]);
        assert_eq!(columns.column(1), &[(2, 5.0)]);
        assert!(columns.column(7).is_empty());
    }

    #[test]
    fn test_label_matrix_validation() {
        let ok = LabelMatrix::new(names(&["a", "b"]), vec![vec![0, 1], vec![1, 1]]).unwrap();
        assert_eq!(ok.column(0), vec![0, 1]);
        assert_eq!(ok.active_categories(0), vec!["b"]);

        let bad_value = LabelMatrix::new(names(&["a"]), vec![vec![2]]);
        assert!(matches!(bad_value, Err(TocsinError::Dataset(_))));

        let bad_width = LabelMatrix::new(names(&["a", "b"]), vec![vec![1]]);
        assert!(matches!(bad_width, Err(TocsinError::SchemaMismatch(_))));
    }

    #[test]
    fn test_label_matrix_columns() {
        let matrix =
            LabelMatrix::from_columns(names(&["a", "b"]), &[vec![1, 0, 1], vec![0, 0, 1]]).unwrap();
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.row(2).unwrap(), &[1, 1]);

        let subset = matrix.select_rows(&[2, 0]);
        assert_eq!(subset.rows(), &[vec![1, 1], vec![1, 0]]);
    }
}
