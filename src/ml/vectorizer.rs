//! Bag-of-words vectorization with optional tf-idf weighting.
//!
//! [`CountVectorizer`] learns an alphabetically ordered vocabulary from the
//! tokens of the training messages and counts occurrences; [`TfidfTransformer`]
//! re-weights those counts and L2-normalizes each row. [`TextVectorizer`]
//! chains the two as one feature stage.

use std::collections::BTreeMap;

use ahash::AHashSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::tokenize;
use crate::error::{Result, TocsinError};
use crate::ml::matrix::{FeatureMatrix, SparseVector};
use crate::ml::transform::Transformer;

fn tokenize_all(documents: &[String]) -> Result<Vec<Vec<String>>> {
    documents.iter().map(|doc| tokenize(doc)).collect()
}

/// Token counting over a vocabulary frozen at fit time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CountVectorizer {
    /// term -> column index, columns assigned in term order
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    /// Create an unfitted count vectorizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the vocabulary from tokenized documents.
    pub fn fit_tokens(&mut self, documents: &[Vec<String>]) -> Result<()> {
        let mut terms: AHashSet<&str> = AHashSet::new();
        for tokens in documents {
            terms.extend(tokens.iter().map(String::as_str));
        }

        if terms.is_empty() {
            return Err(TocsinError::empty_vocabulary(format!(
                "no tokens found in {} training documents",
                documents.len()
            )));
        }

        let mut sorted: Vec<&str> = terms.into_iter().collect();
        sorted.sort_unstable();
        self.vocabulary = sorted
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        debug!("Learned vocabulary of {} terms", self.vocabulary.len());
        Ok(())
    }

    /// Count vocabulary terms in tokenized documents. Unknown terms are ignored.
    pub fn transform_tokens(&self, documents: &[Vec<String>]) -> Result<FeatureMatrix> {
        let mut matrix = FeatureMatrix::new(self.vocabulary.len());
        for tokens in documents {
            let pairs = tokens
                .iter()
                .filter_map(|token| self.vocabulary.get(token).map(|&index| (index, 1.0)))
                .collect();
            matrix.push_row(SparseVector::from_pairs(pairs))?;
        }
        Ok(matrix)
    }

    /// Column index of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Vocabulary terms in column order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Tf-idf re-weighting with smoothed idf and L2 row normalization.
///
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`. With `use_idf` off the rows are
/// only normalized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TfidfTransformer {
    use_idf: bool,
    idf: Vec<f64>,
}

impl TfidfTransformer {
    pub fn new(use_idf: bool) -> Self {
        TfidfTransformer {
            use_idf,
            idf: Vec::new(),
        }
    }

    pub fn use_idf(&self) -> bool {
        self.use_idf
    }

    /// Learned idf weights, empty when idf weighting is off.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Learn document frequencies from a count matrix.
    pub fn fit(&mut self, counts: &FeatureMatrix) {
        if !self.use_idf {
            self.idf.clear();
            return;
        }

        let mut document_frequency = vec![0usize; counts.n_features()];
        for row in counts.rows() {
            for (index, _) in row.iter() {
                document_frequency[index] += 1;
            }
        }

        let n_documents = counts.n_rows() as f64;
        self.idf = document_frequency
            .into_iter()
            .map(|df| ((n_documents + 1.0) / (df as f64 + 1.0)).ln() + 1.0)
            .collect();
    }

    /// Weight and normalize a count matrix.
    pub fn transform(&self, counts: &FeatureMatrix) -> Result<FeatureMatrix> {
        if self.use_idf && self.idf.len() != counts.n_features() {
            return Err(TocsinError::internal(format!(
                "idf fitted on {} columns, got {}",
                self.idf.len(),
                counts.n_features()
            )));
        }

        let rows = counts
            .rows()
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if self.use_idf {
                    row.scale_by(&self.idf);
                }
                row.normalize();
                row
            })
            .collect();
        FeatureMatrix::from_rows(counts.n_features(), rows)
    }
}

/// Text branch of the feature pipeline: counts, then tf-idf.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextVectorizer {
    counts: CountVectorizer,
    tfidf: TfidfTransformer,
}

impl TextVectorizer {
    pub fn new(use_idf: bool) -> Self {
        TextVectorizer {
            counts: CountVectorizer::new(),
            tfidf: TfidfTransformer::new(use_idf),
        }
    }

    pub fn use_idf(&self) -> bool {
        self.tfidf.use_idf()
    }

    pub fn counts(&self) -> &CountVectorizer {
        &self.counts
    }

    pub fn tfidf(&self) -> &TfidfTransformer {
        &self.tfidf
    }

    pub fn vocabulary_size(&self) -> usize {
        self.counts.vocabulary_size()
    }
}

impl Transformer for TextVectorizer {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.fit_transform(documents).map(|_| ())
    }

    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix> {
        let tokens = tokenize_all(documents)?;
        let counts = self.counts.transform_tokens(&tokens)?;
        self.tfidf.transform(&counts)
    }

    fn fit_transform(&mut self, documents: &[String]) -> Result<FeatureMatrix> {
        let tokens = tokenize_all(documents)?;
        self.counts.fit_tokens(&tokens)?;
        let counts = self.counts.transform_tokens(&tokens)?;
        self.tfidf.fit(&counts);
        self.tfidf.transform(&counts)
    }

    fn n_features(&self) -> usize {
        self.counts.vocabulary_size()
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_count_vectorizer_vocabulary_order() {
        let mut vectorizer = TextVectorizer::new(false);
        vectorizer
            .fit(&docs(&["water needed", "send food and water"]))
            .unwrap();

        let terms: Vec<_> = vectorizer.counts().terms().collect();
        // "needed" is lemmatized before it reaches the vocabulary
        assert_eq!(terms, vec!["and", "food", "need", "send", "water"]);
        assert_eq!(vectorizer.n_features(), 5);
    }

    #[test]
    fn test_counts() {
        let mut counts = CountVectorizer::new();
        let tokens = vec![vec!["water".to_string(), "water".to_string(), "food".to_string()]];
        counts.fit_tokens(&tokens).unwrap();
        let matrix = counts.transform_tokens(&tokens).unwrap();

        assert_eq!(matrix.dense_row(0).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_unseen_tokens_are_ignored() {
        let mut vectorizer = TextVectorizer::new(true);
        vectorizer.fit(&docs(&["water", "food"])).unwrap();

        let matrix = vectorizer.transform(&docs(&["helicopter", ""])).unwrap();
        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_features(), 2);
        assert!(matrix.rows().iter().all(|row| row.is_empty()));
    }

    #[test]
    fn test_empty_vocabulary() {
        let mut vectorizer = TextVectorizer::new(true);
        let result = vectorizer.fit(&docs(&["", "?!", "   "]));
        assert!(matches!(result, Err(TocsinError::EmptyVocabulary(_))));
    }

    #[test]
    fn test_idf_weights() {
        let mut vectorizer = TextVectorizer::new(true);
        vectorizer
            .fit(&docs(&["water food", "water", "water"]))
            .unwrap();

        // n = 3; df(food) = 1, df(water) = 3
        let idf = vectorizer.tfidf().idf();
        assert!((idf[0] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!((idf[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        for use_idf in [true, false] {
            let mut vectorizer = TextVectorizer::new(use_idf);
            let matrix = vectorizer
                .fit_transform(&docs(&["water water food", "shelter"]))
                .unwrap();
            for row in matrix.rows() {
                assert!((row.norm() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_raw_frequencies_without_idf() {
        let mut vectorizer = TextVectorizer::new(false);
        let matrix = vectorizer.fit_transform(&docs(&["water water food"])).unwrap();
        let row = matrix.dense_row(0).unwrap();
        // counts (1, 2) normalized by sqrt(5)
        assert!((row[0] - 1.0 / 5f64.sqrt()).abs() < 1e-12);
        assert!((row[1] - 2.0 / 5f64.sqrt()).abs() < 1e-12);
    }
}
