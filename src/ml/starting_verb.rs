//! Starting-verb feature.
//!
//! A message counts as verb-starting when any of its sentences opens with a
//! base-form (`VB`) or non-3rd-person present (`VBP`) verb, or with the
//! retweet marker `RT`. Imperatives ("Send water to Jacmel") are the typical
//! hit. Sentences that produce no tokens are skipped.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::analyze_message;
use crate::analysis::tagger::{LexiconTagger, PosTagger};
use crate::analysis::tokenizer::SentenceTokenizer;
use crate::error::Result;
use crate::ml::matrix::{FeatureMatrix, SparseVector};
use crate::ml::transform::Transformer;

/// Surface form of the retweet marker.
pub const RETWEET_MARKER: &str = "RT";

/// Stateless extractor producing one 0/1 column.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StartingVerbExtractor;

impl StartingVerbExtractor {
    pub fn new() -> Self {
        StartingVerbExtractor
    }

    /// Whether `text` opens any of its sentences with a verb or `RT`.
    pub fn starts_with_verb(&self, text: &str) -> Result<bool> {
        let tagger = LexiconTagger::new();

        for sentence in SentenceTokenizer::new().sentences(text)? {
            let tokens = analyze_message(&sentence)?;
            let Some(first) = tokens.first() else {
                continue;
            };

            if first.surface() == RETWEET_MARKER {
                return Ok(true);
            }

            let words: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
            let tagged = tagger.tag(&words);
            if let Some((word, tag)) = tagged.first() {
                trace!("Sentence opens with {word}/{tag}");
                if tag.is_base_verb() {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// One flag per message, in input order.
    pub fn flags(&self, documents: &[String]) -> Result<Vec<bool>> {
        documents
            .iter()
            .map(|doc| self.starts_with_verb(doc))
            .collect()
    }
}

impl Transformer for StartingVerbExtractor {
    fn fit(&mut self, _documents: &[String]) -> Result<()> {
        Ok(())
    }

    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix> {
        let rows = self
            .flags(documents)?
            .into_iter()
            .map(|flag| {
                if flag {
                    SparseVector::from_pairs(vec![(0, 1.0)])
                } else {
                    SparseVector::new()
                }
            })
            .collect();
        FeatureMatrix::from_rows(1, rows)
    }

    fn n_features(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "starting_verb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(text: &str) -> bool {
        StartingVerbExtractor::new().starts_with_verb(text).unwrap()
    }

    #[test]
    fn test_imperative_opening() {
        assert!(starts("Go to the shelter now."));
        assert!(starts("Please send water and food to Jacmel"));
    }

    #[test]
    fn test_declarative_opening() {
        assert!(!starts("The shelter is full."));
        assert!(!starts("Water is needed in Leogane"));
    }

    #[test]
    fn test_later_sentence_can_trigger() {
        assert!(starts("The bridge collapsed. Help us please!"));
    }

    #[test]
    fn test_retweet_marker() {
        assert!(starts("RT @redcross the roads are closed"));
        assert!(!starts("rt the roads are closed"));
    }

    #[test]
    fn test_empty_sentences_are_skipped() {
        assert!(!starts(""));
        assert!(!starts("... !!! ???"));
        assert!(starts("!!! Help"));
    }

    #[test]
    fn test_transform_column() {
        let extractor = StartingVerbExtractor::new();
        let documents = vec![
            "Send tents".to_string(),
            "The rain stopped".to_string(),
            String::new(),
        ];
        let matrix = extractor.transform(&documents).unwrap();

        assert_eq!(matrix.n_features(), 1);
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.dense_row(0).unwrap(), vec![1.0]);
        assert_eq!(matrix.dense_row(1).unwrap(), vec![0.0]);
        assert_eq!(matrix.dense_row(2).unwrap(), vec![0.0]);
    }
}
