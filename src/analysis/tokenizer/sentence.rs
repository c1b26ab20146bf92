//! Sentence tokenizer implementation.
//!
//! Splits text into sentences using the Unicode sentence boundary rules
//! (UAX #29). Each emitted token holds one trimmed sentence.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenKind, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that emits one token per sentence.
#[derive(Clone, Debug, Default)]
pub struct SentenceTokenizer;

impl SentenceTokenizer {
    /// Create a new sentence tokenizer.
    pub fn new() -> Self {
        SentenceTokenizer
    }

    /// Split text into sentence strings.
    pub fn sentences(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(text)?.map(|t| t.text).collect())
    }
}

impl Tokenizer for SentenceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();

        for (start, sentence) in text.split_sentence_bound_indices() {
            let trimmed = sentence.trim_start();
            let leading = sentence.len() - trimmed.len();
            let trimmed = trimmed.trim_end();
            if trimmed.is_empty() {
                continue;
            }

            tokens.push(
                Token::new(trimmed, tokens.len(), start + leading).with_kind(TokenKind::Sentence),
            );
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "sentence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_split() {
        let sentences = SentenceTokenizer::new()
            .sentences("The shelter is full. Go to the school!  Is there water?")
            .unwrap();

        assert_eq!(
            sentences,
            vec!["The shelter is full.", "Go to the school!", "Is there water?"]
        );
    }

    #[test]
    fn test_sentence_offsets() {
        let tokens: Vec<Token> = SentenceTokenizer::new()
            .tokenize("Help.  Now.")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "Now.");
        assert_eq!(tokens[1].start_offset, 7);
        assert_eq!(tokens[1].end_offset, 11);
    }

    #[test]
    fn test_blank_input_has_no_sentences() {
        assert!(SentenceTokenizer::new().sentences("   ").unwrap().is_empty());
        assert!(SentenceTokenizer::new().sentences("").unwrap().is_empty());
    }
}
