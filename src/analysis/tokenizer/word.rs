//! Word tokenizer implementation.
//!
//! Splits text on Unicode word boundaries (UAX #29), drops punctuation and
//! whitespace segments, and splits English contractions into a host word and
//! a clitic the way treebank-style tokenizers do:
//!
//! ```
//! use tocsin::analysis::tokenizer::Tokenizer;
//! use tocsin::analysis::tokenizer::word::WordTokenizer;
//!
//! let tokenizer = WordTokenizer::new();
//! let tokens: Vec<_> = tokenizer
//!     .tokenize("We don't have water!")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(tokens, vec!["We", "do", "n't", "have", "water"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenKind, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Clitic suffixes split off the end of a word, longest first.
const CLITICS: &[&str] = &["n't", "'ll", "'re", "'ve", "'s", "'m", "'d"];

/// A tokenizer that splits text into words and contraction clitics.
#[derive(Clone, Debug, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Create a new word tokenizer.
    pub fn new() -> Self {
        WordTokenizer
    }

    /// Split a contraction into its host and clitic, if it is one.
    ///
    /// Curly apostrophes are matched as well; the returned split index is a
    /// byte offset into `word`.
    fn split_clitic(word: &str) -> Option<usize> {
        let normalized = word.replace('\u{2019}', "'").to_lowercase();
        if normalized.len() != word.len() {
            // Multi-byte apostrophes shift offsets; map through char counts.
            return CLITICS.iter().find_map(|clitic| {
                if normalized.ends_with(clitic) && normalized.len() > clitic.len() {
                    let clitic_chars = clitic.chars().count();
                    let host_chars = word.chars().count() - clitic_chars;
                    word.char_indices().nth(host_chars).map(|(i, _)| i)
                } else {
                    None
                }
            });
        }

        CLITICS.iter().find_map(|clitic| {
            if normalized.ends_with(clitic) && normalized.len() > clitic.len() {
                Some(word.len() - clitic.len())
            } else {
                None
            }
        })
    }

    fn kind_of(word: &str) -> TokenKind {
        if word.starts_with(['\'', '\u{2019}']) || word.eq_ignore_ascii_case("n't") {
            TokenKind::Clitic
        } else if word.chars().all(|c| c.is_numeric() || c == '.' || c == ',') {
            TokenKind::Number
        } else {
            TokenKind::Word
        }
    }

    fn push(tokens: &mut Vec<Token>, word: &str, start: usize) {
        tokens.push(Token::new(word, tokens.len(), start).with_kind(Self::kind_of(word)));
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();

        for (start, word) in text.split_word_bound_indices() {
            // Only keep actual words (not whitespace or punctuation)
            if !word.chars().any(|c| c.is_alphanumeric()) {
                continue;
            }

            match Self::split_clitic(word) {
                Some(split) if split > 0 => {
                    let (host, clitic) = word.split_at(split);
                    if host.chars().any(|c| c.is_alphanumeric()) {
                        Self::push(&mut tokens, host, start);
                    }
                    Self::push(&mut tokens, clitic, start + split);
                }
                _ => Self::push(&mut tokens, word, start),
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word"
    }
}
