//! Tokenizer implementations for text analysis.
//!
//! - [`word::WordTokenizer`] - Unicode word boundaries with contraction splitting
//! - [`sentence::SentenceTokenizer`] - Unicode sentence boundaries

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod sentence;
pub mod word;

pub use sentence::SentenceTokenizer;
pub use word::WordTokenizer;
