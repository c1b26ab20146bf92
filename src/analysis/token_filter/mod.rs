//! Stages that run on the token stream after the tokenizer.
//!
//! Message text goes through:
//!
//! ```text
//! WordTokenizer → LemmaFilter → NormalizeFilter
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Rewrites or drops tokens. Shared across search workers.
pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    fn name(&self) -> &'static str;
}

pub mod lemma;
pub mod normalize;

pub use lemma::{EnglishLemmatizer, LemmaFilter, Lemmatizer};
pub use normalize::NormalizeFilter;
