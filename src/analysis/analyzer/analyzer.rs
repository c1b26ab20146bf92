//! The [`Analyzer`] trait: raw message text in, token stream out.
//!
//! ```text
//! text ─ char filters ─ tokenizer ─ token filters ─ tokens
//! ```
//!
//! ```
//! use tocsin::analysis::analyzer::{Analyzer, MessageAnalyzer};
//!
//! let analyzer = MessageAnalyzer::new();
//! assert_eq!(analyzer.terms("Houses Flooded").unwrap(), vec!["house", "flood"]);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Turns one message into tokens. Shared across search workers.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    fn name(&self) -> &'static str;

    /// The working text of every token, in order.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}
