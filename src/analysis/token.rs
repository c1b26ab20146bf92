//! The token that flows from the tokenizers through the token filters.
//!
//! A token keeps two texts: the `surface` form exactly as it appeared in the
//! (char-filtered) message, and the working `text` that filters rewrite. The
//! vectorizer reads `text`; the starting-verb check reads `surface`.
//!
//! ```
//! use tocsin::analysis::token::{Token, TokenKind};
//!
//! let token = Token::new("Families", 1, 4);
//! assert_eq!(token.end_offset, 12);
//! assert_eq!(token.kind, TokenKind::Word);
//!
//! let token = token.rewrite("family");
//! assert_eq!(token.text, "family");
//! assert_eq!(token.surface(), "Families");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a tokenizer recognized a span as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    #[default]
    Word,
    Number,
    /// Split off a contraction: `n't`, `'s`, `'ll` and friends.
    Clitic,
    Sentence,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Index in the token stream.
    pub position: usize,
    /// Byte range in the text handed to the analyzer.
    pub start_offset: usize,
    pub end_offset: usize,
    pub kind: TokenKind,
    surface: String,
}

impl Token {
    /// A word token spanning `surface.len()` bytes from `start_offset`.
    pub fn new<S: Into<String>>(surface: S, position: usize, start_offset: usize) -> Self {
        let surface = surface.into();
        Token {
            text: surface.clone(),
            position,
            start_offset,
            end_offset: start_offset + surface.len(),
            kind: TokenKind::Word,
            surface,
        }
    }

    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.kind = kind;
        self
    }

    /// The text as the tokenizer found it, before any filter ran.
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Replace the working text. Offsets and surface stay put.
    pub fn rewrite<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn is_rewritten(&self) -> bool {
        self.text != self.surface
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokens moving between pipeline stages.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_follows_surface() {
        let token = Token::new("water", 2, 10);
        assert_eq!(token.position, 2);
        assert_eq!((token.start_offset, token.end_offset), (10, 15));
        assert!(!token.is_rewritten());
    }

    #[test]
    fn test_rewrites_keep_surface() {
        let token = Token::new("Running", 0, 0)
            .rewrite("running")
            .rewrite("run");

        assert_eq!(token.text, "run");
        assert_eq!(token.surface(), "Running");
        assert_eq!(token.end_offset, 7);
        assert!(token.is_rewritten());
    }

    #[test]
    fn test_kind() {
        let token = Token::new("n't", 1, 2).with_kind(TokenKind::Clitic);
        assert_eq!(token.kind, TokenKind::Clitic);
        assert_eq!(token.to_string(), "n't");
    }
}
