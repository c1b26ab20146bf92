//! Case folding and whitespace trimming.

use super::Filter;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Lowercases each token and trims surrounding whitespace. Tokens left with
/// no text are dropped.
///
/// Works lazily over the stream; the surface text and offsets of every
/// surviving token are untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizeFilter;

impl NormalizeFilter {
    pub fn new() -> Self {
        NormalizeFilter
    }

    fn normalize(token: Token) -> Option<Token> {
        let trimmed = token.text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.len() == token.text.len() && !trimmed.chars().any(char::is_uppercase) {
            return Some(token);
        }
        let folded = trimmed.to_lowercase();
        Some(token.rewrite(folded))
    }
}

impl Filter for NormalizeFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.filter_map(Self::normalize)))
    }

    fn name(&self) -> &'static str {
        "normalize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(texts: &[&str]) -> Vec<Token> {
        let tokens: Vec<Token> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Token::new(*text, i, 0))
            .collect();
        NormalizeFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect()
    }

    #[test]
    fn test_folds_and_trims() {
        let tokens = run(&["Leogane", " WATER ", "tents"]);
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["leogane", "water", "tents"]);
        assert_eq!(tokens[0].surface(), "Leogane");
        assert!(!tokens[2].is_rewritten());
    }

    #[test]
    fn test_blank_tokens_dropped() {
        let tokens = run(&["  ", "help", ""]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].position, 1);
    }

    #[test]
    fn test_non_ascii_case() {
        let tokens = run(&["ÉCOLE"]);
        assert_eq!(tokens[0].text, "école");
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(NormalizeFilter::new().name(), "normalize");
    }
}
