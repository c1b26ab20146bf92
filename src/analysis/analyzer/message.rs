//! The analyzer used for disaster-response message text.
//!
//! # Pipeline
//!
//! 1. PatternReplaceCharFilter (web links become `urlplaceholder`)
//! 2. WordTokenizer (Unicode words, contractions split into clitics)
//! 3. LemmaFilter (English lemmatizer)
//! 4. NormalizeFilter (lowercase, trim, drop blanks)
//!
//! # Examples
//!
//! ```
//! use tocsin::analysis::analyzer::tokenize;
//!
//! let tokens = tokenize("Check http://example.com now").unwrap();
//! assert_eq!(tokens, vec!["check", "urlplaceholder", "now"]);
//! ```

use std::sync::{Arc, LazyLock};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::{LemmaFilter, NormalizeFilter};
use crate::analysis::tokenizer::WordTokenizer;
use crate::error::Result;

static SHARED: LazyLock<MessageAnalyzer> = LazyLock::new(MessageAnalyzer::new);

/// Analyzer that normalizes one message into vocabulary tokens.
#[derive(Clone, Debug)]
pub struct MessageAnalyzer {
    inner: PipelineAnalyzer,
}

impl MessageAnalyzer {
    /// Create a new message analyzer.
    pub fn new() -> Self {
        let analyzer = PipelineAnalyzer::new(Arc::new(WordTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::urls()))
            .add_filter(Arc::new(LemmaFilter::new()))
            .add_filter(Arc::new(NormalizeFilter::new()))
            .with_name("message");

        MessageAnalyzer { inner: analyzer }
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }

    /// The process-wide analyzer instance.
    pub fn shared() -> &'static MessageAnalyzer {
        &SHARED
    }
}

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for MessageAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "message"
    }
}

/// Analyze a message into full tokens, surface text included.
pub fn analyze_message(text: &str) -> Result<Vec<Token>> {
    Ok(MessageAnalyzer::shared().analyze(text)?.collect())
}

/// Normalize a message into its ordered vocabulary tokens.
///
/// The same message always yields the same tokens. Text without any word
/// characters yields an empty list.
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    MessageAnalyzer::shared().terms(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_analyzer() {
        let tokens = tokenize("We need water and food in Leogane").unwrap();
        assert_eq!(
            tokens,
            vec!["we", "need", "water", "and", "food", "in", "leogane"]
        );
    }

    #[test]
    fn test_lemmatized_and_lowercased() {
        let tokens = tokenize("Houses are flooded, families need TENTS").unwrap();
        assert_eq!(
            tokens,
            vec!["house", "are", "flood", "family", "need", "tent"]
        );
    }

    #[test]
    fn test_url_replacement() {
        let tokens = tokenize("Check http://example.com now").unwrap();
        assert_eq!(tokens, vec!["check", "urlplaceholder", "now"]);
    }

    #[test]
    fn test_contractions() {
        let tokens = tokenize("We can't find shelter").unwrap();
        assert_eq!(tokens, vec!["we", "ca", "n't", "find", "shelter"]);
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("?! ... ,").unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "RT @redcross: Volunteers needed at http://t.co/abc #haiti";
        assert_eq!(tokenize(text).unwrap(), tokenize(text).unwrap());
    }

    #[test]
    fn test_surface_text_kept() {
        let tokens = analyze_message("RT Families stranded").unwrap();
        assert_eq!(tokens[0].text, "rt");
        assert_eq!(tokens[0].surface(), "RT");
        assert_eq!(tokens[1].text, "family");
        assert_eq!(tokens[1].surface(), "Families");
    }
}
