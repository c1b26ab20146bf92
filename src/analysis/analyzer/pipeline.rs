//! An analyzer assembled from char filters, one tokenizer and token filters.
//!
//! Stages run in the order they were added. Token offsets are mapped back
//! through every char filter's [`OffsetMap`], so they always index the text
//! given to [`Analyzer::analyze`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use tocsin::analysis::analyzer::{Analyzer, PipelineAnalyzer};
//! use tocsin::analysis::token_filter::NormalizeFilter;
//! use tocsin::analysis::tokenizer::WordTokenizer;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(WordTokenizer::new()))
//!     .add_filter(Arc::new(NormalizeFilter::new()));
//!
//! assert_eq!(analyzer.terms("Need WATER").unwrap(), vec!["need", "water"]);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::{CharFilter, OffsetMap};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

#[derive(Clone)]
pub struct PipelineAnalyzer {
    name: String,
    char_filters: Vec<Arc<dyn CharFilter>>,
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
}

impl PipelineAnalyzer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: tokenizer.name().to_string(),
            char_filters: Vec::new(),
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Label used in `Debug` output.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    /// Run the char filters, keeping the maps that actually moved offsets.
    fn rewrite<'a>(&self, text: &'a str) -> (Cow<'a, str>, Vec<OffsetMap>) {
        let mut maps = Vec::new();
        let mut current = Cow::Borrowed(text);
        for char_filter in &self.char_filters {
            let (next, map) = char_filter.filter(&current);
            if !map.is_identity() {
                maps.push(map);
            }
            current = Cow::Owned(next);
        }
        (current, maps)
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let (rewritten, maps) = self.rewrite(text);

        let tokens = self
            .filters
            .iter()
            .try_fold(self.tokenizer.tokenize(&rewritten)?, |tokens, filter| {
                filter.filter(tokens)
            })?;

        if maps.is_empty() {
            return Ok(tokens);
        }
        Ok(Box::new(tokens.map(move |mut token| {
            // Last char filter first.
            for map in maps.iter().rev() {
                token.start_offset = map.source_offset(token.start_offset);
                token.end_offset = map.source_offset(token.end_offset);
            }
            token
        })))
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let char_filters: Vec<_> = self.char_filters.iter().map(|c| c.name()).collect();
        let filters: Vec<_> = self.filters.iter().map(|c| c.name()).collect();
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("char_filters", &char_filters)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &filters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
    use crate::analysis::token::Token;
    use crate::analysis::token_filter::{LemmaFilter, NormalizeFilter};
    use crate::analysis::tokenizer::WordTokenizer;

    fn words() -> PipelineAnalyzer {
        PipelineAnalyzer::new(Arc::new(WordTokenizer::new()))
    }

    #[test]
    fn test_filters_run_in_order() {
        let analyzer = words()
            .add_filter(Arc::new(LemmaFilter::new()))
            .add_filter(Arc::new(NormalizeFilter::new()));

        assert_eq!(
            analyzer.terms("Families NEED Tents, BLANKETS!").unwrap(),
            vec!["family", "need", "tent", "blanket"]
        );
    }

    #[test]
    fn test_shrinking_char_filter() {
        let analyzer = words()
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new("-", "").unwrap()));

        let tokens: Vec<Token> = analyzer.analyze("pre-war 80-90").unwrap().collect();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["prewar", "8090"]);
        assert_eq!((tokens[0].start_offset, tokens[0].end_offset), (0, 7));
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (8, 13));
    }

    #[test]
    fn test_offsets_point_into_caller_text() {
        let analyzer = words().add_char_filter(Arc::new(PatternReplaceCharFilter::urls()));

        let text = "see http://a.io now";
        let tokens: Vec<Token> = analyzer.analyze(text).unwrap().collect();
        assert_eq!(tokens[1].text, "urlplaceholder");
        assert_eq!(&text[tokens[1].start_offset..tokens[1].end_offset], "http://a.io");
        assert_eq!(&text[tokens[2].start_offset..tokens[2].end_offset], "now");
    }

    #[test]
    fn test_debug_lists_stages() {
        let analyzer = words()
            .add_filter(Arc::new(NormalizeFilter::new()))
            .with_name("plain");
        let debug = format!("{analyzer:?}");
        assert!(debug.contains("plain"));
        assert!(debug.contains("normalize"));
        assert_eq!(analyzer.label(), "plain");
    }
}
