//! Text analysis for message classification.
//!
//! This module provides tokenization, token filtering, lemmatization and
//! part-of-speech tagging, and the analyzer pipeline that ties them together.

pub mod analyzer;
pub mod char_filter;
pub mod tagger;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::{Analyzer, MessageAnalyzer, PipelineAnalyzer, analyze_message, tokenize};
pub use tagger::{LexiconTagger, PosTag, PosTagger};
pub use token::{Token, TokenKind, TokenStream};
