//! Analyzer implementations that combine tokenizers and filters.

mod analyzer;
mod message;
mod pipeline;

pub use analyzer::Analyzer;
pub use message::{MessageAnalyzer, analyze_message, tokenize};
pub use pipeline::PipelineAnalyzer;
