use regex::Regex;

use super::{CharFilter, OffsetMap};
use crate::error::{Result, TocsinError};

/// Matches `http`/`https` links, including percent-encoded bytes.
pub const URL_PATTERN: &str =
    r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+";

/// The token every web link is collapsed into.
pub const URL_PLACEHOLDER: &str = "urlplaceholder";

/// A char filter that replaces text matching a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| TocsinError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
        })
    }

    /// Create the filter that swaps web links for [`URL_PLACEHOLDER`].
    pub fn urls() -> Self {
        Self::new(URL_PATTERN, URL_PLACEHOLDER).expect("URL pattern should be valid")
    }

    /// Get the regex pattern used by this filter.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> (String, OffsetMap) {
        let mut output = String::with_capacity(input.len());
        let mut map = OffsetMap::new();
        let mut copied_to = 0;

        for found in self.pattern.find_iter(input) {
            output.push_str(&input[copied_to..found.start()]);
            let at = output.len();
            output.push_str(&self.replacement);

            if found.len() != self.replacement.len() {
                map.push(found.range(), at..output.len());
            }
            copied_to = found.end();
        }
        output.push_str(&input[copied_to..]);

        (output, map)
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_length_replacement_keeps_offsets() {
        let filter = PatternReplaceCharFilter::new("[0-9]", "#").unwrap();
        let (output, map) = filter.filter("call 911");
        assert_eq!(output, "call ###");
        assert!(map.is_identity());
    }

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        let (output, map) = filter.filter("Year 2024");
        assert_eq!(output, "Year NUM");
        assert_eq!(map.edits().len(), 1);
        assert_eq!(map.edits()[0].from, 5..9);
        assert_eq!(map.edits()[0].to, 5..8);
    }

    #[test]
    fn test_url_placeholder() {
        let filter = PatternReplaceCharFilter::urls();
        let (output, _) = filter.filter("Check http://example.com now");
        assert_eq!(output, "Check urlplaceholder now");

        let (output, map) =
            filter.filter("see https://relief.org/a%20b?x=1 and http://t.co/xyz");
        assert_eq!(output, "see urlplaceholder and urlplaceholder");
        assert_eq!(map.edits().len(), 2);
    }

    #[test]
    fn test_url_placeholder_is_fixed_point() {
        let filter = PatternReplaceCharFilter::urls();
        let (once, _) = filter.filter("water at http://maps.example.org/pin?id=7 please");
        let (twice, map) = filter.filter(&once);
        assert_eq!(once, twice);
        assert!(map.is_identity());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternReplaceCharFilter::new("(unclosed", "x").is_err());
    }
}
