//! Rewrites applied to raw message text before tokenization.
//!
//! A char filter may change the length of the text. It reports every such
//! change as an [`Edit`] in an [`OffsetMap`], which the analyzer uses to
//! point token offsets back into the caller's text.

use std::ops::Range;

pub mod pattern_replace;

/// A span of the input that was replaced by a span of the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub from: Range<usize>,
    pub to: Range<usize>,
}

/// The length-changing edits a char filter made, in text order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetMap {
    edits: Vec<Edit>,
}

impl OffsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit. Edits must be pushed left to right.
    pub fn push(&mut self, from: Range<usize>, to: Range<usize>) {
        self.edits.push(Edit { from, to });
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// True when every output offset equals its input offset.
    pub fn is_identity(&self) -> bool {
        self.edits.is_empty()
    }

    /// Map a byte offset in the filtered text to one in the input.
    ///
    /// Offsets inside a replacement are scaled proportionally onto the span
    /// it replaced.
    pub fn source_offset(&self, offset: usize) -> usize {
        let mut shift = 0isize;
        for edit in &self.edits {
            if offset < edit.to.start {
                break;
            }
            if offset < edit.to.end {
                let into = offset - edit.to.start;
                return edit.from.start + into * edit.from.len() / edit.to.len();
            }
            shift = edit.from.end as isize - edit.to.end as isize;
        }
        offset.saturating_add_signed(shift)
    }
}

/// A rewrite of raw text ahead of the tokenizer.
pub trait CharFilter: Send + Sync {
    /// The rewritten text and how its offsets relate to `input`.
    fn filter(&self, input: &str) -> (String, OffsetMap);

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let map = OffsetMap::new();
        assert!(map.is_identity());
        assert_eq!(map.source_offset(17), 17);
    }

    #[test]
    fn test_shrinking_and_growing_edits() {
        // "ab----cd" -> "ab-XXXXd": the dashes collapse, then "c" grows
        let mut map = OffsetMap::new();
        map.push(2..6, 2..3);
        map.push(6..7, 3..7);

        assert_eq!(map.source_offset(0), 0);
        assert_eq!(map.source_offset(2), 2);
        assert_eq!(map.source_offset(3), 6);
        assert_eq!(map.source_offset(5), 6);
        assert_eq!(map.source_offset(7), 7);
        assert_eq!(map.source_offset(8), 8);
    }
}
