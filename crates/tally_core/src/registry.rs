//! Choice Registry: the ordered choice labels of a proposal.
//!
//! Choices are referenced by zero-based index everywhere else. Wire encodings
//! that are one-based (weighted, approval, ranked-choice) resolve through
//! `resolve_one_based`. Out-of-range indices never panic; they resolve to `None`.

use crate::entities::UNKNOWN_CHOICE;

/// Borrowed view over `Proposal::choices`.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceRegistry<'a> {
    labels: &'a [String],
}

impl<'a> ChoiceRegistry<'a> {
    pub fn new(labels: &'a [String]) -> Self {
        ChoiceRegistry { labels }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &'a [String] {
        self.labels
    }

    pub fn label(&self, index: usize) -> Option<&'a str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label for a resolved index, or `"Unknown Choice"`.
    pub fn label_or_unknown(&self, index: Option<usize>) -> &'a str {
        index.and_then(|i| self.label(i)).unwrap_or(UNKNOWN_CHOICE)
    }

    /// Zero-based wire index → registry index.
    pub fn resolve_zero_based(&self, raw: i64) -> Option<usize> {
        usize::try_from(raw).ok().filter(|&i| i < self.labels.len())
    }

    /// One-based wire index → registry index.
    pub fn resolve_one_based(&self, raw: i64) -> Option<usize> {
        raw.checked_sub(1).and_then(|r| self.resolve_zero_based(r))
    }

    /// First choice whose trimmed label equals `needle`, ignoring ASCII case.
    pub fn find_label(&self, needle: &str) -> Option<usize> {
        let needle = needle.trim();
        self.labels
            .iter()
            .position(|l| l.trim().eq_ignore_ascii_case(needle))
    }
}
