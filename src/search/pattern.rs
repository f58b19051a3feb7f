//! Search pattern compilation and per-row matching.
//!
//! Patterns compile through the ripgrep core matcher stack (`grep-regex` on
//! top of `grep-matcher`). Matching happens row by row against the wrapped
//! display rows, left to right, which is what gives hits their
//! (line, sub-row, column) identity.

use crate::error::{PagerError, Result};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};

/// Search behavior switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_insensitive: bool,
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    matcher: RegexMatcher,
    text: String,
}

impl SearchPattern {
    /// Compile `pattern`; a malformed pattern yields
    /// [`PagerError::InvalidPattern`] and the caller keeps its previous
    /// highlight state.
    pub fn compile(pattern: &str, options: &SearchOptions) -> Result<Self> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(options.case_insensitive)
            .build(pattern)
            .map_err(|err| PagerError::invalid_pattern(pattern, err))?;
        Ok(Self {
            matcher,
            text: pattern.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte ranges of all matches within one display row, left to right.
    pub fn row_matches(&self, row: &str) -> Vec<(usize, usize)> {
        let haystack = row.as_bytes();
        let mut matches = Vec::new();
        let mut at = 0;
        while at <= haystack.len() {
            match self.matcher.find_at(haystack, at) {
                Ok(Some(found)) => {
                    matches.push((found.start(), found.end()));
                    // Step past empty matches so the scan always advances.
                    at = if found.end() > found.start() {
                        found.end()
                    } else {
                        found.end() + 1
                    };
                }
                _ => break,
            }
        }
        matches
    }

    pub fn is_match(&self, text: &str) -> bool {
        matches!(self.matcher.find(text.as_bytes()), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> SearchPattern {
        SearchPattern::compile(pattern, &SearchOptions::default()).unwrap()
    }

    #[test]
    fn finds_all_matches_left_to_right() {
        let pattern = compile("ab");
        assert_eq!(pattern.row_matches("ab xx ab"), vec![(0, 2), (6, 8)]);
        assert!(pattern.row_matches("nothing here").is_empty());
    }

    #[test]
    fn regex_syntax_is_supported() {
        let pattern = compile(r"\d+");
        assert_eq!(pattern.row_matches("a1b22c"), vec![(1, 2), (3, 5)]);
    }

    #[test]
    fn case_insensitive_option() {
        let options = SearchOptions {
            case_insensitive: true,
        };
        let pattern = SearchPattern::compile("error", &options).unwrap();
        assert!(pattern.is_match("ERROR: boom"));
        assert_eq!(pattern.row_matches("Error error"), vec![(0, 5), (6, 11)]);
    }

    #[test]
    fn invalid_pattern_is_recoverable() {
        let err = SearchPattern::compile("(", &SearchOptions::default()).unwrap_err();
        match err {
            PagerError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "("),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn multibyte_rows_report_byte_columns() {
        let pattern = compile("träff");
        // 'ä' is two bytes; the match spans 6 bytes starting at byte 1.
        assert_eq!(pattern.row_matches("2träff"), vec![(1, 7)]);
    }
}
