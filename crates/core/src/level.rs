//! Heading level assignment from numbering prefixes.
//!
//! Purely syntactic: no outline stack is kept, so an `H3` may appear before
//! any `H1`.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::HeadingLevel;

/// Checked in order; the first matching pattern decides the level.
pub const LEVEL_PATTERNS: &[(&str, HeadingLevel)] = &[
    (r"^\d+\.\d+\.", HeadingLevel::H3),
    (r"^\d+\.", HeadingLevel::H2),
    (r"^[A-Z]\.", HeadingLevel::H2),
];

/// Level used when no pattern matches.
pub const DEFAULT_LEVEL: HeadingLevel = HeadingLevel::H1;

fn compiled_patterns() -> &'static [(Regex, HeadingLevel)] {
    static PATTERNS: OnceLock<Vec<(Regex, HeadingLevel)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        LEVEL_PATTERNS
            .iter()
            .map(|(pattern, level)| (Regex::new(pattern).unwrap(), *level))
            .collect()
    })
}

pub fn assign_level(text: &str) -> HeadingLevel {
    compiled_patterns()
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, level)| *level)
        .unwrap_or(DEFAULT_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_part_numbering_with_trailing_dot_is_h3() {
        assert_eq!(assign_level("2.1. Background"), HeadingLevel::H3);
        assert_eq!(assign_level("10.12.3 Deep"), HeadingLevel::H3);
    }

    #[test]
    fn test_two_part_numbering_without_trailing_dot_is_h2() {
        assert_eq!(assign_level("2.1 Background"), HeadingLevel::H2);
    }

    #[test]
    fn test_single_number_is_h2() {
        assert_eq!(assign_level("2. Methods"), HeadingLevel::H2);
    }

    #[test]
    fn test_letter_prefix_is_h2() {
        assert_eq!(assign_level("A. Appendix"), HeadingLevel::H2);
        assert_eq!(assign_level("a. lowercase"), HeadingLevel::H1);
    }

    #[test]
    fn test_unnumbered_is_h1() {
        assert_eq!(assign_level("Introduction"), HeadingLevel::H1);
        assert_eq!(assign_level("1) Parenthesised"), HeadingLevel::H1);
        assert_eq!(assign_level(""), HeadingLevel::H1);
    }

    #[test]
    fn test_every_table_pattern_compiles() {
        assert_eq!(compiled_patterns().len(), LEVEL_PATTERNS.len());
    }
}
