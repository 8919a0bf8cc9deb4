//! Lightweight part-of-speech annotation.
//!
//! The outline builder only needs coarse counts (nouns, verbs, numbers) per
//! line, so annotation sits behind the [`Annotator`] trait. Callers build one
//! annotator per process and share it across documents; implementations must
//! be usable concurrently without mutation.

use std::sync::OnceLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Coarse universal part-of-speech categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Noun,
    Verb,
    Num,
    Adj,
    Adv,
    Pron,
    Det,
    Adp,
    Conj,
    Aux,
    Punct,
    Other,
}

/// Per-line token counts consumed by feature extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosCounts {
    pub nouns: usize,
    pub verbs: usize,
    pub numbers: usize,
}

impl PosCounts {
    pub fn from_tags(tags: &[PosTag]) -> Self {
        tags.iter().fold(PosCounts::default(), |mut acc, tag| {
            match tag {
                PosTag::Noun => acc.nouns += 1,
                PosTag::Verb => acc.verbs += 1,
                PosTag::Num => acc.numbers += 1,
                _ => {}
            }
            acc
        })
    }
}

pub trait Annotator: Send + Sync {
    /// Tag every token of `text`. Must not panic on any input.
    fn tag(&self, text: &str) -> Vec<PosTag>;

    fn counts(&self, text: &str) -> PosCounts {
        PosCounts::from_tags(&self.tag(text))
    }
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "all", "both", "either", "neither", "another", "such",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "you", "your", "yours", "he", "him", "his", "she", "her", "hers",
    "it", "its", "we", "us", "our", "ours", "they", "them", "their", "theirs", "who", "whom",
    "whose", "which", "what", "itself", "themselves", "ourselves", "yourself",
];

const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "from", "to", "into", "onto", "over", "under",
    "about", "above", "below", "between", "among", "through", "during", "before", "after",
    "against", "without", "within", "across", "per", "via", "upon", "toward", "towards",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "if", "because", "although", "while", "whereas",
    "unless", "than", "whether",
];

const AUXILIARIES: &[&str] = &[
    "be", "is", "are", "was", "were", "been", "being", "am", "have", "has", "had", "do", "does",
    "did", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
];

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "twenty", "thirty", "forty", "fifty", "hundred", "thousand", "million",
    "billion",
];

/// Base forms of verbs common in structured documents.
const VERBS: &[&str] = &[
    "make", "use", "provide", "include", "describe", "define", "develop", "apply", "submit",
    "review", "require", "support", "ensure", "create", "build", "manage", "implement", "read",
    "write", "see", "get", "give", "take", "show", "find", "know", "go", "come", "work", "help",
    "learn", "understand", "explain", "identify", "evaluate", "complete", "perform", "follow",
    "contain", "consider", "allow", "establish", "maintain", "improve", "prepare", "present",
    "propose", "select", "assess", "determine", "list", "meet", "run", "set", "start", "begin",
    "continue", "achieve", "deliver", "design", "plan", "test", "report", "receive", "become",
    "remain", "keep", "let", "need", "want", "seem", "call", "ask", "tell", "feel", "leave",
    "bring", "hold", "turn", "move", "live", "believe", "happen", "appear", "change", "serve",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ical"];

/// Rule-based annotator driven by closed-class word lists and suffix cues.
///
/// Tokens are split on Unicode word boundaries. Anything alphabetic that no
/// rule claims is tagged as a noun, which keeps non-English text from ever
/// failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnnotator;

impl LexiconAnnotator {
    pub fn new() -> Self {
        Self
    }

    fn tag_token(token: &str) -> PosTag {
        if !token.chars().any(char::is_alphanumeric) {
            return PosTag::Punct;
        }
        if is_numeric_token(token) {
            return PosTag::Num;
        }

        let lower = token.to_lowercase();
        let word = lower.as_str();

        if DETERMINERS.contains(&word) {
            PosTag::Det
        } else if PRONOUNS.contains(&word) {
            PosTag::Pron
        } else if ADPOSITIONS.contains(&word) {
            PosTag::Adp
        } else if CONJUNCTIONS.contains(&word) {
            PosTag::Conj
        } else if AUXILIARIES.contains(&word) {
            PosTag::Aux
        } else if NUMBER_WORDS.contains(&word) {
            PosTag::Num
        } else if is_known_verb(word) {
            PosTag::Verb
        } else if word.len() > 4 && word.ends_with("ly") {
            PosTag::Adv
        } else if ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| word.len() > suffix.len() + 2 && word.ends_with(suffix))
        {
            PosTag::Adj
        } else if word.len() > 5 && (word.ends_with("ing") || word.ends_with("ed")) {
            PosTag::Verb
        } else if word.chars().any(char::is_alphabetic) {
            PosTag::Noun
        } else {
            PosTag::Other
        }
    }
}

impl Annotator for LexiconAnnotator {
    fn tag(&self, text: &str) -> Vec<PosTag> {
        text.split_word_bounds()
            .filter(|token| !token.trim().is_empty())
            .map(Self::tag_token)
            .collect()
    }
}

/// Digits (with separators), ordinals like `3rd`, or roman numerals from
/// II to XCIX. Single letters stay words ("I", "X").
fn is_numeric_token(token: &str) -> bool {
    if token.chars().next().is_some_and(|c| c.is_numeric()) {
        return true;
    }
    static RE_ROMAN: OnceLock<Regex> = OnceLock::new();
    let re = RE_ROMAN.get_or_init(|| Regex::new(r"^(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$").unwrap());
    token.len() >= 2 && re.is_match(token)
}

/// Match the base form or a regular inflection of a lexicon verb.
fn is_known_verb(word: &str) -> bool {
    if VERBS.contains(&word) {
        return true;
    }
    let mut stems: Vec<String> = ["s", "es", "ed", "d", "ing"]
        .iter()
        .filter_map(|suffix| word.strip_suffix(*suffix))
        .map(str::to_string)
        .collect();
    if let Some(stem) = word.strip_suffix("ing") {
        stems.push(format!("{stem}e"));
    }
    stems.iter().any(|stem| VERBS.contains(&stem.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<PosTag> {
        LexiconAnnotator::new().tag(text)
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(tags("").is_empty());
        assert_eq!(LexiconAnnotator::new().counts("   "), PosCounts::default());
    }

    #[test]
    fn test_punctuation_only() {
        assert!(tags("... !!").iter().all(|t| *t == PosTag::Punct));
    }

    #[test]
    fn test_numbers_detected() {
        let counts = LexiconAnnotator::new().counts("Chapter 2.1 covers 3rd quarter and IV");
        assert_eq!(counts.numbers, 3);
    }

    #[test]
    fn test_roman_numerals_must_be_well_formed() {
        for numeral in ["II", "IV", "XII", "XLIX", "XC"] {
            assert_eq!(tags(numeral), vec![PosTag::Num], "{numeral}");
        }
        for word in ["DID", "MIX", "CIVIL", "MID", "IIII", "VX"] {
            assert_ne!(tags(word), vec![PosTag::Num], "{word}");
        }
    }

    #[test]
    fn test_closed_class_words_are_not_nouns() {
        assert_eq!(tags("the of and it"), vec![
            PosTag::Det,
            PosTag::Adp,
            PosTag::Conj,
            PosTag::Pron
        ]);
    }

    #[test]
    fn test_verbs_and_inflections() {
        assert_eq!(tags("provides"), vec![PosTag::Verb]);
        assert_eq!(tags("reviewed"), vec![PosTag::Verb]);
        assert_eq!(tags("making"), vec![PosTag::Verb]);
    }

    #[test]
    fn test_counts_for_heading_like_line() {
        let counts = LexiconAnnotator::new().counts("Introduction to the Project Budget");
        assert_eq!(counts.nouns, 3);
        assert_eq!(counts.verbs, 0);
        assert_eq!(counts.numbers, 0);
    }

    #[test]
    fn test_mixed_script_does_not_panic() {
        let counts = LexiconAnnotator::new().counts("概要 Overview — résumé 2024");
        assert_eq!(counts.numbers, 1);
        assert!(counts.nouns >= 2);
    }

    #[test]
    fn test_pos_counts_from_tags() {
        let counts = PosCounts::from_tags(&[PosTag::Noun, PosTag::Verb, PosTag::Noun, PosTag::Adj]);
        assert_eq!(counts, PosCounts {
            nouns: 2,
            verbs: 1,
            numbers: 0
        });
    }
}
