//! Per-line feature extraction.
//!
//! Turns a [`LineRecord`] plus the running [`PageContext`] into a fixed-shape
//! [`FeatureRecord`]. Extraction is pure: the only cross-line state is the
//! previous line's bottom coordinate, threaded explicitly through
//! [`PageContext::advance`].

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::annotate::Annotator;
use crate::config::OutlineConfig;
use crate::types::{BoundingBox, LineRecord, FLAG_BOLD, FLAG_ITALIC};

/// Layout state carried from one line to the next within a page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageContext {
    /// Bottom `y` of the previous line; 0 means no previous line.
    pub prev_bottom: f32,
}

impl PageContext {
    /// Context for the first line of a page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the line following one with bounding box `bbox`.
    pub fn advance(self, bbox: &BoundingBox) -> Self {
        Self {
            prev_bottom: bbox.y1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub rel_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_centered: bool,
    pub line_ratio: f32,
    pub indent: f32,
    pub space_above: f32,
    pub is_all_caps: bool,
    pub is_title_case: bool,
    pub first_word_caps: bool,
    pub ends_with_colon: bool,
    pub starts_num: bool,
    pub starts_bullet: bool,
    pub word_count: usize,
    pub char_count: usize,
    pub is_first_page: bool,
    pub noun_count: usize,
    pub verb_count: usize,
    pub num_count: usize,
}

pub struct FeatureExtractor<'a> {
    annotator: &'a dyn Annotator,
    config: &'a OutlineConfig,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(annotator: &'a dyn Annotator, config: &'a OutlineConfig) -> Self {
        Self { annotator, config }
    }

    pub fn extract(&self, line: &LineRecord<'_>, ctx: &PageContext) -> FeatureRecord {
        let text = line.text.as_str();
        let flags = line.flags();
        let bbox = &line.bbox;
        let page_width = line.geometry.width;

        let is_centered =
            (bbox.center_x() - line.geometry.center_x()).abs() < self.config.center_tolerance;

        let first_word_caps = text
            .split_whitespace()
            .next()
            .and_then(|w| w.chars().next())
            .is_some_and(char::is_uppercase);

        let counts = self.annotator.counts(text);

        FeatureRecord {
            rel_size: line.max_size() / self.config.body_font_size,
            is_bold: flags & FLAG_BOLD != 0,
            is_italic: flags & FLAG_ITALIC != 0,
            is_centered,
            line_ratio: safe_ratio(bbox.width(), page_width),
            indent: safe_ratio(bbox.x0, page_width),
            space_above: space_above(bbox, ctx.prev_bottom),
            is_all_caps: is_all_caps(text),
            is_title_case: is_title_case(text),
            first_word_caps,
            ends_with_colon: text.trim_end().ends_with(':'),
            starts_num: starts_with_numbering(text),
            starts_bullet: text.trim_start().starts_with(['•', '-', '*']),
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
            is_first_page: line.page_index == 0,
            noun_count: counts.nouns,
            verb_count: counts.verbs,
            num_count: counts.numbers,
        }
    }
}

/// `num / den`, or 0 when the denominator is not a positive number.
fn safe_ratio(num: f32, den: f32) -> f32 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

fn space_above(bbox: &BoundingBox, prev_bottom: f32) -> f32 {
    if prev_bottom == 0.0 {
        return 0.0;
    }
    safe_ratio(bbox.y0 - prev_bottom, bbox.height())
}

/// At least one cased character, and every cased character is uppercase.
pub fn is_all_caps(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Every cased run starts with an uppercase character followed only by
/// lowercase ones, and at least one cased character exists.
pub fn is_title_case(text: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

/// `1.`, `12)`, or `A.` at the start of the text.
pub fn starts_with_numbering(text: &str) -> bool {
    static RE_NUMBERING: OnceLock<Regex> = OnceLock::new();
    let re = RE_NUMBERING.get_or_init(|| Regex::new(r"^(\d+[.)]|[A-Z]\.)").unwrap());
    re.is_match(text)
}
