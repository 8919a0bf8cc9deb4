//! Heading classification: a hard disqualification gate followed by a
//! weighted score over weak layout signals.
//!
//! The part-of-speech counts on [`FeatureRecord`] are not consulted here.

use std::fmt;

use serde::Serialize;

use crate::config::OutlineConfig;
use crate::features::FeatureRecord;

/// Why a line was rejected before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Disqualification {
    TooManyWords,
    NearFullWidth,
    BoldBodyText,
}

impl fmt::Display for Disqualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disqualification::TooManyWords => write!(f, "too many words"),
            Disqualification::NearFullWidth => write!(f, "near full width"),
            Disqualification::BoldBodyText => write!(f, "bold body text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Rejected(Disqualification),
    Scored(u8),
}

impl Verdict {
    pub fn is_heading(&self, config: &OutlineConfig) -> bool {
        matches!(self, Verdict::Scored(score) if *score >= config.min_heading_score)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Rejected(reason) => write!(f, "rejected ({reason})"),
            Verdict::Scored(score) => write!(f, "score {score}"),
        }
    }
}

/// Hard negatives: long lines, near-full-width lines, bold text at body size.
pub fn gate(feat: &FeatureRecord, config: &OutlineConfig) -> Option<Disqualification> {
    if feat.word_count > config.max_heading_words {
        Some(Disqualification::TooManyWords)
    } else if feat.line_ratio > config.max_line_ratio {
        Some(Disqualification::NearFullWidth)
    } else if feat.is_bold && feat.rel_size < config.bold_min_rel_size {
        Some(Disqualification::BoldBodyText)
    } else {
        None
    }
}

pub fn heading_score(feat: &FeatureRecord, config: &OutlineConfig) -> u8 {
    let size_bonus = if feat.rel_size > config.large_rel_size {
        config.large_size_weight
    } else {
        0
    };

    let signals = [
        feat.is_bold,
        feat.is_centered,
        feat.starts_num,
        feat.is_all_caps,
        feat.ends_with_colon,
        feat.space_above > config.space_above_threshold,
    ];

    size_bonus + signals.iter().filter(|&&s| s).count() as u8
}

pub fn classify(feat: &FeatureRecord, config: &OutlineConfig) -> Verdict {
    match gate(feat, config) {
        Some(reason) => Verdict::Rejected(reason),
        None => Verdict::Scored(heading_score(feat, config)),
    }
}

pub fn is_heading(feat: &FeatureRecord, config: &OutlineConfig) -> bool {
    classify(feat, config).is_heading(config)
}
