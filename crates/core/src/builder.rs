//! Outline assembly: runs feature extraction, classification, and level
//! assignment over every line of a document, captures the title, and falls
//! back to a first-page scoring heuristic when no title was captured.

use std::sync::Arc;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::annotate::{Annotator, LexiconAnnotator};
use crate::classify::{classify, Verdict};
use crate::config::OutlineConfig;
use crate::features::{FeatureExtractor, FeatureRecord, PageContext};
use crate::level::assign_level;
use crate::types::{DocumentOutline, HeadingLevel, LayoutPage, LineRecord, OutlineEntry};

/// Diagnostic view of one analysed line.
#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    /// 1-based page number.
    pub page: usize,
    pub text: String,
    pub features: FeatureRecord,
    pub verdict: Verdict,
    /// Set only for lines classified as headings.
    pub level: Option<HeadingLevel>,
}

#[derive(Clone)]
pub struct OutlineBuilder {
    annotator: Arc<dyn Annotator>,
    config: OutlineConfig,
}

impl Default for OutlineBuilder {
    /// Lexicon annotator with default thresholds.
    fn default() -> Self {
        Self::new(Arc::new(LexiconAnnotator::new()), OutlineConfig::default())
    }
}

impl OutlineBuilder {
    pub fn new(annotator: Arc<dyn Annotator>, config: OutlineConfig) -> Self {
        Self { annotator, config }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Build the outline for a document given its pages in order.
    pub fn build(&self, pages: &[LayoutPage]) -> DocumentOutline {
        let extractor = FeatureExtractor::new(self.annotator.as_ref(), &self.config);
        let mut title: Option<String> = None;
        let mut outline: Vec<OutlineEntry> = Vec::new();

        for (page_index, page) in pages.iter().enumerate() {
            for (record, features) in analyze_page(&extractor, page_index, page) {
                let verdict = classify(&features, &self.config);
                if !verdict.is_heading(&self.config) {
                    trace!("p{} {verdict}: {:?}", page_index + 1, record.text);
                    continue;
                }

                let level = assign_level(&record.text);
                if page_index == 0 && level == HeadingLevel::H1 && title.is_none() {
                    debug!("Title captured from first page: {:?}", record.text);
                    title = Some(record.text);
                    continue;
                }

                outline.push(OutlineEntry {
                    level,
                    text: record.text,
                    page: page_index + 1,
                });
            }
        }

        let title = match title {
            Some(title) => title,
            None => pages
                .first()
                .and_then(|page| fallback_title(page, &self.config))
                .unwrap_or_default(),
        };

        DocumentOutline { title, outline }
    }

    /// Per-line features and decisions, in document order.
    pub fn inspect(&self, pages: &[LayoutPage]) -> Vec<LineReport> {
        let extractor = FeatureExtractor::new(self.annotator.as_ref(), &self.config);

        pages
            .iter()
            .enumerate()
            .flat_map(|(page_index, page)| {
                analyze_page(&extractor, page_index, page)
                    .into_iter()
                    .map(move |(record, features)| (page_index, record, features))
            })
            .map(|(page_index, record, features)| {
                let verdict = classify(&features, &self.config);
                let level = verdict
                    .is_heading(&self.config)
                    .then(|| assign_level(&record.text));
                LineReport {
                    page: page_index + 1,
                    text: record.text,
                    features,
                    verdict,
                    level,
                }
            })
            .collect()
    }
}

/// Extract features for every usable line on a page, threading the page
/// context from one line to the next. Context starts fresh on each page.
fn analyze_page<'p>(
    extractor: &FeatureExtractor<'_>,
    page_index: usize,
    page: &'p LayoutPage,
) -> Vec<(LineRecord<'p>, FeatureRecord)> {
    page.lines()
        .filter_map(|line| LineRecord::from_layout(line, page_index, page.geometry))
        .filter(|record| {
            let ok = record.is_well_formed();
            if !ok {
                warn!(
                    "Skipping line with invalid geometry on page {}: {:?}",
                    page_index + 1,
                    record.text
                );
            }
            ok
        })
        .scan(PageContext::new(), |ctx, record| {
            let features = extractor.extract(&record, ctx);
            *ctx = ctx.advance(&record.bbox);
            Some((record, features))
        })
        .collect()
}

/// Pick a title from a page without the heading classifier.
///
/// Every line with a word count inside the configured bounds is scored as
/// `2 * max_font_size - center_offset - word_count`; the highest score wins
/// and the earliest line wins a tie.
pub fn fallback_title(page: &LayoutPage, config: &OutlineConfig) -> Option<String> {
    debug!("No title captured; scanning first page for title candidates");

    let page_center = page.geometry.center_x();
    let mut best: Option<(f32, String)> = None;

    for line in page.lines() {
        let text = line.text();
        if text.is_empty() {
            continue;
        }

        let words = text.split_whitespace().count();
        if words < config.fallback_min_words || words > config.fallback_max_words {
            continue;
        }

        let size = line.max_size();
        let center_offset = (line.bbox.center_x() - page_center).abs();
        let score = size * 2.0 - center_offset - words as f32;

        debug!(
            "Candidate {text:?}: size={size:.1}, center_offset={center_offset:.1}, words={words}, score={score:.1}"
        );

        if !score.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, text));
        }
    }

    match best {
        Some((_, title)) => {
            debug!("Fallback title chosen: {title:?}");
            Some(title)
        }
        None => {
            debug!("No suitable fallback title on first page");
            None
        }
    }
}
