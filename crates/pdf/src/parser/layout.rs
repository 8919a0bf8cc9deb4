//! Span -> line -> block assembly.
//!
//! ```text
//! TextSpan[] (PDF user space)  ->  LayoutLine[] (top-left origin)  ->  LayoutBlock[]
//!              group_spans_into_lines    line_from_spans        group_lines_into_blocks
//! ```
//!
//! The output is an [`outline_core::LayoutPage`] whose coordinates have the
//! origin at the top-left of the visible page box and `y` growing downwards.

use std::cmp::Ordering;

use outline_core::{BoundingBox, LayoutBlock, LayoutLine, LayoutPage, PageGeometry, StyleSpan};

use super::backend::PageBox;
use super::spans::TextSpan;

/// Spans whose baselines differ by at most this many points share a line.
pub const Y_TOLERANCE: f32 = 1.0;

/// Horizontal gap (points) that counts as a word break between spans.
pub const MIN_WORD_GAP: f32 = 1.5;

/// Baseline distance, in multiples of the previous line's size, that starts a
/// new block.
pub const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Horizontal gap, in multiples of the left span's size, that separates two
/// columns sharing a baseline.
pub const COLUMN_GAP_FACTOR: f32 = 2.0;

/// Portion of the font size drawn above the baseline.
const ASCENT_RATIO: f32 = 0.8;
const DESCENT_RATIO: f32 = 0.2;

/// Font sizes closer than this are treated as the same run.
const SIZE_TOLERANCE: f32 = 0.5;

fn by_position(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn is_column_gap(prev: &TextSpan, next: &TextSpan) -> bool {
    next.x - (prev.x + prev.width) > COLUMN_GAP_FACTOR * prev.font_size
}

/// Cut an `x`-sorted row wherever a column gutter separates two spans.
fn split_columns(row: Vec<TextSpan>) -> Vec<Vec<TextSpan>> {
    let mut runs: Vec<Vec<TextSpan>> = Vec::new();
    for span in row {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|prev| !is_column_gap(prev, &span)) => run.push(span),
            _ => runs.push(vec![span]),
        }
    }
    runs
}

/// Group spans into lines, top of the page first, each line sorted
/// left-to-right. Spans on one baseline but across a column gutter become
/// separate lines.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<Vec<TextSpan>> {
    spans.sort_by(|a, b| by_position(b.y, a.y).then(by_position(a.x, b.x)));

    let mut rows: Vec<Vec<TextSpan>> = Vec::new();
    for span in spans {
        match rows.last_mut() {
            Some(row) if (row[0].y - span.y).abs() <= Y_TOLERANCE => row.push(span),
            _ => rows.push(vec![span]),
        }
    }

    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by(|a, b| by_position(a.x, b.x));
            split_columns(row)
        })
        .collect()
}

/// Characters of scripts written without inter-word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c,
        '\u{0E00}'..='\u{0E7F}'     // Thai
        | '\u{3040}'..='\u{30FF}'   // Hiragana, Katakana
        | '\u{3400}'..='\u{4DBF}'   // CJK Extension A
        | '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}'   // Hangul syllables
        | '\u{F900}'..='\u{FAFF}'   // CJK compatibility
        | '\u{20000}'..='\u{2FA1F}' // CJK Extensions B-F, supplement
    )
}

fn needs_space(prev: &TextSpan, next: &TextSpan) -> bool {
    let gap = next.x - (prev.x + prev.width);
    if gap < MIN_WORD_GAP {
        return false;
    }
    match (prev.text.chars().next_back(), next.text.chars().next()) {
        (Some(l), Some(f)) => {
            !l.is_whitespace()
                && !f.is_whitespace()
                && !(is_spaceless_script_char(l) && is_spaceless_script_char(f))
        }
        _ => false,
    }
}

/// Merge adjacent spans of the same style and put a space at word gaps.
///
/// Input must already be sorted by `x`.
pub fn merge_line_spans(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        let Some(prev) = merged.last_mut() else {
            merged.push(span);
            continue;
        };

        if needs_space(prev, &span) {
            prev.text.push(' ');
        }

        let same_style =
            prev.flags == span.flags && (prev.font_size - span.font_size).abs() < SIZE_TOLERANCE;
        if same_style {
            prev.text.push_str(&span.text);
            prev.width = (span.x + span.width - prev.x).max(prev.width);
        } else {
            merged.push(span);
        }
    }

    merged
}

/// Bounding box of a span in top-left page coordinates.
fn span_bbox(span: &TextSpan, page_box: &PageBox) -> BoundingBox {
    let x0 = span.x - page_box.llx;
    BoundingBox::new(
        x0,
        page_box.ury - (span.y + ASCENT_RATIO * span.font_size),
        x0 + span.width,
        page_box.ury - (span.y - DESCENT_RATIO * span.font_size),
    )
}

/// Build one [`LayoutLine`] from spans sharing a baseline.
pub fn line_from_spans(spans: Vec<TextSpan>, page_box: &PageBox) -> Option<LayoutLine> {
    let merged = merge_line_spans(spans);
    let bbox = merged
        .iter()
        .map(|span| span_bbox(span, page_box))
        .reduce(|acc, b| acc.union(&b))?;

    let styled = merged
        .into_iter()
        .map(|span| StyleSpan::new(span.text, span.font_size, span.flags))
        .collect();
    Some(LayoutLine::new(bbox, styled))
}

/// Split lines into blocks wherever the baseline distance jumps or the next
/// line does not overlap the previous one horizontally.
pub fn group_lines_into_blocks(lines: Vec<LayoutLine>) -> Vec<LayoutBlock> {
    let mut blocks: Vec<LayoutBlock> = Vec::new();

    for line in lines {
        let continues = blocks
            .last()
            .and_then(|block| block.lines.last())
            .is_some_and(|prev| {
                let step = line.bbox.y1 - prev.bbox.y1;
                let overlaps = line.bbox.x0 < prev.bbox.x1 && line.bbox.x1 > prev.bbox.x0;
                overlaps && step >= 0.0 && step <= BLOCK_GAP_FACTOR * prev.max_size()
            });

        match blocks.last_mut() {
            Some(block) if continues => block.lines.push(line),
            _ => blocks.push(LayoutBlock { lines: vec![line] }),
        }
    }

    blocks
}

/// Assemble a page from its raw spans.
pub fn build_layout_page(spans: Vec<TextSpan>, page_box: &PageBox) -> LayoutPage {
    let lines = group_spans_into_lines(spans)
        .into_iter()
        .filter_map(|line| line_from_spans(line, page_box))
        .collect();

    LayoutPage::new(
        PageGeometry::new(page_box.width(), page_box.height()),
        group_lines_into_blocks(lines),
    )
}
