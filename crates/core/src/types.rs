use std::fmt;

use serde::{Deserialize, Serialize};

/// Style-flag bit marking an italic span.
pub const FLAG_ITALIC: u32 = 1;
/// Style-flag bit marking a bold span.
pub const FLAG_BOLD: u32 = 1 << 3;

/// Page dimensions in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal midpoint of the page.
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// Axis-aligned box in page coordinates: origin top-left, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

/// A run of text sharing one font size and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub size: f32,
    /// Bitmask: [`FLAG_ITALIC`], [`FLAG_BOLD`].
    pub flags: u32,
    pub text: String,
}

impl StyleSpan {
    pub fn new(text: impl Into<String>, size: f32, flags: u32) -> Self {
        Self {
            size,
            flags,
            text: text.into(),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.flags & FLAG_BOLD != 0
    }

    pub fn is_italic(&self) -> bool {
        self.flags & FLAG_ITALIC != 0
    }
}

/// One line as reported by the layout service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub bbox: BoundingBox,
    pub spans: Vec<StyleSpan>,
}

impl LayoutLine {
    pub fn new(bbox: BoundingBox, spans: Vec<StyleSpan>) -> Self {
        Self { bbox, spans }
    }

    /// Span texts concatenated without separators, then trimmed.
    pub fn text(&self) -> String {
        let joined: String = self.spans.iter().map(|s| s.text.as_str()).collect();
        joined.trim().to_string()
    }

    /// Largest span font size, or 0 when the line carries no spans.
    pub fn max_size(&self) -> f32 {
        self.spans.iter().map(|s| s.size).fold(0.0, f32::max)
    }
}

/// A group of lines. Image blocks have no lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub lines: Vec<LayoutLine>,
}

/// One decoded page: geometry plus blocks in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    pub geometry: PageGeometry,
    pub blocks: Vec<LayoutBlock>,
}

impl LayoutPage {
    pub fn new(geometry: PageGeometry, blocks: Vec<LayoutBlock>) -> Self {
        Self { geometry, blocks }
    }

    /// Every line of every block, in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &LayoutLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }
}

/// Borrowed view of a single non-empty line, the unit of feature extraction.
#[derive(Debug, Clone)]
pub struct LineRecord<'a> {
    pub text: String,
    pub bbox: BoundingBox,
    pub spans: &'a [StyleSpan],
    /// 0-based.
    pub page_index: usize,
    pub geometry: PageGeometry,
}

impl<'a> LineRecord<'a> {
    /// Build a record for `line`, or `None` when its trimmed text is empty.
    pub fn from_layout(
        line: &'a LayoutLine,
        page_index: usize,
        geometry: PageGeometry,
    ) -> Option<Self> {
        let text = line.text();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text,
            bbox: line.bbox,
            spans: &line.spans,
            page_index,
            geometry,
        })
    }

    pub fn max_size(&self) -> f32 {
        self.spans.iter().map(|s| s.size).fold(0.0, f32::max)
    }

    /// Style flags of the first span, 0 when there are none.
    pub fn flags(&self) -> u32 {
        self.spans.first().map(|s| s.flags).unwrap_or(0)
    }

    /// Geometry and sizes are all finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.bbox.is_finite() && self.spans.iter().all(|s| s.size.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    /// 1-based page number.
    pub page: usize,
}

/// The output artifact for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(texts: &[(&str, f32, u32)]) -> LayoutLine {
        LayoutLine::new(
            BoundingBox::new(10.0, 10.0, 100.0, 22.0),
            texts
                .iter()
                .map(|(t, size, flags)| StyleSpan::new(*t, *size, *flags))
                .collect(),
        )
    }

    #[test]
    fn test_line_text_joins_spans_and_trims() {
        let l = line(&[("  Intro", 12.0, 0), ("duction ", 14.0, FLAG_BOLD)]);
        assert_eq!(l.text(), "Introduction");
        assert_eq!(l.max_size(), 14.0);
    }

    #[test]
    fn test_line_record_skips_blank_lines() {
        let l = line(&[("   ", 12.0, 0)]);
        assert!(LineRecord::from_layout(&l, 0, PageGeometry::new(600.0, 800.0)).is_none());
    }

    #[test]
    fn test_line_record_flags_from_first_span() {
        let l = line(&[("A", 12.0, FLAG_ITALIC), ("B", 12.0, FLAG_BOLD)]);
        let rec = LineRecord::from_layout(&l, 2, PageGeometry::new(600.0, 800.0)).unwrap();
        assert_eq!(rec.flags(), FLAG_ITALIC);
        assert_eq!(rec.page_index, 2);
    }

    #[test]
    fn test_line_record_without_spans_has_zero_flags() {
        let l = LayoutLine::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), vec![]);
        let rec = LineRecord {
            text: "x".to_string(),
            bbox: l.bbox,
            spans: &l.spans,
            page_index: 0,
            geometry: PageGeometry::new(10.0, 10.0),
        };
        assert_eq!(rec.flags(), 0);
        assert_eq!(rec.max_size(), 0.0);
    }

    #[test]
    fn test_heading_level_serializes_as_tag() {
        let json = serde_json::to_string(&HeadingLevel::H2).unwrap();
        assert_eq!(json, "\"H2\"");
        assert_eq!(format!("{}", HeadingLevel::H3), "H3");
    }

    #[test]
    fn test_bbox_union() {
        let a = BoundingBox::new(10.0, 5.0, 20.0, 15.0);
        let b = BoundingBox::new(0.0, 8.0, 30.0, 12.0);
        assert_eq!(a.union(&b), BoundingBox::new(0.0, 5.0, 30.0, 15.0));
    }
}
