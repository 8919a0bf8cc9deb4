//! Content-stream walking: PDF text operators in, positioned [`TextSpan`]s out.
//!
//! Glyph metrics are not read from the font programs. Widths are estimated
//! from the character count, which is good enough for centring and width
//! ratios but not for exact layout.

use outline_core::types::{FLAG_BOLD, FLAG_ITALIC};

use super::backend::{get_number_from_value, BackendFontInfo, PageId, PdfBackend, PdfValue};
use crate::cleanup::clean_span_text;
use crate::PdfError;

/// Average glyph advance as a fraction of the font size.
pub const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// A run of text drawn with one font at one position, in PDF user space
/// (origin bottom-left, `y` is the baseline).
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    /// Style bitmask using [`FLAG_BOLD`] and [`FLAG_ITALIC`].
    pub flags: u32,
}

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text state that survives between operators of one content stream.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f32,
    flags: u32,
    /// [a, b, c, d, tx, ty]
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            flags: 0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.text_matrix = IDENTITY_MATRIX;
        self.line_matrix = IDENTITY_MATRIX;
    }

    /// Horizontal scale of the text matrix, used to take text-space widths
    /// into user space.
    fn matrix_scale_x(&self) -> f32 {
        (self.text_matrix[0].powi(2) + self.text_matrix[1].powi(2)).sqrt()
    }

    /// Rendered size: `font_size * sqrt(b^2 + d^2)`.
    fn rendered_size(&self) -> f32 {
        let scale = (self.text_matrix[2].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn origin(&self) -> (f32, f32) {
        (self.text_matrix[4], self.text_matrix[5] + self.text_rise)
    }

    fn glyph_advance(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn advance(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Td: translate the line matrix and restart the text matrix from it.
    fn move_line(&mut self, tx: f32, ty: f32) {
        let m = self.line_matrix;
        self.line_matrix[4] = m[0] * tx + m[2] * ty + m[4];
        self.line_matrix[5] = m[1] * tx + m[3] * ty + m[5];
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn set_matrix(&mut self, operands: &[PdfValue]) {
        let vals: Vec<f32> = operands
            .iter()
            .take(6)
            .filter_map(get_number_from_value)
            .collect();
        if let [a, b, c, d, e, f] = vals[..] {
            self.text_matrix = [a, b, c, d, e, f];
            self.line_matrix = self.text_matrix;
        }
    }

    /// Tf: the style flags come from the font's base name since the
    /// descriptor flags are rarely trustworthy.
    fn set_font(&mut self, operands: &[PdfValue], fonts: &[BackendFontInfo]) {
        let (Some(key), Some(size)) = (
            operands.first().and_then(|op| match op {
                PdfValue::Name(n) | PdfValue::Str(n) => Some(n.clone()),
                _ => None,
            }),
            operands.get(1).and_then(get_number_from_value),
        ) else {
            return;
        };

        let base_font = fonts
            .iter()
            .find(|info| info.name == key)
            .and_then(|info| info.base_font.clone())
            .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());

        self.flags = style_flags(&base_font);
        self.font_key = key;
        self.font_size = size;
    }

    /// Width in user space of `text` at the current state, and the text-space
    /// displacement it causes.
    fn measure(&self, text: &str) -> (f32, f32) {
        let glyph = self.glyph_advance();
        let displacement: f32 = text
            .chars()
            .map(|ch| {
                let extra = if ch == ' ' { self.word_spacing } else { 0.0 };
                glyph + self.char_spacing + extra
            })
            .sum();
        let visible = text.chars().count() as f32 * glyph;
        (visible * self.matrix_scale_x(), displacement)
    }

    fn span(&self, text: String, x: f32, y: f32, width: f32) -> TextSpan {
        TextSpan {
            text,
            x,
            y,
            width,
            font_size: self.rendered_size(),
            flags: self.flags,
        }
    }
}

/// Derive the bold/italic bitmask from a base font name such as
/// `ABCDEE+Helvetica-BoldOblique`.
pub fn style_flags(base_font: &str) -> u32 {
    let upper = base_font.to_uppercase();
    let mut flags = 0;
    if ["BOLD", "BLACK", "HEAVY"].iter().any(|w| upper.contains(w)) {
        flags |= FLAG_BOLD;
    }
    if upper.contains("ITALIC") || upper.contains("OBLIQUE") {
        flags |= FLAG_ITALIC;
    }
    flags
}

/// Walks a content stream and collects spans.
struct SpanCollector<'a> {
    backend: &'a dyn PdfBackend,
    fonts: &'a [BackendFontInfo],
    state: TextState,
    spans: Vec<TextSpan>,
}

impl SpanCollector<'_> {
    fn decode(&self, bytes: &[u8]) -> String {
        let font = self.fonts.iter().find(|info| info.name == self.state.font_key);
        clean_span_text(&self.backend.decode_text(font, bytes))
    }

    /// Tj, ' and ".
    fn show(&mut self, operand: &PdfValue) {
        let PdfValue::Str(bytes) = operand else {
            return;
        };
        let text = self.decode(bytes);
        let (width, displacement) = self.state.measure(&text);
        let (x, y) = self.state.origin();
        self.state.advance(displacement);
        if !text.trim().is_empty() {
            self.spans.push(self.state.span(text, x, y, width));
        }
    }

    /// TJ: strings interleaved with kerning in thousandths of text space.
    /// Large negative kerning is treated as a word gap.
    fn show_array(&mut self, elements: &[PdfValue]) {
        let (start_x, y) = self.state.origin();
        let mut text = String::new();
        let mut width = 0.0;

        for element in elements {
            match element {
                PdfValue::Str(bytes) => {
                    let fragment = self.decode(bytes);
                    let (w, displacement) = self.state.measure(&fragment);
                    width += w;
                    text.push_str(&fragment);
                    self.state.advance(displacement);
                }
                other => {
                    let Some(adjust) = get_number_from_value(other) else {
                        continue;
                    };
                    let dx = -adjust / 1000.0 * self.state.font_size * self.state.horiz_scale;
                    if dx > self.state.glyph_advance() * 0.3 && !text.is_empty() {
                        text.push(' ');
                    }
                    width += dx * self.state.matrix_scale_x();
                    self.state.advance(dx);
                }
            }
        }

        let trimmed = text.trim_end();
        if !trimmed.trim_start().is_empty() {
            self.spans
                .push(self.state.span(trimmed.to_string(), start_x, y, width.max(0.0)));
        }
    }
}

fn number(operands: &[PdfValue], index: usize) -> Option<f32> {
    operands.get(index).and_then(get_number_from_value)
}

/// Run the text state machine over one page's content stream.
///
/// Handles `BT`, `Tf`, `Tm`, `Td`, `TD`, `T*`, `TL`, `Tc`, `Tw`, `Tz`, `Ts`,
/// `Tj`, `TJ`, `'` and `"`. Everything else is ignored, including `cm`, so
/// text placed through a transformed CTM lands at its text-space position.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw = backend.page_content(page)?;
    let ops = backend.decode_content(&raw)?;
    let fonts = backend.page_fonts(page).unwrap_or_default();

    let mut collector = SpanCollector {
        backend,
        fonts: &fonts,
        state: TextState::default(),
        spans: Vec::new(),
    };

    for op in &ops {
        let args = op.operands.as_slice();
        let state = &mut collector.state;
        match op.operator.as_str() {
            "BT" => state.begin_text(),
            "Tf" => state.set_font(args, collector.fonts),
            "Tm" => state.set_matrix(args),
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(args, 0), number(args, 1)) {
                    state.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(args, 0), number(args, 1)) {
                    state.leading = -ty;
                    state.move_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => state.leading = number(args, 0).unwrap_or(state.leading),
            "Tc" => state.char_spacing = number(args, 0).unwrap_or(state.char_spacing),
            "Tw" => state.word_spacing = number(args, 0).unwrap_or(state.word_spacing),
            "Tz" => {
                if let Some(percent) = number(args, 0) {
                    state.horiz_scale = percent / 100.0;
                }
            }
            "Ts" => state.text_rise = number(args, 0).unwrap_or(state.text_rise),
            "Tj" => {
                if let Some(operand) = args.first() {
                    collector.show(operand);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(elements)) = args.first() {
                    collector.show_array(elements);
                }
            }
            "'" => {
                state.next_line();
                if let Some(operand) = args.first() {
                    collector.show(operand);
                }
            }
            "\"" => {
                if let [aw, ac, operand, ..] = args {
                    state.word_spacing = get_number_from_value(aw).unwrap_or(state.word_spacing);
                    state.char_spacing = get_number_from_value(ac).unwrap_or(state.char_spacing);
                    state.next_line();
                    collector.show(operand);
                }
            }
            _ => {}
        }
    }

    Ok(collector.spans)
}
