use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Normalize text decoded from a single show operator.
///
/// NFC, ligature expansion, and removal of replacement and NUL characters.
/// Whitespace is preserved so glyph advances stay aligned with the text.
pub fn clean_span_text(text: &str) -> String {
    text.nfc()
        .filter(|&c| c != '\u{FFFD}' && c != '\0')
        .fold(String::with_capacity(text.len()), |mut out, c| {
            match LIGATURES.iter().find(|(lig, _)| *lig == c) {
                Some((_, expanded)) => out.push_str(expanded),
                None => out.push(c),
            }
            out
        })
}
