use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

const MAX_TREE_DEPTH: usize = 32;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Font entry from a page's resource dictionary.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Resource key as used by `Tf` (e.g. `b"F1"`).
    pub name: Vec<u8>,
    pub base_font: Option<String>,
    pub encoding: Option<String>,
}

/// A page's visible area in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    /// US Letter, used when a page declares no usable box.
    pub const LETTER: PageBox = PageBox {
        llx: 0.0,
        lly: 0.0,
        urx: 612.0,
        ury: 792.0,
    };

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

/// lopdf-independent PDF value so the span state machine works on plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// Numeric value of an `Integer` or `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object`. Stream bytes are dropped; only the dictionary
/// survives.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    let convert_dict = |dict: &lopdf::Dictionary| {
        PdfValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        )
    };

    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => convert_dict(dict),
        lopdf::Object::Stream(stream) => convert_dict(&stream.dict),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Best-effort decoding of PDF string bytes: UTF-16BE with BOM, then UTF-8,
/// then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16be(payload);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Decode big-endian UTF-16 code units; a trailing odd byte is ignored.
fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Abstraction over the PDF parser so the span state machine can be tested
/// against mock implementations.
pub trait PdfBackend {
    /// Mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    fn page_box(&self, page: PageId) -> Result<PageBox, PdfError>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the operand of a text-showing operator using whatever encoding
    /// hints the current font carries. `font` is `None` when the `Tf` key is
    /// missing from the page resources.
    fn decode_text(&self, font: Option<&BackendFontInfo>, bytes: &[u8]) -> String;
}

/// [`PdfBackend`] backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: lopdf::Document) -> Result<Self, PdfError> {
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Look up a box entry (`MediaBox`, `CropBox`) on the page, walking up
    /// the page tree for inherited values.
    fn inherited_box(&self, page: PageId, key: &[u8]) -> Option<Vec<f32>> {
        let mut dict = self.doc.get_object(page).ok()?.as_dict().ok()?;
        // Parent chains are cut off at MAX_TREE_DEPTH.
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(obj) = dict.get(key) {
                if let Some(nums) = self.resolve_numbers(obj) {
                    return Some(nums);
                }
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_object(parent).ok()?.as_dict().ok()?;
        }
        None
    }

    /// Resolve an array (directly or through one reference) of numbers.
    fn resolve_numbers(&self, obj: &lopdf::Object) -> Option<Vec<f32>> {
        let arr = match obj {
            lopdf::Object::Array(arr) => arr,
            lopdf::Object::Reference(id) => self.doc.get_object(*id).ok()?.as_array().ok()?,
            _ => return None,
        };
        arr.iter()
            .map(|item| {
                let item = match item {
                    lopdf::Object::Reference(id) => self.doc.get_object(*id).ok()?,
                    other => other,
                };
                match item {
                    lopdf::Object::Integer(i) => Some(*i as f32),
                    lopdf::Object::Real(f) => Some(*f),
                    _ => None,
                }
            })
            .collect()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    /// CropBox when present (that is what a viewer shows), else MediaBox.
    fn page_box(&self, page: PageId) -> Result<PageBox, PdfError> {
        let nums = self
            .inherited_box(page, b"CropBox")
            .or_else(|| self.inherited_box(page, b"MediaBox"))
            .ok_or_else(|| PdfError::Parse(format!("no MediaBox for page {page:?}")))?;

        match nums.as_slice() {
            [a, b, c, d, ..] => Ok(PageBox {
                llx: a.min(*c),
                lly: b.min(*d),
                urx: a.max(*c),
                ury: b.max(*d),
            }),
            _ => Err(PdfError::Parse(format!(
                "page box has {} elements, expected 4",
                nums.len()
            ))),
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {e}")))?;

        let name_entry = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        Ok(fonts
            .iter()
            .map(|(name, dict)| BackendFontInfo {
                name: name.clone(),
                base_font: name_entry(dict, b"BaseFont"),
                encoding: name_entry(dict, b"Encoding"),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {e}")))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {e}")))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(convert_object).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn decode_text(&self, font: Option<&BackendFontInfo>, bytes: &[u8]) -> String {
        // Identity-H / Identity-V fonts often carry 2-byte codes that are
        // plain UTF-16BE.
        let identity = font
            .and_then(|info| info.encoding.as_deref())
            .is_some_and(|enc| enc.contains("Identity"));
        if identity && !bytes.is_empty() && bytes.len() % 2 == 0 {
            let decoded = decode_utf16be(bytes);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }

        decode_text_simple(bytes)
    }
}

#[cfg(test)]
mod tests {
    use lopdf::{dictionary, Object};

    use super::*;

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
    }

    /// One-page document whose MediaBox lives on the Pages node.
    fn inherited_box_doc() -> (lopdf::Document, PageId) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
                "MediaBox" => ints(&[0, 0, 595, 842]),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        (doc, page_id)
    }

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("caf\u{00E9}".as_bytes()), "caf\u{00E9}");
    }

    #[test]
    fn decode_text_simple_latin1_fallback() {
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "caf\u{00E9}");
    }

    #[test]
    fn decode_text_simple_utf16be_with_bom() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00]), "A");
    }

    #[test]
    fn decode_text_simple_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    #[test]
    fn get_number_accepts_integer_and_real() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(-3)), Some(-3.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(1.5)), Some(1.5));
        assert_eq!(get_number_from_value(&PdfValue::Null), None);
    }

    #[test]
    fn convert_nested_values() {
        let obj = Object::Array(vec![
            Object::Name(b"F1".to_vec()),
            Object::string_literal("hello"),
            Object::Reference((4, 0)),
        ]);
        assert_eq!(
            convert_object(&obj),
            PdfValue::Array(vec![
                PdfValue::Name(b"F1".to_vec()),
                PdfValue::Str(b"hello".to_vec()),
                PdfValue::Reference((4, 0)),
            ])
        );
    }

    #[test]
    fn page_box_inherited_from_parent() {
        let (doc, page_id) = inherited_box_doc();
        let backend = LopdfBackend::from_document(doc).unwrap();
        assert_eq!(backend.page_count(), 1);
        let page_box = backend.page_box(page_id).unwrap();
        assert_eq!(page_box.width(), 595.0);
        assert_eq!(page_box.height(), 842.0);
    }

    #[test]
    fn page_box_prefers_crop_box() {
        let (mut doc, page_id) = inherited_box_doc();
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("CropBox", ints(&[10, 20, 510, 720]));
        let backend = LopdfBackend::from_document(doc).unwrap();
        assert_eq!(backend.page_box(page_id).unwrap(), PageBox {
            llx: 10.0,
            lly: 20.0,
            urx: 510.0,
            ury: 720.0,
        });
    }

    #[test]
    fn load_bytes_rejects_garbage() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    fn font(encoding: Option<&str>) -> BackendFontInfo {
        BackendFontInfo {
            name: b"F1".to_vec(),
            base_font: Some("NotoSans".to_string()),
            encoding: encoding.map(str::to_string),
        }
    }

    #[test]
    fn decode_text_identity_font_reads_utf16be() {
        let (doc, _) = inherited_box_doc();
        let backend = LopdfBackend::from_document(doc).unwrap();
        let bytes = [0x00, 0x48, 0x00, 0x69];
        assert_eq!(backend.decode_text(Some(&font(Some("Identity-H"))), &bytes), "Hi");
        assert_eq!(backend.decode_text(Some(&font(Some("WinAnsiEncoding"))), &bytes), "\0H\0i");
        assert_eq!(backend.decode_text(None, &bytes), "\0H\0i");
    }

    #[test]
    fn page_fonts_reads_encoding() {
        let (mut doc, page_id) = inherited_box_doc();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSans-Bold",
            "Encoding" => "Identity-H",
        });
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Resources", dictionary! { "Font" => dictionary! { "F1" => Object::Reference(font_id) } });
        let backend = LopdfBackend::from_document(doc).unwrap();
        let fonts = backend.page_fonts(page_id).unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].name, b"F1");
        assert_eq!(fonts[0].base_font.as_deref(), Some("NotoSans-Bold"));
        assert_eq!(fonts[0].encoding.as_deref(), Some("Identity-H"));
    }
}
