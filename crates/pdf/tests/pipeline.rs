use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use outline_core::{HeadingLevel, OutlineBuilder, OutlineEntry};
use pdf_layout::{load_pages, outline_pdf};

/// One text line: font resource, size, baseline origin, text.
type Line<'a> = (&'a str, i64, f32, f32, &'a str);

fn text_ops(lines: &[Line]) -> Vec<Operation> {
    lines
        .iter()
        .flat_map(|&(font, size, x, y, text)| {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)]),
                Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ]
        })
        .collect()
}

/// A4 document, one page per entry in `pages`.
fn build_pdf(pages: &[Vec<Line>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |doc: &mut Document, base: &str| {
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        })
    };
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");

    let kids: Vec<Object> = pages
        .iter()
        .map(|lines| {
            let content = Content {
                operations: text_ops(lines),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => Object::Reference(regular),
                        "F2" => Object::Reference(bold),
                    },
                },
            });
            Object::Reference(page_id)
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn report() -> Vec<u8> {
    // "Annual Report" at 24pt is estimated 156pt wide; x = 297.5 - 78 centres it.
    build_pdf(&[
        vec![
            ("F2", 24, 219.5, 700.0, "Annual Report"),
            ("F1", 12, 72.0, 600.0, "This is body text for the report."),
        ],
        vec![
            ("F2", 16, 72.0, 700.0, "1. INTRODUCTION"),
            ("F1", 12, 72.0, 660.0, "Some details follow here."),
        ],
    ])
}

#[test]
fn test_layout_from_generated_pdf() {
    let pages = load_pages(&report()).unwrap();
    assert_eq!(pages.len(), 2);

    let first = &pages[0];
    assert_eq!(first.geometry.width, 595.0);
    assert_eq!(first.geometry.height, 842.0);

    let lines: Vec<_> = first.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text(), "Annual Report");
    assert!(lines[0].spans[0].is_bold());
    assert_eq!(lines[0].max_size(), 24.0);
    assert!((lines[0].bbox.center_x() - 297.5).abs() < 0.01);
    assert!(lines[0].bbox.y1 < lines[1].bbox.y0);
    assert!(!lines[1].spans[0].is_bold());
}

#[test]
fn test_outline_from_generated_pdf() {
    let outline = outline_pdf(&report(), &OutlineBuilder::default()).unwrap();
    assert_eq!(outline.title, "Annual Report");
    assert_eq!(
        outline.outline,
        vec![OutlineEntry {
            level: HeadingLevel::H2,
            text: "1. INTRODUCTION".to_string(),
            page: 2,
        }]
    );
}

#[test]
fn test_empty_document_has_empty_outline() {
    let outline = outline_pdf(&build_pdf(&[vec![]]), &OutlineBuilder::default()).unwrap();
    assert_eq!(outline.title, "");
    assert!(outline.outline.is_empty());
}
