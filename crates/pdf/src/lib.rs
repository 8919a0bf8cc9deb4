//! PDF layout extraction for the outliner.
//!
//! Turns PDF bytes into [`outline_core::LayoutPage`]s: positioned lines of
//! styled spans grouped into blocks, one page per PDF page in document order.
//!
//! ```text
//! bytes -> LopdfBackend -> TextSpan[] -> LayoutLine[] -> LayoutPage
//!           backend        spans          layout
//! ```

use std::path::Path;

use log::{debug, warn};
use thiserror::Error;

use outline_core::{DocumentOutline, LayoutPage, OutlineBuilder, PageGeometry};
use parser::backend::{LopdfBackend, PageBox, PageId, PdfBackend};

pub mod cleanup;
pub mod parser;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode every page of a PDF held in memory.
pub fn load_pages(bytes: &[u8]) -> Result<Vec<LayoutPage>, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    Ok(extract_layout(&backend))
}

/// Read and decode a PDF file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<LayoutPage>, PdfError> {
    let bytes = std::fs::read(path)?;
    load_pages(&bytes)
}

/// Decode PDF bytes and run the outline builder over them.
pub fn outline_pdf(bytes: &[u8], builder: &OutlineBuilder) -> Result<DocumentOutline, PdfError> {
    let pages = load_pages(bytes)?;
    Ok(builder.build(&pages))
}

/// Layout for every page the backend reports.
///
/// A page whose content cannot be decoded comes back empty so later page
/// numbers stay aligned with the document.
pub fn extract_layout(backend: &dyn PdfBackend) -> Vec<LayoutPage> {
    backend
        .pages()
        .into_iter()
        .map(|(number, id)| page_layout(backend, number, id))
        .collect()
}

fn page_layout(backend: &dyn PdfBackend, number: u32, id: PageId) -> LayoutPage {
    let page_box = backend.page_box(id).unwrap_or_else(|e| {
        warn!("page {number}: {e}; assuming US Letter");
        PageBox::LETTER
    });

    match parser::spans::extract_page_spans(backend, id) {
        Ok(spans) => {
            debug!("page {number}: {} spans", spans.len());
            parser::layout::build_layout_page(spans, &page_box)
        }
        Err(e) => {
            warn!("page {number}: skipping content ({e})");
            LayoutPage::new(
                PageGeometry::new(page_box.width(), page_box.height()),
                Vec::new(),
            )
        }
    }
}
