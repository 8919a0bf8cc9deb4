#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Input directory not found: {0}")]
    InputDirMissing(String),

    #[error("{failed} of {total} documents failed")]
    DocumentsFailed { failed: usize, total: usize },

    #[error("Page {page} out of range (document has {pages} pages)")]
    PageOutOfRange { page: usize, pages: usize },
}
