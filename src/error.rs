//! Error types for thesis-lint.

use std::io;
use thiserror::Error;

/// Result type alias for thesis-lint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while auditing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The document could not be opened (missing or corrupt file).
    #[error("Cannot open document: {0}")]
    DocumentOpen(String),

    /// The document has no pages.
    #[error("Document has no pages")]
    EmptyDocument,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// An embedded object on a page could not be resolved.
    #[error("Embedded object error: {0}")]
    EmbeddedObject(String),

    /// An annotation could not be placed.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Error during rendering of the report (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
