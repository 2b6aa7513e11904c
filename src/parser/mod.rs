//! PDF access layer.
//!
//! [`PdfBackend`] is the page model the analysis engine consumes;
//! [`LopdfBackend`] implements it for real files.

mod backend;
mod base14;
mod layout;
mod lopdf_backend;

pub use backend::{
    get_number_from_value, Annotation, Color, ContentOp, DeclaredLength, PdfBackend, PdfValue,
    Popup, XObjectRef,
};
pub use lopdf_backend::LopdfBackend;
