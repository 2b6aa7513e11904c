//! PDF backend abstraction layer.
//!
//! The analysis engine never touches a concrete PDF library. It reads pages
//! and places annotations through [`PdfBackend`], which keeps the checks
//! testable against in-memory pages.

use std::path::Path;

use crate::analysis::transform::Matrix;
use crate::error::Result;
use crate::model::{Block, Point, Raster, Rect};

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// All operands as numbers, or `None` if any operand is not numeric.
    pub fn numbers(&self) -> Option<Vec<f32>> {
        self.operands.iter().map(get_number_from_value).collect()
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

/// The `/Length` entry of a stream as declared in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredLength {
    /// `/Length 1234`
    Inline(i64),
    /// `/Length 12 0 R`, with the referenced integer if it could be read
    Indirect(Option<i64>),
    /// A string holding the length
    Text(String),
    /// Absent or of another type
    Missing,
}

impl DeclaredLength {
    /// Byte length, when the declaration resolves to a non-negative integer.
    pub fn resolve(&self) -> Option<u64> {
        let value = match self {
            DeclaredLength::Inline(n) => Some(*n),
            DeclaredLength::Indirect(n) => *n,
            DeclaredLength::Text(s) => s.trim().parse::<i64>().ok(),
            DeclaredLength::Missing => None,
        };
        value.and_then(|n| u64::try_from(n).ok())
    }
}

/// A reusable object (form XObject) invoked directly by a page.
#[derive(Debug, Clone, PartialEq)]
pub struct XObjectRef {
    /// Resource name, without the leading slash
    pub name: String,
    /// `/BBox` in the object's own coordinate space
    pub bbox: Rect,
    /// `/Matrix`, if declared
    pub matrix: Option<Matrix>,
    pub length: DeclaredLength,
}

/// RGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Channels scaled to the 0..1 range used inside PDF files.
    pub fn to_pdf(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

/// Pop-up note attached to a highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub text: String,
}

/// An annotation to place on a page (page space, top-left origin).
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Highlight {
        rects: Vec<Rect>,
        color: Color,
        popup: Option<Popup>,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
}

/// Abstract interface for the PDF document being audited.
///
/// Pages are addressed by 0-based index. Geometry is in page space with a
/// top-left origin.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page rectangle.
    fn page_bounds(&self, page: usize) -> Result<Rect>;

    /// Native content blocks of a page, in reading order.
    fn page_blocks(&self, page: usize) -> Result<Vec<Block>>;

    /// Render the page at 72 dpi.
    fn rasterize(&self, page: usize) -> Result<Raster>;

    /// Reusable objects the page invokes directly (not through other objects).
    fn page_xobjects(&self, page: usize) -> Result<Vec<XObjectRef>>;

    /// Decoded drawing operators of the page.
    fn page_operations(&self, page: usize) -> Result<Vec<ContentOp>>;

    /// Transform from the file's user space to page space (flips the y axis).
    fn base_transform(&self, page: usize) -> Result<Matrix>;

    /// Place an annotation on a page.
    fn add_annotation(&mut self, page: usize, annotation: Annotation) -> Result<()>;

    /// Persist the (possibly annotated) document.
    fn save(&mut self, path: &Path) -> Result<()>;
}
