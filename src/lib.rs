//! # thesis-lint
//!
//! Heuristic layout auditor for typeset theses.
//!
//! The library reads a PDF, estimates the text column and the body font
//! from a sample of pages, then walks every page looking for typesetting
//! defects and marks each one with an annotation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use thesis_lint::{check_file, CheckOptions};
//!
//! fn main() -> thesis_lint::Result<()> {
//!     let report = check_file("thesis.pdf", "thesis_annotated.pdf", CheckOptions::all())?;
//!     if report.mistakes_found {
//!         println!("{} finding(s)", report.findings.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Checks
//!
//! - **Overflow**: content sticking out of the text column
//! - **Dash**: a hyphen typed where a dash belongs
//! - **Bad reference**: unresolved `??` references
//! - **Image width**: images almost, but not quite, as wide as the column
//! - **Table of contents**: headings of level three or deeper listed
//! - **Bracket spacing**: no space before an opening bracket
//! - **Empty section**: headings without text between them
//!
//! Chapter statistics (text and images in standard pages) can be collected
//! in the same pass.

pub mod analysis;
pub mod checker;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use analysis::statistics::DocumentStatistics;
pub use analysis::Margin;
pub use checker::{
    CheckKind, CheckOptions, CheckReport, DocumentChecker, Finding, PageContext,
    StatisticsOptions,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfHeader};
pub use error::{Error, Result};
pub use model::{Block, FontSignature, ImageBlock, Line, Point, Rect, Span, TextBlock};
pub use parser::{Annotation, LopdfBackend, PdfBackend};
pub use render::{to_json, JsonFormat};

use std::path::Path;

/// Check a PDF file and save the annotated copy.
///
/// # Arguments
///
/// * `input` - Path to the PDF file
/// * `output` - Where to save the annotated document
/// * `options` - Checks to run
///
/// # Example
///
/// ```no_run
/// use thesis_lint::{check_file, CheckOptions};
///
/// let options = CheckOptions::none().with_overflow(true).with_dash(true);
/// let report = check_file("thesis.pdf", "out.pdf", options).unwrap();
/// println!("Mistakes found: {}", report.mistakes_found);
/// ```
pub fn check_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: CheckOptions,
) -> Result<CheckReport> {
    let backend = LopdfBackend::open(input)?;
    let mut checker = DocumentChecker::new(backend, options);
    checker.annotate(output)
}

/// Check a PDF held in memory without saving anything.
///
/// # Example
///
/// ```no_run
/// use thesis_lint::{check_bytes, CheckOptions};
///
/// let data = std::fs::read("thesis.pdf").unwrap();
/// let report = check_bytes(&data, CheckOptions::all()).unwrap();
/// ```
pub fn check_bytes(data: &[u8], options: CheckOptions) -> Result<CheckReport> {
    let backend = LopdfBackend::from_bytes(data)?;
    DocumentChecker::new(backend, options).check()
}

/// Collect chapter statistics of a PDF file without running any check.
///
/// # Example
///
/// ```no_run
/// use thesis_lint::{collect_statistics, to_json, JsonFormat};
///
/// let stats = collect_statistics("thesis.pdf").unwrap();
/// println!("{}", to_json(&stats, JsonFormat::Pretty).unwrap());
/// ```
pub fn collect_statistics<P: AsRef<Path>>(path: P) -> Result<DocumentStatistics> {
    let backend = LopdfBackend::open(path)?;
    let options = CheckOptions::none().with_statistics(true);
    let report = DocumentChecker::new(backend, options).check()?;
    report
        .statistics
        .ok_or_else(|| Error::Render("statistics were not collected".to_string()))
}
