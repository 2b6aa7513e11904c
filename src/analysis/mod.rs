//! Layout analysis engine.
//!
//! Each module implements one heuristic over the page content model. The
//! functions are pure apart from the small walkers ([`SectionAnalyzer`],
//! [`TocDetector`], [`ChapterCollector`]) that carry state from page to page.

pub mod embedded;
pub mod fonts;
pub mod image_width;
pub mod margin;
pub mod overflow;
pub mod patterns;
pub mod sections;
pub mod statistics;
pub mod title;
pub mod toc;
pub mod transform;

pub use embedded::{is_inside_embedded, resolve_embedded, splice_embedded};
pub use fonts::{document_regular_font, dominant_font, page_font_usage, FontUsage};
pub use margin::{
    estimate_document_margin, estimate_page_margin, Margin, MarginEstimate, PageMargin,
};
pub use overflow::{scan_overflow, OverflowScan};
pub use sections::SectionAnalyzer;
pub use statistics::{ChapterCollector, DocumentStatistics};
pub use title::{block_text, is_title_block};
pub use toc::TocDetector;
pub use transform::{Matrix, TransformStack};
