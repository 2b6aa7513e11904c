//! Document checker.
//!
//! A check runs in two passes over the document. The sampling pass estimates
//! the text column margin and the body font from a handful of interior
//! pages; the full pass then applies every enabled check to every page, in
//! order, and annotates what it finds.

mod context;
mod options;
mod report;

pub use context::PageContext;
pub use options::{CheckOptions, StatisticsOptions};
pub use report::{CheckKind, CheckReport, Finding, HIGHLIGHT_ORANGE, HIGHLIGHT_RED};

use std::path::Path;

use crate::analysis::fonts::{document_regular_font, page_font_usage, FontUsage};
use crate::analysis::image_width::{find_nearly_full_width, width_arrows};
use crate::analysis::margin::{
    estimate_document_margin, estimate_page_margin, Margin, PageMargin,
};
use crate::analysis::overflow::{boundary_line, scan_overflow};
use crate::analysis::patterns::{
    find_literal, find_missing_bracket_space, BAD_REFERENCE_PATTERN, DASH_PATTERN,
};
use crate::analysis::sections::SectionAnalyzer;
use crate::analysis::statistics::ChapterCollector;
use crate::analysis::toc::TocDetector;
use crate::error::{Error, Result};
use crate::model::{FontSignature, Point, Rect};
use crate::parser::{Annotation, Color, PdfBackend};

/// Upper bound on the number of pages sampled for estimation.
pub const MAX_SAMPLE_PAGES: usize = 10;
/// Documents up to this length are sampled whole.
const SMALL_DOCUMENT_PAGES: usize = 5;
/// Pages skipped at each end of longer documents.
const SAMPLE_EDGE_PAGES: usize = 2;

/// Colour of boundary lines and arrows.
pub const LINE_COLOR: Color = Color(204, 0, 0);
/// Width of boundary lines and arrows.
pub const LINE_WIDTH: f32 = 1.0;

/// Pages used to estimate the margin and the body font.
///
/// Short documents are used whole. Longer ones skip the first and last two
/// pages (title page, declarations, bibliography) and take up to
/// [`MAX_SAMPLE_PAGES`] evenly spaced pages from the rest.
pub fn sample_pages(page_count: usize) -> Vec<usize> {
    if page_count <= SMALL_DOCUMENT_PAGES {
        return (0..page_count).collect();
    }
    let interior = page_count - 2 * SAMPLE_EDGE_PAGES;
    let size = interior.min(MAX_SAMPLE_PAGES);
    (0..size)
        .map(|i| SAMPLE_EDGE_PAGES + i * interior / size)
        .collect()
}

/// Walkers that carry state from one page to the next during the full pass.
struct Walkers {
    sections: SectionAnalyzer,
    toc: TocDetector,
    chapters: Option<ChapterCollector>,
}

/// Audits one document through a [`PdfBackend`].
pub struct DocumentChecker<B: PdfBackend> {
    backend: B,
    options: CheckOptions,
    margin: Option<Margin>,
    border_not_found: bool,
    regular_font: Option<FontSignature>,
    mistakes_found: bool,
}

impl<B: PdfBackend> DocumentChecker<B> {
    pub fn new(backend: B, options: CheckOptions) -> Self {
        Self {
            backend,
            options,
            margin: None,
            border_not_found: false,
            regular_font: None,
            mistakes_found: false,
        }
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the checker, returning the (annotated) backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// True once any check has flagged a defect.
    pub fn mistakes_found(&self) -> bool {
        self.mistakes_found
    }

    /// True when the margin could not be estimated.
    pub fn border_not_found(&self) -> bool {
        self.border_not_found
    }

    pub fn margin(&self) -> Option<Margin> {
        self.margin
    }

    pub fn regular_font(&self) -> Option<&FontSignature> {
        self.regular_font.as_ref()
    }

    /// Check the document and save the annotated copy to `output`.
    pub fn annotate<P: AsRef<Path>>(&mut self, output: P) -> Result<CheckReport> {
        let report = self.check()?;
        self.backend.save(output.as_ref())?;
        log::info!("Annotated document saved to {}", output.as_ref().display());
        Ok(report)
    }

    /// Check the document, annotating the backend in memory.
    pub fn check(&mut self) -> Result<CheckReport> {
        self.reset();

        let page_count = self.backend.page_count();
        if page_count == 0 {
            return Err(Error::EmptyDocument);
        }

        if self.options.needs_margin() || self.options.needs_font() {
            self.sample(page_count)?;
        }

        let mut report = CheckReport::new(page_count);
        let mut walkers = Walkers {
            sections: SectionAnalyzer::new(),
            toc: TocDetector::new(),
            chapters: self
                .options
                .collect_statistics
                .then(ChapterCollector::new),
        };

        log::info!("Checking {} page(s)", page_count);
        for index in 0..page_count {
            let with_raster = self.options.overflow && self.usable_margin().is_some();
            let ctx = PageContext::load(
                &self.backend,
                index,
                self.options.embedded_pdf_as_image,
                with_raster,
            )?;
            self.check_page(&ctx, &mut walkers, &mut report)?;
        }

        report.mistakes_found = self.mistakes_found;
        report.border_not_found = self.border_not_found;
        report.margin = self.margin;
        report.regular_font = self.regular_font.clone();
        report.statistics = walkers
            .chapters
            .map(|c| c.finish(self.options.statistics.include_pseudo_chapters));

        log::info!(
            "Check finished: {} finding(s), mistakes found: {}",
            report.findings.len(),
            self.mistakes_found
        );
        Ok(report)
    }

    fn reset(&mut self) {
        self.margin = None;
        self.border_not_found = false;
        self.regular_font = None;
        self.mistakes_found = false;
    }

    /// The margin, unless estimation failed.
    fn usable_margin(&self) -> Option<Margin> {
        self.margin.filter(|_| !self.border_not_found)
    }

    fn sample(&mut self, page_count: usize) -> Result<()> {
        let pages = sample_pages(page_count);
        log::info!("Sampling {} page(s) for margin and font", pages.len());

        let mut margins: Vec<PageMargin> = Vec::with_capacity(pages.len());
        let mut usages: Vec<FontUsage> = Vec::with_capacity(pages.len());
        let mut bounds: Option<Rect> = None;

        for &index in &pages {
            let ctx = PageContext::load(
                &self.backend,
                index,
                self.options.embedded_pdf_as_image,
                false,
            )?;
            bounds.get_or_insert(ctx.bounds);
            if self.options.needs_margin() {
                margins.push(estimate_page_margin(&ctx.blocks));
            }
            if self.options.needs_font() {
                usages.push(page_font_usage(&ctx.blocks));
            }
        }

        if self.options.needs_margin() {
            let estimate = estimate_document_margin(&margins, bounds.unwrap_or_default());
            log::debug!("Document margin {:?}", estimate.margin);
            self.margin = Some(estimate.margin);
            self.border_not_found = estimate.border_not_found;
        }
        if self.options.needs_font() {
            self.regular_font = document_regular_font(&usages);
            match &self.regular_font {
                Some(font) => log::debug!("Regular font {:?}", font),
                None => log::warn!("Regular font not found, headings will not be detected"),
            }
        }
        Ok(())
    }

    fn check_page(
        &mut self,
        ctx: &PageContext,
        walkers: &mut Walkers,
        report: &mut CheckReport,
    ) -> Result<()> {
        let margin = self.usable_margin();

        if let (true, Some(margin), Some(raster)) = (self.options.overflow, margin, &ctx.raster) {
            let scan = scan_overflow(raster, &margin);
            for (x, regions) in [(margin.right, &scan.right), (margin.left, &scan.left)] {
                for region in regions {
                    let (from, to) = boundary_line(x, region);
                    self.draw_line(ctx.index, from, to)?;
                }
            }
            let regions: Vec<Rect> = scan.right.into_iter().chain(scan.left).collect();
            self.flag(ctx, CheckKind::Overflow, regions, report)?;
        }

        if self.options.dash {
            let found = find_literal(&ctx.native_blocks, DASH_PATTERN, &ctx.embedded);
            self.flag(ctx, CheckKind::Dash, found, report)?;
        }

        if self.options.bad_reference {
            let found = find_literal(&ctx.native_blocks, BAD_REFERENCE_PATTERN, &ctx.embedded);
            self.flag(ctx, CheckKind::BadReference, found, report)?;
        }

        if let (true, Some(margin)) = (self.options.image_width, margin) {
            let images = find_nearly_full_width(&ctx.blocks, &margin);
            for image in &images {
                for (from, to) in width_arrows(image, &margin) {
                    self.draw_line(ctx.index, from, to)?;
                }
                for x in [margin.left, margin.right] {
                    let (from, to) = boundary_line(x, image);
                    self.draw_line(ctx.index, from, to)?;
                }
            }
            self.flag(ctx, CheckKind::ImageWidth, images, report)?;
        }

        if self.options.toc {
            let found = walkers.toc.check_page(&ctx.blocks);
            self.flag(ctx, CheckKind::Toc, found, report)?;
        }

        if self.options.bracket_spacing {
            let found = find_missing_bracket_space(&ctx.native_blocks, &ctx.embedded);
            self.flag(ctx, CheckKind::BracketSpacing, found, report)?;
        }

        if self.options.empty_section && ctx.index > 0 {
            let column = self.margin.unwrap_or(Margin::new(ctx.bounds.x0, ctx.bounds.x1));
            let found = walkers
                .sections
                .check_page(&ctx.blocks, self.regular_font.as_ref(), &column);
            self.flag(ctx, CheckKind::EmptySection, found, report)?;
        }

        if let Some(chapters) = walkers.chapters.as_mut() {
            chapters.add_page(ctx.number(), &ctx.blocks, self.regular_font.as_ref());
        }

        Ok(())
    }

    /// Record and annotate the findings of one check on one page.
    fn flag(
        &mut self,
        ctx: &PageContext,
        kind: CheckKind,
        rects: Vec<Rect>,
        report: &mut CheckReport,
    ) -> Result<()> {
        if rects.is_empty() {
            return Ok(());
        }
        log::debug!("Page {}: {} x {:?}", ctx.number(), rects.len(), kind);
        self.mistakes_found = true;

        for rect in &rects {
            if let Some(annotation) = kind.highlight(*rect) {
                self.backend.add_annotation(ctx.index, annotation)?;
            }
        }
        report.findings.push(Finding {
            kind,
            page: ctx.number(),
            rects,
        });
        Ok(())
    }

    fn draw_line(&mut self, page: usize, from: Point, to: Point) -> Result<()> {
        self.backend.add_annotation(
            page,
            Annotation::Line {
                from,
                to,
                color: LINE_COLOR,
                width: LINE_WIDTH,
            },
        )
    }
}
