//! Attribution of page content to chapters.

use crate::analysis::title::{
    block_text, has_page_number_suffix, is_chapter_heading, is_title_block,
};
use crate::model::{Block, FontSignature};

use super::chapter::ChapterInfo;
use super::report::DocumentStatistics;

/// Headings that end the chapter sequence (bibliography and the like).
const END_MATTER_HEADINGS: &[&str] = &[
    "bibliography",
    "references",
    "literatura",
    "bibliografie",
    "seznam použité literatury",
    "zdroje",
];

/// Where content is currently attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    BeforeFirst,
    Chapter(usize),
    AfterLast,
}

/// Collects chapter statistics while pages are walked in order.
#[derive(Debug, Clone)]
pub struct ChapterCollector {
    before: ChapterInfo,
    chapters: Vec<ChapterInfo>,
    after: ChapterInfo,
    target: Target,
    /// The previous block opened a chapter; a heading right after it
    /// completes the chapter title
    title_pending: bool,
}

impl Default for ChapterCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapterCollector {
    pub fn new() -> Self {
        Self {
            before: ChapterInfo::default(),
            chapters: Vec::new(),
            after: ChapterInfo::default(),
            target: Target::BeforeFirst,
            title_pending: false,
        }
    }

    fn current(&mut self) -> &mut ChapterInfo {
        match self.target {
            Target::BeforeFirst => &mut self.before,
            Target::Chapter(i) => &mut self.chapters[i],
            Target::AfterLast => &mut self.after,
        }
    }

    /// Attribute the blocks of one page (1-based `page`).
    pub fn add_page(&mut self, page: usize, blocks: &[Block], regular: Option<&FontSignature>) {
        for block in blocks {
            match block {
                Block::Text(text_block) => {
                    let text = block_text(text_block);
                    let is_title = is_title_block(block, regular);

                    if is_title && is_chapter_heading(&text) {
                        let sequence = self.chapters.len() + 1;
                        log::debug!("Chapter {} starts on page {}: {:?}", sequence, page, text);
                        self.chapters.push(ChapterInfo::new(sequence, Some(text.clone())));
                        self.target = Target::Chapter(self.chapters.len() - 1);
                        self.title_pending = true;
                    } else if is_title && is_end_matter_heading(&text) {
                        log::debug!("End matter starts on page {}: {:?}", page, text);
                        self.target = Target::AfterLast;
                        self.title_pending = false;
                    } else {
                        if is_title && self.title_pending {
                            if let Some(title) = self.current().title.as_mut() {
                                title.push(' ');
                                title.push_str(&text);
                            }
                        }
                        self.title_pending = false;
                    }

                    let chapter = self.current();
                    chapter.add_page(page);
                    chapter.add_text(&text);
                }
                Block::Image(image) => {
                    self.title_pending = false;
                    let chapter = self.current();
                    chapter.add_page(page);
                    chapter.add_picture(image.bbox, page);
                }
            }
        }
    }

    /// Number of chapters opened so far.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Roll up everything collected.
    pub fn finish(&self, include_pseudo_chapters: bool) -> DocumentStatistics {
        DocumentStatistics::build(
            &self.before,
            &self.chapters,
            &self.after,
            include_pseudo_chapters,
        )
    }
}

/// True for bibliography-style headings, ignoring case and a leading
/// section number.
pub fn is_end_matter_heading(text: &str) -> bool {
    if has_page_number_suffix(text) {
        return false;
    }
    let heading = text
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim()
        .to_lowercase();
    END_MATTER_HEADINGS.contains(&heading.as_str())
}
