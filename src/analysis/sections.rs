//! Headings with no body text between them.

use crate::model::{Block, FontSignature, Rect};

use super::margin::Margin;
use super::title::{block_text, has_page_number_suffix, is_chapter_heading, is_title_block};

/// Walks headings page by page, remembering whether the last block seen
/// was a heading.
#[derive(Debug, Clone, Default)]
pub struct SectionAnalyzer {
    previous_was_title: bool,
}

impl SectionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gaps between consecutive headings on one page, spanning the column.
    ///
    /// A heading right after a chapter heading ("Chapter 2") is expected and
    /// table-of-contents entries (ending in a tab and a page number) are
    /// never reported.
    pub fn check_page(
        &mut self,
        blocks: &[Block],
        regular: Option<&FontSignature>,
        margin: &Margin,
    ) -> Vec<Rect> {
        let mut gaps = Vec::new();
        let mut previous_new_chapter = false;

        for (i, block) in blocks.iter().enumerate() {
            let Some(text) = block
                .as_text()
                .filter(|_| is_title_block(block, regular))
            else {
                previous_new_chapter = false;
                self.previous_was_title = false;
                continue;
            };

            let heading = block_text(text);
            let previous = i.checked_sub(1).map(|p| blocks[p].bbox());
            if self.previous_was_title && !previous_new_chapter && !has_page_number_suffix(&heading)
            {
                // the previous heading may sit on an earlier page
                if let Some(previous) = previous {
                    let gap = Rect::new(margin.left, previous.y1, margin.right, text.bbox.y0);
                    if gap.is_valid() {
                        log::debug!("Empty section before {:?}", heading);
                        gaps.push(gap);
                    }
                }
            }

            previous_new_chapter = is_chapter_heading(&heading);
            self.previous_was_title = true;
        }

        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Line, Point, Span, TextBlock};

    fn body() -> FontSignature {
        FontSignature::new("CMR12", 12.0, 4)
    }

    fn heading() -> FontSignature {
        FontSignature::new("CMBX14", 14.4, 20)
    }

    fn block(text: &str, y: f32, font: &FontSignature) -> Block {
        Block::Text(TextBlock::new(vec![Line::new(vec![Span {
            text: text.into(),
            font: font.clone(),
            origin: Point::new(72.0, y),
            bbox: Rect::new(72.0, y - 12.0, 300.0, y + 3.0),
        }])]))
    }

    fn margin() -> Margin {
        Margin::new(72.0, 520.0)
    }

    #[test]
    fn test_consecutive_headings_flag_gap() {
        let blocks = vec![
            block("2.1 Method", 100.0, &heading()),
            block("2.1.1 Setup", 140.0, &heading()),
        ];
        let mut analyzer = SectionAnalyzer::new();
        let gaps = analyzer.check_page(&blocks, Some(&body()), &margin());
        assert_eq!(gaps, vec![Rect::new(72.0, 103.0, 520.0, 128.0)]);
    }

    #[test]
    fn test_body_text_between_headings() {
        let blocks = vec![
            block("2.1 Method", 100.0, &heading()),
            block("We measured things.", 130.0, &body()),
            block("2.1.1 Setup", 160.0, &heading()),
        ];
        let mut analyzer = SectionAnalyzer::new();
        assert!(analyzer.check_page(&blocks, Some(&body()), &margin()).is_empty());
    }

    #[test]
    fn test_heading_after_chapter_heading_is_fine() {
        let blocks = vec![
            block("Chapter 2", 100.0, &heading()),
            block("Results", 140.0, &heading()),
        ];
        let mut analyzer = SectionAnalyzer::new();
        assert!(analyzer.check_page(&blocks, Some(&body()), &margin()).is_empty());
    }

    #[test]
    fn test_toc_entries_are_skipped() {
        let h = heading();
        let entry = Block::Text(TextBlock::new(vec![
            Line::new(vec![Span {
                text: "Introduction".into(),
                font: h.clone(),
                origin: Point::new(72.0, 140.0),
                bbox: Rect::new(72.0, 128.0, 200.0, 143.0),
            }]),
            Line::new(vec![Span {
                text: "7".into(),
                font: h.clone(),
                origin: Point::new(500.0, 140.0),
                bbox: Rect::new(500.0, 128.0, 510.0, 143.0),
            }]),
        ]));
        let blocks = vec![block("Contents", 100.0, &h), entry];
        let mut analyzer = SectionAnalyzer::new();
        assert!(analyzer.check_page(&blocks, Some(&body()), &margin()).is_empty());
    }

    #[test]
    fn test_overlapping_headings_are_not_flagged() {
        let blocks = vec![
            block("2.1 Method", 100.0, &heading()),
            block("2.1.1 Setup", 105.0, &heading()),
        ];
        let mut analyzer = SectionAnalyzer::new();
        assert!(analyzer.check_page(&blocks, Some(&body()), &margin()).is_empty());
    }

    #[test]
    fn test_heading_state_carries_across_pages() {
        let mut analyzer = SectionAnalyzer::new();
        analyzer.check_page(&[block("2.1 Method", 700.0, &heading())], Some(&body()), &margin());
        assert!(analyzer.previous_was_title);

        // no gap on the new page to highlight
        let gaps = analyzer.check_page(
            &[block("2.1.1 Setup", 100.0, &heading())],
            Some(&body()),
            &margin(),
        );
        assert!(gaps.is_empty());
        assert!(analyzer.previous_was_title);
    }
}
