//! Table of contents listing headings of level three or deeper.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Block, Rect};

static DEEP_NUMBERING_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn deep_numbering_regex() -> Option<&'static Regex> {
    DEEP_NUMBERING_REGEX
        .get_or_init(|| {
            // "3.12.5", "C.2.3"
            Regex::new(r"^(?:\d+|[A-Z])\.(?:\d+\.)+\d+").ok()
        })
        .as_ref()
}

/// True if `text` starts with a section number of three or more levels.
pub fn is_deep_numbering(text: &str) -> bool {
    deep_numbering_regex().is_some_and(|re| re.is_match(text))
}

/// Tracks whether the current page belongs to the table of contents.
///
/// A page whose first block is a single line reading "Obsah" or "Contents"
/// starts the table; any other single-line first block ends it. Pages that
/// open with a longer block keep the previous state, so a table spanning
/// several pages is followed.
#[derive(Debug, Clone, Default)]
pub struct TocDetector {
    in_toc: bool,
}

impl TocDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_toc(&self) -> bool {
        self.in_toc
    }

    fn update(&mut self, first: &Block) {
        let Some(text) = first.as_text() else {
            return;
        };
        if text.lines.len() != 1 {
            return;
        }
        if let Some(span) = text.lines[0].spans.first() {
            let title = span.text.trim().to_lowercase();
            self.in_toc = title == "obsah" || title == "contents";
        }
    }

    /// Lines of a table-of-contents page that list deep headings.
    pub fn check_page(&mut self, blocks: &[Block]) -> Vec<Rect> {
        let Some(first) = blocks.first() else {
            return Vec::new();
        };
        self.update(first);
        if !self.in_toc {
            return Vec::new();
        }

        let mut flagged = Vec::new();
        for text in blocks.iter().filter_map(Block::as_text) {
            let mut origin_y: Option<f32> = None;
            for line in &text.lines {
                let Some(span) = line.spans.first() else {
                    continue;
                };
                if origin_y != Some(span.origin.y) && is_deep_numbering(&span.text) {
                    flagged.push(line.bbox);
                }
                origin_y = Some(span.origin.y);
            }
        }
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontSignature, Line, Point, Span, TextBlock};

    fn line(text: &str, x: f32, y: f32) -> Line {
        Line::new(vec![Span {
            text: text.into(),
            font: FontSignature::new("CMR12", 12.0, 4),
            origin: Point::new(x, y),
            bbox: Rect::new(x, y - 10.0, x + 100.0, y + 2.0),
        }])
    }

    fn block(lines: Vec<Line>) -> Block {
        Block::Text(TextBlock::new(lines))
    }

    #[test]
    fn test_deep_numbering() {
        assert!(is_deep_numbering("3.4.2 Results"));
        assert!(is_deep_numbering("C.2.3 Listings"));
        assert!(is_deep_numbering("3.12.5.1"));
        assert!(!is_deep_numbering("3.4 Results"));
        assert!(!is_deep_numbering("Results 3.4.2"));
    }

    #[test]
    fn test_flags_deep_headings_on_toc_page() {
        let blocks = vec![
            block(vec![line(" Contents ", 72.0, 80.0)]),
            block(vec![
                line("3.4 Results", 72.0, 120.0),
                line("3.4.2 Results", 90.0, 134.0),
                line("3.4.2.1", 300.0, 134.0),
            ]),
        ];
        let mut toc = TocDetector::new();
        let flagged = toc.check_page(&blocks);
        assert_eq!(flagged, vec![Rect::new(90.0, 124.0, 190.0, 136.0)]);
    }

    #[test]
    fn test_ignores_other_pages() {
        let blocks = vec![
            block(vec![line("Introduction", 72.0, 80.0)]),
            block(vec![line("3.4.2 Results", 72.0, 120.0)]),
        ];
        let mut toc = TocDetector::new();
        assert!(toc.check_page(&blocks).is_empty());
        assert!(!toc.in_toc());
    }

    #[test]
    fn test_toc_continues_on_next_page() {
        let mut toc = TocDetector::new();
        toc.check_page(&[block(vec![line("Obsah", 72.0, 80.0)])]);
        assert!(toc.in_toc());

        // second page opens with a multi-line block
        let next = vec![block(vec![
            line("4.1 Data", 72.0, 80.0),
            line("4.1.1 Sources", 72.0, 94.0),
        ])];
        assert_eq!(toc.check_page(&next).len(), 1);

        // a single-line heading ends the table
        toc.check_page(&[block(vec![line("Chapter 1", 72.0, 80.0)])]);
        assert!(!toc.in_toc());
    }
}
