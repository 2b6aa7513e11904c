//! Literal and regex text checks with highlight rectangles.
//!
//! Matches are located on the page's native text lines. A match inside an
//! embedded object is discarded when embedded objects are given.

use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::model::{Block, ImageBlock, Line, Rect, Span};

use super::embedded::is_inside_embedded;

/// Hyphen typed where a dash belongs.
pub const DASH_PATTERN: &str = " - ";
/// Marker LaTeX prints for an unresolved reference.
pub const BAD_REFERENCE_PATTERN: &str = "??";

static BRACKET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn bracket_regex() -> Option<&'static Regex> {
    BRACKET_REGEX
        .get_or_init(|| {
            // "l(", ".[", "5{"
            Regex::new(r"\S(?:\(|\[|\{)").ok()
        })
        .as_ref()
}

/// Rectangles of every occurrence of `needle` within a single line.
pub fn search_text(blocks: &[Block], needle: &str) -> Vec<Rect> {
    if needle.is_empty() {
        return Vec::new();
    }
    blocks
        .iter()
        .filter_map(Block::as_text)
        .flat_map(|b| b.lines.iter())
        .flat_map(|line| search_line(line, needle))
        .collect()
}

fn search_line(line: &Line, needle: &str) -> Vec<Rect> {
    let (text, ranges) = line.text_with_ranges();
    let pieces: Vec<(usize, usize, &Span)> = ranges
        .into_iter()
        .zip(&line.spans)
        .map(|((start, stop), span)| (start, stop, span))
        .collect();

    let mut rects = Vec::new();
    for (pos, found) in text.match_indices(needle) {
        let end = pos + found.len();
        let rect = pieces
            .iter()
            .filter_map(|&(start, stop, span)| {
                let lo = pos.max(start);
                let hi = end.min(stop);
                (lo < hi).then(|| span_slice_rect(span, lo - start, hi - start))
            })
            .reduce(|a, b| a.union(&b));
        rects.extend(rect);
    }
    rects
}

/// Approximate box of the byte range `lo..hi` of a span, assuming equal
/// character widths.
fn span_slice_rect(span: &Span, lo: usize, hi: usize) -> Rect {
    let total = span.text.chars().count().max(1) as f32;
    let before = span.text[..lo].chars().count() as f32;
    let through = span.text[..hi].chars().count() as f32;
    let char_width = span.bbox.width() / total;
    Rect::new(
        span.bbox.x0 + char_width * before,
        span.bbox.y0,
        span.bbox.x0 + char_width * through,
        span.bbox.y1,
    )
}

/// Keep valid rectangles that are not inside an embedded object.
pub fn filter_matches(rects: Vec<Rect>, embedded: &[ImageBlock]) -> Vec<Rect> {
    rects
        .into_iter()
        .filter(|r| r.is_valid() && !is_inside_embedded(r, embedded))
        .collect()
}

/// Occurrences of `needle` outside embedded objects.
pub fn find_literal(blocks: &[Block], needle: &str, embedded: &[ImageBlock]) -> Vec<Rect> {
    filter_matches(search_text(blocks, needle), embedded)
}

/// Page text with lines joined by spaces, hyphenated line breaks joined and
/// blocks separated by blank lines.
pub fn page_text(blocks: &[Block]) -> String {
    let mut page = String::new();
    for text in blocks.iter().filter_map(Block::as_text) {
        let mut block = String::new();
        for line in &text.lines {
            if block.ends_with('-') {
                block.pop();
            } else if !block.is_empty() {
                block.push(' ');
            }
            block.push_str(&line.text());
        }
        page.push_str(&block);
        page.push_str("\n\n");
    }
    page
}

/// Distinct "character followed by an opening bracket" matches, in order.
pub fn bracket_matches(text: &str) -> Vec<String> {
    let Some(re) = bracket_regex() else {
        return Vec::new();
    };
    let unique: IndexSet<&str> = re.find_iter(text).map(|m| m.as_str()).collect();
    unique.into_iter().map(String::from).collect()
}

/// Opening brackets not preceded by a space.
pub fn find_missing_bracket_space(blocks: &[Block], embedded: &[ImageBlock]) -> Vec<Rect> {
    bracket_matches(&page_text(blocks))
        .iter()
        .flat_map(|m| find_literal(blocks, m, embedded))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontSignature, ImageSource, Point, TextBlock};

    fn span(text: &str, x0: f32, x1: f32, y: f32) -> Span {
        Span {
            text: text.into(),
            font: FontSignature::new("CMR12", 12.0, 4),
            origin: Point::new(x0, y),
            bbox: Rect::new(x0, y - 10.0, x1, y + 2.0),
        }
    }

    fn page(lines: Vec<Vec<Span>>) -> Vec<Block> {
        vec![Block::Text(TextBlock::new(
            lines.into_iter().map(Line::new).collect(),
        ))]
    }

    #[test]
    fn test_search_interpolates_position() {
        // ten characters, ten units each
        let blocks = page(vec![vec![span("see ?? now", 100.0, 200.0, 50.0)]]);
        let rects = search_text(&blocks, BAD_REFERENCE_PATTERN);
        assert_eq!(rects, vec![Rect::new(140.0, 40.0, 160.0, 52.0)]);
    }

    #[test]
    fn test_search_across_spans() {
        let blocks = page(vec![vec![
            span("word ", 100.0, 150.0, 50.0),
            span("- next", 150.0, 210.0, 50.0),
        ]]);
        let rects = search_text(&blocks, DASH_PATTERN);
        assert_eq!(rects, vec![Rect::new(140.0, 40.0, 170.0, 52.0)]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let blocks = page(vec![vec![span("well–formed", 100.0, 200.0, 50.0)]]);
        assert!(find_literal(&blocks, DASH_PATTERN, &[]).is_empty());
    }

    #[test]
    fn test_matches_inside_embedded_are_dropped() {
        let blocks = page(vec![vec![span("see ?? now", 100.0, 200.0, 50.0)]]);
        let embedded = vec![ImageBlock {
            bbox: Rect::new(90.0, 30.0, 300.0, 100.0),
            transform: None,
            size: None,
            source: ImageSource::Embedded,
        }];
        assert!(find_literal(&blocks, BAD_REFERENCE_PATTERN, &embedded).is_empty());
        assert_eq!(find_literal(&blocks, BAD_REFERENCE_PATTERN, &[]).len(), 1);
    }

    #[test]
    fn test_page_text_dehyphenates() {
        let blocks = page(vec![
            vec![span("inter-", 100.0, 160.0, 50.0)],
            vec![span("national law", 100.0, 220.0, 64.0)],
            vec![span("applies", 100.0, 170.0, 78.0)],
        ]);
        assert_eq!(page_text(&blocks), "international law applies\n\n");
    }

    #[test]
    fn test_bracket_matches_are_unique() {
        let matches = bracket_matches("see table(1) and table(2), list[3] but not (4)");
        assert_eq!(matches, vec!["e(".to_string(), "t[".to_string()]);
    }

    #[test]
    fn test_missing_bracket_space() {
        let blocks = page(vec![vec![span("f(x) and g (y)", 100.0, 240.0, 50.0)]]);
        let rects = find_missing_bracket_space(&blocks, &[]);
        assert_eq!(rects, vec![Rect::new(100.0, 40.0, 120.0, 52.0)]);
    }
}
