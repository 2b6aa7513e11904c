//! Heading classification and heading text reconstruction.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Block, FontSignature, TextBlock};

static CHAPTER_HEADING_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static PAGE_NUMBER_SUFFIX_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn chapter_heading_regex() -> Option<&'static Regex> {
    CHAPTER_HEADING_REGEX
        .get_or_init(|| {
            // "Kapitola 4", "Chapter 4", "Appendix D", "Příloha D", "Príloha D"
            Regex::new(r"^(?:(?:Kapitola|Chapter) \d+|(?:Příloha|Appendix|Príloha) [A-Z])$").ok()
        })
        .as_ref()
}

fn page_number_suffix_regex() -> Option<&'static Regex> {
    PAGE_NUMBER_SUFFIX_REGEX
        .get_or_init(|| Regex::new(r"\t\d+$").ok())
        .as_ref()
}

/// Distinct fonts of a text block and its number of visual lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockProfile {
    /// Distinct fonts in order of first use
    pub fonts: Vec<FontSignature>,
    /// Lines that start a new baseline (tab continuations excluded)
    pub real_line_count: usize,
}

/// Collect the fonts and real line count of a text block.
pub fn block_profile(block: &TextBlock) -> BlockProfile {
    let mut profile = BlockProfile::default();
    let mut origin_y: Option<f32> = None;

    for line in &block.lines {
        let Some(origin) = line.origin() else {
            continue;
        };
        if origin_y != Some(origin.y) {
            profile.real_line_count += 1;
        }
        origin_y = Some(origin.y);

        for span in &line.spans {
            if !profile.fonts.contains(&span.font) {
                profile.fonts.push(span.font.clone());
            }
        }
    }

    profile
}

/// A block is a heading when it avoids the body font, uses at most two
/// fonts and none of them is smaller than the body font.
///
/// Without a known body font nothing is a heading.
pub fn is_title_block(block: &Block, regular: Option<&FontSignature>) -> bool {
    let (Block::Text(text), Some(regular)) = (block, regular) else {
        return false;
    };

    let profile = block_profile(text);
    !profile.fonts.is_empty()
        && !profile.fonts.contains(regular)
        && profile.fonts.len() <= 2
        && profile.fonts.iter().all(|f| f.size >= regular.size)
}

/// Rebuild the text of a block.
///
/// Tab continuations are joined with `\t`, an indented line starts with
/// `\n`, a trailing hyphen joins the next line and other line ends become a
/// single space. The final separator is dropped.
pub fn block_text(block: &TextBlock) -> String {
    let mut text = String::new();
    let mut origin_y: Option<f32> = None;
    let mut origin_x: Option<f32> = None;

    for line in &block.lines {
        let Some(origin) = line.origin() else {
            continue;
        };

        if origin_y == Some(origin.y) {
            text.pop();
            text.push('\t');
        } else if origin_x.is_some_and(|x| origin.x > x) {
            text.pop();
            text.push('\n');
        }
        origin_y = Some(origin.y);
        origin_x = Some(origin.x);

        text.push_str(&line.text());
        if text.ends_with('-') {
            text.pop();
        } else {
            text.push(' ');
        }
    }
    text.pop();

    text
}

/// True for "Chapter 3", "Kapitola 3", "Appendix B" and the like.
pub fn is_chapter_heading(text: &str) -> bool {
    chapter_heading_regex().is_some_and(|re| re.is_match(text))
}

/// True for table-of-contents entries ending in a tab and a page number.
pub fn has_page_number_suffix(text: &str) -> bool {
    page_number_suffix_regex().is_some_and(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageBlock, ImageSource, Line, Point, Rect, Span};

    fn span(text: &str, x: f32, y: f32, font: &FontSignature) -> Span {
        Span {
            text: text.into(),
            font: font.clone(),
            origin: Point::new(x, y),
            bbox: Rect::new(x, y - 10.0, x + 50.0, y + 2.0),
        }
    }

    fn body() -> FontSignature {
        FontSignature::new("CMR12", 12.0, 4)
    }

    fn heading() -> FontSignature {
        FontSignature::new("CMBX14", 14.4, 20)
    }

    #[test]
    fn test_heading_block_is_title() {
        let h = heading();
        let block = Block::Text(TextBlock::new(vec![Line::new(vec![
            span("2.1", 72.0, 100.0, &h),
            span(" Results", 100.0, 100.0, &h),
        ])]));
        assert!(is_title_block(&block, Some(&body())));
        assert!(!is_title_block(&block, None));
    }

    #[test]
    fn test_body_font_or_small_font_is_not_title() {
        let b = body();
        let with_body = Block::Text(TextBlock::new(vec![Line::new(vec![span(
            "Plain", 72.0, 100.0, &b,
        )])]));
        assert!(!is_title_block(&with_body, Some(&b)));

        let small = FontSignature::new("CMBX10", 10.0, 20);
        let footnote = Block::Text(TextBlock::new(vec![Line::new(vec![span(
            "Note", 72.0, 100.0, &small,
        )])]));
        assert!(!is_title_block(&footnote, Some(&b)));
    }

    #[test]
    fn test_three_fonts_is_not_title() {
        let fonts = [
            FontSignature::new("A", 14.0, 0),
            FontSignature::new("B", 14.0, 0),
            FontSignature::new("C", 14.0, 0),
        ];
        let block = Block::Text(TextBlock::new(vec![Line::new(
            fonts
                .iter()
                .enumerate()
                .map(|(i, f)| span("x", 72.0 + i as f32 * 60.0, 100.0, f))
                .collect(),
        )]));
        assert!(!is_title_block(&block, Some(&body())));
    }

    #[test]
    fn test_image_is_never_title() {
        let block = Block::Image(ImageBlock {
            bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            transform: None,
            size: None,
            source: ImageSource::Native,
        });
        assert!(!is_title_block(&block, Some(&body())));
    }

    #[test]
    fn test_real_line_count_skips_continuations() {
        let h = heading();
        let block = TextBlock::new(vec![
            Line::new(vec![span("Introduction", 72.0, 100.0, &h)]),
            Line::new(vec![span("2", 500.0, 100.0, &h)]),
            Line::new(vec![span("Theory", 72.0, 120.0, &h)]),
        ]);
        let profile = block_profile(&block);
        assert_eq!(profile.real_line_count, 2);
        assert_eq!(profile.fonts, vec![h]);
    }

    #[test]
    fn test_block_text_reconstruction() {
        let f = body();
        let toc_entry = TextBlock::new(vec![
            Line::new(vec![span("Introduction", 72.0, 100.0, &f)]),
            Line::new(vec![span("2", 500.0, 100.0, &f)]),
        ]);
        assert_eq!(block_text(&toc_entry), "Introduction\t2");
        assert!(has_page_number_suffix(&block_text(&toc_entry)));

        let hyphenated = TextBlock::new(vec![
            Line::new(vec![span("inter-", 72.0, 100.0, &f)]),
            Line::new(vec![span("national law", 72.0, 114.0, &f)]),
        ]);
        assert_eq!(block_text(&hyphenated), "international law");

        let paragraphs = TextBlock::new(vec![
            Line::new(vec![span("end of one.", 72.0, 100.0, &f)]),
            Line::new(vec![span("Next one", 90.0, 114.0, &f)]),
        ]);
        assert_eq!(block_text(&paragraphs), "end of one.\nNext one");
    }

    #[test]
    fn test_chapter_heading_pattern() {
        assert!(is_chapter_heading("Chapter 4"));
        assert!(is_chapter_heading("Kapitola 12"));
        assert!(is_chapter_heading("Příloha D"));
        assert!(is_chapter_heading("Appendix A"));
        assert!(!is_chapter_heading("Chapter 4 Results"));
        assert!(!is_chapter_heading("Appendix d"));
        assert!(!has_page_number_suffix("Introduction 2"));
    }
}
