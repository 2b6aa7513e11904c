//! Page content model: typed blocks, lines and spans.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};
use crate::analysis::transform::Matrix;

/// Span flag: italic font.
pub const FLAG_ITALIC: u32 = 1 << 1;
/// Span flag: serifed font.
pub const FLAG_SERIFED: u32 = 1 << 2;
/// Span flag: monospaced font.
pub const FLAG_MONOSPACED: u32 = 1 << 3;
/// Span flag: bold font.
pub const FLAG_BOLD: u32 = 1 << 4;

/// Identity of a font as used by a span: name, size and style flags.
///
/// The size is rounded to five decimal places on construction, so two spans
/// share a font iff their signatures compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSignature {
    pub name: String,
    pub size: f32,
    pub flags: u32,
}

impl FontSignature {
    pub fn new(name: impl Into<String>, size: f32, flags: u32) -> Self {
        Self {
            name: name.into(),
            size: round_size(size),
            flags,
        }
    }

    /// Derive style flags from a base font name (e.g. "Helvetica-BoldOblique").
    pub fn flags_from_name(name: &str) -> u32 {
        let lower = name.to_lowercase();
        let mut flags = 0;
        if lower.contains("bold") || lower.contains("black") || lower.contains("heavy") {
            flags |= FLAG_BOLD;
        }
        if lower.contains("italic") || lower.contains("oblique") {
            flags |= FLAG_ITALIC;
        }
        if lower.contains("mono") || lower.contains("courier") {
            flags |= FLAG_MONOSPACED;
        }
        if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
            flags |= FLAG_SERIFED;
        }
        flags
    }
}

fn round_size(size: f32) -> f32 {
    (size * 100_000.0).round() / 100_000.0
}

impl PartialEq for FontSignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size.to_bits() == other.size.to_bits()
            && self.flags == other.flags
    }
}

impl Eq for FontSignature {}

impl Hash for FontSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.flags.hash(state);
    }
}

/// A run of text sharing one font.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub font: FontSignature,
    /// Baseline start of the span
    pub origin: Point,
    pub bbox: Rect,
}

/// A visual line: spans sharing a baseline, in left-to-right order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
    pub bbox: Rect,
}

impl Line {
    /// Build a line, computing its bounding box from the spans.
    pub fn new(spans: Vec<Span>) -> Self {
        let bbox = spans
            .iter()
            .map(|s| s.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { spans, bbox }
    }

    /// Origin of the first span, if any.
    pub fn origin(&self) -> Option<Point> {
        self.spans.first().map(|s| s.origin)
    }

    /// Combined span text, with a space wherever the gap between two spans
    /// is a word break.
    pub fn text(&self) -> String {
        self.text_with_ranges().0
    }

    /// Combined text together with the byte range each span occupies in it.
    ///
    /// Inserted word spaces belong to no span.
    pub fn text_with_ranges(&self) -> (String, Vec<(usize, usize)>) {
        let mut text = String::new();
        let mut ranges = Vec::with_capacity(self.spans.len());

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 && needs_word_space(&self.spans[i - 1], span) {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(&span.text);
            ranges.push((start, text.len()));
        }

        (text, ranges)
    }
}

/// Whether a space separates `prev` and `next` when joined.
///
/// A gap wider than a fifth of the average character width of `next` is a
/// word break, except between characters of scripts written without spaces.
fn needs_word_space(prev: &Span, next: &Span) -> bool {
    let gap = next.bbox.x0 - prev.bbox.x1;

    let char_count = next.text.chars().count();
    let avg_char_width = if char_count > 0 && next.bbox.width() > 0.0 {
        next.bbox.width() / char_count as f32
    } else {
        next.font.size * 0.5
    };
    if gap <= avg_char_width * 0.2 {
        return false;
    }

    let prev_last = prev.text.chars().last();
    let next_first = next.text.chars().next();
    if prev_last.is_some_and(is_spaceless_script_char)
        && next_first.is_some_and(is_spaceless_script_char)
    {
        return false;
    }

    !prev_last.is_some_and(is_space) && !next_first.is_some_and(is_space)
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\u{00A0}'
}

/// Check if character is from a script that doesn't use word spaces.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// A block of text lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: Rect,
    pub lines: Vec<Line>,
}

impl TextBlock {
    /// Build a block, computing its bounding box from the lines.
    pub fn new(lines: Vec<Line>) -> Self {
        let bbox = lines
            .iter()
            .map(|l| l.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { bbox, lines }
    }

    /// Iterate all spans of the block.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }
}

/// Where an image block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Extracted by the PDF engine
    Native,
    /// Synthesized for an embedded reusable object (e.g. an included PDF page)
    Embedded,
}

/// An image placed on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlock {
    pub bbox: Rect,
    /// Placement transform, when known
    pub transform: Option<Matrix>,
    /// Byte size of the image data, when known
    pub size: Option<u64>,
    pub source: ImageSource,
}

/// A content block on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
}

impl Block {
    pub fn bbox(&self) -> Rect {
        match self {
            Block::Text(t) => t.bbox,
            Block::Image(i) => i.bbox,
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(t) => Some(t),
            Block::Image(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image(_))
    }
}

/// Sort blocks into reading order (top-to-bottom, then left-to-right).
pub fn sort_reading_order(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| a.bbox().reading_order(&b.bbox()));
}
