//! Body font detection.

use indexmap::IndexMap;

use crate::model::{Block, FontSignature};

/// Characters set in each font, in order of first use.
pub type FontUsage = IndexMap<FontSignature, usize>;

/// Count characters per font over all text blocks of a page.
pub fn page_font_usage(blocks: &[Block]) -> FontUsage {
    let mut usage = FontUsage::new();
    for text in blocks.iter().filter_map(Block::as_text) {
        for span in text.spans() {
            *usage.entry(span.font.clone()).or_insert(0) += span.text.chars().count();
        }
    }
    usage
}

/// The font with the most characters; the first one seen wins a tie.
pub fn dominant_font(usage: &FontUsage) -> Option<&FontSignature> {
    let mut best: Option<(&FontSignature, usize)> = None;
    for (font, count) in usage {
        if best.map_or(true, |(_, c)| *count > c) {
            best = Some((font, *count));
        }
    }
    best.map(|(font, _)| font)
}

/// Merge usage of the sampled pages and pick the document's body font.
pub fn document_regular_font<'a, I>(pages: I) -> Option<FontSignature>
where
    I: IntoIterator<Item = &'a FontUsage>,
{
    let mut merged = FontUsage::new();
    for usage in pages {
        for (font, count) in usage {
            *merged.entry(font.clone()).or_insert(0) += count;
        }
    }
    dominant_font(&merged).cloned()
}
