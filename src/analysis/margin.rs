//! Text column margin estimation.
//!
//! A page's margin is the median of the left and right edges of its text
//! lines and images, after dropping edges that do not describe the column:
//! the right edge of a line followed by a tab continuation, the right edge of
//! the last line of every paragraph and the left edge of indented first lines.

use serde::{Deserialize, Serialize};

use crate::model::{Block, Rect};

/// Left and right x-coordinates bounding the text column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f32,
    pub right: f32,
}

impl Margin {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Width of the text column.
    pub fn line_width(&self) -> f32 {
        self.right - self.left
    }
}

/// Per-page margin; a side is `None` when the page offered no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageMargin {
    pub left: Option<f32>,
    pub right: Option<f32>,
}

/// Document margin together with the degradation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginEstimate {
    pub margin: Margin,
    /// Estimation failed and `margin` is a fallback derived from the page.
    pub border_not_found: bool,
}

/// Estimate the margin of one page from its blocks in reading order.
pub fn estimate_page_margin(blocks: &[Block]) -> PageMargin {
    let mut lefts: Vec<f32> = Vec::new();
    let mut rights: Vec<f32> = Vec::new();

    for block in blocks {
        match block {
            Block::Image(image) => {
                lefts.push(image.bbox.x0);
                rights.push(image.bbox.x1);
            }
            Block::Text(text) if text.lines.len() > 1 => {
                let mut origin_y: Option<f32> = None;
                let mut origin_x: Option<f32> = None;

                for line in &text.lines {
                    let Some(origin) = line.origin() else {
                        continue;
                    };

                    if origin_y == Some(origin.y) {
                        // tab continuation, the previous right edge is not a line end
                        rights.pop();
                    } else {
                        lefts.push(line.bbox.x0);
                        if origin_x.is_some_and(|x| origin.x > x) {
                            // indented first line of a new paragraph
                            rights.pop();
                            lefts.pop();
                        }
                        origin_x = Some(origin.x);
                    }

                    origin_y = Some(origin.y);
                    rights.push(line.bbox.x1);
                }

                // last line of the block is usually short
                rights.pop();
            }
            Block::Text(_) => {}
        }
    }

    PageMargin {
        left: median(&lefts),
        right: median(&rights),
    }
}

/// Combine sampled page margins into the document margin.
///
/// If either side is missing or the sides are out of order, the missing side
/// falls back to the page edge and the estimate is flagged.
pub fn estimate_document_margin(pages: &[PageMargin], page_bounds: Rect) -> MarginEstimate {
    let lefts: Vec<f32> = pages.iter().filter_map(|p| p.left).collect();
    let rights: Vec<f32> = pages.iter().filter_map(|p| p.right).collect();

    match (median(&lefts), median(&rights)) {
        (Some(left), Some(right)) if left < right => MarginEstimate {
            margin: Margin::new(left, right),
            border_not_found: false,
        },
        (left, right) => {
            let margin = match (left, right) {
                (Some(left), None) => Margin::new(left, page_bounds.x1),
                (None, Some(right)) => Margin::new(page_bounds.x0, right),
                _ => Margin::new(page_bounds.x0, page_bounds.x1),
            };
            log::warn!(
                "Text margin not found (left {:?}, right {:?}), using {:?}",
                left,
                right,
                margin
            );
            MarginEstimate {
                margin,
                border_not_found: true,
            }
        }
    }
}

/// Median of the values; the mean of the two middle values for even counts.
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
