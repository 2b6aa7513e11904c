//! Images that almost, but not quite, span the text column.

use crate::model::{Block, Point, Rect};

use super::margin::Margin;

/// Lower bound (exclusive) of the flagged width, in percent of the column.
pub const MIN_WIDTH_PERCENT: f32 = 85.0;
/// Upper bound (exclusive) of the flagged width, in percent of the column.
pub const MAX_WIDTH_PERCENT: f32 = 99.0;

/// Height of an arrow barb.
const BARB_RISE: f32 = 2.0;
/// Length of an arrow barb along the shaft.
const BARB_RUN: f32 = 5.0;

/// A straight line segment to draw.
pub type Segment = (Point, Point);

/// Width of `image` as a percentage of the text column.
pub fn width_percentage(image: &Rect, margin: &Margin) -> f32 {
    image.width() * 100.0 / margin.line_width()
}

/// True when the image width falls strictly between the bounds.
pub fn is_nearly_full_width(image: &Rect, margin: &Margin) -> bool {
    let pct = width_percentage(image, margin);
    pct > MIN_WIDTH_PERCENT && pct < MAX_WIDTH_PERCENT
}

/// Bounding boxes of all images on the page with a suspicious width.
pub fn find_nearly_full_width(blocks: &[Block], margin: &Margin) -> Vec<Rect> {
    blocks
        .iter()
        .filter(|b| b.is_image())
        .map(Block::bbox)
        .filter(|bbox| is_nearly_full_width(bbox, margin))
        .collect()
}

/// Horizontal arrow from `x` to `tip` at height `y`: the shaft and two barbs.
pub fn arrow(tip: f32, x: f32, y: f32) -> [Segment; 3] {
    let direction = if tip > x { -1.0 } else { 1.0 };
    let barb_x = tip + direction * BARB_RUN;
    let point = Point::new(tip, y);
    [
        (point, Point::new(x, y)),
        (point, Point::new(barb_x, y - direction * BARB_RISE)),
        (point, Point::new(barb_x, y + direction * BARB_RISE)),
    ]
}

/// Arrows from both margins towards the edges of a flagged image.
pub fn width_arrows(image: &Rect, margin: &Margin) -> Vec<Segment> {
    let y = image.y0 + image.height() / 2.0;
    let mut segments = Vec::with_capacity(6);
    segments.extend(arrow(margin.left, image.x0, y));
    segments.extend(arrow(margin.right, image.x1, y));
    segments
}
