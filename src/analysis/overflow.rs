//! Raster scan for content outside the text column.
//!
//! Each scanline is searched from the page edge towards the margin. The
//! first ink pixel either opens a region or grows the region left open by
//! the previous scanline; a scanline without ink closes the open region.

use crate::model::{Point, Raster, Rect};

use super::margin::Margin;

/// Padding added around every out-of-margin pixel.
pub const HIGHLIGHT_PADDING: f32 = 1.5;
/// How far boundary lines extend above and below a flagged region.
pub const BOUNDARY_EXTENSION: f32 = 20.0;

/// Regions found on both sides of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverflowScan {
    pub right: Vec<Rect>,
    pub left: Vec<Rect>,
}

impl OverflowScan {
    pub fn is_empty(&self) -> bool {
        self.right.is_empty() && self.left.is_empty()
    }
}

/// Closed regions plus the one still growing.
#[derive(Debug, Default)]
struct Regions {
    closed: Vec<Rect>,
    open: Option<Rect>,
}

impl Regions {
    fn hit(&mut self, open_with: Rect, grow: impl FnOnce(&mut Rect)) {
        match self.open.as_mut() {
            Some(region) => grow(region),
            None => self.open = Some(open_with),
        }
    }

    fn close(&mut self) {
        if let Some(region) = self.open.take() {
            self.closed.push(region);
        }
    }

    fn finish(mut self) -> Vec<Rect> {
        self.close();
        self.closed
    }
}

/// Scan both sides of the page.
pub fn scan_overflow(raster: &Raster, margin: &Margin) -> OverflowScan {
    OverflowScan {
        right: right_overflow(raster, margin.right),
        left: left_overflow(raster, margin.left),
    }
}

/// Regions with ink to the right of `right`.
pub fn right_overflow(raster: &Raster, right: f32) -> Vec<Rect> {
    let border = right.round() as i64;
    let mut regions = Regions::default();

    for y in 0..raster.height() {
        let yf = y as f32;
        let hit = (border + 1..raster.width() as i64)
            .rev()
            .find(|&x| x >= 0 && raster.is_ink(x as u32, y));

        match hit {
            Some(x) => {
                let far = x as f32 + HIGHLIGHT_PADDING;
                regions.hit(
                    Rect::new(
                        (border + 1) as f32,
                        yf - HIGHLIGHT_PADDING,
                        far,
                        yf + HIGHLIGHT_PADDING,
                    ),
                    |r| {
                        r.x1 = r.x1.max(far);
                        r.y1 = yf + HIGHLIGHT_PADDING;
                    },
                );
            }
            None => regions.close(),
        }
    }

    regions.finish()
}

/// Regions with ink to the left of `left`.
pub fn left_overflow(raster: &Raster, left: f32) -> Vec<Rect> {
    let border = left.round() as i64 - 1;
    let end = border.min(raster.width() as i64);
    let mut regions = Regions::default();

    for y in 0..raster.height() {
        let yf = y as f32;
        let hit = (0..end).find(|&x| raster.is_ink(x as u32, y));

        match hit {
            Some(x) => {
                let near = x as f32 - HIGHLIGHT_PADDING;
                regions.hit(
                    Rect::new(near, yf - HIGHLIGHT_PADDING, border as f32, yf + HIGHLIGHT_PADDING),
                    |r| {
                        r.x0 = r.x0.min(near);
                        r.y1 = yf + HIGHLIGHT_PADDING;
                    },
                );
            }
            None => regions.close(),
        }
    }

    regions.finish()
}

/// Vertical boundary line at `x` spanning `region` plus the extension.
pub fn boundary_line(x: f32, region: &Rect) -> (Point, Point) {
    (
        Point::new(x, region.y0 - BOUNDARY_EXTENSION),
        Point::new(x, region.y1 + BOUNDARY_EXTENSION),
    )
}
