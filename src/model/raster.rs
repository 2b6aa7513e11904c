//! Page raster used by the overflow scan.

use image::{Rgb, RgbImage};

/// Background colour of a rendered page.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// A rendered page at 72 dpi, so one pixel equals one page unit.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    /// Create an all-background raster.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    /// Wrap a rendered image.
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True if the pixel differs from the page background.
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        *self.image.get_pixel(x, y) != BACKGROUND
    }

    /// Paint a rectangle (page units, clipped to the raster) with `color`.
    pub fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb<u8>) {
        let clamp_x = |v: f32| v.max(0.0).min(self.image.width() as f32) as u32;
        let clamp_y = |v: f32| v.max(0.0).min(self.image.height() as f32) as u32;
        let (px0, px1) = (clamp_x(x0.floor()), clamp_x(x1.ceil()));
        let (py0, py1) = (clamp_y(y0.floor()), clamp_y(y1.ceil()));
        for y in py0..py1 {
            for x in px0..px1 {
                self.image.put_pixel(x, y, color);
            }
        }
    }

    /// Set a single pixel.
    pub fn put(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        self.image.put_pixel(x, y, color);
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut raster = Raster::blank(10, 10);
        raster.fill_rect(-5.0, 8.0, 3.0, 20.0, Rgb([0, 0, 0]));
        assert!(raster.is_ink(0, 9));
        assert!(raster.is_ink(2, 8));
        assert!(!raster.is_ink(3, 8));
        assert!(!raster.is_ink(0, 7));
    }
}
