//! Standard page conversions.
//!
//! A standard page is 1800 characters of text or 180 cm² of printed image.

/// Raster units per inch.
pub const UNITS_PER_INCH: f64 = 72.0;
/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;
/// Characters on one standard page.
pub const CHARS_PER_STD_PAGE: f64 = 1800.0;
/// Image area, in cm², counted as one standard page.
pub const CM2_PER_STD_PAGE: f64 = 180.0;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Page units to centimetres.
pub fn px_to_cm(px: f64) -> f64 {
    px * (CM_PER_INCH / UNITS_PER_INCH)
}

pub fn chars_to_std_pages(chars: usize) -> f64 {
    round2(chars as f64 / CHARS_PER_STD_PAGE)
}

pub fn std_pages_to_chars(pages: f64) -> usize {
    (pages * CHARS_PER_STD_PAGE).floor().max(0.0) as usize
}

pub fn image_area_std_pages(area_cm2: f64) -> f64 {
    round2(area_cm2 / CM2_PER_STD_PAGE)
}

/// Printed area of a `width` × `height` box given in page units, in cm².
pub fn area_cm2(width: f64, height: f64) -> f64 {
    px_to_cm(width.abs()) * px_to_cm(height.abs())
}
