//! Document content model shared by the PDF binding and the analysis engine.
//!
//! Pages are described as ordered blocks in reading order. Geometry uses a
//! top-left origin in page units (1/72 inch).

mod content;
mod geometry;
mod raster;

pub(crate) use content::is_spaceless_script_char;
pub use content::{
    sort_reading_order, Block, FontSignature, ImageBlock, ImageSource, Line, Span, TextBlock,
    FLAG_BOLD, FLAG_ITALIC, FLAG_MONOSPACED, FLAG_SERIFED,
};
pub use geometry::{Point, Rect, RelativePosition};
pub use raster::{Raster, BACKGROUND};
