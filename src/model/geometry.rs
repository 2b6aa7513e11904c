//! Geometric primitives in page space.
//!
//! Page space uses a top-left origin with y growing downwards, one unit
//! per 1/72 inch.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by its corners `(x0, y0)`-`(x1, y1)`.
///
/// Serialized as the 4-tuple `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Position of one rectangle relative to another in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePosition {
    /// Starts higher on the page, or level with it and further left.
    Before,
    /// All four edges fall within the other rectangle.
    Inside,
    /// Anything else.
    After,
}

impl Rect {
    /// Create a rectangle from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True for a rectangle with positive width and height.
    pub fn is_valid(&self) -> bool {
        self.x0 < self.x1 && self.y0 < self.y1
    }

    /// True if every edge of `self` lies within `other`.
    pub fn is_inside(&self, other: &Rect) -> bool {
        self.x0 >= other.x0 && self.y0 >= other.y0 && self.x1 <= other.x1 && self.y1 <= other.y1
    }

    /// Classify `self` against `other`: containment first, then reading order.
    pub fn relative_position(&self, other: &Rect) -> RelativePosition {
        if self.is_inside(other) {
            RelativePosition::Inside
        } else if self.y0 < other.y0 || (self.y0 == other.y0 && self.x0 < other.x0) {
            RelativePosition::Before
        } else {
            RelativePosition::After
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Reading-order comparison: top edge first, then left edge.
    pub fn reading_order(&self, other: &Rect) -> Ordering {
        self.y0
            .partial_cmp(&other.y0)
            .unwrap_or(Ordering::Equal)
            .then(self.x0.partial_cmp(&other.x0).unwrap_or(Ordering::Equal))
    }
}

impl From<[f32; 4]> for Rect {
    fn from(v: [f32; 4]) -> Self {
        Rect::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [f32; 4] {
    fn from(r: Rect) -> Self {
        [r.x0, r.y0, r.x1, r.y1]
    }
}
