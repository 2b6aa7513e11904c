//! Affine transform tracking for content-stream replay.
//!
//! PDF matrices use the row-vector convention:
//! ```text
//!               [ a  b  0 ]
//! [x' y' 1] = [x y 1] [ c  d  0 ]
//!               [ e  f  1 ]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Point, Rect};

/// A 2D affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 6]", into = "[f32; 6]")]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Build from the six operands of a `cm` / `/Matrix` entry.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    /// `self × other`: the transform that applies `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }

    /// Map the corners `(x0, y0)` and `(x1, y1)` and normalize the result.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let p = self.transform_point(rect.x0, rect.y0);
        let q = self.transform_point(rect.x1, rect.y1);
        Rect::new(p.x.min(q.x), p.y.min(q.y), p.x.max(q.x), p.y.max(q.y))
    }

    /// Length of the unit vertical vector after transformation.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Length of the unit horizontal vector after transformation.
    pub fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 6]> for Matrix {
    fn from(v: [f32; 6]) -> Self {
        Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }
}

impl From<Matrix> for [f32; 6] {
    fn from(m: Matrix) -> Self {
        [m.a, m.b, m.c, m.d, m.e, m.f]
    }
}

/// The current transformation matrix with `q`/`Q` save and restore.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Matrix,
    saved: Vec<Matrix>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Matrix {
        self.current
    }

    /// Save the current transform (`q`).
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the last saved transform (`Q`).
    ///
    /// An unbalanced restore means the operator stream is malformed.
    pub fn pop(&mut self) -> Result<()> {
        self.current = self
            .saved
            .pop()
            .ok_or_else(|| Error::EmbeddedObject("unbalanced graphics state restore".into()))?;
        Ok(())
    }

    /// Left-multiply the current transform by `m` (`cm`).
    pub fn concat(&mut self, m: &Matrix) {
        self.current = m.multiply(&self.current);
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_applies_left_first() {
        let scale = Matrix::scaling(2.0, 2.0);
        let shift = Matrix::translation(10.0, 0.0);

        // scale, then shift
        let p = scale.multiply(&shift).transform_point(1.0, 1.0);
        assert_eq!((p.x, p.y), (12.0, 2.0));

        // shift, then scale
        let p = shift.multiply(&scale).transform_point(1.0, 1.0);
        assert_eq!((p.x, p.y), (22.0, 2.0));
    }

    #[test]
    fn test_stack_save_restore() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.concat(&Matrix::translation(5.0, 5.0));
        assert_eq!(stack.current().e, 5.0);
        stack.pop().unwrap();
        assert_eq!(stack.current(), Matrix::identity());
        assert!(stack.pop().is_err());
    }

    #[test]
    fn test_concat_nests_inner_first() {
        let mut stack = TransformStack::new();
        stack.concat(&Matrix::scaling(2.0, 2.0));
        stack.concat(&Matrix::translation(3.0, 0.0));
        // inner translation is scaled by the outer transform
        let p = stack.current().transform_point(0.0, 0.0);
        assert_eq!((p.x, p.y), (6.0, 0.0));
    }

    #[test]
    fn test_transform_rect_flip() {
        let flip = Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 800.0);
        let r = flip.transform_rect(&Rect::new(10.0, 100.0, 50.0, 200.0));
        assert_eq!(r, Rect::new(10.0, 600.0, 50.0, 700.0));
    }
}
