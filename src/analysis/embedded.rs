//! Embedded object resolution.
//!
//! Form XObjects invoked directly by a page (typically included PDF pages)
//! are located by replaying the page's transform operators. Each placement
//! becomes a synthesized image block that can stand in for the native
//! blocks extracted from inside it.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::model::{Block, ImageBlock, ImageSource, Rect, RelativePosition};
use crate::parser::{ContentOp, PdfValue, XObjectRef};

use super::transform::{Matrix, TransformStack};

/// Locate every placement of `xobjects` in the operator stream.
///
/// Blocks come back in reading order. A malformed stream (unbalanced
/// restore, non-numeric `cm` operands) fails the whole page.
pub fn resolve_embedded(
    ops: &[ContentOp],
    xobjects: &[XObjectRef],
    base: &Matrix,
) -> Result<Vec<ImageBlock>> {
    let mut blocks = Vec::new();
    if xobjects.is_empty() {
        return Ok(blocks);
    }

    let mut stack = TransformStack::new();
    for op in ops {
        match op.operator.as_str() {
            "q" => stack.push(),
            "Q" => stack.pop()?,
            "cm" => {
                let m = op
                    .numbers()
                    .and_then(|n| Matrix::from_slice(&n))
                    .ok_or_else(|| {
                        Error::EmbeddedObject(format!("malformed cm operands: {:?}", op.operands))
                    })?;
                stack.concat(&m);
            }
            "Do" => {
                let Some(PdfValue::Name(name)) = op.operands.first() else {
                    continue;
                };
                let Some(xobject) = xobjects.iter().find(|x| x.name.as_bytes() == name.as_slice())
                else {
                    continue;
                };

                stack.push();
                if let Some(m) = &xobject.matrix {
                    stack.concat(m);
                }
                let ctm = stack.current();
                let view = ctm.multiply(base);
                blocks.push(ImageBlock {
                    bbox: view.transform_rect(&xobject.bbox),
                    transform: Some(ctm),
                    size: xobject.length.resolve(),
                    source: ImageSource::Embedded,
                });
                stack.pop()?;
            }
            _ => {}
        }
    }

    blocks.sort_by(|a, b| a.bbox.reading_order(&b.bbox));
    Ok(blocks)
}

/// Replace native blocks covered by embedded blocks.
///
/// Both inputs are in reading order and so is the result: blocks lying
/// inside the next embedded block are dropped, the embedded block is
/// inserted before the first block that follows it, and embedded blocks
/// past the last native block are appended.
pub fn splice_embedded(mut blocks: Vec<Block>, embedded: &[ImageBlock]) -> Vec<Block> {
    let mut pending: VecDeque<ImageBlock> = embedded.iter().cloned().collect();
    let mut idx = 0;

    while idx < blocks.len() {
        let Some(next) = pending.front() else {
            break;
        };
        match blocks[idx].bbox().relative_position(&next.bbox) {
            RelativePosition::Inside => {
                blocks.remove(idx);
            }
            RelativePosition::After => {
                if let Some(image) = pending.pop_front() {
                    blocks.insert(idx, Block::Image(image));
                }
                idx += 1;
            }
            RelativePosition::Before => idx += 1,
        }
    }

    blocks.extend(pending.into_iter().map(Block::Image));
    blocks
}

/// True if `rect` lies inside any embedded block.
pub fn is_inside_embedded(rect: &Rect, embedded: &[ImageBlock]) -> bool {
    embedded
        .iter()
        .any(|e| rect.relative_position(&e.bbox) == RelativePosition::Inside)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontSignature, Line, Point, Span, TextBlock};
    use crate::parser::DeclaredLength;

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn op(name: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(name, operands)
    }

    fn form(name: &str) -> XObjectRef {
        XObjectRef {
            name: name.into(),
            bbox: Rect::new(0.0, 0.0, 200.0, 100.0),
            matrix: None,
            length: DeclaredLength::Inline(512),
        }
    }

    fn flip() -> Matrix {
        Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 842.0)
    }

    fn text_at(bbox: Rect) -> Block {
        Block::Text(TextBlock::new(vec![Line::new(vec![Span {
            text: "x".into(),
            font: FontSignature::new("F", 10.0, 0),
            origin: Point::new(bbox.x0, bbox.y1),
            bbox,
        }])]))
    }

    fn image_at(bbox: Rect) -> ImageBlock {
        ImageBlock {
            bbox,
            transform: None,
            size: None,
            source: ImageSource::Embedded,
        }
    }

    #[test]
    fn test_resolve_places_form_through_ctm() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(100.0), num(500.0)]),
            op("Do", vec![PdfValue::Name(b"Fm1".to_vec())]),
            op("Q", vec![]),
            op("Do", vec![PdfValue::Name(b"Other".to_vec())]),
        ];

        let blocks = resolve_embedded(&ops, &[form("Fm1")], &flip()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].bbox, Rect::new(100.0, 242.0, 300.0, 342.0));
        assert_eq!(blocks[0].size, Some(512));
        assert_eq!(blocks[0].source, ImageSource::Embedded);
    }

    #[test]
    fn test_resolve_applies_form_matrix() {
        let mut scaled = form("Fm1");
        scaled.matrix = Some(Matrix::scaling(0.5, 0.5));
        let ops = vec![
            op("cm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(100.0), num(500.0)]),
            op("Do", vec![PdfValue::Name(b"Fm1".to_vec())]),
        ];

        let blocks = resolve_embedded(&ops, &[scaled], &flip()).unwrap();
        assert_eq!(blocks[0].bbox, Rect::new(100.0, 292.0, 200.0, 342.0));
    }

    #[test]
    fn test_resolve_sorts_in_reading_order() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(100.0), num(100.0)]),
            op("Do", vec![PdfValue::Name(b"Fm1".to_vec())]),
            op("Q", vec![]),
            op("cm", vec![num(1.0), num(0.0), num(0.0), num(1.0), num(100.0), num(600.0)]),
            op("Do", vec![PdfValue::Name(b"Fm1".to_vec())]),
        ];
        let blocks = resolve_embedded(&ops, &[form("Fm1")], &flip()).unwrap();
        assert!(blocks[0].bbox.y0 < blocks[1].bbox.y0);
    }

    #[test]
    fn test_malformed_stream_fails() {
        let unbalanced = vec![op("Q", vec![])];
        assert!(resolve_embedded(&unbalanced, &[form("Fm1")], &flip()).is_err());

        let bad_cm = vec![op("cm", vec![PdfValue::Name(b"x".to_vec())])];
        assert!(resolve_embedded(&bad_cm, &[form("Fm1")], &flip()).is_err());

        // nothing to track, nothing to fail on
        assert!(resolve_embedded(&unbalanced, &[], &flip()).unwrap().is_empty());
    }

    #[test]
    fn test_splice_replaces_covered_blocks() {
        let blocks = vec![
            text_at(Rect::new(72.0, 50.0, 500.0, 60.0)),
            text_at(Rect::new(110.0, 250.0, 290.0, 260.0)),
            text_at(Rect::new(110.0, 300.0, 290.0, 310.0)),
            text_at(Rect::new(72.0, 400.0, 500.0, 410.0)),
        ];
        let embedded = vec![image_at(Rect::new(100.0, 242.0, 300.0, 342.0))];

        let spliced = splice_embedded(blocks, &embedded);
        let boxes: Vec<_> = spliced.iter().map(|b| (b.is_image(), b.bbox().y0)).collect();
        assert_eq!(boxes, vec![(false, 50.0), (true, 242.0), (false, 400.0)]);
    }

    #[test]
    fn test_splice_appends_leftovers() {
        let blocks = vec![text_at(Rect::new(72.0, 50.0, 500.0, 60.0))];
        let embedded = vec![
            image_at(Rect::new(100.0, 500.0, 300.0, 600.0)),
            image_at(Rect::new(100.0, 650.0, 300.0, 700.0)),
        ];
        let spliced = splice_embedded(blocks, &embedded);
        assert_eq!(spliced.len(), 3);
        assert!(spliced[1].is_image() && spliced[2].is_image());
    }

    #[test]
    fn test_is_inside_embedded() {
        let embedded = vec![image_at(Rect::new(100.0, 100.0, 300.0, 300.0))];
        assert!(is_inside_embedded(&Rect::new(150.0, 150.0, 160.0, 160.0), &embedded));
        assert!(!is_inside_embedded(&Rect::new(50.0, 150.0, 160.0, 160.0), &embedded));
    }
}
