//! [`PdfBackend`] implementation on top of `lopdf`.

use std::io;
use std::path::Path;

use image::Rgb;
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, StringFormat};

use crate::analysis::transform::Matrix;
use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{Block, Point, Raster, Rect};

use super::backend::{
    Annotation, Color, ContentOp, DeclaredLength, PdfBackend, PdfValue, Popup, XObjectRef,
};
use super::layout::{
    build_blocks, object_number, page_content, resolve, resolve_dict, sub_dict, PageInterpreter,
};

/// Parent hops followed when looking up inheritable page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;
/// Fallback page size (US Letter) when no MediaBox is declared.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Ink used by the layout raster for text.
const TEXT_INK: Rgb<u8> = Rgb([0, 0, 0]);
/// Ink used by the layout raster for images.
const IMAGE_INK: Rgb<u8> = Rgb([128, 128, 128]);

/// A PDF document opened with `lopdf`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl LopdfBackend {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::DocumentOpen(format!("{} not found", path.display())));
        }
        detect_format_from_path(path)?;

        let doc = LopdfDocument::load(path)
            .map_err(|e| Error::DocumentOpen(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_document(doc))
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| Error::DocumentOpen(e.to_string()))?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; content may not be readable");
        }
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    /// The underlying `lopdf` document.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        self.pages
            .get(page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len()))
    }

    /// Look up an inheritable page attribute, walking up `/Parent` links.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(obj) = dict.get(key) {
                return Some(obj);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        self.inherited(page_id, b"Resources")
            .and_then(|o| resolve_dict(&self.doc, o))
    }

    /// MediaBox as `[x0, y0, x1, y1]` with ordered corners.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let values: Vec<f32> = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| resolve(&self.doc, o).as_array().ok())
            .map(|arr| arr.iter().filter_map(object_number).collect())
            .unwrap_or_default();

        match values[..] {
            [a, b, c, d] => [a.min(c), b.min(d), a.max(c), b.max(d)],
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    fn has_contents(&self, page_id: ObjectId) -> bool {
        self.doc
            .get_dictionary(page_id)
            .map(|d| d.has(b"Contents"))
            .unwrap_or(false)
    }

    /// Map a page-space point back to PDF user space.
    fn to_user_space(&self, page_id: ObjectId, p: Point) -> (f32, f32) {
        let [x0, _, _, y1] = self.media_box(page_id);
        (p.x + x0, y1 - p.y)
    }

    fn annotation_dict(&self, page_id: ObjectId, annotation: &Annotation) -> Dictionary {
        match annotation {
            Annotation::Highlight {
                rects,
                color,
                popup,
            } => {
                let mut quads = Vec::with_capacity(rects.len() * 8);
                let mut bounds: Option<Rect> = None;
                for r in rects {
                    let (left, top) = self.to_user_space(page_id, Point::new(r.x0, r.y0));
                    let (right, bottom) = self.to_user_space(page_id, Point::new(r.x1, r.y1));
                    quads.extend([left, top, right, top, left, bottom, right, bottom]);
                    let user = Rect::new(left, bottom, right, top);
                    bounds = Some(bounds.map_or(user, |b| b.union(&user)));
                }
                let bounds = bounds.unwrap_or_default();

                let mut dict = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Highlight",
                    "Rect" => rect_array(&bounds),
                    "QuadPoints" => quads.into_iter().map(Object::Real).collect::<Vec<_>>(),
                    "C" => color_array(*color),
                    "F" => 4,
                };
                if let Some(Popup { title, text }) = popup {
                    dict.set("T", text_string(title));
                    dict.set("Contents", text_string(text));
                }
                dict
            }
            Annotation::Line {
                from,
                to,
                color,
                width,
            } => {
                let (x0, y0) = self.to_user_space(page_id, *from);
                let (x1, y1) = self.to_user_space(page_id, *to);
                let bounds = Rect::new(
                    x0.min(x1) - width,
                    y0.min(y1) - width,
                    x0.max(x1) + width,
                    y0.max(y1) + width,
                );
                dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Line",
                    "Rect" => rect_array(&bounds),
                    "L" => vec![Object::Real(x0), Object::Real(y0), Object::Real(x1), Object::Real(y1)],
                    "C" => color_array(*color),
                    "BS" => dictionary! { "W" => Object::Real(*width) },
                    "F" => 4,
                }
            }
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_bounds(&self, page: usize) -> Result<Rect> {
        let [x0, y0, x1, y1] = self.media_box(self.page_id(page)?);
        Ok(Rect::new(0.0, 0.0, x1 - x0, y1 - y0))
    }

    fn page_blocks(&self, page: usize) -> Result<Vec<Block>> {
        let page_id = self.page_id(page)?;
        if !self.has_contents(page_id) {
            return Ok(Vec::new());
        }

        let content = page_content(&self.doc, page_id)?;
        let layout = PageInterpreter::new(&self.doc, self.base_transform(page)?)
            .run(&content, self.resources(page_id))?;
        log::debug!(
            "Page {}: {} spans, {} images",
            page + 1,
            layout.spans.len(),
            layout.images.len()
        );
        Ok(build_blocks(layout))
    }

    fn rasterize(&self, page: usize) -> Result<Raster> {
        let bounds = self.page_bounds(page)?;
        let mut raster = Raster::blank(bounds.x1.ceil() as u32, bounds.y1.ceil() as u32);

        for block in self.page_blocks(page)? {
            match block {
                Block::Text(text) => {
                    for span in text.spans() {
                        let b = span.bbox;
                        raster.fill_rect(b.x0, b.y0, b.x1, b.y1, TEXT_INK);
                    }
                }
                Block::Image(image) => {
                    let b = image.bbox;
                    raster.fill_rect(b.x0, b.y0, b.x1, b.y1, IMAGE_INK);
                }
            }
        }

        Ok(raster)
    }

    fn page_xobjects(&self, page: usize) -> Result<Vec<XObjectRef>> {
        let page_id = self.page_id(page)?;
        let Some(xobjects) = self
            .resources(page_id)
            .and_then(|r| sub_dict(&self.doc, r, b"XObject"))
        else {
            return Ok(Vec::new());
        };

        let mut refs = Vec::new();
        for (name, obj) in xobjects.iter() {
            let Ok(stream) = resolve(&self.doc, obj).as_stream() else {
                continue;
            };
            let dict = &stream.dict;
            let is_form = dict
                .get(b"Subtype")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| n == b"Form")
                .unwrap_or(false);
            if !is_form {
                continue;
            }

            let numbers = |key: &[u8]| -> Vec<f32> {
                dict.get(key)
                    .ok()
                    .and_then(|o| resolve(&self.doc, o).as_array().ok())
                    .map(|arr| arr.iter().filter_map(object_number).collect())
                    .unwrap_or_default()
            };
            let bbox = match numbers(b"BBox")[..] {
                [a, b, c, d] => Rect::new(a, b, c, d),
                _ => {
                    log::debug!(
                        "Form {} has no usable BBox",
                        String::from_utf8_lossy(name)
                    );
                    continue;
                }
            };

            let length = match dict.get(b"Length") {
                Ok(Object::Integer(n)) => DeclaredLength::Inline(*n),
                Ok(Object::Reference(id)) => DeclaredLength::Indirect(
                    self.doc.get_object(*id).ok().and_then(|o| o.as_i64().ok()),
                ),
                Ok(Object::String(bytes, _)) => {
                    DeclaredLength::Text(String::from_utf8_lossy(bytes).to_string())
                }
                _ => DeclaredLength::Missing,
            };

            refs.push(XObjectRef {
                name: String::from_utf8_lossy(name).to_string(),
                bbox,
                matrix: Matrix::from_slice(&numbers(b"Matrix")),
                length,
            });
        }

        Ok(refs)
    }

    fn page_operations(&self, page: usize) -> Result<Vec<ContentOp>> {
        let page_id = self.page_id(page)?;
        if !self.has_contents(page_id) {
            return Ok(Vec::new());
        }
        let content = page_content(&self.doc, page_id)?;
        let decoded = lopdf::content::Content::decode(&content)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(decoded
            .operations
            .iter()
            .map(|op| {
                ContentOp::new(
                    op.operator.clone(),
                    op.operands.iter().map(convert_object).collect(),
                )
            })
            .collect())
    }

    fn base_transform(&self, page: usize) -> Result<Matrix> {
        let [x0, _, _, y1] = self.media_box(self.page_id(page)?);
        Ok(Matrix::new(1.0, 0.0, 0.0, -1.0, -x0, y1))
    }

    fn add_annotation(&mut self, page: usize, annotation: Annotation) -> Result<()> {
        let page_id = self.page_id(page)?;
        let dict = self.annotation_dict(page_id, &annotation);
        let annot_id = self.doc.add_object(dict);

        let existing = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Annotation(e.to_string()))?
            .get(b"Annots")
            .ok()
            .cloned();

        match existing {
            Some(Object::Reference(array_id)) => {
                self.doc
                    .get_object_mut(array_id)
                    .and_then(|o| o.as_array_mut())
                    .map_err(|e| Error::Annotation(e.to_string()))?
                    .push(Object::Reference(annot_id));
            }
            existing => {
                let mut annots = match existing {
                    Some(Object::Array(arr)) => arr,
                    _ => Vec::new(),
                };
                annots.push(Object::Reference(annot_id));
                self.doc
                    .get_dictionary_mut(page_id)
                    .map_err(|e| Error::Annotation(e.to_string()))?
                    .set("Annots", Object::Array(annots));
            }
        }

        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.doc
            .save(path)
            .map_err(|e| Error::Io(io::Error::other(e.to_string())))?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

/// Convert a lopdf operand to a backend-neutral value.
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(s, _) => PdfValue::Str(s.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn rect_array(r: &Rect) -> Vec<Object> {
    [r.x0, r.y0, r.x1, r.y1].into_iter().map(Object::Real).collect()
}

fn color_array(color: Color) -> Vec<Object> {
    color.to_pdf().into_iter().map(Object::Real).collect()
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}
