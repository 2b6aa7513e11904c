//! Layout extraction for PDF pages.
//!
//! Replays a page content stream to recover positioned text spans and image
//! placements, then groups spans into lines and lines into blocks in the
//! shape the analysis engine expects.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::analysis::transform::{Matrix, TransformStack};
use crate::error::{Error, Result};
use crate::model::{
    is_spaceless_script_char, sort_reading_order, Block, FontSignature, ImageBlock, ImageSource,
    Line, Point, Rect, Span, TextBlock,
};

use super::base14::standard_width;

/// Forms nested deeper than this are not descended into.
const MAX_FORM_DEPTH: usize = 8;
/// Glyph ascent and descent as a fraction of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;
/// Advance used when a glyph width is unknown (1/1000 em).
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;
/// TJ adjustment (1/1000 em) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;
/// Horizontal gap, in font sizes, that splits a line into a continuation.
const TAB_GAP_EM: f32 = 2.0;

/// Font information needed to decode and measure strings.
#[derive(Debug, Clone)]
struct FontInfo<'a> {
    base_font: String,
    dict: &'a Dictionary,
    first_char: i64,
    widths: Vec<f32>,
    two_byte: bool,
}

impl<'a> FontInfo<'a> {
    fn from_dict(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let two_byte = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| n == b"Type0")
            .unwrap_or(false);
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| arr.iter().filter_map(object_number).collect())
            .unwrap_or_default();

        Self {
            base_font,
            dict,
            first_char,
            widths,
            two_byte,
        }
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32))
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        }
    }

    fn glyph_width(&self, code: u32) -> f32 {
        let index = code as i64 - self.first_char;
        if index >= 0 {
            if let Some(w) = self.widths.get(index as usize) {
                return *w;
            }
        }
        if self.widths.is_empty() && !self.two_byte {
            if let Some(w) = standard_width(&self.base_font, code) {
                return w;
            }
        }
        DEFAULT_GLYPH_WIDTH
    }

    fn decode(&self, doc: &LopdfDocument, bytes: &[u8]) -> String {
        if let Ok(enc) = self.dict.get_font_encoding(doc) {
            if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                return text;
            }
        }
        decode_text_simple(bytes)
    }
}

/// Text state parameters, saved and restored with the graphics state.
#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font: Option<Vec<u8>>,
    size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::identity(),
            tlm: Matrix::identity(),
            font: None,
            size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn advance(&mut self, tx: f32) {
        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
    }
}

/// Spans and images recovered from one page.
#[derive(Debug, Default)]
pub(crate) struct PageLayout {
    pub spans: Vec<Span>,
    pub images: Vec<ImageBlock>,
}

/// Content stream interpreter for one page.
pub(crate) struct PageInterpreter<'a> {
    doc: &'a LopdfDocument,
    base: Matrix,
    layout: PageLayout,
}

impl<'a> PageInterpreter<'a> {
    pub fn new(doc: &'a LopdfDocument, base: Matrix) -> Self {
        Self {
            doc,
            base,
            layout: PageLayout::default(),
        }
    }

    /// Interpret the page content and return the positioned content.
    pub fn run(mut self, content: &[u8], resources: Option<&'a Dictionary>) -> Result<PageLayout> {
        self.interpret(content, resources, Matrix::identity(), 0)?;
        Ok(self.layout)
    }

    fn interpret(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;
        let fonts = resources
            .map(|r| fonts_in(self.doc, r))
            .unwrap_or_default();

        let mut stack = TransformStack::new();
        stack.concat(&ctm);
        let mut state = TextState::default();
        let mut saved_states: Vec<TextState> = Vec::new();

        for op in content.operations {
            let nums: Vec<f32> = op.operands.iter().filter_map(object_number).collect();
            match op.operator.as_str() {
                "q" => {
                    stack.push();
                    saved_states.push(state.clone());
                }
                "Q" => {
                    // tolerate unbalanced restores in native extraction
                    if stack.pop().is_ok() {
                        state = saved_states.pop().unwrap_or_default();
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_slice(&nums) {
                        stack.concat(&m);
                    }
                }
                "BT" => {
                    state.tm = Matrix::identity();
                    state.tlm = Matrix::identity();
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        state.font = Some(name.clone());
                    }
                    if let Some(size) = op.operands.get(1).and_then(object_number) {
                        state.size = size;
                    }
                }
                "TL" => state.leading = nums.first().copied().unwrap_or(0.0),
                "Tc" => state.char_spacing = nums.first().copied().unwrap_or(0.0),
                "Tw" => state.word_spacing = nums.first().copied().unwrap_or(0.0),
                "Tz" => state.h_scale = nums.first().copied().unwrap_or(100.0) / 100.0,
                "Td" | "TD" => {
                    if let [tx, ty] = nums[..] {
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_slice(&nums) {
                        state.tm = m;
                        state.tlm = m;
                    }
                }
                "T*" => {
                    let leading = state.leading;
                    state.move_line(0.0, -leading);
                }
                "Tj" | "'" | "\"" => {
                    if op.operator != "Tj" {
                        let leading = state.leading;
                        state.move_line(0.0, -leading);
                    }
                    if op.operator == "\"" {
                        state.word_spacing = nums.first().copied().unwrap_or(state.word_spacing);
                        state.char_spacing = nums.get(1).copied().unwrap_or(state.char_spacing);
                    }
                    if let Some(Object::String(bytes, _)) = op.operands.last() {
                        let items = [Object::String(bytes.clone(), lopdf::StringFormat::Literal)];
                        self.show_text(&items, &fonts, &mut state, stack.current());
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        self.show_text(items, &fonts, &mut state, stack.current());
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        self.invoke_xobject(name, resources, stack.current(), depth);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn show_text(
        &mut self,
        items: &[Object],
        fonts: &BTreeMap<Vec<u8>, FontInfo<'a>>,
        state: &mut TextState,
        ctm: Matrix,
    ) {
        let font = state.font.as_ref().and_then(|f| fonts.get(f));
        let start = state.tm;
        let mut text = String::new();
        let mut width = 0.0f32;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = match font {
                        Some(f) => f.decode(self.doc, bytes),
                        None => decode_text_simple(bytes),
                    };
                    text.push_str(&decoded);

                    let codes = match font {
                        Some(f) => f.codes(bytes),
                        None => bytes.iter().map(|b| *b as u32).collect(),
                    };
                    for code in codes {
                        let glyph = font.map(|f| f.glyph_width(code)).unwrap_or(DEFAULT_GLYPH_WIDTH);
                        let mut advance = glyph / 1000.0 * state.size + state.char_spacing;
                        if code == 32 {
                            advance += state.word_spacing;
                        }
                        width += advance * state.h_scale;
                    }
                }
                other => {
                    if let Some(n) = object_number(other) {
                        width -= n / 1000.0 * state.size * state.h_scale;
                        let word_break = -n > TJ_SPACE_THRESHOLD
                            && !text.is_empty()
                            && !text.ends_with(' ')
                            && !text.ends_with('\u{00A0}')
                            && !text.chars().last().map(is_spaceless_script_char).unwrap_or(false);
                        if word_break {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        state.tm = start;
        state.advance(width);

        if text.trim().is_empty() {
            return;
        }

        let full = start.multiply(&ctm).multiply(&self.base);
        let origin = full.transform_point(0.0, 0.0);
        let size = state.size * full.vertical_scale();
        let device_width = width * full.horizontal_scale();
        let base_font = font
            .map(|f| f.base_font.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let flags = FontSignature::flags_from_name(&base_font);

        self.layout.spans.push(Span {
            text,
            font: FontSignature::new(base_font, size, flags),
            origin,
            bbox: Rect::new(
                origin.x,
                origin.y - size * ASCENT,
                origin.x + device_width,
                origin.y + size * DESCENT,
            ),
        });
    }

    fn invoke_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) {
        let Some(stream) = resources
            .and_then(|r| sub_dict(self.doc, r, b"XObject"))
            .and_then(|x| x.get(name).ok())
            .and_then(|o| resolve(self.doc, o).as_stream().ok())
        else {
            return;
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");

        if subtype == b"Image" {
            let bbox = ctm
                .multiply(&self.base)
                .transform_rect(&Rect::new(0.0, 0.0, 1.0, 1.0));
            self.layout.images.push(ImageBlock {
                bbox,
                transform: Some(ctm),
                size: Some(stream.content.len() as u64),
                source: ImageSource::Native,
            });
        } else if subtype == b"Form" && depth < MAX_FORM_DEPTH {
            let form_matrix = stream
                .dict
                .get(b"Matrix")
                .ok()
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| {
                    Matrix::from_slice(&arr.iter().filter_map(object_number).collect::<Vec<_>>())
                })
                .unwrap_or_default();
            let form_resources = sub_dict(self.doc, &stream.dict, b"Resources").or(resources);
            let content = stream_bytes(stream);
            if let Err(e) = self.interpret(
                &content,
                form_resources,
                form_matrix.multiply(&ctm),
                depth + 1,
            ) {
                log::debug!(
                    "Skipping form XObject {}: {}",
                    String::from_utf8_lossy(name),
                    e
                );
            }
        }
    }
}

/// Group spans into visual lines and lines into blocks, then add image
/// blocks and sort everything into reading order.
pub(crate) fn build_blocks(layout: PageLayout) -> Vec<Block> {
    let lines = group_spans_into_lines(layout.spans);
    let mut blocks: Vec<Block> = group_lines_into_blocks(lines)
        .into_iter()
        .map(Block::Text)
        .collect();
    blocks.extend(layout.images.into_iter().map(Block::Image));
    sort_reading_order(&mut blocks);
    blocks
}

/// Baseline-based line grouping.
///
/// Spans on one baseline separated by a wide gap become separate lines
/// sharing the same origin y (continuations, as in a TOC entry and its page
/// number).
fn group_spans_into_lines(mut spans: Vec<Span>) -> Vec<Line> {
    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| {
        a.origin
            .y
            .partial_cmp(&b.origin.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.origin
                    .x
                    .partial_cmp(&b.origin.x)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();

    for mut span in spans {
        if let Some(last) = current.last() {
            let tolerance = last.font.size.max(span.font.size) * 0.3;
            let same_baseline = (span.origin.y - last.origin.y).abs() <= tolerance;
            let gap = span.bbox.x0 - last.bbox.x1;
            if same_baseline {
                // keep one origin y per baseline
                span.origin.y = current[0].origin.y;
                if gap > TAB_GAP_EM * last.font.size {
                    lines.push(Line::new(std::mem::take(&mut current)));
                }
            } else {
                lines.push(Line::new(std::mem::take(&mut current)));
            }
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(Line::new(current));
    }

    lines
}

/// Group lines into blocks based on spacing, size changes and overlap.
fn group_lines_into_blocks(lines: Vec<Line>) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<Line> = Vec::new();
    let avg_spacing = calculate_avg_line_spacing(&lines);

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock::new(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(TextBlock::new(current));
    }

    blocks
}

fn line_size(line: &Line) -> f32 {
    line.spans.first().map(|s| s.font.size).unwrap_or(0.0)
}

fn baseline(line: &Line) -> f32 {
    line.origin().map(|o| o.y).unwrap_or(line.bbox.y1)
}

/// Average baseline distance between consecutive distinct lines.
fn calculate_avg_line_spacing(lines: &[Line]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (baseline(&w[1]) - baseline(&w[0])).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
    // continuation on the same baseline stays in the block
    if baseline(prev) == baseline(curr) {
        return false;
    }

    let spacing = (baseline(curr) - baseline(prev)).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    if (line_size(prev) - line_size(curr)).abs() > 1.0 {
        return true;
    }

    // no horizontal overlap: a different column
    curr.bbox.x0 > prev.bbox.x1 || curr.bbox.x1 < prev.bbox.x0
}

/// Follow a reference to the object it points to.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Resolve an object to a dictionary (a stream yields its dictionary).
pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

/// Look up `key` in `dict` and resolve it to a dictionary.
pub(crate) fn sub_dict<'a>(
    doc: &'a LopdfDocument,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key).ok().and_then(|o| resolve_dict(doc, o))
}

/// Raw bytes of a stream, decompressed when a filter is declared.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())
    } else {
        stream.content.clone()
    }
}

/// Concatenated content streams of a page.
pub(crate) fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = page_dict
        .get(b"Contents")
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    match resolve(doc, contents) {
        Object::Stream(s) => Ok(stream_bytes(s)),
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Ok(s) = resolve(doc, obj).as_stream() {
                    content.extend_from_slice(&stream_bytes(s));
                    content.push(b' ');
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

fn fonts_in<'a>(doc: &'a LopdfDocument, resources: &'a Dictionary) -> BTreeMap<Vec<u8>, FontInfo<'a>> {
    let mut fonts = BTreeMap::new();
    if let Some(font_dict) = sub_dict(doc, resources, b"Font") {
        for (name, obj) in font_dict.iter() {
            if let Some(dict) = resolve_dict(doc, obj) {
                fonts.insert(name.clone(), FontInfo::from_dict(doc, dict));
            }
        }
    }
    fonts
}

/// Helper to extract number from PDF object.
pub(crate) fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter(|c| c.len() == 2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, width: f32, size: f32) -> Span {
        Span {
            text: text.to_string(),
            font: FontSignature::new("CMR10", size, 0),
            origin: Point::new(x, y),
            bbox: Rect::new(x, y - size * ASCENT, x + width, y + size * DESCENT),
        }
    }

    #[test]
    fn test_spans_on_one_baseline_form_one_line() {
        let lines = group_spans_into_lines(vec![
            span("world", 130.0, 100.0, 30.0, 10.0),
            span("Hello ", 100.0, 100.0, 30.0, 10.0),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Hello world");
    }

    #[test]
    fn test_wide_gap_splits_into_continuation() {
        let lines = group_spans_into_lines(vec![
            span("Introduction", 100.0, 100.0, 60.0, 10.0),
            span("7", 480.0, 100.2, 5.0, 10.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].origin().unwrap().y, lines[1].origin().unwrap().y);
    }

    #[test]
    fn test_blocks_break_on_size_change_and_spacing() {
        let lines = group_spans_into_lines(vec![
            span("Results", 100.0, 80.0, 60.0, 17.0),
            span("First line of text", 100.0, 120.0, 300.0, 10.0),
            span("second line of text", 100.0, 132.0, 300.0, 10.0),
            span("third line of text", 100.0, 144.0, 300.0, 10.0),
            span("far below", 100.0, 300.0, 300.0, 10.0),
        ]);
        let blocks = group_lines_into_blocks(lines);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].lines.len(), 3);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
