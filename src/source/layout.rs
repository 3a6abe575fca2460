//! Positioned text spans from page content streams.
//!
//! Only the text-positioning subset of the content stream operators is
//! interpreted: enough to know where each string starts and at what size.
//! Table detection works on the spans; page text is the spans joined line
//! by line.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// A text span with position and size.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, estimating its width from the character count.
    pub fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }
}

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Kerning adjustment (thousandths of an em) treated as a word gap in `TJ`.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Baseline shift, as a fraction of the font size, that starts a new line.
const LINE_BREAK_FACTOR: f32 = 0.5;

/// Extract positioned text spans from a page, whitespace-only strings excluded.
pub fn extract_page_spans(doc: &Document, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let mut spans = page_spans(doc, page_id)?;
    spans.retain(|span| !span.text.trim().is_empty());
    Ok(spans)
}

/// Extract the text of a page in content-stream order, one line per baseline.
pub fn extract_page_text(doc: &Document, page_id: ObjectId) -> Result<String> {
    Ok(join_lines(&page_spans(doc, page_id)?))
}

fn page_spans(doc: &Document, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let content = page_content(doc, page_id)?;
    if content.is_empty() {
        return Ok(Vec::new());
    }
    parse_content_stream(doc, &content, &fonts)
}

/// Concatenate spans, breaking the line whenever the baseline moves.
fn join_lines(spans: &[TextSpan]) -> String {
    let mut text = String::new();
    let mut last_y: Option<f32> = None;

    for span in spans {
        if let Some(y) = last_y {
            if (y - span.y).abs() > span.font_size * LINE_BREAK_FACTOR {
                text.push('\n');
            }
        }
        text.push_str(&span.text);
        last_y = Some(span.y);
    }
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Concatenated, decompressed content streams of a page.
fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        // a page without content has no text
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            Ok(Object::Stream(s)) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        },
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                        } else {
                            content.extend_from_slice(&s.content);
                        }
                        content.push(b' ');
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

fn parse_content_stream(
    doc: &Document,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> Result<Vec<TextSpan>> {
    let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut font: Option<&Dictionary> = None;
    let mut font_size = DEFAULT_FONT_SIZE;
    let mut matrix = TextMatrix::default();
    let mut in_text_block = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                matrix.reset();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(name) = &op.operands[0] {
                        font = fonts.get(name).copied();
                    }
                    font_size = get_number(&op.operands[1]).unwrap_or(DEFAULT_FONT_SIZE);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    matrix.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        matrix.leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    matrix.set(
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => {
                matrix.next_line();
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator == "'" || op.operator == "\"" {
                    matrix.next_line();
                }
                if !in_text_block {
                    continue;
                }

                let text = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => decode_tj_array(doc, font, items),
                        _ => String::new(),
                    },
                    "\"" => string_operand(doc, font, op.operands.get(2)),
                    _ => string_operand(doc, font, op.operands.first()),
                };

                if !text.is_empty() {
                    let (x, y) = matrix.position();
                    spans.push(TextSpan::new(text, x, y, font_size * matrix.scale()));
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn string_operand(doc: &Document, font: Option<&Dictionary>, operand: Option<&Object>) -> String {
    match operand {
        Some(Object::String(bytes, _)) => decode_bytes(doc, font, bytes),
        _ => String::new(),
    }
}

/// Decode with the font's encoding, falling back to [`decode_text_simple`].
///
/// Unicode-ordered CID CMaps (`UniJIS-UCS2-H`, `UniGB-UTF16-V`, ...) carry
/// UTF-16BE code units and are decoded directly.
fn decode_bytes(doc: &Document, font: Option<&Dictionary>, bytes: &[u8]) -> String {
    let Some(font) = font else {
        return decode_text_simple(bytes);
    };
    if is_utf16_cmap(font) {
        return decode_utf16be(bytes);
    }
    match font.get_font_encoding(doc) {
        Ok(enc) => {
            Document::decode_text(&enc, bytes).unwrap_or_else(|_| decode_text_simple(bytes))
        }
        Err(_) => decode_text_simple(bytes),
    }
}

fn is_utf16_cmap(font: &Dictionary) -> bool {
    match font.get(b"Encoding").and_then(|e| e.as_name_str()) {
        Ok(name) => name.starts_with("Uni") && (name.contains("-UCS2-") || name.contains("-UTF16-")),
        Err(_) => false,
    }
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xFE, 0xFF]).unwrap_or(bytes);
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Join the strings of a `TJ` array, inserting a space for large gaps.
///
/// Negative adjustments move right; past the threshold they are word breaks,
/// except after characters of scripts written without spaces.
fn decode_tj_array(doc: &Document, font: Option<&Dictionary>, items: &[Object]) -> String {
    let mut combined = String::new();

    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode_bytes(doc, font, bytes)),
            Object::Integer(_) | Object::Real(_) => {
                let adjustment = -get_number(item).unwrap_or(0.0);
                if adjustment > TJ_SPACE_THRESHOLD {
                    if let Some(last) = combined.chars().last() {
                        if !last.is_whitespace() && !is_spaceless_script_char(last) {
                            combined.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }

    combined
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: DEFAULT_FONT_SIZE,
        }
    }
}

impl TextMatrix {
    /// Reset the matrix at `BT`; leading is a graphics-state parameter and survives.
    fn reset(&mut self) {
        *self = Self {
            leading: self.leading,
            ..Self::default()
        };
    }

    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Characters of scripts that do not separate words with spaces.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F // CJK symbols and punctuation
        | 0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0x3400..=0x4DBF // CJK Extension A
        | 0x4E00..=0x9FFF // CJK Unified Ideographs
        | 0xFF65..=0xFF9F // Half-width katakana
        | 0x20000..=0x2EBEF // CJK Extensions B-F
    )
}

/// Decoding fallback when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_utf16be(bytes);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
