//! Word extraction from the first page of a PDF using lopdf
//!
//! This module walks the page content stream, tracks the text and graphics
//! state, and emits word tokens with bounding boxes in top-left page
//! coordinates (y grows downward), the shape the table pipeline consumes.

use crate::ExtractError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Letter-size fallback when a page has no usable MediaBox
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Glyph width used when a font carries no width table (in em)
const DEFAULT_GLYPH_WIDTH: f32 = 0.5;

/// Horizontal gap (in em) that splits two glyph runs into separate words
const WORD_GAP: f32 = 0.15;

/// A word on the page with its bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The word text
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge (distance from the top of the page)
    pub top: f32,
    /// Bottom edge (distance from the top of the page)
    pub bottom: f32,
}

impl Token {
    pub fn new(text: impl Into<String>, x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn v_center(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// All tokens of one page plus its dimensions
#[derive(Debug, Clone)]
pub struct PageTokens {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub width: f32,
    pub height: f32,
    pub tokens: Vec<Token>,
}

/// Extract word tokens from the first page of a PDF file
pub fn extract_first_page<P: AsRef<Path>>(path: P) -> Result<PageTokens, ExtractError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ExtractError::FileNotFound(path.to_path_buf()));
    }
    let doc = Document::load(path)?;
    extract_first_page_from_doc(&doc)
}

/// Extract word tokens from the first page of a PDF held in memory
pub fn extract_first_page_mem(buffer: &[u8]) -> Result<PageTokens, ExtractError> {
    let doc = Document::load_mem(buffer)?;
    extract_first_page_from_doc(&doc)
}

fn extract_first_page_from_doc(doc: &Document) -> Result<PageTokens, ExtractError> {
    let pages = doc.get_pages();
    let (&page_number, &page_id) = pages.iter().next().ok_or(ExtractError::NoPages)?;
    log::debug!("extracting page 1 of {}", pages.len());

    let media_box = page_media_box(doc, page_id);
    let tokens = extract_page_tokens(doc, page_id, media_box)?;
    let (llx, lly, urx, ury) = media_box;

    Ok(PageTokens {
        page_number,
        width: urx - llx,
        height: ury - lly,
        tokens,
    })
}

/// Resolve the page MediaBox, following /Parent for inherited values
fn page_media_box(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    let mut current = doc.get_dictionary(page_id).ok();
    let mut depth = 0;
    while let Some(dict) = current {
        if let Ok(obj) = dict.get(b"MediaBox") {
            if let Some(rect) = resolve(doc, obj).and_then(|o| o.as_array().ok()) {
                let nums: Vec<f32> = rect.iter().filter_map(|o| get_number(resolve(doc, o)?)).collect();
                if nums.len() == 4 && nums[2] > nums[0] && nums[3] > nums[1] {
                    return (nums[0], nums[1], nums[2], nums[3]);
                }
            }
        }
        depth += 1;
        if depth > 32 {
            break;
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    (0.0, 0.0, DEFAULT_PAGE_SIZE.0, DEFAULT_PAGE_SIZE.1)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(m: &[f32; 6], tx: f32, ty: f32) -> [f32; 6] {
    multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], m)
}

/// Per-font glyph advances, in thousandths of an em
#[derive(Debug, Clone)]
struct FontMetrics {
    first_char: i64,
    widths: Vec<f32>,
    two_byte: bool,
}

impl FontMetrics {
    fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let two_byte = font
            .get(b"Subtype")
            .ok()
            .and_then(|s| s.as_name().ok())
            .map(|name| name == b"Type0")
            .unwrap_or(false);

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);

        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| resolve(doc, w).and_then(get_number).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            first_char,
            widths,
            two_byte,
        }
    }

    fn fallback() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            two_byte: false,
        }
    }

    /// Glyph codes of a shown string
    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
                .collect()
        } else {
            bytes.iter().map(|&b| b as u32).collect()
        }
    }

    fn width(&self, code: u32) -> f32 {
        let idx = code as i64 - self.first_char;
        match usize::try_from(idx).ok().and_then(|i| self.widths.get(i)) {
            Some(&w) if w > 0.0 => w,
            _ => DEFAULT_GLYPH_WIDTH * 1000.0,
        }
    }
}

/// Text state operators that affect glyph placement
#[derive(Debug, Clone)]
struct TextState {
    font: String,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: String::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
        }
    }
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl TextState {
    fn next_line(&mut self) {
        // T* moves by exactly TL; a zero leading keeps the baseline
        self.line_matrix = translate(&self.line_matrix, 0.0, -self.leading);
        self.text_matrix = self.line_matrix;
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = translate(&self.text_matrix, tx, 0.0);
    }
}

/// Word being assembled from consecutive glyphs
#[derive(Debug)]
struct PendingWord {
    text: String,
    x0: f32,
    x1: f32,
    baseline: f32,
    size: f32,
}

/// Accumulates glyphs into word tokens in page coordinates
struct WordCollector {
    origin_x: f32,
    page_top: f32,
    pending: Option<PendingWord>,
    tokens: Vec<Token>,
}

impl WordCollector {
    fn new(media_box: (f32, f32, f32, f32)) -> Self {
        Self {
            origin_x: media_box.0,
            page_top: media_box.3,
            pending: None,
            tokens: Vec::new(),
        }
    }

    fn push_glyph(&mut self, ch: char, x_start: f32, x_end: f32, baseline: f32, size: f32) {
        if ch.is_whitespace() || ch.is_control() {
            self.flush();
            return;
        }
        let (x0, x1) = if x_end >= x_start {
            (x_start, x_end)
        } else {
            (x_end, x_start)
        };

        if let Some(word) = &self.pending {
            let gap = x0 - word.x1;
            let same_line = (baseline - word.baseline).abs() <= word.size * 0.5;
            if !same_line || gap > word.size * WORD_GAP || gap < -word.size {
                self.flush();
            }
        }

        match &mut self.pending {
            Some(word) => {
                word.text.push(ch);
                word.x1 = word.x1.max(x1);
            }
            None => {
                self.pending = Some(PendingWord {
                    text: ch.to_string(),
                    x0,
                    x1,
                    baseline,
                    size,
                });
            }
        }
    }

    fn flush(&mut self) {
        let Some(word) = self.pending.take() else {
            return;
        };
        let size = if word.size > 0.0 { word.size } else { 1.0 };
        let x1 = if word.x1 > word.x0 {
            word.x1
        } else {
            word.x0 + size * DEFAULT_GLYPH_WIDTH
        };
        self.tokens.push(Token {
            text: word.text,
            x0: word.x0 - self.origin_x,
            x1: x1 - self.origin_x,
            top: self.page_top - (word.baseline + size * 0.8),
            bottom: self.page_top - (word.baseline - size * 0.2),
        });
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush();
        self.tokens
    }
}

/// Extract word tokens from a single page
fn extract_page_tokens(
    doc: &Document,
    page_id: ObjectId,
    media_box: (f32, f32, f32, f32),
) -> Result<Vec<Token>, ExtractError> {
    use lopdf::content::Content;

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let mut metrics: HashMap<String, FontMetrics> = HashMap::new();

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| ExtractError::Parse(e.to_string()))?;
    let content =
        Content::decode(&content_data).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let mut ctm = IDENTITY;
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();
    let mut state = TextState::default();
    let mut in_text_block = false;
    let mut words = WordCollector::new(media_box);

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if operands.len() >= 6 {
                    let new_matrix = [
                        get_number(&operands[0]).unwrap_or(1.0),
                        get_number(&operands[1]).unwrap_or(0.0),
                        get_number(&operands[2]).unwrap_or(0.0),
                        get_number(&operands[3]).unwrap_or(1.0),
                        get_number(&operands[4]).unwrap_or(0.0),
                        get_number(&operands[5]).unwrap_or(0.0),
                    ];
                    ctm = multiply_matrices(&new_matrix, &ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                state.text_matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            "ET" => {
                in_text_block = false;
                words.flush();
            }
            "Tf" => {
                if operands.len() >= 2 {
                    if let Ok(name) = operands[0].as_name() {
                        state.font = String::from_utf8_lossy(name).to_string();
                    }
                    if let Some(size) = get_number(&operands[1]) {
                        state.font_size = size;
                    }
                }
            }
            "Tc" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    state.horizontal_scale = v / 100.0;
                }
            }
            "TL" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    state.leading = v;
                }
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.line_matrix = translate(&state.line_matrix, tx, ty);
                    state.text_matrix = state.line_matrix;
                }
            }
            "Tm" => {
                if operands.len() >= 6 {
                    for (i, operand) in operands.iter().take(6).enumerate() {
                        state.text_matrix[i] = get_number(operand)
                            .unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
                    }
                    state.line_matrix = state.text_matrix;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if in_text_block {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let font = font_metrics(doc, &fonts, &mut metrics, &state.font);
                        show_string(doc, &fonts, &font, bytes, &mut state, &ctm, &mut words);
                    }
                }
            }
            "TJ" => {
                if in_text_block {
                    if let Some(Ok(array)) = operands.first().map(|o| o.as_array()) {
                        let font = font_metrics(doc, &fonts, &mut metrics, &state.font);
                        for element in array {
                            match element {
                                Object::String(bytes, _) => show_string(
                                    doc, &fonts, &font, bytes, &mut state, &ctm, &mut words,
                                ),
                                other => {
                                    // Displacements are in thousandths of an em, moving left
                                    if let Some(adj) = get_number(other) {
                                        let tx = -adj / 1000.0
                                            * state.font_size
                                            * state.horizontal_scale;
                                        state.advance(tx);
                                    }
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let font = font_metrics(doc, &fonts, &mut metrics, &state.font);
                    show_string(doc, &fonts, &font, bytes, &mut state, &ctm, &mut words);
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    state.word_spacing = get_number(&operands[0]).unwrap_or(0.0);
                    state.char_spacing = get_number(&operands[1]).unwrap_or(0.0);
                    state.next_line();
                    if let Object::String(bytes, _) = &operands[2] {
                        let font = font_metrics(doc, &fonts, &mut metrics, &state.font);
                        show_string(doc, &fonts, &font, bytes, &mut state, &ctm, &mut words);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(words.finish())
}

fn font_metrics(
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    cache: &mut HashMap<String, FontMetrics>,
    font: &str,
) -> FontMetrics {
    cache
        .entry(font.to_string())
        .or_insert_with(|| match fonts.get(font.as_bytes()) {
            Some(dict) => FontMetrics::from_dict(doc, dict),
            None => FontMetrics::fallback(),
        })
        .clone()
}

/// Place the glyphs of one shown string and advance the text matrix
fn show_string(
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font: &FontMetrics,
    bytes: &[u8],
    state: &mut TextState,
    ctm: &[f32; 6],
    words: &mut WordCollector,
) {
    let text = decode_string(doc, fonts, &state.font, bytes);
    let codes = font.codes(bytes);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || codes.is_empty() {
        return;
    }

    let advances: Vec<f32> = codes
        .iter()
        .map(|&code| {
            let word_spacing = if !font.two_byte && code == 32 {
                state.word_spacing
            } else {
                0.0
            };
            (font.width(code) / 1000.0 * state.font_size + state.char_spacing + word_spacing)
                * state.horizontal_scale
        })
        .collect();

    // Decoded text may not map one glyph to one char; spread the run evenly then
    let per_char: Vec<f32> = if advances.len() == chars.len() {
        advances
    } else {
        let total: f32 = advances.iter().sum();
        vec![total / chars.len() as f32; chars.len()]
    };

    for (ch, tx) in chars.into_iter().zip(per_char) {
        let start = multiply_matrices(&state.text_matrix, ctm);
        state.advance(tx);
        let end = multiply_matrices(&state.text_matrix, ctm);
        let size = effective_font_size(state.font_size, &start);
        words.push_glyph(ch, start[4], end[4], start[5], size);
    }
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Compute effective font size from base size and a text rendering matrix
fn effective_font_size(base_size: f32, matrix: &[f32; 6]) -> f32 {
    let scale_x = (matrix[0].powi(2) + matrix[1].powi(2)).sqrt();
    let scale_y = (matrix[2].powi(2) + matrix[3].powi(2)).sqrt();
    base_size * scale_x.max(scale_y)
}

/// Decode a shown string, using the font encoding when lopdf knows it
fn decode_string(
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    current_font: &str,
    bytes: &[u8],
) -> String {
    if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }

    // Fallback: try UTF-16BE then Latin-1
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    bytes.iter().map(|&b| b as char).collect()
}
