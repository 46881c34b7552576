//! Approximate text extents of a page.
//!
//! Walks the page content stream, tracking the graphics and text matrices,
//! and records a box for every text-showing operator. Glyph widths are not
//! resolved from the page fonts; every byte is assumed to be half an em wide
//! and a line one em tall. That is precise enough to tell which corner of a
//! page is covered by text.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::utils;

/// Axis-aligned rectangle `[x0, y0, x1, y1]` in page space.
pub type Rect = [f32; 4];

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Assumed advance of one string byte, in ems.
const GLYPH_ADVANCE: f32 = 0.5;

/// Assumed descender depth below the baseline, in ems.
const DESCENT: f32 = 0.2;

/// Assumed ascender height above the baseline, in ems.
const ASCENT: f32 = 0.8;

/// Boxes around the text drawn on a page, in page space.
///
/// Pages whose content cannot be read or decoded yield no boxes.
pub fn text_boxes(doc: &Document, page_id: ObjectId) -> Vec<Rect> {
    let content = match doc
        .get_page_content(page_id)
        .ok()
        .and_then(|bytes| Content::decode(&bytes).ok())
    {
        Some(content) => content,
        None => {
            debug!(?page_id, "Page content not decodable, assuming no text");
            return Vec::new();
        }
    };

    let mut scanner = TextScanner::default();
    for op in &content.operations {
        scanner.apply(op);
    }
    scanner.boxes
}

/// `m1` followed by `m2`.
fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn transform(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

struct TextScanner {
    ctm: Matrix,
    saved: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    leading: f32,
    boxes: Vec<Rect>,
}

impl Default for TextScanner {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            saved: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_size: 0.0,
            leading: 0.0,
            boxes: Vec::new(),
        }
    }
}

impl TextScanner {
    fn number(op: &Operation, index: usize) -> Option<f32> {
        op.operands.get(index).and_then(utils::as_number)
    }

    fn matrix(op: &Operation) -> Option<Matrix> {
        let mut m = IDENTITY;
        for (i, slot) in m.iter_mut().enumerate() {
            *slot = Self::number(op, i)?;
        }
        Some(m)
    }

    fn apply(&mut self, op: &Operation) {
        match op.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.saved.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Self::matrix(op) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let Some(size) = Self::number(op, 1) {
                    self.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some(leading) = Self::number(op, 0) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (Self::number(op, 0), Self::number(op, 1)) {
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Self::matrix(op) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(0.0, -self.leading),
            "Tj" => {
                let bytes = op.operands.first().map_or(0, string_len);
                self.show(bytes as f32 * GLYPH_ADVANCE);
            }
            "'" => {
                self.next_line(0.0, -self.leading);
                let bytes = op.operands.first().map_or(0, string_len);
                self.show(bytes as f32 * GLYPH_ADVANCE);
            }
            "\"" => {
                self.next_line(0.0, -self.leading);
                let bytes = op.operands.get(2).map_or(0, string_len);
                self.show(bytes as f32 * GLYPH_ADVANCE);
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    // Numbers in a TJ array move the pen left, in thousandths of an em.
                    let ems: f32 = items
                        .iter()
                        .map(|item| match item {
                            Object::String(..) => string_len(item) as f32 * GLYPH_ADVANCE,
                            other => utils::as_number(other).map_or(0.0, |n| -n / 1000.0),
                        })
                        .sum();
                    self.show(ems);
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translate(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// Record a run of text `ems` wide at the current position and advance.
    fn show(&mut self, ems: f32) {
        let size = self.font_size;
        let width = ems * size;

        if width > 0.0 && size > 0.0 {
            let m = multiply(&self.text_matrix, &self.ctm);
            let corners = [
                transform(&m, 0.0, -DESCENT * size),
                transform(&m, width, -DESCENT * size),
                transform(&m, 0.0, ASCENT * size),
                transform(&m, width, ASCENT * size),
            ];
            let xs = corners.map(|(x, _)| x);
            let ys = corners.map(|(_, y)| y);
            self.boxes.push([
                xs.iter().copied().fold(f32::INFINITY, f32::min),
                ys.iter().copied().fold(f32::INFINITY, f32::min),
                xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            ]);
        }

        self.text_matrix = multiply(&translate(width, 0.0), &self.text_matrix);
    }
}

fn string_len(obj: &Object) -> usize {
    match obj {
        Object::String(bytes, _) => bytes.len(),
        _ => 0,
    }
}
