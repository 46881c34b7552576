//! Glyph metrics and text encoding for the standard Helvetica-Bold font.
//!
//! The stamp references Helvetica-Bold as a standard-14 font with
//! `WinAnsiEncoding`, so no font program is embedded. Text is written as
//! WinAnsi (CP1252) bytes, and centering uses the advance widths of those
//! bytes from the Adobe AFM for Helvetica-Bold, in thousandths of an em.

/// PDF base font name used for stamp text.
pub const FONT_NAME: &str = "Helvetica-Bold";

/// Advance widths for the printable ASCII range `0x20..=0x7e`.
const ASCII_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    278, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Advance widths for WinAnsi bytes `0x80..=0xff`. Unassigned codes are 0.
const HIGH_WIDTHS: [u16; 128] = [
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xa0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xb0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xc0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xd0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xe0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xf0
];

/// Width used for bytes without a glyph.
const FALLBACK_WIDTH: u16 = 556;

/// Byte written for characters WinAnsi cannot represent.
const REPLACEMENT: u8 = b'?';

/// WinAnsi code of a character, if the encoding has one.
///
/// Control characters have no glyph and are not encodable.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// First character of `text` that WinAnsi cannot represent.
pub fn first_unencodable(text: &str) -> Option<char> {
    text.chars().find(|c| win_ansi_byte(*c).is_none())
}

/// Encode `text` as WinAnsi bytes, replacing unencodable characters by `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_byte(c).unwrap_or(REPLACEMENT))
        .collect()
}

/// Advance width of a WinAnsi byte in font units.
fn byte_width(byte: u8) -> u16 {
    let width = match byte {
        0x20..=0x7e => ASCII_WIDTHS[usize::from(byte - 0x20)],
        0x80..=0xff => HIGH_WIDTHS[usize::from(byte - 0x80)],
        _ => 0,
    };
    if width == 0 { FALLBACK_WIDTH } else { width }
}

/// Width of `text` in points when encoded with [`encode_win_ansi`] and set in
/// Helvetica-Bold at `font_size`.
pub fn string_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| u32::from(byte_width(b)))
        .sum();
    units as f32 * font_size / 1000.0
}
