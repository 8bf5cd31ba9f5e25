//! # Text Metrics
//!
//! Computes text widths in dots and performs greedy word wrap. The measure
//! phase and the render phase use the same arithmetic, which is what makes
//! the post-emit cursor position exact: for every text leaf,
//! `cursor_x = item.x + width(text, style)` in integer dots.
//!
//! ## Monospace Advance
//!
//! One character advances by the pitch's dot width (see
//! [`crate::layout::style::Cpi::dot_width`]), doubled under double-width,
//! plus any intercharacter space.
//!
//! ## Proportional Advance
//!
//! Proportional mode consults a per-glyph width table for printable ASCII.
//! The table is expressed at 10 CPI (monospace ideal 36) and scaled to the
//! active pitch; letters stay within ±1 dot of the monospace ideal and no
//! glyph exceeds it.

use super::style::{Cpi, Style};

/// Per-glyph advances for ASCII 0x20–0x7E at 10 CPI (monospace ideal 36).
///
/// Narrow punctuation takes roughly half a cell; letters are within one
/// dot of the monospace width; no entry exceeds 36.
#[rustfmt::skip]
const PROPORTIONAL_10CPI: [u8; 95] = [
    18, // ' '
    18, // '!'
    24, // '"'
    36, // '#'
    36, // '$'
    36, // '%'
    36, // '&'
    16, // '\''
    22, // '('
    22, // ')'
    28, // '*'
    36, // '+'
    18, // ','
    28, // '-'
    18, // '.'
    28, // '/'
    36, 36, 36, 36, 36, 36, 36, 36, 36, 36, // '0'-'9'
    18, // ':'
    18, // ';'
    32, // '<'
    36, // '='
    32, // '>'
    32, // '?'
    36, // '@'
    36, 36, 36, 36, 36, 35, 36, 36, 35, 35, // 'A'-'J'
    36, 35, 36, 36, 36, 36, 36, 36, 36, 35, // 'K'-'T'
    36, 36, 36, 36, 36, 36,                 // 'U'-'Z'
    22, // '['
    28, // '\\'
    22, // ']'
    30, // '^'
    36, // '_'
    16, // '`'
    36, 36, 35, 36, 36, 35, 36, 36, 35, 35, // 'a'-'j'
    36, 35, 36, 36, 36, 36, 36, 35, 35, 35, // 'k'-'t'
    36, 36, 36, 36, 36, 35,                 // 'u'-'z'
    24, // '{'
    16, // '|'
    24, // '}'
    32, // '~'
];

/// Advance of a single character in dots.
///
/// Non-ASCII characters (box-drawing glyphs, national characters) occupy a
/// full monospace cell in either mode.
pub fn char_advance(
    ch: char,
    cpi: Cpi,
    proportional: bool,
    condensed: bool,
    double_width: bool,
    inter_char_space: i32,
) -> i32 {
    let style = Style {
        cpi,
        condensed,
        double_width,
        ..Style::default()
    };
    let mono = style.char_advance();
    let glyph = if proportional {
        match u32::from(ch) {
            0x20..=0x7E => {
                let at_10 = PROPORTIONAL_10CPI[ch as usize - 0x20] as i32;
                // Scale from the 10-CPI table to the active pitch,
                // rounding to the nearest dot.
                (at_10 * mono + 18) / 36
            }
            _ => mono,
        }
    } else {
        mono
    };
    glyph + inter_char_space
}

/// Width of a string in dots.
///
/// The spec form of the operation: every parameter explicit. The measure
/// phase uses the [`text_width`] convenience wrapper.
pub fn width(
    text: &str,
    cpi: Cpi,
    proportional: bool,
    condensed: bool,
    double_width: bool,
    inter_char_space: i32,
) -> i32 {
    text.chars()
        .map(|ch| char_advance(ch, cpi, proportional, condensed, double_width, inter_char_space))
        .sum()
}

/// Width of a string under a resolved style (monospace, no extra spacing).
pub fn text_width(text: &str, style: &Style) -> i32 {
    style.char_advance() * text.chars().count() as i32
}

/// Greedy word wrap.
///
/// Splits on whitespace boundaries, packing as many words as fit into
/// `max_dots` per line. A single word wider than `max_dots` is broken at
/// character boundaries. Returns at least one (possibly empty) line.
///
/// ## Example
///
/// ```
/// use aguja::layout::{metrics, Style};
///
/// // 10 CPI: 36 dots per character, 10 characters per 360 dots.
/// let lines = metrics::wrap("the quick brown fox", 360, &Style::default());
/// assert_eq!(lines, vec!["the quick", "brown fox"]);
/// ```
pub fn wrap(text: &str, max_dots: i32, style: &Style) -> Vec<String> {
    let advance = style.char_advance();
    let max_chars = if advance > 0 { (max_dots / advance).max(1) as usize } else { 1 };

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            // Flush the current line, then hard-break the long word.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut rest: Vec<char> = word.chars().collect();
            while rest.len() > max_chars {
                lines.push(rest[..max_chars].iter().collect());
                rest.drain(..max_chars);
            }
            current = rest.into_iter().collect();
            current_len = current.chars().count();
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    lines.push(current);
    lines
}

// ============================================================================
// TESTS
// ============================================================================
