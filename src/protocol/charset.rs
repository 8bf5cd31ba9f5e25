//! # Character Tables and Text Encoding
//!
//! Converts Unicode strings to the single-byte code pages of ESC/P2
//! printers, and builds the character-table selection commands.
//!
//! ## Encoding Pipeline
//!
//! Text is translated in two stages, mirroring what the hardware does when
//! it prints a byte:
//!
//! 1. **International charset substitution** (`ESC R n`): twelve code
//!    positions (`# $ @ [ \ ] ^ ` { | } ~`) carry national glyphs. When the
//!    UK charset is active, `£` encodes as byte 0x23; when Germany is
//!    active, `Ä` encodes as 0x5B; and so on.
//! 2. **Character-table translation** (`ESC t n`): for CP437-family tables,
//!    the Unicode box-drawing block (U+2500–U+256C) maps to the table's
//!    upper half so grid borders print as line glyphs.
//!
//! Any other non-ASCII code point passes through as the low byte of its
//! code unit; lossy substitution is logged, never an error.
//!
//! ## Reference
//!
//! "EPSON ESC/P Reference Manual", character tables appendix.

use super::commands::ESC;

// ============================================================================
// CHARACTER TABLES
// ============================================================================

/// Character tables assignable with `ESC ( t` and selectable with `ESC t`.
///
/// The discriminant is the table's registration id (the `d2` parameter of
/// `ESC ( t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharTable {
    /// Italic half table (upper half prints the lower half italicized).
    Italic = 0,
    /// PC437 (US). The power-on default on the reference device.
    #[default]
    PC437 = 1,
    /// PC850 (Multilingual).
    PC850 = 3,
    /// PC860 (Portugal).
    PC860 = 7,
    /// PC863 (Canada-French).
    PC863 = 8,
    /// PC865 (Norway).
    PC865 = 9,
    /// PC852 (East Europe).
    PC852 = 10,
    /// PC858 (Multilingual with Euro).
    PC858 = 13,
    /// PC866 (Cyrillic).
    PC866 = 14,
}

impl CharTable {
    /// Whether this table's upper half carries the CP437 box-drawing
    /// glyphs, making text-mode borders possible.
    pub fn has_box_glyphs(self) -> bool {
        !matches!(self, CharTable::Italic)
    }
}

/// # Select Character Table (ESC t n)
///
/// Switches printing to one of the assigned tables (slot 0–3).
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 74 n |
#[inline]
pub fn select_table(slot: u8) -> Vec<u8> {
    vec![ESC, b't', slot]
}

/// # Assign Character Table (ESC ( t 03 00 d1 d2 d3)
///
/// Registers `table` into selection slot `d1` so `ESC t d1` can reach it.
/// `d3` is always 0 for the registered tables this crate knows.
///
/// | Format | Bytes                   |
/// |--------|-------------------------|
/// | Hex    | 1B 28 74 03 00 d1 d2 00 |
#[inline]
pub fn assign_table(slot: u8, table: CharTable) -> Vec<u8> {
    vec![ESC, b'(', b't', 0x03, 0x00, slot, table as u8, 0x00]
}

// ============================================================================
// INTERNATIONAL CHARSETS
// ============================================================================

/// International character sets for `ESC R n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum International {
    #[default]
    Usa = 0,
    France = 1,
    Germany = 2,
    Uk = 3,
    DenmarkI = 4,
    Sweden = 5,
    Italy = 6,
    SpainI = 7,
    Japan = 8,
    Norway = 9,
    DenmarkII = 10,
    SpainII = 11,
    LatinAmerica = 12,
    Korea = 13,
    Legal = 64,
}

/// # Select International Character Set (ESC R n)
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 52 n |
#[inline]
pub fn select_international(charset: International) -> Vec<u8> {
    vec![ESC, b'R', charset as u8]
}

/// National glyphs occupying the twelve variable code positions, as
/// (replacement character, byte) pairs. Characters already covered by
/// ASCII (e.g. `#` in the USA set) are omitted; only the glyphs that
/// *differ* from ASCII need a substitution entry.
fn national_substitutions(charset: International) -> &'static [(char, u8)] {
    match charset {
        International::Usa | International::Japan => &[],
        International::France => &[
            ('à', 0x40),
            ('°', 0x5B),
            ('ç', 0x5C),
            ('§', 0x5D),
            ('é', 0x7B),
            ('ù', 0x7C),
            ('è', 0x7D),
            ('¨', 0x7E),
        ],
        International::Germany => &[
            ('§', 0x40),
            ('Ä', 0x5B),
            ('Ö', 0x5C),
            ('Ü', 0x5D),
            ('ä', 0x7B),
            ('ö', 0x7C),
            ('ü', 0x7D),
            ('ß', 0x7E),
        ],
        International::Uk => &[('£', 0x23)],
        International::DenmarkI => &[
            ('Æ', 0x5B),
            ('Ø', 0x5C),
            ('Å', 0x5D),
            ('æ', 0x7B),
            ('ø', 0x7C),
            ('å', 0x7D),
        ],
        International::Sweden => &[
            ('¤', 0x24),
            ('É', 0x40),
            ('Ä', 0x5B),
            ('Ö', 0x5C),
            ('Å', 0x5D),
            ('Ü', 0x5E),
            ('é', 0x60),
            ('ä', 0x7B),
            ('ö', 0x7C),
            ('å', 0x7D),
            ('ü', 0x7E),
        ],
        International::Italy => &[
            ('°', 0x5B),
            ('é', 0x5D),
            ('ù', 0x60),
            ('à', 0x7B),
            ('ò', 0x7C),
            ('è', 0x7D),
            ('ì', 0x7E),
        ],
        International::SpainI => &[
            ('₧', 0x23),
            ('¡', 0x5B),
            ('Ñ', 0x5C),
            ('¿', 0x5D),
            ('¨', 0x7B),
            ('ñ', 0x7C),
        ],
        International::Norway => &[
            ('¤', 0x24),
            ('É', 0x40),
            ('Æ', 0x5B),
            ('Ø', 0x5C),
            ('Å', 0x5D),
            ('Ü', 0x5E),
            ('é', 0x60),
            ('æ', 0x7B),
            ('ø', 0x7C),
            ('å', 0x7D),
            ('ü', 0x7E),
        ],
        International::DenmarkII => &[
            ('É', 0x40),
            ('Æ', 0x5B),
            ('Ø', 0x5C),
            ('Å', 0x5D),
            ('Ü', 0x5E),
            ('é', 0x60),
            ('æ', 0x7B),
            ('ø', 0x7C),
            ('å', 0x7D),
            ('ü', 0x7E),
        ],
        International::SpainII => &[
            ('á', 0x40),
            ('¡', 0x5B),
            ('Ñ', 0x5C),
            ('¿', 0x5D),
            ('é', 0x5E),
            ('í', 0x7B),
            ('ñ', 0x7C),
            ('ó', 0x7D),
            ('ú', 0x7E),
        ],
        International::LatinAmerica => &[
            ('á', 0x40),
            ('¡', 0x5B),
            ('Ñ', 0x5C),
            ('¿', 0x5D),
            ('é', 0x5E),
            ('ü', 0x60),
            ('í', 0x7B),
            ('ñ', 0x7C),
            ('ó', 0x7D),
            ('ú', 0x7E),
        ],
        International::Korea => &[('₩', 0x5C)],
        International::Legal => &[
            ('§', 0x40),
            ('°', 0x5B),
            ('′', 0x5C),
            ('″', 0x5D),
            ('¶', 0x5E),
            ('©', 0x7B),
            ('®', 0x7C),
            ('†', 0x7D),
            ('™', 0x7E),
        ],
    }
}

// ============================================================================
// BOX-DRAWING MAP
// ============================================================================

/// Unicode box-drawing code points mapped to their CP437-family bytes,
/// sorted by code point for binary search.
///
/// Covers the single-line set (U+2500–U+253C), the double-line set and the
/// single/double hybrids (U+2550–U+256C). The same upper-half positions
/// hold these glyphs in every CP437-family table, which is what makes
/// text-mode borders portable across those tables.
const BOX_DRAWING: &[(char, u8)] = &[
    ('\u{2500}', 0xC4), // ─
    ('\u{2502}', 0xB3), // │
    ('\u{250C}', 0xDA), // ┌
    ('\u{2510}', 0xBF), // ┐
    ('\u{2514}', 0xC0), // └
    ('\u{2518}', 0xD9), // ┘
    ('\u{251C}', 0xC3), // ├
    ('\u{2524}', 0xB4), // ┤
    ('\u{252C}', 0xC2), // ┬
    ('\u{2534}', 0xC1), // ┴
    ('\u{253C}', 0xC5), // ┼
    ('\u{2550}', 0xCD), // ═
    ('\u{2551}', 0xBA), // ║
    ('\u{2552}', 0xD5), // ╒
    ('\u{2553}', 0xD6), // ╓
    ('\u{2554}', 0xC9), // ╔
    ('\u{2555}', 0xB8), // ╕
    ('\u{2556}', 0xB7), // ╖
    ('\u{2557}', 0xBB), // ╗
    ('\u{2558}', 0xD4), // ╘
    ('\u{2559}', 0xD3), // ╙
    ('\u{255A}', 0xC8), // ╚
    ('\u{255B}', 0xBE), // ╛
    ('\u{255C}', 0xBD), // ╜
    ('\u{255D}', 0xBC), // ╝
    ('\u{255E}', 0xC6), // ╞
    ('\u{255F}', 0xC7), // ╟
    ('\u{2560}', 0xCC), // ╠
    ('\u{2561}', 0xB5), // ╡
    ('\u{2562}', 0xB6), // ╢
    ('\u{2563}', 0xB9), // ╣
    ('\u{2564}', 0xD1), // ╤
    ('\u{2565}', 0xD2), // ╥
    ('\u{2566}', 0xCB), // ╦
    ('\u{2567}', 0xCF), // ╧
    ('\u{2568}', 0xD0), // ╨
    ('\u{2569}', 0xCA), // ╩
    ('\u{256A}', 0xD8), // ╪
    ('\u{256B}', 0xD7), // ╫
    ('\u{256C}', 0xCE), // ╬
];

/// Map a Unicode box-drawing character to its CP437 byte, if it has one.
pub fn box_drawing_byte(ch: char) -> Option<u8> {
    BOX_DRAWING
        .binary_search_by_key(&ch, |&(c, _)| c)
        .ok()
        .map(|i| BOX_DRAWING[i].1)
}

// ============================================================================
// ENCODING
// ============================================================================

/// Encode a Unicode string for the active code page.
///
/// - National glyphs of the active international charset encode to their
///   variable code position (UK: `£` → 0x23)
/// - Box-drawing characters encode to the CP437 upper half when a
///   CP437-family table is active
/// - ASCII passes through unchanged
/// - Anything else passes through as the low byte of its code point; the
///   substitution is logged at `warn` level but is never an error
///
/// ## Example
///
/// ```
/// use aguja::protocol::charset::{encode, CharTable, International};
///
/// let bytes = encode("£1 ─", International::Uk, CharTable::PC437);
/// assert_eq!(bytes, vec![0x23, b'1', b' ', 0xC4]);
/// ```
pub fn encode(text: &str, charset: International, table: CharTable) -> Vec<u8> {
    let subs = national_substitutions(charset);
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(&(_, byte)) = subs.iter().find(|&&(c, _)| c == ch) {
            out.push(byte);
        } else if (ch as u32) < 0x80 {
            out.push(ch as u8);
        } else if table.has_box_glyphs()
            && let Some(byte) = box_drawing_byte(ch)
        {
            out.push(byte);
        } else {
            let byte = (ch as u32 & 0xFF) as u8;
            log::warn!(
                "charset: no mapping for '{}' (U+{:04X}), passing through as 0x{:02X}",
                ch,
                ch as u32,
                byte
            );
            out.push(byte);
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
