//! # ESC/P2 Text Styling Commands
//!
//! This module implements text formatting commands for EPSON 24-pin printers.
//!
//! ## Text Styling Overview
//!
//! ESC/P2 supports various text effects that can be combined:
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Bold | ESC E / ESC F | **Emphasized** text |
//! | Italic | ESC 4 / ESC 5 | Slanted text |
//! | Underline | ESC - n | Underlined text |
//! | Double-strike | ESC G / ESC H | Each dot struck twice |
//! | Double width | ESC W n | 2x horizontal size |
//! | Double height | ESC w n | 2x vertical size |
//! | Condensed | SI / DC2 | ~58% horizontal size |
//!
//! ## Character Pitch
//!
//! | Pitch | Command | Advance (dots at 360 DPI) |
//! |-------|---------|---------------------------|
//! | 10 CPI (pica) | ESC P | 36 |
//! | 12 CPI (elite) | ESC M | 30 |
//! | 15 CPI | ESC g | 24 |
//! | 17.1 CPI | ESC P + SI | 21 |
//! | 20 CPI | ESC M + SI | 18 |
//!
//! Condensed mode is a modifier on pica/elite, not a pitch of its own;
//! the 17.1 and 20 CPI pitches are reached by combining commands.

use super::commands::{DC2, ESC, SI};

// ============================================================================
// CHARACTER PITCH
// ============================================================================

/// # Select 10.5-Point, 10-CPI Pica Pitch (ESC P)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 50 |
///
/// The power-on default pitch: 36 dots per character at 360 DPI.
#[inline]
pub fn cpi_10() -> Vec<u8> {
    vec![ESC, b'P']
}

/// # Select 10.5-Point, 12-CPI Elite Pitch (ESC M)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 4D |
#[inline]
pub fn cpi_12() -> Vec<u8> {
    vec![ESC, b'M']
}

/// # Select 10.5-Point, 15-CPI Pitch (ESC g)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 67 |
///
/// Condensed mode has no effect at this pitch.
#[inline]
pub fn cpi_15() -> Vec<u8> {
    vec![ESC, b'g']
}

/// # Condensed Printing On (SI)
///
/// Narrows pica to 17.1 CPI and elite to 20 CPI.
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 0F    |
#[inline]
pub fn condensed_on() -> Vec<u8> {
    vec![SI]
}

/// # Condensed Printing Off (DC2)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 12    |
#[inline]
pub fn condensed_off() -> Vec<u8> {
    vec![DC2]
}

// ============================================================================
// EMPHASIS AND SCORING
// ============================================================================

/// # Bold On (ESC E)
///
/// Emphasized printing: each dot column is struck with a slight horizontal
/// offset, darkening the glyph.
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 45 |
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E']
}

/// # Bold Off (ESC F)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 46 |
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'F']
}

/// # Italic On (ESC 4)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 34 |
#[inline]
pub fn italic_on() -> Vec<u8> {
    vec![ESC, b'4']
}

/// # Italic Off (ESC 5)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 35 |
#[inline]
pub fn italic_off() -> Vec<u8> {
    vec![ESC, b'5']
}

/// # Underline (ESC - n)
///
/// `n = 1` turns continuous underline on, `n = 0` turns it off. Spaces
/// produced by horizontal motion commands are not underlined; character
/// cells (including space characters) are.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 2D n |
///
/// ## Example
///
/// ```
/// use aguja::protocol::text;
///
/// assert_eq!(text::underline(true), vec![0x1B, 0x2D, 0x01]);
/// assert_eq!(text::underline(false), vec![0x1B, 0x2D, 0x00]);
/// ```
#[inline]
pub fn underline(on: bool) -> Vec<u8> {
    vec![ESC, b'-', on as u8]
}

/// # Double-Strike On (ESC G)
///
/// Prints each line twice; a second pass over the same dots. Visually
/// similar to bold but darker on multipart forms.
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 47 |
#[inline]
pub fn double_strike_on() -> Vec<u8> {
    vec![ESC, b'G']
}

/// # Double-Strike Off (ESC H)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 48 |
#[inline]
pub fn double_strike_off() -> Vec<u8> {
    vec![ESC, b'H']
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// # Double-Width (ESC W n)
///
/// `n = 1` doubles the horizontal size of every following character
/// (and doubles its advance); `n = 0` restores single width.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 57 n |
#[inline]
pub fn double_width(on: bool) -> Vec<u8> {
    vec![ESC, b'W', on as u8]
}

/// # Double-Height (ESC w n)
///
/// `n = 1` doubles the vertical size of every following character;
/// the character advance is unchanged.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 77 n |
#[inline]
pub fn double_height(on: bool) -> Vec<u8> {
    vec![ESC, b'w', on as u8]
}

/// # Intercharacter Space (ESC SP n)
///
/// Adds `n/120` inch (3 dots at 360 DPI per unit in LQ mode) after each
/// character's advance.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 20 n |
#[inline]
pub fn intercharacter_space(n: u8) -> Vec<u8> {
    vec![ESC, b' ', n]
}

// ============================================================================
// JUSTIFICATION
// ============================================================================

/// Hardware justification modes for `ESC a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
    Full = 3,
}

/// # Select Justification (ESC a n)
///
/// Lets the printer justify buffered lines itself. The layout engine
/// positions every item explicitly with `ESC $`, so it leaves this at the
/// default; the command is exposed for caller-composed streams.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 61 n |
///
/// ## Example
///
/// ```
/// use aguja::protocol::text::{justification, Justification};
///
/// assert_eq!(justification(Justification::Center), vec![0x1B, 0x61, 0x01]);
/// ```
#[inline]
pub fn justification(mode: Justification) -> Vec<u8> {
    vec![ESC, b'a', mode as u8]
}

// ============================================================================
// MASTER SELECT
// ============================================================================

/// Style bits for the `ESC !` master-select command.
///
/// Each field maps to one bit of the mode byte:
///
/// | Bit | Mask | Meaning |
/// |-----|------|---------|
/// | 0 | 0x01 | Elite pitch (12 CPI) |
/// | 1 | 0x02 | Proportional |
/// | 2 | 0x04 | Condensed |
/// | 3 | 0x08 | Bold |
/// | 4 | 0x10 | Double-strike |
/// | 5 | 0x20 | Double-width |
/// | 6 | 0x40 | Italic |
/// | 7 | 0x80 | Underline |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasterStyle {
    pub elite: bool,
    pub proportional: bool,
    pub condensed: bool,
    pub bold: bool,
    pub double_strike: bool,
    pub double_width: bool,
    pub italic: bool,
    pub underline: bool,
}

impl MasterStyle {
    /// Pack the style into the `ESC !` mode byte.
    pub fn to_byte(self) -> u8 {
        (self.elite as u8)
            | (self.proportional as u8) << 1
            | (self.condensed as u8) << 2
            | (self.bold as u8) << 3
            | (self.double_strike as u8) << 4
            | (self.double_width as u8) << 5
            | (self.italic as u8) << 6
            | (self.underline as u8) << 7
    }
}

/// # Master Select (ESC ! n)
///
/// Sets eight style attributes in a single command. Styles not covered by
/// the mode byte (double-height, 15 CPI) are untouched.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 21 n |
///
/// ## Example
///
/// ```
/// use aguja::protocol::text::{master_select, MasterStyle};
///
/// let style = MasterStyle { bold: true, underline: true, ..Default::default() };
/// assert_eq!(master_select(style), vec![0x1B, 0x21, 0x88]);
/// ```
#[inline]
pub fn master_select(style: MasterStyle) -> Vec<u8> {
    vec![ESC, b'!', style.to_byte()]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_commands() {
        assert_eq!(cpi_10(), vec![0x1B, 0x50]);
        assert_eq!(cpi_12(), vec![0x1B, 0x4D]);
        assert_eq!(cpi_15(), vec![0x1B, 0x67]);
    }

    #[test]
    fn test_condensed() {
        assert_eq!(condensed_on(), vec![0x0F]);
        assert_eq!(condensed_off(), vec![0x12]);
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold_on(), vec![0x1B, 0x45]);
        assert_eq!(bold_off(), vec![0x1B, 0x46]);
    }

    #[test]
    fn test_italic() {
        assert_eq!(italic_on(), vec![0x1B, 0x34]);
        assert_eq!(italic_off(), vec![0x1B, 0x35]);
    }

    #[test]
    fn test_underline() {
        assert_eq!(underline(true), vec![0x1B, 0x2D, 1]);
        assert_eq!(underline(false), vec![0x1B, 0x2D, 0]);
    }

    #[test]
    fn test_double_strike() {
        assert_eq!(double_strike_on(), vec![0x1B, 0x47]);
        assert_eq!(double_strike_off(), vec![0x1B, 0x48]);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(double_width(true), vec![0x1B, 0x57, 1]);
        assert_eq!(double_width(false), vec![0x1B, 0x57, 0]);
        assert_eq!(double_height(true), vec![0x1B, 0x77, 1]);
        assert_eq!(double_height(false), vec![0x1B, 0x77, 0]);
    }

    #[test]
    fn test_intercharacter_space() {
        assert_eq!(intercharacter_space(0), vec![0x1B, 0x20, 0]);
        assert_eq!(intercharacter_space(12), vec![0x1B, 0x20, 12]);
    }

    #[test]
    fn test_justification() {
        assert_eq!(justification(Justification::Left), vec![0x1B, 0x61, 0]);
        assert_eq!(justification(Justification::Center), vec![0x1B, 0x61, 1]);
        assert_eq!(justification(Justification::Right), vec![0x1B, 0x61, 2]);
        assert_eq!(justification(Justification::Full), vec![0x1B, 0x61, 3]);
    }

    #[test]
    fn test_master_style_bits() {
        assert_eq!(MasterStyle::default().to_byte(), 0x00);
        let everything = MasterStyle {
            elite: true,
            proportional: true,
            condensed: true,
            bold: true,
            double_strike: true,
            double_width: true,
            italic: true,
            underline: true,
        };
        assert_eq!(everything.to_byte(), 0xFF);

        let elite_only = MasterStyle {
            elite: true,
            ..Default::default()
        };
        assert_eq!(master_select(elite_only), vec![0x1B, 0x21, 0x01]);
    }
}
