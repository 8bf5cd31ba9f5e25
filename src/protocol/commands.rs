//! # ESC/P2 Motion and Page Commands
//!
//! This module implements the motion, page-geometry and tab-stop commands of
//! the ESC/P2 protocol used by EPSON 24-pin dot-matrix printers
//! (LQ-2090II and compatible devices).
//!
//! ## Protocol Overview
//!
//! ESC/P2 commands are byte sequences starting with escape characters. The
//! command set covers:
//!
//! - **Motion**: absolute/relative horizontal position, fine vertical feeds
//! - **Line spacing**: fixed fractions and programmable n/360″ spacing
//! - **Page geometry**: page length, margins, tab stops
//! - **Extended commands**: `ESC ( c` family with 16-bit parameter counts
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `CR`, `LF`, `FF`, `HT`, `VT`
//! - Two bytes: `ESC @`, `ESC 0`
//! - Multi-byte with parameters: `ESC J n`, `ESC $ nL nH`
//! - Extended: `ESC ( c nL nH data...` where nL/nH count the data bytes
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//! - Negative relative offsets are two's-complement in the same pair
//!
//! ## Reference
//!
//! "EPSON ESC/P Reference Manual" (ESC/P2 edition), Seiko Epson Corp.

use super::{i16_le, u16_le, u32_le};
use crate::error::EscpError;

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// Every multi-byte ESC/P2 command begins with ESC (0x1B). This byte signals
/// the start of a control sequence rather than printable text.
pub const ESC: u8 = 0x1B;

/// CR (Carriage Return) - Return print head to left margin
///
/// Moves the logical print position to the left margin without feeding
/// paper. Hex: 0x0D, Decimal: 13.
pub const CR: u8 = 0x0D;

/// LF (Line Feed) - Print and advance one line
///
/// Prints any data in the line buffer and advances paper by the current
/// line spacing amount (default 1/6 inch).
pub const LF: u8 = 0x0A;

/// FF (Form Feed) - Eject page
///
/// Prints the buffer and feeds to the top of the next page as defined by
/// the current page length.
pub const FF: u8 = 0x0C;

/// HT (Horizontal Tab) - Advance to next horizontal tab stop
pub const HT: u8 = 0x09;

/// VT (Vertical Tab) - Advance to next vertical tab stop
pub const VT: u8 = 0x0B;

/// SI (Shift In) - Condensed printing on
///
/// Also reachable as `ESC SI`; the bare control code is the canonical form.
pub const SI: u8 = 0x0F;

/// DC2 (Device Control 2) - Condensed printing off
pub const DC2: u8 = 0x12;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state. Every well-formed
/// document stream begins with this command.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## What Gets Reset
///
/// - Print buffer is cleared
/// - Text styles (bold, italic, underline, double-strike) disabled
/// - Pitch reset to 10 CPI, condensed cancelled
/// - Line spacing reset to 1/6 inch
/// - Tab stops reset to defaults
/// - Page position becomes top-of-form
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// LINE SPACING
// ============================================================================

/// # Select 1/8-Inch Line Spacing (ESC 0)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 30 |
#[inline]
pub fn line_spacing_1_8() -> Vec<u8> {
    vec![ESC, b'0']
}

/// # Select 7/60-Inch Line Spacing (ESC 1)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 31 |
#[inline]
pub fn line_spacing_7_60() -> Vec<u8> {
    vec![ESC, b'1']
}

/// # Select 1/6-Inch Line Spacing (ESC 2)
///
/// The power-on default spacing (60 dots at 360 DPI).
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 32 |
#[inline]
pub fn line_spacing_1_6() -> Vec<u8> {
    vec![ESC, b'2']
}

/// # Set n/180-Inch Line Spacing (ESC 3 n)
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 33 n |
///
/// `n` is in units of 1/180 inch (2 dots), 0–255.
#[inline]
pub fn line_spacing_n_180(n: u8) -> Vec<u8> {
    vec![ESC, b'3', n]
}

/// # Set n/60-Inch Line Spacing (ESC A n)
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 41 n |
///
/// `n` is in units of 1/60 inch (6 dots), 0–255.
#[inline]
pub fn line_spacing_n_60(n: u8) -> Vec<u8> {
    vec![ESC, b'A', n]
}

/// # Set n/360-Inch Line Spacing (ESC + n)
///
/// The finest programmable spacing: one unit per dot.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 2B n |
#[inline]
pub fn line_spacing_n_360(n: u8) -> Vec<u8> {
    vec![ESC, b'+', n]
}

// ============================================================================
// HORIZONTAL MOTION
// ============================================================================

/// # Absolute Horizontal Position (ESC $ nL nH)
///
/// Moves the print position to an absolute horizontal offset measured in
/// units of 1/60 inch (6 dots) from the left edge.
///
/// ## Protocol Details
///
/// | Format  | Bytes       |
/// |---------|-------------|
/// | ASCII   | ESC $ nL nH |
/// | Hex     | 1B 24 nL nH |
///
/// ## Parameters
///
/// - `units`: target position in 1/60-inch units, little-endian 16-bit
///
/// A position beyond the right margin is ignored by the hardware; the
/// layout engine never generates one.
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// // 90 dots = 15 units of 1/60"
/// assert_eq!(commands::absolute_horizontal(15), vec![0x1B, 0x24, 15, 0]);
/// ```
#[inline]
pub fn absolute_horizontal(units: u16) -> Vec<u8> {
    let [nl, nh] = u16_le(units);
    vec![ESC, b'$', nl, nh]
}

/// # Relative Horizontal Position (ESC \ nL nH)
///
/// Moves the print position left or right of the current position, in
/// units of 1/180 inch in draft mode (the engine always positions with
/// `ESC $` first, so this is exposed for completeness and for callers
/// composing their own streams).
///
/// ## Protocol Details
///
/// | Format  | Bytes       |
/// |---------|-------------|
/// | Hex     | 1B 5C nL nH |
///
/// Negative offsets are encoded as two's complement:
///
/// ```
/// use aguja::protocol::commands;
///
/// assert_eq!(commands::relative_horizontal(10), vec![0x1B, 0x5C, 0x0A, 0x00]);
/// assert_eq!(commands::relative_horizontal(-10), vec![0x1B, 0x5C, 0xF6, 0xFF]);
/// ```
#[inline]
pub fn relative_horizontal(units: i16) -> Vec<u8> {
    let [nl, nh] = i16_le(units);
    vec![ESC, b'\\', nl, nh]
}

// ============================================================================
// VERTICAL MOTION
// ============================================================================

/// # Advance Paper n/180 Inch (ESC J n)
///
/// Feeds paper forward by `n` units of 1/180 inch (2 dots) without a
/// carriage return. This is the render phase's workhorse: every vertical
/// cursor move is one or more `ESC J` commands.
///
/// ## Protocol Details
///
/// | Format  | Bytes   |
/// |---------|---------|
/// | ASCII   | ESC J n |
/// | Hex     | 1B 4A n |
/// | Decimal | 27 74 n |
///
/// ## Parameters
///
/// - `n`: feed amount in 1/180-inch units (0–255), i.e. at most 510 dots
///   per command. Larger advances are split by the caller.
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// // Advance 300/180" (600 dots)? Not in one command:
/// let mut data = commands::advance_vertical(255);
/// data.extend(commands::advance_vertical(45));
/// assert_eq!(data, vec![0x1B, 0x4A, 0xFF, 0x1B, 0x4A, 0x2D]);
/// ```
#[inline]
pub fn advance_vertical(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// # Reverse Paper Feed (ESC j nL nH)
///
/// Feeds paper backward in units of 1/180 inch. The render phase uses
/// this only to roll back to the top of a multi-stripe graphics band;
/// general layout motion is forward-only.
///
/// | Format | Bytes       |
/// |--------|-------------|
/// | Hex    | 1B 6A nL nH |
#[inline]
pub fn reverse_feed(units: u16) -> Vec<u8> {
    let [nl, nh] = u16_le(units);
    vec![ESC, b'j', nl, nh]
}

// ============================================================================
// PAGE LENGTH
// ============================================================================

/// # Set Page Length in Lines (ESC C n)
///
/// Defines the logical page as `n` text lines at the current line spacing.
/// Also sets the current position as top-of-form.
///
/// ## Protocol Details
///
/// | Format  | Bytes   |
/// |---------|---------|
/// | Hex     | 1B 43 n |
///
/// ## Errors
///
/// `n` must be 1–127; anything else is a [`EscpError::Range`].
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// assert_eq!(commands::page_length_lines(66).unwrap(), vec![0x1B, 0x43, 66]);
/// assert!(commands::page_length_lines(0).is_err());
/// assert!(commands::page_length_lines(128).is_err());
/// ```
pub fn page_length_lines(n: u8) -> Result<Vec<u8>, EscpError> {
    EscpError::check_range("page_length_lines", n as i64, 1, 127)?;
    Ok(vec![ESC, b'C', n])
}

/// # Set Page Length in Inches (ESC C NUL n)
///
/// Defines the logical page as `n` inches, independent of line spacing.
///
/// ## Protocol Details
///
/// | Format  | Bytes      |
/// |---------|------------|
/// | Hex     | 1B 43 00 n |
///
/// ## Errors
///
/// `n` must be 1–22 (the longest form the tractor can address).
pub fn page_length_inches(n: u8) -> Result<Vec<u8>, EscpError> {
    EscpError::check_range("page_length_inches", n as i64, 1, 22)?;
    Ok(vec![ESC, b'C', 0x00, n])
}

// ============================================================================
// MARGINS
// ============================================================================

/// # Set Left Margin (ESC l n)
///
/// Sets the left margin to `n` columns at the current character pitch.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 6C n |
#[inline]
pub fn left_margin(columns: u8) -> Vec<u8> {
    vec![ESC, b'l', columns]
}

/// # Set Right Margin (ESC Q n)
///
/// Sets the right margin to `n` columns at the current character pitch.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 51 n |
#[inline]
pub fn right_margin(columns: u8) -> Vec<u8> {
    vec![ESC, b'Q', columns]
}

/// # Set Bottom Margin (ESC N n)
///
/// Skips `n` lines over the perforation of continuous paper.
///
/// | Format | Bytes   |
/// |--------|---------|
/// | Hex    | 1B 4E n |
#[inline]
pub fn bottom_margin(lines: u8) -> Vec<u8> {
    vec![ESC, b'N', lines]
}

/// # Cancel Bottom Margin (ESC O)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 4F |
#[inline]
pub fn cancel_bottom_margin() -> Vec<u8> {
    vec![ESC, b'O']
}

// ============================================================================
// TAB STOPS
// ============================================================================

/// Maximum number of horizontal tab stops the hardware stores.
pub const MAX_HORIZONTAL_TABS: usize = 32;

/// Maximum number of vertical tab stops the hardware stores.
pub const MAX_VERTICAL_TABS: usize = 16;

/// # Set Horizontal Tab Stops (ESC D n1 … nk NUL)
///
/// Replaces the horizontal tab table with the given column positions.
/// Positions are sorted and deduplicated before emission so the stream is
/// byte-identical regardless of caller ordering.
///
/// ## Protocol Details
///
/// | Format  | Bytes             |
/// |---------|-------------------|
/// | Hex     | 1B 44 n1 … nk 00  |
///
/// ## Errors
///
/// More than 32 distinct stops is a [`EscpError::Range`].
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// let cmd = commands::horizontal_tabs(&[20, 10, 10]).unwrap();
/// assert_eq!(cmd, vec![0x1B, 0x44, 10, 20, 0x00]);
/// ```
pub fn horizontal_tabs(columns: &[u8]) -> Result<Vec<u8>, EscpError> {
    let stops = normalize_tabs(columns);
    EscpError::check_range(
        "horizontal_tabs",
        stops.len() as i64,
        0,
        MAX_HORIZONTAL_TABS as i64,
    )?;
    let mut cmd = Vec::with_capacity(3 + stops.len());
    cmd.push(ESC);
    cmd.push(b'D');
    cmd.extend_from_slice(&stops);
    cmd.push(0x00);
    Ok(cmd)
}

/// # Set Vertical Tab Stops (ESC B n1 … nk NUL)
///
/// Replaces the vertical tab table with the given line positions, sorted
/// and deduplicated. At most 16 stops.
///
/// | Format | Bytes            |
/// |--------|------------------|
/// | Hex    | 1B 42 n1 … nk 00 |
pub fn vertical_tabs(lines: &[u8]) -> Result<Vec<u8>, EscpError> {
    let stops = normalize_tabs(lines);
    EscpError::check_range(
        "vertical_tabs",
        stops.len() as i64,
        0,
        MAX_VERTICAL_TABS as i64,
    )?;
    let mut cmd = Vec::with_capacity(3 + stops.len());
    cmd.push(ESC);
    cmd.push(b'B');
    cmd.extend_from_slice(&stops);
    cmd.push(0x00);
    Ok(cmd)
}

/// Sort and deduplicate tab positions, dropping zeros (column 0 is not a
/// storable stop).
fn normalize_tabs(positions: &[u8]) -> Vec<u8> {
    let mut stops: Vec<u8> = positions.iter().copied().filter(|&p| p > 0).collect();
    stops.sort_unstable();
    stops.dedup();
    stops
}

// ============================================================================
// EXTENDED COMMANDS (ESC ( c nL nH data)
// ============================================================================

/// Assemble an extended `ESC ( c` command with a little-endian data count.
fn extended(selector: u8, data: &[u8]) -> Vec<u8> {
    let [nl, nh] = u16_le(data.len() as u16);
    let mut cmd = Vec::with_capacity(5 + data.len());
    cmd.push(ESC);
    cmd.push(b'(');
    cmd.push(selector);
    cmd.push(nl);
    cmd.push(nh);
    cmd.extend_from_slice(data);
    cmd
}

/// # Set Unit (ESC ( U 01 00 n)
///
/// Defines the base unit for the extended positioning commands as
/// `n / 3600` inch. `n = 10` selects the engine's native 1/360-inch dot.
///
/// ## Protocol Details
///
/// | Format | Bytes            |
/// |--------|------------------|
/// | Hex    | 1B 28 55 01 00 n |
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// assert_eq!(commands::set_unit(10), vec![0x1B, 0x28, 0x55, 0x01, 0x00, 10]);
/// ```
#[inline]
pub fn set_unit(n: u8) -> Vec<u8> {
    extended(b'U', &[n])
}

/// # Set Page Length in Defined Units (ESC ( C 04 00 m1 m2 m3 m4)
///
/// Four-byte little-endian page length, measured in the unit selected by
/// [`set_unit`].
///
/// | Format | Bytes                      |
/// |--------|----------------------------|
/// | Hex    | 1B 28 43 04 00 m1 m2 m3 m4 |
#[inline]
pub fn page_length_units(units: u32) -> Vec<u8> {
    extended(b'C', &u32_le(units))
}

/// # Set Page Format (ESC ( c 08 00 t1..t4 b1..b4)
///
/// Defines the top and bottom print limits in defined units, both as
/// four-byte little-endian values measured from the top of the page.
///
/// | Format | Bytes                              |
/// |--------|------------------------------------|
/// | Hex    | 1B 28 63 08 00 t1 t2 t3 t4 b1 b2 b3 b4 |
///
/// ## Errors
///
/// The bottom limit must lie strictly below the top limit.
pub fn page_format(top_units: u32, bottom_units: u32) -> Result<Vec<u8>, EscpError> {
    if bottom_units <= top_units {
        return Err(EscpError::Validation(format!(
            "page_format: bottom ({bottom_units}) must exceed top ({top_units})"
        )));
    }
    let mut data = Vec::with_capacity(8);
    data.extend_from_slice(&u32_le(top_units));
    data.extend_from_slice(&u32_le(bottom_units));
    Ok(extended(b'c', &data))
}

/// # Absolute Vertical Position (ESC ( V 04 00 m1 m2 m3 m4)
///
/// Moves to an absolute vertical position in defined units from the top
/// margin. Only forward motion is honored by the hardware.
///
/// | Format | Bytes                      |
/// |--------|----------------------------|
/// | Hex    | 1B 28 56 04 00 m1 m2 m3 m4 |
#[inline]
pub fn absolute_vertical_units(units: u32) -> Vec<u8> {
    extended(b'V', &u32_le(units))
}

/// # Relative Vertical Position (ESC ( v 04 00 m1 m2 m3 m4)
///
/// Moves the vertical position by a signed offset in defined units;
/// negative offsets are two's-complement encoded.
///
/// | Format | Bytes                      |
/// |--------|----------------------------|
/// | Hex    | 1B 28 76 04 00 m1 m2 m3 m4 |
///
/// ## Example
///
/// ```
/// use aguja::protocol::commands;
///
/// assert_eq!(
///     commands::relative_vertical_units(-1),
///     vec![0x1B, 0x28, 0x76, 0x04, 0x00, 0xFF, 0xFF, 0xFF, 0xFF],
/// );
/// ```
#[inline]
pub fn relative_vertical_units(units: i32) -> Vec<u8> {
    extended(b'v', &u32_le(units as u32))
}

/// # Select Line Score (ESC ( - 03 00 01 d1 d2)
///
/// Scores subsequent text with underline, strikethrough or overscore
/// (`d1`: 1/2/3) in single or double, continuous or broken weight (`d2`).
///
/// | Format | Bytes                  |
/// |--------|------------------------|
/// | Hex    | 1B 28 2D 03 00 01 d1 d2 |
///
/// ## Errors
///
/// `d1` outside 1–3 or `d2` outside 0–6 is a [`EscpError::Range`].
pub fn line_score(position: u8, weight: u8) -> Result<Vec<u8>, EscpError> {
    EscpError::check_range("line_score.position", position as i64, 1, 3)?;
    EscpError::check_range("line_score.weight", weight as i64, 0, 6)?;
    Ok(extended(b'-', &[0x01, position, weight]))
}

// ============================================================================
// TESTS
// ============================================================================
