//! # ESC/P2 Bit-Image Graphics
//!
//! This module implements the `ESC *` bit-image command and the fixed table
//! of graphics modes for EPSON 24-pin printers.
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► X (horizontal, one column per data group)
//!   │
//!   │   Each column is 8 or 24 vertically stacked pins.
//!   │   24-pin columns are 3 bytes: pin 0 in the MSB of byte 0,
//!   │   pin 23 in the LSB of byte 2.
//!   ▼
//!   Y (paper feed direction)
//! ```
//!
//! ## Bit Packing
//!
//! Graphics data is packed column-major:
//! - Byte 0 bit 7 (MSB) = pin 0 (topmost)
//! - Byte 2 bit 0 (LSB) = pin 23 (bottommost, 24-pin modes)
//! - 1 = fire pin (print dot), 0 = no dot
//!
//! The packing itself lives in [`crate::render::raster`]; this module only
//! validates and frames the packed data.
//!
//! ## Graphics Modes
//!
//! | m | Pins | H-DPI | Bytes/col | Adjacent dots |
//! |---|------|-------|-----------|---------------|
//! | 0 | 8 | 60 | 1 | yes |
//! | 1 | 8 | 120 | 1 | yes |
//! | 2 | 8 | 120 | 1 | no |
//! | 3 | 8 | 240 | 1 | no |
//! | 4 | 8 | 80 | 1 | yes |
//! | 5 | 8 | 72 | 1 | yes |
//! | 6 | 8 | 90 | 1 | yes |
//! | 7 | 8 | 144 | 1 | yes |
//! | 32 | 24 | 60 | 3 | yes |
//! | 33 | 24 | 120 | 3 | yes |
//! | 38 | 24 | 90 | 3 | yes |
//! | 39 | 24 | 180 | 3 | yes |
//! | 40 | 24 | 360 | 3 | no |
//!
//! Modes that disallow adjacent dots cannot fire the same pin in two
//! consecutive columns; the caller selects the mode, the converter never
//! chooses one.

use super::u16_le;
use crate::error::EscpError;
use crate::protocol::commands::ESC;

// ============================================================================
// GRAPHICS MODE TABLE
// ============================================================================

/// Descriptor for one `ESC *` graphics mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsMode {
    /// The `m` parameter of `ESC *`.
    pub mode: u8,
    /// Number of pins per column (8 or 24).
    pub pins: u8,
    /// Horizontal resolution in dots per inch.
    pub horizontal_dpi: u16,
    /// Data bytes per column (pins / 8).
    pub bytes_per_column: u8,
    /// Whether the same pin may fire in two consecutive columns.
    pub adjacent_dots: bool,
}

/// The complete set of graphics modes the engine uses.
pub const GRAPHICS_MODES: [GraphicsMode; 13] = [
    GraphicsMode { mode: 0, pins: 8, horizontal_dpi: 60, bytes_per_column: 1, adjacent_dots: true },
    GraphicsMode { mode: 1, pins: 8, horizontal_dpi: 120, bytes_per_column: 1, adjacent_dots: true },
    GraphicsMode { mode: 2, pins: 8, horizontal_dpi: 120, bytes_per_column: 1, adjacent_dots: false },
    GraphicsMode { mode: 3, pins: 8, horizontal_dpi: 240, bytes_per_column: 1, adjacent_dots: false },
    GraphicsMode { mode: 4, pins: 8, horizontal_dpi: 80, bytes_per_column: 1, adjacent_dots: true },
    GraphicsMode { mode: 5, pins: 8, horizontal_dpi: 72, bytes_per_column: 1, adjacent_dots: true },
    GraphicsMode { mode: 6, pins: 8, horizontal_dpi: 90, bytes_per_column: 1, adjacent_dots: true },
    GraphicsMode { mode: 7, pins: 8, horizontal_dpi: 144, bytes_per_column: 1, adjacent_dots: true },
    GraphicsMode { mode: 32, pins: 24, horizontal_dpi: 60, bytes_per_column: 3, adjacent_dots: true },
    GraphicsMode { mode: 33, pins: 24, horizontal_dpi: 120, bytes_per_column: 3, adjacent_dots: true },
    GraphicsMode { mode: 38, pins: 24, horizontal_dpi: 90, bytes_per_column: 3, adjacent_dots: true },
    GraphicsMode { mode: 39, pins: 24, horizontal_dpi: 180, bytes_per_column: 3, adjacent_dots: true },
    GraphicsMode { mode: 40, pins: 24, horizontal_dpi: 360, bytes_per_column: 3, adjacent_dots: false },
];

/// 24-pin double-density mode, the border renderer's sprite mode.
pub const MODE_24PIN_120DPI: u8 = 33;

/// 24-pin triple-density mode (180 DPI horizontal).
pub const MODE_24PIN_180DPI: u8 = 39;

/// Look up a graphics mode descriptor by its `m` parameter.
pub fn graphics_mode(m: u8) -> Option<&'static GraphicsMode> {
    GRAPHICS_MODES.iter().find(|gm| gm.mode == m)
}

// ============================================================================
// BIT IMAGE (ESC *)
// ============================================================================

/// # Select Bit Image (ESC * m nL nH data)
///
/// Prints one stripe of column-packed graphics at the current print
/// position. A 24-pin stripe is 24 dots tall; printing a taller image means
/// emitting several stripes separated by 24/180-inch line feeds.
///
/// ## Protocol Details
///
/// | Format  | Bytes                |
/// |---------|----------------------|
/// | ASCII   | ESC * m nL nH d1…dk  |
/// | Hex     | 1B 2A m nL nH d1…dk  |
///
/// ## Parameters
///
/// - `mode`: one of the 13 table entries (`m`)
/// - `columns`: number of dot columns, little-endian 16-bit
/// - `data`: exactly `columns × bytes_per_column` bytes
///
/// ## Errors
///
/// - [`EscpError::Graphics`] for an unknown mode
/// - [`EscpError::Range`] when `data.len()` disagrees with `columns`
///
/// ## Example
///
/// ```
/// use aguja::protocol::graphics;
///
/// // Two full 24-pin columns at double density
/// let data = vec![0xFF; 6];
/// let cmd = graphics::bit_image(33, 2, &data).unwrap();
/// assert_eq!(&cmd[..5], &[0x1B, 0x2A, 33, 2, 0]);
/// assert_eq!(cmd.len(), 5 + 6);
/// ```
pub fn bit_image(mode: u8, columns: u16, data: &[u8]) -> Result<Vec<u8>, EscpError> {
    let descriptor = graphics_mode(mode).ok_or(EscpError::Graphics {
        operation: "bit_image",
        reason: format!("unsupported graphics mode {mode}"),
    })?;

    let expected = columns as usize * descriptor.bytes_per_column as usize;
    EscpError::check_range("bit_image.data_len", data.len() as i64, expected as i64, expected as i64)?;

    let [nl, nh] = u16_le(columns);
    let mut cmd = Vec::with_capacity(5 + data.len());
    cmd.push(ESC);
    cmd.push(b'*');
    cmd.push(mode);
    cmd.push(nl);
    cmd.push(nh);
    cmd.extend_from_slice(data);
    Ok(cmd)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_table_complete() {
        assert_eq!(GRAPHICS_MODES.len(), 13);
        // Every mode id appears exactly once.
        let mut ids: Vec<u8> = GRAPHICS_MODES.iter().map(|m| m.mode).collect();
        ids.dedup();
        assert_eq!(ids.len(), 13);
    }

    #[test]
    fn test_mode_table_consistency() {
        for m in &GRAPHICS_MODES {
            assert_eq!(m.bytes_per_column as u16 * 8, m.pins as u16, "mode {}", m.mode);
            let is_24pin = m.mode >= 32;
            assert_eq!(m.pins == 24, is_24pin, "mode {}", m.mode);
        }
    }

    #[test]
    fn test_mode_lookup() {
        let m33 = graphics_mode(33).unwrap();
        assert_eq!(m33.pins, 24);
        assert_eq!(m33.horizontal_dpi, 120);
        assert_eq!(m33.bytes_per_column, 3);
        assert!(m33.adjacent_dots);

        let m40 = graphics_mode(40).unwrap();
        assert_eq!(m40.horizontal_dpi, 360);
        assert!(!m40.adjacent_dots);

        assert!(graphics_mode(34).is_none());
        assert!(graphics_mode(255).is_none());
    }

    #[test]
    fn test_bit_image_header() {
        let data = vec![0xAA; 30]; // 10 columns × 3 bytes
        let cmd = bit_image(39, 10, &data).unwrap();
        assert_eq!(cmd[0], 0x1B);
        assert_eq!(cmd[1], 0x2A);
        assert_eq!(cmd[2], 39);
        assert_eq!(cmd[3], 10); // nL
        assert_eq!(cmd[4], 0); // nH
        assert_eq!(&cmd[5..], &data[..]);
    }

    #[test]
    fn test_bit_image_wide_column_count() {
        // 300 columns = 0x012C
        let data = vec![0x00; 300];
        let cmd = bit_image(0, 300, &data).unwrap();
        assert_eq!(cmd[3], 0x2C);
        assert_eq!(cmd[4], 0x01);
    }

    #[test]
    fn test_bit_image_unknown_mode() {
        let err = bit_image(99, 1, &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, EscpError::Graphics { operation: "bit_image", .. }));
    }

    #[test]
    fn test_bit_image_length_mismatch() {
        // 2 columns in a 24-pin mode need 6 bytes, not 5.
        let err = bit_image(32, 2, &[0xFF; 5]).unwrap_err();
        assert!(matches!(err, EscpError::Range { .. }));
    }

    #[test]
    fn test_bit_image_8pin_length() {
        let cmd = bit_image(1, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(cmd.len(), 5 + 4);
    }
}
