//! # Column Packing
//!
//! Packs a binary ink mask into the column-major stripe format of the
//! `ESC *` bit-image command.
//!
//! ## Stripe Layout (24-pin)
//!
//! The image is cut into horizontal stripes of 24 rows; one stripe prints
//! in one head pass. Within a stripe the data is column-major, three bytes
//! per column:
//!
//! ```text
//! Columns:      0        1        2      ...
//!           ┌────────┬────────┬────────┬───
//! byte 0    │ pin 0  │        │        │     bit 7 (MSB) = pin 0
//! (pins 0-7)│  ...   │        │        │     bit 0 (LSB) = pin 7
//!           ├────────┼────────┼────────┼───
//! byte 1    │ pins   │        │        │
//! (8-15)    │        │        │        │
//!           ├────────┼────────┼────────┼───
//! byte 2    │ pins   │        │        │
//! (16-23)   │        │        │        │
//!           └────────┴────────┴────────┴───
//! ```
//!
//! A pin's bit is set iff the ink-mask sample at
//! `(column, stripe_top + pin)` is non-zero. Rows past the bottom of the
//! image pad with blank pins.
//!
//! The 8-pin variant is analogous with one byte per column.
//!
//! ## Performance
//!
//! The inner loop is a per-byte bit-setter over rows the stripe covers;
//! stripes pack independently on the rayon pool since large images are
//! where the cost concentrates.

use rayon::prelude::*;

use super::bitmap::GrayBitmap;

/// Rows per 24-pin stripe.
pub const STRIPE_24: usize = 24;

/// Rows per 8-pin stripe.
pub const STRIPE_8: usize = 8;

/// Pack an ink mask for a 24-pin head.
///
/// Returns one data block per stripe, each `width × 3` bytes, ready to be
/// framed by [`crate::protocol::graphics::bit_image`].
///
/// ## Example
///
/// ```
/// use aguja::render::{bitmap::GrayBitmap, raster};
///
/// // One dot at the top-left corner
/// let mut ink = GrayBitmap::filled(2, 24, 0);
/// ink.set(0, 0, 255);
/// let stripes = raster::pack_24pin(&ink);
///
/// assert_eq!(stripes.len(), 1);
/// assert_eq!(stripes[0][0], 0x80); // pin 0 = MSB of the column's first byte
/// ```
pub fn pack_24pin(ink: &GrayBitmap) -> Vec<Vec<u8>> {
    pack(ink, STRIPE_24)
}

/// Pack an ink mask for an 8-pin head: one byte per column.
pub fn pack_8pin(ink: &GrayBitmap) -> Vec<Vec<u8>> {
    pack(ink, STRIPE_8)
}

fn pack(ink: &GrayBitmap, pins: usize) -> Vec<Vec<u8>> {
    let width = ink.width();
    let height = ink.height();
    let bytes_per_column = pins / 8;
    let stripe_count = height.div_ceil(pins);

    (0..stripe_count)
        .into_par_iter()
        .map(|stripe| {
            let top = stripe * pins;
            let mut block = vec![0u8; width * bytes_per_column];
            for (pin, y) in (top..(top + pins).min(height)).enumerate() {
                let byte_in_column = pin / 8;
                let bit = 7 - (pin % 8);
                let row = ink.row(y);
                for (x, &sample) in row.iter().enumerate() {
                    if sample != 0 {
                        block[x * bytes_per_column + byte_in_column] |= 1 << bit;
                    }
                }
            }
            block
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_24pin_dimensions() {
        let ink = GrayBitmap::filled(10, 48, 255);
        let stripes = pack_24pin(&ink);
        assert_eq!(stripes.len(), 2);
        for stripe in &stripes {
            assert_eq!(stripe.len(), 10 * 3);
            assert!(stripe.iter().all(|&b| b == 0xFF));
        }
    }

    #[test]
    fn test_pack_24pin_partial_last_stripe() {
        // 30 rows: stripe 0 full, stripe 1 has 6 live rows (pins 0-5).
        let ink = GrayBitmap::filled(1, 30, 255);
        let stripes = pack_24pin(&ink);
        assert_eq!(stripes.len(), 2);
        assert_eq!(stripes[0], vec![0xFF, 0xFF, 0xFF]);
        // Pins 0-5 set: 0b1111_1100 in byte 0, rest blank.
        assert_eq!(stripes[1], vec![0xFC, 0x00, 0x00]);
    }

    #[test]
    fn test_pack_24pin_pin_positions() {
        let mut ink = GrayBitmap::filled(1, 24, 0);
        ink.set(0, 0, 255); // pin 0  -> byte 0, bit 7
        ink.set(0, 7, 255); // pin 7  -> byte 0, bit 0
        ink.set(0, 8, 255); // pin 8  -> byte 1, bit 7
        ink.set(0, 23, 255); // pin 23 -> byte 2, bit 0
        let stripes = pack_24pin(&ink);
        assert_eq!(stripes[0], vec![0x81, 0x80, 0x01]);
    }

    #[test]
    fn test_pack_24pin_column_order() {
        // Dot in column 2 only: bytes 6..9 carry it.
        let mut ink = GrayBitmap::filled(3, 24, 0);
        ink.set(2, 12, 255); // byte 1, bit 3
        let stripes = pack_24pin(&ink);
        assert_eq!(&stripes[0][0..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(stripes[0][2 * 3 + 1], 0x08);
    }

    #[test]
    fn test_pack_8pin() {
        let mut ink = GrayBitmap::filled(2, 8, 0);
        ink.set(0, 0, 255);
        ink.set(1, 7, 255);
        let stripes = pack_8pin(&ink);
        assert_eq!(stripes.len(), 1);
        assert_eq!(stripes[0], vec![0x80, 0x01]);
    }

    #[test]
    fn test_pack_8pin_stripe_count() {
        let ink = GrayBitmap::filled(4, 17, 0);
        assert_eq!(pack_8pin(&ink).len(), 3);
    }

    #[test]
    fn test_any_nonzero_sample_is_a_dot() {
        // The packer keys on non-zero, not on 255 specifically.
        let mut ink = GrayBitmap::filled(1, 24, 0);
        ink.set(0, 3, 1);
        let stripes = pack_24pin(&ink);
        assert_eq!(stripes[0][0], 0x10);
    }
}
