//! # ESC/P2 Barcode Command
//!
//! This module implements the extended barcode command (`ESC ( B`) of
//! ESC/P2. Unlike host-rasterized approaches, the printer renders the
//! barcode itself from symbology parameters and payload data.
//!
//! ## Supported Symbologies
//!
//! | k | Symbology | Payload |
//! |---|-----------|---------|
//! | 0 | EAN-13 | 12 digits (check digit added by printer) |
//! | 1 | EAN-8 | 7 digits |
//! | 2 | Interleaved 2 of 5 | digit pairs |
//! | 3 | UPC-A | 11 digits |
//! | 4 | UPC-E | 6 digits |
//! | 5 | Code 39 | uppercase alphanumerics + `-. $/+%` |
//! | 6 | Code 128 | full ASCII |
//! | 7 | POSTNET | ZIP digits |
//!
//! ## Usage
//!
//! ```
//! use aguja::protocol::barcode::{barcode, BarcodeKind, BarcodeParams};
//!
//! let params = BarcodeParams::new(BarcodeKind::Code39);
//! let cmd = barcode(&params, b"AGUJA-1").unwrap();
//! assert_eq!(&cmd[..3], &[0x1B, 0x28, 0x42]);
//! ```

use super::u16_le;
use crate::error::EscpError;
use crate::protocol::commands::ESC;

/// Barcode symbology (the `k` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeKind {
    Ean13 = 0,
    Ean8 = 1,
    Interleaved2of5 = 2,
    UpcA = 3,
    UpcE = 4,
    Code39 = 5,
    Code128 = 6,
    Postnet = 7,
}

/// Parameters of the `ESC ( B` command, excluding the payload.
///
/// The defaults match the hardware defaults: 2-dot modules, no space
/// adjustment, a 90-dot bar, no human-readable line, no check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeParams {
    /// Symbology.
    pub kind: BarcodeKind,
    /// Module width in dots (2–8).
    pub module_width: u8,
    /// Space-width adjustment in signed dots (-3 to 3), for shuttle
    /// registration on dense symbologies.
    pub space_adjustment: i8,
    /// Bar length in dots, little-endian `v1 v2`.
    pub bar_length: u16,
    /// Control flag bits: bit 0 = append check digit, bit 1 = print
    /// human-readable text, bit 2 = EAN flag character under the bars.
    pub control: u8,
}

impl BarcodeParams {
    /// Parameters with hardware defaults for the given symbology.
    pub fn new(kind: BarcodeKind) -> Self {
        Self {
            kind,
            module_width: 2,
            space_adjustment: 0,
            bar_length: 90,
            control: 0,
        }
    }
}

/// # Print Barcode (ESC ( B nL nH k m s v1 v2 c data)
///
/// ## Protocol Details
///
/// | Format | Bytes                              |
/// |--------|------------------------------------|
/// | Hex    | 1B 28 42 nL nH k m s v1 v2 c d1…dk |
///
/// `nL nH` is the little-endian count of the bytes that follow it:
/// six parameter bytes plus the payload.
///
/// ## Errors
///
/// - [`EscpError::Range`] for a module width outside 2–8, a space
///   adjustment outside ±3, a zero bar length, or an empty/oversized
///   payload
///
/// ## Example
///
/// ```
/// use aguja::protocol::barcode::{barcode, BarcodeKind, BarcodeParams};
///
/// let cmd = barcode(&BarcodeParams::new(BarcodeKind::Ean13), b"490123456789").unwrap();
/// // count = 6 params + 12 payload bytes = 18
/// assert_eq!(&cmd[..5], &[0x1B, 0x28, 0x42, 18, 0]);
/// ```
pub fn barcode(params: &BarcodeParams, data: &[u8]) -> Result<Vec<u8>, EscpError> {
    EscpError::check_range("barcode.module_width", params.module_width as i64, 2, 8)?;
    EscpError::check_range("barcode.space_adjustment", params.space_adjustment as i64, -3, 3)?;
    EscpError::check_range("barcode.bar_length", params.bar_length as i64, 1, u16::MAX as i64)?;
    EscpError::check_range("barcode.data_len", data.len() as i64, 1, (u16::MAX - 6) as i64)?;

    let count = 6 + data.len() as u16;
    let [nl, nh] = u16_le(count);
    let [v1, v2] = u16_le(params.bar_length);

    let mut cmd = Vec::with_capacity(5 + count as usize);
    cmd.push(ESC);
    cmd.push(b'(');
    cmd.push(b'B');
    cmd.push(nl);
    cmd.push(nh);
    cmd.push(params.kind as u8);
    cmd.push(params.module_width);
    cmd.push(params.space_adjustment as u8);
    cmd.push(v1);
    cmd.push(v2);
    cmd.push(params.control);
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
    fn test_barcode_frame() {
        let params = BarcodeParams::new(BarcodeKind::Code128);
        let cmd = barcode(&params, b"TEST").unwrap();

        assert_eq!(&cmd[..3], &[0x1B, 0x28, 0x42]);
        assert_eq!(cmd[3], 10); // 6 + 4 payload
        assert_eq!(cmd[4], 0);
        assert_eq!(cmd[5], 6); // k = Code128
        assert_eq!(cmd[6], 2); // module width
        assert_eq!(cmd[7], 0); // space adjustment
        assert_eq!(cmd[8], 90); // v1
        assert_eq!(cmd[9], 0); // v2
        assert_eq!(cmd[10], 0); // control
        assert_eq!(&cmd[11..], b"TEST");
    }

    #[test]
    fn test_barcode_negative_space_adjustment() {
        let params = BarcodeParams {
            space_adjustment: -2,
            ..BarcodeParams::new(BarcodeKind::Interleaved2of5)
        };
        let cmd = barcode(&params, b"12").unwrap();
        assert_eq!(cmd[7], 0xFE); // two's complement of -2
    }

    #[test]
    fn test_barcode_validation() {
        let mut params = BarcodeParams::new(BarcodeKind::Code39);
        params.module_width = 1;
        assert!(barcode(&params, b"A").is_err());
        params.module_width = 9;
        assert!(barcode(&params, b"A").is_err());

        let mut params = BarcodeParams::new(BarcodeKind::Code39);
        params.space_adjustment = 4;
        assert!(barcode(&params, b"A").is_err());

        let mut params = BarcodeParams::new(BarcodeKind::Code39);
        params.bar_length = 0;
        assert!(barcode(&params, b"A").is_err());

        let params = BarcodeParams::new(BarcodeKind::Code39);
        assert!(barcode(&params, b"").is_err());
    }

    #[test]
    fn test_barcode_long_payload_count() {
        let payload = vec![b'5'; 300];
        let cmd = barcode(&BarcodeParams::new(BarcodeKind::Code128), &payload).unwrap();
        // count = 306 = 0x0132
        assert_eq!(cmd[3], 0x32);
        assert_eq!(cmd[4], 0x01);
    }
}
