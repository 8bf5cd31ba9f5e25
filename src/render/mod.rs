//! # Raster Pipeline
//!
//! This module converts grayscale images into the packed column format of
//! the `ESC *` bit-image command.
//!
//! ## Modules
//!
//! - [`bitmap`]: grayscale image container
//! - [`dither`]: grayscale → binary conversion (threshold, Bayer,
//!   Floyd–Steinberg, Atkinson)
//! - [`scale`]: nearest-neighbor and bilinear resizing
//! - [`raster`]: 24-pin and 8-pin column packing
//!
//! ## Usage Example
//!
//! ```
//! use aguja::render::{bitmap::GrayBitmap, dither, raster};
//!
//! // A 48×48 mid-gray square
//! let gray = GrayBitmap::filled(48, 48, 128);
//!
//! // Dither to a binary ink mask, then pack for a 24-pin head
//! let ink = dither::dither(&gray, dither::DitherMethod::Bayer);
//! let stripes = raster::pack_24pin(&ink);
//!
//! assert_eq!(stripes.len(), 2);            // 48 rows = 2 stripes of 24
//! assert_eq!(stripes[0].len(), 48 * 3);    // 3 bytes per column
//! ```

pub mod bitmap;
pub mod dither;
pub mod raster;
pub mod scale;
