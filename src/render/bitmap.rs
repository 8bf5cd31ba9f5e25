//! # Grayscale Bitmap
//!
//! The input type of the raster pipeline: a row-major buffer of 8-bit
//! luminance samples (0 = black, 255 = white).
//!
//! After dithering the same container holds a binary ink mask where every
//! sample is 0 (leave blank) or 255 (print a dot); the packing stage treats
//! any non-zero sample as a dot.

use crate::error::EscpError;

/// A row-major grayscale image.
///
/// Luminance convention: 0 = black, 255 = white. Binary (dithered) images
/// reuse the container with samples restricted to {0, 255} where 255 means
/// "print a dot".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayBitmap {
    /// Wrap an existing row-major buffer.
    ///
    /// ## Errors
    ///
    /// [`EscpError::Graphics`] when either dimension is zero or the buffer
    /// length is not `width × height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, EscpError> {
        if width == 0 || height == 0 {
            return Err(EscpError::Graphics {
                operation: "bitmap",
                reason: format!("dimensions must be positive, got {width}x{height}"),
            });
        }
        if data.len() != width * height {
            return Err(EscpError::Graphics {
                operation: "bitmap",
                reason: format!(
                    "buffer length {} does not match {width}x{height}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A bitmap with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The row-major sample buffer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sample at (x, y). Panics on out-of-range coordinates in debug
    /// builds, like slice indexing.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// One row of samples.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

impl From<image::GrayImage> for GrayBitmap {
    /// Adopt a `image::GrayImage` buffer without copying per pixel.
    fn from(img: image::GrayImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
