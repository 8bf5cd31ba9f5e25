//! # Bitmap Scaling
//!
//! Nearest-neighbor and bilinear resizing of grayscale bitmaps, used to fit
//! image nodes to their layout boxes before dithering.
//!
//! Scaling always runs on the continuous-tone source; dithering a scaled
//! binary mask would destroy the halftone pattern.

use rayon::prelude::*;

use super::bitmap::GrayBitmap;
use crate::error::EscpError;

/// Scaling algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMethod {
    /// Source pixel at the floor of the integer ratio. Fast, blocky.
    #[default]
    Nearest,
    /// Four-tap bilinear interpolation. Smooth, slightly soft.
    Bilinear,
}

/// Resize `src` to `width × height`.
///
/// ## Errors
///
/// [`EscpError::Graphics`] when either target dimension is zero.
///
/// ## Example
///
/// ```
/// use aguja::render::{bitmap::GrayBitmap, scale};
///
/// let src = GrayBitmap::new(2, 1, vec![0, 255]).unwrap();
/// let out = scale::resize(&src, 4, 1, scale::ScaleMethod::Nearest).unwrap();
/// assert_eq!(out.data(), &[0, 0, 255, 255]);
/// ```
pub fn resize(
    src: &GrayBitmap,
    width: usize,
    height: usize,
    method: ScaleMethod,
) -> Result<GrayBitmap, EscpError> {
    if width == 0 || height == 0 {
        return Err(EscpError::Graphics {
            operation: "resize",
            reason: format!("target dimensions must be positive, got {width}x{height}"),
        });
    }
    if width == src.width() && height == src.height() {
        return Ok(src.clone());
    }
    let out = match method {
        ScaleMethod::Nearest => nearest(src, width, height),
        ScaleMethod::Bilinear => bilinear(src, width, height),
    };
    Ok(out)
}

/// Nearest-neighbor: each target pixel takes the source pixel at the
/// floored integer ratio.
fn nearest(src: &GrayBitmap, width: usize, height: usize) -> GrayBitmap {
    let (sw, sh) = (src.width(), src.height());
    let data: Vec<u8> = (0..height)
        .into_par_iter()
        .flat_map_iter(|y| {
            let sy = (y * sh / height).min(sh - 1);
            (0..width).map(move |x| {
                let sx = (x * sw / width).min(sw - 1);
                src.get(sx, sy)
            })
        })
        .collect();
    GrayBitmap::new(width, height, data).expect("dimensions validated by caller")
}

/// Bilinear: each target pixel blends the four surrounding source pixels
/// weighted by fractional distance. Sample positions use the pixel-center
/// convention so edges are not over-weighted.
fn bilinear(src: &GrayBitmap, width: usize, height: usize) -> GrayBitmap {
    let (sw, sh) = (src.width(), src.height());
    let x_ratio = sw as f32 / width as f32;
    let y_ratio = sh as f32 / height as f32;

    let data: Vec<u8> = (0..height)
        .into_par_iter()
        .flat_map_iter(|y| {
            let fy = ((y as f32 + 0.5) * y_ratio - 0.5).max(0.0);
            let y0 = (fy as usize).min(sh - 1);
            let y1 = (y0 + 1).min(sh - 1);
            let wy = fy - y0 as f32;

            (0..width).map(move |x| {
                let fx = ((x as f32 + 0.5) * x_ratio - 0.5).max(0.0);
                let x0 = (fx as usize).min(sw - 1);
                let x1 = (x0 + 1).min(sw - 1);
                let wx = fx - x0 as f32;

                let top = src.get(x0, y0) as f32 * (1.0 - wx) + src.get(x1, y0) as f32 * wx;
                let bottom = src.get(x0, y1) as f32 * (1.0 - wx) + src.get(x1, y1) as f32 * wx;
                (top * (1.0 - wy) + bottom * wy).round() as u8
            })
        })
        .collect();
    GrayBitmap::new(width, height, data).expect("dimensions validated by caller")
}

// ============================================================================
// TESTS
// ============================================================================
