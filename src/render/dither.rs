//! # Grayscale → Binary Conversion
//!
//! This module converts continuous-tone (grayscale) images to binary
//! (dot/no-dot) output suitable for an impact pin head.
//!
//! ## What is Dithering?
//!
//! Dithering simulates grayscale on a device that can only fire or not fire
//! a pin. By varying the density of dots we create the illusion of
//! different gray levels.
//!
//! ```text
//! Grayscale:    White    Light    Medium    Dark    Black
//!               ░░░░░░   ░░▒░░░   ░▒░▒░▒   ▒▓▒▓▒▓   ██████
//! ```
//!
//! ## Conventions
//!
//! - **Input**: luminance samples, 0 = black, 255 = white
//! - **Output**: an ink mask in the same container, 255 = print a dot,
//!   0 = leave blank; every sample is one of exactly {0, 255}
//! - **Pixel order**: row-major, left-to-right, top-to-bottom (no
//!   serpentine traversal in the error-diffusion variants)
//!
//! ## Algorithms
//!
//! | Method | Speed | Quality | Artifacts |
//! |--------|-------|---------|-----------|
//! | Threshold | Fastest | Poor | Banding |
//! | Bayer 4×4 | Fast | Good | Regular pattern |
//! | Floyd–Steinberg | Slower | Better | Worms |
//! | Atkinson | Slower | Crisp highlights | Blown extremes |
//!
//! The ordered variants are embarrassingly parallel and run per-row on the
//! rayon pool; error diffusion is inherently sequential.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bitmap::GrayBitmap;

/// Threshold used by every method's black/white decision point.
pub const MID_LEVEL: u8 = 128;

/// Dithering algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMethod {
    /// Fixed threshold at [`MID_LEVEL`].
    Threshold,
    /// Bayer 4×4 ordered dithering.
    #[default]
    Bayer,
    /// Floyd–Steinberg error diffusion.
    FloydSteinberg,
    /// Atkinson error diffusion (error × 6/8 distributed).
    Atkinson,
}

/// Bayer 4×4 dithering matrix.
///
/// Values 0–15, each appearing once; a pixel prints when its luminance is
/// below `M/16 × 255`. Tiles every 4 pixels on both axes.
pub const BAYER4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Dither a grayscale bitmap to a binary ink mask.
///
/// ## Example
///
/// ```
/// use aguja::render::{bitmap::GrayBitmap, dither};
///
/// let gradient = GrayBitmap::new(4, 1, vec![0, 85, 170, 255]).unwrap();
/// let ink = dither::dither(&gradient, dither::DitherMethod::FloydSteinberg);
/// assert_eq!(ink.data(), &[255, 255, 0, 0]);
/// ```
pub fn dither(src: &GrayBitmap, method: DitherMethod) -> GrayBitmap {
    match method {
        DitherMethod::Threshold => threshold(src, MID_LEVEL),
        DitherMethod::Bayer => bayer(src),
        DitherMethod::FloydSteinberg => floyd_steinberg(src),
        DitherMethod::Atkinson => atkinson(src),
    }
}

// ============================================================================
// ORDERED METHODS
// ============================================================================

/// Fixed-threshold conversion: luminance below `level` prints.
pub fn threshold(src: &GrayBitmap, level: u8) -> GrayBitmap {
    let data: Vec<u8> = src
        .data()
        .par_chunks(src.width())
        .flat_map_iter(|row| row.iter().map(move |&px| if px < level { 255 } else { 0 }))
        .collect();
    GrayBitmap::new(src.width(), src.height(), data).expect("same dimensions as source")
}

/// Bayer 4×4 ordered dithering.
///
/// A pixel at (x, y) prints when `px × 16 < M[y%4][x%4] × 255`, the
/// integer form of `px < (M/16)·255`.
pub fn bayer(src: &GrayBitmap) -> GrayBitmap {
    let width = src.width();
    let data: Vec<u8> = src
        .data()
        .par_chunks(width)
        .enumerate()
        .flat_map_iter(|(y, row)| {
            row.iter().enumerate().map(move |(x, &px)| {
                let m = BAYER4[y & 3][x & 3] as u32;
                if (px as u32) * 16 < m * 255 { 255 } else { 0 }
            })
        })
        .collect();
    GrayBitmap::new(width, src.height(), data).expect("same dimensions as source")
}

// ============================================================================
// ERROR DIFFUSION
// ============================================================================

/// Quantize one sample against [`MID_LEVEL`]; returns (ink, quantized
/// luminance). Black ink corresponds to quantized luminance 0.
#[inline]
fn quantize(luminance: i32) -> (u8, i32) {
    if luminance < MID_LEVEL as i32 {
        (255, 0)
    } else {
        (0, 255)
    }
}

/// Floyd–Steinberg error diffusion.
///
/// The quantization error of each pixel is distributed to its unvisited
/// neighbors:
///
/// ```text
///             *    7/16
///   3/16   5/16    1/16
/// ```
pub fn floyd_steinberg(src: &GrayBitmap) -> GrayBitmap {
    let (w, h) = (src.width(), src.height());
    let mut buf: Vec<i32> = src.data().iter().map(|&px| px as i32).collect();
    let mut out = vec![0u8; w * h];

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let (ink, quantized) = quantize(buf[idx]);
            let err = buf[idx] - quantized;
            out[idx] = ink;

            if x + 1 < w {
                buf[idx + 1] += err * 7 / 16;
            }
            if y + 1 < h {
                if x > 0 {
                    buf[idx + w - 1] += err * 3 / 16;
                }
                buf[idx + w] += err * 5 / 16;
                if x + 1 < w {
                    buf[idx + w + 1] += err / 16;
                }
            }
        }
    }

    GrayBitmap::new(w, h, out).expect("same dimensions as source")
}

/// Atkinson error diffusion.
///
/// One eighth of the error goes to each of six neighbors (the remaining
/// quarter is dropped, which lightens shadows and blows out highlights —
/// the classic Macintosh look):
///
/// ```text
///             *    1/8   1/8
///   1/8    1/8     1/8
///          1/8
/// ```
pub fn atkinson(src: &GrayBitmap) -> GrayBitmap {
    let (w, h) = (src.width(), src.height());
    let mut buf: Vec<i32> = src.data().iter().map(|&px| px as i32).collect();
    let mut out = vec![0u8; w * h];

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let (ink, quantized) = quantize(buf[idx]);
            let err = buf[idx] - quantized;
            out[idx] = ink;

            let eighth = err / 8;
            if x + 1 < w {
                buf[idx + 1] += eighth;
            }
            if x + 2 < w {
                buf[idx + 2] += eighth;
            }
            if y + 1 < h {
                if x > 0 {
                    buf[idx + w - 1] += eighth;
                }
                buf[idx + w] += eighth;
                if x + 1 < w {
                    buf[idx + w + 1] += eighth;
                }
            }
            if y + 2 < h {
                buf[idx + 2 * w] += eighth;
            }
        }
    }

    GrayBitmap::new(w, h, out).expect("same dimensions as source")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(w: usize, h: usize, v: u8) -> GrayBitmap {
        GrayBitmap::filled(w, h, v)
    }

    #[test]
    fn test_bayer_matrix_values() {
        // Matrix contains all values 0-15 exactly once.
        let mut seen = [false; 16];
        for row in &BAYER4 {
            for &val in row {
                assert!(val < 16, "matrix value {} out of range", val);
                assert!(!seen[val as usize], "duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_output_is_binary() {
        let src = GrayBitmap::new(4, 4, (0u8..16).map(|v| v * 16).collect()).unwrap();
        for method in [
            DitherMethod::Threshold,
            DitherMethod::Bayer,
            DitherMethod::FloydSteinberg,
            DitherMethod::Atkinson,
        ] {
            let out = dither(&src, method);
            assert!(
                out.data().iter().all(|&v| v == 0 || v == 255),
                "{method:?} produced non-binary output"
            );
        }
    }

    #[test]
    fn test_threshold_split() {
        let src = GrayBitmap::new(4, 1, vec![0, 127, 128, 255]).unwrap();
        let out = threshold(&src, 128);
        assert_eq!(out.data(), &[255, 255, 0, 0]);
    }

    #[test]
    fn test_black_input_always_prints() {
        for method in [DitherMethod::Bayer, DitherMethod::FloydSteinberg] {
            let out = dither(&uniform(8, 8, 0), method);
            assert!(out.data().iter().all(|&v| v == 255), "{method:?}");
        }
    }

    #[test]
    fn test_white_input_never_prints() {
        for method in [
            DitherMethod::Threshold,
            DitherMethod::Bayer,
            DitherMethod::FloydSteinberg,
            DitherMethod::Atkinson,
        ] {
            let out = dither(&uniform(8, 8, 255), method);
            assert!(out.data().iter().all(|&v| v == 0), "{method:?}");
        }
    }

    #[test]
    fn test_floyd_steinberg_gradient_row() {
        // Single row: 0 and 85 quantize dark, their error never makes the
        // later pixels cross below the midpoint.
        let src = GrayBitmap::new(4, 1, vec![0, 85, 170, 255]).unwrap();
        let out = floyd_steinberg(&src);
        assert_eq!(out.data(), &[255, 255, 0, 0]);
    }

    #[test]
    fn test_floyd_steinberg_diffuses_down() {
        // A mid-gray 2x2 block: the first pixel's error influences the
        // second row, so not all rows quantize identically.
        let src = uniform(2, 2, 128);
        let out = floyd_steinberg(&src);
        // 128 quantizes white (error -127): neighbors darken and print.
        assert_eq!(out.get(0, 0), 0);
        assert_eq!(out.get(1, 0), 255);
        assert_eq!(out.get(0, 1), 255);
    }

    #[test]
    fn test_bayer_uniform_mid_gray_pattern() {
        // 8x8 of 128: the pattern is the Bayer matrix tiled; a cell prints
        // exactly when 128·16 < M·255, i.e. M ≥ 9.
        let out = bayer(&uniform(8, 8, 128));
        for y in 0..8 {
            for x in 0..8 {
                let m = BAYER4[y & 3][x & 3] as u32;
                let expected = if 128 * 16 < m * 255 { 255 } else { 0 };
                assert_eq!(out.get(x, y), expected, "at ({x},{y})");
            }
        }
        // Tiling: each 4x4 quadrant is identical.
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.get(x, y), out.get(x + 4, y));
                assert_eq!(out.get(x, y), out.get(x, y + 4));
                assert_eq!(out.get(x, y), out.get(x + 4, y + 4));
            }
        }
    }

    #[test]
    fn test_bayer_mid_gray_density() {
        // M ≥ 9 holds for 7 of 16 matrix cells.
        let out = bayer(&uniform(4, 4, 128));
        let printed = out.data().iter().filter(|&&v| v == 255).count();
        assert_eq!(printed, 7);
    }

    #[test]
    fn test_atkinson_drops_quarter_of_error() {
        // A lone dark pixel in a white field: Atkinson's dropped error
        // means the surrounding white stays white.
        let mut src = uniform(5, 5, 255);
        src.set(2, 2, 0);
        let out = atkinson(&src);
        assert_eq!(out.get(2, 2), 255);
        let printed = out.data().iter().filter(|&&v| v == 255).count();
        assert_eq!(printed, 1);
    }

    #[test]
    fn test_determinism() {
        let src = GrayBitmap::new(16, 16, (0..256).map(|v| v as u8).collect()).unwrap();
        for method in [DitherMethod::Bayer, DitherMethod::Atkinson] {
            assert_eq!(dither(&src, method), dither(&src, method));
        }
    }

    #[test]
    fn test_method_serde_names() {
        let m: DitherMethod = serde_json::from_str("\"floyd-steinberg\"").unwrap();
        assert_eq!(m, DitherMethod::FloydSteinberg);
        let m: DitherMethod = serde_json::from_str("\"bayer\"").unwrap();
        assert_eq!(m, DitherMethod::Bayer);
    }
}
