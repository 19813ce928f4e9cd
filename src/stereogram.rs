/// Autostereogram synthesis
/// Builds each output row by copying earlier pixels of the same row at a
/// depth-dependent horizontal offset

use crate::config::StereogramParams;
use crate::depth::adjust_contrast;
use crate::error::{Result, StereoError};
use crate::pattern::tile_pattern;
use image::{GrayImage, RgbImage};
use rayon::prelude::*;
use tracing::{debug, info};

const CHANNELS: usize = 3;

/// Synthesize the stereogram from a preprocessed depth map and a tiled pattern
///
/// Both buffers must share the same dimensions. For each row the first
/// `shift_strength` columns come straight from the pattern; every later column
/// `x` copies the output at `x - shift`, where `shift = floor(depth / 255 * shift_strength)`,
/// or falls back to the pattern when that position lies inside the seeded columns.
///
/// Rows are independent and are rendered in parallel; the result is identical to
/// a sequential pass.
pub fn synthesize(depth: &GrayImage, pattern: &RgbImage, shift_strength: u32) -> Result<RgbImage> {
    if depth.dimensions() != pattern.dimensions() {
        let (depth_width, depth_height) = depth.dimensions();
        let (pattern_width, pattern_height) = pattern.dimensions();
        return Err(StereoError::DimensionMismatch {
            depth_width,
            depth_height,
            pattern_width,
            pattern_height,
        });
    }
    if shift_strength == 0 {
        return Err(StereoError::InvalidParameter(
            "shift strength must be at least 1".to_string(),
        ));
    }

    let (width, height) = depth.dimensions();
    let mut output = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return Ok(output);
    }

    let width = width as usize;
    let row_len = width * CHANNELS;
    let depth_raw = depth.as_raw();
    let pattern_raw = pattern.as_raw();

    output
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let depth_row = &depth_raw[y * width..(y + 1) * width];
            let pattern_row = &pattern_raw[y * row_len..(y + 1) * row_len];
            render_row(row, depth_row, pattern_row, shift_strength as usize);
        });

    Ok(output)
}

/// Render a single row in place. Columns depend on earlier columns of the
/// same row, so this loop must stay sequential.
fn render_row(row: &mut [u8], depth_row: &[u8], pattern_row: &[u8], shift_strength: usize) {
    let width = depth_row.len();
    let seeded = shift_strength.min(width);
    row[..seeded * CHANNELS].copy_from_slice(&pattern_row[..seeded * CHANNELS]);

    for x in seeded..width {
        let shift = column_shift(depth_row[x], shift_strength);
        let dst = x * CHANNELS;

        // shift 0 would reference the pixel being written; the pattern is used instead
        if shift == 0 || x - shift < shift_strength {
            row[dst..dst + CHANNELS].copy_from_slice(&pattern_row[dst..dst + CHANNELS]);
        } else {
            let src = (x - shift) * CHANNELS;
            row.copy_within(src..src + CHANNELS, dst);
        }
    }
}

/// `floor(depth / 255 * shift_strength)`, never rounded
#[inline]
fn column_shift(depth: u8, shift_strength: usize) -> usize {
    let d = depth as f64 / 255.0;
    (d * shift_strength as f64).floor() as usize
}

/// Full generation pipeline: depth contrast remap, pattern tiling, synthesis
#[derive(Debug, Clone)]
pub struct Stereogram {
    params: StereogramParams,
}

impl Stereogram {
    /// Create a pipeline after validating the parameters
    pub fn new(params: StereogramParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &StereogramParams {
        &self.params
    }

    /// Render a stereogram. The canvas takes the depth map's dimensions.
    pub fn render(&self, depth: &GrayImage, pattern: &RgbImage) -> Result<RgbImage> {
        let (width, height) = depth.dimensions();
        debug!(
            width,
            height,
            shift_strength = self.params.shift_strength,
            pattern_scale = self.params.pattern_scale,
            depth_contrast = self.params.depth_contrast,
            "rendering stereogram"
        );

        let adjusted = adjust_contrast(depth, self.params.depth_contrast);
        let tiled = tile_pattern(pattern, self.params.pattern_scale, width, height)?;
        let output = synthesize(&adjusted, &tiled, self.params.shift_strength)?;

        info!(width, height, "stereogram rendered");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn stripes(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8 | 1, (y * 13 % 256) as u8 | 1, ((x + y) % 251) as u8 | 1])
        })
    }

    /// Sequential reference of the row algorithm
    fn reference(depth: &GrayImage, pattern: &RgbImage, s: u32) -> RgbImage {
        let (width, height) = depth.dimensions();
        let mut out = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let p = if x < s {
                    *pattern.get_pixel(x, y)
                } else {
                    let d = depth.get_pixel(x, y)[0] as f64 / 255.0;
                    let shift = (d * s as f64).floor() as u32;
                    if shift == 0 || x - shift < s {
                        *pattern.get_pixel(x, y)
                    } else {
                        *out.get_pixel(x - shift, y)
                    }
                };
                out.put_pixel(x, y, p);
            }
        }
        out
    }

    #[test]
    fn test_seed_columns_match_pattern() {
        let depth = GrayImage::from_fn(40, 6, |x, _| Luma([(x * 6) as u8]));
        let pattern = stripes(40, 6);
        let out = synthesize(&depth, &pattern, 8).unwrap();

        for y in 0..6 {
            for x in 0..8 {
                assert_eq!(out.get_pixel(x, y), pattern.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_matches_sequential_reference() {
        let depth = GrayImage::from_fn(64, 16, |x, y| Luma([((x * 5 + y * 11) % 256) as u8]));
        let pattern = stripes(64, 16);

        for s in [1, 5, 12, 50] {
            let out = synthesize(&depth, &pattern, s).unwrap();
            assert_eq!(out, reference(&depth, &pattern, s), "shift strength {}", s);
        }
    }

    #[test]
    fn test_near_depth_repeats_at_shift_interval() {
        // full depth: shift == shift_strength. Columns 5..10 would reference the
        // seeded region and come from the pattern; from 10 on the row repeats with period 5
        let depth = GrayImage::from_pixel(30, 2, Luma([255]));
        let pattern = stripes(30, 2);
        let out = synthesize(&depth, &pattern, 5).unwrap();

        for y in 0..2 {
            for x in 5..10 {
                assert_eq!(out.get_pixel(x, y), pattern.get_pixel(x, y));
            }
            for x in 10..30 {
                assert_eq!(out.get_pixel(x, y), out.get_pixel(x - 5, y));
            }
        }
    }

    #[test]
    fn test_shift_is_floored() {
        // 127 / 255 * 10 = 4.98 -> 4
        assert_eq!(column_shift(127, 10), 4);
        assert_eq!(column_shift(255, 10), 10);
        assert_eq!(column_shift(0, 10), 0);
        assert_eq!(column_shift(26, 10), 1);
    }

    #[test]
    fn test_no_holes_with_zero_depth() {
        let depth = GrayImage::new(20, 3);
        let pattern = stripes(20, 3);
        let out = synthesize(&depth, &pattern, 5).unwrap();
        assert_eq!(out, pattern);
    }

    #[test]
    fn test_shift_wider_than_image() {
        let depth = GrayImage::from_pixel(4, 2, Luma([200]));
        let pattern = stripes(4, 2);
        let out = synthesize(&depth, &pattern, 10).unwrap();
        assert_eq!(out, pattern);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let depth = GrayImage::new(10, 10);
        let pattern = stripes(10, 9);
        let err = synthesize(&depth, &pattern, 5).unwrap_err();
        assert!(matches!(err, StereoError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_zero_shift_strength_rejected() {
        let depth = GrayImage::new(10, 10);
        let pattern = stripes(10, 10);
        assert!(matches!(
            synthesize(&depth, &pattern, 0),
            Err(StereoError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let depth = GrayImage::from_fn(48, 32, |x, y| Luma([((x * y) % 256) as u8]));
        let pattern = stripes(7, 5);
        let engine = Stereogram::new(StereogramParams::new(9, 1.0, 0.05)).unwrap();

        let first = engine.render(&depth, &pattern).unwrap();
        let second = engine.render(&depth, &pattern).unwrap();

        assert_eq!(first.dimensions(), (48, 32));
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_invalid_params_rejected_before_render() {
        let err = Stereogram::new(StereogramParams::new(3, 1.0, 0.03)).unwrap_err();
        assert!(matches!(err, StereoError::InvalidParameter(_)));
    }
}
