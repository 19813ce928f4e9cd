/// Pattern tiling
/// Resamples the color pattern and repeats it across the output canvas

use crate::config::PATTERN_SCALE_RANGE;
use crate::error::{Result, StereoError};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

/// Scale the pattern with a Lanczos filter and tile it over a `width`x`height` canvas
///
/// Tiles are placed at integer multiples of the scaled size, left-to-right and
/// top-to-bottom; partial tiles at the right and bottom edges are clipped.
/// A tile larger than the canvas is simply clipped to it. `scale` must lie in
/// 0.5..=2.0; a tiny pattern that still rounds down to nothing is `EmptyPattern`.
pub fn tile_pattern(pattern: &RgbImage, scale: f64, width: u32, height: u32) -> Result<RgbImage> {
    // NaN fails `contains` too
    if !PATTERN_SCALE_RANGE.contains(&scale) {
        return Err(StereoError::InvalidParameter(format!(
            "pattern scale {} outside {}..={}",
            scale,
            PATTERN_SCALE_RANGE.start(),
            PATTERN_SCALE_RANGE.end()
        )));
    }
    let tile_width = (pattern.width() as f64 * scale) as u32;
    let tile_height = (pattern.height() as f64 * scale) as u32;
    if tile_width == 0 || tile_height == 0 {
        return Err(StereoError::EmptyPattern {
            width: tile_width,
            height: tile_height,
        });
    }

    let tile = if (tile_width, tile_height) == pattern.dimensions() {
        pattern.clone()
    } else {
        imageops::resize(pattern, tile_width, tile_height, FilterType::Lanczos3)
    };
    debug!(tile_width, tile_height, width, height, "tiling pattern");

    Ok(RgbImage::from_fn(width, height, |x, y| {
        *tile.get_pixel(x % tile_width, y % tile_height)
    }))
}
