/// Depth map preprocessing
/// Gently compresses depth contrast toward mid-gray before synthesis

use image::GrayImage;

const MID_GRAY: f64 = 128.0;

/// Remap every depth sample around the midpoint
///
/// `multiplier = 0.5 * contrast + 0.5`, so a contrast of 1.0 would be neutral
/// and the supported 0.01..=0.05 range always pulls samples toward 128.
/// Results are clamped to 0..=255 and truncated.
pub fn adjust_contrast(depth: &GrayImage, contrast: f64) -> GrayImage {
    let multiplier = 0.5 * contrast + 0.5;
    let mut adjusted = depth.clone();

    for sample in adjusted.iter_mut() {
        let v = (*sample as f64 - MID_GRAY) * multiplier + MID_GRAY;
        *sample = v.clamp(0.0, 255.0) as u8;
    }

    adjusted
}
