/// Stereogram generation parameters
/// Every value is supplied by the caller; out-of-range values are rejected, never clamped

use crate::error::{Result, StereoError};
use std::ops::RangeInclusive;

pub const SHIFT_STRENGTH_RANGE: RangeInclusive<u32> = 5..=50;
pub const PATTERN_SCALE_RANGE: RangeInclusive<f64> = 0.5..=2.0;
pub const DEPTH_CONTRAST_RANGE: RangeInclusive<f64> = 0.01..=0.05;

pub const DEFAULT_SHIFT_STRENGTH: u32 = 15;
pub const DEFAULT_PATTERN_SCALE: f64 = 1.0;
pub const DEFAULT_DEPTH_CONTRAST: f64 = 0.03;

/// Parameters consumed by the generation pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereogramParams {
    /// Maximum horizontal back-reference in pixels
    pub shift_strength: u32,
    /// Resampling factor applied to the pattern before tiling
    pub pattern_scale: f64,
    /// Blend factor for the depth contrast remap
    pub depth_contrast: f64,
}

impl StereogramParams {
    pub fn new(shift_strength: u32, pattern_scale: f64, depth_contrast: f64) -> Self {
        Self {
            shift_strength,
            pattern_scale,
            depth_contrast,
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !SHIFT_STRENGTH_RANGE.contains(&self.shift_strength) {
            return Err(StereoError::InvalidParameter(format!(
                "shift strength {} outside {}..={}",
                self.shift_strength,
                SHIFT_STRENGTH_RANGE.start(),
                SHIFT_STRENGTH_RANGE.end()
            )));
        }
        // NaN fails `contains`, so it is rejected here as well
        if !PATTERN_SCALE_RANGE.contains(&self.pattern_scale) {
            return Err(StereoError::InvalidParameter(format!(
                "pattern scale {} outside {}..={}",
                self.pattern_scale,
                PATTERN_SCALE_RANGE.start(),
                PATTERN_SCALE_RANGE.end()
            )));
        }
        if !DEPTH_CONTRAST_RANGE.contains(&self.depth_contrast) {
            return Err(StereoError::InvalidParameter(format!(
                "depth contrast {} outside {}..={}",
                self.depth_contrast,
                DEPTH_CONTRAST_RANGE.start(),
                DEPTH_CONTRAST_RANGE.end()
            )));
        }
        Ok(())
    }
}

impl Default for StereogramParams {
    fn default() -> Self {
        Self::new(
            DEFAULT_SHIFT_STRENGTH,
            DEFAULT_PATTERN_SCALE,
            DEFAULT_DEPTH_CONTRAST,
        )
    }
}
