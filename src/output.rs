/// Writing rendered images to disk
/// The hidden payload only survives lossless encoders

use crate::error::{Result, StereoError};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::debug;

pub const JPEG_QUALITY_RANGE: RangeInclusive<f64> = 0.3..=1.0;
pub const DEFAULT_JPEG_QUALITY: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Bmp,
    Tiff,
    /// Quality in 1..=100
    Jpeg(u8),
}

impl OutputFormat {
    /// Pick the encoder from the file extension. `jpeg_quality` is a fraction
    /// in 0.3..=1.0 and only applies to `.jpg`/`.jpeg`.
    pub fn from_path(path: &Path, jpeg_quality: f64) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .ok_or_else(|| {
                StereoError::InvalidParameter(format!(
                    "output file {} must have an extension (e.g. .png)",
                    path.display()
                ))
            })?;

        match ext.as_str() {
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "tif" | "tiff" => Ok(Self::Tiff),
            "jpg" | "jpeg" => Ok(Self::Jpeg(jpeg_quality_percent(jpeg_quality)?)),
            other => Err(StereoError::InvalidParameter(format!(
                "unsupported output format '.{}' (use png, bmp, tiff or jpeg)",
                other
            ))),
        }
    }

    /// Like [`OutputFormat::from_path`], but refuses a lossy format when the
    /// image will carry a hidden message
    pub fn for_output(path: &Path, jpeg_quality: f64, embeds_message: bool) -> Result<Self> {
        let format = Self::from_path(path, jpeg_quality)?;
        if embeds_message && !format.is_lossless() {
            return Err(StereoError::InvalidParameter(
                "JPEG is lossy and would destroy the hidden message; \
                 use .png (recommended), .bmp or .tiff"
                    .to_string(),
            ));
        }
        Ok(format)
    }

    pub fn is_lossless(&self) -> bool {
        !matches!(self, Self::Jpeg(_))
    }
}

/// Message to embed after trimming surrounding whitespace, or `None` when
/// nothing is left
pub fn message_to_embed(message: Option<&str>) -> Option<String> {
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Map a 0.3..=1.0 quality fraction to an encoder quality percentage
pub fn jpeg_quality_percent(quality: f64) -> Result<u8> {
    if !JPEG_QUALITY_RANGE.contains(&quality) {
        return Err(StereoError::InvalidParameter(format!(
            "JPEG quality {} outside {}..={}",
            quality,
            JPEG_QUALITY_RANGE.start(),
            JPEG_QUALITY_RANGE.end()
        )));
    }
    Ok((quality * 100.0) as u8)
}

/// Encode and write `image` to `path`
pub fn save(image: &RgbImage, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    debug!(?format, path = %path.display(), "saving image");
    match format {
        OutputFormat::Jpeg(quality) => {
            let writer = BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(writer, quality);
            encoder.encode_image(image)?;
        }
        OutputFormat::Png => image.save_with_format(path, ImageFormat::Png)?,
        OutputFormat::Bmp => image.save_with_format(path, ImageFormat::Bmp)?,
        OutputFormat::Tiff => image.save_with_format(path, ImageFormat::Tiff)?,
    }
    Ok(())
}
