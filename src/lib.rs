//! # autostereo
//!
//! Single-image autostereograms from a grayscale depth map and a tileable color
//! pattern, with optional LSB embedding of a hidden text message.
//!
//! ## Quick Start
//!
//! ```no_run
//! use autostereo::{steganography, Stereogram, StereogramParams};
//! use image::ImageReader;
//!
//! # fn main() -> anyhow::Result<()> {
//! let depth = ImageReader::open("depth.png")?.decode()?.to_luma8();
//! let pattern = ImageReader::open("pattern.png")?.decode()?.to_rgb8();
//!
//! let engine = Stereogram::new(StereogramParams::default())?;
//! let rendered = engine.render(&depth, &pattern)?;
//!
//! // Hide a message; only lossless formats keep it intact
//! let stego = steganography::encode(&rendered, "look closer")?;
//! stego.save("stereogram.png")?;
//!
//! assert_eq!(steganography::decode(&stego)?, "look closer");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `depth`: contrast remap of the depth map
//! - `pattern`: pattern resampling and tiling
//! - `stereogram`: row-wise synthesis and the full pipeline
//! - `steganography`: length-prefixed LSB codec
//! - `output`: output format selection and saving

pub mod config;
pub mod depth;
pub mod error;
pub mod output;
pub mod pattern;
pub mod steganography;
pub mod stereogram;

pub use config::StereogramParams;
pub use error::{Result, StereoError};
pub use output::OutputFormat;
pub use stereogram::{synthesize, Stereogram};

use image::{DynamicImage, RgbImage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render a stereogram from decoded images of any color type
///
/// The depth image is converted to grayscale and the pattern to RGB first.
///
/// # Examples
///
/// ```no_run
/// use autostereo::StereogramParams;
/// # fn main() -> anyhow::Result<()> {
/// let depth = image::open("depth.png")?;
/// let pattern = image::open("pattern.jpg")?;
/// let rendered = autostereo::generate(&depth, &pattern, StereogramParams::default())?;
/// rendered.save("out.png")?;
/// # Ok(())
/// # }
/// ```
pub fn generate(
    depth: &DynamicImage,
    pattern: &DynamicImage,
    params: StereogramParams,
) -> Result<RgbImage> {
    Stereogram::new(params)?.render(&depth.to_luma8(), &pattern.to_rgb8())
}

/// Maximum hidden message size in bytes for an image
pub fn capacity(image: &DynamicImage) -> usize {
    steganography::max_message_bytes(&image.to_rgb8())
}
