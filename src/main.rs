use anyhow::{bail, Context};
use autostereo::config::{DEFAULT_DEPTH_CONTRAST, DEFAULT_PATTERN_SCALE, DEFAULT_SHIFT_STRENGTH};
use autostereo::output::{self, OutputFormat, DEFAULT_JPEG_QUALITY};
use autostereo::{steganography, Stereogram, StereogramParams};
use clap::{Parser, Subcommand};
use image::{DynamicImage, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// autostereo - depth map autostereograms with hidden messages
///
/// Renders a single-image stereogram from a grayscale depth map and a tileable
/// pattern, and hides or reveals text in the least significant bits of an image.
#[derive(Parser)]
#[command(name = "autostereo")]
#[command(version)]
#[command(about = "Autostereogram generator with LSB message hiding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a stereogram from a depth map and a pattern
    Generate {
        /// Grayscale depth map (white is near, black is far)
        #[arg(short, long)]
        depth: PathBuf,

        /// Pattern image tiled across the canvas
        #[arg(short, long)]
        pattern: PathBuf,

        /// Output image path (.png, .bmp, .tiff or .jpg)
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum horizontal shift in pixels (5-50)
        #[arg(short, long, default_value_t = DEFAULT_SHIFT_STRENGTH)]
        shift: u32,

        /// Pattern scale factor (0.5-2.0)
        #[arg(long, default_value_t = DEFAULT_PATTERN_SCALE)]
        scale: f64,

        /// Depth contrast blend factor (0.01-0.05)
        #[arg(short, long, default_value_t = DEFAULT_DEPTH_CONTRAST)]
        contrast: f64,

        /// Hide this message in the rendered image (requires a lossless format)
        #[arg(short, long)]
        message: Option<String>,

        /// JPEG quality (0.3-1.0), only used for .jpg output
        #[arg(short = 'q', long, default_value_t = DEFAULT_JPEG_QUALITY)]
        jpeg_quality: f64,
    },
    /// Hide a message in an existing image
    Hide {
        /// Carrier image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output image path (lossless format)
        #[arg(short, long)]
        output: PathBuf,

        /// Message text
        #[arg(short, long, conflicts_with = "file")]
        message: Option<String>,

        /// Read the message from a UTF-8 text file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Reveal a message hidden in an image
    Reveal {
        /// Image carrying the message
        #[arg(short, long)]
        image: PathBuf,

        /// Write the message to this file instead of stdout
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },
    /// Show image dimensions and hidden message capacity
    Info {
        /// Image file path
        #[arg(short, long)]
        image: PathBuf,
    },
}

fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode {}", path.display()))?;
    println!("[✓] Loaded {}: {}x{}", path.display(), img.width(), img.height());
    Ok(img)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autostereo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            depth,
            pattern,
            output,
            shift,
            scale,
            contrast,
            message,
            jpeg_quality,
        } => {
            let message = output::message_to_embed(message.as_deref());
            let format = OutputFormat::for_output(&output, jpeg_quality, message.is_some())?;
            let engine = Stereogram::new(StereogramParams::new(shift, scale, contrast))?;

            let depth_img = load_image(&depth)?.to_luma8();
            let pattern_img = load_image(&pattern)?.to_rgb8();

            println!(
                "[*] Rendering: shift {}, scale {:.1}, contrast {:.2}",
                shift, scale, contrast
            );
            let mut rendered = engine.render(&depth_img, &pattern_img)?;

            if let Some(text) = message {
                println!("[*] Hiding message: {} bytes", text.len());
                steganography::encode_in_place(&mut rendered, &text)?;
            }

            println!("[*] Saving stereogram to: {}", output.display());
            output::save(&rendered, &output, format)?;
            println!("[✓] Done.");
        }

        Commands::Hide {
            input,
            output,
            message,
            file,
        } => {
            let format = OutputFormat::for_output(&output, DEFAULT_JPEG_QUALITY, true)?;

            let text = if let Some(msg) = message {
                msg
            } else if let Some(file_path) = file {
                fs::read_to_string(&file_path)
                    .with_context(|| format!("failed to read {}", file_path.display()))?
            } else {
                bail!("Please provide either --message or --file");
            };

            let mut carrier = load_image(&input)?.to_rgb8();
            let capacity = steganography::max_message_bytes(&carrier);
            println!("[*] Message: {} bytes, capacity: {} bytes", text.len(), capacity);

            steganography::encode_in_place(&mut carrier, &text)?;

            println!("[*] Saving to: {}", output.display());
            output::save(&carrier, &output, format)?;
            println!("[✓] Message hidden.");
        }

        Commands::Reveal { image, output } => {
            let img = load_image(&image)?.to_rgb8();
            let text = steganography::decode(&img).context("no readable hidden message")?;

            if let Some(out_path) = output {
                fs::write(&out_path, &text)
                    .with_context(|| format!("failed to write {}", out_path.display()))?;
                println!("[✓] Message ({} bytes) saved to {}", text.len(), out_path.display());
            } else {
                println!("[✓] Hidden message:");
                println!("{}", text);
            }
        }

        Commands::Info { image } => {
            let img = load_image(&image)?;
            let capacity = autostereo::capacity(&img);

            println!("Dimensions:       {}x{}", img.width(), img.height());
            println!("Message capacity: {} bytes", capacity);
        }
    }

    Ok(())
}
