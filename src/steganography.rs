/// LSB steganography over RGB images
///
/// Wire format: `[u32 big-endian length][length bytes of UTF-8]`, serialized
/// MSB-first per byte, one bit per channel LSB in row-major, channel-minor
/// order (R, G, B) starting at pixel (0, 0).

use crate::error::{Result, StereoError};
use image::RgbImage;
use tracing::{debug, warn};

const LENGTH_PREFIX_BYTES: usize = 4;

/// Number of embeddable bits: one per color channel
pub fn available_bits(image: &RgbImage) -> u64 {
    image.as_raw().len() as u64
}

/// Largest message, in UTF-8 bytes, that fits in the image
pub fn max_message_bytes(image: &RgbImage) -> usize {
    (available_bits(image) / 8).saturating_sub(LENGTH_PREFIX_BYTES as u64) as usize
}

/// Embed `message` into a copy of `image`
pub fn encode(image: &RgbImage, message: &str) -> Result<RgbImage> {
    let mut stego = image.clone();
    encode_in_place(&mut stego, message)?;
    Ok(stego)
}

/// Embed `message` into `image`
///
/// Capacity is checked before any sample is touched, so on error the image is
/// unchanged. Samples past the last payload bit keep their original value.
pub fn encode_in_place(image: &mut RgbImage, message: &str) -> Result<()> {
    let payload = frame_payload(message)?;

    let required_bits = payload.len() as u64 * 8;
    let available_bits = available_bits(image);
    if required_bits > available_bits {
        return Err(StereoError::CapacityExceeded {
            required_bits,
            available_bits,
        });
    }
    debug!(
        message_bytes = message.len(),
        required_bits, available_bits, "embedding payload"
    );

    // raw RgbImage storage is already (row, col, channel) order
    for (sample, bit) in image.iter_mut().zip(bits_msb_first(&payload)) {
        *sample = (*sample & 0xFE) | bit;
    }

    Ok(())
}

/// Recover a message embedded by [`encode`]
///
/// Any image yields some length prefix; an image that never carried a message
/// is detected only through the capacity and UTF-8 checks.
pub fn decode(image: &RgbImage) -> Result<String> {
    let mut reader = LsbReader::new(image.as_raw());

    let length_bytes = reader
        .read_bytes(LENGTH_PREFIX_BYTES)
        .ok_or(StereoError::IncompleteHeader)?;
    let declared_len = u32::from_be_bytes([
        length_bytes[0],
        length_bytes[1],
        length_bytes[2],
        length_bytes[3],
    ]);

    // checked before reading so an implausible length never drives the walk
    let remaining_bits = reader.remaining_bits();
    if declared_len as u64 * 8 > remaining_bits {
        warn!(declared_len, remaining_bits, "declared message exceeds image");
        return Err(StereoError::IncompleteMessage {
            declared_len,
            available_bytes: remaining_bits / 8,
        });
    }

    let message = reader
        .read_bytes(declared_len as usize)
        .ok_or(StereoError::IncompleteMessage {
            declared_len,
            available_bytes: remaining_bits / 8,
        })?;

    let text = String::from_utf8(message).map_err(|e| {
        warn!(declared_len, "hidden bytes are not valid UTF-8");
        StereoError::InvalidEncoding(e)
    })?;
    debug!(message_bytes = text.len(), "payload recovered");
    Ok(text)
}

fn frame_payload(message: &str) -> Result<Vec<u8>> {
    let len = u32::try_from(message.len()).map_err(|_| {
        StereoError::InvalidParameter(format!(
            "message of {} bytes exceeds the 32-bit length prefix",
            message.len()
        ))
    })?;

    let mut payload = Vec::with_capacity(LENGTH_PREFIX_BYTES + message.len());
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(message.as_bytes());
    Ok(payload)
}

fn bits_msb_first(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    data.iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1))
}

/// Sequential reader over sample LSBs
struct LsbReader<'a> {
    samples: &'a [u8],
    position: usize,
}

impl<'a> LsbReader<'a> {
    fn new(samples: &'a [u8]) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    fn remaining_bits(&self) -> u64 {
        (self.samples.len() - self.position) as u64
    }

    /// Read `count` bytes MSB-first, or `None` if the samples run out
    fn read_bytes(&mut self, count: usize) -> Option<Vec<u8>> {
        let bits = count.checked_mul(8)?;
        let end = self.position.checked_add(bits)?;
        let window = self.samples.get(self.position..end)?;
        self.position = end;

        Some(
            window
                .chunks_exact(8)
                .map(|chunk| chunk.iter().fold(0u8, |byte, &s| (byte << 1) | (s & 1)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise_image(width: u32, height: u32, seed: u64) -> RgbImage {
        let mut rng = StdRng::seed_from_u64(seed);
        RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
    }

    /// Set the LSB stream of `image` to the given bytes, MSB-first
    fn write_raw_bits(image: &mut RgbImage, data: &[u8]) {
        for (sample, bit) in image.iter_mut().zip(bits_msb_first(data)) {
            *sample = (*sample & 0xFE) | bit;
        }
    }

    #[test]
    fn test_round_trip() {
        let carrier = noise_image(32, 32, 7);
        for message in ["", "a", "Hello, this is a secret message!", "héllo wörld ✓ 深度"] {
            let stego = encode(&carrier, message).unwrap();
            assert_eq!(decode(&stego).unwrap(), message);
        }
    }

    #[test]
    fn test_capacity_boundary() {
        // 8x8x3 = 192 bits = 32 prefix bits + 20 bytes
        let carrier = noise_image(8, 8, 1);
        assert_eq!(max_message_bytes(&carrier), 20);

        let fits = "x".repeat(20);
        let stego = encode(&carrier, &fits).unwrap();
        assert_eq!(decode(&stego).unwrap(), fits);

        let err = encode(&carrier, &"x".repeat(21)).unwrap_err();
        assert!(matches!(
            err,
            StereoError::CapacityExceeded {
                required_bits: 200,
                available_bits: 192
            }
        ));
    }

    #[test]
    fn test_failed_encode_leaves_image_untouched() {
        let original = noise_image(4, 4, 3);
        let mut image = original.clone();
        assert!(encode_in_place(&mut image, "this message is too long").is_err());
        assert_eq!(image, original);
    }

    #[test]
    fn test_wire_layout() {
        let carrier = RgbImage::from_pixel(4, 4, Rgb([0xAA, 0xAB, 0xFF]));
        let stego = encode(&carrier, "A").unwrap();
        let raw = stego.as_raw();

        // prefix 0x00000001 then 'A' = 0x41, MSB-first
        let mut expected_bits = vec![0u8; 31];
        expected_bits.push(1);
        expected_bits.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 1]);

        for (i, &bit) in expected_bits.iter().enumerate() {
            assert_eq!(raw[i] & 1, bit, "bit {}", i);
            assert_eq!(raw[i] & 0xFE, carrier.as_raw()[i] & 0xFE);
        }
        // past the payload every sample is bit-for-bit unchanged
        assert_eq!(&raw[40..], &carrier.as_raw()[40..]);
    }

    #[test]
    fn test_traversal_crosses_rows() {
        // 1 pixel wide: every three bits move to the next row
        let carrier = noise_image(1, 64, 11);
        let stego = encode(&carrier, "row!").unwrap();
        assert_eq!(decode(&stego).unwrap(), "row!");
    }

    #[test]
    fn test_incomplete_header() {
        // 2x5x3 = 30 bits
        let image = RgbImage::new(2, 5);
        assert!(matches!(decode(&image), Err(StereoError::IncompleteHeader)));
    }

    #[test]
    fn test_incomplete_message() {
        let mut image = RgbImage::new(8, 8);
        write_raw_bits(&mut image, &21u32.to_be_bytes());
        assert!(matches!(
            decode(&image),
            Err(StereoError::IncompleteMessage {
                declared_len: 21,
                available_bytes: 20
            })
        ));
    }

    #[test]
    fn test_implausible_length() {
        let mut image = RgbImage::new(8, 8);
        write_raw_bits(&mut image, &u32::MAX.to_be_bytes());
        assert!(matches!(
            decode(&image),
            Err(StereoError::IncompleteMessage { .. })
        ));
    }

    #[test]
    fn test_invalid_encoding() {
        let mut image = RgbImage::new(8, 8);
        write_raw_bits(&mut image, &[0, 0, 0, 2, 0xC3, 0x28]);
        assert!(matches!(decode(&image), Err(StereoError::InvalidEncoding(_))));
    }

    #[test]
    fn test_unencoded_image_fails() {
        // all LSBs set: length prefix decodes to u32::MAX
        let image = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        assert!(decode(&image).is_err());
    }
}
