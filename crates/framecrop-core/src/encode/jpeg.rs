//! JPEG encoding for export.
//!
//! JPEG carries no alpha, so composed RGBA output goes through
//! [`flatten_over`] before reaching the encoder.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate, EncodeError};

/// Encode RGB pixel data to JPEG bytes.
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `quality` - JPEG quality, clamped to 1-100
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 3)?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Composite straight RGBA pixels over an opaque `background`, returning RGB.
pub fn flatten_over(
    pixels: &[u8],
    width: u32,
    height: u32,
    background: [u8; 3],
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 4)?;

    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    for px in pixels.chunks_exact(4) {
        let a = px[3] as u32;
        for c in 0..3 {
            let fg = px[c] as u32 * a;
            let bg = background[c] as u32 * (255 - a);
            rgb.push(((fg + bg + 127) / 255) as u8);
        }
    }
    Ok(rgb)
}
