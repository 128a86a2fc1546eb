//! Export encoding for composed bitmaps.
//!
//! Composed output is straight RGBA. PNG keeps the alpha channel; JPEG has
//! none, so pixels are flattened over a background color first (white unless
//! the caller says otherwise).
//!
//! ```ignore
//! use framecrop_core::encode::{encode_rgba, ExportFormat};
//!
//! let pixels = vec![128u8; 100 * 100 * 4];
//! let png = encode_rgba(&pixels, 100, 100, ExportFormat::Png).unwrap();
//! ```

mod jpeg;
mod png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jpeg::{encode_jpeg, flatten_over};
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying codec failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Output container for exported images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    /// JPEG at the given quality (1-100). Transparent pixels become white.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Encode straight RGBA pixels in the requested format.
pub fn encode_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: ExportFormat,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(pixels, width, height),
        ExportFormat::Jpeg { quality } => {
            let rgb = flatten_over(pixels, width, height, [255, 255, 255])?;
            encode_jpeg(&rgb, width, height, quality)
        }
    }
}

/// Shared length/dimension check for `bytes_per_pixel`-channel buffers.
fn validate(
    pixels: &[u8],
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = (width as usize) * (height as usize) * bytes_per_pixel;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
