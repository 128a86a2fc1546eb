//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image decoded to zero width or height.
    #[error("Image has no pixels")]
    EmptyImage,

    /// Pixel buffer length does not match the stated dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded, immutable source raster.
///
/// Pixels are straight (non-premultiplied) RGBA8 in row-major order. The crop
/// engine only ever reads from a `SourceImage`.
#[derive(Debug, Clone)]
pub struct SourceImage {
    buffer: image::RgbaImage,
}

impl SourceImage {
    /// Create a SourceImage from dimensions and RGBA pixel data.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage);
        }
        image::RgbaImage::from_raw(width, height, pixels)
            .map(Self::from_rgba_image)
            .ok_or(DecodeError::InvalidFormat)
    }

    /// Create a SourceImage from RGB pixel data (alpha set to opaque).
    pub fn from_rgb(width: u32, height: u32, pixels: &[u8]) -> Result<Self, DecodeError> {
        let expected = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected: expected / 3 * 4,
                actual: pixels.len() / 3 * 4,
            });
        }
        let rgba = pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect();
        Self::from_raw(width, height, rgba)
    }

    /// Wrap an `image::RgbaImage`.
    pub fn from_rgba_image(buffer: image::RgbaImage) -> Self {
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn size(&self) -> Size {
        Size::from_pixels(self.width(), self.height())
    }

    /// Borrow the underlying RGBA buffer.
    pub fn as_rgba(&self) -> &image::RgbaImage {
        &self.buffer
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
