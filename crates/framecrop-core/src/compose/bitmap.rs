//! Composed output pixels.

use crate::encode::{encode_rgba, EncodeError, ExportFormat};

/// A composed bitmap: straight (non-premultiplied) RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RenderedBitmap {
    /// Copy a premultiplied tiny-skia surface into straight RGBA.
    pub(crate) fn from_pixmap(pixmap: &tiny_skia::Pixmap) -> Self {
        let mut pixels = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }

    /// Whether every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 255)
    }

    /// View as an `image::RgbaImage`.
    pub fn into_rgba_image(self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels)
    }

    /// Encode to bytes in the caller-chosen format.
    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
        encode_rgba(&self.pixels, self.width, self.height, format)
    }
}
