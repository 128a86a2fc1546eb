//! WASM-compatible wrapper types for image data.
//!
//! Both wrappers keep their pixels in WASM memory. Calling `pixels()` copies
//! them into a JavaScript `Uint8Array`.

use framecrop_core::compose::RenderedBitmap;
use framecrop_core::decode::SourceImage;
use framecrop_core::encode::ExportFormat;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

/// A decoded source image (RGBA8).
#[wasm_bindgen]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Wrap RGBA pixel data (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsSourceImage, JsValue> {
        SourceImage::from_raw(width, height, pixels)
            .map(JsSourceImage::from_source)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels().len()
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsSourceImage {
    pub(crate) fn from_source(inner: SourceImage) -> Self {
        Self { inner }
    }

    pub(crate) fn source(&self) -> &SourceImage {
        &self.inner
    }
}

/// A composed output bitmap (straight RGBA8).
#[wasm_bindgen]
pub struct JsBitmap {
    inner: RenderedBitmap,
}

#[wasm_bindgen]
impl JsBitmap {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// RGBA pixels, ready for `new ImageData(new Uint8ClampedArray(px), w, h)`.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    pub fn is_opaque(&self) -> bool {
        self.inner.is_opaque()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .encode(ExportFormat::Png)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, JsValue> {
        self.inner
            .encode(ExportFormat::Jpeg { quality })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn free(self) {}
}

impl JsBitmap {
    pub(crate) fn from_rendered(inner: RenderedBitmap) -> Self {
        Self { inner }
    }

    pub(crate) fn rendered(&self) -> &RenderedBitmap {
        &self.inner
    }
}

/// Deserialize a JS object, treating `undefined`/`null` as the default value.
pub(crate) fn from_js_or_default<T>(value: JsValue) -> Result<T, JsValue>
where
    T: DeserializeOwned + Default,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_js(value)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
