//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode PNG/JPEG bytes, applying EXIF orientation
//! - [`decode_image_no_orientation`] - Decode without touching orientation
//! - [`detect_format`] - Sniff the container format from the header
//! - [`get_orientation`] - Read the EXIF orientation tag (1-8)
//!
//! # Example
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! if (detect_format(bytes) === undefined) throw new Error('unsupported file');
//! const image = decode_image(bytes);
//! ```

use crate::types::JsSourceImage;
use framecrop_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image from bytes.
///
/// The EXIF orientation is applied so the pixels match what the user sees,
/// and crop coordinates computed against this image line up with the photo.
///
/// # Errors
///
/// Returns an error if the format is not recognized, the data is corrupted,
/// or the image has zero area.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode an image from bytes, ignoring any EXIF orientation.
#[wasm_bindgen]
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_image_no_orientation(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// MIME type of the detected format, or `undefined` when unknown.
#[wasm_bindgen]
pub fn detect_format(bytes: &[u8]) -> Option<String> {
    decode::detect_format(bytes).map(|f| f.to_mime_type().to_string())
}

/// EXIF orientation value (1-8). Returns 1 when the tag is absent.
#[wasm_bindgen]
pub fn get_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}
