//! Image encoding WASM bindings.
//!
//! Input pixels are straight RGBA. JPEG output flattens transparency over
//! white.

use crate::types::{from_js_or_default, JsBitmap};
use framecrop_core::encode::{self, ExportFormat};
use wasm_bindgen::prelude::*;

/// Encode RGBA pixels as PNG.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGBA pixels as JPEG at `quality` (1-100).
#[wasm_bindgen]
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, JsValue> {
    encode::encode_rgba(pixels, width, height, ExportFormat::Jpeg { quality })
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a composed bitmap. `format` is `{ type: "png" }` or
/// `{ type: "jpeg", quality }`; `undefined` means PNG.
#[wasm_bindgen]
pub fn encode_bitmap(bitmap: &JsBitmap, format: JsValue) -> Result<Vec<u8>, JsValue> {
    let format: ExportFormat = from_js_or_default(format)?;
    bitmap
        .rendered()
        .encode(format)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_basic() {
        let pixels = vec![128u8; 100 * 100 * 4];
        let jpeg = encode_jpeg(&pixels, 100, 100, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_png_invalid_dimensions() {
        let pixels = vec![128u8; 100];
        assert!(encode_png(&pixels, 0, 100).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_invalid_pixel_data() {
        let pixels = vec![128u8; 50 * 50 * 4];
        assert!(encode_jpeg(&pixels, 100, 100, 90).is_err());
    }
}
