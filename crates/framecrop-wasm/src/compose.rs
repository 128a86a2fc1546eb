//! One-shot composition bindings and the preset catalog.
//!
//! Most hosts go through `JsCropEditor`; [`compose_image`] is for callers that
//! keep their own crop state and only need the renderer.

use crate::types::{from_js, from_js_or_default, to_js, JsBitmap, JsSourceImage};
use framecrop_core::compose::{self, Placement, RenderTarget};
use framecrop_core::preset::SizePreset;
use framecrop_core::style::StyleOptions;
use wasm_bindgen::prelude::*;

/// Compose `image` into a bitmap.
///
/// * `placement` - `{ mode: "crop", x, y, width, height }` or
///   `{ mode: "fit", x, y, scale }`
/// * `preset` - `{ id, label, width, height, category }`
/// * `style` - partial `StyleOptions`; missing fields use the defaults
/// * `target` - partial `RenderTarget`; `undefined` renders at export quality
#[wasm_bindgen]
pub fn compose_image(
    image: &JsSourceImage,
    placement: JsValue,
    preset: JsValue,
    style: JsValue,
    target: JsValue,
) -> Result<JsBitmap, JsValue> {
    let placement: Placement = from_js(placement)?;
    let preset: SizePreset = from_js(preset)?;
    let style: StyleOptions = from_js_or_default(style)?;
    let target: RenderTarget = from_js_or_default(target)?;
    compose::compose(image.source(), &placement, &preset, &style, &target)
        .map(JsBitmap::from_rendered)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Built-in presets in display order.
#[wasm_bindgen]
pub fn preset_catalog() -> Result<JsValue, JsValue> {
    to_js(&SizePreset::catalog())
}

/// `StyleOptions` with every field at its default.
#[wasm_bindgen]
pub fn default_style() -> Result<JsValue, JsValue> {
    to_js(&StyleOptions::default())
}
