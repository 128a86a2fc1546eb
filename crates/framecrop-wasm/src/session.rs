//! Interactive editing session bindings.
//!
//! `JsCropEditor` owns one `EditorState`. The host forwards pointer, wheel and
//! resize events, reads back the crop/transform and overlay geometry after
//! each event, and asks for preview or export renders.

use crate::types::{from_js, from_js_or_default, to_js, JsBitmap, JsSourceImage};
use framecrop_core::config::EngineConfig;
use framecrop_core::geometry::Size;
use framecrop_core::preset::SizePreset;
use framecrop_core::session::{
    EditorMode, EditorState, InputEvent, PointerEvent, PointerKind, Viewport,
};
use framecrop_core::style::StyleOptions;
use framecrop_core::ApplyOutput;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct JsCropEditor {
    inner: EditorState,
}

#[wasm_bindgen]
impl JsCropEditor {
    /// Start a session for an image of `image_width` x `image_height`.
    ///
    /// `viewport` is `{ origin: {x, y}, size: {width, height},
    /// devicePixelRatio, cssScale }`; `config` is a partial `EngineConfig`.
    /// Either may be `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        image_width: u32,
        image_height: u32,
        viewport: JsValue,
        config: JsValue,
    ) -> Result<JsCropEditor, JsValue> {
        let viewport: Viewport = from_js_or_default(viewport)?;
        let config: EngineConfig = from_js_or_default(config)?;
        Ok(Self {
            inner: EditorState::new(
                Size::from_pixels(image_width, image_height),
                viewport,
                config,
            ),
        })
    }

    pub fn pointer_down(&mut self, client_x: f64, client_y: f64, timestamp_ms: f64) {
        self.pointer(PointerKind::Down, client_x, client_y, timestamp_ms);
    }

    pub fn pointer_move(&mut self, client_x: f64, client_y: f64, timestamp_ms: f64) {
        self.pointer(PointerKind::Move, client_x, client_y, timestamp_ms);
    }

    pub fn pointer_up(&mut self, client_x: f64, client_y: f64, timestamp_ms: f64) {
        self.pointer(PointerKind::Up, client_x, client_y, timestamp_ms);
    }

    /// Wheel zoom in Image-Fit mode. Negative `delta_y` zooms in.
    pub fn wheel(&mut self, client_x: f64, client_y: f64, delta_y: f64) {
        self.inner.dispatch(&InputEvent::Wheel {
            client_x,
            client_y,
            delta_y,
        });
    }

    /// Container moved or resized.
    pub fn resize(&mut self, viewport: JsValue) -> Result<(), JsValue> {
        let viewport: Viewport = from_js(viewport)?;
        self.inner.dispatch(&InputEvent::Resize(viewport));
        Ok(())
    }

    /// Advance the clock; clears snap guides once their grace period ends.
    pub fn tick(&mut self, now_ms: f64) {
        self.inner.dispatch(&InputEvent::Tick { now_ms });
    }

    /// Apply a serialized `InputEvent` (`{ type: "pointer", kind, clientX, ... }`).
    pub fn dispatch(&mut self, event: JsValue) -> Result<(), JsValue> {
        let event: InputEvent = from_js(event)?;
        self.inner.dispatch(&event);
        Ok(())
    }

    /// CSS cursor for a pointer at client coordinates.
    pub fn hover(&self, client_x: f64, client_y: f64) -> String {
        self.inner.hover(client_x, client_y).css().to_string()
    }

    /// `"crop-window"` or `"fit-image"`.
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        mode_name(self.inner.mode()).to_string()
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = parse_mode(mode)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown editor mode: {}", mode)))?;
        self.inner.set_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn is_dragging(&self) -> bool {
        !self.inner.drag().is_idle()
    }

    pub fn select_preset(&mut self, preset: JsValue) -> Result<(), JsValue> {
        let preset: SizePreset = from_js(preset)?;
        self.inner.select_preset(preset);
        Ok(())
    }

    /// Select a built-in preset by id.
    pub fn select_preset_by_id(&mut self, id: &str) -> Result<(), JsValue> {
        let preset = SizePreset::find(id)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown preset: {}", id)))?;
        self.inner.select_preset(preset);
        Ok(())
    }

    pub fn select_custom_size(&mut self, width: u32, height: u32) {
        self.inner.select_preset(SizePreset::custom(width, height));
    }

    pub fn clear_preset(&mut self) {
        self.inner.clear_preset();
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn center(&mut self) {
        self.inner.center();
    }

    pub fn fill(&mut self) {
        self.inner.fill();
    }

    pub fn fit(&mut self) {
        self.inner.fit();
    }

    pub fn actual_size(&mut self) {
        self.inner.actual_size();
    }

    /// `{ x, y, width, height }` in image pixels.
    pub fn crop_area(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_area())
    }

    /// `{ x, y, scale }` in window-local output pixels.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.transform())
    }

    pub fn guides(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.guides())
    }

    /// Frame, image rect, handles and guide lines in canvas coordinates.
    pub fn overlay(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.overlay())
    }

    /// The preset that will be rendered (selected or derived from the crop).
    pub fn output_preset(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.output_preset())
    }

    /// Render a preview fitting inside `max_width` x `max_height` CSS pixels.
    pub fn render_preview(
        &self,
        image: &JsSourceImage,
        style: JsValue,
        max_width: f64,
        max_height: f64,
    ) -> Result<JsBitmap, JsValue> {
        let style: StyleOptions = from_js_or_default(style)?;
        self.inner
            .render_preview(image.source(), &style, Size::new(max_width, max_height))
            .map(JsBitmap::from_rendered)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Render at export resolution.
    pub fn apply(&self, image: &JsSourceImage, style: JsValue) -> Result<JsApplyOutput, JsValue> {
        let style: StyleOptions = from_js_or_default(style)?;
        self.inner
            .apply(image.source(), &style)
            .map(JsApplyOutput::from)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsCropEditor {
    fn pointer(&mut self, kind: PointerKind, client_x: f64, client_y: f64, timestamp_ms: f64) {
        self.inner.dispatch(&InputEvent::Pointer(PointerEvent::new(
            kind,
            client_x,
            client_y,
            timestamp_ms,
        )));
    }
}

/// Result of `JsCropEditor::apply`.
#[wasm_bindgen]
pub struct JsApplyOutput {
    inner: ApplyOutput,
}

#[wasm_bindgen]
impl JsApplyOutput {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Crop used in crop-window mode, `null` in Image-Fit mode.
    pub fn crop_area(&self) -> Result<JsValue, JsValue> {
        match &self.inner.crop_area {
            Some(area) => to_js(area),
            None => Ok(JsValue::NULL),
        }
    }

    /// The composed bitmap. Consumes the output.
    pub fn into_bitmap(self) -> JsBitmap {
        JsBitmap::from_rendered(self.inner.bitmap)
    }
}

impl From<ApplyOutput> for JsApplyOutput {
    fn from(inner: ApplyOutput) -> Self {
        Self { inner }
    }
}

fn parse_mode(name: &str) -> Option<EditorMode> {
    match name {
        "crop-window" | "crop" => Some(EditorMode::CropWindow),
        "fit-image" | "fit" => Some(EditorMode::FitImage),
        _ => None,
    }
}

fn mode_name(mode: EditorMode) -> &'static str {
    match mode {
        EditorMode::CropWindow => "crop-window",
        EditorMode::FitImage => "fit-image",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecrop_core::geometry::Point;

    fn editor() -> JsCropEditor {
        JsCropEditor {
            inner: EditorState::new(
                Size::new(4000.0, 3000.0),
                Viewport::new(Point::ZERO, Size::new(1000.0, 750.0), 1.0),
                EngineConfig::default(),
            ),
        }
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("fit-image"), Some(EditorMode::FitImage));
        assert_eq!(parse_mode("crop"), Some(EditorMode::CropWindow));
        assert_eq!(parse_mode("zoom"), None);
        assert_eq!(mode_name(EditorMode::FitImage), "fit-image");
    }

    #[test]
    fn test_pointer_drag_moves_crop() {
        let mut ed = editor();
        ed.pointer_down(500.0, 375.0, 0.0);
        assert!(ed.is_dragging());
        ed.pointer_move(550.0, 375.0, 16.0);
        ed.pointer_up(550.0, 375.0, 32.0);
        assert!(!ed.is_dragging());
        assert_eq!(ed.inner.crop_area().x, 1000.0);
    }

    #[test]
    fn test_hover_returns_css_cursor() {
        let ed = editor();
        assert_eq!(ed.hover(500.0, 375.0), "move");
        assert_eq!(ed.hover(800.0, 675.0), "nwse-resize");
        assert_eq!(ed.hover(2.0, 2.0), "default");
    }

    #[test]
    fn test_select_preset_by_id_locks_ratio() {
        let mut ed = editor();
        ed.select_preset_by_id("story").ok();
        let ratio = ed.inner.aspect_lock().unwrap();
        assert!((ratio - 1080.0 / 1920.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_output_wrapper() {
        let image = framecrop_core::decode::SourceImage::from_raw(40, 30, vec![200; 40 * 30 * 4])
            .unwrap();
        let mut state =
            EditorState::new(image.size(), Viewport::default(), EngineConfig::default());
        state.select_preset(SizePreset::custom(12, 12));
        let out = JsApplyOutput::from(state.apply(&image, &StyleOptions::default()).unwrap());
        assert_eq!((out.width(), out.height()), (12, 12));
        assert_eq!(out.into_bitmap().width(), 12);
    }
}
