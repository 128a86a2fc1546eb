//! Framecrop WASM - WebAssembly bindings for the framecrop engine
//!
//! This crate exposes framecrop-core to JavaScript/TypeScript hosts.
//!
//! # Module Structure
//!
//! - `types` - WASM wrappers for source images and composed bitmaps
//! - `session` - `JsCropEditor`, the interactive editing session
//! - `compose` - one-shot composition and the preset catalog
//! - `decode` / `encode` - bytes in, bytes out
//! - `batch` - applying one preset to many images
//! - `logger` - `log` records forwarded to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsCropEditor } from '@framecrop/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const editor = new JsCropEditor(image.width, image.height, {
//!   origin: { x: rect.left, y: rect.top },
//!   size: { width: rect.width, height: rect.height },
//!   devicePixelRatio: window.devicePixelRatio,
//! });
//! canvas.onpointerdown = (e) => editor.pointer_down(e.clientX, e.clientY, e.timeStamp);
//! ```

use wasm_bindgen::prelude::*;

mod batch;
mod compose;
mod decode;
mod encode;
mod logger;
mod session;
mod types;

pub use batch::{apply_preset_to_many, JsCancelFlag};
pub use compose::{compose_image, default_style, preset_catalog};
pub use decode::{decode_image, decode_image_no_orientation, detect_format, get_orientation};
pub use encode::{encode_bitmap, encode_jpeg, encode_png};
pub use logger::set_log_level;
pub use session::{JsApplyOutput, JsCropEditor};
pub use types::{JsBitmap, JsSourceImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
