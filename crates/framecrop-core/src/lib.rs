//! Framecrop Core - interactive crop and compose engine
//!
//! This crate holds everything behind a crop editor except the UI: mapping
//! pointer positions into image space, the crop-window and image-fit
//! controllers, the editing session state machine, and the compositor that
//! renders both the live preview and the exported image from the same plan.
//! Decoding, encoding and the batch orchestrator sit around the compositor.

pub mod batch;
pub mod compose;
pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod fit;
pub mod geometry;
pub mod preset;
pub mod session;
pub mod space;
pub mod style;

pub use batch::{
    apply_preset_to_many, BatchError, BatchItemError, BatchOptions, BatchSummary, CancelFlag,
    ImageCollection,
};
pub use compose::{
    compose, compose_with, ComposeError, Placement, RenderTarget, RenderedBitmap, Renderer,
    SampleQuality,
};
pub use config::EngineConfig;
pub use crop::{CropArea, Handle};
pub use decode::{decode_image, DecodeError, SourceImage};
pub use encode::{encode_rgba, EncodeError, ExportFormat};
pub use fit::{ImageTransform, SnapGuides};
pub use geometry::{Point, Rect, Size};
pub use preset::SizePreset;
pub use session::{
    ApplyOutput, CursorHint, DragState, EditorMode, EditorState, InputEvent, PointerEvent,
    PointerKind, Viewport,
};
pub use space::SpaceMapper;
pub use style::{Color, FrameStyle, ShadowStyle, StyleOptions};

#[cfg(test)]
mod tests {
    use super::*;

    /// A 4000x3000 image with a square preset crops 2400x2400 at (800, 300)
    /// and exports at exactly the preset size.
    #[test]
    fn test_default_crop_export_end_to_end() {
        let mut pixels = Vec::with_capacity(400 * 300 * 4);
        for _y in 0..300 {
            for x in 0..400u32 {
                let v = if x < 80 || x >= 320 { 255 } else { 0 };
                pixels.extend_from_slice(&[v, 0, 0, 255]);
            }
        }
        let image = SourceImage::from_raw(400, 300, pixels).unwrap();
        let viewport = Viewport::new(Point::ZERO, Size::new(800.0, 600.0), 1.0);
        let mut state = EditorState::new(image.size(), viewport, EngineConfig::default());
        state.select_preset(SizePreset::custom(108, 108));

        assert_eq!(state.crop_area(), CropArea::new(80.0, 30.0, 240.0, 240.0));
        let out = state.apply(&image, &StyleOptions::default()).unwrap();
        assert_eq!((out.width, out.height), (108, 108));
        // Red columns outside the crop never reach the output
        assert!(out.bitmap.pixels.chunks_exact(4).all(|p| p[0] < 16));
    }
}
