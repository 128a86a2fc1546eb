//! Compositor: the single rendering path for preview and export.
//!
//! Composition happens in two steps. [`plan`] turns the source size, the
//! placement (crop area or image transform), the preset, the style and a
//! [`RenderTarget`] into a [`CompositionPlan`]: a flat list of backend-agnostic
//! [`DrawOp`]s in device pixels. A [`Renderer`] then executes the plan against
//! the source pixels. [`RasterRenderer`] is the software backend.
//!
//! Preview and export go through the same planner; they differ only in the
//! target's scale, device pixel ratio, checkerboard flag and resampling
//! quality.
//!
//! ```ignore
//! use framecrop_core::compose::{compose, Placement, RenderTarget};
//!
//! let bitmap = compose(&image, &Placement::Crop(area), &preset, &style, &RenderTarget::export())?;
//! assert_eq!((bitmap.width, bitmap.height), style.output_size(preset.width, preset.height));
//! ```

mod bitmap;
mod frame;
mod plan;
mod raster;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::SourceImage;
use crate::preset::SizePreset;
use crate::style::StyleOptions;

pub use bitmap::RenderedBitmap;
pub use frame::{frame_strokes, shadow_for, ShadowSpec};
pub use plan::{plan, CompositionPlan, DrawOp, Placement, RoundRect, StrokePaint};
pub use raster::RasterRenderer;

/// Errors that can occur while composing.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A drawing surface or mask of this size could not be allocated.
    #[error("Render surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// The requested output has zero area.
    #[error("Output size is empty")]
    EmptyTarget,
}

/// Resampling quality for image draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleQuality {
    /// Bilinear, fast enough for every pointer tick.
    #[default]
    Preview,
    /// Lanczos3 downscale with bicubic sampling.
    Export,
}

impl SampleQuality {
    /// Filter used when pre-shrinking the source before sampling.
    pub fn resize_filter(self) -> image::imageops::FilterType {
        match self {
            SampleQuality::Preview => image::imageops::FilterType::Triangle,
            SampleQuality::Export => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Resolution and options of one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderTarget {
    /// Output pixels are multiplied by this factor (1.0 for export).
    pub scale: f64,
    pub device_pixel_ratio: f64,
    /// Draw a checker pattern behind transparent backgrounds.
    pub checkerboard: bool,
    /// Checker cell side in CSS pixels.
    pub checker_cell: f64,
    pub quality: SampleQuality,
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::export()
    }
}

impl RenderTarget {
    /// Full-resolution export: no checkerboard, high-quality resampling.
    pub fn export() -> Self {
        Self {
            scale: 1.0,
            device_pixel_ratio: 1.0,
            checkerboard: false,
            checker_cell: 8.0,
            quality: SampleQuality::Export,
        }
    }

    /// On-screen preview at `scale` output pixels per CSS pixel.
    pub fn preview(scale: f64, device_pixel_ratio: f64, checker_cell: f64) -> Self {
        Self {
            scale,
            device_pixel_ratio,
            checkerboard: true,
            checker_cell,
            quality: SampleQuality::Preview,
        }
    }

    /// Device pixels per output pixel.
    pub fn pixel_scale(&self) -> f64 {
        let k = self.scale * self.device_pixel_ratio;
        if k.is_finite() && k > 0.0 {
            k
        } else {
            1.0
        }
    }
}

/// Executes a [`CompositionPlan`] against source pixels.
pub trait Renderer {
    fn render(
        &mut self,
        plan: &CompositionPlan,
        image: &SourceImage,
    ) -> Result<RenderedBitmap, ComposeError>;
}

/// Compose with the software renderer.
pub fn compose(
    image: &SourceImage,
    placement: &Placement,
    preset: &SizePreset,
    style: &StyleOptions,
    target: &RenderTarget,
) -> Result<RenderedBitmap, ComposeError> {
    compose_with(&mut RasterRenderer::new(), image, placement, preset, style, target)
}

/// Compose with an arbitrary renderer.
pub fn compose_with<R: Renderer>(
    renderer: &mut R,
    image: &SourceImage,
    placement: &Placement,
    preset: &SizePreset,
    style: &StyleOptions,
    target: &RenderTarget,
) -> Result<RenderedBitmap, ComposeError> {
    let plan = plan(image.size(), placement, preset, style, target)?;
    renderer.render(&plan, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::crop::CropArea;
    use crate::fit::ImageTransform;
    use crate::style::{Color, FrameStyle, ShadowStyle};

    /// Left half red, right half blue.
    fn split_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..height {
            for x in 0..width {
                if x < width / 2 {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255, 255]);
                }
            }
        }
        SourceImage::from_raw(width, height, pixels).unwrap()
    }

    fn pixel(bitmap: &RenderedBitmap, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * bitmap.width + x) * 4) as usize;
        [
            bitmap.pixels[i],
            bitmap.pixels[i + 1],
            bitmap.pixels[i + 2],
            bitmap.pixels[i + 3],
        ]
    }

    fn close(a: [u8; 4], b: [u8; 4], tol: u8) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tol)
    }

    #[test]
    fn test_output_size_matches_preset_plus_padding() {
        let image = split_image(64, 48);
        let preset = SizePreset::custom(40, 30);
        let placement = Placement::Crop(CropArea::new(0.0, 0.0, 64.0, 48.0));

        let mut style = StyleOptions::default();
        let bitmap = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (40, 30));

        style.padding = 5;
        let bitmap = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (50, 40));
        assert_eq!(bitmap.pixels.len(), 50 * 40 * 4);
    }

    #[test]
    fn test_crop_samples_only_the_crop_area() {
        // Crop the blue half only; no red may bleed in from outside the area
        let image = split_image(200, 100);
        let preset = SizePreset::custom(50, 50);
        let placement = Placement::Crop(CropArea::new(100.0, 0.0, 100.0, 100.0));
        let bitmap = compose(
            &image,
            &placement,
            &preset,
            &StyleOptions::default(),
            &RenderTarget::export(),
        )
        .unwrap();

        for y in 0..bitmap.height {
            for x in 0..bitmap.width {
                assert!(
                    close(pixel(&bitmap, x, y), [0, 0, 255, 255], 2),
                    "pixel ({}, {}) = {:?}",
                    x,
                    y,
                    pixel(&bitmap, x, y)
                );
            }
        }
    }

    #[test]
    fn test_identical_inputs_identical_pixels() {
        let image = split_image(120, 80);
        let preset = SizePreset::custom(60, 60);
        let mut style = StyleOptions::default();
        style.padding = 6;
        style.border_radius = 12.0;
        style.bg_color = Color::rgb(20, 30, 40);
        style.shadow = ShadowStyle::Hug;
        style.frame_style = FrameStyle::GlassLight;
        let placement = Placement::Crop(CropArea::new(10.0, 5.0, 70.0, 70.0));

        let a = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();
        let b = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_preview_and_export_differ_only_by_resampling() {
        let image = split_image(100, 100);
        let preset = SizePreset::custom(40, 40);
        let placement = Placement::Crop(CropArea::new(0.0, 0.0, 100.0, 100.0));
        let style = StyleOptions {
            bg_color: Color::WHITE,
            ..StyleOptions::default()
        };

        let preview_target = RenderTarget::preview(1.0, 1.0, 8.0);
        let preview = compose(&image, &placement, &preset, &style, &preview_target).unwrap();
        let export = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();

        assert_eq!((preview.width, preview.height), (export.width, export.height));
        // Far from the color seam both renders agree
        assert!(close(pixel(&preview, 5, 20), pixel(&export, 5, 20), 2));
        assert!(close(pixel(&preview, 35, 20), pixel(&export, 35, 20), 2));
    }

    #[test]
    fn test_preview_scales_with_device_pixel_ratio() {
        let image = split_image(100, 100);
        let preset = SizePreset::custom(40, 30);
        let placement = Placement::Crop(CropArea::new(0.0, 0.0, 100.0, 75.0));
        let target = RenderTarget::preview(0.5, 2.0, 8.0);
        let bitmap =
            compose(&image, &placement, &preset, &StyleOptions::default(), &target).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (40, 30));

        let target = RenderTarget::preview(1.0, 2.0, 8.0);
        let bitmap =
            compose(&image, &placement, &preset, &StyleOptions::default(), &target).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (80, 60));
    }

    #[test]
    fn test_export_transparent_background_stays_transparent() {
        let image = split_image(100, 100);
        let preset = SizePreset::custom(20, 20);
        let style = StyleOptions {
            padding: 10,
            ..StyleOptions::default()
        };
        let placement = Placement::Crop(CropArea::new(0.0, 0.0, 100.0, 100.0));
        let bitmap = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();

        // Padding corner is untouched, content is opaque
        assert_eq!(pixel(&bitmap, 0, 0)[3], 0);
        assert_eq!(pixel(&bitmap, 20, 20)[3], 255);
    }

    #[test]
    fn test_preview_checkerboard_fills_transparent_padding() {
        let image = split_image(100, 100);
        let preset = SizePreset::custom(20, 20);
        let style = StyleOptions {
            padding: 10,
            ..StyleOptions::default()
        };
        let placement = Placement::Crop(CropArea::new(0.0, 0.0, 100.0, 100.0));
        let target = RenderTarget::preview(1.0, 1.0, 8.0);
        let bitmap = compose(&image, &placement, &preset, &style, &target).unwrap();
        assert_eq!(pixel(&bitmap, 0, 0)[3], 255);
    }

    #[test]
    fn test_fit_placement_under_fill_leaves_background() {
        let image = split_image(100, 100);
        let preset = SizePreset::custom(100, 100);
        let style = StyleOptions {
            bg_color: Color::rgb(0, 255, 0),
            ..StyleOptions::default()
        };
        // Half-size image in the top-left quadrant
        let placement = Placement::Fit(ImageTransform::new(0.0, 0.0, 0.5));
        let bitmap = compose(&image, &placement, &preset, &style, &RenderTarget::export()).unwrap();

        assert!(close(pixel(&bitmap, 10, 10), [255, 0, 0, 255], 2));
        assert!(close(pixel(&bitmap, 90, 90), [0, 255, 0, 255], 0));
    }

    #[test]
    fn test_default_crop_on_large_image_example() {
        let config = EngineConfig::default();
        let image = SourceImage::from_raw(400, 300, vec![200; 400 * 300 * 4]).unwrap();
        let area = CropArea::default_for(image.size(), &config);
        assert_eq!((area.x, area.y, area.width, area.height), (80.0, 30.0, 240.0, 240.0));

        let preset = SizePreset::custom(108, 108);
        let bitmap = compose(
            &image,
            &Placement::Crop(area),
            &preset,
            &StyleOptions::default(),
            &RenderTarget::export(),
        )
        .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (108, 108));
        assert!(close(pixel(&bitmap, 54, 54), [200, 200, 200, 200], 2));
    }

    #[test]
    fn test_empty_preset_is_rejected() {
        let image = split_image(10, 10);
        let preset = SizePreset {
            width: 0,
            ..SizePreset::custom(1, 1)
        };
        let result = compose(
            &image,
            &Placement::Fit(ImageTransform::default()),
            &preset,
            &StyleOptions::default(),
            &RenderTarget::export(),
        );
        assert!(matches!(result, Err(ComposeError::EmptyTarget)));
    }

    #[test]
    fn test_render_target_pixel_scale_sanitized() {
        assert_eq!(RenderTarget::preview(0.5, 2.0, 8.0).pixel_scale(), 1.0);
        assert_eq!(RenderTarget::preview(0.0, 2.0, 8.0).pixel_scale(), 1.0);
        assert_eq!(RenderTarget::preview(f64::NAN, 1.0, 8.0).pixel_scale(), 1.0);
        assert_eq!(RenderTarget::preview(0.25, 2.0, 8.0).pixel_scale(), 0.5);
    }
}
