//! Drawing IR and the planner that produces it.

use serde::{Deserialize, Serialize};

use super::frame::{frame_strokes, shadow_for};
use super::{ComposeError, RenderTarget, SampleQuality};
use crate::crop::CropArea;
use crate::fit::ImageTransform;
use crate::geometry::{Point, Rect, Size};
use crate::preset::SizePreset;
use crate::style::{Color, StyleOptions};

/// Where the source image lands in the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Placement {
    /// Crop-window mode: the area is center-cropped to the preset's aspect
    /// and scaled to fill the framed region.
    Crop(CropArea),
    /// Image-fit mode: the image is positioned and scaled inside the framed
    /// region. Uncovered parts show the background.
    Fit(ImageTransform),
}

/// Rectangle with uniformly rounded corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundRect {
    pub rect: Rect,
    pub radius: f64,
}

impl RoundRect {
    /// Construct with the radius clamped to half the shorter side.
    pub fn new(rect: Rect, radius: f64) -> Self {
        let max = (rect.size().min_side() / 2.0).max(0.0);
        let radius = if radius.is_finite() {
            radius.clamp(0.0, max)
        } else {
            0.0
        };
        Self { rect, radius }
    }

    /// Shape of a stroke of `width` centered on a path inset by `width / 2`,
    /// so the stroke stays inside this shape.
    pub fn stroke_inset(&self, width: f64) -> Self {
        let half = width / 2.0;
        Self::new(self.rect.inset(half), (self.radius - half).max(0.0))
    }
}

/// Paint used for frame strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrokePaint {
    Solid(Color),
    /// Linear gradient between two points with evenly ordered stops.
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<(f64, Color)>,
    },
}

/// One backend-agnostic drawing instruction. All geometry is in device
/// pixels of the output surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    /// Two-tone checker over the whole surface.
    Checkerboard { cell: f64 },
    /// Fill the whole surface.
    Fill { color: Color },
    /// Blurred, offset silhouette of `shape`.
    Shadow {
        shape: RoundRect,
        color: Color,
        blur: f64,
        offset: Point,
    },
    /// Intersect the clip with `shape` until the matching `PopClip`.
    PushClip(RoundRect),
    /// Draw the `src` region of the source image (source pixels) into `dst`.
    DrawImage { src: Rect, dst: Rect },
    PopClip,
    /// Stroke centered on the outline of `shape`.
    StrokeFrame {
        shape: RoundRect,
        width: f64,
        paint: StrokePaint,
    },
}

/// Ordered drawing instructions for one output surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionPlan {
    pub width: u32,
    pub height: u32,
    pub quality: SampleQuality,
    pub ops: Vec<DrawOp>,
}

/// Build the drawing plan for one composition.
///
/// The order is fixed: checker (preview, see-through background only),
/// background fill, shadow, clip, image, unclip, frame.
pub fn plan(
    image: Size,
    placement: &Placement,
    preset: &SizePreset,
    style: &StyleOptions,
    target: &RenderTarget,
) -> Result<CompositionPlan, ComposeError> {
    if preset.width == 0 || preset.height == 0 {
        return Err(ComposeError::EmptyTarget);
    }

    let k = target.pixel_scale();
    let (out_w, out_h) = style.output_size(preset.width, preset.height);
    let width = device_len(out_w, k);
    let height = device_len(out_h, k);

    let padding = style.padding as f64;
    let content = Rect::new(padding, padding, preset.width as f64, preset.height as f64);
    let radius = style.effective_radius(content.size());
    let shape = RoundRect::new(content.scale(k), radius * k);

    let mut ops = Vec::new();

    if target.checkerboard && style.has_transparent_background() {
        let cell = if target.checker_cell.is_finite() && target.checker_cell > 0.0 {
            target.checker_cell
        } else {
            8.0
        };
        ops.push(DrawOp::Checkerboard {
            cell: cell * target.device_pixel_ratio.max(1.0),
        });
    }

    if !style.bg_color.is_transparent() {
        ops.push(DrawOp::Fill {
            color: style.bg_color,
        });
    }

    if let Some(shadow) = shadow_for(style.shadow) {
        ops.push(DrawOp::Shadow {
            shape,
            color: Color::BLACK.with_alpha(shadow.alpha),
            blur: shadow.blur * k,
            offset: Point::new(shadow.offset.x * k, shadow.offset.y * k),
        });
    }

    ops.push(DrawOp::PushClip(shape));
    if let Some((src, dst)) = image_draw(image, placement, content) {
        ops.push(DrawOp::DrawImage {
            src,
            dst: dst.scale(k),
        });
    }
    ops.push(DrawOp::PopClip);

    ops.extend(frame_strokes(style, shape, k));

    Ok(CompositionPlan {
        width,
        height,
        quality: target.quality,
        ops,
    })
}

fn device_len(output: u32, k: f64) -> u32 {
    let len = (output as f64 * k).round();
    if len.is_finite() && len >= 1.0 {
        len as u32
    } else {
        1
    }
}

/// Source and destination rectangles (output pixels) for the image draw.
fn image_draw(image: Size, placement: &Placement, content: Rect) -> Option<(Rect, Rect)> {
    if image.is_empty() || content.is_empty() {
        return None;
    }
    match placement {
        Placement::Crop(area) => {
            let visible = area.rect().intersect(&Rect::from_size(image))?;
            let src = visible.centered_aspect(content.size().aspect_ratio());
            Some((src, content))
        }
        Placement::Fit(transform) => {
            if !(transform.scale.is_finite() && transform.scale > 0.0) {
                return None;
            }
            let dst = transform.footprint(image).translate(content.x, content.y);
            Some((Rect::from_size(image), dst))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FrameStyle, ShadowStyle};

    fn draw_image(plan: &CompositionPlan) -> Option<(Rect, Rect)> {
        plan.ops.iter().find_map(|op| match op {
            DrawOp::DrawImage { src, dst } => Some((*src, *dst)),
            _ => None,
        })
    }

    fn kind(op: &DrawOp) -> &'static str {
        match op {
            DrawOp::Checkerboard { .. } => "checker",
            DrawOp::Fill { .. } => "fill",
            DrawOp::Shadow { .. } => "shadow",
            DrawOp::PushClip(_) => "clip",
            DrawOp::DrawImage { .. } => "image",
            DrawOp::PopClip => "unclip",
            DrawOp::StrokeFrame { .. } => "frame",
        }
    }

    #[test]
    fn test_square_preset_from_default_crop() {
        // 4000x3000 image, 1080x1080 preset, default crop (800, 300, 2400, 2400)
        let plan = plan(
            Size::new(4000.0, 3000.0),
            &Placement::Crop(CropArea::new(800.0, 300.0, 2400.0, 2400.0)),
            &SizePreset::custom(1080, 1080),
            &StyleOptions::default(),
            &RenderTarget::export(),
        )
        .unwrap();

        assert_eq!((plan.width, plan.height), (1080, 1080));
        let (src, dst) = draw_image(&plan).unwrap();
        assert_eq!(src, Rect::new(800.0, 300.0, 2400.0, 2400.0));
        assert_eq!(dst, Rect::new(0.0, 0.0, 1080.0, 1080.0));
    }

    #[test]
    fn test_crop_is_centered_to_target_aspect() {
        let plan = plan(
            Size::new(4000.0, 3000.0),
            &Placement::Crop(CropArea::new(0.0, 0.0, 2000.0, 1000.0)),
            &SizePreset::custom(500, 500),
            &StyleOptions::default(),
            &RenderTarget::export(),
        )
        .unwrap();
        let (src, _) = draw_image(&plan).unwrap();
        assert_eq!(src, Rect::new(500.0, 0.0, 1000.0, 1000.0));
    }

    #[test]
    fn test_full_drawing_order() {
        let style = StyleOptions {
            padding: 20,
            border_radius: 16.0,
            bg_color: Color::rgba(255, 255, 255, 128),
            shadow: ShadowStyle::Spread,
            frame_style: FrameStyle::Border,
            ..StyleOptions::default()
        };
        let plan = plan(
            Size::new(800.0, 600.0),
            &Placement::Crop(CropArea::new(0.0, 0.0, 600.0, 600.0)),
            &SizePreset::custom(300, 300),
            &style,
            &RenderTarget::preview(1.0, 1.0, 8.0),
        )
        .unwrap();

        let kinds: Vec<_> = plan.ops.iter().map(kind).collect();
        assert_eq!(
            kinds,
            vec!["checker", "fill", "shadow", "clip", "image", "unclip", "frame"]
        );
    }

    #[test]
    fn test_export_omits_checker_and_defaults_are_minimal() {
        let plan = plan(
            Size::new(800.0, 600.0),
            &Placement::Crop(CropArea::new(0.0, 0.0, 600.0, 600.0)),
            &SizePreset::custom(300, 300),
            &StyleOptions::default(),
            &RenderTarget::export(),
        )
        .unwrap();
        let kinds: Vec<_> = plan.ops.iter().map(kind).collect();
        assert_eq!(kinds, vec!["clip", "image", "unclip"]);
    }

    #[test]
    fn test_opaque_background_has_no_checker_in_preview() {
        let style = StyleOptions {
            bg_color: Color::BLACK,
            ..StyleOptions::default()
        };
        let plan = plan(
            Size::new(100.0, 100.0),
            &Placement::Fit(ImageTransform::default()),
            &SizePreset::custom(50, 50),
            &style,
            &RenderTarget::preview(1.0, 1.0, 8.0),
        )
        .unwrap();
        assert!(matches!(plan.ops[0], DrawOp::Fill { .. }));
    }

    #[test]
    fn test_fit_placement_offsets_by_padding() {
        let style = StyleOptions {
            padding: 10,
            ..StyleOptions::default()
        };
        let plan = plan(
            Size::new(200.0, 100.0),
            &Placement::Fit(ImageTransform::new(-20.0, 5.0, 0.5)),
            &SizePreset::custom(80, 80),
            &style,
            &RenderTarget::preview(0.5, 2.0, 8.0),
        )
        .unwrap();
        let (src, dst) = draw_image(&plan).unwrap();
        assert_eq!(src, Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(dst, Rect::new(-10.0, 15.0, 100.0, 50.0));
    }

    #[test]
    fn test_geometry_scales_with_target() {
        let style = StyleOptions {
            padding: 10,
            border_radius: 8.0,
            ..StyleOptions::default()
        };
        let plan = plan(
            Size::new(100.0, 100.0),
            &Placement::Crop(CropArea::new(0.0, 0.0, 100.0, 100.0)),
            &SizePreset::custom(100, 50),
            &style,
            &RenderTarget::preview(0.5, 1.0, 8.0),
        )
        .unwrap();
        assert_eq!((plan.width, plan.height), (60, 35));
        let clip = plan.ops.iter().find_map(|op| match op {
            DrawOp::PushClip(shape) => Some(*shape),
            _ => None,
        });
        assert_eq!(clip, Some(RoundRect::new(Rect::new(5.0, 5.0, 50.0, 25.0), 4.0)));
    }

    #[test]
    fn test_crop_outside_image_draws_nothing() {
        let plan = plan(
            Size::new(100.0, 100.0),
            &Placement::Crop(CropArea::new(200.0, 200.0, 50.0, 50.0)),
            &SizePreset::custom(50, 50),
            &StyleOptions::default(),
            &RenderTarget::export(),
        )
        .unwrap();
        assert!(draw_image(&plan).is_none());
    }

    #[test]
    fn test_round_rect_radius_clamped() {
        let shape = RoundRect::new(Rect::new(0.0, 0.0, 40.0, 20.0), 50.0);
        assert_eq!(shape.radius, 10.0);
        let inner = shape.stroke_inset(4.0);
        assert_eq!(inner.rect, Rect::new(2.0, 2.0, 36.0, 16.0));
        assert_eq!(inner.radius, 8.0);
    }
}
