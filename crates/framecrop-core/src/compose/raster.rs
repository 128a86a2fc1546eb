//! Software renderer backed by tiny-skia.

use image::imageops;
use log::debug;
use tiny_skia as sk;

use super::plan::{CompositionPlan, DrawOp, RoundRect, StrokePaint};
use super::{ComposeError, RenderedBitmap, Renderer, SampleQuality};
use crate::decode::SourceImage;
use crate::geometry::{Point, Rect};
use crate::style::Color;

const CHECKER_LIGHT: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
const CHECKER_DARK: [u8; 4] = [0xe5, 0xe5, 0xe5, 0xff];

/// Bezier control distance for a quarter circle.
const KAPPA: f64 = 0.552_284_749_831;

/// Executes plans on a CPU pixmap.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterRenderer;

impl RasterRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for RasterRenderer {
    fn render(
        &mut self,
        plan: &CompositionPlan,
        image: &SourceImage,
    ) -> Result<RenderedBitmap, ComposeError> {
        let mut canvas = Canvas::new(plan.width, plan.height, plan.quality)?;
        for op in &plan.ops {
            match op {
                DrawOp::Checkerboard { cell } => canvas.checkerboard(*cell),
                DrawOp::Fill { color } => canvas.fill(*color),
                DrawOp::Shadow {
                    shape,
                    color,
                    blur,
                    offset,
                } => canvas.shadow(shape, *color, *blur, *offset)?,
                DrawOp::PushClip(shape) => canvas.push_clip(shape)?,
                DrawOp::DrawImage { src, dst } => canvas.draw_image(image, *src, *dst)?,
                DrawOp::PopClip => {
                    canvas.clips.pop();
                }
                DrawOp::StrokeFrame {
                    shape,
                    width,
                    paint,
                } => canvas.stroke(shape, *width, paint),
            }
        }
        Ok(RenderedBitmap::from_pixmap(&canvas.pixmap))
    }
}

struct Canvas {
    pixmap: sk::Pixmap,
    clips: Vec<sk::Mask>,
    quality: SampleQuality,
}

impl Canvas {
    fn new(width: u32, height: u32, quality: SampleQuality) -> Result<Self, ComposeError> {
        let pixmap = sk::Pixmap::new(width, height)
            .ok_or(ComposeError::SurfaceUnavailable { width, height })?;
        debug!("render surface {}x{} ({:?})", width, height, quality);
        Ok(Self {
            pixmap,
            clips: Vec::new(),
            quality,
        })
    }

    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f64, self.height() as f64)
    }

    fn new_mask(&self) -> Result<sk::Mask, ComposeError> {
        sk::Mask::new(self.width(), self.height()).ok_or(ComposeError::SurfaceUnavailable {
            width: self.width(),
            height: self.height(),
        })
    }

    fn checkerboard(&mut self, cell: f64) {
        let width = self.width() as usize;
        let cell = cell.max(1.0);
        for (i, px) in self.pixmap.data_mut().chunks_exact_mut(4).enumerate() {
            let cx = ((i % width) as f64 / cell) as u64;
            let cy = ((i / width) as f64 / cell) as u64;
            let color = if (cx + cy) % 2 == 0 {
                CHECKER_LIGHT
            } else {
                CHECKER_DARK
            };
            px.copy_from_slice(&color);
        }
    }

    fn fill(&mut self, color: Color) {
        let mut paint = sk::Paint::default();
        paint.set_color(sk_color(color));
        if let Some(rect) = sk_rect(self.bounds()) {
            self.pixmap
                .fill_rect(rect, &paint, sk::Transform::identity(), None);
        }
    }

    fn shadow(
        &mut self,
        shape: &RoundRect,
        color: Color,
        blur: f64,
        offset: Point,
    ) -> Result<(), ComposeError> {
        let Some(path) = round_rect_path(shape) else {
            return Ok(());
        };
        let mut mask = self.new_mask()?;
        mask.fill_path(
            &path,
            sk::FillRule::Winding,
            true,
            sk::Transform::from_translate(offset.x as f32, offset.y as f32),
        );
        // Canvas-style shadow blur: sigma is half the blur radius.
        blur_mask(
            mask.data_mut(),
            self.width() as usize,
            self.height() as usize,
            blur / 2.0,
        );

        let mut paint = sk::Paint::default();
        paint.set_color(sk_color(color));
        if let Some(rect) = sk_rect(self.bounds()) {
            self.pixmap
                .fill_rect(rect, &paint, sk::Transform::identity(), Some(&mask));
        }
        Ok(())
    }

    fn push_clip(&mut self, shape: &RoundRect) -> Result<(), ComposeError> {
        let mut mask = self.new_mask()?;
        if let Some(path) = round_rect_path(shape) {
            mask.fill_path(&path, sk::FillRule::Winding, true, sk::Transform::identity());
        }
        if let Some(outer) = self.clips.last() {
            for (a, b) in mask.data_mut().iter_mut().zip(outer.data()) {
                *a = ((*a as u32 * *b as u32 + 127) / 255) as u8;
            }
        }
        self.clips.push(mask);
        Ok(())
    }

    /// Draw `src` (source pixels) into `dst` (device pixels).
    ///
    /// Only the part of `src` that lands on the surface is copied out of the
    /// source, and sampling never reads outside `src`.
    fn draw_image(
        &mut self,
        image: &SourceImage,
        src: Rect,
        dst: Rect,
    ) -> Result<(), ComposeError> {
        if src.is_empty() || dst.is_empty() {
            return Ok(());
        }
        let Some(visible) = dst.intersect(&self.bounds()) else {
            return Ok(());
        };
        let Some(bounds) = src.intersect(&Rect::from_size(image.size())) else {
            return Ok(());
        };

        let ax = dst.width / src.width;
        let ay = dst.height / src.height;
        const FILTER_PAD: f64 = 2.0;

        let x0 = (src.x + (visible.x - dst.x) / ax - FILTER_PAD)
            .floor()
            .max(bounds.x.floor());
        let y0 = (src.y + (visible.y - dst.y) / ay - FILTER_PAD)
            .floor()
            .max(bounds.y.floor());
        let x1 = (src.x + (visible.right() - dst.x) / ax + FILTER_PAD)
            .ceil()
            .min(bounds.right().ceil());
        let y1 = (src.y + (visible.bottom() - dst.y) / ay + FILTER_PAD)
            .ceil()
            .min(bounds.bottom().ceil());
        if x1 <= x0 || y1 <= y0 {
            return Ok(());
        }

        let (cw, ch) = ((x1 - x0) as u32, (y1 - y0) as u32);
        let mut tile = imageops::crop_imm(image.as_rgba(), x0 as u32, y0 as u32, cw, ch).to_image();

        // Shrink ahead of sampling so minification uses the proper filter.
        let tw = ((cw as f64) * ax.min(1.0)).round().max(1.0) as u32;
        let th = ((ch as f64) * ay.min(1.0)).round().max(1.0) as u32;
        if tw != cw || th != ch {
            tile = imageops::resize(&tile, tw, th, self.quality.resize_filter());
        }

        let Some(texture) = premultiplied_pixmap(&tile) else {
            return Err(ComposeError::SurfaceUnavailable {
                width: tw,
                height: th,
            });
        };

        let sx = ax * cw as f64 / tw as f64;
        let sy = ay * ch as f64 / th as f64;
        let tx = dst.x + (x0 - src.x) * ax;
        let ty = dst.y + (y0 - src.y) * ay;
        let filter = match self.quality {
            SampleQuality::Preview => sk::FilterQuality::Bilinear,
            SampleQuality::Export => sk::FilterQuality::Bicubic,
        };

        let mut paint = sk::Paint::default();
        paint.shader = sk::Pattern::new(
            texture.as_ref(),
            sk::SpreadMode::Pad,
            filter,
            1.0,
            sk::Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, tx as f32, ty as f32),
        );

        if let Some(rect) = sk_rect(visible) {
            self.pixmap.fill_rect(
                rect,
                &paint,
                sk::Transform::identity(),
                self.clips.last(),
            );
        }
        Ok(())
    }

    fn stroke(&mut self, shape: &RoundRect, width: f64, paint: &StrokePaint) {
        let Some(path) = round_rect_path(shape) else {
            return;
        };
        let mut sk_paint = sk::Paint::default();
        match paint {
            StrokePaint::Solid(color) => sk_paint.set_color(sk_color(*color)),
            StrokePaint::LinearGradient { start, end, stops } => {
                let gradient_stops = stops
                    .iter()
                    .map(|(pos, color)| sk::GradientStop::new(*pos as f32, sk_color(*color)))
                    .collect();
                match sk::LinearGradient::new(
                    sk::Point::from_xy(start.x as f32, start.y as f32),
                    sk::Point::from_xy(end.x as f32, end.y as f32),
                    gradient_stops,
                    sk::SpreadMode::Pad,
                    sk::Transform::identity(),
                ) {
                    Some(shader) => sk_paint.shader = shader,
                    None => {
                        // Degenerate gradient: use the first stop as a solid color
                        let color = stops.first().map(|(_, c)| *c).unwrap_or(Color::WHITE);
                        sk_paint.set_color(sk_color(color));
                    }
                }
            }
        }
        let stroke = sk::Stroke {
            width: width as f32,
            ..sk::Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &sk_paint, &stroke, sk::Transform::identity(), None);
    }
}

fn sk_color(color: Color) -> sk::Color {
    sk::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn sk_rect(rect: Rect) -> Option<sk::Rect> {
    sk::Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

/// Closed path for a rounded rectangle. `None` for empty shapes.
fn round_rect_path(shape: &RoundRect) -> Option<sk::Path> {
    let r = shape.rect;
    if r.is_empty() {
        return None;
    }
    if shape.radius <= 0.0 {
        return sk_rect(r).map(sk::PathBuilder::from_rect);
    }

    let rad = shape.radius;
    let c = rad * (1.0 - KAPPA);
    let (l, t, rt, b) = (r.x, r.y, r.right(), r.bottom());
    let f = |v: f64| v as f32;

    let mut pb = sk::PathBuilder::new();
    pb.move_to(f(l + rad), f(t));
    pb.line_to(f(rt - rad), f(t));
    pb.cubic_to(f(rt - c), f(t), f(rt), f(t + c), f(rt), f(t + rad));
    pb.line_to(f(rt), f(b - rad));
    pb.cubic_to(f(rt), f(b - c), f(rt - c), f(b), f(rt - rad), f(b));
    pb.line_to(f(l + rad), f(b));
    pb.cubic_to(f(l + c), f(b), f(l), f(b - c), f(l), f(b - rad));
    pb.line_to(f(l), f(t + rad));
    pb.cubic_to(f(l), f(t + c), f(l + c), f(t), f(l + rad), f(t));
    pb.close();
    pb.finish()
}

/// Convert straight RGBA to a premultiplied tiny-skia pixmap.
fn premultiplied_pixmap(tile: &image::RgbaImage) -> Option<sk::Pixmap> {
    let size = sk::IntSize::from_wh(tile.width(), tile.height())?;
    let mut data = Vec::with_capacity(tile.as_raw().len());
    for px in tile.pixels() {
        let p = sk::ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
    sk::Pixmap::from_vec(data, size)
}

/// Approximate a gaussian blur of `sigma` with three box passes.
fn blur_mask(data: &mut [u8], width: usize, height: usize, sigma: f64) {
    if !sigma.is_finite() || sigma < 0.5 || width == 0 || height == 0 {
        return;
    }
    let ideal = (12.0 * sigma * sigma / 3.0 + 1.0).sqrt();
    let radius = ((ideal - 1.0) / 2.0).round().max(1.0) as usize;

    let mut scratch = vec![0u8; data.len()];
    for _ in 0..3 {
        box_blur(data, &mut scratch, width, height, radius, Axis::Horizontal);
        box_blur(&scratch, data, width, height, radius, Axis::Vertical);
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One running-sum box pass. Samples outside the surface count as zero.
fn box_blur(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize, axis: Axis) {
    let (lines, len, step, stride) = match axis {
        Axis::Horizontal => (height, width, width, 1),
        Axis::Vertical => (width, height, 1, width),
    };
    let window = (2 * radius + 1) as u32;

    for line in 0..lines {
        let base = line * step;
        let at = |i: usize| src[base + i * stride] as u32;

        let mut sum: u32 = (0..=radius.min(len - 1)).map(at).sum();
        for i in 0..len {
            dst[base + i * stride] = ((sum + window / 2) / window) as u8;
            if i + radius + 1 < len {
                sum += at(i + radius + 1);
            }
            if i >= radius {
                sum -= at(i - radius);
            }
        }
    }
}
