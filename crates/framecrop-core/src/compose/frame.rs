//! Shadow and frame decoration definitions.
//!
//! Both are expressed in output pixels and scaled to device pixels by the
//! planner. Frame strokes are inset by half their width so they never draw
//! outside the framed region.

use super::plan::{DrawOp, RoundRect, StrokePaint};
use crate::geometry::Point;
use crate::style::{Color, FrameStyle, ShadowStyle, StyleOptions};

/// Blur, offset and opacity of a drop shadow, in output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSpec {
    pub blur: f64,
    pub offset: Point,
    pub alpha: f64,
}

/// Shadow parameters for a style variant, `None` for [`ShadowStyle::None`].
pub fn shadow_for(style: ShadowStyle) -> Option<ShadowSpec> {
    let (blur, dy, alpha) = match style {
        ShadowStyle::None => return None,
        ShadowStyle::Spread => (30.0, 0.0, 0.35),
        ShadowStyle::Hug => (8.0, 4.0, 0.35),
        ShadowStyle::Lg => (40.0, 20.0, 0.45),
    };
    Some(ShadowSpec {
        blur,
        offset: Point::new(0.0, dy),
        alpha,
    })
}

const INSET_WIDTH: f64 = 2.0;
const OUTLINE_WIDTH: f64 = 2.0;
const HIGHLIGHT_WIDTH: f64 = 1.0;

const LIQUID_STOPS: [Color; 4] = [
    Color::rgb(0xff, 0x6e, 0xc4),
    Color::rgb(0x78, 0x73, 0xf5),
    Color::rgb(0x4a, 0xde, 0x80),
    Color::rgb(0xfa, 0xcc, 0x15),
];

/// Stroke ops for the style's frame variant around `shape` (device pixels).
/// `k` converts output pixels to device pixels.
pub fn frame_strokes(style: &StyleOptions, shape: RoundRect, k: f64) -> Vec<DrawOp> {
    let border = style.effective_border_width();
    let stroke = |width: f64, paint: StrokePaint| -> Option<DrawOp> {
        let width = width * k;
        if width <= 0.0 || shape.rect.is_empty() {
            return None;
        }
        Some(DrawOp::StrokeFrame {
            shape: shape.stroke_inset(width),
            width,
            paint,
        })
    };

    let ops = match style.frame_style {
        FrameStyle::None => vec![],
        FrameStyle::GlassLight => vec![
            stroke(border, StrokePaint::Solid(Color::WHITE.with_alpha(0.30))),
            stroke(HIGHLIGHT_WIDTH, StrokePaint::Solid(Color::WHITE.with_alpha(0.65))),
        ],
        FrameStyle::GlassDark => vec![
            stroke(border, StrokePaint::Solid(Color::BLACK.with_alpha(0.30))),
            stroke(HIGHLIGHT_WIDTH, StrokePaint::Solid(Color::WHITE.with_alpha(0.15))),
        ],
        FrameStyle::InsetLight => vec![stroke(
            INSET_WIDTH,
            StrokePaint::Solid(Color::WHITE.with_alpha(0.55)),
        )],
        FrameStyle::InsetDark => vec![stroke(
            INSET_WIDTH,
            StrokePaint::Solid(Color::BLACK.with_alpha(0.45)),
        )],
        FrameStyle::Outline => vec![stroke(OUTLINE_WIDTH, StrokePaint::Solid(style.border_color))],
        FrameStyle::Border => vec![stroke(border, StrokePaint::Solid(style.border_color))],
        FrameStyle::Liquid => {
            let last = (LIQUID_STOPS.len() - 1) as f64;
            let stops = LIQUID_STOPS
                .iter()
                .enumerate()
                .map(|(i, c)| (i as f64 / last, *c))
                .collect();
            vec![stroke(
                border,
                StrokePaint::LinearGradient {
                    start: Point::new(shape.rect.x, shape.rect.y),
                    end: Point::new(shape.rect.right(), shape.rect.bottom()),
                    stops,
                },
            )]
        }
    };
    ops.into_iter().flatten().collect()
}
