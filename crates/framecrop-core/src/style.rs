//! Visual framing options applied around the cropped image.
//!
//! [`StyleOptions`] is pure configuration: it carries no behavior beyond
//! being read by the compositor. Field names serialize in camelCase and the
//! variant names in kebab-case (`glass-light`, `inset-dark`, ...), so style
//! objects can be passed straight through from a JavaScript host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha replaced by `alpha` (0.0 to 1.0).
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `transparent`, `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)` and `rgba(r, g, b, a)` with `a` in 0..=1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let err = || ColorParseError(trimmed.to_string());

        match lower.as_str() {
            "transparent" | "" => return Ok(Color::TRANSPARENT),
            "white" => return Ok(Color::WHITE),
            "black" => return Ok(Color::BLACK),
            _ => {}
        }

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }

        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = body.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(err());
            }
            let channel = |p: &str| {
                p.parse::<f64>()
                    .ok()
                    .map(|v| v.clamp(0.0, 255.0).round() as u8)
            };
            let r = channel(parts[0]).ok_or_else(err)?;
            let g = channel(parts[1]).ok_or_else(err)?;
            let b = channel(parts[2]).ok_or_else(err)?;
            let a = match parts.get(3) {
                Some(p) => p.parse::<f64>().map_err(|_| err())?,
                None => 1.0,
            };
            return Ok(Color::rgb(r, g, b).with_alpha(a));
        }

        Err(err())
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_transparent() {
            write!(f, "transparent")
        } else if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Drop shadow drawn beneath the framed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowStyle {
    #[default]
    None,
    /// Soft, centered, no offset.
    Spread,
    /// Tight with a small downward offset.
    Hug,
    /// Large blur with a larger offset.
    Lg,
}

/// Decoration stroked along the rounded frame after the image is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameStyle {
    #[default]
    None,
    GlassLight,
    GlassDark,
    InsetLight,
    InsetDark,
    Outline,
    Border,
    /// Multi-color gradient stroke. Animated in a live UI, static when exported.
    Liquid,
}

impl FrameStyle {
    /// All variants in their canonical order.
    pub const ALL: [FrameStyle; 8] = [
        FrameStyle::None,
        FrameStyle::GlassLight,
        FrameStyle::GlassDark,
        FrameStyle::InsetLight,
        FrameStyle::InsetDark,
        FrameStyle::Outline,
        FrameStyle::Border,
        FrameStyle::Liquid,
    ];
}

/// Visual framing for a composed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOptions {
    /// Space added on every side of the preset size, in output pixels.
    pub padding: u32,
    /// Corner radius of the image frame, in output pixels.
    pub border_radius: f64,
    pub bg_color: Color,
    pub shadow: ShadowStyle,
    pub frame_style: FrameStyle,
    /// Stroke width for frame variants that use it, in output pixels.
    pub border_width: f64,
    pub border_color: Color,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            padding: 0,
            border_radius: 0.0,
            bg_color: Color::TRANSPARENT,
            shadow: ShadowStyle::None,
            frame_style: FrameStyle::None,
            border_width: 15.0,
            border_color: Color::WHITE,
        }
    }
}

impl StyleOptions {
    /// Full output size for a preset of `content` size: content plus padding
    /// on both sides.
    pub fn output_size(&self, content_width: u32, content_height: u32) -> (u32, u32) {
        (
            content_width.saturating_add(self.padding.saturating_mul(2)),
            content_height.saturating_add(self.padding.saturating_mul(2)),
        )
    }

    /// Corner radius clamped to `[0, min(w, h) / 2]` of the framed region.
    pub fn effective_radius(&self, content: Size) -> f64 {
        let max = (content.min_side() / 2.0).max(0.0);
        if self.border_radius.is_finite() {
            self.border_radius.clamp(0.0, max)
        } else {
            0.0
        }
    }

    /// Border width clamped to a non-negative finite value.
    pub fn effective_border_width(&self) -> f64 {
        if self.border_width.is_finite() {
            self.border_width.max(0.0)
        } else {
            0.0
        }
    }

    /// Whether any part of the output can remain see-through.
    pub fn has_transparent_background(&self) -> bool {
        !self.bg_color.is_opaque()
    }
}
