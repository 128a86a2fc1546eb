//! Crop-window controller.
//!
//! The crop rectangle lives in source-image pixel space and is replaced
//! wholesale on every interaction tick. Every function here takes the current
//! [`CropArea`] and returns a new one that satisfies the crop invariants:
//!
//! - `x >= 0`, `y >= 0`
//! - `x + width <= image.width`, `y + height <= image.height`
//! - `width >= min`, `height >= min` (min is clamped to the image size)
//!
//! Resizing is corner-anchored: the corner opposite the dragged handle never
//! moves. With a locked aspect ratio the rectangle is shrunk, ratio preserved,
//! whenever the raw resize would leave the image.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::geometry::{Point, Rect, Size};

/// Crop rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One of the four corner handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    /// Handles in `[nw, ne, sw, se]` order, matching [`Rect::corners`].
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];

    pub fn opposite(self) -> Handle {
        match self {
            Handle::Nw => Handle::Se,
            Handle::Ne => Handle::Sw,
            Handle::Sw => Handle::Ne,
            Handle::Se => Handle::Nw,
        }
    }

    /// Direction the handle moves away from its anchor: `+1` for east/south,
    /// `-1` for west/north.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Handle::Nw => (-1.0, -1.0),
            Handle::Ne => (1.0, -1.0),
            Handle::Sw => (-1.0, 1.0),
            Handle::Se => (1.0, 1.0),
        }
    }

    /// Position of this handle's corner on `rect`.
    pub fn corner_of(self, rect: &Rect) -> Point {
        let corners = rect.corners();
        match self {
            Handle::Nw => corners[0],
            Handle::Ne => corners[1],
            Handle::Sw => corners[2],
            Handle::Se => corners[3],
        }
    }
}

/// What a pointer-down would grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHit {
    Handle(Handle),
    Inside,
}

impl CropArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }

    /// Default crop: a centered square whose side is
    /// `default_crop_fraction` of the image's shorter side.
    pub fn default_for(image: Size, config: &EngineConfig) -> Self {
        let side = image.min_side() * config.default_crop_fraction.clamp(0.0, 1.0);
        let (min_w, min_h) = config.min_crop_for(image.width, image.height);
        let w = side.max(min_w).min(image.width);
        let h = side.max(min_h).min(image.height);
        Self::from_rect(Rect::centered_at(
            Rect::from_size(image).center(),
            Size::new(w, h),
        ))
    }

    /// Largest rectangle of `ratio` scaled by `default_crop_fraction`,
    /// centered on `center` and pushed back inside the image.
    pub fn with_ratio(image: Size, ratio: f64, center: Point, config: &EngineConfig) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Self::default_for(image, config);
        }
        let fraction = config.default_crop_fraction.clamp(0.0, 1.0);
        let mut w = image.width.min(image.height * ratio) * fraction;
        let mut h = w / ratio;

        let (min_w, min_h) = config.min_crop_for(image.width, image.height);
        if w < min_w {
            w = min_w;
            h = w / ratio;
        }
        if h < min_h {
            h = min_h;
            w = h * ratio;
        }
        let shrink = (image.width / w).min(image.height / h).min(1.0);
        w *= shrink;
        h *= shrink;

        let rect = Rect::centered_at(center, Size::new(w, h));
        Self::new(
            rect.x.clamp(0.0, (image.width - w).max(0.0)),
            rect.y.clamp(0.0, (image.height - h).max(0.0)),
            w,
            h,
        )
    }

    /// Whether the area satisfies the bounds invariant for `image`.
    pub fn is_within(&self, image: Size) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= image.width + EPS
            && self.y + self.height <= image.height + EPS
    }

    /// Clamp an arbitrary rectangle into the image, honoring the minimum size.
    pub fn clamped(self, image: Size, config: &EngineConfig) -> Self {
        let (min_w, min_h) = config.min_crop_for(image.width, image.height);
        let w = self.width.max(min_w).min(image.width);
        let h = self.height.max(min_h).min(image.height);
        Self::new(
            self.x.clamp(0.0, (image.width - w).max(0.0)),
            self.y.clamp(0.0, (image.height - h).max(0.0)),
            w,
            h,
        )
    }

    /// Integer pixel rectangle covered by this area, clamped to the image.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let x = (self.x.round().max(0.0) as u32).min(image_width.saturating_sub(1));
        let y = (self.y.round().max(0.0) as u32).min(image_height.saturating_sub(1));
        let w = (self.width.round().max(1.0) as u32).min(image_width - x);
        let h = (self.height.round().max(1.0) as u32).min(image_height - y);
        (x, y, w, h)
    }
}

/// Hit-test a pointer in image space against the crop area.
///
/// Corners win over the interior. `tolerance` is in image pixels; callers
/// convert it from screen pixels so the hit target is constant on screen.
pub fn hit_test(area: &CropArea, pointer: Point, tolerance: f64) -> Option<CropHit> {
    let rect = area.rect();
    for handle in Handle::ALL {
        if pointer.distance(handle.corner_of(&rect)) <= tolerance {
            return Some(CropHit::Handle(handle));
        }
    }
    if rect.contains(pointer) {
        Some(CropHit::Inside)
    } else {
        None
    }
}

/// Move the area so its origin sits at `pointer - offset`, clamped per axis
/// to keep the whole rectangle inside the image.
pub fn move_area(area: &CropArea, pointer: Point, offset: Point, image: Size) -> CropArea {
    let max_x = (image.width - area.width).max(0.0);
    let max_y = (image.height - area.height).max(0.0);
    CropArea::new(
        (pointer.x - offset.x).clamp(0.0, max_x),
        (pointer.y - offset.y).clamp(0.0, max_y),
        area.width,
        area.height,
    )
}

/// Resize from `handle` by the pointer delta `current - previous`.
///
/// The opposite corner is the anchor. Without a ratio each side is floored
/// at the minimum and capped by the space between the anchor and the image
/// edge. With a `ratio` the side that moved most drives the other one, and
/// the result is shrunk uniformly until it fits.
pub fn resize_area(
    area: &CropArea,
    handle: Handle,
    previous: Point,
    current: Point,
    ratio: Option<f64>,
    image: Size,
    config: &EngineConfig,
) -> CropArea {
    let rect = area.rect();
    let anchor = handle.opposite().corner_of(&rect);
    let (sx, sy) = handle.direction();
    let (dx, dy) = current.delta(previous);
    let (min_w, min_h) = config.min_crop_for(image.width, image.height);

    let max_w = if sx > 0.0 { image.width - anchor.x } else { anchor.x }.max(0.0);
    let max_h = if sy > 0.0 { image.height - anchor.y } else { anchor.y }.max(0.0);

    let mut w = area.width + sx * dx;
    let mut h = area.height + sy * dy;

    match ratio.filter(|r| r.is_finite() && *r > 0.0) {
        None => {
            w = w.max(min_w).min(max_w);
            h = h.max(min_h).min(max_h);
        }
        Some(r) => {
            if dx.abs() >= dy.abs() {
                h = w / r;
            } else {
                w = h * r;
            }
            if w < min_w {
                w = min_w;
                h = w / r;
            }
            if h < min_h {
                h = min_h;
                w = h * r;
            }
            let shrink = (max_w / w).min(max_h / h).min(1.0);
            w *= shrink;
            h *= shrink;
        }
    }

    let x = if sx > 0.0 { anchor.x } else { anchor.x - w };
    let y = if sy > 0.0 { anchor.y } else { anchor.y - h };
    CropArea::new(x.max(0.0), y.max(0.0), w, h)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
