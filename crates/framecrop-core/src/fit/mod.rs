//! Image-Fit controller.
//!
//! In this mode the crop window is fixed and the source image moves
//! underneath it. The window's local frame has its origin at the window's
//! top-left corner and is measured in output pixels, so an [`ImageTransform`]
//! can be handed to the compositor unchanged at any preview resolution.
//!
//! # Coordinate System
//!
//! - `x`, `y`: top-left of the scaled image in window-local output pixels
//! - `scale`: output pixels per source pixel (`1.0` = 100%)
//!
//! Under-fill is allowed: the image may be scaled or panned so that part of
//! the window is left uncovered, showing the background. Only the global
//! minimum scale is enforced.

mod snap;

pub use snap::{snap, SnapGuides};

use serde::{Deserialize, Serialize};

use crate::crop::Handle;
use crate::geometry::{Point, Rect, Size};

/// Position and uniform scale of the source image inside the fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// What a pointer-down would grab in Image-Fit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitHit {
    Handle(Handle),
    Inside,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ImageTransform {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Rectangle the scaled image covers in window-local units.
    pub fn footprint(&self, image: Size) -> Rect {
        Rect::new(
            self.x,
            self.y,
            image.width * self.scale,
            image.height * self.scale,
        )
    }

    /// Image at `scale`, centered in the window.
    pub fn centered(image: Size, window: Size, scale: f64) -> Self {
        let size = image.scaled(scale);
        Self::new(
            (window.width - size.width) / 2.0,
            (window.height - size.height) / 2.0,
            scale,
        )
    }

    /// Smallest centered scale at which the image covers the whole window.
    pub fn cover(image: Size, window: Size) -> Self {
        Self::centered(image, window, cover_scale(image, window))
    }

    /// Largest centered scale at which the whole image fits in the window.
    pub fn contain(image: Size, window: Size) -> Self {
        Self::centered(image, window, contain_scale(image, window))
    }
}

fn cover_scale(image: Size, window: Size) -> f64 {
    if image.is_empty() || window.is_empty() {
        return 1.0;
    }
    (window.width / image.width).max(window.height / image.height)
}

fn contain_scale(image: Size, window: Size) -> f64 {
    if image.is_empty() || window.is_empty() {
        return 1.0;
    }
    (window.width / image.width).min(window.height / image.height)
}

/// Hit-test a window-local pointer against the image footprint.
pub fn hit_test(
    transform: &ImageTransform,
    image: Size,
    pointer: Point,
    tolerance: f64,
) -> Option<FitHit> {
    let footprint = transform.footprint(image);
    for handle in Handle::ALL {
        if pointer.distance(handle.corner_of(&footprint)) <= tolerance {
            return Some(FitHit::Handle(handle));
        }
    }
    if footprint.contains(pointer) {
        Some(FitHit::Inside)
    } else {
        None
    }
}

/// Pan: the drag-start transform moved by the total pointer travel.
///
/// Summing from the drag origin instead of the previous tick keeps snapping
/// from accumulating: the raw position is always `origin + travel`.
pub fn pan(origin: &ImageTransform, start: Point, current: Point) -> ImageTransform {
    let (dx, dy) = current.delta(start);
    ImageTransform::new(origin.x + dx, origin.y + dy, origin.scale)
}

/// Resize by dragging `handle` to `pointer`, keeping `anchor` (the opposite
/// corner, captured at drag start) fixed.
///
/// The new scale is the larger of the horizontal and vertical extents from
/// the anchor over the image's natural size, floored at `min_scale`.
pub fn resize_anchored(
    handle: Handle,
    anchor: Point,
    pointer: Point,
    image: Size,
    min_scale: f64,
) -> ImageTransform {
    let (sx, sy) = handle.direction();
    let extent_w = (pointer.x - anchor.x) * sx;
    let extent_h = (pointer.y - anchor.y) * sy;

    let by_width = if image.width > 0.0 { extent_w / image.width } else { 0.0 };
    let by_height = if image.height > 0.0 { extent_h / image.height } else { 0.0 };
    let scale = by_width.max(by_height).max(min_scale.max(f64::MIN_POSITIVE));

    let size = image.scaled(scale);
    let x = if sx > 0.0 { anchor.x } else { anchor.x - size.width };
    let y = if sy > 0.0 { anchor.y } else { anchor.y - size.height };
    ImageTransform::new(x, y, scale)
}

/// Scale by `factor` around `pivot` (window-local), floored at `min_scale`.
pub fn zoom_at(
    transform: &ImageTransform,
    pivot: Point,
    factor: f64,
    min_scale: f64,
) -> ImageTransform {
    if !factor.is_finite() || factor <= 0.0 {
        return *transform;
    }
    let scale = (transform.scale * factor).max(min_scale.max(f64::MIN_POSITIVE));
    let applied = scale / transform.scale;
    ImageTransform::new(
        pivot.x - (pivot.x - transform.x) * applied,
        pivot.y - (pivot.y - transform.y) * applied,
        scale,
    )
}

/// Recenter without changing scale.
pub fn center(transform: &ImageTransform, image: Size, window: Size) -> ImageTransform {
    ImageTransform::centered(image, window, transform.scale)
}

/// Scale so the image fully covers the window, centered.
pub fn fill(image: Size, window: Size) -> ImageTransform {
    ImageTransform::cover(image, window)
}

/// Scale so the whole image is visible inside the window, centered.
pub fn fit(image: Size, window: Size) -> ImageTransform {
    ImageTransform::contain(image, window)
}

/// 100%: one output pixel per source pixel, centered.
pub fn actual_size(image: Size, window: Size) -> ImageTransform {
    ImageTransform::centered(image, window, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Size = Size {
        width: 4000.0,
        height: 3000.0,
    };
    const WINDOW: Size = Size {
        width: 1080.0,
        height: 1080.0,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cover_fills_window() {
        let t = ImageTransform::cover(IMAGE, WINDOW);
        assert!(close(t.scale, 0.36));
        let fp = t.footprint(IMAGE);
        assert!(fp.x <= 0.0 && fp.right() >= WINDOW.width - 1e-9);
        assert!(close(fp.y, 0.0) && close(fp.bottom(), 1080.0));
        assert!(close(fp.center().x, 540.0));
    }

    #[test]
    fn test_contain_fits_window() {
        let t = ImageTransform::contain(IMAGE, WINDOW);
        assert!(close(t.scale, 0.27));
        let fp = t.footprint(IMAGE);
        assert!(close(fp.width, 1080.0));
        assert!(close(fp.center().y, 540.0));
    }

    #[test]
    fn test_actual_size_centered() {
        let t = actual_size(IMAGE, WINDOW);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.x, (1080.0 - 4000.0) / 2.0);
    }

    #[test]
    fn test_center_keeps_scale() {
        let t = ImageTransform::new(-300.0, 17.0, 0.5);
        let c = center(&t, IMAGE, WINDOW);
        assert_eq!(c.scale, 0.5);
        assert_eq!(c.footprint(IMAGE).center(), Point::new(540.0, 540.0));
    }

    #[test]
    fn test_hit_test_handles_and_inside() {
        let t = ImageTransform::new(0.0, 0.0, 0.25);
        assert_eq!(
            hit_test(&t, IMAGE, Point::new(1001.0, 749.0), 10.0),
            Some(FitHit::Handle(Handle::Se))
        );
        assert_eq!(
            hit_test(&t, IMAGE, Point::new(500.0, 300.0), 10.0),
            Some(FitHit::Inside)
        );
        assert_eq!(hit_test(&t, IMAGE, Point::new(1100.0, 300.0), 10.0), None);
    }

    #[test]
    fn test_pan_accumulates_from_origin() {
        let origin = ImageTransform::new(10.0, 20.0, 0.5);
        let t = pan(&origin, Point::new(100.0, 100.0), Point::new(130.0, 90.0));
        assert_eq!(t, ImageTransform::new(40.0, 10.0, 0.5));
    }

    #[test]
    fn test_resize_se_keeps_nw() {
        let t = ImageTransform::new(-100.0, -50.0, 0.3);
        let anchor = Handle::Nw.corner_of(&t.footprint(IMAGE));
        let out = resize_anchored(Handle::Se, anchor, Point::new(1500.0, 600.0), IMAGE, 0.1);
        assert_eq!((out.x, out.y), (-100.0, -50.0));
        // Width extent 1600 / 4000 beats height extent 650 / 3000
        assert!(close(out.scale, 0.4));
    }

    #[test]
    fn test_resize_nw_keeps_se() {
        let t = ImageTransform::new(0.0, 0.0, 0.3);
        let anchor = Handle::Se.corner_of(&t.footprint(IMAGE));
        let out = resize_anchored(Handle::Nw, anchor, Point::new(-200.0, 0.0), IMAGE, 0.1);
        let se = Handle::Se.corner_of(&out.footprint(IMAGE));
        assert!(se.distance(anchor) < 1e-9);
        assert!(close(out.scale, 0.35));
    }

    #[test]
    fn test_resize_respects_min_scale() {
        let anchor = Point::new(500.0, 500.0);
        let out = resize_anchored(Handle::Se, anchor, Point::new(0.0, 0.0), IMAGE, 0.1);
        assert_eq!(out.scale, 0.1);
        assert_eq!((out.x, out.y), (500.0, 500.0));
    }

    #[test]
    fn test_zoom_at_keeps_pivot_fixed() {
        let t = ImageTransform::new(-100.0, 40.0, 0.5);
        let pivot = Point::new(300.0, 200.0);
        // Image pixel under the pivot before zooming
        let before = ((pivot.x - t.x) / t.scale, (pivot.y - t.y) / t.scale);
        let z = zoom_at(&t, pivot, 1.1, 0.1);
        let after = ((pivot.x - z.x) / z.scale, (pivot.y - z.y) / z.scale);
        assert!(close(before.0, after.0));
        assert!(close(before.1, after.1));
        assert!(close(z.scale, 0.55));
    }

    #[test]
    fn test_zoom_floor() {
        let t = ImageTransform::new(0.0, 0.0, 0.11);
        let z = zoom_at(&t, Point::ZERO, 0.5, 0.1);
        assert_eq!(z.scale, 0.1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
