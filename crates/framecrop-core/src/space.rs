//! Coordinate conversion between pointer, canvas and model space.
//!
//! Three spaces are involved in every interaction:
//!
//! - **Pointer space**: client coordinates as reported by input events.
//! - **Canvas space**: the drawing surface's logical coordinate system. The
//!   surface may be displayed at a different size than its logical size (CSS
//!   scaling), so pointer deltas are rescaled by `logical / displayed`.
//! - **Model space**: what the active controller manipulates. In crop-window
//!   mode this is source-image pixels; in Image-Fit mode it is the fixed crop
//!   window's local frame, measured in output pixels.
//!
//! Canvas and model space are related by a [`ModelFrame`]: `canvas = origin +
//! model * scale`. In crop-window mode the frame is `(0, 0)` with the
//! fit-to-container `display_scale`; in Image-Fit mode it is the window's
//! on-canvas origin with the effective render scale.
//!
//! A [`SpaceMapper`] is a plain value. Build a new one after every container
//! resize instead of mutating an old one.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Placement of the drawing surface on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    /// Top-left corner of the displayed surface in client coordinates.
    pub client_origin: Point,
    /// Size the surface occupies on screen.
    pub displayed: Size,
    /// Size of the surface's logical drawing coordinate system.
    pub logical: Size,
    /// Backing-store pixels per logical unit.
    pub device_pixel_ratio: f64,
}

impl Surface {
    /// Surface whose displayed and logical sizes agree.
    pub fn new(client_origin: Point, size: Size, device_pixel_ratio: f64) -> Self {
        Self {
            client_origin,
            displayed: size,
            logical: size,
            device_pixel_ratio: sanitize_ratio(device_pixel_ratio),
        }
    }

    /// Backing-store size in physical pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let dpr = sanitize_ratio(self.device_pixel_ratio);
        (
            (self.logical.width * dpr).round().max(1.0) as u32,
            (self.logical.height * dpr).round().max(1.0) as u32,
        )
    }

    fn css_scale(&self) -> (f64, f64) {
        let sx = if self.displayed.width > 0.0 {
            self.logical.width / self.displayed.width
        } else {
            1.0
        };
        let sy = if self.displayed.height > 0.0 {
            self.logical.height / self.displayed.height
        } else {
            1.0
        };
        (sx, sy)
    }
}

/// Affine relation `canvas = origin + model * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelFrame {
    pub origin: Point,
    pub scale: f64,
}

impl ModelFrame {
    pub fn new(origin: Point, scale: f64) -> Self {
        Self {
            origin,
            scale: sanitize_ratio(scale),
        }
    }

    /// Frame used in crop-window mode: image pixels scaled by `display_scale`.
    pub fn image(display_scale: f64) -> Self {
        Self::new(Point::ZERO, display_scale)
    }
}

/// Pure pointer/canvas/model converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceMapper {
    pub surface: Surface,
    pub frame: ModelFrame,
}

impl SpaceMapper {
    pub fn new(surface: Surface, frame: ModelFrame) -> Self {
        Self { surface, frame }
    }

    /// Client coordinates to canvas (logical) coordinates.
    pub fn pointer_to_canvas(&self, client_x: f64, client_y: f64) -> Point {
        let (sx, sy) = self.surface.css_scale();
        Point::new(
            (client_x - self.surface.client_origin.x) * sx,
            (client_y - self.surface.client_origin.y) * sy,
        )
    }

    /// Canvas coordinates back to client coordinates.
    pub fn canvas_to_pointer(&self, canvas: Point) -> Point {
        let (sx, sy) = self.surface.css_scale();
        Point::new(
            canvas.x / sx + self.surface.client_origin.x,
            canvas.y / sy + self.surface.client_origin.y,
        )
    }

    /// Pointer position to model space (image pixels or window-local units).
    pub fn to_image_space(&self, client_x: f64, client_y: f64) -> Point {
        let c = self.pointer_to_canvas(client_x, client_y);
        Point::new(
            (c.x - self.frame.origin.x) / self.frame.scale,
            (c.y - self.frame.origin.y) / self.frame.scale,
        )
    }

    /// Model-space point to canvas coordinates.
    pub fn to_canvas_space(&self, model: Point) -> Point {
        Point::new(
            self.frame.origin.x + model.x * self.frame.scale,
            self.frame.origin.y + model.y * self.frame.scale,
        )
    }

    pub fn rect_to_canvas(&self, model: Rect) -> Rect {
        let p = self.to_canvas_space(Point::new(model.x, model.y));
        Rect::new(
            p.x,
            p.y,
            model.width * self.frame.scale,
            model.height * self.frame.scale,
        )
    }

    /// Convert a length in screen pixels to model units.
    ///
    /// Used for hit tolerances and snap thresholds so they stay constant on
    /// screen at any zoom level.
    pub fn screen_to_model_len(&self, screen: f64) -> f64 {
        let (sx, sy) = self.surface.css_scale();
        screen * sx.max(sy) / self.frame.scale
    }
}

/// Fit-to-container scale for showing an image inside a container.
pub fn display_scale(image: Size, container: Size) -> f64 {
    if image.is_empty() || container.is_empty() {
        return 1.0;
    }
    (container.width / image.width).min(container.height / image.height)
}

/// Layout of the fixed crop window inside the canvas in Image-Fit mode.
///
/// The window keeps the output aspect ratio and leaves `padding` canvas units
/// free on its tighter axis, so corners of an image overhanging the window
/// can still be grabbed.
pub fn fit_window_frame(canvas: Size, output: Size, padding: f64) -> ModelFrame {
    if output.is_empty() || canvas.is_empty() {
        return ModelFrame::new(Point::ZERO, 1.0);
    }
    let avail_w = (canvas.width - 2.0 * padding).max(1.0);
    let avail_h = (canvas.height - 2.0 * padding).max(1.0);
    let scale = (avail_w / output.width).min(avail_h / output.height);
    let origin = Point::new(
        (canvas.width - output.width * scale) / 2.0,
        (canvas.height - output.height * scale) / 2.0,
    );
    ModelFrame::new(origin, scale)
}

fn sanitize_ratio(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}
