//! Snap guides for panning in Image-Fit mode.
//!
//! While the image is panned, its center and edges are compared against the
//! fixed window's center and edges. Per axis, the center wins whenever it is
//! within the threshold; otherwise the closest edge within the threshold does.
//! The image is then moved so it lines up exactly. Guides are purely visual and
//! never influence resizing.

use serde::{Deserialize, Serialize};

use super::ImageTransform;
use crate::geometry::Size;

/// Alignment indicators shown while dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapGuides {
    /// Image center lies on the window's vertical center line.
    pub center_x: bool,
    /// Image center lies on the window's horizontal center line.
    pub center_y: bool,
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl SnapGuides {
    pub fn any(&self) -> bool {
        self.center_x || self.center_y || self.left || self.right || self.top || self.bottom
    }
}

/// Snap candidates along one axis, as `(image position, window position)`.
struct AxisCandidates {
    start: (f64, f64),
    center: (f64, f64),
    end: (f64, f64),
}

/// Which candidates ended up aligned after snapping one axis.
struct AxisSnap {
    shift: f64,
    start: bool,
    center: bool,
    end: bool,
}

fn snap_axis(c: AxisCandidates, threshold: f64) -> AxisSnap {
    let deltas = [c.center.1 - c.center.0, c.start.1 - c.start.0, c.end.1 - c.end.0];

    let shift = if deltas[0].abs() <= threshold {
        deltas[0]
    } else {
        deltas[1..]
            .iter()
            .copied()
            .filter(|d| d.abs() <= threshold)
            .min_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0)
    };

    // Candidates that coincide after the shift are all reported.
    const EPS: f64 = 1e-6;
    let aligned = |d: f64| threshold > 0.0 && (d - shift).abs() <= EPS && d.abs() <= threshold;
    AxisSnap {
        shift,
        center: aligned(deltas[0]),
        start: aligned(deltas[1]),
        end: aligned(deltas[2]),
    }
}

/// Snap `transform` against a window of size `window` (local frame origin at
/// the window's top-left). `threshold` is in window-local units.
pub fn snap(
    transform: ImageTransform,
    image: Size,
    window: Size,
    threshold: f64,
) -> (ImageTransform, SnapGuides) {
    let footprint = transform.footprint(image);

    let x = snap_axis(
        AxisCandidates {
            start: (footprint.x, 0.0),
            center: (footprint.center().x, window.width / 2.0),
            end: (footprint.right(), window.width),
        },
        threshold,
    );
    let y = snap_axis(
        AxisCandidates {
            start: (footprint.y, 0.0),
            center: (footprint.center().y, window.height / 2.0),
            end: (footprint.bottom(), window.height),
        },
        threshold,
    );

    let snapped = ImageTransform {
        x: transform.x + x.shift,
        y: transform.y + y.shift,
        scale: transform.scale,
    };
    let guides = SnapGuides {
        center_x: x.center,
        center_y: y.center,
        left: x.start,
        right: x.end,
        top: y.start,
        bottom: y.end,
    };
    (snapped, guides)
}
