//! Engine tunables.
//!
//! Every interaction constant lives in [`EngineConfig`] so hosts can adjust
//! hit targets or snapping without touching controller code. All fields have
//! defaults, and the struct deserializes from a partial camelCase object.

use serde::{Deserialize, Serialize};

/// Tunable constants used by the controllers and the preview renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Minimum crop side in source-image pixels.
    pub min_crop_size: f64,
    /// Corner hit radius in screen pixels.
    pub handle_tolerance: f64,
    /// Snap distance in display pixels (Image-Fit mode).
    pub snap_threshold: f64,
    /// Lower bound for the Image-Fit scale factor.
    pub min_image_scale: f64,
    /// Margin kept around the fixed crop window in Image-Fit mode (canvas units).
    pub fit_padding: f64,
    /// Default crop side as a fraction of the shorter image side.
    pub default_crop_fraction: f64,
    /// Delay before snap guides disappear after pointer-up (milliseconds).
    pub guide_grace_ms: f64,
    /// Multiplicative zoom step applied per wheel notch.
    pub zoom_step: f64,
    /// Checkerboard cell size in CSS pixels for previews.
    pub checker_cell: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_crop_size: 50.0,
            handle_tolerance: 12.0,
            snap_threshold: 8.0,
            min_image_scale: 0.1,
            fit_padding: 40.0,
            default_crop_fraction: 0.8,
            guide_grace_ms: 300.0,
            zoom_step: 1.1,
            checker_cell: 8.0,
        }
    }
}

impl EngineConfig {
    /// Effective minimum crop side for an image of the given size.
    ///
    /// Images smaller than `min_crop_size` would otherwise make the bounds and
    /// minimum-size invariants contradict each other; the image side wins.
    pub fn min_crop_for(&self, image_width: f64, image_height: f64) -> (f64, f64) {
        let min = self.min_crop_size.max(1.0);
        (min.min(image_width), min.min(image_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.min_crop_size, 50.0);
        assert_eq!(cfg.default_crop_fraction, 0.8);
        assert!(cfg.min_image_scale > 0.0);
    }

    #[test]
    fn test_min_crop_for_small_image() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.min_crop_for(4000.0, 3000.0), (50.0, 50.0));
        assert_eq!(cfg.min_crop_for(30.0, 3000.0), (30.0, 50.0));
    }
}
