//! Target output sizes.
//!
//! A [`SizePreset`] is an immutable catalog entry naming an output pixel size.
//! Categories are opaque tags for grouping in a UI; no behavior depends on
//! them.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// A named target output size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePreset {
    pub id: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub category: String,
}

/// Category tag used for ad-hoc presets.
pub const CUSTOM_CATEGORY: &str = "custom";

impl SizePreset {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        width: u32,
        height: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            width: width.max(1),
            height: height.max(1),
            category: category.into(),
        }
    }

    /// Ad-hoc preset for a user-entered size. Zero sides are raised to 1.
    pub fn custom(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1), height.max(1));
        Self::new(
            format!("custom-{w}x{h}"),
            format!("{w} × {h}"),
            w,
            h,
            CUSTOM_CATEGORY,
        )
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn size(&self) -> Size {
        Size::from_pixels(self.width, self.height)
    }

    /// Built-in catalog, in display order.
    pub fn catalog() -> Vec<SizePreset> {
        CATALOG
            .iter()
            .map(|&(id, label, w, h, category)| SizePreset::new(id, label, w, h, category))
            .collect()
    }

    /// Look up a built-in preset by id.
    pub fn find(id: &str) -> Option<SizePreset> {
        CATALOG
            .iter()
            .find(|entry| entry.0 == id)
            .map(|&(id, label, w, h, category)| SizePreset::new(id, label, w, h, category))
    }
}

const CATALOG: &[(&str, &str, u32, u32, &str)] = &[
    ("square-post", "Square post", 1080, 1080, "social"),
    ("portrait-post", "Portrait post", 1080, 1350, "social"),
    ("landscape-post", "Landscape post", 1080, 566, "social"),
    ("story", "Story / Reel", 1080, 1920, "social"),
    ("link-preview", "Link preview", 1200, 630, "social"),
    ("header-banner", "Header banner", 1500, 500, "social"),
    ("video-thumbnail", "Video thumbnail", 1280, 720, "video"),
    ("hd", "HD 720p", 1280, 720, "screen"),
    ("full-hd", "Full HD 1080p", 1920, 1080, "screen"),
    ("qhd", "QHD 1440p", 2560, 1440, "screen"),
    ("4k", "4K UHD", 3840, 2160, "screen"),
    ("avatar", "Avatar", 400, 400, "web"),
    ("thumbnail", "Thumbnail", 320, 240, "web"),
    ("blog-cover", "Blog cover", 1600, 900, "web"),
    ("og-image", "Open Graph image", 1200, 630, "web"),
    ("photo-4x6", "Photo 4×6", 1800, 1200, "print"),
    ("photo-5x7", "Photo 5×7", 2100, 1500, "print"),
    ("a4-portrait", "A4 portrait (150 dpi)", 1240, 1754, "print"),
];
