//! Batch orchestrator: apply one preset and style to many images.
//!
//! Images are processed strictly one after another. For each id the bytes are
//! loaded from the caller's [`ImageCollection`], decoded, composed with a
//! centered default crop at the preset ratio, encoded and handed back through
//! [`ImageCollection::replace`]. A failing image is recorded and the batch
//! moves on; the run only fails when nothing succeeded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use crate::compose::{self, ComposeError, Placement, RenderTarget};
use crate::crop::CropArea;
use crate::decode::{self, DecodeError};
use crate::encode::{EncodeError, ExportFormat};
use crate::geometry::{Rect, Size};
use crate::preset::SizePreset;
use crate::style::StyleOptions;

/// Source and sink of the images a batch works on.
pub trait ImageCollection {
    /// Encoded bytes for `id`.
    fn load(&mut self, id: &str) -> Result<Vec<u8>, String>;

    /// Store the processed result for `id`.
    fn replace(&mut self, id: &str, bytes: Vec<u8>);
}

/// Shared flag checked between images.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub format: ExportFormat,
}

/// Why a single image failed.
#[derive(Debug, Error)]
pub enum BatchItemError {
    #[error("Failed to load image: {0}")]
    Load(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No image could be processed ({} failed)", failures.len())]
    NothingSucceeded {
        failures: Vec<(String, BatchItemError)>,
    },
}

/// Outcome of a batch that processed at least one image, or none at all.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, BatchItemError)>,
    /// Set when the run stopped early on a [`CancelFlag`].
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Apply `preset` and `style` to every id in `ids`.
///
/// `on_progress(current, total)` is called after each image, whether it
/// succeeded or not. The cancel flag is checked before each image; images
/// already replaced stay replaced.
pub fn apply_preset_to_many<C, F>(
    collection: &mut C,
    preset: &SizePreset,
    style: &StyleOptions,
    ids: &[String],
    options: &BatchOptions,
    mut on_progress: F,
    cancel: &CancelFlag,
) -> Result<BatchSummary, BatchError>
where
    C: ImageCollection + ?Sized,
    F: FnMut(usize, usize),
{
    let total = ids.len();
    info!(
        "batch: applying {} ({}x{}) to {} images",
        preset.id, preset.width, preset.height, total
    );

    let mut summary = BatchSummary::default();
    for (index, id) in ids.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("batch: cancelled after {} of {} images", index, total);
            summary.cancelled = true;
            break;
        }
        match process_one(collection, id, preset, style, options) {
            Ok(()) => summary.succeeded.push(id.clone()),
            Err(e) => {
                warn!("batch: image {} failed: {}", id, e);
                summary.failed.push((id.clone(), e));
            }
        }
        on_progress(index + 1, total);
    }

    info!(
        "batch: finished, {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );

    if summary.succeeded.is_empty() && !summary.failed.is_empty() {
        return Err(BatchError::NothingSucceeded {
            failures: summary.failed,
        });
    }
    Ok(summary)
}

fn process_one<C>(
    collection: &mut C,
    id: &str,
    preset: &SizePreset,
    style: &StyleOptions,
    options: &BatchOptions,
) -> Result<(), BatchItemError>
where
    C: ImageCollection + ?Sized,
{
    let bytes = collection.load(id).map_err(BatchItemError::Load)?;
    let image = decode::decode_image(&bytes)?;
    let area = batch_crop(image.size(), preset);
    let bitmap = compose::compose(
        &image,
        &Placement::Crop(area),
        preset,
        style,
        &RenderTarget::export(),
    )?;
    let encoded = bitmap.encode(options.format)?;
    collection.replace(id, encoded);
    Ok(())
}

/// Largest centered rectangle at the preset ratio inside the image.
fn batch_crop(image: Size, preset: &SizePreset) -> CropArea {
    CropArea::from_rect(Rect::from_size(image).centered_aspect(preset.aspect_ratio()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::io::Cursor;

    #[derive(Default)]
    struct MemoryCollection {
        images: HashMap<String, Vec<u8>>,
        replaced: Vec<String>,
    }

    impl ImageCollection for MemoryCollection {
        fn load(&mut self, id: &str) -> Result<Vec<u8>, String> {
            self.images
                .get(id)
                .cloned()
                .ok_or_else(|| format!("unknown image {id}"))
        }

        fn replace(&mut self, id: &str, bytes: Vec<u8>) {
            self.images.insert(id.to_string(), bytes);
            self.replaced.push(id.to_string());
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn collection(n: usize, broken: Option<usize>) -> (MemoryCollection, Vec<String>) {
        let mut c = MemoryCollection::default();
        let ids: Vec<String> = (0..n).map(|i| format!("img-{i}")).collect();
        for (i, id) in ids.iter().enumerate() {
            let bytes = if Some(i) == broken {
                b"definitely not an image".to_vec()
            } else {
                png_bytes(40 + i as u32 * 10, 30)
            };
            c.images.insert(id.clone(), bytes);
        }
        (c, ids)
    }

    #[test]
    fn test_one_failure_does_not_stop_batch() {
        let (mut c, ids) = collection(5, Some(2));
        let mut progress = Vec::new();
        let summary = apply_preset_to_many(
            &mut c,
            &SizePreset::custom(16, 16),
            &StyleOptions::default(),
            &ids,
            &BatchOptions::default(),
            |current, total| progress.push((current, total)),
            &CancelFlag::new(),
        )
        .unwrap();

        assert_eq!(summary.succeeded.len(), 4);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "img-2");
        assert!(matches!(summary.failed[0].1, BatchItemError::Decode(_)));
        assert_eq!(progress.last(), Some(&(5, 5)));
        assert_eq!(progress.len(), 5);
        assert!(!c.replaced.contains(&"img-2".to_string()));
    }

    #[test]
    fn test_replaced_images_have_preset_size() {
        let (mut c, ids) = collection(2, None);
        let style = StyleOptions {
            padding: 3,
            ..StyleOptions::default()
        };
        apply_preset_to_many(
            &mut c,
            &SizePreset::custom(20, 10),
            &style,
            &ids,
            &BatchOptions::default(),
            |_, _| {},
            &CancelFlag::new(),
        )
        .unwrap();

        for id in &ids {
            let out = image::load_from_memory(&c.images[id]).unwrap();
            assert_eq!((out.width(), out.height()), (26, 16));
        }
    }

    #[test]
    fn test_missing_image_is_load_error() {
        let (mut c, mut ids) = collection(1, None);
        ids.push("missing".to_string());
        let summary = apply_preset_to_many(
            &mut c,
            &SizePreset::custom(8, 8),
            &StyleOptions::default(),
            &ids,
            &BatchOptions::default(),
            |_, _| {},
            &CancelFlag::new(),
        )
        .unwrap();
        assert!(matches!(summary.failed[0].1, BatchItemError::Load(_)));
    }

    #[test]
    fn test_all_failures_is_error() {
        let (mut c, ids) = collection(1, Some(0));
        let result = apply_preset_to_many(
            &mut c,
            &SizePreset::custom(8, 8),
            &StyleOptions::default(),
            &ids,
            &BatchOptions::default(),
            |_, _| {},
            &CancelFlag::new(),
        );
        match result {
            Err(BatchError::NothingSucceeded { failures }) => assert_eq!(failures.len(), 1),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_is_ok() {
        let mut c = MemoryCollection::default();
        let summary = apply_preset_to_many(
            &mut c,
            &SizePreset::custom(8, 8),
            &StyleOptions::default(),
            &[],
            &BatchOptions::default(),
            |_, _| {},
            &CancelFlag::new(),
        )
        .unwrap();
        assert_eq!(summary.processed(), 0);
    }

    #[test]
    fn test_cancel_between_images() {
        let (mut c, ids) = collection(4, None);
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let summary = apply_preset_to_many(
            &mut c,
            &SizePreset::custom(8, 8),
            &StyleOptions::default(),
            &ids,
            &BatchOptions::default(),
            |current, _| {
                if current == 2 {
                    flag.cancel();
                }
            },
            &cancel,
        )
        .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.succeeded, vec!["img-0".to_string(), "img-1".to_string()]);
        assert_eq!(c.replaced.len(), 2);
    }

    #[test]
    fn test_jpeg_output_format() {
        let (mut c, ids) = collection(1, None);
        let options = BatchOptions {
            format: ExportFormat::Jpeg { quality: 80 },
        };
        apply_preset_to_many(
            &mut c,
            &SizePreset::custom(8, 8),
            &StyleOptions::default(),
            &ids,
            &options,
            |_, _| {},
            &CancelFlag::new(),
        )
        .unwrap();
        assert_eq!(&c.images[&ids[0]][..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_batch_crop_matches_preset_ratio() {
        let crop = batch_crop(
            Size::new(400.0, 300.0),
            &SizePreset::custom(100, 100),
        );
        assert_eq!(crop, CropArea::new(50.0, 0.0, 300.0, 300.0));
    }
}
