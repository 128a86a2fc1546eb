//! Batch bindings.
//!
//! The host passes a `Map<string, Uint8Array>` of encoded images. Each image
//! that succeeds is replaced in the same map by its encoded result.

use crate::types::{from_js, from_js_or_default, to_js};
use framecrop_core::batch::{self, BatchOptions, BatchSummary, CancelFlag, ImageCollection};
use framecrop_core::encode::ExportFormat;
use framecrop_core::preset::SizePreset;
use framecrop_core::style::StyleOptions;
use log::warn;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Cancellation handle; call `cancel()` from a progress callback or a UI
/// event to stop before the next image.
#[wasm_bindgen]
#[derive(Default)]
pub struct JsCancelFlag {
    inner: CancelFlag,
}

#[wasm_bindgen]
impl JsCancelFlag {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

struct MapCollection<'a> {
    map: &'a js_sys::Map,
}

impl ImageCollection for MapCollection<'_> {
    fn load(&mut self, id: &str) -> Result<Vec<u8>, String> {
        let value = self.map.get(&JsValue::from_str(id));
        if value.is_undefined() {
            return Err(format!("no image with id {}", id));
        }
        Ok(js_sys::Uint8Array::new(&value).to_vec())
    }

    fn replace(&mut self, id: &str, bytes: Vec<u8>) {
        let array = js_sys::Uint8Array::from(bytes.as_slice());
        self.map.set(&JsValue::from_str(id), &array);
    }
}

/// Logs the first exception thrown by the host's progress callback and
/// counts the rest.
#[derive(Debug, Default)]
struct CallbackErrors {
    seen: usize,
}

impl CallbackErrors {
    fn record<T, E: std::fmt::Debug>(&mut self, result: Result<T, E>) {
        if let Err(e) = result {
            if self.seen == 0 {
                warn!("batch: progress callback threw: {:?}", e);
            }
            self.seen += 1;
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport {
    succeeded: Vec<String>,
    failed: Vec<FailedImage>,
    cancelled: bool,
}

#[derive(Debug, PartialEq, Serialize)]
struct FailedImage {
    id: String,
    error: String,
}

impl From<BatchSummary> for BatchReport {
    fn from(summary: BatchSummary) -> Self {
        Self {
            succeeded: summary.succeeded,
            failed: summary
                .failed
                .into_iter()
                .map(|(id, e)| FailedImage {
                    id,
                    error: e.to_string(),
                })
                .collect(),
            cancelled: summary.cancelled,
        }
    }
}

/// Apply `preset` and `style` to every id in `ids`, one image at a time.
///
/// `on_progress(current, total)` runs after each image. Resolves to
/// `{ succeeded: string[], failed: {id, error}[], cancelled }`; throws only
/// when no image succeeded.
#[wasm_bindgen]
pub fn apply_preset_to_many(
    images: &js_sys::Map,
    ids: Vec<String>,
    preset: JsValue,
    style: JsValue,
    format: JsValue,
    on_progress: &js_sys::Function,
    cancel: &JsCancelFlag,
) -> Result<JsValue, JsValue> {
    let preset: SizePreset = from_js(preset)?;
    let style: StyleOptions = from_js_or_default(style)?;
    let format: ExportFormat = from_js_or_default(format)?;

    let mut collection = MapCollection { map: images };
    let mut callback_errors = CallbackErrors::default();
    let summary = batch::apply_preset_to_many(
        &mut collection,
        &preset,
        &style,
        &ids,
        &BatchOptions { format },
        |current, total| {
            let result = on_progress.call2(
                &JsValue::NULL,
                &JsValue::from(current as u32),
                &JsValue::from(total as u32),
            );
            callback_errors.record(result);
        },
        &cancel.inner,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_js(&BatchReport::from(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecrop_core::batch::BatchItemError;

    #[test]
    fn test_report_from_summary() {
        let summary = BatchSummary {
            succeeded: vec!["a".to_string()],
            failed: vec![("b".to_string(), BatchItemError::Load("gone".to_string()))],
            cancelled: false,
        };
        let report = BatchReport::from(summary);
        assert_eq!(report.succeeded, vec!["a".to_string()]);
        assert_eq!(
            report.failed,
            vec![FailedImage {
                id: "b".to_string(),
                error: "Failed to load image: gone".to_string(),
            }]
        );
    }

    #[test]
    fn test_callback_errors_counted() {
        let mut errors = CallbackErrors::default();
        errors.record::<(), String>(Ok(()));
        assert_eq!(errors.seen, 0);
        errors.record::<(), _>(Err("boom".to_string()));
        errors.record::<(), _>(Err("boom again".to_string()));
        assert_eq!(errors.seen, 2);
    }

    #[test]
    fn test_cancel_flag_wrapper() {
        let flag = JsCancelFlag::new();
        assert!(!flag.cancelled());
        flag.cancel();
        assert!(flag.cancelled());
    }
}
