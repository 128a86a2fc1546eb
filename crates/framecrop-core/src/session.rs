//! Editing session: the explicit state behind one interactive crop.
//!
//! [`EditorState`] owns everything an editor needs between events: the mode,
//! the crop area, the image transform, the selected preset and aspect lock,
//! the current [`DragState`] and the snap guides. Input arrives as
//! [`InputEvent`]s. [`EditorState::transition`] is the pure form
//! `(state, event) -> state`; [`EditorState::dispatch`] applies an event in
//! place.
//!
//! The [`SpaceMapper`] is rebuilt from the viewport on every event, so a
//! container resize takes effect immediately, even in the middle of a drag.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::compose::{self, ComposeError, Placement, RenderTarget, RenderedBitmap};
use crate::config::EngineConfig;
use crate::crop::{self, CropArea, CropHit, Handle};
use crate::decode::SourceImage;
use crate::fit::{self, FitHit, ImageTransform, SnapGuides};
use crate::geometry::{Point, Rect, Size};
use crate::preset::SizePreset;
use crate::space::{display_scale, fit_window_frame, ModelFrame, SpaceMapper, Surface};
use crate::style::StyleOptions;

/// Which controller receives pointer input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorMode {
    /// The crop rectangle moves over a fixed image.
    #[default]
    CropWindow,
    /// The window is fixed and the image moves underneath.
    FitImage,
}

/// Drag in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer offset from the crop origin, image pixels.
    MovingWindow { offset: Point },
    /// `last` is the previous pointer position in image pixels.
    ResizingWindow { handle: Handle, last: Point },
    /// Pan from `origin`, started with the pointer at `start` (window-local).
    MovingImage { start: Point, origin: ImageTransform },
    /// `anchor` is the fixed opposite corner, window-local.
    ResizingImage { handle: Handle, anchor: Point },
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub client_x: f64,
    pub client_y: f64,
    #[serde(default)]
    pub timestamp_ms: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, client_x: f64, client_y: f64, timestamp_ms: f64) -> Self {
        Self {
            kind,
            client_x,
            client_y,
            timestamp_ms,
        }
    }
}

/// The editor's container on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Viewport {
    /// Container top-left in client coordinates.
    pub origin: Point,
    /// Displayed container size in CSS pixels.
    pub size: Size,
    pub device_pixel_ratio: f64,
    /// Logical canvas units per displayed CSS pixel.
    pub css_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Point::ZERO, Size::new(800.0, 600.0), 1.0)
    }
}

impl Viewport {
    pub fn new(origin: Point, size: Size, device_pixel_ratio: f64) -> Self {
        Self {
            origin,
            size,
            device_pixel_ratio,
            css_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    Pointer(PointerEvent),
    /// Wheel notch over the editor; negative `delta_y` zooms in.
    #[serde(rename_all = "camelCase")]
    Wheel {
        client_x: f64,
        client_y: f64,
        delta_y: f64,
    },
    /// The container moved or changed size.
    Resize(Viewport),
    /// Clock tick for delayed effects (guide clearing).
    #[serde(rename_all = "camelCase")]
    Tick { now_ms: f64 },
}

/// Cursor the host should show at a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CursorHint {
    Default,
    Move,
    Resize(Handle),
}

impl CursorHint {
    /// CSS `cursor` value.
    pub fn css(&self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Move => "move",
            CursorHint::Resize(Handle::Nw | Handle::Se) => "nwse-resize",
            CursorHint::Resize(Handle::Ne | Handle::Sw) => "nesw-resize",
        }
    }
}

/// Segment of an active snap guide in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub from: Point,
    pub to: Point,
}

/// Editor chrome geometry in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    /// Crop rectangle (crop mode) or the fixed window (fit mode).
    pub frame: Rect,
    /// Where the image is drawn.
    pub image: Rect,
    /// Grab points: crop corners or image footprint corners, `[nw, ne, sw, se]`.
    pub handles: [Point; 4],
    pub guides: Vec<GuideLine>,
}

/// Result of rendering the session at export resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutput {
    /// The crop used, only in crop-window mode.
    pub crop_area: Option<CropArea>,
    pub bitmap: RenderedBitmap,
    pub width: u32,
    pub height: u32,
}

/// One image's editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    image: Size,
    viewport: Viewport,
    config: EngineConfig,
    mode: EditorMode,
    crop: CropArea,
    transform: ImageTransform,
    preset: Option<SizePreset>,
    aspect_lock: Option<f64>,
    drag: DragState,
    guides: SnapGuides,
    guides_clear_at: Option<f64>,
}

impl EditorState {
    pub fn new(image: Size, viewport: Viewport, config: EngineConfig) -> Self {
        let crop = CropArea::default_for(image, &config);
        let mut state = Self {
            image,
            viewport,
            config,
            mode: EditorMode::CropWindow,
            crop,
            transform: ImageTransform::default(),
            preset: None,
            aspect_lock: None,
            drag: DragState::Idle,
            guides: SnapGuides::default(),
            guides_clear_at: None,
        };
        state.transform = ImageTransform::cover(image, state.window_size());
        state
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn crop_area(&self) -> CropArea {
        self.crop
    }

    pub fn transform(&self) -> ImageTransform {
        self.transform
    }

    pub fn preset(&self) -> Option<&SizePreset> {
        self.preset.as_ref()
    }

    pub fn aspect_lock(&self) -> Option<f64> {
        self.aspect_lock
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn guides(&self) -> SnapGuides {
        self.guides
    }

    /// Output preset: the selected one, or a custom size from the crop area.
    pub fn output_preset(&self) -> SizePreset {
        match &self.preset {
            Some(preset) => preset.clone(),
            None => {
                let (_, _, w, h) = self
                    .crop
                    .to_pixels(self.image.width as u32, self.image.height as u32);
                SizePreset::custom(w, h)
            }
        }
    }

    /// Size of the fixed window in Image-Fit mode, in output pixels.
    pub fn window_size(&self) -> Size {
        self.output_preset().size()
    }

    /// Mapper for the current mode and viewport.
    pub fn mapper(&self) -> SpaceMapper {
        let vp = &self.viewport;
        let css = if vp.css_scale.is_finite() && vp.css_scale > 0.0 {
            vp.css_scale
        } else {
            1.0
        };
        match self.mode {
            EditorMode::CropWindow => {
                let scale = display_scale(self.image, vp.size);
                let displayed = self.image.scaled(scale);
                let origin = Point::new(
                    vp.origin.x + (vp.size.width - displayed.width) / 2.0,
                    vp.origin.y + (vp.size.height - displayed.height) / 2.0,
                );
                let mut surface = Surface::new(origin, displayed, vp.device_pixel_ratio);
                surface.logical = displayed.scaled(css);
                SpaceMapper::new(surface, ModelFrame::image(scale * css))
            }
            EditorMode::FitImage => {
                let mut surface = Surface::new(vp.origin, vp.size, vp.device_pixel_ratio);
                surface.logical = vp.size.scaled(css);
                let frame =
                    fit_window_frame(surface.logical, self.window_size(), self.config.fit_padding);
                SpaceMapper::new(surface, frame)
            }
        }
    }

    /// Pure transition: the state after `event`.
    pub fn transition(&self, event: &InputEvent) -> EditorState {
        let mut next = self.clone();
        next.dispatch(event);
        next
    }

    /// Apply `event` in place.
    pub fn dispatch(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Pointer(pointer) => self.on_pointer(pointer),
            InputEvent::Wheel {
                client_x,
                client_y,
                delta_y,
            } => self.on_wheel(client_x, client_y, delta_y),
            InputEvent::Resize(viewport) => self.viewport = viewport,
            InputEvent::Tick { now_ms } => {
                if matches!(self.guides_clear_at, Some(at) if now_ms >= at) {
                    self.guides = SnapGuides::default();
                    self.guides_clear_at = None;
                }
            }
        }
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        let mapper = self.mapper();
        let p = mapper.to_image_space(event.client_x, event.client_y);
        match event.kind {
            PointerKind::Down => {
                let tolerance = mapper.screen_to_model_len(self.config.handle_tolerance);
                self.drag = self.begin_drag(p, tolerance);
                self.guides_clear_at = None;
            }
            PointerKind::Move => self.continue_drag(p, &mapper),
            PointerKind::Up => {
                if !self.drag.is_idle() && self.guides.any() {
                    self.guides_clear_at = Some(event.timestamp_ms + self.config.guide_grace_ms);
                }
                self.drag = DragState::Idle;
            }
        }
    }

    fn begin_drag(&self, p: Point, tolerance: f64) -> DragState {
        match self.mode {
            EditorMode::CropWindow => match crop::hit_test(&self.crop, p, tolerance) {
                Some(CropHit::Handle(handle)) => DragState::ResizingWindow { handle, last: p },
                Some(CropHit::Inside) => DragState::MovingWindow {
                    offset: Point::new(p.x - self.crop.x, p.y - self.crop.y),
                },
                None => DragState::Idle,
            },
            EditorMode::FitImage => {
                match fit::hit_test(&self.transform, self.image, p, tolerance) {
                    Some(FitHit::Handle(handle)) => {
                        let footprint = self.transform.footprint(self.image);
                        DragState::ResizingImage {
                            handle,
                            anchor: handle.opposite().corner_of(&footprint),
                        }
                    }
                    Some(FitHit::Inside) => DragState::MovingImage {
                        start: p,
                        origin: self.transform,
                    },
                    None => DragState::Idle,
                }
            }
        }
    }

    fn continue_drag(&mut self, p: Point, mapper: &SpaceMapper) {
        match self.drag {
            DragState::Idle => {}
            DragState::MovingWindow { offset } => {
                self.crop = crop::move_area(&self.crop, p, offset, self.image);
            }
            DragState::ResizingWindow { handle, last } => {
                self.crop = crop::resize_area(
                    &self.crop,
                    handle,
                    last,
                    p,
                    self.aspect_lock,
                    self.image,
                    &self.config,
                );
                self.drag = DragState::ResizingWindow { handle, last: p };
            }
            DragState::MovingImage { start, origin } => {
                let raw = fit::pan(&origin, start, p);
                let threshold = mapper.screen_to_model_len(self.config.snap_threshold);
                let (snapped, guides) = fit::snap(raw, self.image, self.window_size(), threshold);
                self.transform = snapped;
                self.guides = guides;
            }
            DragState::ResizingImage { handle, anchor } => {
                self.transform = fit::resize_anchored(
                    handle,
                    anchor,
                    p,
                    self.image,
                    self.config.min_image_scale,
                );
                self.guides = SnapGuides::default();
            }
        }
    }

    fn on_wheel(&mut self, client_x: f64, client_y: f64, delta_y: f64) {
        if self.mode != EditorMode::FitImage || !self.drag.is_idle() || delta_y == 0.0 {
            return;
        }
        let step = if self.config.zoom_step.is_finite() && self.config.zoom_step > 1.0 {
            self.config.zoom_step
        } else {
            1.1
        };
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        let pivot = self.mapper().to_image_space(client_x, client_y);
        self.transform = fit::zoom_at(&self.transform, pivot, factor, self.config.min_image_scale);
    }

    /// Cursor for a pointer at client coordinates.
    pub fn hover(&self, client_x: f64, client_y: f64) -> CursorHint {
        match self.drag {
            DragState::MovingWindow { .. } | DragState::MovingImage { .. } => {
                return CursorHint::Move
            }
            DragState::ResizingWindow { handle, .. } | DragState::ResizingImage { handle, .. } => {
                return CursorHint::Resize(handle)
            }
            DragState::Idle => {}
        }
        let mapper = self.mapper();
        let p = mapper.to_image_space(client_x, client_y);
        let tolerance = mapper.screen_to_model_len(self.config.handle_tolerance);
        let hit = match self.mode {
            EditorMode::CropWindow => crop::hit_test(&self.crop, p, tolerance).map(|h| match h {
                CropHit::Handle(handle) => CursorHint::Resize(handle),
                CropHit::Inside => CursorHint::Move,
            }),
            EditorMode::FitImage => {
                fit::hit_test(&self.transform, self.image, p, tolerance).map(|h| match h {
                    FitHit::Handle(handle) => CursorHint::Resize(handle),
                    FitHit::Inside => CursorHint::Move,
                })
            }
        };
        hit.unwrap_or(CursorHint::Default)
    }

    /// Switch controllers. Any drag is discarded; entering Image-Fit mode
    /// resets the transform to a centered cover.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.drag = DragState::Idle;
        self.guides = SnapGuides::default();
        self.guides_clear_at = None;
        if mode == EditorMode::FitImage {
            self.transform = ImageTransform::cover(self.image, self.window_size());
        }
        if mode != self.mode {
            debug!("editor mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Select an output preset. The crop is refitted to the preset's ratio
    /// around its current center and the ratio is locked.
    pub fn select_preset(&mut self, preset: SizePreset) {
        let ratio = preset.aspect_ratio();
        debug!(
            "preset {} ({}x{}) selected, ratio {:.4}",
            preset.id, preset.width, preset.height, ratio
        );
        let center = self.crop.rect().center();
        self.crop = CropArea::with_ratio(self.image, ratio, center, &self.config);
        self.aspect_lock = Some(ratio);
        self.transform = ImageTransform::cover(self.image, preset.size());
        self.preset = Some(preset);
        self.drag = DragState::Idle;
    }

    /// Drop the selected preset and unlock the ratio.
    pub fn clear_preset(&mut self) {
        self.preset = None;
        self.aspect_lock = None;
    }

    /// Lock (or unlock) the crop ratio without selecting a preset.
    pub fn set_aspect_lock(&mut self, ratio: Option<f64>) {
        self.aspect_lock = ratio.filter(|r| r.is_finite() && *r > 0.0);
        if let Some(r) = self.aspect_lock {
            let center = self.crop.rect().center();
            self.crop = CropArea::with_ratio(self.image, r, center, &self.config);
        }
    }

    /// Replace the crop area, clamped into the image.
    pub fn set_crop_area(&mut self, area: CropArea) {
        self.crop = area.clamped(self.image, &self.config);
    }

    /// Replace the image transform. Non-positive scales are ignored.
    pub fn set_transform(&mut self, transform: ImageTransform) {
        if transform.scale.is_finite() && transform.scale > 0.0 {
            self.transform = transform;
        }
    }

    /// Default crop, no preset, no lock.
    pub fn reset(&mut self) {
        debug!("editor reset");
        self.crop = CropArea::default_for(self.image, &self.config);
        self.preset = None;
        self.aspect_lock = None;
        self.drag = DragState::Idle;
        self.guides = SnapGuides::default();
        self.guides_clear_at = None;
        self.transform = ImageTransform::cover(self.image, self.window_size());
    }

    /// Recenter the image at its current scale.
    pub fn center(&mut self) {
        self.transform = fit::center(&self.transform, self.image, self.window_size());
    }

    /// Cover the window.
    pub fn fill(&mut self) {
        self.transform = fit::fill(self.image, self.window_size());
    }

    /// Show the whole image inside the window.
    pub fn fit(&mut self) {
        self.transform = fit::fit(self.image, self.window_size());
    }

    /// One output pixel per source pixel.
    pub fn actual_size(&mut self) {
        self.transform = fit::actual_size(self.image, self.window_size());
    }

    /// What the compositor should draw for the current mode.
    pub fn placement(&self) -> Placement {
        match self.mode {
            EditorMode::CropWindow => Placement::Crop(self.crop),
            EditorMode::FitImage => Placement::Fit(self.transform),
        }
    }

    /// Editor chrome geometry for the host to draw.
    pub fn overlay(&self) -> Overlay {
        let mapper = self.mapper();
        let (frame, image, handles_of) = match self.mode {
            EditorMode::CropWindow => {
                let frame = mapper.rect_to_canvas(self.crop.rect());
                (frame, mapper.rect_to_canvas(Rect::from_size(self.image)), frame)
            }
            EditorMode::FitImage => {
                let image = mapper.rect_to_canvas(self.transform.footprint(self.image));
                (
                    mapper.rect_to_canvas(Rect::from_size(self.window_size())),
                    image,
                    image,
                )
            }
        };
        let guides = if self.mode == EditorMode::FitImage {
            guide_lines(&self.guides, frame)
        } else {
            Vec::new()
        };
        Overlay {
            frame,
            image,
            handles: handles_of.corners(),
            guides,
        }
    }

    /// Render a preview that fits inside `max_size` CSS pixels.
    pub fn render_preview(
        &self,
        image: &SourceImage,
        style: &StyleOptions,
        max_size: Size,
    ) -> Result<RenderedBitmap, ComposeError> {
        let preset = self.output_preset();
        let (w, h) = style.output_size(preset.width, preset.height);
        let scale = display_scale(Size::from_pixels(w, h), max_size);
        let target = RenderTarget::preview(
            scale,
            self.viewport.device_pixel_ratio,
            self.config.checker_cell,
        );
        compose::compose(image, &self.placement(), &preset, style, &target)
    }

    /// Render at export resolution.
    pub fn apply(
        &self,
        image: &SourceImage,
        style: &StyleOptions,
    ) -> Result<ApplyOutput, ComposeError> {
        let preset = self.output_preset();
        let bitmap = compose::compose(
            image,
            &self.placement(),
            &preset,
            style,
            &RenderTarget::export(),
        )?;
        Ok(ApplyOutput {
            crop_area: match self.mode {
                EditorMode::CropWindow => Some(self.crop),
                EditorMode::FitImage => None,
            },
            width: bitmap.width,
            height: bitmap.height,
            bitmap,
        })
    }
}

fn guide_lines(guides: &SnapGuides, window: Rect) -> Vec<GuideLine> {
    let vertical = |x: f64| GuideLine {
        from: Point::new(x, window.y),
        to: Point::new(x, window.bottom()),
    };
    let horizontal = |y: f64| GuideLine {
        from: Point::new(window.x, y),
        to: Point::new(window.right(), y),
    };
    let center = window.center();
    [
        (guides.center_x, vertical(center.x)),
        (guides.center_y, horizontal(center.y)),
        (guides.left, vertical(window.x)),
        (guides.right, vertical(window.right())),
        (guides.top, horizontal(window.y)),
        (guides.bottom, horizontal(window.bottom())),
    ]
    .into_iter()
    .filter_map(|(active, line)| active.then_some(line))
    .collect()
}
