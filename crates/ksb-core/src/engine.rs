//! The scene engine: one explicit context object that owns the scene, the
//! camera controller, the tooltip and the injected capabilities.
//!
//! Hosts feed it pointer/wheel/resize events and call [`SceneEngine::frame`]
//! once per animation frame.

use crate::animator;
use crate::asset::{AssetError, AssetInbox, AssetLoader, AssetSink, FigureTicket};
use crate::camera::OrbitCamera;
use crate::config::EngineConfig;
use crate::constants::{BREATHE_OFFSET_MAX, CLICK_SLOP_PX};
use crate::figure;
use crate::input::PointerInput;
use crate::picking::{self, SurfaceRect};
use crate::rating::{RatingSource, RawRating};
use crate::render::{self, DrawItem, FrameView, NullBackend, RenderBackend, RenderError};
use crate::scene::{ItemSpec, Marker, Scene};
use crate::tooltip::Tooltip;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub type SelectHandler = Box<dyn FnMut(&str)>;

pub struct SceneEngine {
    config: EngineConfig,
    items: Vec<ItemSpec>,
    scene: Scene,
    camera: OrbitCamera,
    tooltip: Tooltip,
    backend: Box<dyn RenderBackend>,
    loader: Option<Box<dyn AssetLoader>>,
    inbox: AssetInbox,
    generation: u64,
    next_request: u64,
    pending: Option<FigureTicket>,
    surface: SurfaceRect,
    viewport: Vec2,
    hover: Option<Vec2>,
    on_select: Option<SelectHandler>,
    draws: Vec<DrawItem>,
    rng: StdRng,
}

impl SceneEngine {
    pub fn new(items: &[ItemSpec], config: EngineConfig) -> Self {
        let config = config.sanitized();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let generation = 1;
        let scene = Scene::build(
            items,
            config.marker_sphere_radius,
            generation,
            rng.gen_range(0.0..BREATHE_OFFSET_MAX),
        );
        let camera = OrbitCamera::new(config.camera.clone(), 1.0);
        let tooltip = Tooltip::new(config.tooltip_offset, config.tooltip_edge_margin);
        Self {
            config,
            items: items.to_vec(),
            scene,
            camera,
            tooltip,
            backend: Box::new(NullBackend::default()),
            loader: None,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            generation,
            next_request: 0,
            pending: None,
            surface: SurfaceRect::new(0.0, 0.0, 0.0, 0.0),
            viewport: Vec2::ZERO,
            hover: None,
            on_select: None,
            draws: Vec::new(),
            rng,
        }
    }

    /// Install the rendering capability. The camera aspect follows the
    /// backend's current size.
    pub fn set_backend(&mut self, backend: Box<dyn RenderBackend>) {
        if backend.is_stub() {
            log::warn!("[gpu] no rendering capability, frames will not be drawn");
        }
        self.backend = backend;
        let (w, h) = self.backend.size();
        if w > 0 && h > 0 {
            self.camera.set_aspect(w as f32 / h as f32);
        }
    }

    /// Install the asset capability and request the configured figure, if any.
    pub fn set_asset_loader(&mut self, loader: Box<dyn AssetLoader>) {
        self.loader = Some(loader);
        if let Some(url) = self.config.figure_url.clone() {
            self.request_figure(&url);
        }
    }

    pub fn set_on_select(&mut self, handler: SelectHandler) {
        self.on_select = Some(handler);
    }

    /// Tear the scene down and build it again from `items`. Any figure
    /// request still in flight belongs to the old scene and is discarded.
    pub fn rebuild(&mut self, items: &[ItemSpec]) {
        self.generation += 1;
        self.pending = None;
        self.items = items.to_vec();
        self.scene = Scene::build(
            items,
            self.config.marker_sphere_radius,
            self.generation,
            self.rng.gen_range(0.0..BREATHE_OFFSET_MAX),
        );
        self.tooltip.hide();
        if self.loader.is_some() {
            if let Some(url) = self.config.figure_url.clone() {
                self.request_figure(&url);
            }
        }
    }

    /// Ask the loader for a figure asset. The newest request wins; older
    /// ones are dropped when they arrive.
    pub fn request_figure(&mut self, url: &str) -> Option<FigureTicket> {
        let Some(loader) = self.loader.as_ref() else {
            log::warn!("[asset] {} for {:?}, keeping current figure", AssetError::Unavailable, url);
            self.scene.ensure_figure();
            return None;
        };
        self.next_request += 1;
        let ticket = FigureTicket {
            generation: self.generation,
            request: self.next_request,
        };
        self.pending = Some(ticket);
        log::info!("[asset] requesting {:?} (gen {} req {})", url, ticket.generation, ticket.request);
        loader.load(url, AssetSink::new(ticket, url, self.inbox.clone()));
        Some(ticket)
    }

    /// Attach whatever asset results arrived since the last frame.
    pub fn process_deliveries(&mut self) {
        loop {
            let Some(delivery) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            if self.pending != Some(delivery.ticket) {
                log::debug!(
                    "[asset] discarding stale result for {:?} (gen {} req {})",
                    delivery.source,
                    delivery.ticket.generation,
                    delivery.ticket.request
                );
                continue;
            }
            self.pending = None;
            let reference = self.scene.reference_bounds();
            let offset = self.scene.breathe_offset();
            let fitted = delivery.result.and_then(|asset| {
                figure::fit_loaded_figure(
                    asset,
                    &reference,
                    self.scene.library_mut(),
                    &delivery.source,
                    offset,
                )
            });
            match fitted {
                Ok(fig) => {
                    self.scene.replace_figure(fig);
                    log::info!("[asset] figure swapped in from {:?}", delivery.source);
                }
                Err(e) => {
                    log::warn!("[asset] {:?}: {}; using procedural figure", delivery.source, e);
                    self.scene.ensure_figure();
                }
            }
        }
    }

    pub fn set_rating(&mut self, id: &str, rating: impl Into<RawRating>) -> bool {
        let raw = rating.into();
        if !self.scene.set_rating(id, &raw) {
            return false;
        }
        if let Some(marker) = self.scene.marker(id) {
            self.tooltip.refresh(marker);
        }
        true
    }

    /// Apply every entry; returns how many ids were known.
    pub fn set_all_ratings<I, R>(&mut self, ratings: I) -> usize
    where
        I: IntoIterator<Item = (String, R)>,
        R: Into<RawRating>,
    {
        let mut applied = 0;
        for (id, rating) in ratings {
            if self.set_rating(&id, rating) {
                applied += 1;
            }
        }
        applied
    }

    pub fn sync_from(&mut self, source: &dyn RatingSource) -> usize {
        self.set_all_ratings(source.all_ratings())
    }

    /// Resize the drawing buffer (device px); the camera aspect follows,
    /// angles, radius and target are untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
        if width > 0 && height > 0 {
            self.camera.set_aspect(width as f32 / height as f32);
        }
    }

    /// Client rectangle of the surface, used to map pointer coordinates.
    pub fn set_surface_rect(&mut self, rect: SurfaceRect) {
        self.surface = rect;
    }

    /// Size of the viewport the tooltip is clamped to.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn set_tooltip_size(&mut self, width: f32, height: f32) {
        self.tooltip.set_size(Vec2::new(width, height));
    }

    /// Start a drag session. Returns false when another pointer already owns
    /// the camera.
    pub fn pointer_down(&mut self, input: PointerInput) -> bool {
        let mode = input.drag_mode();
        if !self.camera.begin_drag(input.pointer_id, input.position, mode) {
            return false;
        }
        self.tooltip.hide();
        true
    }

    /// Drag when a session is active, hover-pick otherwise.
    pub fn pointer_move(&mut self, pointer_id: i32, position: Vec2) {
        if self.camera.is_dragging() {
            self.camera.drag_to(pointer_id, position);
            return;
        }
        self.hover(position);
    }

    /// End the session for `pointer_id`. A release with almost no travel is
    /// a click and reports the marker under the pointer.
    pub fn pointer_up(&mut self, pointer_id: i32, position: Vec2) -> Option<String> {
        let session = self.camera.end_drag(pointer_id)?;
        if session.travel >= CLICK_SLOP_PX {
            return None;
        }
        let id = self.pick(position)?.id.clone();
        log::debug!("[pick] selected {:?}", id);
        if let Some(handler) = self.on_select.as_mut() {
            handler(&id);
        }
        Some(id)
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32) {
        self.camera.end_drag(pointer_id);
    }

    pub fn pointer_leave(&mut self) {
        self.hover = None;
        self.tooltip.hide();
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.zoom(delta_y);
    }

    /// Hover-pick at `position` (client px): show the tooltip for the marker
    /// under the pointer or hide it.
    pub fn hover(&mut self, position: Vec2) -> Option<&str> {
        self.hover = Some(position);
        let viewport = self.viewport;
        let hit = self.pick_index(position);
        match hit {
            Some(i) => {
                let marker = &self.scene.markers()[i];
                self.tooltip.show(marker, position, viewport);
                Some(marker.id.as_str())
            }
            None => {
                self.tooltip.hide();
                None
            }
        }
    }

    fn pick_index(&self, position: Vec2) -> Option<usize> {
        let ndc = self.surface.to_ndc(position)?;
        let ray = self.camera.camera().ray_from_ndc(ndc);
        picking::pick_marker(&ray, self.scene.markers()).map(|(i, _)| i)
    }

    pub fn pick(&self, position: Vec2) -> Option<&Marker> {
        self.pick_index(position).map(|i| &self.scene.markers()[i])
    }

    /// Marker under the last hover position, if any.
    pub fn hovered_id(&self) -> Option<&str> {
        self.tooltip.marker_id()
    }

    pub fn hover_position(&self) -> Option<Vec2> {
        self.hover
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// One animation frame: asset hand-off, animator, camera inertia,
    /// breathing, then a single draw.
    pub fn frame(&mut self, time_sec: f32) -> Result<(), RenderError> {
        self.process_deliveries();
        animator::step_all(self.scene.markers_mut(), &self.config.animator, time_sec);
        self.camera.step();
        if let Some(fig) = self.scene.figure_mut() {
            fig.apply_breathing(time_sec);
        }

        render::collect_draws(&self.scene, &mut self.draws);
        let view = FrameView {
            camera: self.camera.camera(),
            lighting: &self.scene.lighting,
            fog: &self.scene.fog,
            clear_color: self.scene.fog.color,
            meshes: self.scene.library(),
            draws: &self.draws,
        };
        match self.backend.draw(&view) {
            Ok(()) => Ok(()),
            Err(RenderError::SurfaceLost) => {
                let (w, h) = self.backend.size();
                log::warn!("[gpu] surface lost, reconfiguring at {}x{}", w, h);
                self.backend.resize(w, h);
                Err(RenderError::SurfaceLost)
            }
            Err(e) => {
                log::error!("[gpu] draw failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn items(&self) -> &[ItemSpec] {
        &self.items
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_figure(&self) -> Option<FigureTicket> {
        self.pending
    }

    pub fn last_draws(&self) -> &[DrawItem] {
        &self.draws
    }
}
