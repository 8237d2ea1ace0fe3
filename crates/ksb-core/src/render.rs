//! Rendering capability seam.
//!
//! The engine assembles a [`FrameView`] each tick and hands it to whatever
//! [`RenderBackend`] the host injected. Hosts without a GPU get
//! [`NullBackend`], which accepts every call and draws nothing.

use crate::camera::Camera;
use crate::scene::{Fog, Lighting, MeshId, MeshLibrary, Scene};
use glam::{Mat4, Vec3};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("render surface lost")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("{0}")]
    Other(String),
}

/// One mesh instance to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: Vec3,
}

/// Everything a backend needs for one frame. Borrowed from the engine; the
/// backend must not hold on to it.
pub struct FrameView<'a> {
    pub camera: &'a Camera,
    pub lighting: &'a Lighting,
    pub fog: &'a Fog,
    /// Linear clear color (the fog color, so the horizon fades out).
    pub clear_color: Vec3,
    pub meshes: &'a MeshLibrary,
    pub draws: &'a [DrawItem],
}

pub trait RenderBackend {
    /// Resize the drawing buffer to `width` x `height` device pixels.
    fn resize(&mut self, width: u32, height: u32);
    fn size(&self) -> (u32, u32);
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;
    /// True for placeholder backends that never produce pixels.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Backend used when no rendering capability is available.
#[derive(Debug, Default)]
pub struct NullBackend {
    width: u32,
    height: u32,
}

impl NullBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl RenderBackend for NullBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, _frame: &FrameView<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    fn is_stub(&self) -> bool {
        true
    }
}

/// Flatten the scene into draw items: ground, figure parts, markers.
pub fn collect_draws(scene: &Scene, out: &mut Vec<DrawItem>) {
    out.clear();
    out.push(DrawItem {
        mesh: scene.ground.mesh,
        model: scene.ground.model,
        color: scene.ground.color,
    });
    if let Some(figure) = scene.figure() {
        let root = figure.model_matrix();
        out.extend(figure.parts.iter().map(|p| DrawItem {
            mesh: p.mesh,
            model: root * p.local,
            color: p.color,
        }));
    }
    let marker_mesh = scene.marker_mesh();
    out.extend(scene.markers().iter().map(|m| DrawItem {
        mesh: marker_mesh,
        model: m.model_matrix(),
        color: m.current.color,
    }));
}
