mod gpu;
mod helpers;
mod mesh;
mod renderer;
mod targets;

pub use gpu::GpuContext;
pub use renderer::SceneRenderer;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
