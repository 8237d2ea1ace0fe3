pub mod animator;
pub mod asset;
pub mod camera;
pub mod config;
pub mod constants;
pub mod engine;
pub mod figure;
pub mod geometry;
pub mod input;
pub mod picking;
pub mod rating;
pub mod render;
pub mod scene;
pub mod tooltip;

pub use asset::{AssetError, AssetLoader, AssetSink, FigureTicket, LoadedAsset};
pub use camera::{Camera, ControllerState, DragMode, OrbitCamera};
pub use config::{AnimatorSettings, CameraSettings, EngineConfig};
pub use constants::*;
pub use engine::SceneEngine;
pub use figure::{Figure, FigureKind};
pub use input::{PointerButton, PointerInput};
pub use picking::{Ray, SurfaceRect};
pub use rating::{Rating, RatingSource, RawRating};
pub use render::{DrawItem, FrameView, NullBackend, RenderBackend, RenderError};
pub use scene::{Category, ItemSpec, Marker, MeshId, MeshLibrary, Scene};
pub use tooltip::Tooltip;
