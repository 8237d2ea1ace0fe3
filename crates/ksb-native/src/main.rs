use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use ksb_core::{
    AssetError, AssetLoader, AssetSink, EngineConfig, PointerButton, PointerInput, RenderError,
    SceneEngine, SurfaceRect,
};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState};
use winit::window::{Window, WindowId};

mod items;

/// winit reports a single mouse; give it a fixed pointer id.
const MOUSE_POINTER_ID: i32 = 1;
/// Pixels per wheel line, roughly what browsers report for one notch.
const LINE_DELTA_PX: f32 = 100.0;
const WINDOW_TITLE: &str = "KSB coach view";

/// Reads figure assets from the local filesystem; delivers immediately.
struct FileLoader;

impl AssetLoader for FileLoader {
    fn load(&self, path: &str, sink: AssetSink) {
        let bytes = std::fs::read(path).map_err(|e| AssetError::Fetch(format!("{path}: {e}")));
        sink.deliver(bytes);
    }
}

struct App {
    engine: SceneEngine,
    window: Option<Arc<Window>>,
    started: Instant,
    cursor: Vec2,
    modifiers: ModifiersState,
    title: String,
}

impl App {
    fn new(engine: SceneEngine) -> Self {
        Self {
            engine,
            window: None,
            started: Instant::now(),
            cursor: Vec2::ZERO,
            modifiers: ModifiersState::empty(),
            title: WINDOW_TITLE.to_string(),
        }
    }

    fn sync_surface(&mut self, width: u32, height: u32) {
        self.engine.resize(width, height);
        self.engine
            .set_surface_rect(SurfaceRect::new(0.0, 0.0, width as f32, height as f32));
        self.engine.set_viewport(width as f32, height as f32);
    }

    /// No DOM here: the hovered marker's tooltip text goes to the title bar.
    fn sync_title(&mut self) {
        let tip = self.engine.tooltip();
        let title = if tip.is_visible() {
            format!("{} | {}", tip.header(), tip.body())
        } else {
            WINDOW_TITLE.to_string()
        };
        if title != self.title {
            if let Some(w) = self.window.as_ref() {
                w.set_title(&title);
            }
            self.title = title;
        }
    }

    fn handle_key(&mut self, key: &Key) {
        let Key::Character(c) = key else {
            return;
        };
        match c.as_str() {
            "1" | "2" | "3" | "4" | "5" => {
                let Some(id) = self.engine.hovered_id().map(str::to_string) else {
                    return;
                };
                let value: i32 = c.parse().unwrap_or_default();
                if self.engine.set_rating(&id, value) {
                    log::info!("[rating] {} -> {}", id, value);
                }
            }
            "r" | "R" => self.engine.reset_camera(),
            _ => {}
        }
    }
}

async fn init_gpu(window: Arc<Window>) -> anyhow::Result<ksb_render::SceneRenderer> {
    let size = window.inner_size();
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window)?;
    let gpu = ksb_render::GpuContext::new(&instance, surface, size.width, size.height).await?;
    Ok(ksb_render::SceneRenderer::new(gpu))
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes().with_title(WINDOW_TITLE);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };
        match pollster::block_on(init_gpu(window.clone())) {
            Ok(renderer) => self.engine.set_backend(Box::new(renderer)),
            Err(e) => log::warn!("[gpu] no adapter, running without drawing: {e:?}"),
        }
        let size = window.inner_size();
        self.sync_surface(size.width, size.height);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.sync_surface(size.width, size.height),
            WindowEvent::ModifiersChanged(m) => self.modifiers = m.state(),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.engine.pointer_move(MOUSE_POINTER_ID, self.cursor);
            }
            WindowEvent::CursorLeft { .. } => self.engine.pointer_leave(),
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    let button = match button {
                        MouseButton::Left => PointerButton::Primary,
                        MouseButton::Middle => PointerButton::Middle,
                        MouseButton::Right => PointerButton::Secondary,
                        _ => return,
                    };
                    let input = PointerInput::new(MOUSE_POINTER_ID, self.cursor.x, self.cursor.y)
                        .with_button(button)
                        .with_shift(self.modifiers.shift_key());
                    self.engine.pointer_down(input);
                }
                ElementState::Released => {
                    if let Some(id) = self.engine.pointer_up(MOUSE_POINTER_ID, self.cursor) {
                        log::info!("[pick] selected {}", id);
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                // DOM convention: positive delta scrolls down, i.e. zooms out
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_DELTA_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.engine.wheel(dy);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.handle_key(&event.logical_key);
            }
            WindowEvent::RedrawRequested => {
                let t = self.started.elapsed().as_secs_f32();
                if let Err(RenderError::OutOfMemory) = self.engine.frame(t) {
                    event_loop.exit();
                    return;
                }
                self.sync_title();
                if let Some(w) = self.window.as_ref() {
                    w.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = EngineConfig::default();
    config.figure_url = std::env::args().nth(1);
    let items = items::default_items();
    log::info!("[scene] {} items, figure {:?}", items.len(), config.figure_url);

    let mut engine = SceneEngine::new(&items, config);
    engine.set_asset_loader(Box::new(FileLoader));

    let event_loop = EventLoop::new()?;
    let mut app = App::new(engine);
    event_loop.run_app(&mut app)?;
    Ok(())
}
